//! Overlay configuration persistence
//!
//! Stores user preferences in `~/.config/highlight-overlay/config.yaml`

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::render::OverlayStyle;

/// What a PRESENT event does to overlays already rendered for its highlight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdatePolicy {
    /// Keep existing overlays and render new ones next to them
    #[default]
    Duplicate,
    /// Remove existing overlays before rendering
    Replace,
}

/// Overlay configuration that persists across sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// CSS background colour of highlight overlays
    #[serde(default = "default_fill_color")]
    pub fill_color: String,
    /// CSS opacity of highlight overlays
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub update_policy: UpdatePolicy,
    /// z-index forced onto every overlay, ignoring the document format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index_override: Option<i32>,
}

fn default_fill_color() -> String {
    "yellow".to_string()
}

fn default_opacity() -> f64 {
    0.5
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            fill_color: default_fill_color(),
            opacity: default_opacity(),
            update_policy: UpdatePolicy::default(),
            z_index_override: None,
        }
    }
}

impl OverlayConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{}", e);
                Self::default()
            }
        }
    }

    /// Load config from a specific file
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse config at {}: {}", path.display(), e))?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to the default location
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;
        self.save_to(&path)
    }

    /// Save config to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Overlay presentation described by this config
    pub fn style(&self) -> OverlayStyle {
        let style = OverlayStyle::new(self.fill_color.clone(), self.opacity);
        match self.z_index_override {
            Some(z_index) => style.with_z_index(z_index),
            None => style,
        }
    }
}
