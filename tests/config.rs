//! Configuration system tests
//!
//! Tests for config paths and overlay config loading/saving.

use highlight_overlay::config_paths;
use highlight_overlay::{OverlayConfig, OverlayStyle, UpdatePolicy};

// ========================================================================
// Config Paths Tests
// ========================================================================

#[test]
fn test_config_dir_returns_some() {
    assert!(config_paths::config_dir().is_some());
}

#[test]
fn test_config_dir_contains_app_name() {
    let dir = config_paths::config_dir().unwrap();
    assert!(dir.to_string_lossy().contains("highlight-overlay"));
}

#[test]
fn test_config_file_ends_with_yaml() {
    let path = config_paths::config_file().unwrap();
    assert!(path.to_string_lossy().ends_with("config.yaml"));
}

#[test]
fn test_logs_dir_is_under_config_dir() {
    let logs = config_paths::logs_dir().unwrap();
    let config = config_paths::config_dir().unwrap();
    assert!(logs.starts_with(&config));
    assert!(logs.ends_with("logs"));
}

// ========================================================================
// OverlayConfig Tests
// ========================================================================

#[test]
fn test_default_config() {
    let config = OverlayConfig::default();
    assert_eq!(config.fill_color, "yellow");
    assert_eq!(config.opacity, 0.5);
    assert_eq!(config.update_policy, UpdatePolicy::Duplicate);
    assert_eq!(config.z_index_override, None);
    assert_eq!(config.style(), OverlayStyle::default());
}

#[test]
fn test_empty_yaml_gives_defaults() {
    let config: OverlayConfig = serde_yaml::from_str("{}").unwrap();
    assert_eq!(config, OverlayConfig::default());
}

#[test]
fn test_unknown_policy_fails_to_parse() {
    let result: Result<OverlayConfig, _> = serde_yaml::from_str("update_policy: merge\n");
    assert!(result.is_err());
}

#[test]
fn test_save_and_load_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.yaml");
    let config = OverlayConfig {
        fill_color: "#00ff00".to_string(),
        opacity: 0.8,
        update_policy: UpdatePolicy::Replace,
        z_index_override: Some(12),
    };

    config.save_to(&path).unwrap();
    let loaded = OverlayConfig::load_from(&path).unwrap();

    assert_eq!(loaded, config);
}

#[test]
fn test_saved_yaml_omits_missing_override() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");

    OverlayConfig::default().save_to(&path).unwrap();
    let content = std::fs::read_to_string(&path).unwrap();

    assert!(content.contains("update_policy: duplicate"));
    assert!(!content.contains("z_index_override"));
}

#[test]
fn test_load_from_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = OverlayConfig::load_from(&dir.path().join("absent.yaml")).unwrap_err();
    assert!(err.contains("Failed to read config"));
}

#[test]
fn test_load_from_invalid_yaml_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "opacity: [not, a, number]\n").unwrap();

    let err = OverlayConfig::load_from(&path).unwrap_err();
    assert!(err.contains("Failed to parse config"));
}
