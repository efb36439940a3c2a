//! Highlight geometry and identity

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a highlight, unique within one document
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HighlightId(pub String);

impl HighlightId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HighlightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HighlightId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Rectangle in page coordinate space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Multiply every component by `factor`
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            left: self.left * factor,
            top: self.top * factor,
            width: self.width * factor,
            height: self.height * factor,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// A text highlight: one or more rectangles on a single page
///
/// Rects are keyed by their own id and iterate in key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub id: HighlightId,
    #[serde(default)]
    pub rects: BTreeMap<String, Rect>,
}

impl Highlight {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: HighlightId::new(id),
            rects: BTreeMap::new(),
        }
    }

    /// Add a rect keyed by its insertion index (builder pattern)
    pub fn with_rect(mut self, rect: Rect) -> Self {
        let key = self.rects.len().to_string();
        self.rects.insert(key, rect);
        self
    }

    pub fn rect_count(&self) -> usize {
        self.rects.len()
    }
}
