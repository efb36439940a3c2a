//! Document format capabilities
//!
//! A document format knows where each page is rendered and how highlight
//! rects map onto that surface. Page-image formats (PDF) scale rects by the
//! current zoom; reflowable formats (HTML/EPUB) use them as-is.

use std::cell::Cell;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dom::NodeId;
use crate::model::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocFormatKind {
    Pdf,
    Html,
}

impl DocFormatKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Html => "html",
        }
    }
}

/// How page-space rects map onto the rendered page
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordinateTransform {
    Identity,
    Scale(f64),
}

impl CoordinateTransform {
    pub fn apply(self, rect: &Rect) -> Rect {
        match self {
            Self::Identity => *rect,
            Self::Scale(factor) => rect.scale(factor),
        }
    }
}

/// Presentation hints for page overlays
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PagemarkOptions {
    pub z_index: Option<i32>,
}

pub trait DocFormat {
    fn kind(&self) -> DocFormatKind;

    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Rendered element for a 1-based page number
    fn page_element(&self, page_num: u32) -> Option<NodeId>;

    fn current_scale(&self) -> f64;

    fn pagemark_options(&self) -> PagemarkOptions;

    fn coordinate_transform(&self) -> CoordinateTransform;
}

/// Page-image format: overlays follow the viewer's zoom
#[derive(Debug)]
pub struct PdfFormat {
    pages: BTreeMap<u32, NodeId>,
    scale: Cell<f64>,
    options: PagemarkOptions,
}

impl PdfFormat {
    pub fn new(pages: BTreeMap<u32, NodeId>) -> Self {
        Self {
            pages,
            scale: Cell::new(1.0),
            options: PagemarkOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PagemarkOptions) -> Self {
        self.options = options;
        self
    }

    /// Update the zoom factor; takes effect on the next render
    pub fn set_scale(&self, scale: f64) {
        self.scale.set(scale);
    }
}

impl DocFormat for PdfFormat {
    fn kind(&self) -> DocFormatKind {
        DocFormatKind::Pdf
    }

    fn page_element(&self, page_num: u32) -> Option<NodeId> {
        self.pages.get(&page_num).copied()
    }

    fn current_scale(&self) -> f64 {
        self.scale.get()
    }

    fn pagemark_options(&self) -> PagemarkOptions {
        self.options
    }

    fn coordinate_transform(&self) -> CoordinateTransform {
        CoordinateTransform::Scale(self.current_scale())
    }
}

/// Reflowable text format: rects are already in rendered coordinates
#[derive(Debug)]
pub struct HtmlFormat {
    pages: BTreeMap<u32, NodeId>,
    options: PagemarkOptions,
}

impl HtmlFormat {
    pub fn new(pages: BTreeMap<u32, NodeId>) -> Self {
        Self {
            pages,
            options: PagemarkOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PagemarkOptions) -> Self {
        self.options = options;
        self
    }
}

impl DocFormat for HtmlFormat {
    fn kind(&self) -> DocFormatKind {
        DocFormatKind::Html
    }

    fn page_element(&self, page_num: u32) -> Option<NodeId> {
        self.pages.get(&page_num).copied()
    }

    fn current_scale(&self) -> f64 {
        1.0
    }

    fn pagemark_options(&self) -> PagemarkOptions {
        self.options
    }

    fn coordinate_transform(&self) -> CoordinateTransform {
        CoordinateTransform::Identity
    }
}
