//! Overlay rendering
//!
//! Turns one highlight rect into one absolutely-positioned overlay node on a
//! page element. The renderer owns no state beyond its collaborators; which
//! nodes belong to which highlight is tracked by the reconciler.

use std::rc::Rc;

use crate::context_menu::{ContextMenu, ContextMenuType};
use crate::doc_format::DocFormat;
use crate::dom::{NodeId, SharedDom};
use crate::model::{HighlightId, Rect};

/// Value of the `data-type` attribute on every overlay
pub const OVERLAY_DATA_TYPE: &str = "text-highlight";

/// Class carried by every overlay of highlight `id`
///
/// This is the lookup key used to find overlays by highlight id from the DOM
/// alone, so its format must not change. Ids are escaped into a single class
/// token: ASCII letters, digits and `-` pass through, every other byte
/// (including `_`) becomes `_xx` in lowercase hex. Distinct ids always give
/// distinct classes.
pub fn highlight_class(id: &HighlightId) -> String {
    let mut class = String::from("text-highlight-");
    for byte in id.as_str().bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            class.push(char::from(byte));
        } else {
            class.push_str(&format!("_{:02x}", byte));
        }
    }
    class
}

/// Selector matching every overlay of highlight `id`
pub fn highlight_selector(id: &HighlightId) -> String {
    format!(".{}", highlight_class(id))
}

/// Fixed presentation of overlay nodes
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    /// CSS background colour
    pub fill_color: String,
    /// CSS opacity, 0.0..=1.0
    pub opacity: f64,
    /// z-index that wins over the document format's pagemark options
    pub z_index_override: Option<i32>,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            fill_color: "yellow".to_string(),
            opacity: 0.5,
            z_index_override: None,
        }
    }
}

impl OverlayStyle {
    pub fn new(fill_color: impl Into<String>, opacity: f64) -> Self {
        Self {
            fill_color: fill_color.into(),
            opacity: opacity.clamp(0.0, 1.0),
            z_index_override: None,
        }
    }

    /// Set the z-index override (builder pattern)
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index_override = Some(z_index);
        self
    }
}

/// Identity an overlay is tagged with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayTarget {
    pub highlight_id: HighlightId,
    pub fingerprint: String,
    pub page_num: u32,
}

impl OverlayTarget {
    pub fn class_name(&self) -> String {
        format!("text-highlight annotation {}", highlight_class(&self.highlight_id))
    }
}

pub struct OverlayRenderer {
    dom: SharedDom,
    doc_format: Rc<dyn DocFormat>,
    context_menu: Rc<dyn ContextMenu>,
    style: OverlayStyle,
}

impl std::fmt::Debug for OverlayRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayRenderer")
            .field("format", &self.doc_format.name())
            .field("style", &self.style)
            .finish()
    }
}

impl OverlayRenderer {
    pub fn new(
        dom: SharedDom,
        doc_format: Rc<dyn DocFormat>,
        context_menu: Rc<dyn ContextMenu>,
    ) -> Self {
        Self {
            dom,
            doc_format,
            context_menu,
            style: OverlayStyle::default(),
        }
    }

    /// Set the overlay style (builder pattern)
    pub fn with_style(mut self, style: OverlayStyle) -> Self {
        self.style = style;
        self
    }

    pub fn dom(&self) -> &SharedDom {
        &self.dom
    }

    pub fn doc_format(&self) -> &Rc<dyn DocFormat> {
        &self.doc_format
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    /// Rect as it will be positioned on the page, after the format's transform
    pub fn overlay_rect(&self, rect: &Rect) -> Rect {
        self.doc_format.coordinate_transform().apply(rect)
    }

    /// Render one overlay for `rect` and insert it as the page's first child
    ///
    /// First-child insertion means sibling order is the reverse of creation
    /// order, so later overlays sit behind earlier ones at equal z-index.
    pub fn render(&self, page_element: NodeId, rect: &Rect, target: &OverlayTarget) -> NodeId {
        let placed = self.overlay_rect(rect);
        // A format z-index of 0 means "unset"
        let z_index = self.style.z_index_override.or(self
            .doc_format
            .pagemark_options()
            .z_index
            .filter(|z| *z != 0));

        let node = {
            let mut dom = self.dom.borrow_mut();
            let node = dom.create_element("div");

            dom.set_attribute(node, "data-type", OVERLAY_DATA_TYPE);
            dom.set_attribute(node, "data-doc-fingerprint", target.fingerprint.as_str());
            dom.set_attribute(node, "data-text-highlight-id", target.highlight_id.as_str());
            dom.set_attribute(node, "data-page-num", target.page_num.to_string());
            dom.set_class_name(node, &target.class_name());

            dom.set_style(node, "position", "absolute");
            dom.set_style(node, "background-color", self.style.fill_color.as_str());
            dom.set_style(node, "opacity", self.style.opacity.to_string());

            dom.set_style(node, "left", px(placed.left));
            dom.set_style(node, "top", px(placed.top));
            dom.set_style(node, "width", px(placed.width));
            dom.set_style(node, "height", px(placed.height));

            if let Some(z_index) = z_index {
                dom.set_style(node, "z-index", z_index.to_string());
            }

            dom.insert_first_child(page_element, node);
            node
        };

        self.context_menu
            .register(node, ContextMenuType::TextHighlight);

        tracing::trace!(
            target: "render",
            id = %target.highlight_id,
            page = target.page_num,
            ?node,
            left = placed.left,
            top = placed.top,
            width = placed.width,
            height = placed.height,
            "rendered overlay"
        );
        node
    }
}

fn px(value: f64) -> String {
    format!("{}px", value)
}
