//! Scripted replay of highlight events
//!
//! Wires the in-memory collaborators (DOM, document format, highlight model,
//! redraw registry, context menu) to a reconciler and applies a script of
//! steps to it. Used by the command-line tool and integration tests.

use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::config::OverlayConfig;
use crate::context_menu::ContextMenuRegistry;
use crate::doc_format::{DocFormat, DocFormatKind, HtmlFormat, PagemarkOptions, PdfFormat};
use crate::dom::{Dom, NodeId, SharedDom};
use crate::error::{OverlayError, Result};
use crate::model::{DocInfo, Highlight, HighlightId, HighlightModel};
use crate::reconciler::HighlightReconciler;
use crate::redraw::PageRedrawRegistry;
use crate::render::OverlayRenderer;

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptDocument {
    pub fingerprint: String,
    #[serde(default)]
    pub title: Option<String>,
    pub format: DocFormatKind,
    #[serde(default = "default_pages")]
    pub pages: u32,
    #[serde(default)]
    pub scale: Option<f64>,
    #[serde(default)]
    pub z_index: Option<i32>,
}

fn default_pages() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Load the script's document into the highlight model
    Load,
    /// Apply a change whose mutation type is given by name
    Mutate {
        #[serde(rename = "type")]
        mutation_type: String,
        page: u32,
        highlight: Highlight,
    },
    /// Delete a highlight by id
    Delete { page: u32, id: HighlightId },
    /// Redraw one page, or every page when `page` is omitted
    Redraw {
        #[serde(default)]
        page: Option<u32>,
    },
    /// Change the PDF zoom and redraw everything
    Zoom { scale: f64 },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Load => "load",
            Step::Mutate { .. } => "mutate",
            Step::Delete { .. } => "delete",
            Step::Redraw { .. } => "redraw",
            Step::Zoom { .. } => "zoom",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayScript {
    pub document: ScriptDocument,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl ReplayScript {
    /// Parse a script, as JSON for `.json` paths and YAML otherwise
    pub fn parse(content: &str, path: &Path) -> std::result::Result<Self, String> {
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            serde_json::from_str(content).map_err(|e| format!("Invalid JSON script: {}", e))
        } else {
            serde_yaml::from_str(content).map_err(|e| format!("Invalid YAML script: {}", e))
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HighlightSummary {
    pub id: String,
    pub overlays: usize,
    pub registrations: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReplaySummary {
    pub fingerprint: String,
    pub format: &'static str,
    pub overlays: usize,
    pub redraw_registrations: usize,
    pub highlights: Vec<HighlightSummary>,
}

enum FormatHandle {
    Pdf(Rc<PdfFormat>),
    Html(Rc<HtmlFormat>),
}

/// A reconciler wired to in-memory collaborators
pub struct ReplaySession {
    document: ScriptDocument,
    dom: SharedDom,
    pages: BTreeMap<u32, NodeId>,
    format: FormatHandle,
    model: Rc<HighlightModel>,
    redraw: Rc<PageRedrawRegistry>,
    context_menu: Rc<ContextMenuRegistry>,
    reconciler: HighlightReconciler,
}

impl ReplaySession {
    pub fn new(document: ScriptDocument, config: &OverlayConfig) -> Self {
        let dom = Dom::shared();
        let pages: BTreeMap<u32, NodeId> = {
            let mut d = dom.borrow_mut();
            let root = d.root();
            (1..=document.pages)
                .map(|num| {
                    let page = d.create_element("div");
                    d.set_class_name(page, "page");
                    d.set_attribute(page, "data-page-number", num.to_string());
                    d.append_child(root, page);
                    (num, page)
                })
                .collect()
        };

        let options = PagemarkOptions {
            z_index: document.z_index,
        };
        let format = match document.format {
            DocFormatKind::Pdf => {
                let pdf = PdfFormat::new(pages.clone()).with_options(options);
                pdf.set_scale(document.scale.unwrap_or(1.0));
                FormatHandle::Pdf(Rc::new(pdf))
            }
            DocFormatKind::Html => {
                FormatHandle::Html(Rc::new(HtmlFormat::new(pages.clone()).with_options(options)))
            }
        };
        let doc_format: Rc<dyn DocFormat> = match &format {
            FormatHandle::Pdf(pdf) => pdf.clone(),
            FormatHandle::Html(html) => html.clone(),
        };

        let model = Rc::new(HighlightModel::new());
        let redraw = Rc::new(PageRedrawRegistry::new());
        let context_menu = Rc::new(ContextMenuRegistry::new());
        let renderer = OverlayRenderer::new(Rc::clone(&dom), doc_format, context_menu.clone())
            .with_style(config.style());
        let reconciler = HighlightReconciler::new(Rc::clone(&model), renderer, redraw.clone())
            .with_update_policy(config.update_policy);
        reconciler.start();

        Self {
            document,
            dom,
            pages,
            format,
            model,
            redraw,
            context_menu,
            reconciler,
        }
    }

    pub fn apply(&self, step: &Step) -> Result<()> {
        let fingerprint = self.document.fingerprint.as_str();
        match step {
            Step::Load => {
                let doc_info = DocInfo {
                    fingerprint: fingerprint.to_string(),
                    title: self.document.title.clone(),
                };
                self.model.load_document(doc_info, self.document.pages)
            }
            Step::Mutate {
                mutation_type,
                page,
                highlight,
            } => self
                .model
                .apply_named_mutation(fingerprint, *page, mutation_type, highlight.clone()),
            Step::Delete { page, id } => self.model.delete_highlight(fingerprint, *page, id).map(|_| ()),
            Step::Redraw { page: Some(page) } => {
                let element = self
                    .pages
                    .get(page)
                    .copied()
                    .ok_or(OverlayError::PageNotFound(*page))?;
                self.redraw.redraw(element);
                Ok(())
            }
            Step::Redraw { page: None } => {
                self.redraw.redraw_all();
                Ok(())
            }
            Step::Zoom { scale } => {
                match &self.format {
                    FormatHandle::Pdf(pdf) => pdf.set_scale(*scale),
                    FormatHandle::Html(_) => {
                        tracing::warn!("zoom ignored for reflowable document");
                        return Ok(());
                    }
                }
                self.redraw.redraw_all();
                Ok(())
            }
        }
    }

    pub fn dom(&self) -> &SharedDom {
        &self.dom
    }

    pub fn page_element(&self, page_num: u32) -> Option<NodeId> {
        self.pages.get(&page_num).copied()
    }

    pub fn model(&self) -> &HighlightModel {
        &self.model
    }

    pub fn redraw_registry(&self) -> &PageRedrawRegistry {
        &self.redraw
    }

    pub fn context_menu(&self) -> &ContextMenuRegistry {
        &self.context_menu
    }

    pub fn reconciler(&self) -> &HighlightReconciler {
        &self.reconciler
    }

    pub fn to_html(&self) -> String {
        let dom = self.dom.borrow();
        dom.to_html(dom.root())
    }

    pub fn summary(&self) -> ReplaySummary {
        let highlights = self
            .reconciler
            .tracked_highlights()
            .into_iter()
            .map(|id| HighlightSummary {
                overlays: self.reconciler.overlay_count(&id),
                registrations: self.reconciler.registration_count(&id),
                id: id.0,
            })
            .collect();
        ReplaySummary {
            fingerprint: self.document.fingerprint.clone(),
            format: self.document.format.name(),
            overlays: self.reconciler.total_overlays(),
            redraw_registrations: self.redraw.len(),
            highlights,
        }
    }
}
