//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::rc::Rc;

use highlight_overlay::context_menu::ContextMenuRegistry;
use highlight_overlay::doc_format::{DocFormat, HtmlFormat, PagemarkOptions, PdfFormat};
use highlight_overlay::dom::{Dom, NodeId, SharedDom};
use highlight_overlay::model::{DocInfo, Highlight, HighlightId, HighlightModel, Rect};
use highlight_overlay::reconciler::HighlightReconciler;
use highlight_overlay::redraw::PageRedrawRegistry;
use highlight_overlay::render::{highlight_selector, OverlayRenderer, OverlayStyle};
use highlight_overlay::UpdatePolicy;

pub const FINGERPRINT: &str = "0123abcd";

/// A reconciler wired to in-memory collaborators, started and loaded
pub struct Fixture {
    pub dom: SharedDom,
    pub pages: BTreeMap<u32, NodeId>,
    pub pdf: Option<Rc<PdfFormat>>,
    pub model: Rc<HighlightModel>,
    pub redraw: Rc<PageRedrawRegistry>,
    pub context_menu: Rc<ContextMenuRegistry>,
    pub reconciler: HighlightReconciler,
}

pub struct FixtureBuilder {
    page_count: u32,
    pdf_scale: Option<f64>,
    z_index: Option<i32>,
    policy: UpdatePolicy,
    style: OverlayStyle,
    load: bool,
}

impl FixtureBuilder {
    /// Reflowable document with the given page count
    pub fn html(page_count: u32) -> Self {
        Self {
            page_count,
            pdf_scale: None,
            z_index: None,
            policy: UpdatePolicy::Duplicate,
            style: OverlayStyle::default(),
            load: true,
        }
    }

    /// Image-page document at the given zoom
    pub fn pdf(page_count: u32, scale: f64) -> Self {
        Self {
            pdf_scale: Some(scale),
            ..Self::html(page_count)
        }
    }

    pub fn z_index(mut self, z_index: i32) -> Self {
        self.z_index = Some(z_index);
        self
    }

    pub fn policy(mut self, policy: UpdatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn style(mut self, style: OverlayStyle) -> Self {
        self.style = style;
        self
    }

    /// Start the reconciler without loading the document
    pub fn unloaded(mut self) -> Self {
        self.load = false;
        self
    }

    pub fn build(self) -> Fixture {
        let dom = Dom::shared();
        let pages: BTreeMap<u32, NodeId> = {
            let mut d = dom.borrow_mut();
            let root = d.root();
            (1..=self.page_count)
                .map(|num| {
                    let page = d.create_element("div");
                    d.set_class_name(page, "page");
                    d.append_child(root, page);
                    (num, page)
                })
                .collect()
        };

        let options = PagemarkOptions {
            z_index: self.z_index,
        };
        let (format, pdf): (Rc<dyn DocFormat>, Option<Rc<PdfFormat>>) = match self.pdf_scale {
            Some(scale) => {
                let pdf = Rc::new(PdfFormat::new(pages.clone()).with_options(options));
                pdf.set_scale(scale);
                (pdf.clone(), Some(pdf))
            }
            None => (
                Rc::new(HtmlFormat::new(pages.clone()).with_options(options)),
                None,
            ),
        };

        let model = Rc::new(HighlightModel::new());
        let redraw = Rc::new(PageRedrawRegistry::new());
        let context_menu = Rc::new(ContextMenuRegistry::new());
        let renderer = OverlayRenderer::new(Rc::clone(&dom), format, context_menu.clone())
            .with_style(self.style);
        let reconciler = HighlightReconciler::new(Rc::clone(&model), renderer, redraw.clone())
            .with_update_policy(self.policy);
        reconciler.start();

        if self.load {
            model
                .load_document(DocInfo::new(FINGERPRINT), self.page_count)
                .unwrap();
        }

        Fixture {
            dom,
            pages,
            pdf,
            model,
            redraw,
            context_menu,
            reconciler,
        }
    }
}

impl Fixture {
    pub fn page(&self, page_num: u32) -> NodeId {
        self.pages[&page_num]
    }

    /// Overlay nodes on the page carrying highlight `id`'s class
    pub fn overlays_in_dom(&self, id: &str) -> Vec<NodeId> {
        self.dom
            .borrow()
            .query_selector_all(&highlight_selector(&HighlightId::new(id)))
    }

    pub fn style_of(&self, node: NodeId, property: &str) -> Option<String> {
        self.dom.borrow().style(node, property).map(str::to_string)
    }

    pub fn set(&self, page_num: u32, highlight: Highlight) {
        self.model
            .set_highlight(FINGERPRINT, page_num, highlight)
            .unwrap();
    }

    pub fn delete(&self, page_num: u32, id: &str) -> bool {
        self.model
            .delete_highlight(FINGERPRINT, page_num, &HighlightId::new(id))
            .unwrap()
    }
}

/// Highlight `id` with one rect per `(left, top, width, height)`
pub fn highlight(id: &str, rects: &[(f64, f64, f64, f64)]) -> Highlight {
    rects
        .iter()
        .fold(Highlight::new(id), |h, &(left, top, width, height)| {
            h.with_rect(Rect::new(left, top, width, height))
        })
}

/// `{id:"a", rects:[{left:10,top:10,width:50,height:20}]}`
pub fn h1() -> Highlight {
    highlight("a", &[(10.0, 10.0, 50.0, 20.0)])
}
