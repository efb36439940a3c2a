//! Document and page metadata shared with the highlight model

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::highlight::{Highlight, HighlightId};

/// Identity of a loaded document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocInfo {
    /// Content fingerprint, stable across sessions
    pub fingerprint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl DocInfo {
    pub fn new(fingerprint: impl Into<String>) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            title: None,
        }
    }
}

/// Live set of highlights on one page
///
/// Cloning shares the underlying set: every clone observes the current,
/// post-mutation membership. Render closures hold a clone to detect that
/// their highlight has gone away.
#[derive(Debug, Clone, Default)]
pub struct PageHighlights(Rc<RefCell<HashMap<HighlightId, Highlight>>>);

impl PageHighlights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &HighlightId) -> bool {
        self.0.borrow().contains_key(id)
    }

    pub fn get(&self, id: &HighlightId) -> Option<Highlight> {
        self.0.borrow().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Snapshot of the current highlights, ordered by id
    pub fn snapshot(&self) -> Vec<Highlight> {
        let mut highlights: Vec<Highlight> = self.0.borrow().values().cloned().collect();
        highlights.sort_by(|a, b| a.id.cmp(&b.id));
        highlights
    }

    pub(crate) fn insert(&self, highlight: Highlight) -> Option<Highlight> {
        self.0.borrow_mut().insert(highlight.id.clone(), highlight)
    }

    pub(crate) fn remove(&self, id: &HighlightId) -> Option<Highlight> {
        self.0.borrow_mut().remove(id)
    }
}

/// One page of a loaded document
#[derive(Debug, Clone)]
pub struct PageMeta {
    /// 1-based page number
    pub page_num: u32,
    pub text_highlights: PageHighlights,
}

impl PageMeta {
    pub fn new(page_num: u32) -> Self {
        Self {
            page_num,
            text_highlights: PageHighlights::new(),
        }
    }
}

/// Everything the highlight model keeps about one document
#[derive(Debug, Clone)]
pub struct DocMeta {
    pub doc_info: DocInfo,
    pub pages: BTreeMap<u32, PageMeta>,
}

impl DocMeta {
    /// Create metadata with pages `1..=page_count`
    pub fn new(doc_info: DocInfo, page_count: u32) -> Self {
        let pages = (1..=page_count).map(|n| (n, PageMeta::new(n))).collect();
        Self { doc_info, pages }
    }

    pub fn page(&self, page_num: u32) -> Option<&PageMeta> {
        self.pages.get(&page_num)
    }

    pub fn highlight_count(&self) -> usize {
        self.pages.values().map(|p| p.text_highlights.len()).sum()
    }
}
