//! In-memory highlight model
//!
//! Owns the per-page highlight sets of every loaded document and notifies
//! listeners as highlights are added, updated and deleted. All methods take
//! `&self` so listeners may call back into the model while being notified
//! (subscribing from a document-loaded listener is the common case).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{OverlayError, Result};
use crate::mutation::{to_mutation_state, MutationState, MutationType};

use super::document::{DocInfo, DocMeta, PageMeta};
use super::event::{DocumentLoadedEvent, MutationEvent};
use super::highlight::{Highlight, HighlightId};

pub type DocumentLoadedListener = Rc<dyn Fn(&DocumentLoadedEvent) -> Result<()>>;
pub type MutationListener = Rc<dyn Fn(&MutationEvent) -> Result<()>>;

#[derive(Default)]
pub struct HighlightModel {
    documents: RefCell<HashMap<String, DocMeta>>,
    loaded_listeners: RefCell<Vec<DocumentLoadedListener>>,
    listeners: RefCell<HashMap<String, Vec<MutationListener>>>,
}

impl std::fmt::Debug for HighlightModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HighlightModel")
            .field("documents", &self.documents.borrow().len())
            .field("loaded_listeners", &self.loaded_listeners.borrow().len())
            .finish()
    }
}

impl HighlightModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_listener_for_document_loaded(&self, listener: DocumentLoadedListener) {
        self.loaded_listeners.borrow_mut().push(listener);
    }

    /// Register a document and notify document-loaded listeners
    ///
    /// Loading the same fingerprint again replaces its pages. Highlights of
    /// the replaced document are emptied from their page sets and reported
    /// as ABSENT first, then the replaced document's change listeners are
    /// dropped. Document-loaded listeners subscribe afresh.
    pub fn load_document(&self, doc_info: DocInfo, page_count: u32) -> Result<()> {
        let meta = DocMeta::new(doc_info, page_count);
        let event = DocumentLoadedEvent::from_meta(&meta);
        let fingerprint = meta.doc_info.fingerprint.clone();

        let previous = self
            .documents
            .borrow_mut()
            .insert(fingerprint.clone(), meta);
        if let Some(previous) = previous {
            tracing::debug!(
                %fingerprint,
                highlights = previous.highlight_count(),
                "document reloaded"
            );
            self.retract_all(&fingerprint, previous)?;
            self.listeners.borrow_mut().remove(&fingerprint);
        }
        tracing::info!(
            fingerprint = %event.doc_info.fingerprint,
            pages = page_count,
            "document loaded"
        );

        let listeners = self.loaded_listeners.borrow().clone();
        for listener in listeners {
            listener(&event)?;
        }
        Ok(())
    }

    /// Subscribe to highlight changes of one document
    ///
    /// Highlights already on the document are replayed to the new listener
    /// as INITIAL events before this returns.
    pub fn register_listener(&self, fingerprint: &str, listener: MutationListener) -> Result<()> {
        let (doc_info, pages) = {
            let documents = self.documents.borrow();
            let meta = documents
                .get(fingerprint)
                .ok_or_else(|| OverlayError::UnknownDocument(fingerprint.to_string()))?;
            (
                meta.doc_info.clone(),
                meta.pages.values().cloned().collect::<Vec<_>>(),
            )
        };

        self.listeners
            .borrow_mut()
            .entry(fingerprint.to_string())
            .or_default()
            .push(Rc::clone(&listener));

        for page in pages {
            for highlight in page.text_highlights.snapshot() {
                let event = MutationEvent::present(highlight, page.clone(), doc_info.clone());
                listener(&event)?;
            }
        }
        Ok(())
    }

    /// Apply a change and notify the document's listeners
    ///
    /// The page's highlight set is updated before listeners run, so they
    /// always observe post-mutation membership. Deleting a highlight the page
    /// does not hold still notifies, with `highlight` as previous value.
    pub fn apply_mutation(
        &self,
        fingerprint: &str,
        page_num: u32,
        mutation_type: MutationType,
        highlight: Highlight,
    ) -> Result<()> {
        let (doc_info, page) = self.lookup_page(fingerprint, page_num)?;

        let event = match to_mutation_state(mutation_type) {
            MutationState::Present => {
                page.text_highlights.insert(highlight.clone());
                MutationEvent::present(highlight, page, doc_info)
            }
            MutationState::Absent => {
                let previous = page
                    .text_highlights
                    .remove(&highlight.id)
                    .unwrap_or(highlight);
                MutationEvent::absent(previous, page, doc_info)
            }
        };

        tracing::debug!(
            target: "mutation",
            fingerprint,
            page = page_num,
            %mutation_type,
            state = %event.mutation_state,
            "highlight mutated"
        );
        self.dispatch(fingerprint, &event)
    }

    /// Apply a change whose mutation type arrives by name
    ///
    /// The name is validated before anything is touched: an unknown type
    /// leaves the model and every listener untouched.
    pub fn apply_named_mutation(
        &self,
        fingerprint: &str,
        page_num: u32,
        mutation_type: &str,
        highlight: Highlight,
    ) -> Result<()> {
        let mutation_type: MutationType = mutation_type.parse()?;
        self.apply_mutation(fingerprint, page_num, mutation_type, highlight)
    }

    pub fn set_highlight(&self, fingerprint: &str, page_num: u32, highlight: Highlight) -> Result<()> {
        self.apply_mutation(fingerprint, page_num, MutationType::Set, highlight)
    }

    /// Delete a highlight by id. Returns `false` if the page did not hold it.
    pub fn delete_highlight(&self, fingerprint: &str, page_num: u32, id: &HighlightId) -> Result<bool> {
        let (_, page) = self.lookup_page(fingerprint, page_num)?;
        let Some(previous) = page.text_highlights.get(id) else {
            tracing::debug!(fingerprint, page = page_num, %id, "delete of unknown highlight ignored");
            return Ok(false);
        };
        self.apply_mutation(fingerprint, page_num, MutationType::Delete, previous)?;
        Ok(true)
    }

    pub fn page_meta(&self, fingerprint: &str, page_num: u32) -> Option<PageMeta> {
        self.documents
            .borrow()
            .get(fingerprint)
            .and_then(|meta| meta.page(page_num).cloned())
    }

    pub fn document(&self, fingerprint: &str) -> Option<DocMeta> {
        self.documents.borrow().get(fingerprint).cloned()
    }

    pub fn listener_count(&self, fingerprint: &str) -> usize {
        self.listeners
            .borrow()
            .get(fingerprint)
            .map_or(0, |listeners| listeners.len())
    }

    fn lookup_page(&self, fingerprint: &str, page_num: u32) -> Result<(DocInfo, PageMeta)> {
        let documents = self.documents.borrow();
        let meta = documents
            .get(fingerprint)
            .ok_or_else(|| OverlayError::UnknownDocument(fingerprint.to_string()))?;
        let page = meta
            .page(page_num)
            .cloned()
            .ok_or(OverlayError::PageNotFound(page_num))?;
        Ok((meta.doc_info.clone(), page))
    }

    /// Drop every highlight of a replaced document, one ABSENT event each
    fn retract_all(&self, fingerprint: &str, previous: DocMeta) -> Result<()> {
        for page in previous.pages.into_values() {
            for highlight in page.text_highlights.snapshot() {
                page.text_highlights.remove(&highlight.id);
                let event = MutationEvent::absent(highlight, page.clone(), previous.doc_info.clone());
                self.dispatch(fingerprint, &event)?;
            }
        }
        Ok(())
    }

    fn dispatch(&self, fingerprint: &str, event: &MutationEvent) -> Result<()> {
        let listeners = self
            .listeners
            .borrow()
            .get(fingerprint)
            .cloned()
            .unwrap_or_default();
        for listener in listeners {
            listener(event)?;
        }
        Ok(())
    }
}
