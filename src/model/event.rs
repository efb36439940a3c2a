//! Events delivered by the highlight model

use crate::error::OverlayError;
use crate::mutation::MutationState;

use super::document::{DocInfo, DocMeta, PageMeta};
use super::highlight::{Highlight, HighlightId};

/// A document finished loading and its highlights can be subscribed to
#[derive(Debug, Clone)]
pub struct DocumentLoadedEvent {
    pub doc_info: DocInfo,
    pub page_count: u32,
}

impl DocumentLoadedEvent {
    pub fn from_meta(meta: &DocMeta) -> Self {
        Self {
            doc_info: meta.doc_info.clone(),
            page_count: meta.pages.len() as u32,
        }
    }
}

/// A single highlight change, valid for the duration of one callback
///
/// Exactly one of `value` / `previous_value` is populated: `value` for
/// [`MutationState::Present`], `previous_value` for [`MutationState::Absent`].
#[derive(Debug, Clone)]
pub struct MutationEvent {
    pub mutation_state: MutationState,
    pub value: Option<Highlight>,
    pub previous_value: Option<Highlight>,
    pub page_meta: PageMeta,
    pub doc_info: DocInfo,
}

impl MutationEvent {
    pub fn present(highlight: Highlight, page_meta: PageMeta, doc_info: DocInfo) -> Self {
        Self {
            mutation_state: MutationState::Present,
            value: Some(highlight),
            previous_value: None,
            page_meta,
            doc_info,
        }
    }

    pub fn absent(previous: Highlight, page_meta: PageMeta, doc_info: DocInfo) -> Self {
        Self {
            mutation_state: MutationState::Absent,
            value: None,
            previous_value: Some(previous),
            page_meta,
            doc_info,
        }
    }

    /// Check the value / previous-value invariant
    pub fn validate(&self) -> Result<(), OverlayError> {
        let reason = match (self.mutation_state, &self.value, &self.previous_value) {
            (MutationState::Present, Some(_), None) | (MutationState::Absent, None, Some(_)) => {
                return Ok(())
            }
            (MutationState::Present, None, _) => "present event without a value",
            (MutationState::Present, Some(_), Some(_)) => "present event with a previous value",
            (MutationState::Absent, _, None) => "absent event without a previous value",
            (MutationState::Absent, Some(_), Some(_)) => "absent event with a value",
        };
        Err(OverlayError::MalformedEvent {
            state: self.mutation_state,
            reason,
        })
    }

    /// The highlight this event is about, after checking the invariant
    pub fn subject(&self) -> Result<&Highlight, OverlayError> {
        self.validate()?;
        self.value
            .as_ref()
            .or(self.previous_value.as_ref())
            .ok_or(OverlayError::MalformedEvent {
                state: self.mutation_state,
                reason: "event without a highlight",
            })
    }

    /// Id of the highlight this event is about
    pub fn highlight_id(&self) -> Option<&HighlightId> {
        self.value
            .as_ref()
            .or(self.previous_value.as_ref())
            .map(|h| &h.id)
    }

    pub fn page_num(&self) -> u32 {
        self.page_meta.page_num
    }
}
