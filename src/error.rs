//! Error types for the overlay pipeline
//!
//! Only invariant violations are errors. Stale redraws and deletes that match
//! nothing are absorbed by the reconciler and never surface here.

use thiserror::Error;

use crate::mutation::MutationState;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OverlayError {
    /// A mutation type outside INITIAL / SET / DELETE reached the mapper
    #[error("Invalid mutationType: {0}")]
    InvalidMutationType(String),

    /// A mutation event whose value / previous value does not match its state
    #[error("Malformed {state:?} event: {reason}")]
    MalformedEvent {
        state: MutationState,
        reason: &'static str,
    },

    /// The document format has no element for the requested page
    #[error("No page element for page {0}")]
    PageNotFound(u32),

    /// A model operation referenced a document that was never loaded
    #[error("Unknown document: {0}")]
    UnknownDocument(String),
}

pub type Result<T, E = OverlayError> = std::result::Result<T, E>;
