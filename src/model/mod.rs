//! Highlight data model
//!
//! Geometry, document/page metadata, change events, and the in-memory
//! highlight model that produces them.

pub mod document;
pub mod event;
pub mod highlight;
pub mod highlight_model;

pub use document::{DocInfo, DocMeta, PageHighlights, PageMeta};
pub use event::{DocumentLoadedEvent, MutationEvent};
pub use highlight::{Highlight, HighlightId, Rect};
pub use highlight_model::{DocumentLoadedListener, HighlightModel, MutationListener};
