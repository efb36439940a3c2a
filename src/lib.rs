//! Highlight overlay reconciler
//!
//! Keeps absolutely positioned highlight overlays on document pages in step
//! with a highlight model: changes are mapped to PRESENT/ABSENT states, and
//! the reconciler renders or removes overlays and their redraw callbacks.

pub mod cli;
pub mod config;
pub mod config_paths;
pub mod context_menu;
pub mod doc_format;
pub mod dom;
pub mod error;
pub mod model;
pub mod mutation;
pub mod reconciler;
pub mod redraw;
pub mod render;
pub mod replay;
pub mod tracing;

// Re-export commonly used types
pub use config::{OverlayConfig, UpdatePolicy};
pub use error::OverlayError;
pub use model::{Highlight, HighlightId, HighlightModel, Rect};
pub use mutation::{parse_mutation_state, to_mutation_state, MutationState, MutationType};
pub use reconciler::HighlightReconciler;
pub use render::{OverlayRenderer, OverlayStyle};
