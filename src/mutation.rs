//! Mutation types and their presence projection
//!
//! The highlight model reports three kinds of change. Rendering only cares
//! whether a highlight is there or not, so every change is collapsed into a
//! two-valued [`MutationState`] before it reaches the reconciler.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OverlayError;

/// Raw kind of change delivered by the highlight model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MutationType {
    /// Value replayed when a listener first subscribes
    Initial,
    /// Value created or updated after subscription
    Set,
    /// Value removed
    Delete,
}

/// Normalized presence signal used for rendering decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MutationState {
    Present,
    Absent,
}

impl MutationType {
    pub const ALL: [MutationType; 3] = [Self::Initial, Self::Set, Self::Delete];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "INITIAL",
            Self::Set => "SET",
            Self::Delete => "DELETE",
        }
    }

    pub fn mutation_state(self) -> MutationState {
        to_mutation_state(self)
    }
}

impl fmt::Display for MutationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MutationType {
    type Err = OverlayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| OverlayError::InvalidMutationType(s.to_string()))
    }
}

impl fmt::Display for MutationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => f.write_str("PRESENT"),
            Self::Absent => f.write_str("ABSENT"),
        }
    }
}

/// Collapse a mutation type into its presence state
///
/// INITIAL and SET both mean the value is there; DELETE means it is gone.
#[inline]
pub fn to_mutation_state(mutation_type: MutationType) -> MutationState {
    match mutation_type {
        MutationType::Initial | MutationType::Set => MutationState::Present,
        MutationType::Delete => MutationState::Absent,
    }
}

/// Map a raw mutation type name straight to its state
///
/// Fails with [`OverlayError::InvalidMutationType`] for anything outside
/// INITIAL / SET / DELETE. There is no fallback value.
pub fn parse_mutation_state(name: &str) -> Result<MutationState, OverlayError> {
    name.parse::<MutationType>().map(to_mutation_state)
}
