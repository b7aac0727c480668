//! Philippine place-name reference data and matching.
//!
//! The gazetteer is a closed, hand-curated list of known cities and provinces
//! with their textual variants (abbreviations, legacy spellings, suffix
//! forms). [`Matcher`] resolves free-text input against it, exactly or by
//! edit-distance similarity. Everything here is pure and synchronous; the
//! gazetteer is immutable once loaded.

pub mod gazetteer;
pub mod matcher;
pub mod normalize;

pub use gazetteer::{Gazetteer, GazetteerEntry, GazetteerError, GazetteerSet};
pub use matcher::{MatchKind, MatchResult, Matcher};
pub use normalize::normalize;
