//! # Analysis Agent
//!
//! Classifies raw backend events into categories with severity and
//! priority. The classification strategy sits behind the [`Classifier`]
//! trait so a model-backed implementation can be substituted later without
//! touching the router or executor.

pub mod keyword;

use shared_types::{Classification, Event};

pub use keyword::KeywordClassifier;

/// Capability interface for event classification.
///
/// Implementations must be deterministic for a given event and free of
/// shared mutable state so classification can run on any number of
/// concurrent workers.
pub trait Classifier: Send + Sync {
    fn classify(&self, event: &Event) -> Classification;
}
