//! Resource abstraction layer
//!
//! The closed registry of backend resource kinds and the labeler that turns
//! schema-less records into human-readable identifiers.
//!
//! - [`registry`] - Kind table: API path segments, display names, report ordering
//! - [`label`] - Derives a display label for an arbitrary record

pub mod label;
pub mod registry;

pub use label::label_for;
pub use registry::{LabelOrder, ResourceKind};
