//! nbx - bulk read/mutate client for NetBox-style inventory APIs
//!
//! One uniform interface over the backend's many resource kinds: fetch full
//! collections, build or read inventory snapshots, and bulk create/update/
//! delete records with a structured good/bad report per batch.

pub mod config;
pub mod error;
pub mod netbox;
pub mod resource;

pub use config::Config;
pub use error::{NbxError, Result};
pub use netbox::bulk::{Batch, BulkReport, FailureDetail, Operation, ResponseDetail};
pub use netbox::client::NetboxClient;
pub use netbox::snapshot::Snapshot;
pub use resource::{label_for, LabelOrder, ResourceKind};
