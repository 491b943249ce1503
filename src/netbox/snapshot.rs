//! Inventory Snapshot
//!
//! A full point-in-time capture of every registered resource kind's records,
//! either built live or persisted as one JSON document keyed by kind
//! (`{"custom_fields": [...], "vms": [...], ...}`).

use crate::error::Result;
use crate::resource::registry::ResourceKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Mapping from resource kind to its full record collection.
///
/// Backed by a `BTreeMap` keyed by [`ResourceKind`], whose ordering is the
/// registry enumeration order, so iteration and serialization walk kinds in
/// that fixed order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    sections: BTreeMap<ResourceKind, Vec<Value>>,
}

impl Snapshot {
    pub fn insert(&mut self, kind: ResourceKind, records: Vec<Value>) {
        self.sections.insert(kind, records);
    }

    /// Records for one kind; empty when the snapshot has no section for it
    pub fn records(&self, kind: ResourceKind) -> &[Value] {
        self.sections.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sections in registry order
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, &[Value])> {
        self.sections
            .iter()
            .map(|(kind, records)| (*kind, records.as_slice()))
    }

    /// Total record count across all kinds
    pub fn record_count(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }

    /// Deserialize a snapshot verbatim from a persisted JSON document
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Persist the snapshot as pretty-printed JSON
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }
}
