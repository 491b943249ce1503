//! NetBox client
//!
//! The caller-facing client, bound either to a live backend (authenticated
//! session opened and probed once at construction) or to a previously
//! persisted snapshot file (no network I/O at all).

use crate::config::Config;
use crate::error::{NbxError, Result};
use crate::netbox::bulk::{self, Batch, BulkReport, Operation};
use crate::netbox::http::{sanitize_for_log, HttpTransport};
use crate::netbox::snapshot::Snapshot;
use crate::resource::registry::ResourceKind;
use serde_json::Value;
use std::path::PathBuf;

enum Mode {
    Live {
        http: HttpTransport,
        /// Result of the construction-time connectivity probe, checked by
        /// `load_snapshot` instead of re-probing
        probe_ok: bool,
    },
    File {
        path: PathBuf,
    },
}

/// Client for a NetBox-style inventory backend.
pub struct NetboxClient {
    mode: Mode,
}

impl NetboxClient {
    /// Connect to a live backend and probe connectivity once.
    ///
    /// A non-200 probe response is logged and remembered (`load_snapshot`
    /// will yield `None`), but the client is still constructed. A
    /// connection-level failure aborts construction; the session is
    /// released on that path too.
    pub async fn connect(config: &Config) -> Result<Self> {
        let http = HttpTransport::new(config.base_url(), &config.apikey)?;
        tracing::info!("Connecting to \"{}\" - ...", http.base_url());

        match http.get("").await {
            Ok(response) if response.status == 200 => {
                tracing::info!(
                    "Connecting to \"{}\" - OK (code {})",
                    http.base_url(),
                    response.status
                );
                Ok(Self {
                    mode: Mode::Live {
                        http,
                        probe_ok: true,
                    },
                })
            }
            Ok(response) => {
                tracing::error!(
                    "Connecting to \"{}\" - error (code {}): {}",
                    http.base_url(),
                    response.status,
                    sanitize_for_log(&response.text)
                );
                Ok(Self {
                    mode: Mode::Live {
                        http,
                        probe_ok: false,
                    },
                })
            }
            Err(err) => {
                tracing::error!("Connecting to \"{}\" - error: {}", http.base_url(), err);
                Err(err)
            }
        }
    }

    /// Bind the client to a persisted snapshot file; no connection is made
    /// and mutation calls fail with [`NbxError::Offline`].
    pub fn from_snapshot_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        tracing::info!("Work mode: data from file \"{}\"", path.display());
        Self {
            mode: Mode::File { path },
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self.mode, Mode::Live { .. })
    }

    fn live(&self) -> Result<&HttpTransport> {
        match &self.mode {
            Mode::Live { http, .. } => Ok(http),
            Mode::File { .. } => Err(NbxError::Offline),
        }
    }

    /// Fetch the full collection for one kind (`?limit=0`, unbounded page).
    /// Returns the response's `results` array, or empty when absent.
    pub async fn load(&self, kind: ResourceKind) -> Result<Vec<Value>> {
        let http = self.live()?;
        tracing::info!("Get {} from \"{}\" - ...", kind.display_name(), http.base_url());

        let response = http.get(&format!("{}/?limit=0", kind.path())).await?;
        let records = response
            .json
            .as_ref()
            .and_then(|body| body.get("results"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        tracing::info!(
            "Get {} from \"{}\" - OK ({})",
            kind.display_name(),
            http.base_url(),
            records.len()
        );
        Ok(records)
    }

    /// Create the batch's records one by one; see [`BulkReport`]
    pub async fn create(&self, kind: ResourceKind, batch: impl Into<Batch>) -> Result<BulkReport> {
        Ok(bulk::run(self.live()?, kind, Operation::Create, batch.into()).await)
    }

    /// Update the batch's records one by one; each record needs an `id`
    pub async fn update(&self, kind: ResourceKind, batch: impl Into<Batch>) -> Result<BulkReport> {
        Ok(bulk::run(self.live()?, kind, Operation::Update, batch.into()).await)
    }

    /// Delete the batch's records one by one; each record needs an `id`
    pub async fn delete(&self, kind: ResourceKind, batch: impl Into<Batch>) -> Result<BulkReport> {
        Ok(bulk::run(self.live()?, kind, Operation::Delete, batch.into()).await)
    }

    /// Build a full inventory snapshot.
    ///
    /// Live mode walks every registered kind in registry order; `Ok(None)`
    /// means the construction-time probe did not return 200 and the backend
    /// is considered unavailable. Snapshot-file mode deserializes the bound
    /// file verbatim without touching the network.
    pub async fn load_snapshot(&self) -> Result<Option<Snapshot>> {
        match &self.mode {
            Mode::Live { http, probe_ok } => {
                if !*probe_ok {
                    tracing::warn!(
                        "Backend \"{}\" did not answer the startup probe, no snapshot",
                        http.base_url()
                    );
                    return Ok(None);
                }
                let mut snapshot = Snapshot::default();
                for kind in ResourceKind::ALL {
                    let records = self.load(kind).await?;
                    snapshot.insert(kind, records);
                }
                Ok(Some(snapshot))
            }
            Mode::File { path } => {
                tracing::info!("Reading data from file \"{}\" - ...", path.display());
                let snapshot = Snapshot::from_file(path)?;
                tracing::info!(
                    "Reading data from file \"{}\" - OK ({} records)",
                    path.display(),
                    snapshot.record_count()
                );
                Ok(Some(snapshot))
            }
        }
    }
}
