//! Backend API interaction module
//!
//! Core of the client: the HTTP transport, the bulk mutation engine, and the
//! caller-facing client with its snapshot machinery.
//!
//! # Module Structure
//!
//! - [`client`] - Live/snapshot-file client, bulk loader, snapshot loader
//! - [`http`] - HTTP transport (authenticated session, raw responses)
//! - [`bulk`] - Generic bulk mutation engine and batch reports
//! - [`snapshot`] - Full-inventory snapshot type and persistence
//!
//! # Example
//!
//! ```ignore
//! use nbx::{Config, NetboxClient, ResourceKind};
//! use serde_json::json;
//!
//! async fn example() -> nbx::Result<()> {
//!     let config = Config::from_file("netbox.json")?;
//!     let client = NetboxClient::connect(&config).await?;
//!     let report = client
//!         .create(ResourceKind::Devices, json!([{"name": "sw1"}]))
//!         .await?;
//!     println!("{}", serde_json::to_string_pretty(&report)?);
//!     Ok(())
//! }
//! ```

pub mod bulk;
pub mod client;
pub mod http;
pub mod snapshot;
