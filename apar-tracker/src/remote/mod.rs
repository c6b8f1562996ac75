//! Remote spreadsheet store
//!
//! [`RemoteStore`] is the I/O boundary the session talks to. [`SheetClient`]
//! implements it over HTTP; tests substitute in-memory stores.

pub mod client;
pub mod schema;

pub use client::SheetClient;

use apar_common::{Asset, InspectionRecord, Result};
use async_trait::async_trait;
use serde_json::Value;

/// Acknowledgement of an accepted submission
#[derive(Debug, Clone, PartialEq)]
pub struct Ack {
    /// HTTP status of the write response
    pub status: u16,
    /// JSON body, if the endpoint returned one
    pub body: Option<Value>,
}

/// Asset and inspection store
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Look up a single asset by its scanned code
    async fn fetch_asset(&self, id: &str) -> Result<Asset>;

    /// Load the full asset master list
    async fn fetch_all_assets(&self) -> Result<Vec<Asset>>;

    /// Load the full inspection history
    async fn fetch_all_inspections(&self) -> Result<Vec<InspectionRecord>>;

    /// Append one inspection
    async fn submit_inspection(&self, record: &InspectionRecord) -> Result<Ack>;
}
