//! HTTP client for the spreadsheet-backed endpoints
//!
//! Every call is one-shot and wrapped in its own timeout; when the timeout
//! fires the in-flight request future is dropped, which aborts it. There is
//! no retry here; callers decide whether to try again.

use super::schema::{inspection_form_fields, parse_asset_list, parse_inspection_list, parse_single_asset};
use super::{Ack, RemoteStore};
use crate::config::{RemoteTimeouts, TrackerConfig};
use apar_common::{Asset, Error, InspectionRecord, NetworkError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

const USER_AGENT: &str = concat!("apar-tracker/", env!("CARGO_PKG_VERSION"));

/// Query selecting the inspection history sheet
const HISTORY_QUERY: (&str, &str) = ("action", "get_inspections");

/// Client for the asset/history read endpoint and the inspection write endpoint
pub struct SheetClient {
    http_client: Client,
    read_url: String,
    write_url: String,
    timeouts: RemoteTimeouts,
}

impl SheetClient {
    pub fn new(read_url: impl Into<String>, write_url: impl Into<String>, timeouts: RemoteTimeouts) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            read_url: read_url.into(),
            write_url: write_url.into(),
            timeouts,
        })
    }

    pub fn from_config(config: &TrackerConfig) -> Result<Self> {
        Self::new(config.read_url.clone(), config.write_url.clone(), config.timeouts)
    }

    pub fn timeouts(&self) -> RemoteTimeouts {
        self.timeouts
    }

    /// Send a request and decode its JSON body within `limit`
    async fn get_json(&self, request: RequestBuilder, limit: Duration) -> Result<Value> {
        with_timeout(limit, async {
            let response = request.send().await.map_err(|e| transport_error(e, limit))?;
            let status = response.status();
            if !status.is_success() {
                return Err(NetworkError::HttpStatus(status.as_u16()).into());
            }
            response
                .json::<Value>()
                .await
                .map_err(|e| transport_error(e, limit))
        })
        .await
    }
}

#[async_trait]
impl RemoteStore for SheetClient {
    async fn fetch_asset(&self, id: &str) -> Result<Asset> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::NotFound(String::new()));
        }

        debug!(qr_code = %id, url = %self.read_url, "Looking up asset");
        let request = self.http_client.get(&self.read_url).query(&[("id", id)]);
        let body = self.get_json(request, self.timeouts.lookup).await?;

        match parse_single_asset(body) {
            Some(asset) => {
                info!(qr_code = %id, "Data ditemukan untuk QRCODE");
                Ok(asset)
            }
            None => {
                warn!(qr_code = %id, "Data tidak ditemukan untuk QRCODE");
                Err(Error::NotFound(id.to_string()))
            }
        }
    }

    async fn fetch_all_assets(&self) -> Result<Vec<Asset>> {
        debug!(url = %self.read_url, "Loading all assets");
        let request = self.http_client.get(&self.read_url);
        let body = self.get_json(request, self.timeouts.bulk).await?;

        let assets = parse_asset_list(body);
        info!("Loaded {} APAR records", assets.len());
        Ok(assets)
    }

    async fn fetch_all_inspections(&self) -> Result<Vec<InspectionRecord>> {
        debug!(url = %self.read_url, "Loading inspection history");
        let request = self.http_client.get(&self.read_url).query(&[HISTORY_QUERY]);
        let body = self.get_json(request, self.timeouts.bulk).await?;

        let records = parse_inspection_list(body);
        info!("Loaded {} inspection history records", records.len());
        Ok(records)
    }

    async fn submit_inspection(&self, record: &InspectionRecord) -> Result<Ack> {
        let fields = inspection_form_fields(record);
        let limit = self.timeouts.submit;
        debug!(qr_code = %record.asset_id, url = %self.write_url, "Submitting inspection");

        let request = self.http_client.post(&self.write_url).form(&fields);
        let ack = with_timeout(limit, async {
            let response = request.send().await.map_err(|e| transport_error(e, limit))?;
            let status = response.status();
            if !status.is_success() {
                return Err(NetworkError::HttpStatus(status.as_u16()).into());
            }
            let text = response.text().await.map_err(|e| transport_error(e, limit))?;
            let body = serde_json::from_str::<Value>(&text).ok();
            if body.is_none() && !text.trim().is_empty() {
                warn!(qr_code = %record.asset_id, "Submission acknowledged with a non-JSON body");
            }
            Ok(Ack {
                status: status.as_u16(),
                body,
            })
        })
        .await?;

        info!(qr_code = %record.asset_id, status = ack.status, "Inspection submitted");
        Ok(ack)
    }
}

/// Run `call` under a deadline, surfacing expiry as [`NetworkError::Timeout`]
async fn with_timeout<T>(limit: Duration, call: impl Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            warn!(timeout = ?limit, "Request aborted after timeout");
            Err(NetworkError::Timeout(limit).into())
        }
    }
}

fn transport_error(e: reqwest::Error, limit: Duration) -> Error {
    if e.is_timeout() {
        NetworkError::Timeout(limit).into()
    } else if e.is_decode() {
        Error::MalformedData(format!("Failed to decode response: {}", e))
    } else if let Some(status) = e.status() {
        NetworkError::HttpStatus(status.as_u16()).into()
    } else {
        NetworkError::ConnectionFailed(e.to_string()).into()
    }
}
