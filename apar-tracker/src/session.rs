//! Inspection session
//!
//! Owns the fetched snapshot and the currently selected asset, and drives
//! the scan → lookup → checklist → submit flow against a [`RemoteStore`].

use crate::remote::RemoteStore;
use crate::scanner::{CodeScanner, ScanOutcome};
use apar_common::aggregation::{
    self, AssetHistory, AssetRow, DashboardCounts, InspectionStats,
};
use apar_common::validation::{validate, InspectionForm};
use apar_common::{Asset, HistoryRepository, InspectionRecord, Result};
use chrono::NaiveDate;
use tracing::{info, warn};

/// Outcome of the initial data load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub assets: usize,
    pub inspections: usize,
    /// True when the history load failed and the session runs with empty history
    pub history_degraded: bool,
}

pub struct InspectionSession<S> {
    store: S,
    repository: HistoryRepository,
    selected: Option<Asset>,
}

impl<S: RemoteStore> InspectionSession<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            repository: HistoryRepository::new(),
            selected: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn repository(&self) -> &HistoryRepository {
        &self.repository
    }

    /// Asset resolved by the last successful scan or lookup
    pub fn selected(&self) -> Option<&Asset> {
        self.selected.as_ref()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Load assets and inspection history concurrently
    ///
    /// An asset load failure fails the whole load and leaves the previous
    /// snapshot untouched. A history failure only degrades to empty history.
    pub async fn load_all(&mut self) -> Result<LoadSummary> {
        let (assets, inspections) = tokio::join!(
            self.store.fetch_all_assets(),
            self.store.fetch_all_inspections()
        );

        let assets = assets?;
        let (inspections, history_degraded) = match inspections {
            Ok(inspections) => (inspections, false),
            Err(e) => {
                warn!(error = %e, "Error loading inspection history, continuing without it");
                (Vec::new(), true)
            }
        };

        let summary = LoadSummary {
            assets: assets.len(),
            inspections: inspections.len(),
            history_degraded,
        };
        self.repository.replace_assets(assets);
        self.repository.replace_inspections(inspections);

        info!(
            assets = summary.assets,
            inspections = summary.inspections,
            "Initial data loaded"
        );
        Ok(summary)
    }

    /// Refetch the inspection history, degrading to empty on failure
    ///
    /// Returns the number of records now held.
    pub async fn reload_history(&mut self) -> usize {
        match self.store.fetch_all_inspections().await {
            Ok(inspections) => self.repository.replace_inspections(inspections),
            Err(e) => {
                warn!(error = %e, "Error loading inspection history");
                self.repository.replace_inspections(Vec::new());
            }
        }
        self.repository.inspections().len()
    }

    /// Resolve a scanned code to an asset and make it the active selection
    ///
    /// A failed lookup keeps the previous selection; the session stays
    /// usable and the caller can scan again.
    pub async fn select_by_code(&mut self, code: &str) -> Result<&Asset> {
        match self.store.fetch_asset(code).await {
            Ok(asset) => {
                info!(qr_code = %asset.id, location = %asset.location, "Asset selected");
                Ok(&*self.selected.insert(asset))
            }
            Err(e) => {
                warn!(qr_code = %code, error = %e, "Asset lookup failed");
                Err(e)
            }
        }
    }

    /// Scan once and select the decoded asset; `Ok(None)` when cancelled
    pub async fn scan_and_select<C>(&mut self, scanner: &mut C) -> Result<Option<&Asset>>
    where
        C: CodeScanner + ?Sized,
    {
        match scanner.scan().await? {
            ScanOutcome::Decoded(code) => self.select_by_code(&code).await.map(Some),
            ScanOutcome::Cancelled => {
                info!("Scan cancelled");
                Ok(None)
            }
        }
    }

    /// Validate and submit a checklist for the selected asset
    ///
    /// On success the selection is cleared and the history refreshed from
    /// the store. If that refresh fails the new record is kept locally.
    pub async fn submit(&mut self, form: &InspectionForm, today: NaiveDate) -> Result<InspectionRecord> {
        let record = validate(form, self.selected.as_ref())?.into_record(today);

        self.store.submit_inspection(&record).await?;
        self.selected = None;

        match self.store.fetch_all_inspections().await {
            Ok(inspections) => self.repository.replace_inspections(inspections),
            Err(e) => {
                warn!(error = %e, "History refresh after submit failed, keeping local copy");
                self.repository.append_inspection(record.clone());
            }
        }

        Ok(record)
    }

    /// Fleet-wide counters
    pub fn dashboard(&self, today: NaiveDate) -> DashboardCounts {
        let groups = aggregation::group_by_asset(self.repository.inspections());
        aggregation::dashboard(self.repository.assets(), &groups, today)
    }

    /// Asset table with latest status per asset
    pub fn asset_rows(&self, today: NaiveDate) -> Vec<AssetRow> {
        let groups = aggregation::group_by_asset(self.repository.inspections());
        aggregation::asset_rows(self.repository.assets(), &groups, today)
    }

    /// One asset's history, newest first
    pub fn history_for(&self, code: &str) -> Vec<InspectionRecord> {
        self.repository.history_for(code)
    }

    /// Status tally over one asset's history
    pub fn stats_for(&self, code: &str, today: NaiveDate) -> InspectionStats {
        aggregation::summarize(&self.repository.history_for(code), today)
    }

    /// All history grouped per asset, most-inspected first
    pub fn grouped_history(&self) -> Vec<AssetHistory> {
        aggregation::grouped_for_display(self.repository.inspections())
    }
}
