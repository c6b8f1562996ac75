//! In-memory store of asset master data and inspection history
//!
//! The repository owns the last fetched snapshot. Derive passes borrow its
//! slices read-only; replacing a snapshot happens between passes.

use crate::aggregation::sort_newest_first;
use crate::model::{Asset, InspectionRecord};
use crate::time::RecordDate;
use tracing::debug;

/// Asset and inspection snapshot for one session
#[derive(Debug, Default, Clone)]
pub struct HistoryRepository {
    assets: Vec<Asset>,
    inspections: Vec<InspectionRecord>,
}

impl HistoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository from already-fetched data
    pub fn with_data(assets: Vec<Asset>, inspections: Vec<InspectionRecord>) -> Self {
        Self { assets, inspections }
    }

    /// Replace the asset snapshot
    pub fn replace_assets(&mut self, assets: Vec<Asset>) {
        debug!(count = assets.len(), "Replacing asset snapshot");
        self.assets = assets;
    }

    /// Replace the inspection history snapshot
    pub fn replace_inspections(&mut self, inspections: Vec<InspectionRecord>) {
        debug!(count = inspections.len(), "Replacing inspection snapshot");
        self.inspections = inspections;
    }

    /// Append a newly submitted inspection
    pub fn append_inspection(&mut self, record: InspectionRecord) {
        self.inspections.push(record);
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn inspections(&self) -> &[InspectionRecord] {
        &self.inspections
    }

    /// Look up an asset by its scanned code
    pub fn asset(&self, id: &str) -> Option<&Asset> {
        self.assets.iter().find(|asset| asset.id == id)
    }

    /// Inspections for one asset in insertion order
    pub fn inspections_for<'a>(
        &'a self,
        asset_id: &'a str,
    ) -> impl Iterator<Item = &'a InspectionRecord> + 'a {
        self.inspections
            .iter()
            .filter(move |record| record.asset_id == asset_id)
    }

    /// Inspection history for one asset, newest first
    ///
    /// Among records sharing a date the later-appended one comes first.
    pub fn history_for(&self, asset_id: &str) -> Vec<InspectionRecord> {
        let mut history: Vec<InspectionRecord> = self.inspections_for(asset_id).cloned().collect();
        sort_newest_first(&mut history);
        history
    }

    /// Most recent inspection of an asset; the last-appended wins a same-date tie
    pub fn latest_for(&self, asset_id: &str) -> Option<&InspectionRecord> {
        // min_by keeps the first minimum, which over a reversed walk is the last appended
        self.inspections
            .iter()
            .rev()
            .filter(|record| record.asset_id == asset_id)
            .min_by(|a, b| RecordDate::newest_first(&a.inspection_date, &b.inspection_date))
    }

    /// Inspections whose asset code is not in the asset snapshot
    pub fn orphaned_inspections(&self) -> impl Iterator<Item = &InspectionRecord> + '_ {
        self.inspections
            .iter()
            .filter(move |record| self.asset(&record.asset_id).is_none())
    }

    /// Asset details for display, falling back to the record's own snapshot
    /// for inspections of unregistered assets
    pub fn describe_asset(&self, asset_id: &str) -> Asset {
        if let Some(asset) = self.asset(asset_id) {
            return asset.clone();
        }

        let latest = self.latest_for(asset_id);
        Asset {
            id: asset_id.to_string(),
            location: latest.map(|r| r.location.clone()).unwrap_or_default(),
            asset_type: latest.map(|r| r.asset_type.clone()).unwrap_or_default(),
            capacity: latest.map(|r| r.capacity.clone()).unwrap_or_default(),
            expiry_date: latest
                .map(|r| r.expiry_date.clone())
                .unwrap_or_else(|| RecordDate::Unknown(String::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Components;

    fn asset(id: &str) -> Asset {
        Asset {
            id: id.to_string(),
            location: format!("Lokasi {id}"),
            asset_type: "CO2".to_string(),
            capacity: "3 kg".to_string(),
            expiry_date: RecordDate::parse("2030-01-01"),
        }
    }

    fn inspection(asset_id: &str, date: &str, inspector: &str) -> InspectionRecord {
        InspectionRecord {
            asset_id: asset_id.to_string(),
            inspection_date: RecordDate::parse(date),
            inspector_name: inspector.to_string(),
            expiry_date: RecordDate::parse("2030-01-01"),
            location: "Lantai 2".to_string(),
            asset_type: "Powder".to_string(),
            capacity: "6 kg".to_string(),
            components: Components::all_good(),
            notes: None,
            recorded_status: None,
        }
    }

    fn sample_repo() -> HistoryRepository {
        HistoryRepository::with_data(
            vec![asset("A1"), asset("A2")],
            vec![
                inspection("A1", "2024-01-10", "first"),
                inspection("A2", "2024-02-01", "other"),
                inspection("A1", "2024-03-05", "newest"),
                inspection("A1", "garbled", "unknown-date"),
                inspection("A1", "2024-01-10", "same-day"),
                inspection("X9", "2024-01-01", "orphan"),
            ],
        )
    }

    #[test]
    fn test_asset_lookup() {
        let repo = sample_repo();
        assert_eq!(repo.asset("A2").map(|a| a.location.as_str()), Some("Lokasi A2"));
        assert!(repo.asset("missing").is_none());
    }

    #[test]
    fn test_history_newest_first_with_later_row_first_on_ties() {
        let repo = sample_repo();
        let inspectors: Vec<String> = repo
            .history_for("A1")
            .into_iter()
            .map(|r| r.inspector_name)
            .collect();
        assert_eq!(inspectors, vec!["newest", "same-day", "first", "unknown-date"]);
    }

    #[test]
    fn test_latest_for_matches_history_head() {
        let repo = sample_repo();
        let latest = repo.latest_for("A1").map(|r| r.inspector_name.clone());
        let head = repo.history_for("A1").first().map(|r| r.inspector_name.clone());
        assert_eq!(latest, head);
        assert!(repo.latest_for("nothing").is_none());
    }

    #[test]
    fn test_latest_for_tie_prefers_last_appended() {
        let repo = HistoryRepository::with_data(
            vec![],
            vec![
                inspection("A1", "2024-01-10", "morning"),
                inspection("A1", "2024-01-10", "afternoon"),
            ],
        );
        assert_eq!(repo.latest_for("A1").map(|r| r.inspector_name.as_str()), Some("afternoon"));
    }

    #[test]
    fn test_latest_for_outlives_lookup_key() {
        let repo = sample_repo();
        let latest = {
            let key = format!("A{}", 1);
            repo.latest_for(&key)
        };
        assert_eq!(latest.map(|r| r.inspector_name.as_str()), Some("newest"));

        let same_day = {
            let key = String::from("A1");
            repo.inspections_for(&key).count()
        };
        assert_eq!(same_day, 4);
    }

    #[test]
    fn test_orphaned_inspections() {
        let repo = sample_repo();
        let orphans: Vec<&str> = repo.orphaned_inspections().map(|r| r.asset_id.as_str()).collect();
        assert_eq!(orphans, vec!["X9"]);
    }

    #[test]
    fn test_describe_asset_falls_back_to_record_snapshot() {
        let repo = sample_repo();
        assert_eq!(repo.describe_asset("A1").location, "Lokasi A1");

        let orphan = repo.describe_asset("X9");
        assert_eq!(orphan.id, "X9");
        assert_eq!(orphan.location, "Lantai 2");

        let unknown = repo.describe_asset("nope");
        assert!(unknown.location.is_empty());
        assert!(!unknown.expiry_date.is_known());
    }

    #[test]
    fn test_append_and_replace() {
        let mut repo = HistoryRepository::new();
        repo.replace_assets(vec![asset("A1")]);
        repo.append_inspection(inspection("A1", "2024-01-01", "x"));
        assert_eq!(repo.inspections().len(), 1);

        repo.replace_inspections(Vec::new());
        assert!(repo.inspections().is_empty());
        assert_eq!(repo.assets().len(), 1);
    }
}
