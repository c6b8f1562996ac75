//! Per-asset grouping and summary statistics
//!
//! All functions take immutable snapshots and never fail: records with
//! unreadable dates are ordered last rather than rejected.

use crate::model::{Asset, InspectionRecord};
use crate::status::{classify, classify_latest, StatusCategory};
use crate::time::RecordDate;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

/// Inspection records keyed by asset code, each list newest first
pub type AssetGroups = HashMap<String, Vec<InspectionRecord>>;

/// Status tally over a set of inspection records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InspectionStats {
    pub good: usize,
    pub needs_repair: usize,
    pub expired: usize,
}

impl InspectionStats {
    pub fn total(&self) -> usize {
        self.good + self.needs_repair + self.expired
    }

    /// Repair and expiry merged, as shown on the dashboard
    pub fn need_repair_merged(&self) -> usize {
        self.needs_repair + self.expired
    }
}

/// Fleet-wide dashboard counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardCounts {
    /// Registered assets
    pub total: usize,
    pub good: usize,
    /// Assets whose latest inspection is NeedsRepair or Expired
    pub need_repair: usize,
    pub not_inspected: usize,
}

/// One asset's history as shown in the grouped history view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetHistory {
    pub asset_id: String,
    /// Inspections newest first
    pub inspections: Vec<InspectionRecord>,
}

impl AssetHistory {
    pub fn latest(&self) -> Option<&InspectionRecord> {
        self.inspections.first()
    }

    pub fn stats(&self, today: NaiveDate) -> InspectionStats {
        summarize(&self.inspections, today)
    }
}

/// One row of the asset table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetRow {
    pub asset: Asset,
    pub status: StatusCategory,
    pub inspection_count: usize,
}

/// Sort a history given in append order newest first
///
/// Among equal dates the later-appended record comes first.
pub fn sort_newest_first(records: &mut [InspectionRecord]) {
    records.reverse();
    records.sort_by(|a, b| RecordDate::newest_first(&a.inspection_date, &b.inspection_date));
}

/// Group records by asset code, each group newest first
pub fn group_by_asset(records: &[InspectionRecord]) -> AssetGroups {
    let mut groups: AssetGroups = HashMap::new();
    for record in records {
        groups
            .entry(record.asset_id.clone())
            .or_default()
            .push(record.clone());
    }
    for history in groups.values_mut() {
        sort_newest_first(history);
    }
    groups
}

/// Grouped history ordered for display: most-inspected assets first,
/// ties broken by asset code
pub fn grouped_for_display(records: &[InspectionRecord]) -> Vec<AssetHistory> {
    let mut histories: Vec<AssetHistory> = group_by_asset(records)
        .into_iter()
        .map(|(asset_id, inspections)| AssetHistory { asset_id, inspections })
        .collect();
    histories.sort_by(|a, b| {
        b.inspections
            .len()
            .cmp(&a.inspections.len())
            .then_with(|| a.asset_id.cmp(&b.asset_id))
    });
    histories
}

/// Classify every record and tally the results
pub fn summarize(records: &[InspectionRecord], today: NaiveDate) -> InspectionStats {
    records
        .iter()
        .fold(InspectionStats::default(), |mut stats, record| {
            match classify(record, today) {
                StatusCategory::Good => stats.good += 1,
                StatusCategory::NeedsRepair => stats.needs_repair += 1,
                StatusCategory::Expired => stats.expired += 1,
                // classify never yields this for an existing record
                StatusCategory::NotInspected => {}
            }
            stats
        })
}

/// Status of an asset's most recent inspection
pub fn latest_status(groups: &AssetGroups, asset_id: &str, today: NaiveDate) -> StatusCategory {
    let latest = groups.get(asset_id).and_then(|history| history.first());
    classify_latest(latest, today)
}

/// Dashboard counters over the registered assets
pub fn dashboard(assets: &[Asset], groups: &AssetGroups, today: NaiveDate) -> DashboardCounts {
    let mut counts = DashboardCounts {
        total: assets.len(),
        ..Default::default()
    };
    for asset in assets {
        match latest_status(groups, &asset.id, today) {
            StatusCategory::Good => counts.good += 1,
            StatusCategory::NeedsRepair | StatusCategory::Expired => counts.need_repair += 1,
            StatusCategory::NotInspected => counts.not_inspected += 1,
        }
    }
    counts
}

/// Asset table rows in asset order
pub fn asset_rows(assets: &[Asset], groups: &AssetGroups, today: NaiveDate) -> Vec<AssetRow> {
    assets
        .iter()
        .map(|asset| AssetRow {
            asset: asset.clone(),
            status: latest_status(groups, &asset.id, today),
            inspection_count: groups.get(&asset.id).map_or(0, Vec::len),
        })
        .collect()
}
