//! Inspection status classification
//!
//! Pure, total functions: every well-typed record maps to exactly one
//! [`StatusCategory`], whatever state its dates are in.

use crate::model::InspectionRecord;
use crate::time::RecordDate;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Derived condition of an extinguisher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    Good,
    NeedsRepair,
    Expired,
    NotInspected,
}

impl StatusCategory {
    /// Badge text shown to inspectors
    pub fn label(self) -> &'static str {
        match self {
            StatusCategory::Good => "Baik",
            StatusCategory::NeedsRepair => "Perlu Perbaikan",
            StatusCategory::Expired => "Kadaluarsa",
            StatusCategory::NotInspected => "Belum Diperiksa",
        }
    }

    /// Parse a badge label back into a category
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Baik" => Some(StatusCategory::Good),
            "Perlu Perbaikan" => Some(StatusCategory::NeedsRepair),
            "Kadaluarsa" => Some(StatusCategory::Expired),
            "Belum Diperiksa" => Some(StatusCategory::NotInspected),
            _ => None,
        }
    }

    /// Whether the dashboard counts this as needing attention
    pub fn needs_attention(self) -> bool {
        matches!(self, StatusCategory::NeedsRepair | StatusCategory::Expired)
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Calendar-date expiry check
///
/// An expiry date that could not be read is treated as expired: the
/// extinguisher's validity cannot be confirmed.
pub fn is_expired(expiry: &RecordDate, today: NaiveDate) -> bool {
    match expiry.known() {
        Some(date) => date < today,
        None => true,
    }
}

/// Classify one inspection as of `today`
///
/// Expired outranks NeedsRepair. Only the eight structural components are
/// considered for NeedsRepair; the gauge never affects the result.
pub fn classify(record: &InspectionRecord, today: NaiveDate) -> StatusCategory {
    if is_expired(&record.expiry_date, today) {
        StatusCategory::Expired
    } else if record.components.has_bad_structural() {
        StatusCategory::NeedsRepair
    } else {
        StatusCategory::Good
    }
}

/// Classify the latest inspection of an asset, if there is one
pub fn classify_latest(latest: Option<&InspectionRecord>, today: NaiveDate) -> StatusCategory {
    latest.map_or(StatusCategory::NotInspected, |record| classify(record, today))
}
