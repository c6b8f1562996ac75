//! Asset and inspection record types
//!
//! These are the strict internal shapes. Remote payloads are converted into
//! them at the adapter boundary; nothing past that point handles untyped maps.

use crate::status::{self, StatusCategory};
use crate::time::RecordDate;
use chrono::NaiveDate;
use serde::Serialize;

/// A registered fire extinguisher, identified by the code printed on its QR label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Asset {
    /// Unique code (the QR payload)
    pub id: String,
    pub location: String,
    #[serde(rename = "type")]
    pub asset_type: String,
    pub capacity: String,
    /// Expiry date as registered in the asset master data
    pub expiry_date: RecordDate,
}

/// Condition of one physical part of an extinguisher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentCheck {
    Good,
    Bad,
    Absent,
}

impl ComponentCheck {
    /// Display label shown on checklists and history cards
    pub fn label(self) -> &'static str {
        match self {
            ComponentCheck::Good => "Baik",
            ComponentCheck::Bad => "Tidak Baik",
            ComponentCheck::Absent => "Tidak Ada",
        }
    }

    /// Parse a checklist form token
    ///
    /// Accepts the form's option values (`baik`, `tidak-baik`, `tidak-ada`)
    /// and their English equivalents. Returns `None` for anything else.
    pub fn from_form_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "baik" | "good" => Some(ComponentCheck::Good),
            "tidak-baik" | "tidak baik" | "bad" => Some(ComponentCheck::Bad),
            "tidak-ada" | "tidak ada" | "absent" => Some(ComponentCheck::Absent),
            _ => None,
        }
    }
}

/// The nine checklist items of an extinguisher inspection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    Seal,
    Handle,
    Tank,
    Label,
    Hose,
    Nozzle,
    Gauge,
    Bracket,
    Sign,
}

impl Component {
    /// All components in checklist order
    pub const ALL: [Component; 9] = [
        Component::Seal,
        Component::Handle,
        Component::Tank,
        Component::Label,
        Component::Hose,
        Component::Nozzle,
        Component::Gauge,
        Component::Bracket,
        Component::Sign,
    ];

    /// Components that decide whether an extinguisher needs repair.
    /// The gauge is informational and not part of this set.
    pub const STRUCTURAL: [Component; 8] = [
        Component::Seal,
        Component::Handle,
        Component::Tank,
        Component::Label,
        Component::Hose,
        Component::Nozzle,
        Component::Bracket,
        Component::Sign,
    ];

    /// Human-readable label used on forms and in validation messages
    pub fn label(self) -> &'static str {
        match self {
            Component::Seal => "Segel/Pin",
            Component::Handle => "Handle/Tuas",
            Component::Tank => "Tabung",
            Component::Label => "Label/Stiker",
            Component::Hose => "Selang/Hose",
            Component::Nozzle => "Nozzle/Corong",
            Component::Gauge => "Manometer",
            Component::Bracket => "Bracket/Dudukan",
            Component::Sign => "Rambu/Tanda",
        }
    }
}

/// Checklist results for one inspection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Components {
    pub seal: ComponentCheck,
    pub handle: ComponentCheck,
    pub tank: ComponentCheck,
    pub label: ComponentCheck,
    pub hose: ComponentCheck,
    pub nozzle: ComponentCheck,
    pub gauge: ComponentCheck,
    pub bracket: ComponentCheck,
    pub sign: ComponentCheck,
}

impl Components {
    /// Every structural component good, no gauge fitted
    pub fn all_good() -> Self {
        Self {
            seal: ComponentCheck::Good,
            handle: ComponentCheck::Good,
            tank: ComponentCheck::Good,
            label: ComponentCheck::Good,
            hose: ComponentCheck::Good,
            nozzle: ComponentCheck::Good,
            gauge: ComponentCheck::Absent,
            bracket: ComponentCheck::Good,
            sign: ComponentCheck::Good,
        }
    }

    pub fn get(&self, component: Component) -> ComponentCheck {
        match component {
            Component::Seal => self.seal,
            Component::Handle => self.handle,
            Component::Tank => self.tank,
            Component::Label => self.label,
            Component::Hose => self.hose,
            Component::Nozzle => self.nozzle,
            Component::Gauge => self.gauge,
            Component::Bracket => self.bracket,
            Component::Sign => self.sign,
        }
    }

    pub fn set(&mut self, component: Component, check: ComponentCheck) {
        let slot = match component {
            Component::Seal => &mut self.seal,
            Component::Handle => &mut self.handle,
            Component::Tank => &mut self.tank,
            Component::Label => &mut self.label,
            Component::Hose => &mut self.hose,
            Component::Nozzle => &mut self.nozzle,
            Component::Gauge => &mut self.gauge,
            Component::Bracket => &mut self.bracket,
            Component::Sign => &mut self.sign,
        };
        *slot = check;
    }

    /// Builder-style variant of [`Components::set`]
    pub fn with(mut self, component: Component, check: ComponentCheck) -> Self {
        self.set(component, check);
        self
    }

    /// Checklist items in form order paired with their results
    pub fn iter(&self) -> impl Iterator<Item = (Component, ComponentCheck)> + '_ {
        Component::ALL.iter().map(move |c| (*c, self.get(*c)))
    }

    /// True if any structural (non-gauge) component is `Bad`
    pub fn has_bad_structural(&self) -> bool {
        Component::STRUCTURAL
            .iter()
            .any(|c| self.get(*c) == ComponentCheck::Bad)
    }
}

/// One checklist submission for an asset. Append-only once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectionRecord {
    pub asset_id: String,
    pub inspection_date: RecordDate,
    pub inspector_name: String,
    /// Expiry date written on the extinguisher at inspection time
    pub expiry_date: RecordDate,
    /// Asset location at inspection time
    pub location: String,
    #[serde(rename = "type")]
    pub asset_type: String,
    pub capacity: String,
    pub components: Components,
    pub notes: Option<String>,
    /// Status stored with the record, if the store provided a recognisable one.
    /// Always recomputable via [`InspectionRecord::status`].
    pub recorded_status: Option<StatusCategory>,
}

impl InspectionRecord {
    /// Expiry check against a calendar date; unknown expiry counts as expired
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        status::is_expired(&self.expiry_date, today)
    }

    /// Derived status as of `today`
    pub fn status(&self, today: NaiveDate) -> StatusCategory {
        status::classify(self, today)
    }
}
