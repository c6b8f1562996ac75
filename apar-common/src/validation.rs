//! Checklist validation
//!
//! Gates a submitted inspection form before it is turned into a record.
//! Validation stops at the first missing field, in form order.

use crate::error::ValidationError;
use crate::model::{Asset, Component, ComponentCheck, Components, InspectionRecord};
use crate::status::classify;
use crate::time::RecordDate;
use chrono::{Months, NaiveDate};
use tracing::debug;

/// Label for the inspection date field
pub const INSPECTION_DATE_LABEL: &str = "Tanggal Pemeriksaan";
/// Label for the expiry date field
pub const EXPIRY_DATE_LABEL: &str = "Tanggal Expired";
/// Label for the inspector name field
pub const INSPECTOR_LABEL: &str = "Nama Pemeriksa";

/// Raw checklist input as typed or selected by the inspector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InspectionForm {
    pub inspection_date: Option<String>,
    pub expiry_date: Option<String>,
    pub seal: Option<String>,
    pub handle: Option<String>,
    pub tank: Option<String>,
    pub label: Option<String>,
    pub hose: Option<String>,
    pub nozzle: Option<String>,
    pub gauge: Option<String>,
    pub bracket: Option<String>,
    pub sign: Option<String>,
    pub inspector_name: Option<String>,
    pub notes: Option<String>,
}

impl InspectionForm {
    /// Blank checklist as it opens: inspected today, expiring a year from today
    pub fn prefilled(today: NaiveDate) -> Self {
        let expiry = today.checked_add_months(Months::new(12)).unwrap_or(today);
        Self {
            inspection_date: Some(today.format("%Y-%m-%d").to_string()),
            expiry_date: Some(expiry.format("%Y-%m-%d").to_string()),
            ..Default::default()
        }
    }

    /// Raw value of one component field
    pub fn component(&self, component: Component) -> Option<&str> {
        let value = match component {
            Component::Seal => &self.seal,
            Component::Handle => &self.handle,
            Component::Tank => &self.tank,
            Component::Label => &self.label,
            Component::Hose => &self.hose,
            Component::Nozzle => &self.nozzle,
            Component::Gauge => &self.gauge,
            Component::Bracket => &self.bracket,
            Component::Sign => &self.sign,
        };
        value.as_deref()
    }

    /// Set one component field from a raw token
    pub fn set_component(&mut self, component: Component, value: impl Into<String>) {
        let value = Some(value.into());
        match component {
            Component::Seal => self.seal = value,
            Component::Handle => self.handle = value,
            Component::Tank => self.tank = value,
            Component::Label => self.label = value,
            Component::Hose => self.hose = value,
            Component::Nozzle => self.nozzle = value,
            Component::Gauge => self.gauge = value,
            Component::Bracket => self.bracket = value,
            Component::Sign => self.sign = value,
        }
    }
}

/// A checklist that passed validation, bound to the selected asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidInspection {
    pub asset: Asset,
    pub inspection_date: RecordDate,
    pub expiry_date: RecordDate,
    pub components: Components,
    pub inspector_name: String,
    pub notes: Option<String>,
}

impl ValidInspection {
    /// Build the stored record, snapshotting asset details and the status as of `today`
    pub fn into_record(self, today: NaiveDate) -> InspectionRecord {
        let mut record = InspectionRecord {
            asset_id: self.asset.id,
            inspection_date: self.inspection_date,
            inspector_name: self.inspector_name,
            expiry_date: self.expiry_date,
            location: self.asset.location,
            asset_type: self.asset.asset_type,
            capacity: self.asset.capacity,
            components: self.components,
            notes: self.notes,
            recorded_status: None,
        };
        record.recorded_status = Some(classify(&record, today));
        record
    }
}

/// Validate a checklist for the currently selected asset
///
/// Required fields are checked in form order: inspection date, expiry date,
/// the eight structural components, inspector name. Blank or whitespace-only
/// values count as missing. The asset selection is checked last.
pub fn validate(
    form: &InspectionForm,
    selected: Option<&Asset>,
) -> Result<ValidInspection, ValidationError> {
    let inspection_date = required(form.inspection_date.as_deref(), INSPECTION_DATE_LABEL)?;
    let expiry_date = required(form.expiry_date.as_deref(), EXPIRY_DATE_LABEL)?;

    let mut components = Components::all_good();
    for component in Component::STRUCTURAL {
        let token = required(form.component(component), component.label())?;
        components.set(component, structural_check(component, token));
    }
    components.gauge = gauge_check(form.gauge.as_deref());

    let inspector_name = required(form.inspector_name.as_deref(), INSPECTOR_LABEL)?;

    let asset = selected.ok_or(ValidationError::NoAssetSelected)?;

    let notes = form
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|notes| !notes.is_empty())
        .map(str::to_string);

    Ok(ValidInspection {
        asset: asset.clone(),
        inspection_date: RecordDate::parse(inspection_date),
        expiry_date: RecordDate::parse(expiry_date),
        components,
        inspector_name: inspector_name.to_string(),
        notes,
    })
}

fn required<'a>(value: Option<&'a str>, label: &'static str) -> Result<&'a str, ValidationError> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ValidationError::MissingField(label)),
    }
}

/// Structural components are good or bad; anything unrecognised counts as bad
fn structural_check(component: Component, token: &str) -> ComponentCheck {
    match ComponentCheck::from_form_token(token) {
        Some(ComponentCheck::Good) => ComponentCheck::Good,
        Some(ComponentCheck::Bad) => ComponentCheck::Bad,
        other => {
            debug!(component = component.label(), token, ?other, "Unexpected component value, treating as bad");
            ComponentCheck::Bad
        }
    }
}

/// Gauge is optional; missing or unrecognised means no gauge fitted
fn gauge_check(token: Option<&str>) -> ComponentCheck {
    token
        .and_then(ComponentCheck::from_form_token)
        .unwrap_or(ComponentCheck::Absent)
}
