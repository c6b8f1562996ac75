//! Spreadsheet row schema and field mapping
//!
//! The remote sheets use their own column names and Indonesian value tokens.
//! This module is the only place those names appear; everything it returns
//! is an internal [`Asset`] or [`InspectionRecord`].

use apar_common::{Asset, Component, ComponentCheck, InspectionRecord, RecordDate, StatusCategory};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// Written for a good component
pub const GOOD_TOKEN: &str = "Baik";
/// Written for a bad component
pub const BAD_TOKEN: &str = "Tidak Baik";
/// Written for a missing gauge
pub const ABSENT_TOKEN: &str = "Tidak Ada";

/// Inspector name written when the form left it blank
const UNKNOWN_INSPECTOR: &str = "Tidak Diketahui";

/// Asset master row
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetRow {
    #[serde(rename = "QRCODE", default, deserialize_with = "cell")]
    pub qrcode: Option<String>,
    #[serde(rename = "Lokasi", default, deserialize_with = "cell")]
    pub lokasi: Option<String>,
    #[serde(rename = "Jenis", default, deserialize_with = "cell")]
    pub jenis: Option<String>,
    #[serde(rename = "Kapasitas", default, deserialize_with = "cell")]
    pub kapasitas: Option<String>,
    #[serde(rename = "Expired", default, deserialize_with = "cell")]
    pub expired: Option<String>,
}

/// Inspection history row
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InspectionRow {
    #[serde(rename = "QRCODE", default, deserialize_with = "cell")]
    pub qrcode: Option<String>,
    #[serde(rename = "Tanggal_Pemeriksaan", default, deserialize_with = "cell")]
    pub tanggal_pemeriksaan: Option<String>,
    #[serde(rename = "Nama_Pemeriksa", default, deserialize_with = "cell")]
    pub nama_pemeriksa: Option<String>,
    #[serde(rename = "Tanggal_Expired", default, deserialize_with = "cell")]
    pub tanggal_expired: Option<String>,
    #[serde(rename = "Lokasi", default, deserialize_with = "cell")]
    pub lokasi: Option<String>,
    #[serde(rename = "Jenis", default, deserialize_with = "cell")]
    pub jenis: Option<String>,
    #[serde(rename = "Kapasitas", default, deserialize_with = "cell")]
    pub kapasitas: Option<String>,
    #[serde(rename = "Segel_Pin", default, deserialize_with = "cell")]
    pub segel_pin: Option<String>,
    #[serde(rename = "Handle_Tuas", default, deserialize_with = "cell")]
    pub handle_tuas: Option<String>,
    #[serde(rename = "Tabung", default, deserialize_with = "cell")]
    pub tabung: Option<String>,
    #[serde(rename = "Label_Stiker", default, deserialize_with = "cell")]
    pub label_stiker: Option<String>,
    #[serde(rename = "Selang_Hose", default, deserialize_with = "cell")]
    pub selang_hose: Option<String>,
    #[serde(rename = "Nozzle_Corong", default, deserialize_with = "cell")]
    pub nozzle_corong: Option<String>,
    #[serde(rename = "Manometer", default, deserialize_with = "cell")]
    pub manometer: Option<String>,
    #[serde(rename = "Bracket_Dudukan", default, deserialize_with = "cell")]
    pub bracket_dudukan: Option<String>,
    #[serde(rename = "Rambu_Tanda", default, deserialize_with = "cell")]
    pub rambu_tanda: Option<String>,
    #[serde(rename = "Keterangan", default, deserialize_with = "cell")]
    pub keterangan: Option<String>,
    #[serde(rename = "Status", default, deserialize_with = "cell")]
    pub status: Option<String>,
}

/// Sheet cells arrive as strings, numbers or booleans depending on how the
/// cell was typed; blank cells are null or missing
fn cell<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn text(value: Option<String>) -> String {
    value.map(|s| s.trim().to_string()).unwrap_or_default()
}

impl AssetRow {
    /// Convert to an internal asset; rows without a code are rejected
    pub fn into_asset(self) -> Option<Asset> {
        let id = text(self.qrcode);
        if id.is_empty() {
            return None;
        }
        Some(Asset {
            id,
            location: text(self.lokasi),
            asset_type: text(self.jenis),
            capacity: text(self.kapasitas),
            expiry_date: RecordDate::parse(&text(self.expired)),
        })
    }
}

impl InspectionRow {
    /// Convert to an internal record; rows without an asset code are rejected
    pub fn into_record(self) -> Option<InspectionRecord> {
        let asset_id = text(self.qrcode);
        if asset_id.is_empty() {
            return None;
        }

        let mut components = apar_common::Components::all_good();
        let structural = [
            (Component::Seal, self.segel_pin),
            (Component::Handle, self.handle_tuas),
            (Component::Tank, self.tabung),
            (Component::Label, self.label_stiker),
            (Component::Hose, self.selang_hose),
            (Component::Nozzle, self.nozzle_corong),
            (Component::Bracket, self.bracket_dudukan),
            (Component::Sign, self.rambu_tanda),
        ];
        for (component, value) in structural {
            components.set(component, decode_component(value.as_deref()));
        }
        components.gauge = decode_gauge(self.manometer.as_deref());

        let notes = text(self.keterangan);

        Some(InspectionRecord {
            asset_id,
            inspection_date: RecordDate::parse(&text(self.tanggal_pemeriksaan)),
            inspector_name: text(self.nama_pemeriksa),
            expiry_date: RecordDate::parse(&text(self.tanggal_expired)),
            location: text(self.lokasi),
            asset_type: text(self.jenis),
            capacity: text(self.kapasitas),
            components,
            notes: (!notes.is_empty()).then_some(notes),
            recorded_status: self.status.as_deref().and_then(StatusCategory::from_label),
        })
    }
}

/// Decode a structural component cell; anything but "Baik" is bad
pub fn decode_component(value: Option<&str>) -> ComponentCheck {
    match value.map(str::trim) {
        Some(GOOD_TOKEN) => ComponentCheck::Good,
        _ => ComponentCheck::Bad,
    }
}

/// Decode the gauge cell; unrecognised or missing means no gauge
pub fn decode_gauge(value: Option<&str>) -> ComponentCheck {
    match value.map(str::trim) {
        Some(GOOD_TOKEN) => ComponentCheck::Good,
        Some(BAD_TOKEN) => ComponentCheck::Bad,
        _ => ComponentCheck::Absent,
    }
}

/// Encode a structural component; only good is written as "Baik"
pub fn encode_component(check: ComponentCheck) -> &'static str {
    match check {
        ComponentCheck::Good => GOOD_TOKEN,
        ComponentCheck::Bad | ComponentCheck::Absent => BAD_TOKEN,
    }
}

/// Encode the gauge
pub fn encode_gauge(check: ComponentCheck) -> &'static str {
    match check {
        ComponentCheck::Good => GOOD_TOKEN,
        ComponentCheck::Bad => BAD_TOKEN,
        ComponentCheck::Absent => ABSENT_TOKEN,
    }
}

/// Write-side key for a component column
fn write_key(component: Component) -> &'static str {
    match component {
        Component::Seal => "segel_pin",
        Component::Handle => "handle_tuas",
        Component::Tank => "tabung",
        Component::Label => "label_stiker",
        Component::Hose => "selang_hose",
        Component::Nozzle => "nozzle_corong",
        Component::Gauge => "manometer",
        Component::Bracket => "bracket_dudukan",
        Component::Sign => "rambu_tanda",
    }
}

/// Form-encoded body for a new inspection
///
/// The status column carries the record's stored status, falling back to
/// a fresh classification as of today.
pub fn inspection_form_fields(record: &InspectionRecord) -> Vec<(&'static str, String)> {
    let inspector = if record.inspector_name.trim().is_empty() {
        UNKNOWN_INSPECTOR.to_string()
    } else {
        record.inspector_name.clone()
    };
    let status = record
        .recorded_status
        .unwrap_or_else(|| record.status(apar_common::time::today()));

    let mut fields = vec![
        ("qr_code", record.asset_id.clone()),
        ("tanggal_pemeriksaan", record.inspection_date.to_string()),
        ("nama_pemeriksa", inspector),
        ("tanggal_expired", record.expiry_date.to_string()),
        ("lokasi", record.location.clone()),
        ("jenis", record.asset_type.clone()),
        ("kapasitas", record.capacity.clone()),
    ];
    for (component, check) in record.components.iter() {
        let token = if component == Component::Gauge {
            encode_gauge(check)
        } else {
            encode_component(check)
        };
        fields.push((write_key(component), token.to_string()));
    }
    fields.push(("keterangan", record.notes.clone().unwrap_or_default()));
    fields.push(("status", status.label().to_string()));
    fields
}

/// Parse a bulk asset response body
///
/// A body that is not an array yields no assets. Rows that are not objects
/// or have no code are skipped.
pub fn parse_asset_list(body: Value) -> Vec<Asset> {
    rows_of(body, "asset")
        .filter_map(|row| row_as::<AssetRow>(row, "asset").and_then(AssetRow::into_asset))
        .collect()
}

/// Parse a single-asset lookup body; `None` when it carries no code
pub fn parse_single_asset(body: Value) -> Option<Asset> {
    if !body.is_object() {
        return None;
    }
    row_as::<AssetRow>(body, "asset").and_then(AssetRow::into_asset)
}

/// Parse an inspection history body, skipping rows that cannot be grouped
pub fn parse_inspection_list(body: Value) -> Vec<InspectionRecord> {
    rows_of(body, "inspection")
        .filter_map(|row| {
            let record = row_as::<InspectionRow>(row, "inspection")?.into_record();
            if record.is_none() {
                warn!("Skipping inspection row without QRCODE");
            }
            record
        })
        .collect()
}

fn rows_of(body: Value, kind: &'static str) -> impl Iterator<Item = Value> {
    let rows = match body {
        Value::Array(rows) => rows,
        other => {
            warn!(kind, body_type = json_type(&other), "No {} data found or data is not an array", kind);
            Vec::new()
        }
    };
    rows.into_iter()
}

fn row_as<T: for<'de> Deserialize<'de>>(row: Value, kind: &'static str) -> Option<T> {
    match serde_json::from_value(row) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!(kind, error = %e, "Skipping malformed {} row", kind);
            None
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
