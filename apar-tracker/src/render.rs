//! Plain-text rendering of derived view models

use apar_common::aggregation::{AssetHistory, AssetRow, DashboardCounts, InspectionStats};
use apar_common::{Asset, HistoryRepository, InspectionRecord};
use chrono::NaiveDate;
use std::fmt::Write;

pub fn dashboard(counts: &DashboardCounts) -> String {
    format!(
        "Total APAR:       {}\nBaik:             {}\nPerlu Perbaikan:  {}\nBelum Diperiksa:  {}\n",
        counts.total, counts.good, counts.need_repair, counts.not_inspected
    )
}

pub fn asset_table(rows: &[AssetRow]) -> String {
    let mut out = format!(
        "{:<14} {:<22} {:<10} {:<10} {:<12} {}\n",
        "QRCODE", "Lokasi", "Jenis", "Kapasitas", "Expired", "Status"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:<14} {:<22} {:<10} {:<10} {:<12} {}",
            row.asset.id,
            or_dash(&row.asset.location),
            or_dash(&row.asset.asset_type),
            or_dash(&row.asset.capacity),
            or_dash(&row.asset.expiry_date.to_string()),
            row.status
        );
    }
    out
}

pub fn asset(asset: &Asset) -> String {
    format!(
        "QRCODE:    {}\nLokasi:    {}\nJenis:     {}\nKapasitas: {}\nExpired:   {}\n",
        asset.id,
        or_dash(&asset.location),
        or_dash(&asset.asset_type),
        or_dash(&asset.capacity),
        or_dash(&asset.expiry_date.to_string())
    )
}

pub fn stats(stats: &InspectionStats) -> String {
    format!(
        "Pemeriksaan: {} (Baik {}, Perlu Perbaikan {}, Kadaluarsa {})\n",
        stats.total(),
        stats.good,
        stats.needs_repair,
        stats.expired
    )
}

/// One inspection as a history card
pub fn inspection(record: &InspectionRecord, today: NaiveDate) -> String {
    let mut out = format!("Pemeriksaan {}  [{}]", record.inspection_date, record.status(today));
    if !record.inspector_name.is_empty() {
        let _ = write!(out, "  Oleh: {}", record.inspector_name);
    }
    out.push('\n');

    let validity = if record.is_expired(today) {
        "(Kadaluarsa)"
    } else {
        "(Masih Berlaku)"
    };
    let _ = writeln!(out, "  Tanggal Expired: {} {}", or_dash(&record.expiry_date.to_string()), validity);

    for (component, check) in record.components.iter() {
        let _ = writeln!(out, "  {:<16} {}", format!("{}:", component.label()), check.label());
    }
    if let Some(notes) = &record.notes {
        let _ = writeln!(out, "  Keterangan: {}", notes);
    }
    out
}

pub fn history(asset_details: &Asset, records: &[InspectionRecord], today: NaiveDate) -> String {
    let mut out = asset(asset_details);
    if records.is_empty() {
        out.push_str("\nBelum ada riwayat pemeriksaan\n");
        return out;
    }
    out.push_str(&stats(&apar_common::aggregation::summarize(records, today)));
    for record in records {
        out.push('\n');
        out.push_str(&inspection(record, today));
    }
    out
}

/// Grouped history, most-inspected asset first
pub fn grouped_history(groups: &[AssetHistory], repository: &HistoryRepository, today: NaiveDate) -> String {
    if groups.is_empty() {
        return "Belum Ada Riwayat Pemeriksaan\n".to_string();
    }
    let mut out = String::new();
    for (index, group) in groups.iter().enumerate() {
        if index > 0 {
            out.push_str("\n----------------------------------------\n\n");
        }
        let details = repository.describe_asset(&group.asset_id);
        out.push_str(&history(&details, &group.inspections, today));
    }
    out
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}
