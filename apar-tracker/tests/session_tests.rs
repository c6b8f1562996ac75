//! Integration tests for the inspection session and CLI commands
//!
//! Uses an in-memory store so failures can be switched on per call type.

use apar_common::validation::InspectionForm;
use apar_common::{
    Asset, Component, ComponentCheck, Components, Error, InspectionRecord, NetworkError, RecordDate,
    Result, StatusCategory, ValidationError,
};
use apar_tracker::cli::{execute, Command, InspectArgs};
use apar_tracker::config::{RemoteTimeouts, TrackerConfig};
use apar_tracker::remote::{Ack, RemoteStore};
use apar_tracker::scanner::{LineScanner, StaticScanner};
use apar_tracker::session::InspectionSession;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
struct MemoryStore {
    assets: Vec<Asset>,
    inspections: Mutex<Vec<InspectionRecord>>,
    fail_assets: AtomicBool,
    fail_history: AtomicBool,
    /// Number of upcoming single-asset lookups to fail
    fail_lookups: AtomicUsize,
    submissions: Mutex<Vec<InspectionRecord>>,
}

impl MemoryStore {
    fn with_fleet() -> Self {
        Self {
            assets: vec![asset("A1", "Lobby"), asset("A2", "Dapur"), asset("A3", "Parkir")],
            inspections: Mutex::new(vec![
                record("A1", "2024-01-10", "2030-01-01", Components::all_good()),
                record(
                    "A2",
                    "2024-01-12",
                    "2030-01-01",
                    Components::all_good().with(Component::Hose, ComponentCheck::Bad),
                ),
                record("A1", "2023-06-01", "2030-01-01", Components::all_good()),
            ]),
            ..Default::default()
        }
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn fetch_asset(&self, id: &str) -> Result<Asset> {
        let failing = self
            .fail_lookups
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(NetworkError::ConnectionFailed("connection reset".to_string()).into());
        }

        let id = id.trim();
        self.assets
            .iter()
            .find(|asset| asset.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn fetch_all_assets(&self) -> Result<Vec<Asset>> {
        if self.fail_assets.load(Ordering::SeqCst) {
            return Err(NetworkError::HttpStatus(502).into());
        }
        Ok(self.assets.clone())
    }

    async fn fetch_all_inspections(&self) -> Result<Vec<InspectionRecord>> {
        if self.fail_history.load(Ordering::SeqCst) {
            return Err(NetworkError::Timeout(Duration::from_secs(15)).into());
        }
        Ok(self.inspections.lock().unwrap().clone())
    }

    async fn submit_inspection(&self, record: &InspectionRecord) -> Result<Ack> {
        self.submissions.lock().unwrap().push(record.clone());
        self.inspections.lock().unwrap().push(record.clone());
        Ok(Ack {
            status: 200,
            body: None,
        })
    }
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn asset(id: &str, location: &str) -> Asset {
    Asset {
        id: id.to_string(),
        location: location.to_string(),
        asset_type: "Powder".to_string(),
        capacity: "3 kg".to_string(),
        expiry_date: RecordDate::parse("2030-01-01"),
    }
}

fn record(asset_id: &str, date: &str, expiry: &str, components: Components) -> InspectionRecord {
    InspectionRecord {
        asset_id: asset_id.to_string(),
        inspection_date: RecordDate::parse(date),
        inspector_name: "Andi".to_string(),
        expiry_date: RecordDate::parse(expiry),
        location: String::new(),
        asset_type: String::new(),
        capacity: String::new(),
        components,
        notes: None,
        recorded_status: None,
    }
}

fn complete_form(today: NaiveDate) -> InspectionForm {
    let mut form = InspectionForm::prefilled(today);
    for component in Component::STRUCTURAL {
        form.set_component(component, "baik");
    }
    form.inspector_name = Some("Wati".to_string());
    form
}

fn config() -> TrackerConfig {
    TrackerConfig {
        read_url: "http://127.0.0.1:9/read".to_string(),
        write_url: "http://127.0.0.1:9/write".to_string(),
        share_base_url: Some("https://apar.example/app/".to_string()),
        timeouts: RemoteTimeouts::default(),
        log_level: "info".to_string(),
    }
}

async fn run_command(
    session: &mut InspectionSession<MemoryStore>,
    command: Command,
    scanner_input: &str,
    json: bool,
) -> anyhow::Result<String> {
    let mut scanner = StaticScanner::new(scanner_input);
    let mut out = Vec::new();
    execute(session, &command, &config(), &mut scanner, ymd(2024, 2, 1), json, &mut out).await?;
    Ok(String::from_utf8(out).unwrap())
}

// =============================================================================
// Loading
// =============================================================================

#[tokio::test]
async fn test_load_all_builds_dashboard() {
    let mut session = InspectionSession::new(MemoryStore::with_fleet());
    let summary = session.load_all().await.unwrap();

    assert_eq!(summary.assets, 3);
    assert_eq!(summary.inspections, 3);
    assert!(!summary.history_degraded);

    let counts = session.dashboard(ymd(2024, 2, 1));
    assert_eq!((counts.total, counts.good, counts.need_repair, counts.not_inspected), (3, 1, 1, 1));
}

#[tokio::test]
async fn test_history_failure_degrades_to_empty() {
    let store = MemoryStore::with_fleet();
    store.fail_history.store(true, Ordering::SeqCst);
    let mut session = InspectionSession::new(store);

    let summary = session.load_all().await.unwrap();
    assert!(summary.history_degraded);
    assert_eq!(summary.inspections, 0);
    assert_eq!(session.dashboard(ymd(2024, 2, 1)).not_inspected, 3);
}

#[tokio::test]
async fn test_asset_failure_keeps_previous_snapshot() {
    let mut session = InspectionSession::new(MemoryStore::with_fleet());
    session.load_all().await.unwrap();

    session.store().fail_assets.store(true, Ordering::SeqCst);
    let err = session.load_all().await.unwrap_err();
    assert!(matches!(err, Error::Network(NetworkError::HttpStatus(502))));
    assert_eq!(session.repository().assets().len(), 3);
    assert_eq!(session.repository().inspections().len(), 3);
}

// =============================================================================
// Selection
// =============================================================================

#[tokio::test]
async fn test_failed_lookup_keeps_selection() {
    let mut session = InspectionSession::new(MemoryStore::with_fleet());
    session.select_by_code("A2").await.unwrap();

    let err = session.select_by_code("A9").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(ref code) if code == "A9"));
    assert_eq!(session.selected().map(|a| a.id.as_str()), Some("A2"));
}

#[tokio::test]
async fn test_scan_link_selects_asset() {
    let mut session = InspectionSession::new(MemoryStore::with_fleet());
    let mut scanner = StaticScanner::new("https://apar.example/app/?qrcode=A3");

    let selected = session.scan_and_select(&mut scanner).await.unwrap();
    assert_eq!(selected.map(|a| a.location.as_str()), Some("Parkir"));

    // Scanner is exhausted; cancelling leaves the selection alone
    assert!(session.scan_and_select(&mut scanner).await.unwrap().is_none());
    assert_eq!(session.selected().map(|a| a.id.as_str()), Some("A3"));
}

// =============================================================================
// Submission
// =============================================================================

#[tokio::test]
async fn test_submit_without_selection_is_rejected() {
    let mut session = InspectionSession::new(MemoryStore::with_fleet());
    let today = ymd(2024, 2, 1);

    let err = session.submit(&complete_form(today), today).await.unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::NoAssetSelected)));
    assert!(session.store().submissions.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_field_keeps_selection() {
    let mut session = InspectionSession::new(MemoryStore::with_fleet());
    let today = ymd(2024, 2, 1);
    session.select_by_code("A1").await.unwrap();

    let mut form = complete_form(today);
    form.inspector_name = Some("  ".to_string());
    let err = session.submit(&form, today).await.unwrap_err();

    assert_eq!(err.to_string(), "Harap isi field: Nama Pemeriksa");
    assert!(session.selected().is_some());
}

#[tokio::test]
async fn test_submit_refreshes_history_and_clears_selection() {
    let mut session = InspectionSession::new(MemoryStore::with_fleet());
    let today = ymd(2024, 2, 1);
    session.load_all().await.unwrap();
    session.select_by_code("A3").await.unwrap();

    let record = session.submit(&complete_form(today), today).await.unwrap();
    assert_eq!(record.asset_id, "A3");
    assert_eq!(record.location, "Parkir");
    assert_eq!(record.recorded_status, Some(StatusCategory::Good));
    assert!(session.selected().is_none());

    assert_eq!(session.history_for("A3"), vec![record]);
    assert_eq!(session.dashboard(today).not_inspected, 0);
}

#[tokio::test]
async fn test_submit_keeps_local_copy_when_refresh_fails() {
    let mut session = InspectionSession::new(MemoryStore::with_fleet());
    let today = ymd(2024, 2, 1);
    session.load_all().await.unwrap();
    session.select_by_code("A3").await.unwrap();
    session.store().fail_history.store(true, Ordering::SeqCst);

    session.submit(&complete_form(today), today).await.unwrap();
    assert_eq!(session.repository().inspections().len(), 4);
    assert_eq!(session.stats_for("A3", today).good, 1);
}

// =============================================================================
// Commands
// =============================================================================

#[tokio::test]
async fn test_dashboard_command_text() {
    let mut session = InspectionSession::new(MemoryStore::with_fleet());
    let out = run_command(&mut session, Command::Dashboard, "", false).await.unwrap();
    assert!(out.contains("Total APAR:       3"));
    assert!(out.contains("Belum Diperiksa:  1"));
}

#[tokio::test]
async fn test_assets_command_json() {
    let mut session = InspectionSession::new(MemoryStore::with_fleet());
    let out = run_command(&mut session, Command::Assets, "", true).await.unwrap();
    let rows: Value = serde_json::from_str(&out).unwrap();
    let rows = rows.as_array().unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["asset"]["id"], "A1");
    assert_eq!(rows[0]["inspection_count"], 2);
}

#[tokio::test]
async fn test_grouped_history_command_orders_by_count() {
    let mut session = InspectionSession::new(MemoryStore::with_fleet());
    let out = run_command(&mut session, Command::History { code: None }, "", false)
        .await
        .unwrap();

    let first_a1 = out.find("QRCODE:    A1").unwrap();
    let first_a2 = out.find("QRCODE:    A2").unwrap();
    assert!(first_a1 < first_a2);
    assert!(out.contains("Pemeriksaan: 2 (Baik 2, Perlu Perbaikan 0, Kadaluarsa 0)"));
}

#[tokio::test]
async fn test_inspect_command_submits() {
    let mut session = InspectionSession::new(MemoryStore::with_fleet());
    let args = InspectArgs {
        code: "A2".to_string(),
        seal: Some("baik".to_string()),
        handle: Some("baik".to_string()),
        tank: Some("baik".to_string()),
        label: Some("baik".to_string()),
        hose: Some("baik".to_string()),
        nozzle: Some("tidak-baik".to_string()),
        bracket: Some("baik".to_string()),
        sign: Some("baik".to_string()),
        inspector: Some("Yusuf".to_string()),
        ..Default::default()
    };

    let out = run_command(&mut session, Command::Inspect(args), "", false).await.unwrap();
    assert!(out.starts_with("Data pemeriksaan berhasil disimpan!"));
    assert!(out.contains("[Perlu Perbaikan]"));

    let submissions = session.store().submissions.lock().unwrap();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].inspection_date, RecordDate::from(ymd(2024, 2, 1)));
    assert_eq!(submissions[0].expiry_date, RecordDate::from(ymd(2025, 2, 1)));
}

#[tokio::test]
async fn test_inspect_command_reports_missing_field() {
    let mut session = InspectionSession::new(MemoryStore::with_fleet());
    let args = InspectArgs {
        code: "A2".to_string(),
        ..Default::default()
    };

    let err = run_command(&mut session, Command::Inspect(args), "", false)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Harap isi field: Segel/Pin");
}

#[tokio::test]
async fn test_scan_command_reports_unknown_code_and_continues() {
    let mut session = InspectionSession::new(MemoryStore::with_fleet());
    let out = run_command(&mut session, Command::Scan, "A404", false).await.unwrap();
    assert_eq!(out, "Data tidak ditemukan untuk QRCODE: A404\n");
}

#[tokio::test]
async fn test_scan_command_resumes_after_network_error() {
    let store = MemoryStore::with_fleet();
    store.fail_lookups.store(1, Ordering::SeqCst);
    let mut session = InspectionSession::new(store);
    let mut scanner = LineScanner::new(&b"A1\nA2\n"[..]);
    let mut out = Vec::new();

    execute(&mut session, &Command::Scan, &config(), &mut scanner, ymd(2024, 2, 1), false, &mut out)
        .await
        .unwrap();

    let out = String::from_utf8(out).unwrap();
    assert!(out.starts_with("Terjadi kesalahan: "));
    assert!(out.contains("connection reset"));
    assert!(!out.contains("Data ditemukan untuk QRCODE: A1"));
    assert!(out.contains("Data ditemukan untuk QRCODE: A2"));
    assert_eq!(session.selected().map(|a| a.id.as_str()), Some("A2"));
}

#[tokio::test]
async fn test_link_command() {
    let mut session = InspectionSession::new(MemoryStore::with_fleet());
    let out = run_command(&mut session, Command::Link { code: "A1".to_string() }, "", false)
        .await
        .unwrap();
    assert_eq!(out, "https://apar.example/app/?qrcode=A1\n");
}
