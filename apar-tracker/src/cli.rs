//! Command-line interface
//!
//! Each subcommand loads what it needs through an [`InspectionSession`] and
//! writes either plain text or pretty JSON (`--json`) to the given writer.

use crate::config::{ConfigOverrides, TrackerConfig};
use crate::remote::{RemoteStore, SheetClient};
use crate::render;
use crate::scanner::{shareable_link, CodeScanner, LineScanner};
use crate::session::InspectionSession;
use anyhow::{anyhow, Context, Result};
use apar_common::aggregation::{summarize, InspectionStats};
use apar_common::validation::InspectionForm;
use apar_common::{Asset, Component, Error, InspectionRecord};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

/// Command-line arguments for apar-tracker
#[derive(Parser, Debug)]
#[command(name = "apar-tracker")]
#[command(about = "Fire extinguisher (APAR) inspection tracker")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, env = "APAR_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Endpoint serving assets and inspection history
    #[arg(long, global = true, value_name = "URL")]
    pub read_url: Option<String>,

    /// Endpoint accepting new inspections
    #[arg(long, global = true, value_name = "URL")]
    pub write_url: Option<String>,

    /// Evaluate statuses as of this date instead of the local date
    #[arg(long, global = true, value_name = "YYYY-MM-DD")]
    pub today: Option<NaiveDate>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            read_url: self.read_url.clone(),
            write_url: self.write_url.clone(),
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fleet counters: total, good, needing repair, not inspected
    Dashboard,
    /// All assets with the status of their latest inspection
    Assets,
    /// Inspection history, for one asset or grouped for all
    History {
        /// Asset code (QRCODE)
        #[arg(long)]
        code: Option<String>,
    },
    /// Look up one asset by code and show its history
    Lookup { code: String },
    /// Read scanned codes from stdin, one per line, until a blank line or EOF
    Scan,
    /// Record an inspection for one asset
    Inspect(InspectArgs),
    /// Print the shareable link for an asset
    Link { code: String },
}

/// Checklist values
///
/// Components take `baik` or `tidak-baik`; the gauge also accepts
/// `tidak-ada`. Dates default to today and one year from today.
#[derive(Args, Debug, Clone, Default)]
pub struct InspectArgs {
    /// Asset code (QRCODE)
    #[arg(long)]
    pub code: String,

    /// Inspection date
    #[arg(long, value_name = "DATE")]
    pub date: Option<String>,

    /// Expiry date printed on the extinguisher
    #[arg(long, value_name = "DATE")]
    pub expired: Option<String>,

    #[arg(long)]
    pub seal: Option<String>,
    #[arg(long)]
    pub handle: Option<String>,
    #[arg(long)]
    pub tank: Option<String>,
    #[arg(long)]
    pub label: Option<String>,
    #[arg(long)]
    pub hose: Option<String>,
    #[arg(long)]
    pub nozzle: Option<String>,
    #[arg(long)]
    pub bracket: Option<String>,
    #[arg(long)]
    pub sign: Option<String>,
    #[arg(long)]
    pub gauge: Option<String>,

    /// Inspector name
    #[arg(long)]
    pub inspector: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

impl InspectArgs {
    /// Checklist form, starting from the prefilled dates
    pub fn to_form(&self, today: NaiveDate) -> InspectionForm {
        let mut form = InspectionForm::prefilled(today);
        if let Some(date) = &self.date {
            form.inspection_date = Some(date.clone());
        }
        if let Some(expired) = &self.expired {
            form.expiry_date = Some(expired.clone());
        }
        for (component, value) in [
            (Component::Seal, &self.seal),
            (Component::Handle, &self.handle),
            (Component::Tank, &self.tank),
            (Component::Label, &self.label),
            (Component::Hose, &self.hose),
            (Component::Nozzle, &self.nozzle),
            (Component::Gauge, &self.gauge),
            (Component::Bracket, &self.bracket),
            (Component::Sign, &self.sign),
        ] {
            if let Some(value) = value {
                form.set_component(component, value.clone());
            }
        }
        form.inspector_name = self.inspector.clone();
        form.notes = self.notes.clone();
        form
    }
}

#[derive(Serialize)]
struct HistoryView<'a> {
    asset: &'a Asset,
    stats: InspectionStats,
    inspections: &'a [InspectionRecord],
}

#[derive(Serialize)]
struct LinkView<'a> {
    code: &'a str,
    link: &'a str,
}

/// Run a parsed command against the configured endpoints, writing to stdout
pub async fn run(cli: Cli, config: TrackerConfig) -> Result<()> {
    let today = cli.today.unwrap_or_else(apar_common::time::today);
    let client = SheetClient::from_config(&config)?;
    let mut session = InspectionSession::new(client);
    let mut scanner = LineScanner::new(tokio::io::stdin());
    let mut stdout = std::io::stdout().lock();

    execute(
        &mut session,
        &cli.command,
        &config,
        &mut scanner,
        today,
        cli.json,
        &mut stdout,
    )
    .await
}

/// Execute one command against any store
pub async fn execute<S: RemoteStore>(
    session: &mut InspectionSession<S>,
    command: &Command,
    config: &TrackerConfig,
    scanner: &mut dyn CodeScanner,
    today: NaiveDate,
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        Command::Dashboard => {
            load(session).await?;
            let counts = session.dashboard(today);
            emit(out, json, &counts, || render::dashboard(&counts))
        }
        Command::Assets => {
            load(session).await?;
            let rows = session.asset_rows(today);
            emit(out, json, &rows, || render::asset_table(&rows))
        }
        Command::History { code: Some(code) } => {
            load(session).await?;
            let code = code.trim();
            let details = session.repository().describe_asset(code);
            let inspections = session.history_for(code);
            let view = HistoryView {
                asset: &details,
                stats: summarize(&inspections, today),
                inspections: &inspections,
            };
            emit(out, json, &view, || render::history(&details, &inspections, today))
        }
        Command::History { code: None } => {
            load(session).await?;
            let groups = session.grouped_history();
            emit(out, json, &groups, || {
                render::grouped_history(&groups, session.repository(), today)
            })
        }
        Command::Lookup { code } => {
            session.select_by_code(code).await.map_err(lookup_error)?;
            show_selected(session, today, json, out).await
        }
        Command::Scan => {
            loop {
                let scanned = session.scan_and_select(scanner).await.map(|asset| asset.is_some());
                match scanned {
                    Ok(true) => show_selected(session, today, json, out).await?,
                    Ok(false) => break,
                    Err(e @ Error::NotFound(_)) => writeln!(out, "{}", lookup_error(e))?,
                    Err(e) if e.is_network() => {
                        warn!(error = %e, "Lookup failed, waiting for next scan");
                        writeln!(out, "Terjadi kesalahan: {}", e)?;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Ok(())
        }
        Command::Inspect(args) => {
            session.select_by_code(&args.code).await.map_err(lookup_error)?;
            let record = session
                .submit(&args.to_form(today), today)
                .await
                .map_err(submit_error)?;
            if json {
                emit(out, true, &record, String::new)
            } else {
                writeln!(out, "Data pemeriksaan berhasil disimpan!\n")?;
                out.write_all(render::inspection(&record, today).as_bytes())?;
                Ok(())
            }
        }
        Command::Link { code } => {
            let base = config
                .share_base_url
                .as_deref()
                .ok_or_else(|| anyhow!("share_base_url is not configured"))?;
            let link = shareable_link(base, code)?;
            let view = LinkView {
                code: code.trim(),
                link: &link,
            };
            emit(out, json, &view, || format!("{}\n", link))
        }
    }
}

async fn load<S: RemoteStore>(session: &mut InspectionSession<S>) -> Result<()> {
    let summary = session
        .load_all()
        .await
        .context("Gagal memuat data APAR")?;
    if summary.history_degraded {
        warn!("Gagal memuat riwayat pemeriksaan lengkap");
    }
    Ok(())
}

/// Print the selected asset with its history, refreshing history first
async fn show_selected<S: RemoteStore>(
    session: &mut InspectionSession<S>,
    today: NaiveDate,
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let held = session.reload_history().await;
    info!(inspections = held, "History refreshed for selected asset");

    let Some(asset) = session.selected().cloned() else {
        return Ok(());
    };
    let inspections = session.history_for(&asset.id);
    let view = HistoryView {
        asset: &asset,
        stats: summarize(&inspections, today),
        inspections: &inspections,
    };
    emit(out, json, &view, || {
        format!(
            "Data ditemukan untuk QRCODE: {}\n\n{}",
            asset.id,
            render::history(&asset, &inspections, today)
        )
    })
}

fn lookup_error(e: Error) -> anyhow::Error {
    match e {
        Error::NotFound(code) => anyhow!("Data tidak ditemukan untuk QRCODE: {}", code),
        other => other.into(),
    }
}

fn submit_error(e: Error) -> anyhow::Error {
    match e {
        Error::Validation(e) => e.into(),
        other => anyhow!("Gagal menyimpan data: {}", other),
    }
}

fn emit<T: Serialize + ?Sized>(
    out: &mut dyn Write,
    json: bool,
    value: &T,
    text: impl FnOnce() -> String,
) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, value)?;
        writeln!(out)?;
    } else {
        out.write_all(text().as_bytes())?;
    }
    Ok(())
}
