//! apar-tracker library
//!
//! Remote spreadsheet access, QR scanning and the inspection session that
//! ties them to the engine in `apar-common`.

pub mod cli;
pub mod config;
pub mod remote;
pub mod render;
pub mod scanner;
pub mod session;

pub use config::{ConfigOverrides, RemoteTimeouts, TomlConfig, TrackerConfig};
pub use remote::{Ack, RemoteStore, SheetClient};
pub use scanner::{CodeScanner, ScanOutcome};
pub use session::{InspectionSession, LoadSummary};

/// Version, commit, build time and profile, as logged at startup
pub fn build_id() -> String {
    format!(
        "v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    )
}
