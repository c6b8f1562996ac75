//! # APAR Common Library
//!
//! Shared code for the fire extinguisher inspection tracker:
//! - Asset and inspection record types
//! - Calendar date parsing
//! - Status classification
//! - In-memory history repository
//! - Checklist validation
//! - Per-asset aggregation and dashboard counters

pub mod aggregation;
pub mod error;
pub mod history;
pub mod model;
pub mod status;
pub mod time;
pub mod validation;

pub use error::{Error, NetworkError, Result, ValidationError};
pub use history::HistoryRepository;
pub use model::{Asset, Component, ComponentCheck, Components, InspectionRecord};
pub use status::StatusCategory;
pub use time::RecordDate;
