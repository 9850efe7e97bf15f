//! # Roundup Common Library
//!
//! Shared code for the Roundup interview scheduling service:
//! - Round extraction from scheduling text
//! - CSV import and row expansion into interview records
//! - Record model as stored in the external record store
//! - Invitation email template
//! - Statistics, filters and turnaround-time calculation
//! - Bootstrap configuration loading

pub mod config;
pub mod csv_import;
pub mod error;
pub mod records;
pub mod rounds;
pub mod stats;
pub mod tat;
pub mod template;

pub use error::{Error, Result};
pub use records::{EmailStatus, ImportedRow, InterviewRecord, StoredRecord};
pub use rounds::Round;
