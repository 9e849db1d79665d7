//! `amicus` - QR attendance logging
//!
//! This library provides the core functionality for generating per-person
//! QR check-in payloads, ingesting scanned codes into a persisted
//! attendance log, and exporting that log as CSV.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod ingest;
pub mod logging;
pub mod payload;
pub mod record;
pub mod scanner;
pub mod store;

pub use auth::{Role, Session};
pub use config::Config;
pub use error::{Error, Result};
pub use ingest::IngestPipeline;
pub use logging::init_logging;
pub use payload::SessionPayload;
pub use record::AttendanceRecord;
pub use store::RecordStore;
