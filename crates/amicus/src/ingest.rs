//! The scan ingest pipeline.
//!
//! Converts decoded QR text into persisted attendance records: decode,
//! build a candidate record, suppress rapid repeat scans, append.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::payload::{self, looks_like_payload, PayloadError};
use crate::record::AttendanceRecord;
use crate::store::RecordStore;

/// Default repeat-scan suppression window in milliseconds.
pub const DEBOUNCE_MS: u64 = 5000;

/// Default post-scan cooldown in milliseconds.
///
/// Purely cosmetic: the scan loop pauses this long after a successful ingest
/// so the operator can read the confirmation. Scans delivered during the
/// pause still go through the debounce, which is the actual guard.
pub const COOLDOWN_MS: u64 = 2000;

/// Errors produced while ingesting a scan.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The scanned text did not decode to a payload.
    #[error("invalid scan: {0}")]
    Invalid(#[from] PayloadError),

    /// The same id was scanned again within the debounce window; nothing
    /// was appended. A policy discard, not a true failure.
    #[error("duplicate scan suppressed")]
    DuplicateSuppressed,

    /// The record could not be persisted.
    #[error(transparent)]
    Store(#[from] crate::error::Error),
}

impl IngestError {
    /// Whether this failure should be surfaced to the operator.
    ///
    /// Duplicate suppression is silent. Decode failures are surfaced only
    /// when the raw text looks like it was meant to be a payload, so
    /// unrelated QR codes don't spam the operator while scanning.
    #[must_use]
    pub fn should_notify(&self, raw_text: &str) -> bool {
        match self {
            Self::Invalid(_) => looks_like_payload(raw_text),
            Self::DuplicateSuppressed => false,
            Self::Store(_) => true,
        }
    }
}

/// The ingest pipeline with its duplicate-suppression policy.
#[derive(Debug, Clone)]
pub struct IngestPipeline {
    debounce: Duration,
}

impl Default for IngestPipeline {
    fn default() -> Self {
        Self::new(DEBOUNCE_MS)
    }
}

impl IngestPipeline {
    /// Create a pipeline with the given debounce window in milliseconds.
    #[must_use]
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            debounce: Duration::milliseconds(i64::try_from(debounce_ms).unwrap_or(i64::MAX)),
        }
    }

    /// Ingest one decoded QR text at time `now`.
    ///
    /// Duplicate suppression compares only against the most recently
    /// ingested record, the head of the store. Two scans of the same id
    /// within the window are still both recorded when a different scan
    /// lands between them; that head-only policy is deliberate and matches
    /// the shipped behavior.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Invalid`] when the text does not decode,
    /// [`IngestError::DuplicateSuppressed`] when the debounce discards the
    /// scan, and [`IngestError::Store`] when persistence fails.
    pub fn ingest(
        &self,
        store: &mut RecordStore,
        raw_text: &str,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord, IngestError> {
        let decoded = payload::decode(raw_text)?;
        let record = AttendanceRecord::from_payload(&decoded, now);

        if let Some(last) = store.latest() {
            if last.session_id == record.session_id && now - last.scanned_at < self.debounce {
                return Err(IngestError::DuplicateSuppressed);
            }
        }

        store.append(record.clone())?;
        Ok(record)
    }
}
