//! Attendance records.
//!
//! A record is created by the ingest pipeline from a decoded payload and is
//! immutable afterwards; the only lifecycle operation left is deletion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::payload::{SessionPayload, FIELD_FALLBACK};

/// One logged attendance entry.
///
/// Identity fields are denormalized copies taken from the payload at scan
/// time; later changes to the session never propagate. `session_id` is a
/// plain foreign reference with no integrity enforcement, so orphaned
/// references are tolerated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Unique id of this record, distinct from the payload id.
    pub id: String,

    /// Id of the scanned payload (session or identity badge).
    pub session_id: String,

    /// Payload name at scan time.
    pub session_name: String,

    /// Department, or `"N/A"` when the payload carried none.
    pub department: String,

    /// Email, or `"N/A"` when the payload carried none.
    pub email: String,

    /// When the payload itself was generated, if it said.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,

    /// When the scan was ingested. Set by the pipeline, never by the payload.
    pub scanned_at: DateTime<Utc>,
}

impl AttendanceRecord {
    /// Build a record from a decoded payload, stamped with the ingest time.
    #[must_use]
    pub fn from_payload(payload: &SessionPayload, now: DateTime<Utc>) -> Self {
        Self {
            id: format!("rec-{}", Uuid::new_v4()),
            session_id: payload.id.clone(),
            session_name: payload.name.clone(),
            department: payload
                .department
                .clone()
                .unwrap_or_else(|| FIELD_FALLBACK.to_string()),
            email: payload
                .email
                .clone()
                .unwrap_or_else(|| FIELD_FALLBACK.to_string()),
            generated_at: payload.timestamp,
            scanned_at: now,
        }
    }

    /// Build a manual-entry record for a bare id, bypassing the codec.
    #[must_use]
    pub fn manual(subject_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: format!("rec-{}", Uuid::new_v4()),
            session_id: subject_id.into(),
            session_name: "Manual Entry".to_string(),
            department: "Manual".to_string(),
            email: FIELD_FALLBACK.to_string(),
            generated_at: Some(now),
            scanned_at: now,
        }
    }

    /// Date portion of the scan time, `YYYY-MM-DD`.
    #[must_use]
    pub fn scan_date(&self) -> String {
        self.scanned_at.format("%Y-%m-%d").to_string()
    }

    /// Time portion of the scan time, `HH:MM:SS`.
    #[must_use]
    pub fn scan_time(&self) -> String {
        self.scanned_at.format("%H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        "2024-01-15T14:05:09Z".parse().expect("valid timestamp")
    }

    #[test]
    fn test_from_payload_copies_identity_fields() {
        let payload = SessionPayload::new_identity(
            "EMP-7",
            "Grace Hopper",
            Some("Navy".to_string()),
            None,
            now(),
        );
        let record = AttendanceRecord::from_payload(&payload, now());

        assert_eq!(record.session_id, "EMP-7");
        assert_eq!(record.session_name, "Grace Hopper");
        assert_eq!(record.department, "Navy");
        assert_eq!(record.email, FIELD_FALLBACK);
        assert_eq!(record.generated_at, Some(now()));
        assert_eq!(record.scanned_at, now());
    }

    #[test]
    fn test_record_ids_are_unique() {
        let payload = SessionPayload::new_session("Standup", now());
        let a = AttendanceRecord::from_payload(&payload, now());
        let b = AttendanceRecord::from_payload(&payload, now());
        assert_ne!(a.id, b.id);
        assert_eq!(a.session_id, b.session_id);
    }

    #[test]
    fn test_manual_entry() {
        let record = AttendanceRecord::manual("EMP-99", now());
        assert_eq!(record.session_id, "EMP-99");
        assert_eq!(record.session_name, "Manual Entry");
        assert_eq!(record.department, "Manual");
    }

    #[test]
    fn test_scan_date_and_time() {
        let record = AttendanceRecord::manual("x", now());
        assert_eq!(record.scan_date(), "2024-01-15");
        assert_eq!(record.scan_time(), "14:05:09");
    }

    #[test]
    fn test_record_serialization_round_trip() {
        let payload = SessionPayload::new_session("Standup", now());
        let record = AttendanceRecord::from_payload(&payload, now());

        let json = serde_json::to_string(&record).unwrap();
        let back: AttendanceRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }
}
