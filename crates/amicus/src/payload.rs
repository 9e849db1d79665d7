//! Session and identity payloads.
//!
//! A payload is the JSON object encoded into a QR image: a session announced
//! by a presenter, or the identity badge of an attendee. The serialized form
//! is the exact byte sequence the scanner later decodes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Sentinel used where an optional payload field is absent.
pub const FIELD_FALLBACK: &str = "N/A";

/// Errors produced while decoding payload text.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The text is not valid JSON (or not a JSON object of the right shape).
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The JSON parsed but a required key is absent or empty.
    #[error("payload is missing required field '{field}'")]
    MissingField {
        /// Name of the missing key.
        field: &'static str,
    },
}

/// The payload encoded into a QR image.
///
/// `id` is assigned once at creation and never mutated. There is no schema
/// version: any JSON object carrying a non-empty `id` and `name` decodes,
/// regardless of extra or missing optional keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPayload {
    /// Globally unique identifier, assigned at creation time.
    pub id: String,

    /// Human-readable label: the session title or the person's name.
    pub name: String,

    /// Department or course, if the variant carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    /// Contact email, if the variant carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Creation time of the payload. Decoders accept `createdAt` as an alias.
    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Decode-side mirror of [`SessionPayload`] with every key optional, so a
/// missing required key is reported as such instead of a parse failure.
#[derive(Debug, Deserialize)]
struct RawPayload {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    department: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default, alias = "createdAt")]
    timestamp: Option<DateTime<Utc>>,
}

impl SessionPayload {
    /// Create a session payload with a generated id and a creation timestamp.
    ///
    /// Ids follow the `session-<unix-millis>-<suffix>` shape so they sort
    /// roughly by creation time and stay unique across devices.
    #[must_use]
    pub fn new_session(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self {
            id: format!("session-{}-{}", now.timestamp_millis(), &suffix[..9]),
            name: name.into(),
            department: None,
            email: None,
            timestamp: Some(now),
        }
    }

    /// Create an identity payload for a badge with a caller-supplied id.
    #[must_use]
    pub fn new_identity(
        id: impl Into<String>,
        name: impl Into<String>,
        department: Option<String>,
        email: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            department,
            email,
            timestamp: Some(now),
        }
    }

    /// Serialize the payload to the JSON text a QR renderer encodes.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn encode(&self) -> Result<String, PayloadError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Parse scanned QR text into a payload.
///
/// # Errors
///
/// Returns [`PayloadError::Malformed`] when the text is not valid JSON and
/// [`PayloadError::MissingField`] when `id` or `name` is absent or empty.
pub fn decode(text: &str) -> Result<SessionPayload, PayloadError> {
    let raw: RawPayload = serde_json::from_str(text)?;
    let id = require(raw.id, "id")?;
    let name = require(raw.name, "name")?;
    Ok(SessionPayload {
        id,
        name,
        department: raw.department,
        email: raw.email,
        timestamp: raw.timestamp,
    })
}

fn require(value: Option<String>, field: &'static str) -> Result<String, PayloadError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(PayloadError::MissingField { field }),
    }
}

/// Heuristic for whether scanned text was meant to be an attendance payload.
///
/// Decode failures are only surfaced to the operator when the text contains
/// a `{`, so unrelated QR codes wandering through the frame stay silent. A
/// malformed payload that happens not to contain `{` is dropped silently;
/// that false-negative tolerance is intentional.
#[must_use]
pub fn looks_like_payload(text: &str) -> bool {
    text.contains('{')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        "2024-01-15T09:30:00Z".parse().expect("valid timestamp")
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let payload = SessionPayload::new_identity(
            "EMP-12345",
            "Ada Lovelace",
            Some("Engineering".to_string()),
            Some("ada@example.com".to_string()),
            now(),
        );

        let text = payload.encode().unwrap();
        let decoded = decode(&text).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_decode_non_json_is_malformed() {
        for text in ["", "hello", "WIFI:T:WPA;S:guest;;", "42,42"] {
            let err = decode(text).unwrap_err();
            assert!(matches!(err, PayloadError::Malformed(_)), "input: {text}");
        }
    }

    #[test]
    fn test_decode_json_non_object_is_malformed() {
        let err = decode("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, PayloadError::Malformed(_)));
    }

    #[test]
    fn test_decode_missing_id() {
        let err = decode(r#"{"name": "Ada"}"#).unwrap_err();
        assert!(matches!(err, PayloadError::MissingField { field: "id" }));
    }

    #[test]
    fn test_decode_missing_name() {
        let err = decode(r#"{"id": "EMP-1"}"#).unwrap_err();
        assert!(matches!(err, PayloadError::MissingField { field: "name" }));
    }

    #[test]
    fn test_decode_empty_required_field() {
        let err = decode(r#"{"id": "EMP-1", "name": "   "}"#).unwrap_err();
        assert!(matches!(err, PayloadError::MissingField { field: "name" }));
    }

    #[test]
    fn test_decode_ignores_extra_keys() {
        let decoded = decode(r#"{"id": "x", "name": "y", "favourite_colour": "teal"}"#).unwrap();
        assert_eq!(decoded.id, "x");
        assert_eq!(decoded.name, "y");
        assert!(decoded.department.is_none());
    }

    #[test]
    fn test_decode_created_at_alias() {
        let decoded =
            decode(r#"{"id": "x", "name": "y", "createdAt": "2024-01-15T09:30:00Z"}"#).unwrap();
        assert_eq!(decoded.timestamp, Some(now()));
    }

    #[test]
    fn test_decode_optional_fields_absent() {
        let decoded = decode(r#"{"id": "x", "name": "y"}"#).unwrap();
        assert!(decoded.department.is_none());
        assert!(decoded.email.is_none());
        assert!(decoded.timestamp.is_none());
    }

    #[test]
    fn test_new_session_id_shape() {
        let payload = SessionPayload::new_session("Monday Morning Class", now());
        assert!(payload.id.starts_with("session-"));
        assert_eq!(payload.timestamp, Some(now()));

        let other = SessionPayload::new_session("Monday Morning Class", now());
        assert_ne!(payload.id, other.id);
    }

    #[test]
    fn test_looks_like_payload() {
        assert!(looks_like_payload(r#"{"id": "x"}"#));
        assert!(looks_like_payload("garbage with { in it"));
        assert!(!looks_like_payload("https://example.com/menu"));
        assert!(!looks_like_payload(""));
    }

    #[test]
    fn test_encode_skips_absent_optionals() {
        let payload = SessionPayload::new_session("Standup", now());
        let text = payload.encode().unwrap();
        assert!(!text.contains("department"));
        assert!(!text.contains("email"));
    }
}
