//! The attendance record store.
//!
//! An in-memory ordered sequence of records mirrored to a persistent slot.
//! The whole sequence is serialized and rewritten on every mutation; there
//! is no partial persistence and no transactionality, which is acceptable
//! for low-stakes attendance logging.

pub mod backend;

use tracing::{debug, warn};

use crate::error::Result;
use crate::record::AttendanceRecord;

pub use backend::{FileBackend, MemoryBackend, StateBackend, RECORDS_KEY, SESSION_KEY};

/// Ordered collection of attendance records, newest first.
#[derive(Debug)]
pub struct RecordStore {
    backend: Box<dyn StateBackend>,
    records: Vec<AttendanceRecord>,
}

impl RecordStore {
    /// Rehydrate the store from the backend's records slot.
    ///
    /// A missing or malformed slot yields an empty store with a logged
    /// diagnostic; it never fails startup.
    #[must_use]
    pub fn load(backend: Box<dyn StateBackend>) -> Self {
        let records = match backend.get(RECORDS_KEY) {
            Ok(Some(blob)) => match serde_json::from_str(&blob) {
                Ok(records) => records,
                Err(e) => {
                    warn!(error = %e, "Persisted attendance records are malformed, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Could not read persisted attendance records, starting empty");
                Vec::new()
            }
        };
        debug!("Loaded {} attendance records", records.len());
        Self { backend, records }
    }

    /// Add a record at the head of the sequence and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting the updated sequence fails.
    pub fn append(&mut self, record: AttendanceRecord) -> Result<()> {
        self.records.insert(0, record);
        self.persist()
    }

    /// Remove the record with the given id and persist.
    ///
    /// Returns `true` if a record was removed; an absent id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting the updated sequence fails.
    pub fn delete_by_id(&mut self, id: &str) -> Result<bool> {
        match self.records.iter().position(|r| r.id == id) {
            Some(pos) => {
                self.records.remove(pos);
                self.persist()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// The most recently ingested record, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&AttendanceRecord> {
        self.records.first()
    }

    /// All records, newest first.
    #[must_use]
    pub fn records(&self) -> &[AttendanceRecord] {
        &self.records
    }

    /// Number of records in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records whose scan date (`YYYY-MM-DD`) equals `date`, in original
    /// relative order. Pure; no mutation.
    #[must_use]
    pub fn filter_by_date(&self, date: &str) -> Vec<&AttendanceRecord> {
        self.records.iter().filter(|r| r.scan_date() == date).collect()
    }

    /// Partition records by session id, preserving first-seen group order.
    #[must_use]
    pub fn group_by_session(&self) -> Vec<(String, Vec<&AttendanceRecord>)> {
        let mut groups: Vec<(String, Vec<&AttendanceRecord>)> = Vec::new();
        for record in &self.records {
            match groups.iter_mut().find(|(id, _)| *id == record.session_id) {
                Some((_, members)) => members.push(record),
                None => groups.push((record.session_id.clone(), vec![record])),
            }
        }
        groups
    }

    /// Serialize the whole sequence into the records slot.
    fn persist(&self) -> Result<()> {
        let blob = serde_json::to_string(&self.records)?;
        self.backend.put(RECORDS_KEY, &blob)
    }
}
