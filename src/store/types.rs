//! Core data types and error definitions for the record store.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Integer identifier assigned to a student by the caller.
pub type StudentId = i64;

/// Errors emitted by [`crate::store::RecordStore`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Payload failed the presence/positivity checks.
    #[error("invalid student data")]
    InvalidData {
        /// Which check rejected the record; logged, never returned to callers.
        reason: &'static str,
    },
    /// A record with this identifier is already stored.
    #[error("ID already exists")]
    DuplicateId(StudentId),
    /// No record is stored under this identifier.
    #[error("Student not found")]
    NotFound(StudentId),
}

/// A single student record as stored and exchanged over HTTP.
///
/// Missing JSON fields decode to their zero values so that an incomplete object is rejected by
/// [`Student::validate`] rather than by the decoder.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Student {
    /// Caller-assigned unique identifier.
    pub id: StudentId,
    /// Display name; must be non-empty.
    pub name: String,
    /// Age in years; must be positive.
    pub age: i64,
    /// Contact address; must be non-empty, format is not checked.
    pub email: String,
}

impl Student {
    /// Check that the record carries a name, an email, and a positive age.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.name.is_empty() {
            return Err(StoreError::InvalidData {
                reason: "name is empty",
            });
        }
        if self.email.is_empty() {
            return Err(StoreError::InvalidData {
                reason: "email is empty",
            });
        }
        if self.age <= 0 {
            return Err(StoreError::InvalidData {
                reason: "age must be positive",
            });
        }
        Ok(())
    }

    /// Convenience wrapper around [`Student::validate`].
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Parse a comma-separated identifier list such as `"1, 2,x,3"`.
///
/// Tokens are whitespace-trimmed; tokens that are not integers are dropped silently. Order
/// and repetitions are preserved.
pub fn parse_id_list(raw: &str) -> Vec<StudentId> {
    raw.split(',')
        .filter_map(|token| token.trim().parse().ok())
        .collect()
}
