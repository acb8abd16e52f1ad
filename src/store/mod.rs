//! In-memory student record store with validation-gated writes.

mod service;
pub mod types;

pub use service::RecordStore;
pub use types::{Student, StoreError, StudentId, parse_id_list};
