//! Concurrent in-memory record store.

use crate::store::types::{Student, StoreError, StudentId};
use dashmap::{DashMap, mapref::entry::Entry};

/// Owns every student record for the lifetime of the process.
///
/// Each operation is atomic for the key it touches; bulk operations apply the single-item
/// operation to every element in turn with no batch-level atomicity. Construct the store once
/// near process start and share it through an `Arc`.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: DashMap<StudentId, Student>,
}

impl RecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether a record is stored under `id`.
    pub fn contains(&self, id: StudentId) -> bool {
        self.records.contains_key(&id)
    }

    /// Insert a new record, rejecting duplicates before validating.
    pub fn create(&self, student: Student) -> Result<Student, StoreError> {
        match self.records.entry(student.id) {
            Entry::Occupied(_) => Err(StoreError::DuplicateId(student.id)),
            Entry::Vacant(slot) => {
                student.validate()?;
                slot.insert(student.clone());
                Ok(student)
            }
        }
    }

    /// Insert every valid, not-yet-present record; returns the inserted ones in input order.
    pub fn create_bulk(&self, students: Vec<Student>) -> Vec<Student> {
        students
            .into_iter()
            .filter(Student::is_valid)
            .filter_map(|student| match self.records.entry(student.id) {
                Entry::Occupied(_) => None,
                Entry::Vacant(slot) => {
                    slot.insert(student.clone());
                    Some(student)
                }
            })
            .collect()
    }

    /// Fetch a copy of the record stored under `id`.
    pub fn get(&self, id: StudentId) -> Result<Student, StoreError> {
        self.records
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::NotFound(id))
    }

    /// Snapshot of all records in unspecified order.
    pub fn get_all(&self) -> Vec<Student> {
        self.records
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Replace the record under `id` in full; the path identifier wins over `student.id`.
    pub fn update(&self, id: StudentId, mut student: Student) -> Result<Student, StoreError> {
        let mut entry = self.records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        student.validate()?;
        student.id = id;
        *entry = student.clone();
        Ok(student)
    }

    /// Replace each record whose embedded id is present and whose payload is valid.
    pub fn update_bulk(&self, students: Vec<Student>) -> Vec<Student> {
        students
            .into_iter()
            .filter(Student::is_valid)
            .filter_map(|student| {
                let mut entry = self.records.get_mut(&student.id)?;
                *entry = student.clone();
                Some(student)
            })
            .collect()
    }

    /// Remove the record under `id`.
    pub fn delete(&self, id: StudentId) -> Result<(), StoreError> {
        self.records
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    /// Remove each listed id that exists; returns the removed ids in input order.
    pub fn delete_bulk(&self, ids: &[StudentId]) -> Vec<StudentId> {
        ids.iter()
            .copied()
            .filter(|id| self.records.remove(id).is_some())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn student(id: StudentId, name: &str) -> Student {
        Student {
            id,
            name: name.into(),
            age: 20,
            email: format!("{}@x.com", name.to_lowercase()),
        }
    }

    #[test]
    fn create_then_get_returns_equal_record() {
        let store = RecordStore::new();
        let ana = student(1, "Ana");
        assert_eq!(store.create(ana.clone()), Ok(ana.clone()));
        assert_eq!(store.get(1), Ok(ana));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn duplicate_create_leaves_existing_record_untouched() {
        let store = RecordStore::new();
        let ana = student(1, "Ana");
        store.create(ana.clone()).expect("first insert");

        assert_eq!(
            store.create(student(1, "Bo")),
            Err(StoreError::DuplicateId(1))
        );
        assert_eq!(store.get(1), Ok(ana));
    }

    #[test]
    fn duplicate_is_reported_before_invalid_data() {
        let store = RecordStore::new();
        store.create(student(1, "Ana")).expect("insert");
        assert_eq!(store.create(student(1, "")), Err(StoreError::DuplicateId(1)));
    }

    #[test]
    fn invalid_create_is_rejected_and_not_stored() {
        let store = RecordStore::new();
        let result = store.create(student(3, ""));
        assert!(matches!(result, Err(StoreError::InvalidData { .. })));
        assert!(!store.contains(3));
        assert!(store.is_empty());
    }

    #[test]
    fn bulk_create_omits_invalid_and_duplicate_entries() {
        let store = RecordStore::new();
        let existing = student(3, "Cy");
        store.create(existing.clone()).expect("seed");

        let a = student(1, "Ana");
        let b = student(2, "");
        let c = student(3, "Impostor");
        let created = store.create_bulk(vec![a.clone(), b, c]);

        assert_eq!(created, vec![a]);
        assert_eq!(store.get(3), Ok(existing));
        assert_eq!(store.get(2), Err(StoreError::NotFound(2)));
    }

    #[test]
    fn bulk_create_treats_repeated_ids_within_batch_as_duplicates() {
        let store = RecordStore::new();
        let first = student(5, "Ana");
        let created = store.create_bulk(vec![first.clone(), student(5, "Bo")]);
        assert_eq!(created, vec![first.clone()]);
        assert_eq!(store.get(5), Ok(first));
    }

    #[test]
    fn update_forces_path_id() {
        let store = RecordStore::new();
        store.create(student(1, "Ana")).expect("seed");

        let updated = store.update(1, student(42, "Ana Maria")).expect("update");
        assert_eq!(updated.id, 1);
        assert_eq!(store.get(1).expect("stored").name, "Ana Maria");
        assert!(!store.contains(42));
    }

    #[test]
    fn update_reports_missing_before_invalid() {
        let store = RecordStore::new();
        assert_eq!(store.update(9, student(9, "")), Err(StoreError::NotFound(9)));

        store.create(student(9, "Ana")).expect("seed");
        assert!(matches!(
            store.update(9, student(9, "")),
            Err(StoreError::InvalidData { .. })
        ));
        assert_eq!(store.get(9).expect("stored").name, "Ana");
    }

    #[test]
    fn update_replaces_whole_record() {
        let store = RecordStore::new();
        store.create(student(1, "Ana")).expect("seed");
        let replacement = Student {
            id: 1,
            name: "Ana".into(),
            age: 31,
            email: "new@x.com".into(),
        };
        store.update(1, replacement.clone()).expect("update");
        assert_eq!(store.get(1), Ok(replacement));
    }

    #[test]
    fn bulk_update_skips_absent_and_invalid_entries() {
        let store = RecordStore::new();
        store.create(student(1, "Ana")).expect("seed");
        store.create(student(2, "Bo")).expect("seed");

        let renamed = student(1, "Ana B");
        let updated = store.update_bulk(vec![renamed.clone(), student(2, ""), student(7, "Zed")]);

        assert_eq!(updated, vec![renamed.clone()]);
        assert_eq!(store.get(1), Ok(renamed));
        assert_eq!(store.get(2).expect("untouched").name, "Bo");
        assert!(!store.contains(7));
    }

    #[test]
    fn delete_then_get_is_not_found() {
        let store = RecordStore::new();
        store.create(student(1, "Ana")).expect("seed");
        assert_eq!(store.delete(1), Ok(()));
        assert_eq!(store.get(1), Err(StoreError::NotFound(1)));
        assert_eq!(store.delete(1), Err(StoreError::NotFound(1)));
    }

    #[test]
    fn bulk_delete_returns_only_removed_ids_in_order() {
        let store = RecordStore::new();
        for id in [1, 3] {
            store.create(student(id, "Ana")).expect("seed");
        }

        let removed = store.delete_bulk(&[3, 2, 1, 3]);
        assert_eq!(removed, vec![3, 1]);
        assert!(store.is_empty());
    }

    #[test]
    fn get_all_returns_every_record() {
        let store = RecordStore::new();
        for id in 1..=3 {
            store.create(student(id, "Ana")).expect("seed");
        }
        let mut ids: Vec<_> = store.get_all().into_iter().map(|s| s.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn concurrent_creates_of_same_id_admit_exactly_one() {
        let store = Arc::new(RecordStore::new());
        let handles: Vec<_> = (0..16)
            .map(|n| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.create(student(1, &format!("S{n}"))).is_ok())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|handle| handle.join().expect("thread"))
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert_eq!(store.len(), 1);
    }
}
