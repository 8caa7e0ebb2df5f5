//! In-memory customer record store
//!
//! Holds the process-wide singleton record behind a `RwLock`. All mutation
//! goes through [`CustomerStore::update`] so the verified dialogue flow and
//! the REST `PUT` share one writer path.

use parking_lot::RwLock;

use member_assist_core::{CustomerRecord, RecordPatch, RecordStore};

/// The singleton record store, seeded with the demo profile
pub struct CustomerStore {
    record: RwLock<CustomerRecord>,
}

impl CustomerStore {
    /// Create a store seeded with the demo customer
    pub fn new() -> Self {
        Self::with_record(CustomerRecord::demo())
    }

    /// Create a store with a specific record (tests)
    pub fn with_record(record: CustomerRecord) -> Self {
        Self {
            record: RwLock::new(record),
        }
    }
}

impl Default for CustomerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for CustomerStore {
    fn get(&self) -> CustomerRecord {
        self.record.read().clone()
    }

    fn update(&self, patch: &RecordPatch) -> CustomerRecord {
        let mut record = self.record.write();
        record.apply(patch);
        tracing::info!(
            email_changed = patch.email.is_some(),
            address_changed = patch.address.is_some(),
            "Customer record updated"
        );
        record.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_with_demo_profile() {
        let store = CustomerStore::new();
        let record = store.get();
        assert_eq!(record.member_id, "SUPER123456");
        assert_eq!(record.email, "john.doe@example.com");
    }

    #[test]
    fn test_update_merges_and_returns() {
        let store = CustomerStore::new();
        let updated = store.update(&RecordPatch::address("7 George St, Brisbane"));
        assert_eq!(updated.address, "7 George St, Brisbane");
        assert_eq!(store.get().address, "7 George St, Brisbane");
    }

    #[test]
    fn test_put_same_address_twice_is_idempotent() {
        let store = CustomerStore::new();
        let patch = RecordPatch::address("7 George St, Brisbane");

        let first = store.update(&patch);
        let second = store.update(&patch);

        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_patch_is_a_no_op() {
        let store = CustomerStore::new();
        let before = store.get();
        store.update(&RecordPatch::default());
        assert_eq!(store.get(), before);
    }
}
