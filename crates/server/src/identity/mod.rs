//! Synthetic citizen identities.
//!
//! Every subject identifier (the phone number typed into the authorization form)
//! is mapped to a stable, self-consistent person record. Records are derived from
//! a SHA-256 digest of the identifier, so the same phone always yields the same
//! person, across restarts included. The cache only saves re-deriving them.

mod derive;
mod translit;

pub use derive::derive_identity;
pub use translit::transliterate;

use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

/// Person record in the shape ESIA returns from `/rs/prns`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRecord {
    pub oid: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: String,
    /// `DD.MM.YYYY`
    pub birth_date: String,
    pub gender: Gender,
    pub snils: String,
    pub inn: String,
    pub email: String,
    pub mobile: String,
    pub trusted: bool,
    pub verified: bool,
    pub citizenship: String,
    pub status: String,
}

/// Subject identifier to identity record cache.
#[derive(Clone, Default)]
pub struct IdentityCache {
    records: Arc<DashMap<String, Arc<IdentityRecord>>>,
}

impl IdentityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record for `subject_id`, deriving and storing it on first use.
    ///
    /// Concurrent callers for the same unseen subject all get the one stored record.
    pub fn get_or_create(&self, subject_id: &str) -> Arc<IdentityRecord> {
        if let Some(record) = self.records.get(subject_id) {
            return record.value().clone();
        }

        // The entry holds the shard write lock, so the re-check and insert are atomic.
        self.records
            .entry(subject_id.to_string())
            .or_insert_with(|| {
                let record = derive_identity(subject_id);
                tracing::debug!(oid = %record.oid, "derived new identity");
                Arc::new(record)
            })
            .value()
            .clone()
    }

    /// Copy of every cached record, keyed by subject identifier.
    pub fn snapshot(&self) -> BTreeMap<String, IdentityRecord> {
        self.records
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().as_ref().clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_same_instance_on_repeat() {
        let cache = IdentityCache::new();
        let first = cache.get_or_create("79990000001");
        let second = cache.get_or_create("79990000001");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cached_record_matches_pure_derivation() {
        let cache = IdentityCache::new();
        let cached = cache.get_or_create("79644223811");
        assert_eq!(*cached, derive_identity("79644223811"));
    }

    #[test]
    fn snapshot_lists_all_subjects() {
        let cache = IdentityCache::new();
        assert!(cache.is_empty());
        cache.get_or_create("79990000001");
        cache.get_or_create("79990000002");
        cache.get_or_create("79990000001");

        let all = cache.snapshot();
        assert_eq!(all.len(), 2);
        assert_eq!(all["79990000002"].mobile, "79990000002");
    }

    #[test]
    fn serializes_with_esia_field_names() {
        let record = derive_identity("79990000001");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["firstName"], "Анна");
        assert_eq!(json["birthDate"], "07.01.1994");
        assert_eq!(json["gender"], "F");
        assert_eq!(json["mobile"], "79990000001");
        assert!(json.get("first_name").is_none());
    }

    #[test]
    fn concurrent_first_access_stores_one_record() {
        let cache = IdentityCache::new();
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let cache = cache.clone();
                std::thread::spawn(move || cache.get_or_create("79161234567"))
            })
            .collect();

        let records: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(cache.len(), 1);
        for record in &records[1..] {
            assert!(Arc::ptr_eq(&records[0], record));
        }
    }
}
