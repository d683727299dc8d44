use async_trait::async_trait;
use dashmap::{DashMap, DashSet};

use crate::error::StoreResult;
use crate::traits::Store;

/// The in-process backend: every namespace is either a concurrent hash map
/// or a concurrent set, held entirely in memory for the lifetime of the
/// process.
#[derive(Default)]
pub struct InProcessStore {
    hashes: DashMap<String, DashMap<String, Vec<u8>>>,
    sets: DashMap<String, DashSet<String>>,
}

impl InProcessStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots every namespace for persistence. See `crate::persistence`.
    pub fn snapshot_hashes(&self) -> Vec<(String, Vec<(String, Vec<u8>)>)> {
        self.hashes
            .iter()
            .map(|entry| {
                let values = entry
                    .value()
                    .iter()
                    .map(|kv| (kv.key().clone(), kv.value().clone()))
                    .collect();
                (entry.key().clone(), values)
            })
            .collect()
    }

    pub fn snapshot_sets(&self) -> Vec<(String, Vec<String>)> {
        self.sets
            .iter()
            .map(|entry| {
                let values = entry.value().iter().map(|v| v.clone()).collect();
                (entry.key().clone(), values)
            })
            .collect()
    }

    pub fn restore_hashes(&self, namespaces: Vec<(String, Vec<(String, Vec<u8>)>)>) {
        for (namespace, entries) in namespaces {
            let hash = DashMap::new();
            for (key, value) in entries {
                hash.insert(key, value);
            }
            self.hashes.insert(namespace, hash);
        }
    }

    pub fn restore_sets(&self, namespaces: Vec<(String, Vec<String>)>) {
        for (namespace, values) in namespaces {
            let set = DashSet::new();
            for value in values {
                set.insert(value);
            }
            self.sets.insert(namespace, set);
        }
    }
}

#[async_trait]
impl Store for InProcessStore {
    async fn get_bytes(&self, namespace: &str, key: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self
            .hashes
            .get(namespace)
            .and_then(|hash| hash.get(key).map(|v| v.clone())))
    }

    async fn set_bytes(&self, namespace: &str, key: &str, value: Vec<u8>) -> StoreResult<()> {
        self.hashes
            .entry(namespace.to_owned())
            .or_default()
            .insert(key.to_owned(), value);
        Ok(())
    }

    async fn delete(&self, namespace: &str, key: &str) -> StoreResult<()> {
        if let Some(hash) = self.hashes.get(namespace) {
            hash.remove(key);
        }
        Ok(())
    }

    async fn add(&self, namespace: &str, value: &str) -> StoreResult<()> {
        self.sets
            .entry(namespace.to_owned())
            .or_default()
            .insert(value.to_owned());
        Ok(())
    }

    async fn remove(&self, namespace: &str, value: &str) -> StoreResult<()> {
        if let Some(set) = self.sets.get(namespace) {
            set.remove(value);
        }
        Ok(())
    }

    async fn has(&self, namespace: &str, value: &str) -> StoreResult<bool> {
        Ok(self
            .sets
            .get(namespace)
            .map(|set| set.contains(value))
            .unwrap_or(false))
    }

    async fn cardinality(&self, namespace: &str) -> StoreResult<usize> {
        Ok(self.sets.get(namespace).map(|set| set.len()).unwrap_or(0))
    }

    async fn clear(&self) -> StoreResult<()> {
        self.hashes.clear();
        self.sets.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_get_set_delete_round_trip() {
        let store = InProcessStore::new();
        assert_eq!(store.get_bytes("agency", "91").await.unwrap(), None);
        store
            .set_bytes("agency", "91", b"Dublin Bus".to_vec())
            .await
            .unwrap();
        assert_eq!(
            store.get_bytes("agency", "91").await.unwrap(),
            Some(b"Dublin Bus".to_vec())
        );
        store.delete("agency", "91").await.unwrap();
        assert_eq!(store.get_bytes("agency", "91").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_semantics_track_distinct_members() {
        let store = InProcessStore::new();
        store.add("cancelled", "t1").await.unwrap();
        store.add("cancelled", "t1").await.unwrap();
        store.add("cancelled", "t2").await.unwrap();
        assert_eq!(store.cardinality("cancelled").await.unwrap(), 2);
        assert!(store.has("cancelled", "t1").await.unwrap());
        store.remove("cancelled", "t1").await.unwrap();
        assert!(!store.has("cancelled", "t1").await.unwrap());
        assert_eq!(store.cardinality("cancelled").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn clear_empties_every_namespace() {
        let store = InProcessStore::new();
        store.set_bytes("agency", "91", vec![1]).await.unwrap();
        store.add("cancelled", "t1").await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.get_bytes("agency", "91").await.unwrap(), None);
        assert_eq!(store.cardinality("cancelled").await.unwrap(), 0);
    }
}
