use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::StoreResult;

/// The namespaced key-value interface shared by both backends.
///
/// Every key lives inside a namespace: `hash` operations address one value
/// per `(namespace, key)` pair, `set` operations address membership within
/// one `namespace`. A miss never surfaces as an error — `get` returns
/// `None`, not `Err` — backend failures are reserved for genuine I/O or
/// protocol problems.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get_bytes(&self, namespace: &str, key: &str) -> StoreResult<Option<Vec<u8>>>;
    async fn set_bytes(&self, namespace: &str, key: &str, value: Vec<u8>) -> StoreResult<()>;
    async fn delete(&self, namespace: &str, key: &str) -> StoreResult<()>;

    async fn add(&self, namespace: &str, value: &str) -> StoreResult<()>;
    async fn remove(&self, namespace: &str, value: &str) -> StoreResult<()>;
    async fn has(&self, namespace: &str, value: &str) -> StoreResult<bool>;
    async fn cardinality(&self, namespace: &str) -> StoreResult<usize>;

    /// Removes every namespace. Used by tests and by `rebuild cache`
    /// operators.
    async fn clear(&self) -> StoreResult<()>;
}

/// Typed convenience layer over [`Store`], encoding values with `bincode`.
/// Not part of the core trait so that a `dyn Store` stays object-safe.
#[async_trait]
pub trait StoreExt: Store {
    async fn get<T: DeserializeOwned>(&self, namespace: &str, key: &str) -> StoreResult<Option<T>> {
        let Some(bytes) = self.get_bytes(namespace, key).await? else {
            return Ok(None);
        };
        match bincode::deserialize(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                log::warn!("discarding corrupt entry at {namespace}/{key}");
                Ok(None)
            }
        }
    }

    async fn set<T: Serialize + Sync>(&self, namespace: &str, key: &str, value: &T) -> StoreResult<()> {
        let bytes = bincode::serialize(value)
            .map_err(|why| crate::error::StoreError::Backend(why.to_string()))?;
        self.set_bytes(namespace, key, bytes).await
    }
}

impl<S: Store + ?Sized> StoreExt for S {}
