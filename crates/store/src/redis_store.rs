use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use redis::{aio::ConnectionManager, AsyncCommands};

use crate::error::StoreResult;
use crate::namespace::NamespacePolicy;
use crate::traits::Store;

/// The external-cache backend: every namespace is a Redis hash or set, with
/// an optional in-process hot cache layered in front per [`NamespacePolicy`].
pub struct RedisStore {
    connection: ConnectionManager,
    policy: NamespacePolicy,
    hot_cache: DashMap<(String, String), (Instant, Vec<u8>)>,
}

impl RedisStore {
    pub async fn connect(url: &str, policy: NamespacePolicy) -> StoreResult<Self> {
        let client = redis::Client::open(url)?;
        let connection = client.get_connection_manager().await?;
        Ok(Self {
            connection,
            policy,
            hot_cache: DashMap::new(),
        })
    }

    fn hot_get(&self, namespace: &str, key: &str) -> Option<Vec<u8>> {
        let config = self.policy.for_namespace(namespace);
        if !config.cache {
            return None;
        }
        let cache_key = (namespace.to_owned(), key.to_owned());
        let entry = self.hot_cache.get(&cache_key)?;
        let (cached_at, value) = entry.value();
        if fresh(*cached_at, config.expiry) {
            Some(value.clone())
        } else {
            drop(entry);
            self.hot_cache.remove(&cache_key);
            None
        }
    }

    fn hot_put(&self, namespace: &str, key: &str, value: Vec<u8>) {
        let config = self.policy.for_namespace(namespace);
        if config.cache {
            self.hot_cache
                .insert((namespace.to_owned(), key.to_owned()), (Instant::now(), value));
        }
    }

    fn hot_invalidate(&self, namespace: &str, key: &str) {
        self.hot_cache
            .remove(&(namespace.to_owned(), key.to_owned()));
    }
}

fn fresh(cached_at: Instant, expiry: Option<Duration>) -> bool {
    match expiry {
        Some(expiry) => cached_at.elapsed() < expiry,
        None => true,
    }
}

#[async_trait]
impl Store for RedisStore {
    async fn get_bytes(&self, namespace: &str, key: &str) -> StoreResult<Option<Vec<u8>>> {
        if let Some(value) = self.hot_get(namespace, key) {
            return Ok(Some(value));
        }
        let mut conn = self.connection.clone();
        let value: Option<Vec<u8>> = conn.hget(namespace, key).await?;
        if let Some(value) = &value {
            self.hot_put(namespace, key, value.clone());
        }
        Ok(value)
    }

    async fn set_bytes(&self, namespace: &str, key: &str, value: Vec<u8>) -> StoreResult<()> {
        let mut conn = self.connection.clone();
        conn.hset::<_, _, _, ()>(namespace, key, &value).await?;
        self.hot_invalidate(namespace, key);
        Ok(())
    }

    async fn delete(&self, namespace: &str, key: &str) -> StoreResult<()> {
        let mut conn = self.connection.clone();
        conn.hdel::<_, _, ()>(namespace, key).await?;
        self.hot_invalidate(namespace, key);
        Ok(())
    }

    async fn add(&self, namespace: &str, value: &str) -> StoreResult<()> {
        let mut conn = self.connection.clone();
        conn.sadd::<_, _, ()>(namespace, value).await?;
        Ok(())
    }

    async fn remove(&self, namespace: &str, value: &str) -> StoreResult<()> {
        let mut conn = self.connection.clone();
        conn.srem::<_, _, ()>(namespace, value).await?;
        Ok(())
    }

    async fn has(&self, namespace: &str, value: &str) -> StoreResult<bool> {
        let mut conn = self.connection.clone();
        Ok(conn.sismember(namespace, value).await?)
    }

    async fn cardinality(&self, namespace: &str) -> StoreResult<usize> {
        let mut conn = self.connection.clone();
        Ok(conn.scard(namespace).await?)
    }

    async fn clear(&self) -> StoreResult<()> {
        let mut conn = self.connection.clone();
        redis::cmd("FLUSHDB").query_async::<_, ()>(&mut conn).await?;
        self.hot_cache.clear();
        Ok(())
    }
}
