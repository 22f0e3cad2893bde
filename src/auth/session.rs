//! Session / refresh record storage.
//!
//! # Responsibilities
//! - Track one record per live refresh credential
//! - Provide an atomic take primitive for rotation
//! - Remove records on logout and on expiry
//!
//! # Design Decisions
//! - Records are keyed by the SHA-256 digest of the refresh value; raw
//!   refresh tokens never reach the store
//! - `take` is single-writer-wins: of N concurrent callers with the same
//!   key, exactly one receives the record
//! - Async trait surface so a database-backed store can slot in

use std::sync::Arc;

use dashmap::DashMap;
use futures_util::future::BoxFuture;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::token::Subject;
use crate::observability::metrics;

/// Server-side state of one refresh credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    /// Stable across rotations; identifies the login session.
    pub session_id: Uuid,
    pub subject: Subject,
    pub device_id: Option<String>,
    /// Unix seconds.
    pub issued_at: u64,
    /// Unix seconds. The record is dead at and after this instant.
    pub expires_at: u64,
}

impl SessionRecord {
    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at <= now
    }
}

/// Storage failure (connection loss, serialization). Never a lookup miss.
#[derive(Debug, thiserror::Error)]
#[error("session store unavailable: {0}")]
pub struct SessionStoreError(pub String);

/// Persistence for session records.
pub trait SessionStore: Send + Sync + 'static {
    /// Store a record under the digest of its refresh value.
    fn insert(&self, key: String, record: SessionRecord)
        -> BoxFuture<'_, Result<(), SessionStoreError>>;

    /// Atomically remove and return the record. At most one caller per key
    /// ever receives `Some`.
    fn take(&self, key: &str) -> BoxFuture<'_, Result<Option<SessionRecord>, SessionStoreError>>;

    /// Remove every record whose expiry is at or before `now`. Returns the
    /// number removed.
    fn purge_expired(&self, now: u64) -> BoxFuture<'_, Result<usize, SessionStoreError>>;

    /// Number of stored records.
    fn count(&self) -> BoxFuture<'_, Result<usize, SessionStoreError>>;
}

/// Digest under which a refresh value is stored.
pub fn refresh_key(refresh_token: &str) -> String {
    format!("{:x}", Sha256::digest(refresh_token.as_bytes()))
}

/// A thread-safe in-process session store.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    inner: Arc<DashMap<String, SessionRecord>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn insert(
        &self,
        key: String,
        record: SessionRecord,
    ) -> BoxFuture<'_, Result<(), SessionStoreError>> {
        Box::pin(async move {
            self.inner.insert(key, record);
            metrics::record_active_sessions(self.inner.len());
            Ok(())
        })
    }

    fn take(&self, key: &str) -> BoxFuture<'_, Result<Option<SessionRecord>, SessionStoreError>> {
        let key = key.to_string();
        Box::pin(async move {
            // DashMap::remove holds the shard write lock, so only one caller
            // observes the entry.
            let taken = self.inner.remove(&key).map(|(_, record)| record);
            metrics::record_active_sessions(self.inner.len());
            Ok(taken)
        })
    }

    fn purge_expired(&self, now: u64) -> BoxFuture<'_, Result<usize, SessionStoreError>> {
        Box::pin(async move {
            let before = self.inner.len();
            self.inner.retain(|_, record| !record.is_expired(now));
            let after = self.inner.len();
            metrics::record_active_sessions(after);
            Ok(before.saturating_sub(after))
        })
    }

    fn count(&self) -> BoxFuture<'_, Result<usize, SessionStoreError>> {
        Box::pin(async move { Ok(self.inner.len()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(expires_at: u64) -> SessionRecord {
        SessionRecord {
            session_id: Uuid::new_v4(),
            subject: Subject::from("user-1"),
            device_id: Some("phone".to_string()),
            issued_at: 0,
            expires_at,
        }
    }

    #[test]
    fn test_refresh_key_is_stable_hex_digest() {
        let a = refresh_key("token-a");
        assert_eq!(a, refresh_key("token-a"));
        assert_ne!(a, refresh_key("token-b"));
        assert_eq!(a.len(), 64);
        assert!(!a.contains("token-a"));
    }

    #[tokio::test]
    async fn test_take_is_single_use() {
        let store = InMemorySessionStore::new();
        store.insert("k".to_string(), record(u64::MAX)).await.unwrap();

        assert!(store.take("k").await.unwrap().is_some());
        assert!(store.take("k").await.unwrap().is_none());
        assert!(store.take("unknown").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_take_has_one_winner() {
        let store = InMemorySessionStore::new();
        store.insert("k".to_string(), record(u64::MAX)).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.take("k").await.unwrap().is_some() }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = InMemorySessionStore::new();
        store.insert("old".to_string(), record(100)).await.unwrap();
        store.insert("edge".to_string(), record(200)).await.unwrap();
        store.insert("live".to_string(), record(300)).await.unwrap();

        assert_eq!(store.purge_expired(200).await.unwrap(), 2);
        assert_eq!(store.count().await.unwrap(), 1);
        assert!(store.take("live").await.unwrap().is_some());
    }
}
