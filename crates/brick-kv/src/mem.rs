use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::{KvError, KvFactory, KvResult, KvStore, DEFAULT_VALUE_LIMIT};

/// In-memory [`KvStore`].
///
/// Enforces the same per-value cap a real backend would, so code layered on
/// top exercises the size restriction it exists to work around.
#[derive(Debug)]
pub struct MemKv {
    entries: Mutex<FxHashMap<Vec<u8>, Bytes>>,
    value_limit: usize,
}

impl MemKv {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_VALUE_LIMIT)
    }

    pub fn with_limit(value_limit: usize) -> Self {
        Self {
            entries: Mutex::new(FxHashMap::default()),
            value_limit,
        }
    }
}

impl Default for MemKv {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvStore for MemKv {
    async fn read(&self, key: &[u8]) -> KvResult<Option<Bytes>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn write(&self, key: &[u8], value: &[u8]) -> KvResult<()> {
        if value.len() > self.value_limit {
            return Err(KvError::ValueTooLarge {
                limit: self.value_limit,
                len: value.len(),
            });
        }
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_vec(), Bytes::copy_from_slice(value));
        Ok(())
    }

    fn value_limit(&self) -> usize {
        self.value_limit
    }
}

/// [`KvFactory`] handing out [`MemKv`] stores, one per name.
#[derive(Debug)]
pub struct MemKvFactory {
    stores: Mutex<FxHashMap<Vec<u8>, Arc<MemKv>>>,
    value_limit: usize,
}

impl MemKvFactory {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_VALUE_LIMIT)
    }

    /// Factory whose stores enforce `value_limit` instead of the default.
    pub fn with_limit(value_limit: usize) -> Self {
        Self {
            stores: Mutex::new(FxHashMap::default()),
            value_limit,
        }
    }
}

impl Default for MemKvFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvFactory for MemKvFactory {
    async fn open(&self, name: &[u8]) -> KvResult<Arc<dyn KvStore>> {
        let mut stores = self.stores.lock().unwrap();
        let store = stores
            .entry(name.to_vec())
            .or_insert_with(|| {
                trace!(name = ?Bytes::copy_from_slice(name), "creating store");
                Arc::new(MemKv::with_limit(self.value_limit))
            })
            .clone();
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_your_writes() {
        let store = MemKv::new();
        assert_eq!(store.read(b"k").await.unwrap(), None);
        store.write(b"k", b"v").await.unwrap();
        assert_eq!(store.read(b"k").await.unwrap(), Some(Bytes::from_static(b"v")));
        store.write(b"k", b"w").await.unwrap();
        assert_eq!(store.read(b"k").await.unwrap(), Some(Bytes::from_static(b"w")));
    }

    #[tokio::test]
    async fn cap_is_enforced() {
        let store = MemKv::new();
        store.write(b"full", &[7u8; 100]).await.unwrap();
        let err = store.write(b"over", &[7u8; 101]).await.unwrap_err();
        match err {
            KvError::ValueTooLarge { limit, len } => {
                assert_eq!(limit, 100);
                assert_eq!(len, 101);
            }
        }
        // the oversized write left nothing behind
        assert_eq!(store.read(b"over").await.unwrap(), None);
    }

    #[tokio::test]
    async fn open_is_idempotent_per_name() {
        let factory = MemKvFactory::new();
        let a = factory.open(b"inbox").await.unwrap();
        a.write(b"k", b"v").await.unwrap();

        let b = factory.open(b"inbox").await.unwrap();
        assert_eq!(b.read(b"k").await.unwrap(), Some(Bytes::from_static(b"v")));

        let other = factory.open(b"outbox").await.unwrap();
        assert_eq!(other.read(b"k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn factory_limit_applies_to_stores() {
        let factory = MemKvFactory::with_limit(8);
        let store = factory.open(b"s").await.unwrap();
        assert_eq!(store.value_limit(), 8);
        assert!(store.write(b"k", &[0u8; 9]).await.is_err());
    }
}
