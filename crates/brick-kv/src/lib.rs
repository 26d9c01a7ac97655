//! The size-capped key/value primitive the block layer builds on.
//!
//! Stores opened through a [`KvFactory`] accept values of at most
//! [`value_limit`](KvStore::value_limit) bytes per key (100 by default) and
//! reject anything larger. Storing arbitrary-size values on top of that
//! restriction is the job of the `brick-store` crate; this crate only pins
//! down the contract it relies on and provides the in-process
//! implementation ([`MemKv`]) used in tests and examples.
//!
//! Writes to a single key are atomic: a reader sees either the previous
//! value or the new one, never a mix.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub mod mem;
pub use mem::{MemKv, MemKvFactory};

/// Per-value byte cap of the stock primitive.
pub const DEFAULT_VALUE_LIMIT: usize = 100;

pub type KvResult<T> = std::result::Result<T, KvError>;

#[derive(Debug, Error)]
pub enum KvError {
    #[error("value of {len} bytes exceeds the {limit} byte per-value limit")]
    ValueTooLarge { limit: usize, len: usize },
}

/// A single named store.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn read(&self, key: &[u8]) -> KvResult<Option<Bytes>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// A value longer than [`value_limit`](KvStore::value_limit) is
    /// rejected with [`KvError::ValueTooLarge`], never truncated or
    /// silently dropped.
    async fn write(&self, key: &[u8], value: &[u8]) -> KvResult<()>;

    /// The fixed per-value byte cap this store enforces.
    fn value_limit(&self) -> usize;
}

/// Opens named stores.
#[async_trait]
pub trait KvFactory: Send + Sync {
    /// Open the store named `name`, creating it on first use.
    ///
    /// Idempotent per name within a process: reopening a name yields a
    /// handle onto the same store.
    async fn open(&self, name: &[u8]) -> KvResult<Arc<dyn KvStore>>;
}
