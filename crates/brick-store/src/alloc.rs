//! Durable allocation of block ids.

use std::sync::Arc;

use brick_kv::KvStore;
use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::codec::{get_i64, i64_to_bytes};
use crate::{Error, Result};

/// Key in the chunk store reserved for the cursor. Block ids start at 1,
/// so the key never collides with a chunk key.
pub(crate) const CURSOR_KEY: &[u8] = b"0";

const FIRST_BLOCK_ID: i64 = 1;

/// Durable source of unique, monotonically increasing block ids.
///
/// The cursor holds the next unused id. It is restored from the chunk
/// store at construction and written back inside the same critical section
/// that advances it, so two reservations can never observe the same value
/// and a restart continues where the previous process stopped. Ids are
/// never reused, even when the values they belonged to are overwritten.
pub struct BlockAllocator {
    chunks: Arc<dyn KvStore>,
    cursor: Mutex<i64>,
}

impl BlockAllocator {
    /// Restore the allocator for `chunks`, starting at id 1 when no cursor
    /// has ever been persisted.
    pub async fn restore(chunks: Arc<dyn KvStore>) -> Result<Self> {
        let cursor = match chunks.read(CURSOR_KEY).await? {
            Some(bytes) => decode_cursor(&bytes)?,
            None => FIRST_BLOCK_ID,
        };
        debug!(cursor, "restored block allocator");
        Ok(Self {
            chunks,
            cursor: Mutex::new(cursor),
        })
    }

    /// Reserve `count` contiguous ids and return the first.
    ///
    /// The advanced cursor is persisted before the lock is released, and no
    /// other caller can be handed an id inside the run.
    pub async fn reserve(&self, count: i64) -> Result<i64> {
        debug_assert!(count > 0);
        let mut cursor = self.cursor.lock().await;
        let first = *cursor;
        let next = first + count;
        self.chunks.write(CURSOR_KEY, &i64_to_bytes(next)).await?;
        *cursor = next;
        trace!(first, count, "reserved block run");
        Ok(first)
    }

    /// Reserve a single id.
    pub async fn allocate(&self) -> Result<i64> {
        self.reserve(1).await
    }
}

fn decode_cursor(bytes: &[u8]) -> Result<i64> {
    let (cursor, rest) = get_i64(bytes)?;
    if !rest.is_empty() || cursor < FIRST_BLOCK_ID {
        return Err(Error::Decode("invalid allocator cursor".into()));
    }
    Ok(cursor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brick_kv::MemKv;
    use std::collections::HashSet;

    async fn allocator() -> (Arc<MemKv>, BlockAllocator) {
        let chunks = Arc::new(MemKv::new());
        let alloc = BlockAllocator::restore(chunks.clone() as Arc<dyn KvStore>)
            .await
            .unwrap();
        (chunks, alloc)
    }

    #[tokio::test]
    async fn sequential_ids_increase_by_one() {
        let (_, alloc) = allocator().await;
        for expected in 1..=20i64 {
            assert_eq!(alloc.allocate().await.unwrap(), expected);
        }
    }

    #[tokio::test]
    async fn runs_are_contiguous_and_disjoint() {
        let (_, alloc) = allocator().await;
        let a = alloc.reserve(3).await.unwrap();
        let b = alloc.reserve(5).await.unwrap();
        let c = alloc.allocate().await.unwrap();
        assert_eq!(a, 1);
        assert_eq!(b, 4);
        assert_eq!(c, 9);
    }

    #[tokio::test]
    async fn cursor_survives_restart() {
        let (chunks, alloc) = allocator().await;
        for _ in 0..7 {
            alloc.allocate().await.unwrap();
        }
        drop(alloc);

        let revived = BlockAllocator::restore(chunks as Arc<dyn KvStore>)
            .await
            .unwrap();
        assert_eq!(revived.allocate().await.unwrap(), 8);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_ids_are_distinct() {
        let (_, alloc) = allocator().await;
        let alloc = Arc::new(alloc);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let alloc = alloc.clone();
            handles.push(tokio::spawn(async move {
                let mut ids = Vec::new();
                for _ in 0..32 {
                    ids.push(alloc.allocate().await.unwrap());
                }
                ids
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.await.unwrap() {
                assert!(seen.insert(id), "id {} handed out twice", id);
            }
        }
        assert_eq!(seen.len(), 8 * 32);
        assert_eq!(*seen.iter().min().unwrap(), 1);
        assert_eq!(*seen.iter().max().unwrap(), 8 * 32);
    }

    #[tokio::test]
    async fn rejects_garbage_cursor() {
        let chunks = Arc::new(MemKv::new());
        chunks.write(CURSOR_KEY, b"not a cursor").await.unwrap();
        assert!(BlockAllocator::restore(chunks as Arc<dyn KvStore>)
            .await
            .is_err());
    }
}
