use std::sync::Arc;

use brick_kv::{KvFactory, KvStore};
use bytes::Bytes;
use quick_cache::sync::Cache;
use tracing::{debug, trace};

use crate::alloc::BlockAllocator;
use crate::compress::{compress, decompress};
use crate::record::BlockRecord;
use crate::{Error, Result};

/// Name of the chunk store every [`BlockStore`] in a process shares.
const CHUNK_STORE_NAME: &[u8] = b"memory";

/// Upper bound on a single chunk, matching the stock primitive's cap.
pub const DEFAULT_BLOCK_SIZE: usize = 100;

const DEFAULT_CACHE_SIZE: usize = 1 << 10;

/// Arbitrary-size values over the size-capped primitive.
///
/// A value is compressed, split into chunks of at most the block size, and
/// the chunks are written to the shared chunk store under freshly allocated
/// ids. A fixed-size [`BlockRecord`] in the per-instance metadata store
/// maps the caller's key to the chunk range; writing that record is the
/// commit point. Superseded values keep their blocks — nothing reclaims
/// them, the record just stops pointing there.
pub struct BlockStore {
    name: String,
    chunks: Arc<dyn KvStore>,
    meta: Arc<dyn KvStore>,
    allocator: BlockAllocator,
    block_size: usize,
    cache: Cache<Vec<u8>, Bytes>,
}

impl std::fmt::Debug for BlockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockStore")
            .field("name", &self.name)
            .field("block_size", &self.block_size)
            .finish_non_exhaustive()
    }
}

impl BlockStore {
    /// Open the store named `name`, binding the shared chunk store and the
    /// named metadata store for the instance's lifetime.
    pub async fn open(factory: &dyn KvFactory, name: &str) -> Result<Self> {
        Self::open_with_block_size(factory, name, DEFAULT_BLOCK_SIZE).await
    }

    /// [`open`](Self::open) with a custom chunk size. Fails at open time if
    /// the primitive cannot hold chunks of that size.
    pub async fn open_with_block_size(
        factory: &dyn KvFactory,
        name: &str,
        block_size: usize,
    ) -> Result<Self> {
        let chunks = factory.open(CHUNK_STORE_NAME).await?;
        let meta = factory.open(name.as_bytes()).await?;
        let limit = chunks.value_limit();
        if block_size == 0 || block_size > limit {
            return Err(Error::BlockSize { block_size, limit });
        }
        let allocator = BlockAllocator::restore(chunks.clone()).await?;
        debug!(name, block_size, "opened block store");
        Ok(Self {
            name: name.to_owned(),
            chunks,
            meta,
            allocator,
            block_size,
            cache: Cache::new(DEFAULT_CACHE_SIZE),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// The metadata record is written last and is the commit point: until
    /// it lands, readers keep seeing the previous value, and chunks written
    /// by a write that never commits stay orphaned in the chunk store.
    pub async fn write(&self, key: &[u8], value: &[u8]) -> Result<()> {
        if value.len() > i32::MAX as usize {
            return Err(Error::ValueTooLarge { len: value.len() });
        }
        let (payload, compression) = compress(value);
        let chunk_count = payload.len().div_ceil(self.block_size) as i64;

        let (start_block, end_block) = if payload.is_empty() {
            // Only an empty value produces an empty payload. It still gets
            // a record, so reading it back is distinguishable from a key
            // that was never written.
            (0, 0)
        } else {
            let first = self.allocator.reserve(chunk_count).await?;
            for (i, chunk) in payload.chunks(self.block_size).enumerate() {
                let id = first + i as i64;
                self.chunks.write(block_key(id).as_bytes(), chunk).await?;
                trace!(id, len = chunk.len(), "wrote chunk");
            }
            (first, first + chunk_count - 1)
        };

        let record = BlockRecord {
            original_size: value.len() as i32,
            start_block,
            end_block,
            compression,
        };
        self.meta.write(key, &record.encode()).await?;
        self.cache.insert(key.to_vec(), Bytes::copy_from_slice(value));
        debug!(
            bytes = value.len(),
            blocks = chunk_count,
            "committed value"
        );
        Ok(())
    }

    /// Fetch the value stored under `key`, or `None` when the key was
    /// never written.
    pub async fn read(&self, key: &[u8]) -> Result<Option<Bytes>> {
        if let Some(value) = self.cache.get(key) {
            trace!(len = value.len(), "value cache hit");
            return Ok(Some(value));
        }
        let raw = match self.meta.read(key).await? {
            Some(raw) => raw,
            None => return Ok(None),
        };
        let record = BlockRecord::decode(&raw)?;
        let value = Bytes::from(self.assemble(&record).await?);
        self.cache.insert(key.to_vec(), value.clone());
        Ok(Some(value))
    }

    /// Collect the record's chunk range in ascending id order and undo the
    /// compression.
    async fn assemble(&self, record: &BlockRecord) -> Result<Vec<u8>> {
        if record.is_empty_value() {
            return Ok(Vec::new());
        }
        let mut payload = Vec::new();
        for id in record.start_block..=record.end_block {
            match self.chunks.read(block_key(id).as_bytes()).await? {
                Some(chunk) => payload.extend_from_slice(&chunk),
                None => return Err(Error::MissingBlock { id }),
            }
        }
        decompress(payload, record.original_size as usize, record.compression)
    }
}

/// Chunk-store key of a block: the decimal text of its id.
fn block_key(id: i64) -> String {
    id.to_string()
}
