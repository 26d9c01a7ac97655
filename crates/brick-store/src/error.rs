use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Kv(#[from] brick_kv::KvError),

    #[error("decode error ({0})")]
    Decode(Box<str>),

    #[error("decompression failed: {0}")]
    Decompress(#[from] lz4_flex::block::DecompressError),

    /// A committed record references a block the chunk store no longer has.
    /// The underlying store broke its durability contract; there is no
    /// local repair.
    #[error("block {id} referenced by a committed record is missing from the chunk store")]
    MissingBlock { id: i64 },

    #[error("value of {len} bytes cannot be described by a block record")]
    ValueTooLarge { len: usize },

    #[error("block size {block_size} is unusable with the primitive's {limit} byte per-value limit")]
    BlockSize { block_size: usize, limit: usize },
}
