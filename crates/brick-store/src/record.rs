//! The fixed-size metadata record mapping a logical key to its blocks.

use crate::codec::{get_i32, get_i64, i32_to_bytes, i64_to_bytes, SIZE_OF_I32, SIZE_OF_I64};
use crate::compress::CompressionType;
use crate::{Error, Result};

/// Encoded size of a [`BlockRecord`]. Always fits the primitive's
/// per-value cap with room to spare.
pub const RECORD_SIZE: usize = 2 * SIZE_OF_I64 + SIZE_OF_I32 + 1;

/// Where a logical value's chunks live.
///
/// ┌───────────────────────────────────────────────────────────┐
/// │ BlockRecord                                               │
/// │┌ ─ ─ ─ ─ ─ ─ ┬ ─ ─ ─ ─ ─ ┬ ─ ─ ─ ─ ─ ─ ─ ┬ ─ ─ ─ ─ ─ ─ ─ │
/// │  start block │ end block │ original size │ compression  ││
/// ││     i64     │    i64    │      i32      │      u8       │
/// │ ─ ─ ─ ─ ─ ─ ─ ┘─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ┘─ ─ ─ ─ ─ ─ ─ ┘│
/// └───────────────────────────────────────────────────────────┘
///
/// The value's compressed payload occupies blocks `start_block` through
/// `end_block` inclusive, in ascending id order with no gaps.
/// `original_size` is the value's length before compression; zero means an
/// empty value, whose block range is unused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRecord {
    pub original_size: i32,
    pub start_block: i64,
    pub end_block: i64,
    pub compression: CompressionType,
}

impl BlockRecord {
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(RECORD_SIZE);
        buf.extend_from_slice(&i64_to_bytes(self.start_block));
        buf.extend_from_slice(&i64_to_bytes(self.end_block));
        buf.extend_from_slice(&i32_to_bytes(self.original_size));
        buf.push(self.compression.into());
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != RECORD_SIZE {
            return Err(Error::Decode(
                format!("block record must be {} bytes, got {}", RECORD_SIZE, bytes.len()).into(),
            ));
        }
        let (start_block, rest) = get_i64(bytes)?;
        let (end_block, rest) = get_i64(rest)?;
        let (original_size, rest) = get_i32(rest)?;
        let compression = CompressionType::try_from(rest[0])?;
        if original_size < 0 {
            return Err(Error::Decode("negative original size".into()));
        }
        if start_block > end_block {
            return Err(Error::Decode("inverted block range".into()));
        }
        Ok(Self {
            original_size,
            start_block,
            end_block,
            compression,
        })
    }

    /// True for the record of an empty value, which references no blocks.
    pub fn is_empty_value(&self) -> bool {
        self.original_size == 0
    }

    pub fn block_count(&self) -> i64 {
        if self.is_empty_value() {
            0
        } else {
            self.end_block - self.start_block + 1
        }
    }
}
