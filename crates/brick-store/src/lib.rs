//! # BlockStore Documentation
//!
//! BlockStore stores arbitrary-size values on top of a key/value primitive
//! that caps every value at a fixed small size (100 bytes). A value is
//! compressed, split into chunks no larger than the cap, and the chunks
//! are written to a shared chunk store under freshly allocated integer
//! ids. A fixed-size record in a per-instance metadata store maps the
//! caller's key to the chunk range.
//!
//! ## Write path
//!
//! ```text
//! value ─→ compress ─→ split ─→ reserve id run ─→ chunk writes ─→ record write
//!                                                                (commit point)
//! ```
//!
//! The record write is the commit point: a crash before it leaves the old
//! value intact and visible; chunks written by a write that never commits
//! stay orphaned in the chunk store (nothing reclaims them). The read path
//! is the mirror: record lookup, chunk reads over the range in ascending
//! id order, concatenate, decompress.
//!
//! ## On-disk layouts
//!
//! Chunks are raw bytes keyed by the decimal text of their id. The record
//! is 21 bytes:
//!
//! ┌───────────────────────────────────────────────────────────┐
//! │ BlockRecord                                               │
//! │┌ ─ ─ ─ ─ ─ ─ ┬ ─ ─ ─ ─ ─ ┬ ─ ─ ─ ─ ─ ─ ─ ┬ ─ ─ ─ ─ ─ ─ ─ │
//! │  start block │ end block │ original size │ compression  ││
//! ││     i64     │    i64    │      i32      │      u8       │
//! │ ─ ─ ─ ─ ─ ─ ─ ┘─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ┘─ ─ ─ ─ ─ ─ ─ ┘│
//! └───────────────────────────────────────────────────────────┘
//!
//! The allocator cursor (the next unused block id, an i64) lives in the
//! chunk store under the reserved key `"0"`; block ids start at 1.

pub mod alloc;
pub mod codec;
pub mod compress;
pub mod error;
pub mod record;
pub mod store;

pub use alloc::BlockAllocator;
pub use compress::CompressionType;
pub use error::{Error, Result};
pub use record::BlockRecord;
pub use store::{BlockStore, DEFAULT_BLOCK_SIZE};
