//! Fixed-width integer layouts shared by every on-disk structure.
//!
//! All multi-byte integers are big-endian. Encoding and decoding are exact
//! inverses over the full i32/i64 domains.

use crate::{Error, Result};

pub const SIZE_OF_I32: usize = std::mem::size_of::<i32>();
pub const SIZE_OF_I64: usize = std::mem::size_of::<i64>();

pub fn i32_to_bytes(v: i32) -> [u8; SIZE_OF_I32] {
    v.to_be_bytes()
}

pub fn i64_to_bytes(v: i64) -> [u8; SIZE_OF_I64] {
    v.to_be_bytes()
}

/// Read an i32 off the front of `bytes`, returning the value and the rest.
pub fn get_i32(bytes: &[u8]) -> Result<(i32, &[u8])> {
    if bytes.len() < SIZE_OF_I32 {
        return Err(Error::Decode("truncated i32".into()));
    }
    let v = i32::from_be_bytes(bytes[..SIZE_OF_I32].try_into().unwrap());
    Ok((v, &bytes[SIZE_OF_I32..]))
}

/// Read an i64 off the front of `bytes`, returning the value and the rest.
pub fn get_i64(bytes: &[u8]) -> Result<(i64, &[u8])> {
    if bytes.len() < SIZE_OF_I64 {
        return Err(Error::Decode("truncated i64".into()));
    }
    let v = i64::from_be_bytes(bytes[..SIZE_OF_I64].try_into().unwrap());
    Ok((v, &bytes[SIZE_OF_I64..]))
}
