//! Whole-payload compression with pass-through.
//!
//! Payloads are compressed before chunking. When compression does not make
//! the payload smaller (high-entropy or tiny inputs), the original bytes
//! are stored instead and the [`CompressionType`] tag records that, so the
//! read path never has to guess which bytes it is holding.

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    /// The stored bytes are the caller's bytes, unchanged.
    None,
    Lz4,
}

impl CompressionType {
    pub fn is_none(&self) -> bool {
        matches!(self, CompressionType::None)
    }
}

impl TryFrom<u8> for CompressionType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(CompressionType::None),
            1 => Ok(CompressionType::Lz4),
            _ => Err(Error::Decode(
                format!("invalid compression type: {}", value).into(),
            )),
        }
    }
}

impl From<CompressionType> for u8 {
    fn from(value: CompressionType) -> Self {
        match value {
            CompressionType::None => 0,
            CompressionType::Lz4 => 1,
        }
    }
}

/// Compress `data`, falling back to the original bytes when compression
/// does not shrink them. The returned tag must be kept with the payload.
pub fn compress(data: &[u8]) -> (Vec<u8>, CompressionType) {
    let compressed = lz4_flex::compress(data);
    if compressed.len() < data.len() {
        (compressed, CompressionType::Lz4)
    } else {
        (data.to_vec(), CompressionType::None)
    }
}

/// Undo [`compress`].
///
/// `original_len` is the payload length before compression. A payload that
/// does not come back to exactly that length is corrupt.
pub fn decompress(
    data: Vec<u8>,
    original_len: usize,
    compression: CompressionType,
) -> Result<Vec<u8>> {
    let inflated = match compression {
        CompressionType::None => data,
        CompressionType::Lz4 => lz4_flex::decompress(&data, original_len)?,
    };
    if inflated.len() != original_len {
        return Err(Error::Decode(
            format!(
                "payload inflated to {} bytes, expected {}",
                inflated.len(),
                original_len
            )
            .into(),
        ));
    }
    Ok(inflated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, RngCore, SeedableRng};

    #[test]
    fn repetitive_data_shrinks() {
        let data = vec![0xAAu8; 20000];
        let (payload, compression) = compress(&data);
        assert_eq!(compression, CompressionType::Lz4);
        assert!(payload.len() < data.len());
        assert_eq!(decompress(payload, data.len(), compression).unwrap(), data);
    }

    #[test]
    fn random_data_passes_through() {
        let mut data = vec![0u8; 20000];
        StdRng::seed_from_u64(7).fill_bytes(&mut data);
        let (payload, compression) = compress(&data);
        assert_eq!(compression, CompressionType::None);
        assert_eq!(payload, data);
        assert_eq!(decompress(payload, data.len(), compression).unwrap(), data);
    }

    #[test]
    fn tiny_inputs_round_trip() {
        for data in [&b""[..], &b"a"[..], &b"ab"[..], &[0u8, 0u8][..]] {
            let (payload, compression) = compress(data);
            assert_eq!(
                decompress(payload, data.len(), compression).unwrap(),
                data.to_vec()
            );
        }
    }

    #[test]
    fn length_mismatch_is_corruption() {
        let data = vec![0xAAu8; 20000];
        let (payload, compression) = compress(&data);
        assert!(decompress(payload, data.len() - 1, compression).is_err());

        // pass-through payload whose recorded length disagrees
        assert!(decompress(vec![1, 2, 3], 4, CompressionType::None).is_err());
    }

    #[test]
    fn tag_byte_round_trip() {
        for tag in [CompressionType::None, CompressionType::Lz4] {
            assert_eq!(CompressionType::try_from(u8::from(tag)).unwrap(), tag);
        }
        assert!(CompressionType::try_from(2).is_err());
    }
}
