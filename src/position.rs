//! Positional handles into the log.
//!
//! A [`Position`] locates the header of the chunk that begins an entry:
//! which segment, which block within the segment, and the byte offset
//! within that block. Positions are minted by writes and stay valid for
//! the life of the log, including across process restarts.

use std::fmt;

use crate::error::{Error, Result};

/// Length of the encoded wire form: three little-endian u32s.
pub const ENCODED_LEN: usize = 12;

/// A durable handle to an entry in the log.
///
/// Ordering is lexicographic over `(segment_id, block_id, offset)`, so
/// positions returned by successive writes compare strictly increasing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// Segment file id.
    pub segment_id: u32,
    /// Block id within the segment.
    pub block_id: u32,
    /// Byte offset of the chunk header within the block.
    pub offset: u32,
}

impl Position {
    /// Create a position from its parts.
    pub fn new(segment_id: u32, block_id: u32, offset: u32) -> Self {
        Self {
            segment_id,
            block_id,
            offset,
        }
    }

    /// Encode into the 12-byte little-endian wire form.
    pub fn encode(&self) -> [u8; ENCODED_LEN] {
        let mut buf = [0u8; ENCODED_LEN];
        buf[0..4].copy_from_slice(&self.segment_id.to_le_bytes());
        buf[4..8].copy_from_slice(&self.block_id.to_le_bytes());
        buf[8..12].copy_from_slice(&self.offset.to_le_bytes());
        buf
    }

    /// Decode from the 12-byte wire form.
    ///
    /// Fails with [`Error::InvalidFormat`] unless `data` is exactly 12 bytes.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() != ENCODED_LEN {
            return Err(Error::InvalidFormat);
        }
        Ok(Self {
            segment_id: u32::from_le_bytes([data[0], data[1], data[2], data[3]]),
            block_id: u32::from_le_bytes([data[4], data[5], data[6], data[7]]),
            offset: u32::from_le_bytes([data[8], data[9], data[10], data[11]]),
        })
    }

    /// Encode as a lowercase 24-character hex string, suitable for log lines.
    pub fn encode_hex(&self) -> String {
        hex::encode(self.encode())
    }

    /// Decode from the hex string form produced by [`Position::encode_hex`].
    ///
    /// Accepts upper- or lowercase hex of length 24; anything else fails
    /// with [`Error::InvalidFormat`].
    pub fn decode_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|_| Error::InvalidFormat)?;
        Self::decode(&bytes)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode_hex())
    }
}
