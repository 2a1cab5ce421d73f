//! On-disk record format.
//!
//! Segments are sequences of fixed 32KB blocks. Each entry is framed as
//! one or more chunks laid out contiguously within a block; a chunk never
//! crosses a block boundary. Chunk layout, little-endian:
//!
//! ```text
//! offset 0..4   u32  CRC32 (IEEE) over the payload bytes only
//! offset 4..6   u16  payload length
//! offset 6..7   u8   chunk type: FULL, FIRST, MIDDLE, LAST
//! offset 7..    payload
//! ```
//!
//! Entries that don't fit in the remainder of a block are fragmented
//! across blocks using FIRST, MIDDLE, and LAST chunks. Trailing unused
//! bytes of a block are zero padding; an all-zero header decodes as an
//! empty FULL chunk, which readers treat as the end-of-data sentinel.

use crate::error::{Error, Result};
use crate::util::crc::{crc32, verify_crc};

/// Block size (32KB).
pub const BLOCK_SIZE: usize = 32 * 1024;

/// Header size: CRC (4) + Length (2) + Type (1) = 7 bytes.
pub const HEADER_SIZE: usize = 7;

/// Maximum payload size of a single chunk.
pub const MAX_PAYLOAD_SIZE: usize = BLOCK_SIZE - HEADER_SIZE;

/// Chunk types for entry framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ChunkType {
    /// Complete entry in a single chunk.
    Full = 0,
    /// First chunk of a fragmented entry.
    First = 1,
    /// Middle chunk(s) of a fragmented entry.
    Middle = 2,
    /// Last chunk of a fragmented entry.
    Last = 3,
}

impl ChunkType {
    /// Create from byte value.
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(ChunkType::Full),
            1 => Some(ChunkType::First),
            2 => Some(ChunkType::Middle),
            3 => Some(ChunkType::Last),
            _ => None,
        }
    }

    /// Convert to byte.
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Check if a chunk of this type may begin an entry.
    pub fn begins_entry(self) -> bool {
        matches!(self, ChunkType::Full | ChunkType::First)
    }

    /// Check if a chunk of this type ends an entry.
    pub fn ends_entry(self) -> bool {
        matches!(self, ChunkType::Full | ChunkType::Last)
    }
}

/// A decoded chunk, borrowing its payload from the block buffer.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Chunk<'a> {
    pub payload: &'a [u8],
    pub kind: ChunkType,
}

/// Append the framed form of one chunk (header + payload) to `buf`.
pub(crate) fn encode_chunk_into(buf: &mut Vec<u8>, payload: &[u8], kind: ChunkType) {
    debug_assert!(payload.len() <= MAX_PAYLOAD_SIZE);

    let mut header = [0u8; HEADER_SIZE];
    header[0..4].copy_from_slice(&crc32(payload).to_le_bytes());
    header[4..6].copy_from_slice(&(payload.len() as u16).to_le_bytes());
    header[6] = kind.to_byte();

    buf.extend_from_slice(&header);
    buf.extend_from_slice(payload);
}

/// Decode the chunk starting at the beginning of `buf`.
///
/// Returns [`Error::EndOfBlock`] when no well-formed chunk fits in `buf`
/// (callers treat this as "no more chunks in this block"),
/// [`Error::InvalidCrc`] on a payload checksum mismatch, and
/// [`Error::InvalidChunkType`] on an unknown type byte.
pub(crate) fn decode_chunk(buf: &[u8]) -> Result<Chunk<'_>> {
    if buf.len() < HEADER_SIZE {
        return Err(Error::EndOfBlock);
    }

    let expected_crc = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let length = u16::from_le_bytes([buf[4], buf[5]]) as usize;
    let type_byte = buf[6];

    if HEADER_SIZE + length > buf.len() {
        return Err(Error::EndOfBlock);
    }

    let payload = &buf[HEADER_SIZE..HEADER_SIZE + length];
    if !verify_crc(payload, expected_crc) {
        return Err(Error::InvalidCrc);
    }

    let kind = ChunkType::from_byte(type_byte).ok_or(Error::InvalidChunkType(type_byte))?;
    Ok(Chunk { payload, kind })
}
