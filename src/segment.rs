//! Segment files.
//!
//! A segment owns one `seg_{id}.log` file: a sequence of 32KB blocks,
//! written append-only. The trailing partial block (if any) lives in
//! memory as the *current block* and is reloaded from disk on open, so a
//! segment can be reopened and appended to at any block boundary state.
//!
//! Writes split an entry into chunks, buffer them in the current block,
//! and flush whole blocks to the file. Reads address a chunk by
//! `(block_id, offset)` and reassemble the entry across chunks and
//! blocks. The current block is served from memory so unsynced entries
//! read back correctly; one recently read disk block is cached.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::format::{self, ChunkType, BLOCK_SIZE, HEADER_SIZE, MAX_PAYLOAD_SIZE};
use crate::position::Position;

/// A block being built or cached in memory.
struct Block {
    /// Block id within the segment.
    id: u32,
    /// Block contents accumulated so far.
    data: Vec<u8>,
    /// Prefix of `data` already written to the file.
    flushed: usize,
}

/// The most recently read disk block.
struct CachedBlock {
    id: u32,
    data: Vec<u8>,
}

/// One append-only segment file of the log.
pub(crate) struct Segment {
    id: u32,
    file: File,
    closed: bool,
    current: Block,
    cached: Option<CachedBlock>,
}

impl Segment {
    /// Open a segment file, creating it if absent, and recover the
    /// trailing partial block into memory.
    pub(crate) fn open(id: u32, path: &Path) -> Result<Self> {
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;

        let size = file.seek(SeekFrom::End(0))?;
        let full_blocks = (size / BLOCK_SIZE as u64) as u32;
        let tail = (size % BLOCK_SIZE as u64) as usize;

        let mut data = Vec::with_capacity(BLOCK_SIZE);
        if tail > 0 {
            file.seek(SeekFrom::Start(size - tail as u64))?;
            data.resize(tail, 0);
            // The tail may still be in flight from another handle; take
            // whatever is actually there.
            let filled = read_up_to(&mut file, &mut data)?;
            data.truncate(filled);
        }

        let flushed = data.len();
        Ok(Self {
            id,
            file,
            closed: false,
            current: Block {
                id: full_blocks,
                data,
                flushed,
            },
            cached: None,
        })
    }

    /// The segment id.
    pub(crate) fn id(&self) -> u32 {
        self.id
    }

    /// Bytes appended to this segment: full blocks plus the bytes of the
    /// current block, whether or not they have reached the file yet.
    pub(crate) fn size(&self) -> u64 {
        self.current.id as u64 * BLOCK_SIZE as u64 + self.current.data.len() as u64
    }

    /// The id of the block currently being built. Blocks before it are
    /// complete on disk.
    pub(crate) fn current_block_id(&self) -> u32 {
        self.current.id
    }

    /// Append an entry, splitting it into chunks as needed, and return
    /// the position of its first chunk.
    pub(crate) fn write(&mut self, data: &[u8]) -> Result<Position> {
        if self.closed {
            return Err(Error::Closed);
        }

        let mut first = None;
        for (range, kind) in self.split_into_chunks(data) {
            let payload = &data[range];
            if self.current.data.len() + HEADER_SIZE + payload.len() > BLOCK_SIZE {
                self.flush_block(true)?;
            }
            let pos = self.append_chunk(payload, kind);
            if first.is_none() {
                first = Some(pos);
            }
        }

        first.ok_or_else(|| Error::InvalidArgument("empty entry".into()))
    }

    /// Split an entry into `(payload range, chunk type)` pairs.
    ///
    /// The first chunk takes whatever fits in the current block (if a
    /// header plus at least one payload byte fits); every subsequent
    /// chunk starts a fresh block. No chunk ever straddles a block
    /// boundary.
    fn split_into_chunks(&self, data: &[u8]) -> Vec<(std::ops::Range<usize>, ChunkType)> {
        let total = data.len();
        let mut chunks = Vec::new();
        let mut offset = 0;

        let leftover = BLOCK_SIZE.saturating_sub(self.current.data.len() + HEADER_SIZE);
        if leftover > 0 && total > 0 {
            let take = leftover.min(total);
            let kind = if take == total {
                ChunkType::Full
            } else {
                ChunkType::First
            };
            chunks.push((0..take, kind));
            offset = take;
        }

        while offset < total {
            let take = MAX_PAYLOAD_SIZE.min(total - offset);
            let kind = if offset == 0 && take == total {
                ChunkType::Full
            } else if offset == 0 {
                ChunkType::First
            } else if offset + take == total {
                ChunkType::Last
            } else {
                ChunkType::Middle
            };
            chunks.push((offset..offset + take, kind));
            offset += take;
        }

        chunks
    }

    /// Frame one chunk into the current block and return its position.
    fn append_chunk(&mut self, payload: &[u8], kind: ChunkType) -> Position {
        let offset = self.current.data.len();
        format::encode_chunk_into(&mut self.current.data, payload, kind);
        Position::new(self.id, self.current.id, offset as u32)
    }

    /// Write the unflushed part of the current block to the file.
    ///
    /// With `padding`, the block is first extended with zeros to
    /// `BLOCK_SIZE`. When the flushed watermark reaches `BLOCK_SIZE` the
    /// current block rolls forward to a fresh, empty successor.
    fn flush_block(&mut self, padding: bool) -> Result<()> {
        if self.current.data.is_empty() {
            // Block-aligned: nothing pending and nothing to pad.
            return Ok(());
        }
        if self.current.data.len() == self.current.flushed && !padding {
            return Ok(());
        }

        if padding && self.current.data.len() < BLOCK_SIZE {
            self.current.data.resize(BLOCK_SIZE, 0);
        }

        let pending = &self.current.data[self.current.flushed..];
        self.file.write_all(pending)?;
        self.current.flushed += pending.len();

        if self.current.flushed == BLOCK_SIZE {
            self.current.id += 1;
            self.current.flushed = 0;
            self.current.data.clear();
        }
        Ok(())
    }

    /// Flush pending bytes and fsync the file.
    pub(crate) fn sync(&mut self) -> Result<()> {
        if self.closed {
            return Err(Error::Closed);
        }
        self.flush_block(false)?;
        self.file.sync_data()?;
        Ok(())
    }

    /// Pad the trailing block to a whole block on disk, fsync, and mark
    /// the segment closed. Idempotent.
    pub(crate) fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.flush_block(true)?;
        self.file.sync_data()?;
        self.closed = true;
        Ok(())
    }

    /// Read the entry whose first chunk starts at `pos`.
    ///
    /// Returns the entry bytes together with the position immediately
    /// past its last chunk, which is where a sequential scan resumes.
    pub(crate) fn read_at(&mut self, pos: Position) -> Result<(Bytes, Position)> {
        if self.closed {
            return Err(Error::Closed);
        }

        let segment_id = self.id;
        let mut block_id = pos.block_id;
        let mut offset = pos.offset as usize;
        let mut entry: Vec<u8> = Vec::new();

        loop {
            let block = self.read_block(block_id)?;
            if offset >= block.len() {
                return Err(Error::EndOfBlock);
            }

            let chunk = format::decode_chunk(&block[offset..])?;
            if chunk.payload.is_empty() {
                // Zero-length sentinel: the rest of the block is padding.
                return Err(Error::Eof);
            }

            let expected = if entry.is_empty() {
                chunk.kind.begins_entry()
            } else {
                matches!(chunk.kind, ChunkType::Middle | ChunkType::Last)
            };
            if !expected {
                return Err(Error::InvalidChunkType(chunk.kind.to_byte()));
            }

            entry.extend_from_slice(chunk.payload);
            let consumed = HEADER_SIZE + chunk.payload.len();

            if chunk.kind.ends_entry() {
                let end = offset + consumed;
                let next = if end >= BLOCK_SIZE {
                    Position::new(segment_id, block_id + 1, 0)
                } else {
                    Position::new(segment_id, block_id, end as u32)
                };
                return Ok((Bytes::from(entry), next));
            }

            offset += consumed;
            if offset >= block.len() {
                block_id += 1;
                offset = 0;
            }
        }
    }

    /// Load a block's bytes: the current block from memory, completed
    /// blocks from the file through the single-slot cache.
    fn read_block(&mut self, block_id: u32) -> Result<&[u8]> {
        if block_id == self.current.id {
            return Ok(&self.current.data);
        }
        if block_id > self.current.id {
            // Beyond the end of the segment; never cached since the
            // block may come into existence later.
            return Ok(&[]);
        }

        let hit = matches!(&self.cached, Some(c) if c.id == block_id);
        if !hit {
            let mut data = vec![0u8; BLOCK_SIZE];
            self.file
                .seek(SeekFrom::Start(block_id as u64 * BLOCK_SIZE as u64))?;
            let filled = read_up_to(&mut self.file, &mut data)?;
            data.truncate(filled);
            self.cached = Some(CachedBlock { id: block_id, data });
        }

        let cached = self.cached.as_ref().map(|c| c.data.as_slice());
        Ok(cached.unwrap_or_default())
    }
}

/// Read until `buf` is full or EOF, returning the number of bytes read.
fn read_up_to(file: &mut File, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
