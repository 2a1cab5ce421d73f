//! Sequential entry streaming.
//!
//! A [`Reader`] walks the log from a starting position, yielding entries
//! in write order across chunk, block, and segment boundaries, until it
//! runs out of data.

use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;

use crate::error::Result;
use crate::log::Log;
use crate::position::Position;

struct ReaderState {
    pos: Position,
    closed: bool,
}

/// Streams entries from a [`Log`] starting at a given position.
///
/// Each reader progresses independently under its own lock; the
/// underlying reads serialize with writers through the log's lock.
/// Once the reader catches up with the end of the log it closes itself;
/// it does not wait for future writes.
pub struct Reader {
    log: Arc<Log>,
    state: Mutex<ReaderState>,
}

impl std::fmt::Debug for Reader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reader").finish_non_exhaustive()
    }
}

impl Reader {
    pub(crate) fn new(log: Arc<Log>, pos: Position) -> Self {
        Self {
            log,
            state: Mutex::new(ReaderState { pos, closed: false }),
        }
    }

    /// Read the next entry, or `Ok(None)` once the log is exhausted.
    ///
    /// Corruption (`InvalidCrc`, `InvalidChunkType`) and I/O failures
    /// are returned as errors and leave the reader open at the same
    /// position.
    pub fn next_entry(&self) -> Result<Option<Bytes>> {
        let mut state = self.state.lock();
        if state.closed {
            return Ok(None);
        }

        match self.log.next_for_reader(state.pos)? {
            Some((entry, next)) => {
                state.pos = next;
                Ok(Some(entry))
            }
            None => {
                state.closed = true;
                Ok(None)
            }
        }
    }

    /// The position the next call to [`Reader::next_entry`] will read from.
    pub fn position(&self) -> Position {
        self.state.lock().pos
    }

    /// Stop the reader. Idempotent; subsequent reads return `Ok(None)`.
    pub fn close(&self) {
        self.state.lock().closed = true;
    }
}

impl Iterator for Reader {
    type Item = Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().transpose()
    }
}
