//! The log orchestrator.
//!
//! A [`Log`] owns a directory of segment files and routes every
//! operation: writes go to the single active segment (rotating to a
//! fresh one when the size threshold is reached), reads are dispatched
//! to the owning segment by position, and a background thread syncs the
//! active segment on a fixed interval.
//!
//! # Thread safety
//!
//! The log is shared across threads via `Arc`. One mutex serializes all
//! public operations, so writes are totally ordered and a reader can
//! never observe a partially written chunk.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};

use bytes::Bytes;
use parking_lot::{Condvar, Mutex};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::format::HEADER_SIZE;
use crate::options::Options;
use crate::position::Position;
use crate::reader::Reader;
use crate::segment::Segment;
use crate::util::filename::{create_dir_if_missing, list_segment_ids, segment_file_path};

/// Mutex-guarded log state.
struct LogInner {
    /// All open segments, keyed by id.
    segments: BTreeMap<u32, Segment>,
    /// Id of the segment receiving writes; always the largest id.
    active: u32,
    closed: bool,
}

/// A durable, append-only log of opaque entries.
///
/// Entries are written to numbered segment files and addressed by the
/// [`Position`] returned from [`Log::write`]. See the crate docs for the
/// on-disk format.
pub struct Log {
    options: Options,
    inner: Mutex<LogInner>,
    /// Shutdown flag for the periodic sync thread, guarded by its own
    /// mutex so a stop request can't race past a sleeping ticker.
    sync_stop: Mutex<bool>,
    sync_cond: Condvar,
    sync_handle: Mutex<Option<JoinHandle<()>>>,
}

impl Log {
    /// Open a log in `options.directory`, creating the directory and an
    /// initial segment if needed, and recovering any existing segments.
    pub fn open(options: Options) -> Result<Arc<Self>> {
        options.validate()?;
        create_dir_if_missing(&options.directory)?;

        let ids = list_segment_ids(&options.directory)?;
        let mut segments = BTreeMap::new();
        for &id in &ids {
            let path = segment_file_path(&options.directory, id);
            segments.insert(id, Segment::open(id, &path)?);
        }

        let active = match ids.last() {
            Some(&id) => id,
            None => {
                let path = segment_file_path(&options.directory, 0);
                segments.insert(0, Segment::open(0, &path)?);
                0
            }
        };

        debug!(
            directory = %options.directory.display(),
            segments = segments.len(),
            active,
            "opened log"
        );

        let log = Arc::new(Self {
            options,
            inner: Mutex::new(LogInner {
                segments,
                active,
                closed: false,
            }),
            sync_stop: Mutex::new(false),
            sync_cond: Condvar::new(),
            sync_handle: Mutex::new(None),
        });

        let weak = Arc::downgrade(&log);
        let handle = thread::Builder::new()
            .name("seglog-sync".to_string())
            .spawn(move || Self::sync_loop(weak))?;
        *log.sync_handle.lock() = Some(handle);

        Ok(log)
    }

    /// Append an entry and return the position of its first chunk.
    ///
    /// Empty entries are rejected: a zero-length chunk is the padding
    /// sentinel that terminates sequential scans.
    pub fn write(&self, data: &[u8]) -> Result<Position> {
        if data.is_empty() {
            return Err(Error::InvalidArgument(
                "cannot write an empty entry".to_string(),
            ));
        }

        let mut inner = self.inner.lock();

        let active = inner.active;
        let needs_rotation = match inner.segments.get(&active) {
            Some(segment) => {
                segment.size() + (data.len() + HEADER_SIZE) as u64 > self.options.segment_size
            }
            None => return Err(Error::SegmentNotFound(active)),
        };
        if needs_rotation {
            self.rotate(&mut inner)
                .map_err(|e| Error::Rotation(Box::new(e)))?;
        }

        let active = inner.active;
        match inner.segments.get_mut(&active) {
            Some(segment) => segment.write(data),
            None => Err(Error::SegmentNotFound(active)),
        }
    }

    /// Seal the active segment and switch writes to a fresh successor.
    fn rotate(&self, inner: &mut LogInner) -> Result<()> {
        let active = inner.active;
        let next_id = match inner.segments.get_mut(&active) {
            Some(segment) => {
                segment.sync()?;
                segment.id() + 1
            }
            None => active + 1,
        };

        let path = segment_file_path(&self.options.directory, next_id);
        let segment = Segment::open(next_id, &path)?;
        inner.segments.insert(next_id, segment);
        inner.active = next_id;

        info!(sealed = active, active = next_id, "rotated to a new segment");
        Ok(())
    }

    /// Read back the entry written at `pos`.
    pub fn read(&self, pos: Position) -> Result<Bytes> {
        let mut inner = self.inner.lock();
        let segment = inner
            .segments
            .get_mut(&pos.segment_id)
            .ok_or(Error::SegmentNotFound(pos.segment_id))?;
        let (entry, _next) = segment.read_at(pos)?;
        Ok(entry)
    }

    /// Create a [`Reader`] streaming entries from `pos` onward.
    pub fn reader(self: &Arc<Self>, pos: Position) -> Result<Reader> {
        let inner = self.inner.lock();
        if !inner.segments.contains_key(&pos.segment_id) {
            return Err(Error::SegmentNotFound(pos.segment_id));
        }
        drop(inner);
        Ok(Reader::new(Arc::clone(self), pos))
    }

    /// Flush and fsync the active segment. This is the durability
    /// boundary: entries are guaranteed on disk only after a successful
    /// sync.
    pub fn sync(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        let active = inner.active;
        match inner.segments.get_mut(&active) {
            Some(segment) => segment.sync(),
            None => Err(Error::SegmentNotFound(active)),
        }
    }

    /// Stop the sync thread and close every segment, padding each
    /// trailing block to a whole block on disk. Idempotent; per-segment
    /// failures are aggregated.
    pub fn close(&self) -> Result<()> {
        {
            let mut stop = self.sync_stop.lock();
            *stop = true;
            self.sync_cond.notify_all();
        }
        if let Some(handle) = self.sync_handle.lock().take() {
            let _ = handle.join();
        }

        let mut inner = self.inner.lock();
        if inner.closed {
            return Ok(());
        }
        inner.closed = true;

        let mut failures = Vec::new();
        for (id, segment) in inner.segments.iter_mut() {
            if let Err(err) = segment.close() {
                failures.push(format!("segment {id}: {err}"));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::Close(failures.join("; ")))
        }
    }

    /// Advance a sequential scan: read the entry at `start`, skipping
    /// block padding and crossing into the next segment as needed.
    ///
    /// Returns the entry plus the position to resume from, or `None`
    /// when no more data exists.
    pub(crate) fn next_for_reader(&self, start: Position) -> Result<Option<(Bytes, Position)>> {
        let mut inner = self.inner.lock();
        let mut pos = start;

        loop {
            let Some(segment) = inner.segments.get_mut(&pos.segment_id) else {
                return Ok(None);
            };

            match segment.read_at(pos) {
                Ok((entry, next)) => return Ok(Some((entry, next))),
                Err(err) if err.is_end_of_data() => {
                    if pos.block_id < segment.current_block_id() {
                        // Only padding remained in this block; the scan
                        // continues in the segment's next block.
                        pos.block_id += 1;
                        pos.offset = 0;
                        continue;
                    }
                    let next_id = pos.segment_id + 1;
                    if inner.segments.contains_key(&next_id) {
                        pos = Position::new(next_id, 0, 0);
                        continue;
                    }
                    return Ok(None);
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Periodic sync task: fsync the active segment every
    /// `sync_interval` until the log is closed or dropped.
    ///
    /// Holds only a weak handle between ticks so an abandoned log still
    /// lets the thread exit.
    fn sync_loop(weak: Weak<Log>) {
        loop {
            let Some(log) = weak.upgrade() else { return };

            {
                let mut stop = log.sync_stop.lock();
                if *stop {
                    return;
                }
                let waited = log
                    .sync_cond
                    .wait_for(&mut stop, log.options.sync_interval);
                if *stop {
                    return;
                }
                if !waited.timed_out() {
                    // Spurious wakeup; go back to sleep.
                    continue;
                }
            }

            let mut inner = log.inner.lock();
            if inner.closed {
                return;
            }
            let active = inner.active;
            if let Some(segment) = inner.segments.get_mut(&active) {
                if let Err(err) = segment.sync() {
                    warn!(segment = active, error = %err, "periodic sync failed");
                }
            }
        }
    }
}
