//! # seglog
//!
//! A segmented write-ahead log: an append-only, crash-durable record
//! stream over local disk.
//!
//! ## Features
//!
//! - **Positional handles**: every write returns a [`Position`] that
//!   reads the entry back, now or after a restart
//! - **Block-based format**: 32KB blocks of CRC-protected chunks, in the
//!   LevelDB record-format lineage
//! - **Segment rotation**: the log is partitioned across `seg_{id}.log`
//!   files capped by a size threshold
//! - **Crash recovery**: reopening a directory rediscovers all segments
//!   and the partial tail block
//! - **Concurrent access**: one log shared by many writer and reader
//!   threads, plus a background fsync tick
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use seglog::{Log, Options};
//!
//! let log = Log::open(Options::new("./wal"))?;
//!
//! let pos = log.write(b"hello")?;
//! log.sync()?;
//! assert_eq!(&log.read(pos)?[..], b"hello");
//!
//! let reader = log.reader(pos)?;
//! while let Some(entry) = reader.next_entry()? {
//!     println!("{}", String::from_utf8_lossy(&entry));
//! }
//!
//! log.close()?;
//! ```

// Public modules
pub mod error;
pub mod options;
pub mod position;

// Internal modules
mod format;
mod log;
mod reader;
mod segment;
mod util;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use format::{ChunkType, BLOCK_SIZE, HEADER_SIZE, MAX_PAYLOAD_SIZE};
pub use log::Log;
pub use options::{Options, OptionsBuilder};
pub use position::Position;
pub use reader::Reader;
