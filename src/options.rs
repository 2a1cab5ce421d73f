//! Configuration options for seglog.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// Default segment rotation threshold (128MB).
pub const DEFAULT_SEGMENT_SIZE: u64 = 128 * 1024 * 1024;

/// Default interval of the background fsync tick.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_millis(100);

/// Log configuration options.
#[derive(Debug, Clone)]
pub struct Options {
    /// Directory holding the segment files; created if absent.
    pub directory: PathBuf,

    /// Rotation threshold in bytes. A write that would push the active
    /// segment past this size goes to a fresh segment instead, so the
    /// threshold is a soft cap: segments may fall short of it by up to
    /// one entry.
    pub segment_size: u64,

    /// Period of the background fsync tick. Must be non-zero.
    pub sync_interval: Duration,
}

impl Options {
    /// Create options for the given directory with defaults.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            segment_size: DEFAULT_SEGMENT_SIZE,
            sync_interval: DEFAULT_SYNC_INTERVAL,
        }
    }

    /// Validate the options.
    pub fn validate(&self) -> Result<()> {
        if self.segment_size == 0 {
            return Err(Error::InvalidConfiguration(
                "segment_size must be greater than zero".into(),
            ));
        }
        if self.sync_interval.is_zero() {
            return Err(Error::InvalidConfiguration(
                "sync_interval must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`Options`].
#[derive(Debug, Clone)]
pub struct OptionsBuilder {
    options: Options,
}

impl OptionsBuilder {
    /// Create a builder for the given directory with default options.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            options: Options::new(directory),
        }
    }

    /// Set the segment rotation threshold.
    pub fn segment_size(mut self, size: u64) -> Self {
        self.options.segment_size = size;
        self
    }

    /// Set the background sync interval.
    pub fn sync_interval(mut self, interval: Duration) -> Self {
        self.options.sync_interval = interval;
        self
    }

    /// Validate and build the options.
    pub fn build(self) -> Result<Options> {
        self.options.validate()?;
        Ok(self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = Options::new("/tmp/wal");
        assert_eq!(opts.directory, PathBuf::from("/tmp/wal"));
        assert_eq!(opts.segment_size, DEFAULT_SEGMENT_SIZE);
        assert_eq!(opts.sync_interval, DEFAULT_SYNC_INTERVAL);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_options_validation() {
        let mut opts = Options::new("/tmp/wal");
        opts.segment_size = 0;
        assert!(opts.validate().is_err());

        let mut opts = Options::new("/tmp/wal");
        opts.sync_interval = Duration::ZERO;
        assert!(opts.validate().is_err());
    }

    #[test]
    fn test_options_builder() {
        let opts = OptionsBuilder::new("/data/wal")
            .segment_size(4096)
            .sync_interval(Duration::from_secs(1))
            .build()
            .unwrap();

        assert_eq!(opts.directory, PathBuf::from("/data/wal"));
        assert_eq!(opts.segment_size, 4096);
        assert_eq!(opts.sync_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_options_builder_rejects_invalid() {
        assert!(OptionsBuilder::new("/data/wal")
            .segment_size(0)
            .build()
            .is_err());
        assert!(OptionsBuilder::new("/data/wal")
            .sync_interval(Duration::ZERO)
            .build()
            .is_err());
    }
}
