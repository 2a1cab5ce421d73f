//! Error types for seglog.

use std::io;
use thiserror::Error;

/// Result type alias for seglog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for log operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Operation on a closed segment or log.
    #[error("the log is closed")]
    Closed,

    /// Chunk payload CRC mismatch; the data may be corrupted.
    #[error("invalid crc, the data may be corrupted")]
    InvalidCrc,

    /// Chunk type byte is unknown or violates the FULL|(FIRST MIDDLE* LAST) sequence.
    #[error("invalid chunk type: {0}")]
    InvalidChunkType(u8),

    /// No well-formed chunk fits in the remaining block tail.
    #[error("reached the end of the block")]
    EndOfBlock,

    /// Zero-length sentinel chunk or no more data to read.
    #[error("reached the end of the log")]
    Eof,

    /// Read addressed a segment id that is not part of the log.
    #[error("segment {0} not found")]
    SegmentNotFound(u32),

    /// Position decode with the wrong byte length or bad hex.
    #[error("invalid position format")]
    InvalidFormat,

    /// Caller-supplied argument was rejected.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// I/O error from file operations.
    #[error("I/O error: {0}")]
    Io(String),

    /// Creating the successor segment failed; the log remains usable.
    #[error("write succeeded but segment rotation failed: {0}")]
    Rotation(Box<Error>),

    /// One or more segments failed to close.
    #[error("errors while closing segments: {0}")]
    Close(String),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl Error {
    /// Check if this error indicates corruption of on-disk data.
    pub fn is_corruption(&self) -> bool {
        matches!(self, Error::InvalidCrc | Error::InvalidChunkType(_))
    }

    /// Check if this error marks the end of readable data rather than a failure.
    pub fn is_end_of_data(&self) -> bool {
        matches!(self, Error::Eof | Error::EndOfBlock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(format!("{}", Error::Closed), "the log is closed");
        assert_eq!(format!("{}", Error::SegmentNotFound(7)), "segment 7 not found");
        assert_eq!(
            format!("{}", Error::Rotation(Box::new(Error::Io("disk full".into())))),
            "write succeeded but segment rotation failed: I/O error: disk full"
        );
    }

    #[test]
    fn test_error_is_corruption() {
        assert!(Error::InvalidCrc.is_corruption());
        assert!(Error::InvalidChunkType(9).is_corruption());
        assert!(!Error::Eof.is_corruption());
    }

    #[test]
    fn test_error_is_end_of_data() {
        assert!(Error::Eof.is_end_of_data());
        assert!(Error::EndOfBlock.is_end_of_data());
        assert!(!Error::Closed.is_end_of_data());
    }

    #[test]
    fn test_from_io_error() {
        let err: Error = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(err, Error::Io(_)));
    }
}
