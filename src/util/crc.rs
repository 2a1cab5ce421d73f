//! CRC32 checksum utilities.

use crc32fast::Hasher;

/// Compute CRC32 checksum of the given data.
pub fn crc32(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Verify that data matches the expected CRC.
pub fn verify_crc(data: &[u8], expected: u32) -> bool {
    crc32(data) == expected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc32_empty() {
        assert_eq!(crc32(&[]), 0);
    }

    #[test]
    fn test_crc32_data() {
        let data = b"hello world";
        let crc = crc32(data);
        assert_ne!(crc, 0);

        // Same data should produce same CRC
        assert_eq!(crc32(data), crc);
    }

    #[test]
    fn test_crc32_different_data() {
        assert_ne!(crc32(b"hello"), crc32(b"world"));
    }

    #[test]
    fn test_verify_crc() {
        let data = b"test data";
        let crc = crc32(data);

        assert!(verify_crc(data, crc));
        assert!(!verify_crc(data, crc + 1));
        assert!(!verify_crc(b"other data", crc));
    }
}
