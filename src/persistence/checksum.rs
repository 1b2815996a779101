//! CRC32 checksums for snapshot files
//!
//! The checksum covers the serialized document list only, so it is
//! independent of manifest fields such as the timestamp.

use crc32fast::Hasher;

const PREFIX: &str = "crc32:";

pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Formats as `crc32:xxxxxxxx` (lower-case hex, zero-padded).
pub fn format_checksum(checksum: u32) -> String {
    format!("{}{:08x}", PREFIX, checksum)
}

pub fn parse_checksum(formatted: &str) -> Option<u32> {
    let hex = formatted.strip_prefix(PREFIX)?;
    if hex.len() != 8 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_deterministic() {
        assert_eq!(compute_checksum(b"documents"), compute_checksum(b"documents"));
        assert_ne!(compute_checksum(b"documents"), compute_checksum(b"document5"));
    }

    #[test]
    fn test_known_value() {
        // IEEE CRC32 of "123456789"
        assert_eq!(compute_checksum(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn test_format_and_parse() {
        assert_eq!(format_checksum(0xDEADBEEF), "crc32:deadbeef");
        assert_eq!(format_checksum(0x1), "crc32:00000001");
        assert_eq!(parse_checksum("crc32:deadbeef"), Some(0xDEADBEEF));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(parse_checksum("md5:deadbeef"), None);
        assert_eq!(parse_checksum("crc32:dead"), None);
        assert_eq!(parse_checksum("crc32:zzzzzzzz"), None);
    }
}
