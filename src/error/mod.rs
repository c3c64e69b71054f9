//! Error types for anchorcdc.

use thiserror::Error;

/// Errors that can occur while configuring or running a scan.
///
/// Every variant is reported before any output is written, so a failed call
/// leaves the caller's descriptor sequence untouched.
#[derive(Debug, Error)]
pub enum ChunkError {
    /// `mask_bits` is outside the supported range.
    #[error("invalid parameter: mask_bits {mask_bits} not in [{min}, {max}]")]
    InvalidParameter {
        /// The rejected value.
        mask_bits: u32,
        /// Smallest accepted value.
        min: u32,
        /// Largest accepted value.
        max: u32,
    },

    /// The scan range is inverted or reaches past the end of the buffer.
    #[error("invalid range: [{start}, {end}) over a buffer of {len} bytes")]
    InvalidRange {
        /// Requested scan start.
        start: usize,
        /// Requested scan end (exclusive).
        end: usize,
        /// Length of the buffer the range refers to.
        len: usize,
    },

    /// An offset or length does not fit its descriptor bit field.
    #[error("encoding overflow: {field} {value} exceeds {max}")]
    EncodingOverflow {
        /// Which field overflowed (`"offset"` or `"length"`).
        field: &'static str,
        /// The value that did not fit.
        value: u64,
        /// Largest encodable value for the field.
        max: u64,
    },

    /// An I/O error occurred while a stream driver was reading input.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: ChunkError = io_err.into();
        assert!(matches!(err, ChunkError::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_display() {
        let err = ChunkError::InvalidParameter {
            mask_bits: 3,
            min: 8,
            max: 14,
        };
        assert_eq!(
            err.to_string(),
            "invalid parameter: mask_bits 3 not in [8, 14]"
        );

        let err = ChunkError::EncodingOverflow {
            field: "length",
            value: 1 << 24,
            max: (1 << 24) - 1,
        };
        assert!(err.to_string().contains("encoding overflow: length"));

        let err = ChunkError::InvalidRange {
            start: 10,
            end: 5,
            len: 8,
        };
        assert!(err.to_string().contains("[10, 5)"));
    }
}
