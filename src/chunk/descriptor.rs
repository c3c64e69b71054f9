//! Packed 64-bit chunk descriptors.
//!
//! A descriptor stores a chunk's buffer-relative start offset and its length
//! in one `u64`:
//!
//! ```text
//!  63                         24 23               0
//! +-----------------------------+------------------+
//! |   offset (40 bits)          |  length (24 bits)|
//! +-----------------------------+------------------+
//! ```
//!
//! Offsets up to 1 TiB and lengths up to 16 MiB are representable. Values
//! outside those fields are rejected with [`ChunkError::EncodingOverflow`],
//! never truncated.

use std::fmt;
use std::ops::Range;

use crate::config::ChunkConfig;
use crate::error::ChunkError;

/// A chunk's `(offset, length)` packed into a single `u64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ChunkDescriptor(u64);

impl ChunkDescriptor {
    /// Width of the length field.
    pub const LENGTH_BITS: u32 = 24;

    /// Width of the offset field.
    pub const OFFSET_BITS: u32 = 64 - Self::LENGTH_BITS;

    /// Largest encodable length.
    pub const MAX_LENGTH: u64 = (1 << Self::LENGTH_BITS) - 1;

    /// Largest encodable offset.
    pub const MAX_OFFSET: u64 = (1 << Self::OFFSET_BITS) - 1;

    const LENGTH_MASK: u64 = Self::MAX_LENGTH;

    /// Packs an offset and a length.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::EncodingOverflow`] if either value exceeds its
    /// field width.
    ///
    /// # Example
    ///
    /// ```
    /// use anchorcdc::ChunkDescriptor;
    ///
    /// let desc = ChunkDescriptor::new(4096, 1500)?;
    /// assert_eq!(desc.offset(), 4096);
    /// assert_eq!(desc.length(), 1500);
    /// assert_eq!(desc.end(), 5596);
    /// # Ok::<(), anchorcdc::ChunkError>(())
    /// ```
    pub fn new(offset: u64, length: u64) -> Result<Self, ChunkError> {
        if offset > Self::MAX_OFFSET {
            return Err(ChunkError::EncodingOverflow {
                field: "offset",
                value: offset,
                max: Self::MAX_OFFSET,
            });
        }
        if length > Self::MAX_LENGTH {
            return Err(ChunkError::EncodingOverflow {
                field: "length",
                value: length,
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self::pack(offset, length))
    }

    /// Packs values the caller has already range-checked.
    #[inline]
    pub(crate) fn pack(offset: u64, length: u64) -> Self {
        debug_assert!(offset <= Self::MAX_OFFSET && length <= Self::MAX_LENGTH);
        Self((offset << Self::LENGTH_BITS) | length)
    }

    /// Wraps a raw packed value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw packed value.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Returns the start offset.
    #[inline]
    pub const fn offset(&self) -> u64 {
        chunk_to_offset(self.0)
    }

    /// Returns the chunk length.
    #[inline]
    pub const fn length(&self) -> u64 {
        chunk_to_length(self.0)
    }

    /// Returns the end offset (exclusive).
    pub const fn end(&self) -> u64 {
        self.offset() + self.length()
    }

    /// Returns the chunk as a `usize` range into the scanned buffer.
    pub fn range(&self) -> Range<usize> {
        self.offset() as usize..self.end() as usize
    }
}

// Every chunk the engine can produce must fit the length field.
const _: () = assert!(
    ((1u64 << ChunkConfig::MAX_MASK_BITS) * ChunkConfig::MAX_SIZE_MULTIPLIER as u64)
        <= ChunkDescriptor::MAX_LENGTH
);

impl From<ChunkDescriptor> for u64 {
    fn from(desc: ChunkDescriptor) -> Self {
        desc.0
    }
}

impl fmt::Display for ChunkDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{} ({} bytes)",
            self.offset(),
            self.end(),
            self.length()
        )
    }
}

/// Extracts the length field of a packed descriptor.
#[inline]
pub const fn chunk_to_length(descriptor: u64) -> u64 {
    descriptor & ChunkDescriptor::LENGTH_MASK
}

/// Extracts the offset field of a packed descriptor.
#[inline]
pub const fn chunk_to_offset(descriptor: u64) -> u64 {
    descriptor >> ChunkDescriptor::LENGTH_BITS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_layout() {
        let desc = ChunkDescriptor::new(1, 2).unwrap();
        assert_eq!(desc.as_u64(), (1 << 24) | 2);
        assert_eq!(chunk_to_length(desc.as_u64()), 2);
        assert_eq!(chunk_to_offset(desc.as_u64()), 1);
    }

    #[test]
    fn test_field_limits() {
        let desc =
            ChunkDescriptor::new(ChunkDescriptor::MAX_OFFSET, ChunkDescriptor::MAX_LENGTH).unwrap();
        assert_eq!(desc.as_u64(), u64::MAX);
        assert_eq!(desc.offset(), ChunkDescriptor::MAX_OFFSET);
        assert_eq!(desc.length(), ChunkDescriptor::MAX_LENGTH);

        let zero = ChunkDescriptor::new(0, 0).unwrap();
        assert_eq!(zero.as_u64(), 0);
    }

    #[test]
    fn test_offset_overflow() {
        let err = ChunkDescriptor::new(ChunkDescriptor::MAX_OFFSET + 1, 10).unwrap_err();
        assert!(matches!(
            err,
            ChunkError::EncodingOverflow {
                field: "offset",
                ..
            }
        ));
    }

    #[test]
    fn test_length_overflow() {
        let err = ChunkDescriptor::new(0, ChunkDescriptor::MAX_LENGTH + 1).unwrap_err();
        assert!(matches!(
            err,
            ChunkError::EncodingOverflow {
                field: "length",
                value: 16_777_216,
                ..
            }
        ));
    }

    #[test]
    fn test_raw_round_trip() {
        let desc = ChunkDescriptor::new(123_456_789, 65_536).unwrap();
        let raw: u64 = desc.into();
        assert_eq!(ChunkDescriptor::from_raw(raw), desc);
    }

    #[test]
    fn test_range_and_display() {
        let desc = ChunkDescriptor::new(100, 5).unwrap();
        assert_eq!(desc.range(), 100..105);
        assert_eq!(desc.to_string(), "100..105 (5 bytes)");
    }
}
