//! Configuration for chunking behavior.
//!
//! A [`ChunkConfig`] is fully determined by one number, `mask_bits`: the
//! count of low-order rolling-hash bits that must be zero at an anchor.
//! Every size bound is derived from it.
//!
//! # Example
//!
//! ```
//! use anchorcdc::ChunkConfig;
//!
//! let config = ChunkConfig::new(12)?;
//! assert_eq!(config.target_chunk_size(), 4096);
//! assert_eq!(config.min_chunk_size(), 1024);
//! assert_eq!(config.max_chunk_size(), 16384);
//! # Ok::<(), anchorcdc::ChunkError>(())
//! ```

use crate::error::ChunkError;

/// Size-bound configuration derived from `mask_bits`.
///
/// | derived value       | formula                             |
/// |---------------------|-------------------------------------|
/// | `target_chunk_size` | `2^mask_bits`                       |
/// | `min_chunk_size`    | `target / MIN_SIZE_DIVISOR`         |
/// | `max_chunk_size`    | `target * MAX_SIZE_MULTIPLIER`      |
///
/// The value is immutable once built; construct a new one for a different
/// granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkConfig {
    mask_bits: u32,
}

impl ChunkConfig {
    /// Smallest accepted `mask_bits` (256 byte target chunks).
    pub const MIN_MASK_BITS: u32 = 8;

    /// Largest accepted `mask_bits` (16 KiB target chunks).
    pub const MAX_MASK_BITS: u32 = 14;

    /// `mask_bits` used by [`ChunkConfig::default`] (8 KiB target chunks).
    pub const DEFAULT_MASK_BITS: u32 = 13;

    /// Length of the rolling-hash window in bytes.
    pub const WINDOW_BYTES_LEN: usize = 48;

    /// `min_chunk_size = target_chunk_size / MIN_SIZE_DIVISOR`.
    pub const MIN_SIZE_DIVISOR: usize = 4;

    /// `max_chunk_size = target_chunk_size * MAX_SIZE_MULTIPLIER`.
    pub const MAX_SIZE_MULTIPLIER: usize = 4;

    /// Creates a configuration for the given mask width.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::InvalidParameter`] if `mask_bits` is outside
    /// `[MIN_MASK_BITS, MAX_MASK_BITS]`. Out-of-range values are never clamped.
    pub fn new(mask_bits: u32) -> Result<Self, ChunkError> {
        if !(Self::MIN_MASK_BITS..=Self::MAX_MASK_BITS).contains(&mask_bits) {
            tracing::debug!(mask_bits, "rejected chunker mask width");
            return Err(ChunkError::InvalidParameter {
                mask_bits,
                min: Self::MIN_MASK_BITS,
                max: Self::MAX_MASK_BITS,
            });
        }

        Ok(Self { mask_bits })
    }

    /// Returns the number of low-order hash bits tested at each position.
    pub fn mask_bits(&self) -> u32 {
        self.mask_bits
    }

    /// Returns the bit mask applied to the rolling hash.
    pub fn anchor_mask(&self) -> u64 {
        (1u64 << self.mask_bits) - 1
    }

    /// Returns the expected spacing between anchors, `2^mask_bits`.
    pub fn target_chunk_size(&self) -> usize {
        1usize << self.mask_bits
    }

    /// Returns the smallest length a content-driven boundary may close.
    pub fn min_chunk_size(&self) -> usize {
        self.target_chunk_size() / Self::MIN_SIZE_DIVISOR
    }

    /// Returns the length at which a chunk is force-closed.
    pub fn max_chunk_size(&self) -> usize {
        self.target_chunk_size() * Self::MAX_SIZE_MULTIPLIER
    }

    /// Returns the rolling-hash window length.
    pub fn window_len(&self) -> usize {
        Self::WINDOW_BYTES_LEN
    }

    /// Validates the current configuration.
    pub fn validate(&self) -> Result<(), ChunkError> {
        Self::new(self.mask_bits).map(|_| ())
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            mask_bits: Self::DEFAULT_MASK_BITS,
        }
    }
}
