//! Core chunking engine.
//!
//! [`Chunker`] scans in-memory buffers and emits packed
//! [`ChunkDescriptor`]s. It keeps no state between calls: a scan that is not
//! flushed returns the offset of its unclosed tail, and the caller hands that
//! tail back (followed by newer bytes) on the next call.
//!
//! # Example
//!
//! ```
//! use anchorcdc::{Chunker, ChunkDescriptor};
//!
//! let chunker = Chunker::new(10)?;
//! let data: Vec<u8> = (0..20_000u32).map(|i| (i.wrapping_mul(2_654_435_761) >> 13) as u8).collect();
//!
//! let mut chunks: Vec<ChunkDescriptor> = Vec::new();
//! let next = chunker.get_chunks(&mut chunks, &data, 0, data.len(), true)?;
//!
//! assert_eq!(next, data.len());
//! let total: u64 = chunks.iter().map(|c| c.length()).sum();
//! assert_eq!(total, data.len() as u64);
//! # Ok::<(), anchorcdc::ChunkError>(())
//! ```

use std::io::Read;

use bytes::Bytes;

use crate::cdc::RollingHash;
use crate::chunk::{Chunk, ChunkDescriptor};
use crate::chunker::ChunkIter;
use crate::config::ChunkConfig;
use crate::error::ChunkError;

/// Content-defined chunking engine for one mask width.
///
/// A position `i` is an *anchor* when the rolling hash of the
/// `WINDOW_BYTES_LEN` bytes ending at `i` has its low `mask_bits` bits all
/// zero. [`Chunker::get_chunks`] closes a chunk at an anchor once the chunk
/// has reached `min_chunk_size`, and unconditionally at `max_chunk_size`.
///
/// The engine is `Copy` and immutable. Independent scans may run on any
/// number of threads at once.
///
/// # Example
///
/// ```
/// use anchorcdc::Chunker;
///
/// let chunker = Chunker::new(13)?;
/// assert_eq!(chunker.min_chunk_size(), 2048);
/// assert_eq!(chunker.max_chunk_size(), 32768);
/// assert_eq!(chunker.window_length(), Chunker::WINDOW_BYTES_LEN);
/// # Ok::<(), anchorcdc::ChunkError>(())
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Chunker {
    config: ChunkConfig,
}

impl Chunker {
    /// Smallest accepted `mask_bits`.
    pub const MIN_MASK_BITS: u32 = ChunkConfig::MIN_MASK_BITS;

    /// Largest accepted `mask_bits`.
    pub const MAX_MASK_BITS: u32 = ChunkConfig::MAX_MASK_BITS;

    /// Length of the rolling-hash window in bytes.
    pub const WINDOW_BYTES_LEN: usize = ChunkConfig::WINDOW_BYTES_LEN;

    /// Creates a chunker for the given mask width.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::InvalidParameter`] if `mask_bits` is outside
    /// `[MIN_MASK_BITS, MAX_MASK_BITS]`.
    pub fn new(mask_bits: u32) -> Result<Self, ChunkError> {
        ChunkConfig::new(mask_bits).map(Self::with_config)
    }

    /// Creates a chunker from an existing configuration.
    pub fn with_config(config: ChunkConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration used by this chunker.
    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Returns the rolling-hash window length.
    pub fn window_length(&self) -> usize {
        Self::WINDOW_BYTES_LEN
    }

    /// Returns the smallest length a content-driven boundary may close.
    pub fn min_chunk_size(&self) -> usize {
        self.config.min_chunk_size()
    }

    /// Returns the length at which a chunk is force-closed.
    pub fn max_chunk_size(&self) -> usize {
        self.config.max_chunk_size()
    }

    /// Returns the expected anchor spacing, `2^mask_bits`.
    pub fn target_chunk_size(&self) -> usize {
        self.config.target_chunk_size()
    }

    /// Expected number of anchors in a random buffer of `buffer_length` bytes.
    ///
    /// There are `buffer_length - window_len + 1` positions with a full
    /// window, each an anchor with probability `2^-mask_bits`. Returns 0 when
    /// no full window fits.
    pub fn expected_anchor_count(&self, buffer_length: u64) -> u64 {
        let window = Self::WINDOW_BYTES_LEN as u64;
        if buffer_length < window {
            return 0;
        }
        let positions = buffer_length - window + 1;
        let target = self.config.target_chunk_size() as u64;
        positions / target + u64::from(positions % target >= target / 2)
    }

    /// Expected number of chunks a flushed scan emits over a random buffer.
    ///
    /// Unlike [`Chunker::expected_anchor_count`] this accounts for size
    /// bounds: anchors before `min_chunk_size` are skipped and runs without an
    /// anchor are cut at `max_chunk_size`. Returns at least 1 for a non-empty
    /// buffer.
    pub fn expected_chunk_count(&self, buffer_length: u64) -> u64 {
        if buffer_length == 0 {
            return 0;
        }
        let estimate = (buffer_length as f64 / self.mean_chunk_len()).round() as u64;
        estimate.max(1)
    }

    /// Mean length of a bounded chunk over uniformly random input.
    ///
    /// With `p = 2^-mask_bits`, first eligible length `L0` and cap `M`, the
    /// length is `L0 + min(G, M - L0)` for geometric `G`, whose mean is
    /// `L0 + (1 - p)(1 - (1 - p)^(M - L0)) / p`.
    fn mean_chunk_len(&self) -> f64 {
        let p = 1.0 / self.config.target_chunk_size() as f64;
        let q = 1.0 - p;
        let first = self.config.min_chunk_size().max(Self::WINDOW_BYTES_LEN);
        let span = (self.config.max_chunk_size() - first) as f64;
        first as f64 + q * (1.0 - q.powf(span)) / p
    }

    /// Counts every anchor in `buffer`, ignoring size bounds.
    ///
    /// Diagnostic only: compare against [`Chunker::expected_anchor_count`] to
    /// check hash uniformity. Single linear pass.
    pub fn anchor_count(&self, buffer: &[u8]) -> u64 {
        let window = Self::WINDOW_BYTES_LEN;
        if buffer.len() < window {
            return 0;
        }

        let mask = self.config.anchor_mask();
        let mut hash = RollingHash::new();
        for &byte in &buffer[..window] {
            hash.push(byte);
        }

        let mut count = u64::from(hash.value() & mask == 0);
        for i in window..buffer.len() {
            hash.roll(buffer[i - window], buffer[i]);
            count += u64::from(hash.value() & mask == 0);
        }
        count
    }

    /// Splits `buffer[start..end]` into bounded content-defined chunks.
    ///
    /// Closed chunks are appended to `output` in order. The first starts at
    /// `start` and each following one starts where the previous ended.
    ///
    /// Returns the offset up to which chunks were emitted:
    ///
    /// - `flush == false`: the start of the unclosed tail. Pass the bytes from
    ///   that offset onward, followed by newer input, to the next call.
    /// - `flush == true`: `end`. The tail is emitted as a final chunk even if
    ///   shorter than `min_chunk_size`.
    ///
    /// # Errors
    ///
    /// - [`ChunkError::InvalidRange`] if `start > end` or `end > buffer.len()`.
    /// - [`ChunkError::EncodingOverflow`] if an offset in the range does not
    ///   fit the descriptor's offset field.
    ///
    /// On error `output` is left unchanged.
    pub fn get_chunks(
        &self,
        output: &mut Vec<ChunkDescriptor>,
        buffer: &[u8],
        start: usize,
        end: usize,
        flush: bool,
    ) -> Result<usize, ChunkError> {
        if start > end || end > buffer.len() {
            return Err(ChunkError::InvalidRange {
                start,
                end,
                len: buffer.len(),
            });
        }
        if let Some(last) = end.checked_sub(1) {
            if last as u64 > ChunkDescriptor::MAX_OFFSET {
                return Err(ChunkError::EncodingOverflow {
                    field: "offset",
                    value: last as u64,
                    max: ChunkDescriptor::MAX_OFFSET,
                });
            }
        }

        let emitted_before = output.len();
        let mut chunk_start = start;

        while let Some(chunk_end) = self.find_boundary(buffer, chunk_start, end) {
            output.push(ChunkDescriptor::pack(
                chunk_start as u64,
                (chunk_end - chunk_start) as u64,
            ));
            chunk_start = chunk_end;
        }

        let next = if flush {
            if chunk_start < end {
                output.push(ChunkDescriptor::pack(
                    chunk_start as u64,
                    (end - chunk_start) as u64,
                ));
            }
            end
        } else {
            chunk_start
        };

        tracing::trace!(
            start,
            end,
            flush,
            emitted = output.len() - emitted_before,
            next,
            "scan complete"
        );
        Ok(next)
    }

    /// Finds the end of the chunk opening at `chunk_start`.
    ///
    /// Returns `None` when `end` is reached without a boundary. The window is
    /// filled fresh from `chunk_start`, so no anchor is tested before
    /// `chunk_start + WINDOW_BYTES_LEN - 1`.
    #[inline]
    fn find_boundary(&self, buffer: &[u8], chunk_start: usize, end: usize) -> Option<usize> {
        let window = Self::WINDOW_BYTES_LEN;
        if end - chunk_start < window {
            return None;
        }

        let mask = self.config.anchor_mask();
        let min_size = self.config.min_chunk_size();
        let max_size = self.config.max_chunk_size();

        let mut hash = RollingHash::new();
        for &byte in &buffer[chunk_start..chunk_start + window] {
            hash.push(byte);
        }

        let mut i = chunk_start + window - 1;
        loop {
            let len = i + 1 - chunk_start;
            if len >= max_size || (len >= min_size && hash.value() & mask == 0) {
                return Some(i + 1);
            }

            i += 1;
            if i >= end {
                return None;
            }
            hash.roll(buffer[i - window], buffer[i]);
        }
    }

    /// Chunks an in-memory buffer in one flushed scan.
    ///
    /// Chunk data is sliced zero-copy from `data`.
    ///
    /// # Example
    ///
    /// ```
    /// use anchorcdc::Chunker;
    ///
    /// let chunker = Chunker::new(8)?;
    /// let chunks = chunker.chunk_bytes(vec![7u8; 5000])?;
    ///
    /// let total: usize = chunks.iter().map(|c| c.len()).sum();
    /// assert_eq!(total, 5000);
    /// # Ok::<(), anchorcdc::ChunkError>(())
    /// ```
    pub fn chunk_bytes(&self, data: impl Into<Bytes>) -> Result<Vec<Chunk>, ChunkError> {
        let data = data.into();
        let mut descriptors = Vec::new();
        self.get_chunks(&mut descriptors, &data, 0, data.len(), true)?;

        Ok(descriptors
            .into_iter()
            .map(|desc| Chunk::from_descriptor(&data, desc, 0))
            .collect())
    }

    /// Creates a chunking iterator over a reader.
    ///
    /// The iterator reads in bounded batches and carries each scan's
    /// unclosed tail into the next one, so its output matches a single
    /// flushed scan over the whole stream.
    ///
    /// # Example
    ///
    /// ```
    /// use anchorcdc::Chunker;
    /// use std::io::Cursor;
    ///
    /// let data = vec![42u8; 10_000];
    /// let chunker = Chunker::new(9)?;
    /// let chunks = chunker
    ///     .chunk(Cursor::new(&data))
    ///     .collect::<Result<Vec<_>, _>>()?;
    /// assert_eq!(chunks.iter().map(|c| c.len()).sum::<usize>(), data.len());
    /// # Ok::<(), anchorcdc::ChunkError>(())
    /// ```
    pub fn chunk<R: Read>(&self, reader: R) -> ChunkIter<R> {
        ChunkIter::new(reader, *self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noise(len: usize, mut seed: u64) -> Vec<u8> {
        (0..len)
            .map(|_| {
                seed ^= seed << 13;
                seed ^= seed >> 7;
                seed ^= seed << 17;
                (seed >> 24) as u8
            })
            .collect()
    }

    fn scan(chunker: &Chunker, data: &[u8]) -> Vec<ChunkDescriptor> {
        let mut out = Vec::new();
        chunker
            .get_chunks(&mut out, data, 0, data.len(), true)
            .unwrap();
        out
    }

    #[test]
    fn test_empty_buffer() {
        let chunker = Chunker::default();
        let mut out = Vec::new();
        assert_eq!(chunker.get_chunks(&mut out, &[], 0, 0, true).unwrap(), 0);
        assert!(out.is_empty());
        assert_eq!(chunker.get_chunks(&mut out, &[], 0, 0, false).unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_shorter_than_window() {
        let chunker = Chunker::new(8).unwrap();
        let data = [1u8; 10];

        let mut out = Vec::new();
        let next = chunker.get_chunks(&mut out, &data, 0, 10, false).unwrap();
        assert_eq!(next, 0);
        assert!(out.is_empty());

        let next = chunker.get_chunks(&mut out, &data, 0, 10, true).unwrap();
        assert_eq!(next, 10);
        assert_eq!(out, vec![ChunkDescriptor::new(0, 10).unwrap()]);
    }

    #[test]
    fn test_constant_input_cut_at_max() {
        // Constant bytes give one fixed hash; with no anchor every chunk is max-sized.
        let chunker = Chunker::new(8).unwrap();
        let mask = chunker.config().anchor_mask();
        let byte = (0u8..=255)
            .find(|&b| RollingHash::of(&[b; 48]) & mask != 0)
            .unwrap();
        let data = vec![byte; 5000];

        let out = scan(&chunker, &data);
        let max = chunker.max_chunk_size() as u64;
        assert_eq!(out.len(), 5);
        for desc in &out[..4] {
            assert_eq!(desc.length(), max);
        }
        assert_eq!(out[4].length(), 5000 - 4 * max);
    }

    #[test]
    fn test_anchor_below_min_is_skipped() {
        let chunker = Chunker::new(8).unwrap();
        let mask = chunker.config().anchor_mask();
        let window = Chunker::WINDOW_BYTES_LEN;
        let min = chunker.min_chunk_size();
        let max = chunker.max_chunk_size();
        let is_anchor =
            |data: &[u8], len: usize| RollingHash::of(&data[len - window..len]) & mask == 0;

        // Input with an anchor closing a chunk shorter than min_chunk_size.
        let (data, early) = (1..10_000u64)
            .find_map(|seed| {
                let data = noise(2 * max, seed);
                let early = (window..min).find(|&len| is_anchor(&data, len))?;
                Some((data, early))
            })
            .expect("no seed has an anchor before min_chunk_size");

        let expected = (min..=max)
            .find(|&len| len == max || is_anchor(&data, len))
            .unwrap();

        let out = scan(&chunker, &data);
        assert!(out.iter().all(|desc| desc.end() != early as u64));
        assert_eq!(out[0], ChunkDescriptor::new(0, expected as u64).unwrap());
    }

    #[test]
    fn test_boundaries_match_anchor_rule() {
        let chunker = Chunker::new(8).unwrap();
        let data = noise(50_000, 99);
        let out = scan(&chunker, &data);
        let mask = chunker.config().anchor_mask();

        for desc in &out[..out.len() - 1] {
            let len = desc.length() as usize;
            if len < chunker.max_chunk_size() {
                let last = desc.end() as usize - 1;
                let window = &data[last + 1 - Chunker::WINDOW_BYTES_LEN..=last];
                assert_eq!(RollingHash::of(window) & mask, 0, "cut at {} is not an anchor", last);
                assert!(len >= chunker.min_chunk_size());
            }
        }
    }

    #[test]
    fn test_non_flush_returns_tail() {
        let chunker = Chunker::new(8).unwrap();
        let data = noise(10_000, 5);

        let mut out = Vec::new();
        let next = chunker
            .get_chunks(&mut out, &data, 0, data.len(), false)
            .unwrap();

        let covered: u64 = out.iter().map(|c| c.length()).sum();
        assert_eq!(covered, next as u64);
        assert!(data.len() - next < chunker.max_chunk_size());
    }

    #[test]
    fn test_sub_range_scan() {
        let chunker = Chunker::new(8).unwrap();
        let data = noise(8_000, 11);

        let mut out = Vec::new();
        let next = chunker.get_chunks(&mut out, &data, 1000, 7000, true).unwrap();
        assert_eq!(next, 7000);
        assert_eq!(out[0].offset(), 1000);
        assert_eq!(out.last().unwrap().end(), 7000);

        // Same chunks, shifted, as a scan over the sub-slice.
        let shifted = scan(&chunker, &data[1000..7000]);
        assert_eq!(out.len(), shifted.len());
        for (a, b) in out.iter().zip(&shifted) {
            assert_eq!(a.offset(), b.offset() + 1000);
            assert_eq!(a.length(), b.length());
        }
    }

    #[test]
    fn test_invalid_range_leaves_output() {
        let chunker = Chunker::default();
        let data = [0u8; 100];
        let mut out = vec![ChunkDescriptor::new(0, 1).unwrap()];

        let err = chunker.get_chunks(&mut out, &data, 50, 40, true).unwrap_err();
        assert!(matches!(err, ChunkError::InvalidRange { start: 50, end: 40, len: 100 }));

        let err = chunker.get_chunks(&mut out, &data, 0, 101, true).unwrap_err();
        assert!(matches!(err, ChunkError::InvalidRange { .. }));

        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_expected_anchor_count() {
        let chunker = Chunker::new(10).unwrap();
        assert_eq!(chunker.expected_anchor_count(0), 0);
        assert_eq!(chunker.expected_anchor_count(47), 0);
        assert_eq!(chunker.expected_anchor_count(48), 0);
        assert_eq!(chunker.expected_anchor_count(1024 + 47), 1);
        assert_eq!(chunker.expected_anchor_count(1_000_047), 977);
        // No overflow for very large buffers.
        assert_eq!(chunker.expected_anchor_count(u64::MAX), 1 << 54);
    }

    #[test]
    fn test_expected_chunk_count() {
        let chunker = Chunker::new(12).unwrap();
        assert_eq!(chunker.expected_chunk_count(0), 0);
        assert_eq!(chunker.expected_chunk_count(1), 1);

        // Size bounds make the mean chunk longer than the anchor spacing.
        let len = 100_000_000u64;
        let chunks = chunker.expected_chunk_count(len);
        let anchors = chunker.expected_anchor_count(len);
        assert!(chunks < anchors);
        assert!(chunks * 4 > anchors * 3);

        assert!(chunker.expected_chunk_count(10_000_000_000) > 0);
    }

    #[test]
    fn test_anchor_count_small_buffers() {
        let chunker = Chunker::new(8).unwrap();
        assert_eq!(chunker.anchor_count(&[]), 0);
        assert_eq!(chunker.anchor_count(&[0u8; 47]), 0);

        let data = noise(48, 3);
        let expected = u64::from(RollingHash::of(&data) & 0xff == 0);
        assert_eq!(chunker.anchor_count(&data), expected);
    }

    #[test]
    fn test_chunk_bytes_zero_copy() {
        let chunker = Chunker::new(8).unwrap();
        let data = Bytes::from(noise(4000, 17));
        let chunks = chunker.chunk_bytes(data.clone()).unwrap();

        let mut offset = 0u64;
        for chunk in &chunks {
            assert_eq!(chunk.offset, offset);
            assert_eq!(chunk.data.as_ref(), &data[chunk.offset as usize..chunk.end() as usize]);
            assert!(chunk.data.as_ptr() >= data.as_ptr());
            offset = chunk.end();
        }
        assert_eq!(offset, 4000);
    }
}
