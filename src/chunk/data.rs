//! The Chunk type - a materialised content-defined chunk.

use bytes::Bytes;
use std::fmt;

use super::ChunkDescriptor;

/// A chunk's bytes together with its absolute position in the input.
///
/// Produced by [`Chunker::chunk_bytes`](crate::Chunker::chunk_bytes) and the
/// stream drivers. The engine itself works on [`ChunkDescriptor`]s.
///
/// # Example
///
/// ```
/// use anchorcdc::Chunk;
/// use bytes::Bytes;
///
/// let chunk = Chunk {
///     data: Bytes::from_static(b"hello world"),
///     offset: 0,
/// };
///
/// assert_eq!(chunk.len(), 11);
/// assert_eq!(chunk.range(), 0..11);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// The chunk data.
    pub data: Bytes,

    /// Offset of the first byte in the original stream.
    pub offset: u64,
}

impl Chunk {
    /// Creates a chunk at the given stream offset.
    pub fn new(data: impl Into<Bytes>, offset: u64) -> Self {
        Self {
            data: data.into(),
            offset,
        }
    }

    /// Slices a chunk out of a scanned buffer.
    ///
    /// `base` is the stream offset of `buffer[0]`.
    pub(crate) fn from_descriptor(buffer: &Bytes, desc: ChunkDescriptor, base: u64) -> Self {
        Self {
            data: buffer.slice(desc.range()),
            offset: base + desc.offset(),
        }
    }

    /// Returns the length of the chunk data.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the chunk has no data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the end offset (exclusive).
    pub fn end(&self) -> u64 {
        self.offset + self.data.len() as u64
    }

    /// Returns the chunk as a range.
    pub fn range(&self) -> std::ops::Range<u64> {
        self.offset..self.end()
    }

    /// Consumes the chunk and returns the underlying data.
    pub fn into_data(self) -> Bytes {
        self.data
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Chunk({} bytes @ {})", self.len(), self.offset)
    }
}
