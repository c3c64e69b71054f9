//! anchorcdc
//!
//! Content-defined chunking with a stateless engine.
//!
//! `anchorcdc` splits byte buffers into variable-length chunks whose
//! boundaries depend only on local content. A 48-byte rolling hash marks
//! *anchors*; chunks close at anchors once they reach a minimum size and are
//! forced closed at a maximum size. It is a small primitive for:
//!
//! - deduplication
//! - delta synchronization
//! - content-addressable storage
//!
//! The crate intentionally:
//! - does NOT open files or manage paths
//! - does NOT hash chunk contents
//! - does NOT store or index chunks
//! - does NOT keep state between scans
//!
//! Scans emit packed [`ChunkDescriptor`]s. A scan that is not flushed returns
//! where its unclosed tail starts; the caller hands that tail back with the
//! next bytes. [`ChunkIter`] and `chunk_async` do exactly that for streams.
//!
//! # Buffers
//!
//! ```
//! use anchorcdc::{Chunker, ChunkError};
//!
//! fn main() -> Result<(), ChunkError> {
//!     let data = vec![7u8; 100_000];
//!     let chunker = Chunker::new(12)?;
//!
//!     let mut chunks = Vec::new();
//!     chunker.get_chunks(&mut chunks, &data, 0, data.len(), true)?;
//!     for desc in &chunks {
//!         println!("{desc}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Sync streams
//!
//! ```no_run
//! use std::fs::File;
//! use anchorcdc::{Chunker, ChunkError};
//!
//! fn main() -> Result<(), ChunkError> {
//!     let file = File::open("data.bin")?;
//!     let chunker = Chunker::default();
//!
//!     for chunk in chunker.chunk(file) {
//!         let chunk = chunk?;
//!         println!("chunk {} bytes @ {}", chunk.len(), chunk.offset);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Async streams (feature = "async-io")
//!
//! ```ignore
//! use futures_util::StreamExt;
//! use anchorcdc::{chunk_async, ChunkConfig};
//! use futures_io::AsyncRead;
//!
//! async fn demo<R: AsyncRead + Unpin>(reader: R) -> Result<(), anchorcdc::ChunkError> {
//!     let mut stream = chunk_async(reader, ChunkConfig::default());
//!
//!     while let Some(chunk) = stream.next().await {
//!         let chunk = chunk?;
//!         println!("chunk {}", chunk.data.len());
//!     }
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod chunk;
mod chunker;
mod config;
mod error;

mod buffer; // internal (thread-local reuse)
mod cdc; // rolling hash, exported as `RollingHash`

#[cfg(feature = "async-io")]
mod async_stream;

//
// Public surface
//

pub use cdc::RollingHash;
pub use chunk::{Chunk, ChunkDescriptor, chunk_to_length, chunk_to_offset};
pub use chunker::{ChunkIter, Chunker};
pub use config::ChunkConfig;
pub use error::ChunkError;

#[cfg(feature = "async-io")]
pub use async_stream::{ChunkStream, chunk_async};

/// Smallest accepted `mask_bits`.
pub const MIN_MASK_BITS: u32 = ChunkConfig::MIN_MASK_BITS;

/// Largest accepted `mask_bits`.
pub const MAX_MASK_BITS: u32 = ChunkConfig::MAX_MASK_BITS;

/// Length of the rolling-hash window in bytes.
pub const WINDOW_BYTES_LEN: usize = ChunkConfig::WINDOW_BYTES_LEN;
