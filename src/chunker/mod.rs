//! Chunking engine and stream drivers.
//!
//! - [`Chunker`] - stateless scanner over in-memory buffers
//! - [`ChunkIter`] - iterator that chunks a [`std::io::Read`] source

mod engine;
mod iter;
pub(crate) mod stream;

pub use engine::Chunker;
pub use iter::ChunkIter;
