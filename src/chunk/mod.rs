//! Chunk types.
//!
//! - [`ChunkDescriptor`] - packed 64-bit `(offset, length)` emitted by scans
//! - [`Chunk`] - chunk bytes with their stream offset

mod data;
mod descriptor;

pub use data::Chunk;
pub use descriptor::{ChunkDescriptor, chunk_to_length, chunk_to_offset};
