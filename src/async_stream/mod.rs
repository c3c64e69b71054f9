//! Async chunking over `futures_io::AsyncRead`.
//!
//! - [`chunk_async`] - creates an async stream of chunks from an async reader
//!
//! This module requires the `async-io` feature to be enabled.

mod stream;

pub use stream::{ChunkStream, chunk_async};
