//! Blocking stream driver.
//!
//! [`ChunkIter`] pulls bytes from any [`std::io::Read`] and yields chunks as
//! the engine closes them.
//!
//! # Example
//!
//! ```no_run
//! use anchorcdc::Chunker;
//! use std::fs::File;
//!
//! let file = File::open("data.bin")?;
//! let chunker = Chunker::new(13)?;
//!
//! for chunk in chunker.chunk(file) {
//!     let chunk = chunk?;
//!     println!("Chunk: {} bytes @ {}", chunk.len(), chunk.offset);
//! }
//! # Ok::<(), anchorcdc::ChunkError>(())
//! ```

use std::io::{ErrorKind, Read};

use crate::chunk::Chunk;
use crate::chunker::Chunker;
use crate::chunker::stream::{Continuation, READ_SIZE};
use crate::error::ChunkError;

/// An iterator that yields chunks from a reader.
///
/// Reads in batches of up to 64 KiB and scans once enough input is staged
/// for at least one chunk to close. The boundaries are exactly those of a
/// single flushed [`Chunker::get_chunks`] call over the whole stream.
///
/// After an I/O error the iterator yields that error once and then ends.
pub struct ChunkIter<R> {
    reader: R,
    state: Continuation,
    eof: bool,
    finished: bool,
}

impl<R: Read> ChunkIter<R> {
    /// Creates a new chunk iterator.
    pub(crate) fn new(reader: R, chunker: Chunker) -> Self {
        Self {
            reader,
            state: Continuation::new(chunker),
            eof: false,
            finished: false,
        }
    }

    /// Returns the stream offset up to which chunks have been cut.
    pub fn offset(&self) -> u64 {
        self.state.offset()
    }

    /// Consumes the iterator and returns the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> Iterator for ChunkIter<R> {
    type Item = Result<Chunk, ChunkError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(chunk) = self.state.pop() {
                return Some(Ok(chunk));
            }
            if self.finished {
                return None;
            }

            if self.eof || self.state.wants_scan() {
                let flush = self.eof;
                if let Err(e) = self.state.scan(flush) {
                    self.finished = true;
                    return Some(Err(e));
                }
                if flush {
                    tracing::debug!(offset = self.state.offset(), "reader exhausted");
                    self.finished = true;
                }
                continue;
            }

            match self.state.staging().read_from(&mut self.reader, READ_SIZE) {
                Ok(0) => self.eof = true,
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e.into()));
                }
            }
        }
    }
}
