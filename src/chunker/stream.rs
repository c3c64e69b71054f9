//! Caller-side continuation shared by the stream drivers.
//!
//! The engine never remembers anything between scans. This type is the
//! "caller" that does: it stages input, runs non-flushed scans while more
//! input may follow, keeps each scan's unclosed tail at the front of the
//! staging buffer, and flushes once the source is exhausted.

use std::collections::VecDeque;

use crate::buffer::ScanBuffer;
use crate::chunk::{Chunk, ChunkDescriptor};
use crate::chunker::Chunker;
use crate::error::ChunkError;

/// Bytes requested from the source per read.
pub(crate) const READ_SIZE: usize = 64 * 1024;

/// Staged input plus the chunks already cut from it.
pub(crate) struct Continuation {
    chunker: Chunker,
    staging: ScanBuffer,
    /// Stream offset of `staging[0]`.
    base: u64,
    descriptors: Vec<ChunkDescriptor>,
    ready: VecDeque<Chunk>,
    fill_target: usize,
}

impl Continuation {
    pub(crate) fn new(chunker: Chunker) -> Self {
        Self {
            chunker,
            staging: ScanBuffer::take(),
            base: 0,
            descriptors: Vec::new(),
            ready: VecDeque::new(),
            // Each non-flushed scan then closes at least one max-sized chunk.
            fill_target: 2 * chunker.max_chunk_size(),
        }
    }

    /// Returns the next chunk already cut, if any.
    pub(crate) fn pop(&mut self) -> Option<Chunk> {
        self.ready.pop_front()
    }

    /// Returns true once enough input is staged to run a scan.
    pub(crate) fn wants_scan(&self) -> bool {
        self.staging.len() >= self.fill_target
    }

    pub(crate) fn staging(&mut self) -> &mut ScanBuffer {
        &mut self.staging
    }

    /// Scans the staged bytes and queues the chunks found.
    ///
    /// Without `flush` the unclosed tail stays staged for the next scan.
    /// Queued chunks share the staging allocation; nothing is copied.
    pub(crate) fn scan(&mut self, flush: bool) -> Result<(), ChunkError> {
        self.descriptors.clear();
        let staged = self.staging.as_slice();
        let next = self
            .chunker
            .get_chunks(&mut self.descriptors, staged, 0, staged.len(), flush)?;

        let scanned = self.staging.split_to(next);
        for &desc in &self.descriptors {
            self.ready
                .push_back(Chunk::from_descriptor(&scanned, desc, self.base));
        }

        self.base += next as u64;
        Ok(())
    }

    /// Stream offset up to which chunks have been cut.
    pub(crate) fn offset(&self) -> u64 {
        self.base
    }
}
