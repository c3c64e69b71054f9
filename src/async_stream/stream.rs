//! Non-blocking stream driver.
//!
//! # Example
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
//!         println!("Chunk: {} bytes @ {}", chunk.len(), chunk.offset);
//!     }
//!     Ok(())
//! }
//! ```

use std::io::ErrorKind;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use futures_io::AsyncRead;
use pin_project_lite::pin_project;

use crate::chunk::Chunk;
use crate::chunker::Chunker;
use crate::chunker::stream::{Continuation, READ_SIZE};
use crate::config::ChunkConfig;
use crate::error::ChunkError;

pin_project! {
    /// A stream that yields chunks from an async reader.
    ///
    /// Cuts exactly the same chunks as [`crate::ChunkIter`] over the same
    /// bytes. Works with any runtime that speaks `futures_io::AsyncRead`.
    pub struct ChunkStream<R> {
        #[pin]
        reader: R,
        state: Continuation,
        eof: bool,
        finished: bool,
    }
}

impl<R> ChunkStream<R> {
    fn new(reader: R, config: ChunkConfig) -> Self {
        Self {
            reader,
            state: Continuation::new(Chunker::with_config(config)),
            eof: false,
            finished: false,
        }
    }

    /// Returns the stream offset up to which chunks have been cut.
    pub fn offset(&self) -> u64 {
        self.state.offset()
    }
}

impl<R: AsyncRead> Stream for ChunkStream<R> {
    type Item = Result<Chunk, ChunkError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if let Some(chunk) = this.state.pop() {
                return Poll::Ready(Some(Ok(chunk)));
            }
            if *this.finished {
                return Poll::Ready(None);
            }

            if *this.eof || this.state.wants_scan() {
                let flush = *this.eof;
                if let Err(e) = this.state.scan(flush) {
                    *this.finished = true;
                    return Poll::Ready(Some(Err(e)));
                }
                if flush {
                    tracing::debug!(offset = this.state.offset(), "async reader exhausted");
                    *this.finished = true;
                }
                continue;
            }

            match this
                .state
                .staging()
                .poll_read_from(this.reader.as_mut(), cx, READ_SIZE)
            {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Ok(0)) => *this.eof = true,
                Poll::Ready(Ok(_)) => {}
                Poll::Ready(Err(e)) if e.kind() == ErrorKind::Interrupted => {}
                Poll::Ready(Err(e)) => {
                    *this.finished = true;
                    return Poll::Ready(Some(Err(e.into())));
                }
            }
        }
    }
}

/// Creates a chunk stream from an async reader.
///
/// For tokio readers, convert with `tokio_util::compat`:
///
/// ```ignore
/// use tokio_util::compat::TokioAsyncReadCompatExt;
/// use anchorcdc::{chunk_async, ChunkConfig};
///
/// let file = tokio::fs::File::open("data.bin").await?;
/// let stream = chunk_async(file.compat(), ChunkConfig::default());
/// ```
pub fn chunk_async<R: AsyncRead>(reader: R, config: ChunkConfig) -> ChunkStream<R> {
    ChunkStream::new(reader, config)
}
