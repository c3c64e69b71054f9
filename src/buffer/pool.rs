//! Thread-local pool of staging buffers for the stream drivers.

use std::cell::RefCell;
use std::io::{self, Read};

use bytes::{Bytes, BytesMut};

/// Initial capacity of a fresh staging buffer.
pub const DEFAULT_BUFFER_SIZE: usize = 256 * 1024;

/// Buffers that grew past this capacity are freed instead of pooled.
pub const MAX_POOLED_CAPACITY: usize = 4 * 1024 * 1024;

/// Maximum number of buffers to keep per thread.
pub const MAX_POOL_SIZE: usize = 4;

/// Growable byte buffer holding input that has not yet been chunked.
///
/// Bytes are appended at the back by reads and split off the front once a
/// scan has emitted chunks covering them. `data[filled..]` is initialised
/// slack that reads write into directly, so a read only zero-fills the part
/// of its target range the buffer has never held.
pub struct ScanBuffer {
    data: BytesMut,
    filled: usize,
}

impl ScanBuffer {
    /// Takes a buffer from the thread-local pool or creates a new one.
    pub fn take() -> Self {
        let data = THREAD_BUFFER_POOL.with(|pool| pool.borrow_mut().pop());
        let mut data = data.unwrap_or_default();
        data.reserve(DEFAULT_BUFFER_SIZE);
        Self { data, filled: 0 }
    }

    /// Returns the buffered bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.filled]
    }

    /// Returns the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.filled
    }

    /// Splits off the first `n` buffered bytes without copying them.
    pub fn split_to(&mut self, n: usize) -> Bytes {
        let n = n.min(self.filled);
        self.filled -= n;
        self.data.split_to(n).freeze()
    }

    /// Makes room for `limit` more bytes and returns the writable region.
    fn spare(&mut self, limit: usize) -> &mut [u8] {
        let want = self.filled + limit;
        if self.data.len() < want {
            self.data.resize(want, 0);
        }
        &mut self.data[self.filled..want]
    }

    /// Appends up to `limit` bytes from a blocking reader.
    ///
    /// Returns the number of bytes appended; 0 means end of input.
    pub fn read_from<R: Read>(&mut self, reader: &mut R, limit: usize) -> io::Result<usize> {
        let n = reader.read(self.spare(limit))?;
        self.filled += n;
        Ok(n)
    }

    /// Appends up to `limit` bytes from a non-blocking reader.
    #[cfg(feature = "async-io")]
    pub fn poll_read_from<R: futures_io::AsyncRead>(
        &mut self,
        reader: std::pin::Pin<&mut R>,
        cx: &mut std::task::Context<'_>,
        limit: usize,
    ) -> std::task::Poll<io::Result<usize>> {
        let poll = reader.poll_read(cx, self.spare(limit));
        if let std::task::Poll::Ready(Ok(n)) = &poll {
            self.filled += *n;
        }
        poll
    }
}

impl Drop for ScanBuffer {
    fn drop(&mut self) {
        if self.data.capacity() <= MAX_POOLED_CAPACITY {
            self.data.clear();
            THREAD_BUFFER_POOL.with(|pool| {
                let mut pool = pool.borrow_mut();
                if pool.len() < MAX_POOL_SIZE {
                    pool.push(std::mem::take(&mut self.data));
                }
            });
        }
    }
}

thread_local! {
    static THREAD_BUFFER_POOL: RefCell<Vec<BytesMut>> = const { RefCell::new(Vec::new()) };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_buffer_take() {
        let buf = ScanBuffer::take();
        assert!(buf.data.capacity() >= DEFAULT_BUFFER_SIZE);
        assert_eq!(buf.len(), 0);
    }

    #[test]
    fn test_read_and_split() {
        let mut buf = ScanBuffer::take();
        let mut reader = Cursor::new(b"hello world".to_vec());

        assert_eq!(buf.read_from(&mut reader, 5).unwrap(), 5);
        assert_eq!(buf.as_slice(), b"hello");
        assert_eq!(buf.read_from(&mut reader, 100).unwrap(), 6);
        assert_eq!(buf.as_slice(), b"hello world");
        assert_eq!(buf.read_from(&mut reader, 100).unwrap(), 0);
        assert_eq!(buf.len(), 11);

        assert_eq!(buf.split_to(6), Bytes::from_static(b"hello "));
        assert_eq!(buf.as_slice(), b"world");
        assert!(buf.split_to(0).is_empty());
        assert_eq!(buf.as_slice(), b"world");
        assert_eq!(buf.split_to(10), Bytes::from_static(b"world"));
        assert!(buf.as_slice().is_empty());
    }

    #[test]
    fn test_split_is_zero_copy() {
        let mut buf = ScanBuffer::take();
        buf.read_from(&mut Cursor::new(b"abcdef".to_vec()), 6)
            .unwrap();
        let base = buf.as_slice().as_ptr();

        let head = buf.split_to(4);
        assert_eq!(head.as_ptr(), base);
        assert_eq!(buf.as_slice().as_ptr(), base.wrapping_add(4));
    }

    #[test]
    fn test_slack_is_reused() {
        let mut buf = ScanBuffer::take();
        let data = vec![9u8; 1000];
        let mut reader = Cursor::new(&data);

        // A short read leaves the rest of the requested range as slack.
        assert_eq!(buf.read_from(&mut Cursor::new(&data[..10]), 4096).unwrap(), 10);
        assert_eq!(buf.data.len(), 4096);

        // Later reads within that slack do not grow the initialised region.
        assert_eq!(buf.read_from(&mut reader, 100).unwrap(), 100);
        assert_eq!(buf.data.len(), 4096);
        assert_eq!(buf.len(), 110);
    }

    #[test]
    fn test_read_error_keeps_contents() {
        struct Failing;
        impl Read for Failing {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("boom"))
            }
        }

        let mut buf = ScanBuffer::take();
        buf.read_from(&mut Cursor::new(b"abc".to_vec()), 3).unwrap();
        assert!(buf.read_from(&mut Failing, 64).is_err());
        assert_eq!(buf.as_slice(), b"abc");
    }

    #[test]
    fn test_buffer_reuse() {
        {
            let mut buf = ScanBuffer::take();
            buf.read_from(&mut Cursor::new(b"test data".to_vec()), 9)
                .unwrap();
        }

        let buf = ScanBuffer::take();
        assert!(buf.as_slice().is_empty());
        assert!(buf.data.capacity() >= DEFAULT_BUFFER_SIZE);
    }
}
