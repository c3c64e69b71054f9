//! Rolling hash used to find content-defined anchors.
//!
//! - [`RollingHash`] - buzhash over a fixed window of
//!   [`ChunkConfig::WINDOW_BYTES_LEN`](crate::ChunkConfig::WINDOW_BYTES_LEN) bytes

mod buzhash;

pub use buzhash::RollingHash;
