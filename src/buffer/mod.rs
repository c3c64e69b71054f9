//! Internal staging buffers for the stream drivers.
//!
//! This module provides a thread-local buffer pool so repeated stream scans
//! reuse their staging allocation. It is an implementation detail and not
//! part of the public API.

mod pool;

pub(crate) use pool::ScanBuffer;
