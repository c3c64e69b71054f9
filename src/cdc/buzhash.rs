//! Cyclic polynomial (buzhash) rolling hash over a fixed byte window.
//!
//! # Algorithm Overview
//!
//! Every byte value maps to a pseudo-random 64-bit word. For a window
//! `b[0..W]` the hash is
//!
//! ```text
//! H = rotl(T[b0], W-1) ^ rotl(T[b1], W-2) ^ ... ^ rotl(T[b(W-1)], 0)
//! ```
//!
//! Sliding the window one byte costs one rotate and two XORs: rotate the
//! whole hash left by one, cancel the leaving byte (which has now been rotated
//! by exactly `W`), and mix in the entering byte. No multiplications, no
//! modulo, and the result depends only on the bytes currently in the window.
//!
//! For pseudo-random input each output bit is an XOR of table bits drawn
//! from independent bytes, so the low bits tested by the anchor predicate are
//! uniformly distributed.

use crate::config::ChunkConfig;

const WINDOW: usize = ChunkConfig::WINDOW_BYTES_LEN;

/// One step of the splitmix64 generator.
const fn splitmix64(state: u64) -> (u64, u64) {
    let state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    (state, z ^ (z >> 31))
}

/// Builds the per-byte word table at compile time.
const fn build_table() -> [u64; 256] {
    let mut table = [0u64; 256];
    let mut state = 0x6275_7a68_6173_6821; // "buzhash!"
    let mut i = 0;
    while i < 256 {
        let (next, value) = splitmix64(state);
        state = next;
        table[i] = value;
        i += 1;
    }
    table
}

/// Same words pre-rotated by the window length, used to cancel a leaving byte.
const fn build_leave_table(table: &[u64; 256]) -> [u64; 256] {
    let mut shifted = [0u64; 256];
    let mut i = 0;
    while i < 256 {
        shifted[i] = table[i].rotate_left((WINDOW % 64) as u32);
        i += 1;
    }
    shifted
}

const TABLE: [u64; 256] = build_table();

static ENTER_TABLE: [u64; 256] = TABLE;
static LEAVE_TABLE: [u64; 256] = build_leave_table(&TABLE);

/// Rolling hash state for one window.
///
/// The state does not store the window bytes: the caller already holds them
/// in its buffer and passes the leaving byte to [`RollingHash::roll`]. Use
/// [`RollingHash::push`] while the window is filling.
///
/// # Example
///
/// ```
/// use anchorcdc::{RollingHash, WINDOW_BYTES_LEN as WINDOW};
///
/// let data: Vec<u8> = (0..200u8).collect();
/// let mut hash = RollingHash::new();
/// for &byte in &data[..WINDOW] {
///     hash.push(byte);
/// }
/// for i in WINDOW..data.len() {
///     hash.roll(data[i - WINDOW], data[i]);
/// }
/// assert!(hash.is_full());
/// assert_eq!(hash.value(), RollingHash::of(&data));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RollingHash {
    hash: u64,
    filled: usize,
}

impl RollingHash {
    /// Creates an empty hash state.
    pub fn new() -> Self {
        Self { hash: 0, filled: 0 }
    }

    /// Computes the hash of a complete window from scratch.
    ///
    /// Only the last `WINDOW_BYTES_LEN` bytes of `window` contribute.
    pub fn of(window: &[u8]) -> u64 {
        let start = window.len().saturating_sub(WINDOW);
        let mut state = Self::new();
        for &byte in &window[start..] {
            state.push(byte);
        }
        state.hash
    }

    /// Adds a byte while the window is still filling.
    #[inline]
    pub fn push(&mut self, enter: u8) {
        debug_assert!(self.filled < WINDOW, "push on a full window");
        self.hash = self.hash.rotate_left(1) ^ ENTER_TABLE[enter as usize];
        self.filled += 1;
    }

    /// Slides a full window by one byte.
    #[inline]
    pub fn roll(&mut self, leave: u8, enter: u8) {
        self.hash = self.hash.rotate_left(1)
            ^ LEAVE_TABLE[leave as usize]
            ^ ENTER_TABLE[enter as usize];
    }

    /// Clears the state for a new window.
    pub fn reset(&mut self) {
        self.hash = 0;
        self.filled = 0;
    }

    /// Returns true once `WINDOW_BYTES_LEN` bytes have been pushed.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.filled >= WINDOW
    }

    /// Returns the current hash value.
    #[inline]
    pub fn value(&self) -> u64 {
        self.hash
    }
}
