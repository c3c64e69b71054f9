#![no_main]

use anchorcdc::{Chunker, MAX_MASK_BITS, MIN_MASK_BITS};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (u8, u16, Vec<u8>)| {
    let (bits, split, data) = input;
    let bits = MIN_MASK_BITS + u32::from(bits) % (MAX_MASK_BITS - MIN_MASK_BITS + 1);
    let chunker = Chunker::new(bits).unwrap();

    let mut chunks = Vec::new();
    let next = chunker
        .get_chunks(&mut chunks, &data, 0, data.len(), true)
        .unwrap();
    assert_eq!(next, data.len());

    // Coverage and contiguity
    let mut expected_offset = 0u64;
    for chunk in &chunks {
        assert_eq!(chunk.offset(), expected_offset);
        expected_offset = chunk.end();
    }
    assert_eq!(expected_offset, data.len() as u64);

    // Bounds: only the flushed tail may be short
    for (i, chunk) in chunks.iter().enumerate() {
        assert!(chunk.length() <= chunker.max_chunk_size() as u64);
        if i + 1 < chunks.len() {
            assert!(chunk.length() >= chunker.min_chunk_size() as u64);
        }
    }

    // Two-call continuation reproduces the single scan
    let split = usize::from(split).min(data.len());
    let mut resumed = Vec::new();
    let tail = chunker
        .get_chunks(&mut resumed, &data, 0, split, false)
        .unwrap();
    assert!(split - tail < chunker.max_chunk_size());
    chunker
        .get_chunks(&mut resumed, &data, tail, data.len(), true)
        .unwrap();
    assert_eq!(resumed, chunks);
});
