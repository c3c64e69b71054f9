//! Chunking a stream with explicit caller-managed continuation.
//!
//! Feeds input to `get_chunks` in fixed batches, carrying each scan's
//! unclosed tail into the next one, then compares the result with the
//! built-in iterator.
//!
//! Run with:
//!     cargo run --example stream_chunks [PATH] [MASK_BITS]

use std::fs::File;
use std::io::{Cursor, Read};

use anchorcdc::{ChunkDescriptor, Chunker};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let data = match args.next() {
        Some(path) => {
            let mut data = Vec::new();
            File::open(path)?.read_to_end(&mut data)?;
            data
        }
        None => sample_data(4 * 1024 * 1024),
    };
    let mask_bits = match args.next() {
        Some(bits) => bits.parse()?,
        None => 13,
    };

    let chunker = Chunker::new(mask_bits)?;
    println!(
        "Chunking {} bytes: mask_bits={}, min={}, max={}, window={}\n",
        data.len(),
        mask_bits,
        chunker.min_chunk_size(),
        chunker.max_chunk_size(),
        chunker.window_length()
    );

    // Caller-side continuation: the engine only sees `staging`.
    let batch_size = 64 * 1024;
    let mut staging: Vec<u8> = Vec::new();
    let mut base = 0u64;
    let mut descriptors = Vec::new();
    let mut chunks: Vec<ChunkDescriptor> = Vec::new();

    for batch in data.chunks(batch_size) {
        staging.extend_from_slice(batch);
        descriptors.clear();
        let next = chunker.get_chunks(&mut descriptors, &staging, 0, staging.len(), false)?;
        for desc in &descriptors {
            chunks.push(ChunkDescriptor::new(base + desc.offset(), desc.length())?);
        }
        staging.drain(..next);
        base += next as u64;
    }

    descriptors.clear();
    chunker.get_chunks(&mut descriptors, &staging, 0, staging.len(), true)?;
    for desc in &descriptors {
        chunks.push(ChunkDescriptor::new(base + desc.offset(), desc.length())?);
    }

    for (i, desc) in chunks.iter().enumerate().take(10) {
        println!("  Chunk {:>4}: {}", i + 1, desc);
    }
    if chunks.len() > 10 {
        println!("  ... {} more", chunks.len() - 10);
    }

    let from_iter = chunker
        .chunk(Cursor::new(&data))
        .map(|c| c.and_then(|c| ChunkDescriptor::new(c.offset, c.len() as u64)))
        .collect::<Result<Vec<_>, _>>()?;

    println!("\nChunks:           {}", chunks.len());
    println!("Expected chunks:  {}", chunker.expected_chunk_count(data.len() as u64));
    println!("Anchors:          {}", chunker.anchor_count(&data));
    println!("Expected anchors: {}", chunker.expected_anchor_count(data.len() as u64));
    println!("Iterator agrees:  {}", from_iter == chunks);

    Ok(())
}

fn sample_data(len: usize) -> Vec<u8> {
    let mut seed = 0x853c_49e6_748f_ea9bu64;
    (0..len)
        .map(|_| {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            (seed >> 56) as u8
        })
        .collect()
}
