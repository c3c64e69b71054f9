//! Async chunking example.
//!
//! Chunks a file (or generated data) through `chunk_async`, bridging the
//! tokio reader to `futures_io` with `tokio_util::compat`.
//!
//! Run with:
//!     cargo run --example async_stream --features async-io [PATH]

use anchorcdc::{ChunkConfig, chunk_async};
use futures_util::StreamExt;
use tokio_util::compat::TokioAsyncReadCompatExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ChunkConfig::new(12)?;

    let (total_chunks, total_bytes) = match std::env::args().nth(1) {
        Some(path) => {
            let file = tokio::fs::File::open(&path).await?;
            println!("Async chunking {}...\n", path);
            print_chunks(chunk_async(file.compat(), config)).await?
        }
        None => {
            let data: Vec<u8> = (0..1_000_000u32)
                .map(|i| (i.wrapping_mul(2_654_435_761) >> 11) as u8)
                .collect();
            println!("Async chunking {} bytes of generated data...\n", data.len());
            let reader: &[u8] = &data;
            print_chunks(chunk_async(reader, config)).await?
        }
    };

    println!("\nTotal: {} chunks, {} bytes", total_chunks, total_bytes);
    if total_chunks > 0 {
        println!("Average chunk size: {} bytes", total_bytes / total_chunks);
    }
    Ok(())
}

async fn print_chunks<S>(mut stream: S) -> Result<(usize, usize), anchorcdc::ChunkError>
where
    S: futures_util::Stream<Item = Result<anchorcdc::Chunk, anchorcdc::ChunkError>> + Unpin,
{
    let mut total_chunks = 0;
    let mut total_bytes = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        total_chunks += 1;
        total_bytes += chunk.len();
        println!("  Chunk {:>4}: {}", total_chunks, chunk);
    }
    Ok((total_chunks, total_bytes))
}
