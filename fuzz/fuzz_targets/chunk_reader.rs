#![no_main]

use std::io::{self, Read};

use anchorcdc::Chunker;
use libfuzzer_sys::fuzz_target;

/// Reader that returns reads of fuzzer-chosen sizes.
struct Uneven<'a> {
    data: &'a [u8],
    steps: &'a [u8],
    at: usize,
}

impl Read for Uneven<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let step = match self.steps.get(self.at % self.steps.len().max(1)) {
            Some(&s) => usize::from(s) * 97 + 1,
            None => buf.len(),
        };
        self.at += 1;
        let data = self.data;
        let n = step.min(buf.len()).min(data.len());
        buf[..n].copy_from_slice(&data[..n]);
        self.data = &data[n..];
        Ok(n)
    }
}

fuzz_target!(|input: (Vec<u8>, Vec<u8>)| {
    let (steps, data) = input;
    let chunker = Chunker::new(8).unwrap();

    let expected = chunker.chunk_bytes(data.clone()).unwrap();

    let reader = Uneven {
        data: &data,
        steps: &steps,
        at: 0,
    };
    let streamed: Vec<_> = chunker
        .chunk(reader)
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(streamed, expected);
});
