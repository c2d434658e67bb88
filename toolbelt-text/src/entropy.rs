//! Shannon entropy of byte streams, in bits per byte (0.0 ..= 8.0).

use std::io::{self, Read};

use crate::Result;

/// Byte histogram accumulated over one or more chunks.
#[derive(Clone)]
struct Histogram {
    counts: [u64; 256],
    total: u64,
}

impl Histogram {
    fn new() -> Self {
        Self {
            counts: [0; 256],
            total: 0,
        }
    }

    fn update(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.counts[usize::from(*b)] += 1;
        }
        self.total += bytes.len() as u64;
    }

    fn entropy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let total = self.total as f64;
        let sum: f64 = self
            .counts
            .iter()
            .filter(|c| **c > 0)
            .map(|c| {
                let p = *c as f64 / total;
                p * p.log2()
            })
            .sum();
        // Avoid returning -0.0 for single-symbol input.
        if sum == 0.0 {
            0.0
        } else {
            -sum
        }
    }
}

/// Entropy of everything left in `reader`.
pub fn reader_entropy<R: Read>(mut reader: R) -> Result<f64> {
    let mut hist = Histogram::new();
    let mut buf = [0u8; 4096];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => hist.update(&buf[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(hist.entropy())
}

/// Shannon entropy of a byte slice in bits per byte; 0.0 when empty.
pub fn bytes_entropy(bytes: &[u8]) -> f64 {
    let mut hist = Histogram::new();
    hist.update(bytes);
    hist.entropy()
}

/// Entropy of the UTF-8 bytes of `s`.
pub fn str_entropy(s: &str) -> f64 {
    bytes_entropy(s.as_bytes())
}
