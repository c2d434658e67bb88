//! Byte n-grams over a stream.
//!
//! [`NgramGenerator`] keeps the window in memory and reads the stream once
//! in `buffer_size` chunks.  [`FastGenerator`] reads each window straight
//! from the source and seeks back `n - 1` bytes between steps, which avoids
//! the per-window copy when the caller only inspects the current window.

use std::io::{self, Read, Seek, SeekFrom};

use serde::{Deserialize, Serialize};

use crate::{Result, TextError};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a 64-bit digest of `bytes`.
pub fn fnv1a64(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(FNV_OFFSET, |h, b| (h ^ u64::from(*b)).wrapping_mul(FNV_PRIME))
}

/// Owned copy of one window.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Ngram(Vec<u8>);

impl Ngram {
    /// Copy `bytes` into a new window.
    pub fn new(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }

    /// FNV-1a 64 of the window bytes.
    pub fn hash(&self) -> u64 {
        fnv1a64(&self.0)
    }

    /// The window bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Window width in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for Ngram {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Window and read sizes for [`NgramGenerator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NgramConfig {
    /// Window width in bytes.
    pub size: usize,
    /// Bytes requested per read.
    pub buffer_size: usize,
}

impl Default for NgramConfig {
    fn default() -> Self {
        Self {
            size: 3,
            buffer_size: 4096,
        }
    }
}

/// Read until `buf` is full or the stream ends.  Returns bytes read.
fn fill<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut read = 0;
    while read < buf.len() {
        match reader.read(&mut buf[read..]) {
            Ok(0) => break,
            Ok(n) => read += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(read)
}

// ───────────────────────────────────────────────────────────────────
// NgramGenerator
// ───────────────────────────────────────────────────────────────────

/// Iterator over every window of `size` consecutive bytes.
///
/// A stream shorter than the window yields nothing.  A read error is
/// yielded once and ends the iteration.
pub struct NgramGenerator<R> {
    reader: R,
    window: Vec<u8>,
    buf: Vec<u8>,
    pos: usize,
    filled: usize,
    started: bool,
    done: bool,
}

impl<R: Read> NgramGenerator<R> {
    /// Windows of `size` bytes with the default read buffer.
    pub fn new(reader: R, size: usize) -> Result<Self> {
        Self::with_config(
            reader,
            NgramConfig {
                size,
                ..NgramConfig::default()
            },
        )
    }

    /// Size 0 is [`TextError::BadNgramSize`].
    pub fn with_config(reader: R, config: NgramConfig) -> Result<Self> {
        if config.size == 0 {
            return Err(TextError::BadNgramSize);
        }
        Ok(Self {
            reader,
            window: vec![0; config.size],
            buf: vec![0; config.buffer_size.max(1)],
            pos: 0,
            filled: 0,
            started: false,
            done: false,
        })
    }

    fn fail(&mut self, e: io::Error) -> Option<Result<Ngram>> {
        self.done = true;
        Some(Err(TextError::Io(e)))
    }
}

impl<R: Read> Iterator for NgramGenerator<R> {
    type Item = Result<Ngram>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if !self.started {
            self.started = true;
            return match fill(&mut self.reader, &mut self.window) {
                Ok(n) if n == self.window.len() => Some(Ok(Ngram::new(&self.window))),
                Ok(_) => {
                    self.done = true;
                    None
                }
                Err(e) => self.fail(e),
            };
        }

        if self.pos == self.filled {
            match self.reader.read(&mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(n) => {
                    self.pos = 0;
                    self.filled = n;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => return self.next(),
                Err(e) => return self.fail(e),
            }
        }

        self.window.rotate_left(1);
        let last = self.window.len() - 1;
        self.window[last] = self.buf[self.pos];
        self.pos += 1;
        Some(Ok(Ngram::new(&self.window)))
    }
}

// ───────────────────────────────────────────────────────────────────
// FastGenerator
// ───────────────────────────────────────────────────────────────────

/// Cursor over windows of a seekable source.
///
/// ```ignore
/// let mut g = FastGenerator::new(file, 3)?;
/// while g.advance()? {
///     let w = g.ngram();
/// }
/// ```
pub struct FastGenerator<R> {
    reader: R,
    ngram: Vec<u8>,
    init: bool,
    done: bool,
}

impl<R: Read + Seek> FastGenerator<R> {
    /// Cursor before the first window.  Size 0 is [`TextError::BadNgramSize`].
    pub fn new(reader: R, size: usize) -> Result<Self> {
        if size == 0 {
            return Err(TextError::BadNgramSize);
        }
        Ok(Self {
            reader,
            ngram: vec![0; size],
            init: true,
            done: false,
        })
    }

    /// Move to the next window.  `Ok(false)` once fewer than `size` bytes remain.
    pub fn advance(&mut self) -> Result<bool> {
        if self.done {
            return Ok(false);
        }
        if self.init {
            self.init = false;
        } else {
            let back = i64::try_from(self.ngram.len() - 1).map_err(|_| TextError::BadNgramSize)?;
            self.reader.seek(SeekFrom::Current(-back))?;
        }
        let n = fill(&mut self.reader, &mut self.ngram)?;
        self.done = n < self.ngram.len();
        Ok(!self.done)
    }

    /// Current window; only meaningful after `advance` returned `true`.
    pub fn ngram(&self) -> &[u8] {
        &self.ngram
    }

    /// Give back the reader, positioned after the current window.
    pub fn into_inner(self) -> R {
        self.reader
    }
}
