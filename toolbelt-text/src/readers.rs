//! Backward reading and line iterators.
//!
//! ```text
//!  stream:                [ a b \n c d \n ]
//!  ReverseReader, 3-byte reads:   "cd\n" then "ab\n"
//!  reversed_lines:                "", "cd", "ab"
//! ```

use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};

use crate::{Result, TextError};

const CHUNK: usize = 4096;

// ───────────────────────────────────────────────────────────────────
// ReverseReader
// ───────────────────────────────────────────────────────────────────

/// Reads a seekable source from its end toward its start.
///
/// Each `read` fills the buffer with the bytes immediately before the
/// current position, in stream order, then moves the position back.
pub struct ReverseReader<R> {
    inner: R,
    size: u64,
    offset: u64,
}

impl<R: Read + Seek> ReverseReader<R> {
    /// Seeks to the end of `inner` to learn its size.
    pub fn new(mut inner: R) -> io::Result<Self> {
        let size = inner.seek(SeekFrom::End(0))?;
        Ok(Self {
            inner,
            size,
            offset: size,
        })
    }

    /// Total length of the source.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Bytes not yet read (everything before the current position).
    pub fn position(&self) -> u64 {
        self.offset
    }

    /// Decode one character backward.  `Ok(None)` at the start of the stream.
    ///
    /// On an invalid sequence one byte is consumed and `InvalidRune` returned,
    /// so the caller can keep going.
    pub fn read_rune(&mut self) -> Result<Option<char>> {
        let mut bytes = [0u8; 4];
        let n = self.read(&mut bytes)?;
        if n == 0 {
            return Ok(None);
        }
        let start = bytes[..n]
            .iter()
            .rposition(|b| b & 0xc0 != 0x80)
            .unwrap_or(n - 1);
        match std::str::from_utf8(&bytes[start..n]).ok().and_then(|s| s.chars().next()) {
            Some(c) => {
                self.offset += start as u64;
                Ok(Some(c))
            }
            None => {
                self.offset += (n - 1) as u64;
                Err(TextError::InvalidRune)
            }
        }
    }

    /// Give back the source.  Its position is unspecified.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> Read for ReverseReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = usize::try_from(self.offset).map_or(buf.len(), |o| o.min(buf.len()));
        if n == 0 {
            return Ok(0);
        }
        let start = self.offset - n as u64;
        self.inner.seek(SeekFrom::Start(start))?;
        self.inner.read_exact(&mut buf[..n])?;
        self.offset = start;
        Ok(n)
    }
}

// ───────────────────────────────────────────────────────────────────
// Line iterators
// ───────────────────────────────────────────────────────────────────

/// Lines of a seekable source, last line first, without their `\n`.
///
/// Input ending in `\n` yields an empty line first; empty input yields a
/// single empty line.
pub fn reversed_lines<R: Read + Seek>(reader: R) -> Result<ReversedLines<R>> {
    Ok(ReversedLines {
        rr: ReverseReader::new(reader)?,
        tail: Vec::new(),
        done: false,
    })
}

/// Iterator returned by [`reversed_lines`].
pub struct ReversedLines<R> {
    rr: ReverseReader<R>,
    /// Unconsumed bytes, in stream order, ending where the last line began.
    tail: Vec<u8>,
    done: bool,
}

impl<R: Read + Seek> Iterator for ReversedLines<R> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            if let Some(pos) = self.tail.iter().rposition(|b| *b == b'\n') {
                let line = self.tail.split_off(pos + 1);
                self.tail.truncate(pos);
                return Some(Ok(line));
            }
            if self.rr.position() == 0 {
                self.done = true;
                return Some(Ok(std::mem::take(&mut self.tail)));
            }
            let mut chunk = vec![0u8; CHUNK];
            match self.rr.read(&mut chunk) {
                Ok(n) => {
                    chunk.truncate(n);
                    chunk.extend_from_slice(&self.tail);
                    self.tail = chunk;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            }
        }
    }
}

/// Lines of `reader` in order, with `\n` or `\r\n` stripped.
pub fn lines<R: Read>(reader: R) -> impl Iterator<Item = Result<Vec<u8>>> {
    BufReader::new(reader).split(b'\n').map(|line| -> Result<Vec<u8>> {
        let mut line = line?;
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Ok(line)
    })
}

/// Lines of a little-endian UTF-16 stream.
///
/// A leading BOM is skipped and trailing `\r` / `\n` are trimmed.  A final
/// line without a newline is yielded if non-empty; an odd trailing byte is
/// ignored.
pub fn utf16_lines<R: Read>(reader: R) -> Utf16Lines<R> {
    Utf16Lines {
        reader: BufReader::new(reader),
        first: true,
        done: false,
    }
}

/// Iterator returned by [`utf16_lines`].
pub struct Utf16Lines<R> {
    reader: BufReader<R>,
    first: bool,
    done: bool,
}

impl<R: Read> Utf16Lines<R> {
    fn read_unit(&mut self) -> io::Result<Option<u16>> {
        let mut unit = [0u8; 2];
        match self.reader.read_exact(&mut unit) {
            Ok(()) => Ok(Some(u16::from_le_bytes(unit))),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn finish(units: &[u16]) -> Result<String> {
        let mut line = String::from_utf16(units).map_err(|_| TextError::InvalidRune)?;
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(line)
    }
}

impl<R: Read> Iterator for Utf16Lines<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut units = Vec::new();
        loop {
            match self.read_unit() {
                Ok(Some(0xfeff)) if self.first => {
                    self.first = false;
                }
                Ok(Some(u)) => {
                    self.first = false;
                    if u == u16::from(b'\n') {
                        return Some(Self::finish(&units));
                    }
                    units.push(u);
                }
                Ok(None) => {
                    self.done = true;
                    return (!units.is_empty()).then(|| Self::finish(&units));
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TEXT: &str = "This is a text containing\n\tlines that should be\n\tprinted in reversed\n\torder.";

    fn utf16le(s: &str, bom: bool) -> Vec<u8> {
        let mut out = Vec::new();
        if bom {
            out.extend_from_slice(&0xfeffu16.to_le_bytes());
        }
        for u in s.encode_utf16() {
            out.extend_from_slice(&u.to_le_bytes());
        }
        out
    }

    #[test]
    fn test_reverse_reader_chunks() {
        let mut rr = ReverseReader::new(Cursor::new(b"abcdefg".to_vec())).unwrap();
        let mut buf = [0u8; 3];
        let mut chunks = Vec::new();
        loop {
            let n = rr.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            chunks.push(buf[..n].to_vec());
        }
        assert_eq!(chunks, vec![b"efg".to_vec(), b"bcd".to_vec(), b"a".to_vec()]);
        assert_eq!(rr.position(), 0);
        assert_eq!(rr.size(), 7);
    }

    #[test]
    fn test_reverse_read_rune() {
        let mut rr = ReverseReader::new(Cursor::new("aé☃b".as_bytes())).unwrap();
        let mut got = Vec::new();
        while let Some(c) = rr.read_rune().unwrap() {
            got.push(c);
        }
        assert_eq!(got, ['b', '☃', 'é', 'a']);
    }

    #[test]
    fn test_reverse_read_rune_invalid() {
        let mut rr = ReverseReader::new(Cursor::new(&b"a\x80"[..])).unwrap();
        assert!(matches!(rr.read_rune(), Err(TextError::InvalidRune)));
        assert_eq!(rr.read_rune().unwrap(), Some('a'));
        assert_eq!(rr.read_rune().unwrap(), None);
    }

    #[test]
    fn test_reversed_lines() {
        let got: Vec<Vec<u8>> = reversed_lines(Cursor::new(TEXT))
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        let mut expected: Vec<&[u8]> = TEXT.as_bytes().split(|b| *b == b'\n').collect();
        expected.reverse();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_reversed_lines_trailing_newline_and_empty() {
        let got: Vec<Vec<u8>> = reversed_lines(Cursor::new("a\nb\n"))
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(got, vec![b"".to_vec(), b"b".to_vec(), b"a".to_vec()]);

        let empty: Vec<Vec<u8>> = reversed_lines(Cursor::new(""))
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(empty, vec![Vec::<u8>::new()]);
    }

    #[test]
    fn test_reversed_lines_spanning_chunks() {
        let long = "x".repeat(CHUNK * 2 + 17);
        let text = format!("first\n{long}\nlast");
        let got: Vec<Vec<u8>> = reversed_lines(Cursor::new(text))
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(got.len(), 3);
        assert_eq!(got[0], b"last");
        assert_eq!(got[1], long.as_bytes());
        assert_eq!(got[2], b"first");
    }

    #[test]
    fn test_lines_strip_crlf() {
        let got: Vec<Vec<u8>> = lines("one\r\ntwo\nthree".as_bytes())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(got, vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]);
    }

    #[test]
    fn test_utf16_lines() {
        let data = utf16le("first line\r\nsecond\nthird", true);
        let got: Vec<String> = utf16_lines(data.as_slice())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(got, ["first line", "second", "third"]);
    }

    #[test]
    fn test_utf16_lines_no_bom() {
        let data = utf16le("ÿes\n", false);
        let got: Vec<String> = utf16_lines(data.as_slice())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(got, ["ÿes"]);
    }
}
