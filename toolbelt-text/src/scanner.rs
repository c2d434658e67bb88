//! Word scanner with a configurable whitespace table.
//!
//! ```text
//!  "a:bc::d"  whitespace = ":"
//!   scan() → Word('a')        token_text() = "a"
//!   scan() → Whitespace(':')
//!   scan() → Word('c')        token_text() = "bc"
//!   scan() → Whitespace(':')
//!   scan() → Whitespace(':')
//!   scan() → Word('d')        token_text() = "d"
//!   scan() → Eof
//! ```
//!
//! Only characters below U+0100 can be whitespace.  A decode or I/O error is
//! logged, kept in [`Scanner::error`] and ends the scan.

use std::io::BufRead;

use serde::{Deserialize, Serialize};
use toolbelt_datastructs::BitSet;

use crate::{Result, TextError};

/// Construction parameters for [`Scanner`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Characters treated as separators.
    pub whitespace: String,
    /// Longest word accepted, in characters.
    pub max_token_len: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            whitespace: "\t\n\r ".to_string(),
            max_token_len: 1 << 20,
        }
    }
}

/// What one call to [`Scanner::scan`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// A single separator character.
    Whitespace(char),
    /// A word ended; carries its last character.
    Word(char),
    Eof,
}

/// Splits a UTF-8 stream into words and separators.
pub struct Scanner<R> {
    reader: R,
    whitespace: BitSet,
    max_token_len: usize,
    token: String,
    /// Separator read past the end of a word, returned by the next scan.
    pending: Option<char>,
    offset: u64,
    error: Option<TextError>,
}

impl<R: BufRead> Scanner<R> {
    /// Scanner with the default whitespace (tab, newline, carriage return, space).
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, &ScannerConfig::default())
    }

    /// Scanner with the whitespace and token limit of `config`.
    pub fn with_config(reader: R, config: &ScannerConfig) -> Self {
        let mut s = Self {
            reader,
            whitespace: BitSet::new(256),
            max_token_len: config.max_token_len,
            token: String::new(),
            pending: None,
            offset: 0,
            error: None,
        };
        s.add_whitespace(&config.whitespace);
        s
    }

    /// Mark every character of `w` as whitespace, keeping the current ones.
    pub fn add_whitespace(&mut self, w: &str) {
        for c in w.chars() {
            self.whitespace.set(c as usize);
        }
    }

    /// Replace the whitespace table with the characters of `w`.
    pub fn set_whitespace(&mut self, w: &str) {
        self.whitespace.reset();
        self.add_whitespace(w);
    }

    /// Whether `c` is in the whitespace table.
    pub fn is_whitespace(&self, c: char) -> bool {
        self.whitespace.get(c as usize)
    }

    /// Read the next token.
    ///
    /// A word at the very end of the input is returned as `Word` before `Eof`.
    pub fn scan(&mut self) -> Token {
        if self.error.is_some() {
            return Token::Eof;
        }
        self.token.clear();
        let mut count = 0usize;
        let mut last = None;
        loop {
            match self.read_char() {
                Ok(Some(c)) if self.is_whitespace(c) => {
                    return match last {
                        None => Token::Whitespace(c),
                        Some(l) => {
                            self.unread(c);
                            Token::Word(l)
                        }
                    };
                }
                Ok(Some(c)) => {
                    if count == self.max_token_len {
                        return self.fail(TextError::TokenTooLong(self.max_token_len));
                    }
                    self.token.push(c);
                    count += 1;
                    last = Some(c);
                }
                Ok(None) => return last.map_or(Token::Eof, Token::Word),
                Err(e) => return self.fail(e),
            }
        }
    }

    /// Skip separators and return the next word's text.
    pub fn next_word(&mut self) -> Option<String> {
        loop {
            match self.scan() {
                Token::Word(_) => return Some(self.token.clone()),
                Token::Whitespace(_) => continue,
                Token::Eof => return None,
            }
        }
    }

    /// Characters of the last word scanned.
    pub fn token_text(&self) -> &str {
        &self.token
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Error that ended the scan, if any.
    pub fn error(&self) -> Option<&TextError> {
        self.error.as_ref()
    }

    /// Take the stored error.  Scanning stays ended.
    pub fn take_error(&mut self) -> Option<TextError> {
        self.error.take()
    }

    fn fail(&mut self, e: TextError) -> Token {
        log::warn!("Scanner error at offset {}: {}", self.offset, e);
        self.error = Some(e);
        Token::Eof
    }

    fn unread(&mut self, c: char) {
        self.offset -= c.len_utf8() as u64;
        self.pending = Some(c);
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        let buf = self.reader.fill_buf()?;
        let Some(&b) = buf.first() else {
            return Ok(None);
        };
        self.reader.consume(1);
        self.offset += 1;
        Ok(Some(b))
    }

    fn read_char(&mut self) -> Result<Option<char>> {
        if let Some(c) = self.pending.take() {
            self.offset += c.len_utf8() as u64;
            return Ok(Some(c));
        }
        let Some(first) = self.read_byte()? else {
            return Ok(None);
        };
        let width = utf8_width(first);
        if width == 0 {
            return Err(TextError::InvalidRune);
        }
        let mut bytes = [first, 0, 0, 0];
        for slot in bytes.iter_mut().take(width).skip(1) {
            *slot = self.read_byte()?.ok_or(TextError::InvalidRune)?;
        }
        std::str::from_utf8(&bytes[..width])
            .ok()
            .and_then(|s| s.chars().next())
            .ok_or(TextError::InvalidRune)
            .map(Some)
    }
}

/// Encoded length implied by a UTF-8 lead byte, 0 if it cannot start a char.
fn utf8_width(lead: u8) -> usize {
    match lead {
        0x00..=0x7f => 1,
        0xc2..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf4 => 4,
        _ => 0,
    }
}
