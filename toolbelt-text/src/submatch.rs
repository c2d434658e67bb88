//! Named capture groups read back as typed values.
//!
//! ```text
//!  "(?P<host>[^:]+):(?P<port>\d+)"   prepare(b"db:5432")
//!   get_bytes("host")   → b"db"
//!   parse::<u16>("port") → 5432
//!   parse::<u16>("user") → NoSuchKey
//! ```
//!
//! Structs opt in through [`FromSubmatch`], filling each field with
//! [`SubmatchHelper::parse_into`].  Keys the pattern does not name leave the
//! field untouched.

use chrono::{DateTime, FixedOffset};
use regex::bytes::Regex;
use rustc_hash::FxHashMap;

use crate::{Result, TextError};

/// A value parsed from the text of one capture group.
pub trait FromMatch: Sized {
    /// `None` when `text` is not a valid `Self`.
    fn from_match(text: &str, time_layout: Option<&str>) -> Option<Self>;
}

macro_rules! impl_from_str_match {
    ($($t:ty),* $(,)?) => {
        $(
            impl FromMatch for $t {
                fn from_match(text: &str, _: Option<&str>) -> Option<Self> {
                    text.parse().ok()
                }
            }
        )*
    };
}

impl_from_str_match!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64);

impl FromMatch for String {
    fn from_match(text: &str, _: Option<&str>) -> Option<Self> {
        Some(text.to_string())
    }
}

impl FromMatch for bool {
    fn from_match(text: &str, _: Option<&str>) -> Option<Self> {
        match text {
            "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
            "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
            _ => None,
        }
    }
}

/// RFC 3339 unless the helper carries a layout (chrono `strftime` syntax).
impl FromMatch for DateTime<FixedOffset> {
    fn from_match(text: &str, time_layout: Option<&str>) -> Option<Self> {
        match time_layout {
            None => DateTime::parse_from_rfc3339(text).ok(),
            Some(layout) => DateTime::parse_from_str(text, layout).ok(),
        }
    }
}

/// A struct filled from the groups of a prepared helper.
pub trait FromSubmatch {
    fn fill_from(&mut self, helper: &SubmatchHelper) -> Result<()>;
}

/// A compiled pattern, its group-name index and the groups of the last match.
#[derive(Debug, Clone)]
pub struct SubmatchHelper {
    regex: Regex,
    index_map: FxHashMap<String, usize>,
    time_layout: Option<String>,
    /// One slot per group, group 0 included.  Empty until a match.
    groups: Vec<Option<Vec<u8>>>,
}

impl SubmatchHelper {
    /// Index the named groups of `regex`.  Nothing is matched yet.
    pub fn new(regex: Regex) -> Self {
        let index_map = regex
            .capture_names()
            .enumerate()
            .filter_map(|(i, name)| name.map(|n| (n.to_string(), i)))
            .collect();
        Self {
            regex,
            index_map,
            time_layout: None,
            groups: Vec::new(),
        }
    }

    /// Compile `pattern` and index its named groups.
    pub fn from_pattern(pattern: &str) -> Result<Self> {
        Ok(Self::new(Regex::new(pattern)?))
    }

    /// Group number of a named group.
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.index_map.get(key).copied()
    }

    /// Layout used for timestamp groups, in chrono `strftime` syntax.
    pub fn set_time_layout(&mut self, layout: impl Into<String>) {
        self.time_layout = Some(layout.into());
    }

    /// Layout set by [`set_time_layout`](Self::set_time_layout), if any.
    pub fn time_layout(&self) -> Option<&str> {
        self.time_layout.as_deref()
    }

    /// Run the pattern over `haystack`, replacing the groups of any previous
    /// call.  Returns whether it matched.
    pub fn prepare(&mut self, haystack: &[u8]) -> bool {
        self.groups = match self.regex.captures(haystack) {
            Some(caps) => caps.iter().map(|m| m.map(|m| m.as_bytes().to_vec())).collect(),
            None => {
                log::debug!("pattern {} did not match", self.regex.as_str());
                Vec::new()
            }
        };
        !self.groups.is_empty()
    }

    /// Raw bytes of the named group in the last match.
    pub fn get_bytes(&self, key: &str) -> Result<&[u8]> {
        let i = self
            .index_of(key)
            .ok_or_else(|| TextError::NoSuchKey(key.to_string()))?;
        self.groups
            .get(i)
            .and_then(|g| g.as_deref())
            .ok_or_else(|| TextError::GroupNotMatched(key.to_string()))
    }

    /// Parse the named group of the last match as `T`.
    pub fn parse<T: FromMatch>(&self, key: &str) -> Result<T> {
        let text = std::str::from_utf8(self.get_bytes(key)?).map_err(|_| TextError::InvalidRune)?;
        T::from_match(text, self.time_layout()).ok_or_else(|| TextError::Unparsable {
            key: key.to_string(),
            ty: std::any::type_name::<T>(),
        })
    }

    /// Overwrite `dst` with the named group.  A key the pattern does not name
    /// leaves `dst` alone and returns `Ok(false)`.
    pub fn parse_into<T: FromMatch>(&self, key: &str, dst: &mut T) -> Result<bool> {
        match self.parse(key) {
            Ok(v) => {
                *dst = v;
                Ok(true)
            }
            Err(TextError::NoSuchKey(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Fill `dst` from the last match.
    pub fn unmarshal<T: FromSubmatch>(&self, dst: &mut T) -> Result<()> {
        dst.fill_from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RFC1123Z: &str = "%a, %d %b %Y %H:%M:%S %z";

    #[derive(Debug)]
    struct Record {
        m1: String,
        m2: i8,
        m3: i16,
        m4: DateTime<FixedOffset>,
        absent: u32,
    }

    impl FromSubmatch for Record {
        fn fill_from(&mut self, h: &SubmatchHelper) -> Result<()> {
            h.parse_into("m1", &mut self.m1)?;
            h.parse_into("m2", &mut self.m2)?;
            h.parse_into("m3", &mut self.m3)?;
            h.parse_into("m4", &mut self.m4)?;
            h.parse_into("absent", &mut self.absent)?;
            Ok(())
        }
    }

    fn epoch() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("1970-01-01T00:00:00Z").unwrap()
    }

    #[test]
    fn test_get_bytes_whole_line() {
        let mut h = SubmatchHelper::from_pattern("(?P<test>.*)").unwrap();
        assert!(h.prepare(b"shouldmatcheverything"));
        assert_eq!(h.get_bytes("test").unwrap(), b"shouldmatcheverything");
        assert_eq!(h.index_of("test"), Some(1));
    }

    #[test]
    fn test_unmarshal_struct() {
        let mut h =
            SubmatchHelper::from_pattern("((?P<m1>.*?),(?P<m2>.*?),(?P<m3>.*?),(?P<m4>.*),)").unwrap();
        h.set_time_layout(RFC1123Z);
        assert!(h.prepare(b"thisisastring,4,42,Mon, 02 Jan 2006 15:04:05 -0700,"));

        let mut r = Record {
            m1: String::new(),
            m2: 0,
            m3: 0,
            m4: epoch(),
            absent: 99,
        };
        h.unmarshal(&mut r).unwrap();
        assert_eq!(r.m1, "thisisastring");
        assert_eq!(r.m2, 4);
        assert_eq!(r.m3, 42);
        assert_eq!(r.m4.to_rfc3339(), "2006-01-02T15:04:05-07:00");
        assert_eq!(r.absent, 99);
    }

    #[test]
    fn test_unparsable_value() {
        let mut h = SubmatchHelper::from_pattern(r"(?P<n>\d+)").unwrap();
        h.prepare(b"300");
        assert_eq!(h.parse::<u16>("n").unwrap(), 300);
        let err = h.parse::<i8>("n").unwrap_err();
        assert!(matches!(err, TextError::Unparsable { ref key, ty: "i8" } if key == "n"));
    }

    #[test]
    fn test_missing_key_and_unmatched_group() {
        let mut h = SubmatchHelper::from_pattern(r"(?P<a>x)|(?P<b>y)").unwrap();
        assert!(matches!(h.get_bytes("a"), Err(TextError::GroupNotMatched(_))));

        assert!(h.prepare(b"y"));
        assert!(matches!(h.get_bytes("zzz"), Err(TextError::NoSuchKey(_))));
        assert!(matches!(h.get_bytes("a"), Err(TextError::GroupNotMatched(_))));
        assert_eq!(h.get_bytes("b").unwrap(), b"y");

        assert!(!h.prepare(b"q"));
        assert!(matches!(h.get_bytes("b"), Err(TextError::GroupNotMatched(_))));
    }

    #[test]
    fn test_bool_and_default_time_layout() {
        let mut h = SubmatchHelper::from_pattern(r"(?P<flag>\w+) (?P<at>\S+)").unwrap();
        h.prepare(b"True 2024-03-01T12:00:00Z");
        assert!(h.parse::<bool>("flag").unwrap());
        assert_eq!(
            h.parse::<DateTime<FixedOffset>>("at").unwrap().to_rfc3339(),
            "2024-03-01T12:00:00+00:00"
        );

        h.prepare(b"yes 2024-03-01");
        assert!(matches!(h.parse::<bool>("flag"), Err(TextError::Unparsable { .. })));
        assert!(matches!(
            h.parse::<DateTime<FixedOffset>>("at"),
            Err(TextError::Unparsable { .. })
        ));
    }

    #[test]
    fn test_bad_pattern() {
        assert!(matches!(SubmatchHelper::from_pattern("(?P<x>"), Err(TextError::Regex(_))));
    }
}
