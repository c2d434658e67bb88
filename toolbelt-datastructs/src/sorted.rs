//! Slice kept in descending order; the smallest value sits at the tail.
//!
//! Insertion finds its position with a halving search and shifts the tail
//! right by one.  Appending at the tail (the common case for values arriving
//! in decreasing order) is O(1).

use std::fmt;
use std::iter::Rev;
use std::slice;
use std::time::SystemTime;

/// Strict "less than" used to order a [`SortedSlice`].
pub trait Sortable {
    fn less(&self, other: &Self) -> bool;
}

macro_rules! impl_sortable {
    ($($t:ty),* $(,)?) => {
        $(
            impl Sortable for $t {
                #[inline]
                fn less(&self, other: &Self) -> bool {
                    self < other
                }
            }
        )*
    };
}

impl_sortable!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, char, String,
    SystemTime,
);

/// Values kept in descending order, duplicates allowed.
#[derive(Clone, Debug, PartialEq)]
pub struct SortedSlice<T> {
    s: Vec<T>,
}

impl<T> Default for SortedSlice<T> {
    fn default() -> Self {
        Self { s: Vec::new() }
    }
}

impl<T: Sortable> SortedSlice<T> {
    /// Empty slice.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty slice with room for `capacity` values.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            s: Vec::with_capacity(capacity),
        }
    }

    /// Insert `e`, keeping the slice in descending order.
    ///
    /// Equal values end up adjacent; a new value goes after the existing
    /// values it equals.
    pub fn insert(&mut self, e: T) {
        let n = self.s.len();
        if n == 0 || !self.s[n - 1].less(&e) {
            self.s.push(e);
        } else if n == 1 {
            // s[0] < e
            self.s.insert(0, e);
        } else {
            let i = self.search_less_than(&e, 0, n - 1);
            self.s.insert(i, e);
        }
    }

    /// Index of the first element strictly less than `e` within `[i, j]`.
    ///
    /// Requires `s[j] < e`.  The window halves around
    /// `pivot = i + (j + 1 - i) / 2` until it holds two elements.
    fn search_less_than(&self, e: &T, mut i: usize, mut j: usize) -> usize {
        loop {
            if j - i <= 1 {
                return if self.s[i].less(e) { i } else { j };
            }
            let pivot = i + (j + 1 - i) / 2;
            if self.s[pivot].less(e) {
                j = pivot;
            } else {
                i = pivot;
            }
        }
    }

    /// Inclusive index range of the elements strictly less than `e`.
    pub fn range_less_than(&self, e: &T) -> Option<(usize, usize)> {
        let n = self.s.len();
        if n == 0 || !self.s[n - 1].less(e) {
            return None;
        }
        Some((self.search_less_than(e, 0, n - 1), n - 1))
    }

    /// Every adjacent pair satisfies `!later_is_greater`, i.e. the slice is
    /// in descending order.
    pub fn control(&self) -> bool {
        self.s.windows(2).all(|w| !w[0].less(&w[1]))
    }
}

impl<T> SortedSlice<T> {
    /// Inclusive sub-range `[start, stop]`, defaulting to the whole slice.
    ///
    /// Out-of-range or inverted bounds yield an empty iterator.
    pub fn iter_range(&self, start: Option<usize>, stop: Option<usize>) -> slice::Iter<'_, T> {
        match self.bounds(start, stop) {
            Some((i, j)) => self.s[i..=j].iter(),
            None => self.s[..0].iter(),
        }
    }

    /// Like [`iter_range`](Self::iter_range) but walking from the tail:
    /// positions are counted from the smallest element.
    pub fn reversed_iter_range(
        &self,
        start: Option<usize>,
        stop: Option<usize>,
    ) -> Rev<slice::Iter<'_, T>> {
        let n = self.s.len();
        match self.bounds(start, stop) {
            Some((i, j)) => self.s[n - 1 - j..=n - 1 - i].iter().rev(),
            None => self.s[..0].iter().rev(),
        }
    }

    /// Largest first.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.s.iter()
    }

    /// Smallest first.
    pub fn reversed_iter(&self) -> Rev<slice::Iter<'_, T>> {
        self.s.iter().rev()
    }

    fn bounds(&self, start: Option<usize>, stop: Option<usize>) -> Option<(usize, usize)> {
        let n = self.s.len();
        if n == 0 {
            return None;
        }
        let i = start.unwrap_or(0);
        let j = stop.unwrap_or(n - 1);
        (i < n && j < n && i <= j).then_some((i, j))
    }

    /// The values, largest first.
    pub fn as_slice(&self) -> &[T] {
        &self.s
    }

    pub fn into_vec(self) -> Vec<T> {
        self.s
    }

    /// Number of values stored.
    pub fn len(&self) -> usize {
        self.s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.s.is_empty()
    }
}

impl<T: fmt::Display> fmt::Display for SortedSlice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.s.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, "]")
    }
}

impl<T: Sortable> FromIterator<T> for SortedSlice<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut s = SortedSlice::new();
        for e in iter {
            s.insert(e);
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use std::time::Duration;

    const INTS: [i32; 14] = [10, 13, 1, 2, 12, 99, 100, 102, 103, 103, 100, 1100, -2, -4];

    #[test]
    fn test_insert_keeps_control() {
        let mut s = SortedSlice::new();
        for i in INTS {
            s.insert(i);
            assert!(s.control(), "control failed after inserting {i}: {s}");
        }
        assert_eq!(
            s.as_slice(),
            &[1100, 103, 103, 102, 100, 100, 99, 13, 12, 10, 2, 1, -2, -4]
        );
    }

    #[test]
    fn test_insert_random() {
        let mut rng = rand::thread_rng();
        let mut s = SortedSlice::with_capacity(1000);
        for _ in 0..1000 {
            s.insert(rng.gen::<i64>());
        }
        assert!(s.control());
        assert_eq!(s.len(), 1000);
    }

    #[test]
    fn test_previously_failing_sequence() {
        let s: SortedSlice<i32> = [937, 821, 551, 410, 51, 320].into_iter().collect();
        assert_eq!(s.as_slice(), &[937, 821, 551, 410, 320, 51]);
    }

    #[test]
    fn test_times() {
        let mut rng = rand::thread_rng();
        let now = SystemTime::now();
        let mut s = SortedSlice::new();
        for _ in 0..50 {
            let offset = Duration::from_secs(60 * rng.gen_range(0..60) + rng.gen_range(0..60));
            s.insert(now + offset);
        }
        assert!(s.control());
        let oldest_first: Vec<&SystemTime> = s.reversed_iter().collect();
        assert!(oldest_first.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_range_less_than() {
        let s: SortedSlice<i32> = INTS.into_iter().collect();
        assert_eq!(s.range_less_than(&0), Some((12, 13)));
        assert_eq!(s.range_less_than(&-4), None);
        assert_eq!(s.range_less_than(&5000), Some((0, 13)));

        let single: SortedSlice<i32> = [3].into_iter().collect();
        assert_eq!(single.range_less_than(&4), Some((0, 0)));
        assert_eq!(SortedSlice::<i32>::new().range_less_than(&4), None);
    }

    #[test]
    fn test_iter_ranges() {
        let s: SortedSlice<i32> = INTS.into_iter().collect();
        let head: Vec<i32> = s.iter_range(Some(0), Some(3)).copied().collect();
        assert_eq!(head, vec![1100, 103, 103, 102]);

        let tail: Vec<i32> = s.reversed_iter_range(Some(0), Some(3)).copied().collect();
        assert_eq!(tail, vec![-4, -2, 1, 2]);

        assert_eq!(s.iter_range(None, None).count(), INTS.len());
        assert_eq!(s.reversed_iter_range(Some(13), None).count(), 1);
    }

    #[test]
    fn test_iter_invalid_bounds_are_empty() {
        let s: SortedSlice<i32> = INTS.into_iter().collect();
        assert_eq!(s.iter_range(Some(4), Some(2)).count(), 0);
        assert_eq!(s.iter_range(Some(0), Some(14)).count(), 0);
        assert_eq!(s.iter_range(Some(14), None).count(), 0);
        assert_eq!(s.reversed_iter_range(Some(3), Some(1)).count(), 0);
        assert_eq!(SortedSlice::<i32>::new().iter_range(None, None).count(), 0);
    }

    #[test]
    fn test_control_detects_disorder() {
        let s = SortedSlice { s: vec![3, 1, 2] };
        assert!(!s.control());
        assert!(SortedSlice::<u8>::new().control());
    }

    #[test]
    fn test_display() {
        let s: SortedSlice<u8> = [1, 3, 2].into_iter().collect();
        assert_eq!(s.to_string(), "[3 2 1]");
    }
}
