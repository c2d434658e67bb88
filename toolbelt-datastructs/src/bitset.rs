//! Fixed-size bit array.
//!
//! ```text
//!  BitSet::new(10): 2 bytes, bits 0..10 addressable
//!  set(3), set(9)  →  [0b0000_1000, 0b0000_0010]
//! ```

/// Fixed-size bit array packed into bytes.
///
/// Offsets at or beyond `len()` are ignored by setters and read as unset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitSet {
    size: usize,
    set: Vec<u8>,
}

impl BitSet {
    /// All `size` bits start unset.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            set: vec![0; size.div_ceil(8)],
        }
    }

    #[inline]
    fn locate(o: usize) -> (usize, u8) {
        (o / 8, 1 << (o % 8))
    }

    /// Set the bit at `o`.  Returns `false` if `o` is out of range.
    pub fn set(&mut self, o: usize) -> bool {
        if o >= self.size {
            return false;
        }
        let (bucket, mask) = Self::locate(o);
        self.set[bucket] |= mask;
        true
    }

    /// Clear the bit at `o`.  Returns `false` if `o` is out of range.
    pub fn unset(&mut self, o: usize) -> bool {
        if o >= self.size {
            return false;
        }
        let (bucket, mask) = Self::locate(o);
        self.set[bucket] &= !mask;
        true
    }

    /// Whether the bit at `o` is set.
    pub fn get(&self, o: usize) -> bool {
        if o >= self.size {
            return false;
        }
        let (bucket, mask) = Self::locate(o);
        self.set[bucket] & mask != 0
    }

    /// Clear every bit.
    pub fn reset(&mut self) {
        self.set.fill(0);
    }

    /// Number of addressable bits.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of bits currently set.
    pub fn count_ones(&self) -> usize {
        self.set.iter().map(|b| b.count_ones() as usize).sum()
    }
}
