//! Encoding traits and the built-in implementations.
//!
//! Decoding is in place: the destination's current shape (array length,
//! `Some` vs `None`) is part of the contract, while growable sequences are
//! rebuilt from the decoded count.

use std::collections::{BTreeMap, HashMap};
use std::io::{self, Read};

use crate::{ByteOrder, EncodingError, Result};

/// Largest decoded count accepted for sequences of zero-sized elements,
/// which consume no input per element.
pub const MAX_ZERO_SIZED_COUNT: usize = 1 << 20;

/// Append the binary form of `self` to a buffer.
pub trait Marshal {
    fn marshal_into(&self, out: &mut Vec<u8>, order: ByteOrder) -> Result<()>;
}

/// Overwrite `self` with a value decoded from a reader.
pub trait Unmarshal {
    fn unmarshal_from<R: Read + ?Sized>(&mut self, reader: &mut R, order: ByteOrder) -> Result<()>;
}

/// `read_exact` with end-of-stream reported as [`EncodingError::ShortRead`].
pub(crate) fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => EncodingError::ShortRead,
        _ => EncodingError::Io(e),
    })
}

// ───────────────────────────────────────────────────────────────────
// Scalars
// ───────────────────────────────────────────────────────────────────

macro_rules! impl_scalar {
    ($($t:ty),* $(,)?) => {
        $(
            impl Marshal for $t {
                #[inline]
                fn marshal_into(&self, out: &mut Vec<u8>, order: ByteOrder) -> Result<()> {
                    match order {
                        ByteOrder::LittleEndian => out.extend_from_slice(&self.to_le_bytes()),
                        ByteOrder::BigEndian => out.extend_from_slice(&self.to_be_bytes()),
                    }
                    Ok(())
                }
            }

            impl Unmarshal for $t {
                #[inline]
                fn unmarshal_from<R: Read + ?Sized>(
                    &mut self,
                    reader: &mut R,
                    order: ByteOrder,
                ) -> Result<()> {
                    let mut buf = [0u8; std::mem::size_of::<$t>()];
                    read_full(reader, &mut buf)?;
                    *self = match order {
                        ByteOrder::LittleEndian => <$t>::from_le_bytes(buf),
                        ByteOrder::BigEndian => <$t>::from_be_bytes(buf),
                    };
                    Ok(())
                }
            }
        )*
    };
}

impl_scalar!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128, f32, f64);

impl Marshal for bool {
    fn marshal_into(&self, out: &mut Vec<u8>, _order: ByteOrder) -> Result<()> {
        out.push(u8::from(*self));
        Ok(())
    }
}

impl Unmarshal for bool {
    fn unmarshal_from<R: Read + ?Sized>(&mut self, reader: &mut R, _order: ByteOrder) -> Result<()> {
        let mut buf = [0u8; 1];
        read_full(reader, &mut buf)?;
        *self = buf[0] != 0;
        Ok(())
    }
}

// Width differs between platforms, so the wire size would not be fixed.
macro_rules! impl_unsupported {
    ($name:literal => $($t:ty),*) => {
        $(
            impl Marshal for $t {
                fn marshal_into(&self, _out: &mut Vec<u8>, _order: ByteOrder) -> Result<()> {
                    Err(EncodingError::UnsupportedKind($name))
                }
            }

            impl Unmarshal for $t {
                fn unmarshal_from<R: Read + ?Sized>(
                    &mut self,
                    _reader: &mut R,
                    _order: ByteOrder,
                ) -> Result<()> {
                    Err(EncodingError::UnsupportedKind($name))
                }
            }
        )*
    };
}

impl_unsupported!("usize" => usize);
impl_unsupported!("isize" => isize);

impl<K, V, S> Marshal for HashMap<K, V, S> {
    fn marshal_into(&self, _out: &mut Vec<u8>, _order: ByteOrder) -> Result<()> {
        Err(EncodingError::UnsupportedKind("map"))
    }
}

impl<K, V, S> Unmarshal for HashMap<K, V, S> {
    fn unmarshal_from<R: Read + ?Sized>(&mut self, _reader: &mut R, _order: ByteOrder) -> Result<()> {
        Err(EncodingError::UnsupportedKind("map"))
    }
}

impl<K, V> Marshal for BTreeMap<K, V> {
    fn marshal_into(&self, _out: &mut Vec<u8>, _order: ByteOrder) -> Result<()> {
        Err(EncodingError::UnsupportedKind("map"))
    }
}

impl<K, V> Unmarshal for BTreeMap<K, V> {
    fn unmarshal_from<R: Read + ?Sized>(&mut self, _reader: &mut R, _order: ByteOrder) -> Result<()> {
        Err(EncodingError::UnsupportedKind("map"))
    }
}

// ───────────────────────────────────────────────────────────────────
// Fixed arrays and sequences
// ───────────────────────────────────────────────────────────────────

impl<T: Marshal, const N: usize> Marshal for [T; N] {
    fn marshal_into(&self, out: &mut Vec<u8>, order: ByteOrder) -> Result<()> {
        self.iter().try_for_each(|e| e.marshal_into(out, order))
    }
}

impl<T: Unmarshal, const N: usize> Unmarshal for [T; N] {
    fn unmarshal_from<R: Read + ?Sized>(&mut self, reader: &mut R, order: ByteOrder) -> Result<()> {
        self.iter_mut().try_for_each(|e| e.unmarshal_from(reader, order))
    }
}

fn marshal_len(len: usize, out: &mut Vec<u8>, order: ByteOrder) -> Result<()> {
    let count = i64::try_from(len).map_err(|_| EncodingError::UnsupportedKind("oversized sequence"))?;
    count.marshal_into(out, order)
}

fn unmarshal_len<R: Read + ?Sized>(reader: &mut R, order: ByteOrder) -> Result<usize> {
    let mut count = 0i64;
    count.unmarshal_from(reader, order)?;
    usize::try_from(count).map_err(|_| EncodingError::InvalidLength(count))
}

impl<T: Marshal> Marshal for [T] {
    fn marshal_into(&self, out: &mut Vec<u8>, order: ByteOrder) -> Result<()> {
        marshal_len(self.len(), out, order)?;
        self.iter().try_for_each(|e| e.marshal_into(out, order))
    }
}

impl<T: Marshal> Marshal for Vec<T> {
    fn marshal_into(&self, out: &mut Vec<u8>, order: ByteOrder) -> Result<()> {
        self.as_slice().marshal_into(out, order)
    }
}

impl<T: Unmarshal + Default> Unmarshal for Vec<T> {
    /// Replaces the destination with a fresh sequence of the decoded count.
    fn unmarshal_from<R: Read + ?Sized>(&mut self, reader: &mut R, order: ByteOrder) -> Result<()> {
        let count = unmarshal_len(reader, order)?;
        if std::mem::size_of::<T>() == 0 && count > MAX_ZERO_SIZED_COUNT {
            log::warn!("rejecting sequence of {count} zero-sized elements");
            return Err(EncodingError::InvalidLength(count as i64));
        }
        log::debug!("decoding sequence of {count} elements");
        // Grow as elements arrive; the count is untrusted input.
        let mut fresh = Vec::new();
        for _ in 0..count {
            let mut e = T::default();
            e.unmarshal_from(reader, order)?;
            fresh.push(e);
        }
        *self = fresh;
        Ok(())
    }
}

impl Marshal for str {
    fn marshal_into(&self, out: &mut Vec<u8>, order: ByteOrder) -> Result<()> {
        self.as_bytes().marshal_into(out, order)
    }
}

impl Marshal for String {
    fn marshal_into(&self, out: &mut Vec<u8>, order: ByteOrder) -> Result<()> {
        self.as_str().marshal_into(out, order)
    }
}

impl Unmarshal for String {
    fn unmarshal_from<R: Read + ?Sized>(&mut self, reader: &mut R, order: ByteOrder) -> Result<()> {
        let mut bytes: Vec<u8> = Vec::new();
        bytes.unmarshal_from(reader, order)?;
        *self = String::from_utf8(bytes).map_err(|_| EncodingError::InvalidUtf8)?;
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────────
// Indirection
// ───────────────────────────────────────────────────────────────────

impl<T: Marshal + ?Sized> Marshal for &T {
    fn marshal_into(&self, out: &mut Vec<u8>, order: ByteOrder) -> Result<()> {
        (**self).marshal_into(out, order)
    }
}

impl<T: Marshal + ?Sized> Marshal for Box<T> {
    fn marshal_into(&self, out: &mut Vec<u8>, order: ByteOrder) -> Result<()> {
        (**self).marshal_into(out, order)
    }
}

impl<T: Unmarshal + ?Sized> Unmarshal for Box<T> {
    fn unmarshal_from<R: Read + ?Sized>(&mut self, reader: &mut R, order: ByteOrder) -> Result<()> {
        (**self).unmarshal_from(reader, order)
    }
}

/// `Option` behaves as a nullable pointer: `None` cannot be encoded and
/// cannot receive a decoded value.
impl<T: Marshal> Marshal for Option<T> {
    fn marshal_into(&self, out: &mut Vec<u8>, order: ByteOrder) -> Result<()> {
        match self {
            Some(v) => v.marshal_into(out, order),
            None => Err(EncodingError::NilPointer),
        }
    }
}

impl<T: Unmarshal> Unmarshal for Option<T> {
    fn unmarshal_from<R: Read + ?Sized>(&mut self, reader: &mut R, order: ByteOrder) -> Result<()> {
        match self {
            Some(v) => v.unmarshal_from(reader, order),
            None => Err(EncodingError::NilPointer),
        }
    }
}

// ───────────────────────────────────────────────────────────────────
// Tuples
// ───────────────────────────────────────────────────────────────────

macro_rules! impl_tuple {
    ($($name:ident . $idx:tt),+) => {
        impl<$($name: Marshal),+> Marshal for ($($name,)+) {
            fn marshal_into(&self, out: &mut Vec<u8>, order: ByteOrder) -> Result<()> {
                $( self.$idx.marshal_into(out, order)?; )+
                Ok(())
            }
        }

        impl<$($name: Unmarshal),+> Unmarshal for ($($name,)+) {
            fn unmarshal_from<Rd: Read + ?Sized>(
                &mut self,
                reader: &mut Rd,
                order: ByteOrder,
            ) -> Result<()> {
                $( self.$idx.unmarshal_from(reader, order)?; )+
                Ok(())
            }
        }
    };
}

impl_tuple!(A.0);
impl_tuple!(A.0, B.1);
impl_tuple!(A.0, B.1, C.2);
impl_tuple!(A.0, B.1, C.2, D.3);
impl_tuple!(A.0, B.1, C.2, D.3, E.4);
impl_tuple!(A.0, B.1, C.2, D.3, E.4, F.5);

impl Marshal for () {
    fn marshal_into(&self, _out: &mut Vec<u8>, _order: ByteOrder) -> Result<()> {
        Ok(())
    }
}

impl Unmarshal for () {
    fn unmarshal_from<R: Read + ?Sized>(&mut self, _reader: &mut R, _order: ByteOrder) -> Result<()> {
        Ok(())
    }
}
