//! Entry points: encode to bytes or a writer, decode from readers.
//!
//! Arguments are references, so "not a pointer" cannot happen; nullable
//! destinations are modelled with `Option` and fail with
//! [`EncodingError::NilPointer`].

use std::io::{Read, Seek, SeekFrom, Write};

use crate::codec::{Marshal, Unmarshal};
use crate::{ByteOrder, EncodingError, Result};

/// Encode `value` into a fresh buffer.
pub fn marshal<T: Marshal + ?Sized>(value: &T, order: ByteOrder) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    value.marshal_into(&mut out, order)?;
    Ok(out)
}

/// Encode `value` and write it out in one piece.
///
/// Nothing reaches `writer` if encoding fails part way.
pub fn marshal_to<W: Write + ?Sized, T: Marshal + ?Sized>(
    writer: &mut W,
    value: &T,
    order: ByteOrder,
) -> Result<usize> {
    let buf = marshal(value, order)?;
    writer.write_all(&buf)?;
    Ok(buf.len())
}

/// Decode from `reader` into `value`, overwriting it.
pub fn unmarshal<R: Read + ?Sized, T: Unmarshal + ?Sized>(
    reader: &mut R,
    value: &mut T,
    order: ByteOrder,
) -> Result<()> {
    value.unmarshal_from(reader, order)
}

/// Decode `dst.len()` elements into a pre-sized slice.
///
/// No count is read: this is the second half of a sequence whose count the
/// caller already consumed.
pub fn unmarshal_init_slice<R: Read + ?Sized, T: Unmarshal>(
    reader: &mut R,
    dst: &mut [T],
    order: ByteOrder,
) -> Result<()> {
    if dst.is_empty() {
        return Err(EncodingError::UninitializedSlice);
    }
    dst.iter_mut().try_for_each(|e| e.unmarshal_from(reader, order))
}

/// Decode `value`, optionally after seeking to absolute `offset`.
pub fn unpack<R: Read + Seek + ?Sized, T: Unmarshal + ?Sized>(
    reader: &mut R,
    order: ByteOrder,
    value: &mut T,
    offset: Option<u64>,
) -> Result<()> {
    if let Some(expected) = offset {
        let got = reader.seek(SeekFrom::Start(expected))?;
        if got != expected {
            return Err(EncodingError::SeekMismatch { expected, got });
        }
    }
    value.unmarshal_from(reader, order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_init_slice_after_count() {
        let data = marshal(&vec![41u8, 42, 43], ByteOrder::LittleEndian).unwrap();
        let mut reader = Cursor::new(data);

        let mut len = 0i64;
        unmarshal(&mut reader, &mut len, ByteOrder::LittleEndian).unwrap();
        assert_eq!(len, 3);

        let mut slice = vec![0u8; 3];
        unmarshal_init_slice(&mut reader, &mut slice, ByteOrder::LittleEndian).unwrap();
        assert_eq!(slice, [41, 42, 43]);
    }

    #[test]
    fn test_init_slice_rejects_empty() {
        let mut reader = Cursor::new(vec![1u8]);
        let mut empty: Vec<u8> = Vec::new();
        assert!(matches!(
            unmarshal_init_slice(&mut reader, &mut empty, ByteOrder::LittleEndian),
            Err(EncodingError::UninitializedSlice)
        ));
    }

    #[test]
    fn test_unpack_at_offset() {
        let mut data = vec![0xAAu8; 4];
        data.extend(marshal(&1337u64, ByteOrder::BigEndian).unwrap());
        let mut reader = Cursor::new(data);

        let mut v = 0u64;
        unpack(&mut reader, ByteOrder::BigEndian, &mut v, Some(4)).unwrap();
        assert_eq!(v, 1337);

        reader.set_position(0);
        let mut head = 0u32;
        unpack(&mut reader, ByteOrder::BigEndian, &mut head, None).unwrap();
        assert_eq!(head, 0xAAAA_AAAA);
    }

    #[test]
    fn test_unpack_past_end_is_short_read() {
        let mut reader = Cursor::new(vec![1u8, 2, 3]);
        let mut v = 0u16;
        assert!(matches!(
            unpack(&mut reader, ByteOrder::LittleEndian, &mut v, Some(10)),
            Err(EncodingError::ShortRead)
        ));
    }

    #[test]
    fn test_marshal_to_writer() {
        let mut sink = Vec::new();
        let n = marshal_to(&mut sink, &[1u16, 2], ByteOrder::BigEndian).unwrap();
        assert_eq!(n, 4);
        assert_eq!(sink, [0, 1, 0, 2]);

        let mut untouched = Vec::new();
        assert!(marshal_to(&mut untouched, &(1u8, None::<u8>), ByteOrder::BigEndian).is_err());
        assert!(untouched.is_empty());
    }
}
