//! # Cursor
//!
//! Sequential big-endian reader over a region of the input.
//!
//! A cursor never reads outside its region. Nested regions (a record body, the
//! raw bytes of one instance) are carved out with [`Cursor::split`], which
//! advances the parent past the region in one step. Whatever happens inside the
//! child, the parent stays correctly framed.
//!
//! Offsets reported in errors are absolute file offsets.

use crate::error::{ConvertError, ConvertResult};
use crate::types::{FieldType, FieldValue, Id, IdSize};

/// Bounds-checked reader over a byte slice
#[derive(Debug, Clone)]
pub struct Cursor<'a>
{
    data: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> Cursor<'a>
{
    /// Create a cursor over a whole input buffer.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self
    {
        Self { data, pos: 0, base: 0 }
    }

    /// Position relative to the start of this region.
    #[must_use]
    pub fn position(&self) -> usize
    {
        self.pos
    }

    /// Absolute offset of the next byte in the input.
    #[must_use]
    pub fn offset(&self) -> usize
    {
        self.base + self.pos
    }

    /// Bytes left in this region.
    #[must_use]
    pub fn remaining(&self) -> usize
    {
        self.data.len() - self.pos
    }

    /// Whether the region is exhausted.
    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.remaining() == 0
    }

    /// Go back to the start of the region.
    pub fn rewind(&mut self)
    {
        self.pos = 0;
    }

    fn take(&mut self, len: usize) -> ConvertResult<&'a [u8]>
    {
        if len > self.remaining() {
            return Err(ConvertError::CursorOverrun {
                offset: self.offset(),
                wanted: len,
                available: self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> ConvertResult<[u8; N]>
    {
        let mut array = [0u8; N];
        array.copy_from_slice(self.take(N)?);
        Ok(array)
    }

    /// Read one byte.
    pub fn read_u8(&mut self) -> ConvertResult<u8>
    {
        Ok(self.take_array::<1>()?[0])
    }

    /// Read a big-endian `u16`.
    pub fn read_u16(&mut self) -> ConvertResult<u16>
    {
        Ok(u16::from_be_bytes(self.take_array()?))
    }

    /// Read a big-endian `u32`.
    pub fn read_u32(&mut self) -> ConvertResult<u32>
    {
        Ok(u32::from_be_bytes(self.take_array()?))
    }

    /// Read a big-endian `i32`.
    pub fn read_i32(&mut self) -> ConvertResult<i32>
    {
        Ok(i32::from_be_bytes(self.take_array()?))
    }

    /// Read a big-endian `u64`.
    pub fn read_u64(&mut self) -> ConvertResult<u64>
    {
        Ok(u64::from_be_bytes(self.take_array()?))
    }

    /// Borrow the next `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> ConvertResult<&'a [u8]>
    {
        self.take(len)
    }

    /// Advance past `len` bytes without looking at them.
    pub fn skip(&mut self, len: usize) -> ConvertResult<()>
    {
        self.take(len).map(|_| ())
    }

    /// Read an identifier of the given width.
    pub fn read_id(&mut self, size: IdSize) -> ConvertResult<Id>
    {
        let raw = match size {
            IdSize::Four => u64::from(self.read_u32()?),
            IdSize::Eight => self.read_u64()?,
        };
        Ok(size.id(raw))
    }

    /// Read a basic type code.
    ///
    /// Unknown codes are fatal: without the type there is no way to know how
    /// many bytes the value occupies.
    pub fn read_field_type(&mut self) -> ConvertResult<FieldType>
    {
        let offset = self.offset();
        let tag = self.read_u8()?;
        FieldType::from_tag(tag).ok_or(ConvertError::UnknownFieldType { tag, offset })
    }

    /// Decode one value of the given type.
    pub fn read_value(&mut self, field_type: FieldType, size: IdSize) -> ConvertResult<FieldValue>
    {
        Ok(match field_type {
            FieldType::Object => FieldValue::Object(self.read_id(size)?),
            FieldType::Boolean => FieldValue::Boolean(self.read_u8()? != 0),
            FieldType::Char => FieldValue::Char(self.read_u16()?),
            FieldType::Float => FieldValue::Float(f32::from_bits(self.read_u32()?)),
            FieldType::Double => FieldValue::Double(f64::from_bits(self.read_u64()?)),
            FieldType::Byte => FieldValue::Byte(i8::from_be_bytes(self.take_array()?)),
            FieldType::Short => FieldValue::Short(i16::from_be_bytes(self.take_array()?)),
            FieldType::Int => FieldValue::Int(i32::from_be_bytes(self.take_array()?)),
            FieldType::Long => FieldValue::Long(i64::from_be_bytes(self.take_array()?)),
        })
    }

    /// Carve the next `len` bytes into their own region.
    ///
    /// The parent cursor moves past the region immediately. Reads on the
    /// returned cursor cannot go beyond `len` bytes.
    pub fn split(&mut self, len: usize) -> ConvertResult<Cursor<'a>>
    {
        let base = self.offset();
        let data = self.take(len)?;
        Ok(Cursor { data, pos: 0, base })
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_big_endian_reads()
    {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f];
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_u8().unwrap(), 0x01);
        assert_eq!(cursor.read_u16().unwrap(), 0x0203);
        assert_eq!(cursor.read_u32().unwrap(), 0x0405_0607);
        assert_eq!(cursor.read_u64().unwrap(), 0x0809_0a0b_0c0d_0e0f);
        assert!(cursor.is_empty());
        assert_eq!(cursor.offset(), 15);
    }

    #[test]
    fn test_read_id_widths()
    {
        let data = [0xff, 0xff, 0xff, 0xfe, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02];
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_id(IdSize::Four).unwrap().value(), 0xffff_fffe);
        assert_eq!(cursor.read_id(IdSize::Eight).unwrap().value(), 0x0000_0001_0000_0002);
    }

    #[test]
    fn test_overrun_is_reported_with_offset()
    {
        let data = [0u8; 6];
        let mut cursor = Cursor::new(&data);
        cursor.skip(4).unwrap();
        match cursor.read_u32() {
            Err(ConvertError::CursorOverrun {
                offset,
                wanted,
                available,
            }) => {
                assert_eq!(offset, 4);
                assert_eq!(wanted, 4);
                assert_eq!(available, 2);
            }
            other => panic!("expected overrun, got {other:?}"),
        }
        // A failed read does not move the cursor
        assert_eq!(cursor.position(), 4);
    }

    #[test]
    fn test_split_confines_reads()
    {
        let data = [1, 2, 3, 4, 5, 6];
        let mut cursor = Cursor::new(&data);
        cursor.skip(1).unwrap();
        let mut child = cursor.split(3).unwrap();
        assert_eq!(cursor.offset(), 4);
        assert_eq!(child.offset(), 1);
        assert_eq!(child.read_u16().unwrap(), 0x0203);
        assert!(matches!(
            child.read_u16(),
            Err(ConvertError::CursorOverrun { offset: 3, .. })
        ));
        assert_eq!(cursor.read_u8().unwrap(), 5);
    }

    #[test]
    fn test_split_past_end_fails()
    {
        let data = [0u8; 3];
        let mut cursor = Cursor::new(&data);
        assert!(cursor.split(4).is_err());
        assert_eq!(cursor.remaining(), 3);
    }

    #[test]
    fn test_rewind()
    {
        let data = [0xaa, 0xbb];
        let mut cursor = Cursor::new(&data);
        cursor.skip(2).unwrap();
        cursor.rewind();
        assert_eq!(cursor.read_u8().unwrap(), 0xaa);
    }

    #[test]
    fn test_read_values()
    {
        let mut data = vec![5u8, 0x00, 0x41];
        data.extend_from_slice(&1.5f32.to_bits().to_be_bytes());
        data.extend_from_slice(&(-2i64).to_be_bytes());
        data.push(0x80);
        let mut cursor = Cursor::new(&data);

        let ty = cursor.read_field_type().unwrap();
        assert_eq!(ty, FieldType::Char);
        assert_eq!(cursor.read_value(ty, IdSize::Four).unwrap(), FieldValue::Char(0x41));
        assert_eq!(cursor.read_value(FieldType::Float, IdSize::Four).unwrap(), FieldValue::Float(1.5));
        assert_eq!(cursor.read_value(FieldType::Long, IdSize::Four).unwrap(), FieldValue::Long(-2));
        assert_eq!(cursor.read_value(FieldType::Byte, IdSize::Four).unwrap(), FieldValue::Byte(-128));
    }

    #[test]
    fn test_unknown_field_type()
    {
        let data = [0x00, 0x03];
        let mut cursor = Cursor::new(&data);
        cursor.skip(1).unwrap();
        assert!(matches!(
            cursor.read_field_type(),
            Err(ConvertError::UnknownFieldType { tag: 3, offset: 1 })
        ));
    }
}
