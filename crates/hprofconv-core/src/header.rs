//! # File Header
//!
//! Every binary HPROF file starts with:
//!
//! | Bytes | Content |
//! |---|---|
//! | 18 | ASCII magic, e.g. `JAVA PROFILE 1.0.1` |
//! | 1 | NUL terminator |
//! | 4 | identifier size (4 or 8) |
//! | 8 | creation time, milliseconds since the Unix epoch |

use chrono::{DateTime, Utc};

use crate::cursor::Cursor;
use crate::error::{ConvertError, ConvertResult};
use crate::types::IdSize;

/// Number of usable magic bytes before the terminator.
pub const MAGIC_LEN: usize = 18;

/// Decoded file header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header
{
    magic: String,
    id_size: IdSize,
    timestamp_ms: u64,
}

impl Header
{
    /// Parse the header at the cursor's position.
    ///
    /// ## Errors
    ///
    /// - [`ConvertError::NotHprof`] if the magic is not NUL-terminated
    /// - [`ConvertError::InvalidIdSize`] if the identifier size is not 4 or 8
    /// - [`ConvertError::CursorOverrun`] if the input is shorter than a header
    pub fn parse(cursor: &mut Cursor<'_>) -> ConvertResult<Self>
    {
        let magic_bytes = cursor.read_bytes(MAGIC_LEN)?;
        let magic = String::from_utf8_lossy(magic_bytes).into_owned();
        let terminator = cursor.read_u8()?;
        if terminator != 0 {
            return Err(ConvertError::NotHprof { magic, terminator });
        }

        let id_size = IdSize::try_from(cursor.read_u32()?)?;
        let timestamp_ms = cursor.read_u64()?;

        Ok(Self {
            magic,
            id_size,
            timestamp_ms,
        })
    }

    /// Format magic, e.g. `JAVA PROFILE 1.0.1`.
    #[must_use]
    pub fn magic(&self) -> &str
    {
        &self.magic
    }

    /// Identifier width used throughout the file.
    #[must_use]
    pub const fn id_size(&self) -> IdSize
    {
        self.id_size
    }

    /// Raw creation timestamp in milliseconds since the epoch.
    #[must_use]
    pub const fn timestamp_ms(&self) -> u64
    {
        self.timestamp_ms
    }

    /// Creation time, if the timestamp is representable.
    #[must_use]
    pub fn created(&self) -> Option<DateTime<Utc>>
    {
        i64::try_from(self.timestamp_ms).ok().and_then(DateTime::from_timestamp_millis)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn header_bytes(magic: &[u8; 18], terminator: u8, id_size: u32, ts: u64) -> Vec<u8>
    {
        let mut bytes = magic.to_vec();
        bytes.push(terminator);
        bytes.extend_from_slice(&id_size.to_be_bytes());
        bytes.extend_from_slice(&ts.to_be_bytes());
        bytes
    }

    #[test]
    fn test_parse_header()
    {
        let bytes = header_bytes(b"JAVA PROFILE 1.0.1", 0, 8, 1_204_894_044_000);
        let mut cursor = Cursor::new(&bytes);
        let header = Header::parse(&mut cursor).unwrap();
        assert_eq!(header.magic(), "JAVA PROFILE 1.0.1");
        assert_eq!(header.id_size(), IdSize::Eight);
        assert_eq!(header.timestamp_ms(), 1_204_894_044_000);
        assert!(cursor.is_empty());

        let created = header.created().unwrap();
        assert_eq!(created.format("%Y-%m-%d").to_string(), "2008-03-07");
    }

    #[test]
    fn test_parse_is_idempotent_after_rewind()
    {
        let bytes = header_bytes(b"JAVA PROFILE 1.0.2", 0, 4, 0);
        let mut cursor = Cursor::new(&bytes);
        let first = Header::parse(&mut cursor).unwrap();
        cursor.rewind();
        let second = Header::parse(&mut cursor).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_non_zero_terminator()
    {
        let bytes = header_bytes(b"JAVA PROFILE 1.0.1", b'X', 8, 0);
        let mut cursor = Cursor::new(&bytes);
        match Header::parse(&mut cursor) {
            Err(ConvertError::NotHprof { terminator, .. }) => assert_eq!(terminator, b'X'),
            other => panic!("expected NotHprof, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_id_size()
    {
        let bytes = header_bytes(b"JAVA PROFILE 1.0.1", 0, 2, 0);
        let mut cursor = Cursor::new(&bytes);
        assert!(matches!(Header::parse(&mut cursor), Err(ConvertError::InvalidIdSize(2))));
    }

    #[test]
    fn test_short_input()
    {
        let mut cursor = Cursor::new(b"JAVA PROFILE");
        assert!(matches!(
            Header::parse(&mut cursor),
            Err(ConvertError::CursorOverrun { .. })
        ));
    }
}
