//! # Error Types
//!
//! Fatal error handling for the converter.
//!
//! Every variant here aborts the conversion of the current file. Conditions
//! the converter can live with (a class name that was never loaded, a string
//! whose backing array never shows up, ...) are logged through `tracing` at the
//! point where they happen and never surface as a `ConvertError`.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for conversion operations
///
/// ## Error Categories
///
/// 1. **Format errors**: NotHprof, InvalidIdSize, SegmentedHeapDump
/// 2. **Framing errors**: CursorOverrun, TruncatedRecord, ArraySizeOverflow
/// 3. **Type errors**: UnknownFieldType, UnknownSubRecord
/// 4. **Output errors**: BackupFailed, Io
#[derive(Error, Debug)]
pub enum ConvertError
{
    /// The magic string terminator was not a zero byte
    ///
    /// The header starts with 18 bytes of ASCII (`JAVA PROFILE 1.0.x`) and a
    /// terminating NUL. Anything else means the input is not a binary HPROF file.
    #[error("Not a binary HPROF file (magic {magic:?}, terminator 0x{terminator:02x})")]
    NotHprof
    {
        /// The 18 magic bytes, lossily decoded
        magic: String,
        /// The byte found where the NUL terminator should be
        terminator: u8,
    },

    /// The header declared an identifier size other than 4 or 8
    #[error("Invalid identifier size {0} (expected 4 or 8)")]
    InvalidIdSize(u32),

    /// A read went past the end of the current region
    ///
    /// Regions are the whole file, a top-level record body, or the raw field
    /// bytes of one instance.
    #[error("Read of {wanted} bytes at offset 0x{offset:x} overruns region ({available} bytes left)")]
    CursorOverrun
    {
        /// Absolute file offset of the failed read
        offset: usize,
        /// Number of bytes requested
        wanted: usize,
        /// Number of bytes left in the region
        available: usize,
    },

    /// A top-level record declares a body longer than the rest of the file
    #[error("Record 0x{tag:02x} at offset 0x{offset:x} declares {declared} bytes but only {available} remain")]
    TruncatedRecord
    {
        /// Top-level record tag
        tag: u8,
        /// Absolute file offset of the record tag
        offset: usize,
        /// Declared body length
        declared: usize,
        /// Bytes actually left in the file
        available: usize,
    },

    /// A field, constant pool entry or array element used an unknown type code
    #[error("Unknown basic type 0x{tag:02x} at offset 0x{offset:x}")]
    UnknownFieldType
    {
        /// The type code read from the input
        tag: u8,
        /// Absolute file offset of the type code
        offset: usize,
    },

    /// A heap dump contained a sub-record tag this decoder does not know
    #[error("Unknown heap dump sub-record 0x{tag:02x} at offset 0x{offset:x}")]
    UnknownSubRecord
    {
        /// The sub-record tag
        tag: u8,
        /// Absolute file offset of the tag
        offset: usize,
    },

    /// The file uses heap dump segments, which are not supported
    #[error("Segmented heap dump record 0x{tag:02x} at offset 0x{offset:x} is not supported")]
    SegmentedHeapDump
    {
        /// The segment or segment-end tag
        tag: u8,
        /// Absolute file offset of the record
        offset: usize,
    },

    /// Element count times element width does not fit in memory
    #[error("Array of {count} elements of {width} bytes is too large")]
    ArraySizeOverflow
    {
        /// Declared element count
        count: u32,
        /// Element width in bytes
        width: usize,
    },

    /// The previous output file could not be moved out of the way
    #[error("Failed to back up {path}: {source}")]
    BackupFailed
    {
        /// The existing output file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// I/O error while reading the input or writing the output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for `Result<T, ConvertError>`
///
/// ```rust
/// use hprofconv_core::error::ConvertResult;
/// fn foo() -> ConvertResult<()>
/// {
///     Ok(())
/// }
/// ```
pub type ConvertResult<T> = std::result::Result<T, ConvertError>;
