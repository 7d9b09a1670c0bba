//! # hprofconv-core
//!
//! Decoder for binary HPROF heap dumps and writer for the legacy
//! `JAVA PROFILE 1.0.1` ASCII heap dump format.
//!
//! This crate provides:
//! - A bounds-checked reader for the big-endian record stream
//! - Class layout collection and instance field resolution
//! - The ASCII dump grammar (`ROOT`, `CLS`, `OBJ`, `ARR` blocks)
//! - Optional `String` contents recovery from `char[]` arrays
//!
//! ## Two passes
//!
//! Instance records are raw bytes; their layout depends on class dumps that may
//! come later in the file. [`Converter`] therefore scans the input twice: once
//! to collect metadata, once to decode and emit objects. See
//! [`converter`] for the details.
//!
//! ## Unsafe code
//!
//! The only `unsafe` block maps the input file into memory with `memmap2`.

#![allow(unsafe_code)] // Required for memory mapping the input

pub mod context;
pub mod converter;
pub mod cursor;
pub mod emitter;
pub mod error;
pub mod header;
pub mod heap;
pub mod output;
pub mod prelude;
pub mod records;
pub mod strings;
pub mod tables;
pub mod types;

pub use context::{DumpContext, RecordCounts};
pub use converter::{ConversionReport, ConvertOptions, Converter, Pass};
// Re-export commonly used types
pub use error::{ConvertError, ConvertResult};
pub use header::Header;
pub use types::{Id, IdSize};
