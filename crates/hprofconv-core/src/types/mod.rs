//! # Types
//!
//! Value types shared by the decoder, the tables and the emitter.
//!
//! None of these types know about the input file: identifier width is an
//! explicit [`IdSize`] parameter wherever it matters.

pub mod class;
pub mod field;
pub mod id;

// Re-export all public types
pub use class::{ClassInfo, FieldList};
pub use field::{FieldSpec, FieldType, FieldValue};
pub use id::{Id, IdSize};
