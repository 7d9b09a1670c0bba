//! Common module for library exports

pub use crate::context::{DumpContext, RecordCounts};
pub use crate::converter::{ConversionReport, ConvertOptions, Converter, Pass};
pub use crate::cursor::Cursor;
pub use crate::emitter::{Emitter, RootKind};
pub use crate::error::{ConvertError, ConvertResult};
pub use crate::header::Header;
pub use crate::types::{ClassInfo, FieldSpec, FieldType, FieldValue, Id, IdSize};
