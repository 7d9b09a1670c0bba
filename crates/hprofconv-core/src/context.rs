//! # Dump Context
//!
//! All mutable state for converting one file.
//!
//! A [`DumpContext`] is created when a file's header has been read and is
//! dropped once that file's output is finished. Both passes work on the same
//! context: the metadata pass fills the tables, the emit pass reads them and
//! fills the string resolver. Nothing is shared between files.

use std::fmt;

use crate::strings::StringResolver;
use crate::tables::{ClassNameTable, ClassTable, NameTable};
use crate::types::{Id, IdSize};

/// Per-kind record counts, tallied during the metadata pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordCounts
{
    /// String (UTF-8) records
    pub strings: u64,
    /// Class-load records
    pub class_loads: u64,
    /// Top-level records skipped without parsing
    pub skipped: u64,
    /// GC root sub-records of any kind
    pub roots: u64,
    /// Class-dump sub-records
    pub classes: u64,
    /// Instance-dump sub-records
    pub instances: u64,
    /// Object-array sub-records
    pub object_arrays: u64,
    /// Primitive-array sub-records
    pub primitive_arrays: u64,
}

impl RecordCounts
{
    /// Instances plus arrays of both kinds.
    #[must_use]
    pub const fn objects(&self) -> u64
    {
        self.instances + self.object_arrays + self.primitive_arrays
    }
}

impl fmt::Display for RecordCounts
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(
            f,
            "{} classes, {} instances, {} obj arrays, {} primitive arrays",
            self.classes, self.instances, self.object_arrays, self.primitive_arrays
        )
    }
}

/// Per-file tables and counters
#[derive(Debug)]
pub struct DumpContext
{
    id_size: IdSize,
    /// Strings from string records
    pub names: NameTable,
    /// Class object → class name string, from class-load records
    pub class_names: ClassNameTable,
    /// Class layouts from class dumps
    pub classes: ClassTable,
    /// `char[]` cache and pending `String` associations
    pub strings: StringResolver,
    /// Counts from the metadata pass
    pub counts: RecordCounts,
}

impl DumpContext
{
    /// Fresh context for a file using the given identifier width.
    #[must_use]
    pub fn new(id_size: IdSize) -> Self
    {
        Self {
            id_size,
            names: NameTable::new(),
            class_names: ClassNameTable::new(),
            classes: ClassTable::new(),
            strings: StringResolver::new(),
            counts: RecordCounts::default(),
        }
    }

    /// Identifier width of the file.
    #[must_use]
    pub const fn id_size(&self) -> IdSize
    {
        self.id_size
    }

    /// Printable name for a class object id.
    #[must_use]
    pub fn class_name(&self, class_id: Id) -> &str
    {
        self.class_names.resolve(class_id, &self.names)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_counts_display()
    {
        let counts = RecordCounts {
            classes: 3,
            instances: 10,
            object_arrays: 2,
            primitive_arrays: 4,
            ..RecordCounts::default()
        };
        assert_eq!(counts.objects(), 16);
        assert_eq!(
            counts.to_string(),
            "3 classes, 10 instances, 2 obj arrays, 4 primitive arrays"
        );
    }

    #[test]
    fn test_class_name_goes_through_both_tables()
    {
        let mut ctx = DumpContext::new(IdSize::Four);
        let class_id = ctx.id_size().id(0x40);
        let name_id = ctx.id_size().id(0x41);
        ctx.class_names.insert(class_id, name_id);
        ctx.names.insert(name_id, "java/util/HashMap".to_string());
        assert_eq!(ctx.class_name(class_id), "java/util/HashMap");
        assert_eq!(ctx.class_name(Id::NULL), "null");
    }
}
