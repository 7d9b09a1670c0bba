//! Field types, decoded values and field declarations.

use std::fmt;

use super::id::{Id, IdSize};

/// HPROF basic type code
///
/// Used for instance field declarations, static fields, constant pool entries
/// and primitive array element types. Arrays never use `Object`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType
{
    /// Object reference (code 2)
    Object,
    /// `boolean` (code 4)
    Boolean,
    /// `char`, one UTF-16 code unit (code 5)
    Char,
    /// `float` (code 6)
    Float,
    /// `double` (code 7)
    Double,
    /// `byte` (code 8)
    Byte,
    /// `short` (code 9)
    Short,
    /// `int` (code 10)
    Int,
    /// `long` (code 11)
    Long,
}

impl FieldType
{
    /// Map a type code to a field type, `None` for codes this format does not define.
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self>
    {
        match tag {
            2 => Some(FieldType::Object),
            4 => Some(FieldType::Boolean),
            5 => Some(FieldType::Char),
            6 => Some(FieldType::Float),
            7 => Some(FieldType::Double),
            8 => Some(FieldType::Byte),
            9 => Some(FieldType::Short),
            10 => Some(FieldType::Int),
            11 => Some(FieldType::Long),
            _ => None,
        }
    }

    /// The type code as stored in the file.
    #[must_use]
    pub const fn tag(self) -> u8
    {
        match self {
            FieldType::Object => 2,
            FieldType::Boolean => 4,
            FieldType::Char => 5,
            FieldType::Float => 6,
            FieldType::Double => 7,
            FieldType::Byte => 8,
            FieldType::Short => 9,
            FieldType::Int => 10,
            FieldType::Long => 11,
        }
    }

    /// Encoded width in bytes. Object references take one identifier.
    #[must_use]
    pub const fn width(self, id_size: IdSize) -> usize
    {
        match self {
            FieldType::Object => id_size.bytes(),
            FieldType::Boolean | FieldType::Byte => 1,
            FieldType::Char | FieldType::Short => 2,
            FieldType::Float | FieldType::Int => 4,
            FieldType::Double | FieldType::Long => 8,
        }
    }

    /// Java name of the type, as printed in `ARR` lines.
    #[must_use]
    pub const fn name(self) -> &'static str
    {
        match self {
            FieldType::Object => "object",
            FieldType::Boolean => "boolean",
            FieldType::Char => "char",
            FieldType::Float => "float",
            FieldType::Double => "double",
            FieldType::Byte => "byte",
            FieldType::Short => "short",
            FieldType::Int => "int",
            FieldType::Long => "long",
        }
    }
}

impl fmt::Display for FieldType
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.name())
    }
}

/// A decoded field value
///
/// Each variant carries only what its type implies. The converter only ever
/// prints object references, but every value is decoded so the cursor moves
/// by the right amount and the value is available to logging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue
{
    /// Object reference (possibly null)
    Object(Id),
    /// `boolean`
    Boolean(bool),
    /// `char` code unit
    Char(u16),
    /// `float`
    Float(f32),
    /// `double`
    Double(f64),
    /// `byte`
    Byte(i8),
    /// `short`
    Short(i16),
    /// `int`
    Int(i32),
    /// `long`
    Long(i64),
}

impl FieldValue
{
    /// The type this value was decoded as.
    #[must_use]
    pub const fn field_type(&self) -> FieldType
    {
        match self {
            FieldValue::Object(_) => FieldType::Object,
            FieldValue::Boolean(_) => FieldType::Boolean,
            FieldValue::Char(_) => FieldType::Char,
            FieldValue::Float(_) => FieldType::Float,
            FieldValue::Double(_) => FieldType::Double,
            FieldValue::Byte(_) => FieldType::Byte,
            FieldValue::Short(_) => FieldType::Short,
            FieldValue::Int(_) => FieldType::Int,
            FieldValue::Long(_) => FieldType::Long,
        }
    }

    /// The referenced object, if this is a non-null object reference.
    #[must_use]
    pub fn as_reference(&self) -> Option<Id>
    {
        match self {
            FieldValue::Object(id) if !id.is_null() => Some(*id),
            _ => None,
        }
    }
}

/// One instance field declared directly on a class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec
{
    name: String,
    field_type: FieldType,
}

impl FieldSpec
{
    /// Create a field declaration.
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self
    {
        Self {
            name: name.into(),
            field_type,
        }
    }

    /// Field name as resolved from the string table.
    #[must_use]
    pub fn name(&self) -> &str
    {
        &self.name
    }

    /// Declared field type.
    #[must_use]
    pub const fn field_type(&self) -> FieldType
    {
        self.field_type
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_tag_round_trip()
    {
        for tag in 0u8..=255 {
            if let Some(ty) = FieldType::from_tag(tag) {
                assert_eq!(ty.tag(), tag);
            }
        }
        assert_eq!(FieldType::from_tag(1), None);
        assert_eq!(FieldType::from_tag(3), None);
        assert_eq!(FieldType::from_tag(12), None);
    }

    #[test]
    fn test_widths()
    {
        assert_eq!(FieldType::Object.width(IdSize::Four), 4);
        assert_eq!(FieldType::Object.width(IdSize::Eight), 8);
        assert_eq!(FieldType::Boolean.width(IdSize::Eight), 1);
        assert_eq!(FieldType::Byte.width(IdSize::Eight), 1);
        assert_eq!(FieldType::Char.width(IdSize::Eight), 2);
        assert_eq!(FieldType::Short.width(IdSize::Eight), 2);
        assert_eq!(FieldType::Float.width(IdSize::Eight), 4);
        assert_eq!(FieldType::Int.width(IdSize::Eight), 4);
        assert_eq!(FieldType::Double.width(IdSize::Four), 8);
        assert_eq!(FieldType::Long.width(IdSize::Four), 8);
    }

    #[test]
    fn test_as_reference_skips_null_and_primitives()
    {
        let id = IdSize::Eight.id(0x42);
        assert_eq!(FieldValue::Object(id).as_reference(), Some(id));
        assert_eq!(FieldValue::Object(Id::NULL).as_reference(), None);
        assert_eq!(FieldValue::Long(0x42).as_reference(), None);
        assert_eq!(FieldValue::Int(7).field_type(), FieldType::Int);
    }
}
