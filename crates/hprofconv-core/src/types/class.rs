//! Class layout metadata collected during the metadata pass.

use smallvec::SmallVec;

use super::field::FieldSpec;
use super::id::Id;

/// Own-field list; most classes declare only a handful of fields.
pub type FieldList = SmallVec<[FieldSpec; 8]>;

/// Layout of one class, as declared by its class-dump record
///
/// Only the fields declared directly on the class are stored. Inherited
/// fields are found by following [`ClassInfo::super_id`] until it is null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo
{
    super_id: Id,
    instance_size: u32,
    fields: FieldList,
}

impl ClassInfo
{
    /// Create class metadata from a finished class-dump record.
    #[must_use]
    pub fn new(super_id: Id, instance_size: u32, fields: FieldList) -> Self
    {
        Self {
            super_id,
            instance_size,
            fields,
        }
    }

    /// Superclass identifier, null for `java.lang.Object` and friends.
    #[must_use]
    pub const fn super_id(&self) -> Id
    {
        self.super_id
    }

    /// Instance size in bytes as reported by the VM for this class alone.
    #[must_use]
    pub const fn instance_size(&self) -> u32
    {
        self.instance_size
    }

    /// Fields declared directly on this class, in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec]
    {
        &self.fields
    }
}
