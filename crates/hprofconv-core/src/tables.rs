//! # Lookup Tables
//!
//! Per-file tables filled during the metadata pass:
//!
//! - [`NameTable`]: string id → text, from string records
//! - [`ClassNameTable`]: class object id → name string id, from class-load records
//! - [`ClassTable`]: class object id → [`ClassInfo`], from class-dump sub-records
//!
//! String records and class records interleave freely, so a lookup may miss
//! simply because the entry has not been seen yet.

use std::collections::HashMap;

use crate::types::{ClassInfo, Id};

/// Rendered in place of any name that cannot be resolved.
pub const UNKNOWN_NAME: &str = "null";

/// Identifier → string table
#[derive(Debug, Default)]
pub struct NameTable
{
    names: HashMap<Id, String>,
}

impl NameTable
{
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Record a string. A repeated id keeps the latest text.
    pub fn insert(&mut self, id: Id, text: String)
    {
        self.names.insert(id, text);
    }

    /// Look up a string.
    #[must_use]
    pub fn get(&self, id: Id) -> Option<&str>
    {
        self.names.get(&id).map(String::as_str)
    }

    /// Look up a string, falling back to [`UNKNOWN_NAME`].
    #[must_use]
    pub fn get_or_unknown(&self, id: Id) -> &str
    {
        self.get(id).unwrap_or(UNKNOWN_NAME)
    }

    /// Number of strings recorded.
    #[must_use]
    pub fn len(&self) -> usize
    {
        self.names.len()
    }

    /// Whether no strings have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.names.is_empty()
    }
}

/// Class object id → class name string id
#[derive(Debug, Default)]
pub struct ClassNameTable
{
    entries: HashMap<Id, Id>,
}

impl ClassNameTable
{
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Record a class-load record.
    pub fn insert(&mut self, class_id: Id, name_id: Id)
    {
        self.entries.insert(class_id, name_id);
    }

    /// Name string id for a class object.
    #[must_use]
    pub fn name_id(&self, class_id: Id) -> Option<Id>
    {
        self.entries.get(&class_id).copied()
    }

    /// Resolve a printable class name through the name table.
    ///
    /// Returns [`UNKNOWN_NAME`] when either the class was never loaded or its
    /// name string is missing.
    #[must_use]
    pub fn resolve<'n>(&self, class_id: Id, names: &'n NameTable) -> &'n str
    {
        self.name_id(class_id)
            .and_then(|name_id| names.get(name_id))
            .unwrap_or(UNKNOWN_NAME)
    }

    /// Number of loaded classes.
    #[must_use]
    pub fn len(&self) -> usize
    {
        self.entries.len()
    }

    /// Whether no classes have been loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.entries.is_empty()
    }
}

/// Class object id → class layout
#[derive(Debug, Default)]
pub struct ClassTable
{
    classes: HashMap<Id, ClassInfo>,
}

impl ClassTable
{
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Store the layout for a class.
    pub fn insert(&mut self, class_id: Id, info: ClassInfo)
    {
        self.classes.insert(class_id, info);
    }

    /// Layout of a class, if its class dump has been seen.
    #[must_use]
    pub fn get(&self, class_id: Id) -> Option<&ClassInfo>
    {
        self.classes.get(&class_id)
    }

    /// Number of classes with a known layout.
    #[must_use]
    pub fn len(&self) -> usize
    {
        self.classes.len()
    }

    /// Whether no class layouts are known.
    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.classes.is_empty()
    }
}
