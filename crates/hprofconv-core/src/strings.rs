//! # String Resolution
//!
//! Correlates `java.lang.String` instances with the `char[]` arrays holding
//! their contents.
//!
//! A `String` instance names its array through its `value` field. The array's
//! primitive-array record may come before or after the instance in the file:
//!
//! - array first: its code units are already cached and the string is printed
//!   as soon as the instance is walked
//! - instance first: the pair is parked as pending and printed once the whole
//!   emit pass is over
//!
//! Either way the printed `S: <id> <text>` line is the same.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, error};

use crate::emitter::Emitter;
use crate::error::ConvertResult;
use crate::types::Id;

/// Name of the field holding a `String`'s character array.
pub const STRING_VALUE_FIELD: &str = "value";

/// Whether a class name denotes `java.lang.String`, in either spelling.
#[must_use]
pub fn is_string_class(name: &str) -> bool
{
    name == "java.lang.String" || name == "java/lang/String"
}

/// Reinterpret raw array bytes as big-endian UTF-16 code units.
///
/// A trailing odd byte cannot happen for a well-formed `char[]` payload and is
/// ignored.
#[must_use]
pub fn decode_utf16_be(bytes: &[u8]) -> Vec<u16>
{
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect()
}

/// Cache of `char[]` contents plus the strings still waiting for theirs
#[derive(Debug, Default)]
pub struct StringResolver
{
    char_arrays: HashMap<Id, Vec<u16>>,
    pending: BTreeMap<Id, Id>,
}

impl StringResolver
{
    /// Create an empty resolver.
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Remember the code units of a decoded `char[]`.
    pub fn cache_char_array(&mut self, array_id: Id, units: Vec<u16>)
    {
        self.char_arrays.insert(array_id, units);
    }

    /// Text of a cached `char[]`.
    #[must_use]
    pub fn text_of(&self, array_id: Id) -> Option<String>
    {
        self.char_arrays.get(&array_id).map(|units| String::from_utf16_lossy(units))
    }

    /// A `String` instance refers to `array_id` through its `value` field.
    ///
    /// Prints the string right away when the array is known, otherwise parks
    /// the association until [`StringResolver::resolve_pending`].
    pub fn observe(&mut self, string_id: Id, array_id: Id, emitter: &mut Emitter<'_>) -> ConvertResult<()>
    {
        match self.text_of(array_id) {
            Some(text) => emitter.string(string_id, &text),
            None => {
                debug!("String {string_id} waits for char[] {array_id}");
                self.pending.insert(string_id, array_id);
                Ok(())
            }
        }
    }

    /// Number of strings still waiting for their array.
    #[must_use]
    pub fn pending_len(&self) -> usize
    {
        self.pending.len()
    }

    /// Print every parked string whose array has turned up since.
    ///
    /// Strings are printed in identifier order. Associations that still cannot
    /// be resolved are logged one by one and counted; they do not fail the
    /// conversion.
    pub fn resolve_pending(&mut self, emitter: &mut Emitter<'_>) -> ConvertResult<usize>
    {
        let pending = std::mem::take(&mut self.pending);
        let mut unresolved = 0;
        for (string_id, array_id) in pending {
            match self.text_of(array_id) {
                Some(text) => emitter.string(string_id, &text)?,
                None => {
                    error!("could not find char[] {array_id} for String {string_id}");
                    unresolved += 1;
                }
            }
        }
        Ok(unresolved)
    }
}
