//! Object identifier type.

use std::fmt;

use crate::error::{ConvertError, ConvertResult};

/// Width of every identifier in one dump file
///
/// The header declares it once; every object, class and string identifier in
/// the file is encoded with exactly this many bytes. It is passed explicitly to
/// everything that decodes or sizes identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdSize
{
    /// 32-bit identifiers
    Four,
    /// 64-bit identifiers
    Eight,
}

impl IdSize
{
    /// Number of bytes per identifier.
    #[must_use]
    pub const fn bytes(self) -> usize
    {
        match self {
            IdSize::Four => 4,
            IdSize::Eight => 8,
        }
    }

    /// Mask applied to raw bits to get the canonical identifier value.
    #[must_use]
    pub const fn mask(self) -> u64
    {
        match self {
            IdSize::Four => 0xffff_ffff,
            IdSize::Eight => u64::MAX,
        }
    }

    /// Build the canonical identifier for the given raw bits.
    ///
    /// ```rust
    /// use hprofconv_core::types::{Id, IdSize};
    ///
    /// let id = IdSize::Four.id(0xdead_beef_0000_0010);
    /// assert_eq!(id.value(), 0x10);
    /// ```
    #[must_use]
    pub const fn id(self, raw: u64) -> Id
    {
        Id(raw & self.mask())
    }
}

impl TryFrom<u32> for IdSize
{
    type Error = ConvertError;

    fn try_from(value: u32) -> ConvertResult<Self>
    {
        match value {
            4 => Ok(IdSize::Four),
            8 => Ok(IdSize::Eight),
            other => Err(ConvertError::InvalidIdSize(other)),
        }
    }
}

impl fmt::Display for IdSize
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.bytes())
    }
}

/// Canonical object identifier
///
/// Holds the raw identifier bits already masked to the file's [`IdSize`], so
/// equality, ordering and hashing never depend on outside state. Identifiers
/// are only created through [`IdSize::id`] (or read through a cursor), which
/// keeps the masking in one place.
///
/// The value 0 is the null reference. It also terminates superclass chains.
///
/// `Display` renders plain lowercase hex without a prefix, which is what the
/// ASCII heap dump format uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Id(u64);

impl Id
{
    /// The null reference
    pub const NULL: Self = Id(0);

    /// Get the canonical `u64` value of this identifier
    #[must_use]
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Whether this is the null reference
    #[must_use]
    pub const fn is_null(self) -> bool
    {
        self.0 == 0
    }
}

impl From<Id> for u64
{
    fn from(id: Id) -> Self
    {
        id.0
    }
}

impl fmt::Display for Id
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{:x}", self.0)
    }
}

impl fmt::LowerHex for Id
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        fmt::LowerHex::fmt(&self.0, f)
    }
}
