//! Global version and capabilities.

use crate::cell::{CellSlice, Load};
use crate::error::Error;
use crate::models::TlbTag;

decl_tlb_tag! {
    /// Constructor tag of [`GlobalVersion`].
    pub enum GlobalVersionTag("GlobalVersion", 8) {
        /// `capabilities#c4`
        Capabilities = 0xc4,
    }
}

/// Software info.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, serde::Serialize)]
pub struct GlobalVersion {
    /// Software version.
    pub version: u32,
    /// Software capability flags.
    pub capabilities: GlobalCapabilities,
}

impl<'a> Load<'a> for GlobalVersion {
    fn load_from(slice: &mut CellSlice<'a>) -> Result<Self, Error> {
        ok!(GlobalVersionTag::load_tag(slice));
        Ok(Self {
            version: ok!(slice.load_u32()),
            capabilities: GlobalCapabilities(ok!(slice.load_u64())),
        })
    }
}

/// A set of enabled capabilities.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, serde::Serialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct GlobalCapabilities(u64);

impl GlobalCapabilities {
    /// Creates a new capabilities set from raw flags.
    #[inline]
    pub const fn new(inner: u64) -> Self {
        Self(inner)
    }

    /// Returns `true` if the set contains no enabled capabilities.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Returns the number of enabled capabilities.
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns `true` if the capability with the specified bit offset is enabled.
    #[inline]
    pub const fn contains_bit(&self, bit_offset: u32) -> bool {
        bit_offset < 64 && self.0 & (1u64 << bit_offset) != 0
    }

    /// Returns the underlying bit mask.
    #[inline]
    pub const fn into_inner(self) -> u64 {
        self.0
    }
}

impl From<u64> for GlobalCapabilities {
    #[inline]
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<GlobalCapabilities> for u64 {
    #[inline]
    fn from(value: GlobalCapabilities) -> Self {
        value.0
    }
}
