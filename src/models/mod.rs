//! Blockchain models.

use crate::cell::CellSlice;
use crate::error::Error;
use crate::util::unlikely;

pub use block::*;
pub use currency::*;
pub use global_version::*;
pub use tag::TlbTag;

#[macro_use]
mod tag;

pub mod block;
pub mod currency;
pub mod global_version;

/// A field which may be left undecoded.
///
/// Distinguishes an absent (decoded, empty) value from a subtree which
/// exists but is not parsed by this crate.
#[derive(Debug, Clone, Eq, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Deferred<T> {
    /// The subtree exists but was skipped.
    NotDecoded,
    /// Fully decoded value.
    Decoded(T),
}

impl<T> Deferred<T> {
    /// Returns `true` if the value was decoded.
    #[inline]
    pub const fn is_decoded(&self) -> bool {
        matches!(self, Self::Decoded(_))
    }

    /// Returns the decoded value or an [`UnsupportedField`] error
    /// with the specified names.
    ///
    /// [`UnsupportedField`]: Error::UnsupportedField
    pub fn get(&self, record: &'static str, field: &'static str) -> Result<&T, Error> {
        match self {
            Self::Decoded(value) => Ok(value),
            Self::NotDecoded => Err(Error::UnsupportedField { record, field }),
        }
    }
}

impl<T> From<T> for Deferred<T> {
    #[inline]
    fn from(value: T) -> Self {
        Self::Decoded(value)
    }
}

/// Uninhabited type for subtrees which are never decoded.
#[derive(Debug, Clone, Copy, Eq, PartialEq, serde::Serialize)]
pub enum Opaque {}

/// Loads the root of a `HashmapE`.
///
/// An empty dictionary is decoded as the default value, a non-empty one
/// consumes the root reference and is kept as [`Deferred::NotDecoded`].
pub fn load_dict_root<T: Default>(slice: &mut CellSlice<'_>) -> Result<Deferred<T>, Error> {
    if !ok!(slice.get_bit(0)) {
        ok!(slice.skip_bits(1));
        return Ok(Deferred::Decoded(T::default()));
    }

    if unlikely(slice.remaining_refs() == 0) {
        return Err(Error::UnexpectedEndOfData);
    }
    ok!(slice.skip_bits(1));
    ok!(slice.skip_references(1));
    Ok(Deferred::NotDecoded)
}
