//! Integer types used in blockchain models.

use crate::cell::{CellSlice, Load};
use crate::error::Error;

/// Variable-length 128-bit integer. Used for native currencies.
///
/// Stored as 5 bits of `len` (`0..=16`), followed by `len` bytes.
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Tokens(u128);

impl Tokens {
    /// The additive identity for this integer type, i.e. `0`.
    pub const ZERO: Self = Tokens(0);

    /// The multiplicative identity for this integer type, i.e. `1`.
    pub const ONE: Self = Tokens(1);

    /// The largest value that can be represented by this integer type.
    pub const MAX: Self = Tokens(u128::MAX);

    /// The maximum number of bytes of the value.
    pub const MAX_BYTES: u16 = 16;

    /// The number of data bits that the length occupies.
    pub const LEN_BITS: u16 = 5;

    /// The maximum number of data bits that this struct occupies.
    pub const MAX_BITS: u16 = Self::LEN_BITS + Self::MAX_BYTES * 8;

    /// Creates a new integer value from a primitive integer.
    #[inline]
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    /// Converts integer into an underlying primitive integer.
    #[inline]
    pub const fn into_inner(self) -> u128 {
        self.0
    }

    /// Returns `true` if an underlying primitive integer is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns number of data bits that this struct occupies.
    pub const fn bit_len(&self) -> u16 {
        let bytes = (std::mem::size_of::<Self>() as u32 - self.0.leading_zeros() / 8) as u16;
        Self::LEN_BITS + bytes * 8
    }

    /// Checked integer addition. Computes `self + rhs`, returning `None` if overflow occurred.
    #[inline]
    #[must_use]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(value) => Some(Tokens(value)),
            None => None,
        }
    }

    /// Checked integer subtraction. Computes `self - rhs`, returning `None` if overflow occurred.
    #[inline]
    #[must_use]
    pub const fn checked_sub(self, rhs: Self) -> Option<Self> {
        match self.0.checked_sub(rhs.0) {
            Some(value) => Some(Tokens(value)),
            None => None,
        }
    }

    /// Tries to add an other value to the current one.
    pub fn try_add_assign(&mut self, other: Self) -> Result<(), Error> {
        match self.checked_add(other) {
            Some(new_value) => {
                *self = new_value;
                Ok(())
            }
            None => Err(Error::IntOverflow),
        }
    }
}

impl From<Tokens> for u128 {
    #[inline]
    fn from(value: Tokens) -> Self {
        value.0
    }
}

impl From<u128> for Tokens {
    #[inline]
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl std::str::FromStr for Tokens {
    type Err = std::num::ParseIntError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl std::fmt::Display for Tokens {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl serde::Serialize for Tokens {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            serializer.collect_str(&self.0)
        } else {
            serializer.serialize_u128(self.0)
        }
    }
}

impl<'a> Load<'a> for Tokens {
    fn load_from(slice: &mut CellSlice<'a>) -> Result<Self, Error> {
        match slice.load_var_uint(Self::LEN_BITS) {
            Ok(value) => Ok(Self(value)),
            Err(e) => Err(e),
        }
    }
}
