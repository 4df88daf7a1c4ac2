//! Currency collection stuff.

use std::collections::BTreeMap;

use crate::cell::*;
use crate::error::Error;
use crate::models::{load_dict_root, Deferred};
use crate::num::Tokens;

/// Amounts in extra currencies, keyed by currency id.
pub type ExtraCurrencies = BTreeMap<i32, Tokens>;

/// Amounts collection.
#[derive(Debug, Clone, Eq, PartialEq, serde::Serialize)]
#[must_use]
pub struct CurrencyCollection {
    /// Amount in native currency (grams).
    pub tokens: Tokens,
    /// Amounts in other currencies.
    pub other: Deferred<ExtraCurrencies>,
}

impl Default for CurrencyCollection {
    #[inline]
    fn default() -> Self {
        Self::ZERO
    }
}

impl CurrencyCollection {
    /// The additive identity for the currency collection
    /// (with empty extra currencies).
    pub const ZERO: Self = Self {
        tokens: Tokens::ZERO,
        other: Deferred::Decoded(BTreeMap::new()),
    };

    /// Creates a new currency collection with from the specified tokens amount
    /// and empty extra currency collection.
    pub const fn new(tokens: u128) -> Self {
        Self {
            tokens: Tokens::new(tokens),
            other: Deferred::Decoded(BTreeMap::new()),
        }
    }

    /// Returns whether balance in tokens and extra currencies is empty.
    ///
    /// Undecoded extra currencies are never empty.
    pub fn is_zero(&self) -> bool {
        self.tokens.is_zero() && matches!(&self.other, Deferred::Decoded(other) if other.is_empty())
    }

    /// Returns amounts in other currencies.
    pub fn other(&self) -> Result<&ExtraCurrencies, Error> {
        self.other.get("CurrencyCollection", "other")
    }
}

impl From<Tokens> for CurrencyCollection {
    #[inline]
    fn from(tokens: Tokens) -> Self {
        Self {
            tokens,
            other: Deferred::Decoded(BTreeMap::new()),
        }
    }
}

impl<'a> Load<'a> for CurrencyCollection {
    fn load_from(slice: &mut CellSlice<'a>) -> Result<Self, Error> {
        Ok(Self {
            tokens: ok!(Tokens::load_from(slice)),
            other: ok!(load_dict_root(slice)),
        })
    }
}
