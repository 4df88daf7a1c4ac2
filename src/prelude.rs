//! The `venom-block-decoder` prelude.
//!
//! This brings into scope a number of traits and commonly used types.

pub use crate::boc::Boc;
pub use crate::cell::{
    CellBuilder, CellDescriptor, CellIndex, CellRef, CellSlice, CellTree, HashBytes, Load,
};
pub use crate::error::Error;
pub use crate::models::{
    Block, BlockInfo, BlockRef, CurrencyCollection, Deferred, ShardIdent, TlbTag, ValueFlow,
};
pub use crate::num::Tokens;
