//! Bag-of-cells reader and block header decoder.
//!
//! ## `Cell` vs `CellSlice`
//!
//! Cells live in a [`CellTree`] arena and are addressed by index, so a whole
//! tree is owned by a single value and can be moved to another thread as is.
//! [`CellRef`] is a cheap copyable handle to one arena entry.
//!
//! [`CellSlice`] is a forward-only cursor over the bits and references of a
//! single cell. It is created once per decode call and is never cloned or
//! rewound: whatever was read from it cannot be read again.
//!
//! ## Decoding a block
//!
//! ```
//! use venom_block_decoder::prelude::*;
//!
//! # fn run(payload: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
//! let tree = Boc::decode(payload)?;
//! let root = tree.root().ok_or("empty tree")?;
//! let block = root.parse::<Block>()?;
//! println!("seqno: {}", block.info.seq_no);
//! # Ok(())
//! # }
//! ```
//!
//! [`CellTree`]: crate::cell::CellTree
//! [`CellRef`]: crate::cell::CellRef
//! [`CellSlice`]: crate::cell::CellSlice

/// Early returns the error, like `?` does, but without the `From` conversion.
macro_rules! ok {
    ($e:expr $(,)?) => {
        match $e {
            core::result::Result::Ok(val) => val,
            core::result::Result::Err(err) => return core::result::Result::Err(err),
        }
    };
}

pub use self::boc::Boc;
pub use self::cell::{CellRef, CellSlice, CellTree};
pub use self::error::Error;

pub mod boc;
pub mod cell;
pub mod error;
pub mod indexer;
pub mod models;
pub mod num;
pub mod prelude;

mod util;
