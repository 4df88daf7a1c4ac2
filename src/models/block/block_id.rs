use crate::cell::*;
use crate::error::Error;

/// Shard identifier as it is stored in the block header.
#[derive(Default, Clone, Copy, Eq, Hash, PartialEq, Ord, PartialOrd, serde::Serialize)]
pub struct ShardIdent {
    /// The number of meaningful prefix bits (`0..=63`).
    pub prefix_bits: u8,
    /// Workchain id.
    pub workchain: i32,
    /// Raw shard prefix without the terminating tag bit.
    pub prefix: u64,
}

impl ShardIdent {
    /// Masterchain workchain id.
    pub const MASTERCHAIN_WORKCHAIN: i32 = -1;

    /// Basechain workchain id.
    pub const BASECHAIN_WORKCHAIN: i32 = 0;

    /// The number of data bits that this struct occupies (with the marker).
    pub const BITS: u16 = 2 + 6 + 32 + 64;

    /// Returns `true` if this shard is in the masterchain.
    #[inline]
    pub const fn is_masterchain(&self) -> bool {
        self.workchain == Self::MASTERCHAIN_WORKCHAIN
    }

    /// Returns the shard prefix with the tag bit after the
    /// meaningful part, as it is used in shard ids.
    pub const fn prefix_with_tag(&self) -> u64 {
        let tag = 1u64 << (63 - (self.prefix_bits & 0b11_1111));
        (self.prefix & !(tag | (tag - 1))) | tag
    }
}

impl std::fmt::Display for ShardIdent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "{}:{:016x}",
            self.workchain,
            self.prefix_with_tag()
        ))
    }
}

impl std::fmt::Debug for ShardIdent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

impl<'a> Load<'a> for ShardIdent {
    fn load_from(slice: &mut CellSlice<'a>) -> Result<Self, Error> {
        // shard_ident$00
        let marker = ok!(slice.get_uint(0, 2)) as u8;
        if marker != 0 {
            return Err(Error::InvalidShardPrefix(marker));
        }
        ok!(slice.skip_bits(2));

        Ok(Self {
            prefix_bits: ok!(slice.load_small_uint(6)),
            workchain: ok!(slice.load_i32()),
            prefix: ok!(slice.load_u64()),
        })
    }
}

/// Reference to the external block.
#[derive(Debug, Default, Clone, Eq, PartialEq, serde::Serialize)]
pub struct BlockRef {
    /// Sequence number of the referenced block.
    pub seq_no: u32,
    /// The end of the logical time of the referenced block.
    pub end_lt: u64,
    /// Representation hash of the root cell of the referenced block.
    pub root_hash: HashBytes,
    /// Hash of the BOC encoded root cell of the referenced block.
    pub file_hash: HashBytes,
}

impl BlockRef {
    /// The number of data bits that this struct occupies.
    pub const BITS: u16 = 32 + 64 + 256 + 256;
}

impl<'a> Load<'a> for BlockRef {
    fn load_from(slice: &mut CellSlice<'a>) -> Result<Self, Error> {
        Ok(Self {
            seq_no: ok!(slice.load_u32()),
            end_lt: ok!(slice.load_u64()),
            root_hash: ok!(slice.load_u256()),
            file_hash: ok!(slice.load_u256()),
        })
    }
}
