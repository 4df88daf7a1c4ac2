//! Block models.

use std::collections::BTreeMap;

use crate::cell::*;
use crate::error::Error;
use crate::models::currency::CurrencyCollection;
use crate::models::global_version::{GlobalVersion, GlobalVersionTag};
use crate::models::{load_dict_root, Deferred, Opaque, TlbTag};
use crate::num::Tokens;

pub use self::block_id::*;

mod block_id;


decl_tlb_tag! {
    /// Constructor tag of [`Block`].
    pub enum BlockTag("Block", 32) {
        /// `block#11ef55aa`
        V1 = 0x11ef55aa,
        /// `block#11ef55bb`
        V2 = 0x11ef55bb,
    }
}

/// Shard block.
#[derive(Debug, Clone, Eq, PartialEq, serde::Serialize)]
pub struct Block {
    /// Block constructor.
    pub tag: BlockTag,
    /// Global network id.
    pub global_id: i32,
    /// Block info.
    pub info: BlockInfo,
    /// Tokens flow info.
    pub value_flow: ValueFlow,
    /// Merkle update for the shard state.
    pub state_update: Deferred<Opaque>,
    /// Block content.
    pub extra: Deferred<Opaque>,
}

impl Block {
    /// Returns the Merkle update for the shard state.
    ///
    /// Always fails since the update is not decoded.
    pub fn state_update(&self) -> Result<&Opaque, Error> {
        self.state_update.get("Block", "state_update")
    }

    /// Returns the block content.
    ///
    /// Always fails since the content is not decoded.
    pub fn extra(&self) -> Result<&Opaque, Error> {
        self.extra.get("Block", "extra")
    }
}

impl<'a> Load<'a> for Block {
    fn load_from(slice: &mut CellSlice<'a>) -> Result<Self, Error> {
        let tag = ok!(BlockTag::load_tag(slice));
        let global_id = ok!(slice.load_i32());
        let info = ok!(ok!(slice.load_reference()).parse::<BlockInfo>());
        let value_flow = ok!(ok!(slice.load_reference()).parse::<ValueFlow>());

        // The remaining references are never read, so a block without them
        // is still accepted.
        Ok(Self {
            tag,
            global_id,
            info,
            value_flow,
            state_update: Deferred::NotDecoded,
            extra: Deferred::NotDecoded,
        })
    }
}

decl_tlb_tag! {
    /// Constructor tag of [`BlockInfo`].
    pub enum BlockInfoTag("BlockInfo", 32) {
        /// `block_info#9bc7a987`
        V1 = 0x9bc7a987,
        /// `block_info#9bc7a988` with the milliseconds part of the timestamp.
        WithMs = 0x9bc7a988,
    }
}

/// Block info.
#[derive(Debug, Clone, Eq, PartialEq, serde::Serialize)]
pub struct BlockInfo {
    /// Block info constructor.
    pub tag: BlockInfoTag,
    /// Block model version.
    pub version: u32,
    /// Whether this block is not in the masterchain.
    pub not_master: bool,
    /// Whether this block was produced after the shards were merged.
    pub after_merge: bool,
    /// Whether this block was produced before the shards split.
    pub before_split: bool,
    /// Whether this block was produced after the shards split.
    pub after_split: bool,
    /// Hint that the shard with this block should split.
    pub want_split: bool,
    /// Hint that the shard with this block should merge.
    pub want_merge: bool,
    /// Whether this block is a key block.
    pub key_block: bool,
    /// Whether the vertical sequence number was incremented.
    pub vert_seqno_incr: bool,

    /// Block flags (currently only bit 0 is used, for [`gen_software`])
    ///
    /// [`gen_software`]: Self::gen_software
    pub flags: u8,
    /// Block sequence number.
    pub seq_no: u32,
    /// Block vertical sequence number.
    pub vert_seq_no: u32,

    /// Shard id where this block was produced.
    pub shard: ShardIdent,
    /// Unix timestamp when the block was created.
    pub gen_utime: u32,
    /// Milliseconds part of the timestamp (zero for [`BlockInfoTag::V1`]).
    pub gen_utime_ms: u16,
    /// Logical time range start.
    pub start_lt: u64,
    /// Logical time range end.
    pub end_lt: u64,
    /// Last 4 bytes of the hash of the validator list.
    pub gen_validator_list_hash_short: u32,
    /// Seqno of the catchain session where this block was produced.
    pub gen_catchain_seqno: u32,
    /// Minimal referenced seqno of the masterchain block.
    pub min_ref_mc_seqno: u32,
    /// Previous key block seqno.
    pub prev_key_block_seqno: u32,
    /// The version and capabilities of the software that created this block.
    pub gen_software: Option<GlobalVersion>,

    /// Reference to the masterchain block which was used during the creation of this block.
    pub master_ref: Option<BlockRef>,
    /// Reference to the previous block.
    pub prev_ref: BlockRef,
    /// Reference to the previous vertical block (not decoded).
    pub prev_vert_ref: Deferred<BlockRef>,
}

impl BlockInfo {
    const FLAG_WITH_GEN_SOFTWARE: u8 = 0x1;

    /// Returns `true` if this block was produced in the masterchain.
    #[inline]
    pub fn is_masterchain(&self) -> bool {
        !self.not_master
    }

    /// Returns the reference to the previous vertical block.
    ///
    /// Always fails since the reference is not decoded.
    pub fn prev_vert_ref(&self) -> Result<&BlockRef, Error> {
        self.prev_vert_ref.get("BlockInfo", "prev_vert_ref")
    }

    /// Returns the generation time in milliseconds.
    pub fn gen_utime_ms_full(&self) -> u64 {
        self.gen_utime as u64 * 1000 + self.gen_utime_ms as u64
    }
}

impl<'a> Load<'a> for BlockInfo {
    fn load_from(slice: &mut CellSlice<'a>) -> Result<Self, Error> {
        let tag = ok!(BlockInfoTag::load_tag(slice));

        let version = ok!(slice.load_u32());
        let packed_flags = ok!(slice.load_u8());
        let flags = ok!(slice.load_u8());
        let seq_no = ok!(slice.load_u32());
        let vert_seq_no = ok!(slice.load_u32());
        let shard = ok!(ShardIdent::load_from(slice));
        let gen_utime = ok!(slice.load_u32());
        let gen_utime_ms = match tag {
            BlockInfoTag::V1 => 0,
            BlockInfoTag::WithMs => ok!(slice.load_u16()),
        };
        let start_lt = ok!(slice.load_u64());
        let end_lt = ok!(slice.load_u64());
        let gen_validator_list_hash_short = ok!(slice.load_u32());
        let gen_catchain_seqno = ok!(slice.load_u32());
        let min_ref_mc_seqno = ok!(slice.load_u32());
        let prev_key_block_seqno = ok!(slice.load_u32());

        // The sub-tag is read even without the flag, an unknown
        // sub-tag just leaves the software info empty.
        let gen_software = match slice.get_uint(0, GlobalVersionTag::BITS) {
            Ok(sub_tag)
                if flags & Self::FLAG_WITH_GEN_SOFTWARE != 0
                    && GlobalVersionTag::from_raw(sub_tag as u32).is_some() =>
            {
                Some(ok!(GlobalVersion::load_from(slice)))
            }
            Ok(_) => {
                ok!(slice.skip_bits(GlobalVersionTag::BITS));
                None
            }
            Err(_) => None,
        };

        let not_master = packed_flags & 0b1000_0000 != 0;
        let after_merge = packed_flags & 0b0100_0000 != 0;

        let master_ref = if not_master {
            Some(ok!(ok!(slice.load_reference()).parse::<BlockRef>()))
        } else {
            None
        };

        let prev_ref = ok!(ok!(slice.load_reference()).parse::<BlockRef>());

        Ok(Self {
            tag,
            version,
            not_master,
            after_merge,
            before_split: packed_flags & 0b0010_0000 != 0,
            after_split: packed_flags & 0b0001_0000 != 0,
            want_split: packed_flags & 0b0000_1000 != 0,
            want_merge: packed_flags & 0b0000_0100 != 0,
            key_block: packed_flags & 0b0000_0010 != 0,
            vert_seqno_incr: packed_flags & 0b0000_0001 != 0,
            flags,
            seq_no,
            vert_seq_no,
            shard,
            gen_utime,
            gen_utime_ms,
            start_lt,
            end_lt,
            gen_validator_list_hash_short,
            gen_catchain_seqno,
            min_ref_mc_seqno,
            prev_key_block_seqno,
            gen_software,
            master_ref,
            prev_ref,
            prev_vert_ref: Deferred::NotDecoded,
        })
    }
}

decl_tlb_tag! {
    /// Constructor tag of [`ValueFlow`].
    pub enum ValueFlowTag("ValueFlow", 32) {
        /// `value_flow#b8e48dfb`
        V1 = 0xb8e48dfb,
        /// `value_flow_v2#e0864f6d` with copyleft rewards.
        WithCopyleft = 0xe0864f6d,
    }
}

/// Copyleft rewards, keyed by the account address.
pub type CopyleftRewards = BTreeMap<HashBytes, Tokens>;

/// Tokens flow info.
#[derive(Debug, Clone, Eq, PartialEq, serde::Serialize)]
pub struct ValueFlow {
    /// Value flow constructor.
    pub tag: ValueFlowTag,
    /// Total amount transferred from the previous block.
    pub from_prev_block: CurrencyCollection,
    /// Total amount transferred to the next block.
    pub to_next_block: CurrencyCollection,
    /// Sum of all imported amounts from messages.
    pub imported: CurrencyCollection,
    /// Sum of all exported amounts of messages.
    pub exported: CurrencyCollection,

    /// Total fees collected in this block.
    pub fees_collected: CurrencyCollection,
    /// Fees imported from shard blocks.
    pub fees_imported: CurrencyCollection,
    /// Amount recovered from the fee collector.
    pub recovered: CurrencyCollection,
    /// Block creation fees.
    pub created: CurrencyCollection,
    /// Minted extra currencies.
    pub minted: CurrencyCollection,
    /// Copyleft rewards.
    pub copyleft_rewards: Deferred<CopyleftRewards>,
}

impl ValueFlow {
    /// Returns copyleft rewards.
    pub fn copyleft_rewards(&self) -> Result<&CopyleftRewards, Error> {
        self.copyleft_rewards.get("ValueFlow", "copyleft_rewards")
    }
}

impl<'a> Load<'a> for ValueFlow {
    fn load_from(slice: &mut CellSlice<'a>) -> Result<Self, Error> {
        let tag = ok!(ValueFlowTag::load_tag(slice));

        let fees_collected = ok!(CurrencyCollection::load_from(slice));
        let slice1 = &mut ok!(slice.load_reference_as_slice());
        let slice2 = &mut ok!(slice.load_reference_as_slice());
        let copyleft_rewards = match tag {
            ValueFlowTag::V1 => Deferred::Decoded(BTreeMap::new()),
            ValueFlowTag::WithCopyleft => ok!(load_dict_root(slice)),
        };

        Ok(Self {
            tag,
            from_prev_block: ok!(CurrencyCollection::load_from(slice1)),
            to_next_block: ok!(CurrencyCollection::load_from(slice1)),
            imported: ok!(CurrencyCollection::load_from(slice1)),
            exported: ok!(CurrencyCollection::load_from(slice1)),
            fees_collected,
            fees_imported: ok!(CurrencyCollection::load_from(slice2)),
            recovered: ok!(CurrencyCollection::load_from(slice2)),
            created: ok!(CurrencyCollection::load_from(slice2)),
            minted: ok!(CurrencyCollection::load_from(slice2)),
            copyleft_rewards,
        })
    }
}
