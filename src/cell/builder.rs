use smallvec::SmallVec;

use crate::cell::{CellIndex, HashBytes, MAX_BIT_LEN, MAX_REF_COUNT};
use crate::error::Error;
use crate::util::unlikely;

/// Builder for constructing cells with densely packed data.
///
/// References are indices of cells which are already in the target [`CellTree`].
///
/// [`CellTree`]: crate::cell::CellTree
#[derive(Clone)]
pub struct CellBuilder {
    data: [u8; 128],
    bit_len: u16,
    references: SmallVec<[CellIndex; MAX_REF_COUNT]>,
}

impl Default for CellBuilder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl CellBuilder {
    /// Creates an empty cell builder.
    pub fn new() -> Self {
        Self {
            data: [0; 128],
            bit_len: 0,
            references: SmallVec::new(),
        }
    }

    /// Returns the data size of this cell in bits.
    #[inline]
    pub fn bit_len(&self) -> u16 {
        self.bit_len
    }

    /// Returns the remaining capacity in bits.
    #[inline]
    pub fn spare_bits_capacity(&self) -> u16 {
        MAX_BIT_LEN - self.bit_len
    }

    /// Returns the remaining capacity in references.
    #[inline]
    pub fn spare_refs_capacity(&self) -> u8 {
        (MAX_REF_COUNT - self.references.len()) as u8
    }

    /// Returns whether the builder has enough space for the specified
    /// number of bits and references.
    #[inline]
    pub fn has_capacity(&self, bits: u16, refs: u8) -> bool {
        self.bit_len as u32 + bits as u32 <= MAX_BIT_LEN as u32
            && self.references.len() + refs as usize <= MAX_REF_COUNT
    }

    /// Tries to store the specified number of zero bits.
    pub fn store_zeros(&mut self, bits: u16) -> Result<(), Error> {
        if unlikely(!self.has_capacity(bits, 0)) {
            return Err(Error::CellOverflow);
        }
        self.bit_len += bits;
        Ok(())
    }

    /// Tries to store one bit.
    pub fn store_bit(&mut self, bit: bool) -> Result<(), Error> {
        self.store_uint(bit as u64, 1)
    }

    /// Tries to store `bits` lowest bits of the value.
    pub fn store_uint(&mut self, value: u64, bits: u16) -> Result<(), Error> {
        if unlikely(bits > 64) {
            return Err(Error::IntOverflow);
        }
        if unlikely(!self.has_capacity(bits, 0)) {
            return Err(Error::CellOverflow);
        }

        let mut left = bits;
        while left > 0 {
            let position = self.bit_len;
            let free = 8 - position % 8;
            let take = std::cmp::min(free, left);

            let chunk = ((value >> (left - take)) & ((1u64 << take) - 1)) as u8;
            self.data[(position / 8) as usize] |= chunk << (free - take);

            self.bit_len += take;
            left -= take;
        }

        Ok(())
    }

    /// Tries to store `bits` lowest bits of the byte.
    pub fn store_small_uint(&mut self, value: u8, bits: u16) -> Result<(), Error> {
        if unlikely(bits > 8) {
            return Err(Error::IntOverflow);
        }
        self.store_uint(value as u64, bits)
    }

    /// Tries to store `u8` in the cell.
    #[inline]
    pub fn store_u8(&mut self, value: u8) -> Result<(), Error> {
        self.store_uint(value as u64, 8)
    }

    /// Tries to store `u16` in the cell.
    #[inline]
    pub fn store_u16(&mut self, value: u16) -> Result<(), Error> {
        self.store_uint(value as u64, 16)
    }

    /// Tries to store `u32` in the cell.
    #[inline]
    pub fn store_u32(&mut self, value: u32) -> Result<(), Error> {
        self.store_uint(value as u64, 32)
    }

    /// Tries to store `i32` in the cell.
    #[inline]
    pub fn store_i32(&mut self, value: i32) -> Result<(), Error> {
        self.store_uint(value as u32 as u64, 32)
    }

    /// Tries to store `u64` in the cell.
    #[inline]
    pub fn store_u64(&mut self, value: u64) -> Result<(), Error> {
        self.store_uint(value, 64)
    }

    /// Tries to store a length-prefixed big-endian integer using
    /// the minimal number of bytes.
    pub fn store_var_uint(&mut self, value: u128, len_bits: u16) -> Result<(), Error> {
        let len = 16 - value.leading_zeros() as u16 / 8;
        if unlikely(len_bits > 8 || (len as u32) >= (1u32 << len_bits)) {
            return Err(Error::IntOverflow);
        }
        if unlikely(!self.has_capacity(len_bits + len * 8, 0)) {
            return Err(Error::CellOverflow);
        }

        ok!(self.store_uint(len as u64, len_bits));
        let bytes = value.to_be_bytes();
        self.store_raw(&bytes[16 - len as usize..], len * 8)
    }

    /// Tries to store bytes in the cell.
    pub fn store_raw(&mut self, value: &[u8], bits: u16) -> Result<(), Error> {
        if unlikely((bits as usize + 7) / 8 > value.len()) {
            return Err(Error::UnexpectedEndOfData);
        }
        if unlikely(!self.has_capacity(bits, 0)) {
            return Err(Error::CellOverflow);
        }

        let mut left = bits;
        for byte in value {
            if left == 0 {
                break;
            }
            let take = std::cmp::min(8, left);
            ok!(self.store_uint((*byte >> (8 - take)) as u64, take));
            left -= take;
        }
        Ok(())
    }

    /// Tries to store 32 bytes in the cell.
    #[inline]
    pub fn store_u256(&mut self, value: &HashBytes) -> Result<(), Error> {
        self.store_raw(value.as_slice(), 256)
    }

    /// Tries to store a child in the cell.
    pub fn store_reference(&mut self, cell: CellIndex) -> Result<(), Error> {
        if unlikely(!self.has_capacity(0, 1)) {
            return Err(Error::CellOverflow);
        }
        self.references.push(cell);
        Ok(())
    }

    pub(crate) fn into_parts(self) -> (u16, [u8; 128], SmallVec<[CellIndex; MAX_REF_COUNT]>) {
        (self.bit_len, self.data, self.references)
    }
}

impl std::fmt::Debug for CellBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let byte_len = (self.bit_len as usize + 7) / 8;
        f.debug_struct("CellBuilder")
            .field("data", &hex::encode(&self.data[..byte_len]))
            .field("bit_len", &self.bit_len)
            .field("references", &self.references)
            .finish()
    }
}
