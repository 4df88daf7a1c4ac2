use crate::cell::{CellRef, HashBytes};
use crate::error::Error;
use crate::util::unlikely;

/// A read-only cursor over the data and references of a cell.
///
/// Every successful load advances the cursor, a failed load leaves it as is.
/// The cursor can not be copied or moved back.
pub struct CellSlice<'a> {
    cell: CellRef<'a>,
    bits_offset: u16,
    refs_offset: u8,
}

impl<'a> CellSlice<'a> {
    /// Constructs a new cell slice from the specified cell.
    #[inline]
    pub fn new(cell: CellRef<'a>) -> Self {
        Self {
            cell,
            bits_offset: 0,
            refs_offset: 0,
        }
    }

    /// Returns a reference to the underlying cell.
    #[inline]
    pub fn cell(&self) -> CellRef<'a> {
        self.cell
    }

    /// Returns the number of remaining bits of data in the slice.
    #[inline]
    pub fn remaining_bits(&self) -> u16 {
        self.cell.bit_len().saturating_sub(self.bits_offset)
    }

    /// Returns the number of remaining references in the slice.
    #[inline]
    pub fn remaining_refs(&self) -> u8 {
        self.cell.reference_count().saturating_sub(self.refs_offset)
    }

    /// Returns the start of the data window.
    #[inline]
    pub fn bits_offset(&self) -> u16 {
        self.bits_offset
    }

    /// Returns the start of the references window.
    #[inline]
    pub fn refs_offset(&self) -> u8 {
        self.refs_offset
    }

    /// Returns whether there are no data bits left.
    #[inline]
    pub fn is_data_empty(&self) -> bool {
        self.remaining_bits() == 0
    }

    /// Returns whether there are no references left.
    #[inline]
    pub fn is_refs_empty(&self) -> bool {
        self.remaining_refs() == 0
    }

    /// Returns whether there are at least the specified number of bits
    /// and references left.
    #[inline]
    pub fn has_remaining(&self, bits: u16, refs: u8) -> bool {
        bits <= self.remaining_bits() && refs <= self.remaining_refs()
    }

    /// Tries to advance the start of the data window.
    pub fn skip_bits(&mut self, bits: u16) -> Result<(), Error> {
        if unlikely(bits > self.remaining_bits()) {
            return Err(Error::UnexpectedEndOfData);
        }
        self.bits_offset += bits;
        Ok(())
    }

    /// Reads a bit at the specified offset without advancing the cursor.
    pub fn get_bit(&self, offset: u16) -> Result<bool, Error> {
        if unlikely(offset >= self.remaining_bits()) {
            return Err(Error::UnexpectedEndOfData);
        }
        let position = self.bits_offset + offset;
        let byte = self.cell.data()[(position / 8) as usize];
        Ok(byte & (0x80 >> (position % 8)) != 0)
    }

    /// Reads the next bit.
    pub fn load_bit(&mut self) -> Result<bool, Error> {
        let bit = ok!(self.get_bit(0));
        self.bits_offset += 1;
        Ok(bit)
    }

    /// Reads an unsigned integer of up to 64 bits at the specified offset
    /// without advancing the cursor.
    pub fn get_uint(&self, offset: u16, bits: u16) -> Result<u64, Error> {
        if unlikely(bits > 64) {
            return Err(Error::IntOverflow);
        }
        if unlikely(offset as u32 + bits as u32 > self.remaining_bits() as u32) {
            return Err(Error::UnexpectedEndOfData);
        }

        let data = self.cell.data();
        let mut position = self.bits_offset + offset;
        let mut left = bits;
        let mut result = 0u64;

        while left > 0 {
            let byte = data[(position / 8) as usize];
            let shift = position % 8;
            let take = std::cmp::min(8 - shift, left);

            // Bits of the current byte which are still unread, aligned to the right
            let chunk = (byte << shift) >> (8 - take);
            result = (result << take) | chunk as u64;

            position += take;
            left -= take;
        }

        Ok(result)
    }

    /// Reads an unsigned integer of up to 64 bits.
    pub fn load_uint(&mut self, bits: u16) -> Result<u64, Error> {
        let value = ok!(self.get_uint(0, bits));
        self.bits_offset += bits;
        Ok(value)
    }

    /// Reads an unsigned integer of up to 8 bits.
    pub fn load_small_uint(&mut self, bits: u16) -> Result<u8, Error> {
        if unlikely(bits > 8) {
            return Err(Error::IntOverflow);
        }
        self.load_uint(bits).map(|value| value as u8)
    }

    /// Reads the next `u8`.
    #[inline]
    pub fn load_u8(&mut self) -> Result<u8, Error> {
        self.load_uint(8).map(|value| value as u8)
    }

    /// Reads the next `u16`.
    #[inline]
    pub fn load_u16(&mut self) -> Result<u16, Error> {
        self.load_uint(16).map(|value| value as u16)
    }

    /// Reads the next `u32`.
    #[inline]
    pub fn load_u32(&mut self) -> Result<u32, Error> {
        self.load_uint(32).map(|value| value as u32)
    }

    /// Reads the next `i32` in two's complement.
    #[inline]
    pub fn load_i32(&mut self) -> Result<i32, Error> {
        self.load_uint(32).map(|value| value as u32 as i32)
    }

    /// Reads the next `u64`.
    #[inline]
    pub fn load_u64(&mut self) -> Result<u64, Error> {
        self.load_uint(64)
    }

    /// Reads a length-prefixed big-endian integer of up to 16 bytes.
    ///
    /// `len_bits` is the width of the byte length prefix.
    pub fn load_var_uint(&mut self, len_bits: u16) -> Result<u128, Error> {
        if unlikely(len_bits > 8) {
            return Err(Error::IntOverflow);
        }
        let len = ok!(self.get_uint(0, len_bits)) as u16;
        if unlikely(len > 16) {
            return Err(Error::IntOverflow);
        }

        let mut bytes = [0u8; 16];
        let value_bits = len * 8;
        if unlikely(len_bits + value_bits > self.remaining_bits()) {
            return Err(Error::UnexpectedEndOfData);
        }
        let mut offset = len_bits;
        for byte in &mut bytes[16 - len as usize..] {
            *byte = ok!(self.get_uint(offset, 8)) as u8;
            offset += 8;
        }

        self.bits_offset += len_bits + value_bits;
        Ok(u128::from_be_bytes(bytes))
    }

    /// Reads the specified number of bits into the beginning of the buffer.
    ///
    /// Bits of the last byte past the requested length are zero.
    pub fn load_raw<'b>(&mut self, buffer: &'b mut [u8], bits: u16) -> Result<&'b [u8], Error> {
        let byte_len = ((bits as usize) + 7) / 8;
        if unlikely(byte_len > buffer.len()) {
            return Err(Error::CellOverflow);
        }
        if unlikely(bits > self.remaining_bits()) {
            return Err(Error::UnexpectedEndOfData);
        }

        let mut offset = 0;
        for byte in &mut buffer[..byte_len] {
            let take = std::cmp::min(8, bits - offset);
            // NOTE: bounds were checked above
            let value = ok!(self.get_uint(offset, take)) as u8;
            *byte = value << (8 - take);
            offset += take;
        }

        self.bits_offset += bits;
        Ok(&buffer[..byte_len])
    }

    /// Reads the next 256 bits as a hash.
    pub fn load_u256(&mut self) -> Result<HashBytes, Error> {
        let mut result = HashBytes::ZERO;
        ok!(self.load_raw(&mut result.0, 256));
        Ok(result)
    }

    /// Returns the next child cell without advancing the cursor.
    pub fn get_reference(&self, index: u8) -> Result<CellRef<'a>, Error> {
        if unlikely(index >= self.remaining_refs()) {
            return Err(Error::UnexpectedEndOfData);
        }
        match self.cell.reference(self.refs_offset + index) {
            Some(cell) => Ok(cell),
            None => Err(Error::UnexpectedEndOfData),
        }
    }

    /// Returns the next child cell and advances the references window.
    pub fn load_reference(&mut self) -> Result<CellRef<'a>, Error> {
        let cell = ok!(self.get_reference(0));
        self.refs_offset += 1;
        Ok(cell)
    }

    /// Returns a cursor over the next child cell.
    #[inline]
    pub fn load_reference_as_slice(&mut self) -> Result<CellSlice<'a>, Error> {
        self.load_reference().map(CellSlice::new)
    }

    /// Advances the references window.
    pub fn skip_references(&mut self, refs: u8) -> Result<(), Error> {
        if unlikely(refs > self.remaining_refs()) {
            return Err(Error::UnexpectedEndOfData);
        }
        self.refs_offset += refs;
        Ok(())
    }

    /// Loads the value of the specified type.
    #[inline]
    pub fn load<T: crate::cell::Load<'a>>(&mut self) -> Result<T, Error> {
        T::load_from(self)
    }
}

impl std::fmt::Debug for CellSlice<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CellSlice")
            .field("cell", &self.cell)
            .field("bits_offset", &self.bits_offset)
            .field("refs_offset", &self.refs_offset)
            .finish()
    }
}
