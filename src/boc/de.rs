use smallvec::SmallVec;

use super::BocTag;
use crate::cell::{CellDescriptor, CellTree, MAX_REF_COUNT};
use crate::util::{read_be_uint, unlikely};

/// Parsed BOC header.
pub struct BocHeader<'a> {
    ref_size: usize,
    cells: Vec<&'a [u8]>,
    roots: SmallVec<[u32; ROOTS_ON_STACK]>,
}

impl<'a> BocHeader<'a> {
    /// Parses the header and splits the payload into cells.
    ///
    /// Only the framing is checked here, references are
    /// validated by [`finalize`](Self::finalize).
    pub fn decode(data: &'a [u8]) -> Result<Self, Error> {
        let mut reader = BocReader::new(data);

        // magic:u32 flags:u8 offset_size:u8
        let (magic, flags, offset_size) = match reader.read_bytes(6) {
            Some(&[a, b, c, d, flags, offset_size]) => ([a, b, c, d], flags, offset_size as usize),
            _ => return Err(Error::UnexpectedEof),
        };
        let format = match BocTag::from_bytes(magic) {
            Some(tag) => Format::new(tag, flags),
            None => return Err(Error::UnknownBocTag),
        };
        let ref_size = format.ref_size;

        if unlikely(format.has_cache_bits && !format.has_index) {
            return Err(Error::InvalidHeader);
        }
        if unlikely(!(1..=4).contains(&ref_size)) {
            return Err(Error::InvalidRefSize);
        }
        if unlikely(!(1..=8).contains(&offset_size)) {
            return Err(Error::InvalidOffsetSize);
        }

        // cells:{ref_size} roots:{ref_size} absent:{ref_size} tot_cells_size:{offset_size}
        if unlikely(!reader.require(ref_size * 3 + offset_size)) {
            return Err(Error::InvalidHeader);
        }
        let cell_count = ok!(reader.read_be_uint(ref_size)) as usize;
        let root_count = ok!(reader.read_be_uint(ref_size)) as usize;
        let absent_count = ok!(reader.read_be_uint(ref_size)) as usize;
        let total_cells_size = ok!(reader.read_be_uint(offset_size));

        match root_count {
            0 => return Err(Error::RootCellNotFound),
            1 => {}
            _ if format.multiple_roots => return Err(Error::TooManyRootCells),
            _ => return Err(Error::UnexpectedMultipleRoots),
        }
        if unlikely(root_count + absent_count > cell_count) {
            return Err(Error::TooManyRootCells);
        }
        if unlikely(absent_count != 0) {
            return Err(Error::AbsentCellsNotSupported);
        }

        // Each cell takes at least a descriptor and every cell except
        // the root is referenced at least once.
        let cell_count_u64 = cell_count as u64;
        let min_size = cell_count_u64 * 2 + (cell_count_u64 - 1) * ref_size as u64;
        // Descriptor, four stored hashes with depths, data and references.
        let max_cell_size = 2 + 4 * (32 + 2) + 128 + (MAX_REF_COUNT * ref_size) as u64;
        if unlikely(total_cells_size < min_size || total_cells_size > cell_count_u64 * max_cell_size)
        {
            return Err(Error::InvalidTotalSize);
        }

        let root = if format.multiple_roots {
            let index = ok!(reader.read_be_uint(ref_size));
            if unlikely(index >= cell_count_u64) {
                return Err(Error::RootOutOfBounds);
            }
            index as u32
        } else {
            0
        };

        let index_size = format.has_index as u64 * cell_count_u64 * offset_size as u64;
        let crc_size = format.has_crc as u64 * 4;
        if unlikely(!reader.require_u64(index_size + total_cells_size + crc_size)) {
            return Err(Error::UnexpectedEof);
        }
        // The index is only an optimization for random access
        reader.advance(index_size as usize);

        let cells_start = reader.offset;
        let mut cells = Vec::with_capacity(cell_count);
        for _ in 0..cell_count {
            cells.push(ok!(reader.read_cell(ref_size)));
        }
        if cells_start as u64 + total_cells_size != reader.offset as u64 {
            return Err(Error::InvalidTotalSize);
        }

        if format.has_crc {
            let end = reader.offset;
            let stored = match reader.read_bytes(4) {
                Some(&[a, b, c, d]) => u32::from_le_bytes([a, b, c, d]),
                _ => return Err(Error::UnexpectedEof),
            };
            if crc32c::crc32c(&data[..end]) != stored {
                return Err(Error::InvalidChecksum);
            }
        }

        let mut roots = SmallVec::new();
        roots.push(root);
        Ok(Self {
            ref_size,
            cells,
            roots,
        })
    }

    /// Assembles the cell arena from the cell slices.
    ///
    /// Cells are added in reverse order, so the child of the BOC cell `i`
    /// must have an index greater than `i`.
    pub fn finalize(&self) -> Result<CellTree, Error> {
        let ref_size = self.ref_size;
        let cell_count = self.cells.len() as u32;

        let mut tree = CellTree::with_capacity(cell_count as usize);

        for (boc_index, cell) in self.cells.iter().enumerate().rev() {
            let descriptor = CellDescriptor::new([cell[0], cell[1]]);
            let byte_len = descriptor.byte_len() as usize;

            let mut offset = 2;
            if unlikely(descriptor.store_hashes()) {
                offset += (32 + 2) * (descriptor.level() as usize + 1);
            }

            let data = &cell[offset..offset + byte_len];
            offset += byte_len;

            let bit_len = if descriptor.is_aligned() {
                (byte_len * 8) as u16
            } else if let Some(last) = data.last() {
                byte_len as u16 * 8 - last.trailing_zeros() as u16 - 1
            } else {
                0
            };

            let mut references = SmallVec::<[u32; MAX_REF_COUNT]>::new();
            for _ in 0..descriptor.reference_count() {
                let child_index = read_be_uint(&cell[offset..offset + ref_size]) as u32;
                if unlikely(child_index >= cell_count) {
                    return Err(Error::InvalidRef);
                }
                if unlikely(child_index as usize <= boc_index) {
                    return Err(Error::InvalidRefOrder);
                }
                references.push(cell_count - child_index - 1);
                offset += ref_size;
            }

            if tree.push_raw(descriptor, bit_len, data, references).is_err() {
                return Err(Error::InvalidCell);
            }
        }

        if let Some(root) = self.roots.first() {
            let index = crate::cell::CellIndex::from_raw(cell_count - *root - 1);
            if tree.set_root(index).is_err() {
                return Err(Error::RootOutOfBounds);
            }
        }

        Ok(tree)
    }

    /// Size of the cell index in bytes (`1..=4`).
    pub fn ref_size(&self) -> usize {
        self.ref_size
    }

    /// Raw cells in BOC order.
    pub fn cells(&self) -> &[&'a [u8]] {
        &self.cells
    }

    /// BOC indices of the root cells.
    pub fn roots(&self) -> &[u32] {
        &self.roots
    }
}

/// Bounds checked cursor over the serialized bytes.
struct BocReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> BocReader<'a> {
    #[inline(always)]
    const fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    #[inline(always)]
    fn require(&self, len: usize) -> bool {
        self.offset.saturating_add(len) <= self.data.len()
    }

    #[inline(always)]
    fn require_u64(&self, len: u64) -> bool {
        (self.offset as u64).saturating_add(len) <= self.data.len() as u64
    }

    #[inline(always)]
    fn advance(&mut self, bytes: usize) {
        self.offset += bytes;
    }

    fn read_bytes(&mut self, len: usize) -> Option<&'a [u8]> {
        let bytes = self.data.get(self.offset..self.offset.checked_add(len)?)?;
        self.offset += len;
        Some(bytes)
    }

    /// Reads a raw cell with its descriptor.
    fn read_cell(&mut self, ref_size: usize) -> Result<&'a [u8], Error> {
        let start = self.offset;
        let descriptor = match self.read_bytes(2) {
            Some(&[d1, d2]) => CellDescriptor::new([d1, d2]),
            _ => return Err(Error::UnexpectedEof),
        };

        let ref_count = descriptor.reference_count() as usize;
        if unlikely(ref_count == CellDescriptor::REF_COUNT_MASK as usize) {
            return Err(Error::AbsentCellsNotSupported);
        }
        if unlikely(ref_count > MAX_REF_COUNT) {
            return Err(Error::InvalidRef);
        }

        let hashes_len = if unlikely(descriptor.store_hashes()) {
            let level = descriptor.level() as usize;
            // Pruned branches never store hashes
            if descriptor.is_exotic() && ref_count == 0 && level > 0 {
                return Err(Error::UnnormalizedCell);
            }
            (32 + 2) * (level + 1)
        } else {
            0
        };

        let data_len = descriptor.byte_len() as usize;
        let Some(body) = self.read_bytes(hashes_len + data_len + ref_count * ref_size) else {
            return Err(Error::UnexpectedEof);
        };

        // The completion tag must be the last set bit of the last byte
        if !descriptor.is_aligned() {
            match data_len.checked_sub(1).and_then(|i| body.get(hashes_len + i)) {
                Some(last) if last & 0x7f != 0 => {}
                _ => return Err(Error::UnnormalizedCell),
            }
        }

        Ok(&self.data[start..self.offset])
    }

    fn read_be_uint(&mut self, size: usize) -> Result<u64, Error> {
        match self.read_bytes(size) {
            Some(bytes) => Ok(read_be_uint(bytes)),
            None => Err(Error::UnexpectedEof),
        }
    }
}

const ROOTS_ON_STACK: usize = 2;

/// Layout options selected by the magic and the flags byte.
struct Format {
    has_index: bool,
    has_crc: bool,
    has_cache_bits: bool,
    multiple_roots: bool,
    ref_size: usize,
}

impl Format {
    fn new(tag: BocTag, flags: u8) -> Self {
        match tag {
            // Legacy formats store the reference size in the whole flags byte
            BocTag::Indexed | BocTag::IndexedCrc32 => Self {
                has_index: true,
                has_crc: tag == BocTag::IndexedCrc32,
                has_cache_bits: false,
                multiple_roots: false,
                ref_size: flags as usize,
            },
            // has_idx:1 has_crc32c:1 has_cache_bits:1 flags:2 size:3
            BocTag::Generic => Self {
                has_index: flags & 0x80 != 0,
                has_crc: flags & 0x40 != 0,
                has_cache_bits: flags & 0x20 != 0,
                multiple_roots: true,
                ref_size: (flags & 0x07) as usize,
            },
        }
    }
}

/// BOC framing error.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// Input ended in the middle of a structure.
    #[error("unexpected end of BOC")]
    UnexpectedEof,
    /// Payload is not a valid hex or base64 string.
    #[error("invalid BOC encoding")]
    InvalidEncoding,
    /// Unknown magic.
    #[error("unknown BOC tag")]
    UnknownBocTag,
    /// Contradicting header flags or truncated header.
    #[error("invalid BOC header")]
    InvalidHeader,
    /// Reference size is not in `1..=4`.
    #[error("invalid reference size")]
    InvalidRefSize,
    /// Offset size is not in `1..=8`.
    #[error("invalid offset size")]
    InvalidOffsetSize,
    /// Zero roots.
    #[error("no root cells")]
    RootCellNotFound,
    /// Several roots in a legacy single root format.
    #[error("multiple roots in a single root format")]
    UnexpectedMultipleRoots,
    /// More than one root, or more roots than cells.
    #[error("too many root cells")]
    TooManyRootCells,
    /// Absent cells are present.
    #[error("absent cells are not supported")]
    AbsentCellsNotSupported,
    /// Declared size of the cells section does not match.
    #[error("invalid total cells size")]
    InvalidTotalSize,
    /// Root index is not less than the cell count.
    #[error("root index out of bounds")]
    RootOutOfBounds,
    /// Reference count above 4 or reference index out of bounds.
    #[error("invalid cell reference")]
    InvalidRef,
    /// Missing completion tag or stored hashes of a pruned branch.
    #[error("unnormalized cell")]
    UnnormalizedCell,
    /// Reference to the same or a preceding cell.
    #[error("cell references must point forward")]
    InvalidRefOrder,
    /// Cell does not fit into the arena limits.
    #[error("invalid cell")]
    InvalidCell,
    /// CRC32-C mismatch.
    #[error("invalid checksum")]
    InvalidChecksum,
}
