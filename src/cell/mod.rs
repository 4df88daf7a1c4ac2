//! Cell tree implementation.

use std::str::FromStr;

use smallvec::SmallVec;

pub use self::builder::CellBuilder;
pub use self::descriptor::CellDescriptor;
pub use self::slice::CellSlice;

use crate::error::Error;

mod builder;
mod descriptor;
mod slice;

/// Max cell data capacity in bits
pub const MAX_BIT_LEN: u16 = 1023;

/// Maximum number of child cells
pub const MAX_REF_COUNT: usize = 4;

/// Deserialization from a cell slice.
pub trait Load<'a>: Sized {
    /// Tries to load itself from a cell slice.
    fn load_from(slice: &mut CellSlice<'a>) -> Result<Self, Error>;
}

impl<'a> Load<'a> for bool {
    #[inline]
    fn load_from(slice: &mut CellSlice<'a>) -> Result<Self, Error> {
        slice.load_bit()
    }
}

macro_rules! impl_primitive_loads {
    ($($type:ty => |$s:ident| $expr:expr),*$(,)?) => {
        $(impl<'a> Load<'a> for $type {
            #[inline]
            fn load_from($s: &mut CellSlice<'a>) -> Result<Self, Error> {
                $expr
            }
        })*
    };
}

impl_primitive_loads! {
    u8 => |s| s.load_u8(),
    u16 => |s| s.load_u16(),
    u32 => |s| s.load_u32(),
    i32 => |s| s.load_i32(),
    u64 => |s| s.load_u64(),
    HashBytes => |s| s.load_u256(),
}

/// Index of a cell inside of a [`CellTree`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct CellIndex(u32);

impl CellIndex {
    #[inline]
    pub(crate) const fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the position of the cell in the arena.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Immutable cell data stored in the arena.
#[derive(Debug, Clone, Eq, PartialEq)]
struct CellData {
    descriptor: CellDescriptor,
    bit_len: u16,
    data: Box<[u8]>,
    references: SmallVec<[u32; MAX_REF_COUNT]>,
}

/// An arena of cells.
///
/// Cells can only reference cells which were added before them,
/// so the tree never contains loops.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct CellTree {
    cells: Vec<CellData>,
    root: Option<u32>,
}

impl CellTree {
    /// Creates an empty arena.
    #[inline]
    pub const fn new() -> Self {
        Self {
            cells: Vec::new(),
            root: None,
        }
    }

    /// Creates an empty arena with space for the specified number of cells.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: Vec::with_capacity(capacity),
            root: None,
        }
    }

    /// Returns the number of cells in the arena.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if there are no cells in the arena.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Finalizes the builder and appends it to the arena.
    pub fn add(&mut self, builder: CellBuilder) -> Result<CellIndex, Error> {
        let (bit_len, data, references) = builder.into_parts();
        self.push_raw(
            CellDescriptor::new([
                CellDescriptor::compute_d1(0, false, references.len() as u8),
                CellDescriptor::compute_d2(bit_len),
            ]),
            bit_len,
            &data,
            references.iter().map(|index| index.0),
        )
    }

    /// Appends a cell with already validated parts.
    pub(crate) fn push_raw<I>(
        &mut self,
        descriptor: CellDescriptor,
        bit_len: u16,
        data: &[u8],
        references: I,
    ) -> Result<CellIndex, Error>
    where
        I: IntoIterator<Item = u32>,
    {
        if bit_len > MAX_BIT_LEN {
            return Err(Error::CellOverflow);
        }

        let index = self.cells.len() as u32;

        let mut refs = SmallVec::new();
        for child in references {
            if child >= index || refs.len() >= MAX_REF_COUNT {
                return Err(Error::InvalidCell);
            }
            refs.push(child);
        }

        let byte_len = (bit_len as usize + 7) / 8;
        let mut data: Box<[u8]> = match data.get(..byte_len) {
            Some(data) => data.into(),
            None => return Err(Error::InvalidCell),
        };

        // Clear the completion tag and everything after the last data bit
        let rem = bit_len % 8;
        if rem != 0 {
            if let Some(last) = data.last_mut() {
                *last &= 0xff << (8 - rem);
            }
        }

        self.cells.push(CellData {
            descriptor,
            bit_len,
            data,
            references: refs,
        });
        Ok(CellIndex(index))
    }

    /// Marks the specified cell as the root of the tree.
    pub fn set_root(&mut self, index: CellIndex) -> Result<(), Error> {
        if (index.0 as usize) < self.cells.len() {
            self.root = Some(index.0);
            Ok(())
        } else {
            Err(Error::InvalidCell)
        }
    }

    /// Returns the root cell of the tree.
    ///
    /// Unless it was set explicitly, the last added cell is the root.
    pub fn root(&self) -> Option<CellRef<'_>> {
        let index = match self.root {
            Some(index) => index,
            None => (self.cells.len() as u32).checked_sub(1)?,
        };
        self.cell(CellIndex(index))
    }

    /// Returns a handle to the cell with the specified index.
    pub fn cell(&self, index: CellIndex) -> Option<CellRef<'_>> {
        if (index.0 as usize) < self.cells.len() {
            Some(CellRef {
                tree: self,
                index: index.0,
            })
        } else {
            None
        }
    }
}

/// A handle to a cell inside of a [`CellTree`].
#[derive(Clone, Copy)]
pub struct CellRef<'a> {
    tree: &'a CellTree,
    index: u32,
}

impl<'a> CellRef<'a> {
    #[inline]
    fn inner(&self) -> &'a CellData {
        // NOTE: handles are only created for existing entries
        &self.tree.cells[self.index as usize]
    }

    /// Returns the index of this cell in the arena.
    #[inline]
    pub fn index(&self) -> CellIndex {
        CellIndex(self.index)
    }

    /// Returns the cell descriptor.
    #[inline]
    pub fn descriptor(&self) -> CellDescriptor {
        self.inner().descriptor
    }

    /// Returns whether the cell is not ordinary.
    #[inline]
    pub fn is_exotic(&self) -> bool {
        self.inner().descriptor.is_exotic()
    }

    /// Returns the raw data of this cell.
    ///
    /// Bits past [`bit_len`] are always zero.
    ///
    /// [`bit_len`]: Self::bit_len
    #[inline]
    pub fn data(&self) -> &'a [u8] {
        &self.inner().data
    }

    /// Returns the data size of this cell in bits.
    #[inline]
    pub fn bit_len(&self) -> u16 {
        self.inner().bit_len
    }

    /// Returns the number of child cells.
    #[inline]
    pub fn reference_count(&self) -> u8 {
        self.inner().references.len() as u8
    }

    /// Returns a handle to the Nth child cell.
    pub fn reference(&self, index: u8) -> Option<CellRef<'a>> {
        let child = *self.inner().references.get(index as usize)?;
        Some(CellRef {
            tree: self.tree,
            index: child,
        })
    }

    /// Creates a new cursor over this cell.
    #[inline]
    pub fn as_slice(&self) -> CellSlice<'a> {
        CellSlice::new(*self)
    }

    /// Tries to parse the cell as the specified type.
    pub fn parse<T: Load<'a>>(&self) -> Result<T, Error> {
        T::load_from(&mut self.as_slice())
    }

    /// Returns an object which will display cell data as a bitstring
    /// with a termination bit.
    #[inline]
    pub fn display_data(&self) -> DisplayCellData<'a> {
        DisplayCellData(*self)
    }

    /// Returns an object which will display all cells of the subtree.
    #[inline]
    pub fn display_tree(&self) -> DisplayCellTree<'a> {
        DisplayCellTree(*self)
    }
}

impl std::fmt::Debug for CellRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CellRef")
            .field("index", &self.index)
            .field("bit_len", &self.bit_len())
            .field("references", &self.reference_count())
            .finish()
    }
}

/// Helper struct to print the cell data.
#[derive(Clone, Copy)]
pub struct DisplayCellData<'a>(CellRef<'a>);

impl std::fmt::Display for DisplayCellData<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cell = self.0;
        let bit_len = cell.bit_len();
        let data = cell.data();

        if bit_len % 8 == 0 {
            return std::fmt::Display::fmt(&hex::encode(data), f);
        }

        // Append the completion tag
        let mut data = data.to_vec();
        if let Some(last) = data.last_mut() {
            *last |= 1 << (7 - bit_len % 8);
        }
        let mut result = hex::encode(&data);
        if bit_len % 8 <= 3 {
            result.pop();
        }
        result.push('_');
        std::fmt::Display::fmt(&result, f)
    }
}

/// Helper struct to print all cells of the cell tree.
#[derive(Clone, Copy)]
pub struct DisplayCellTree<'a>(CellRef<'a>);

impl std::fmt::Display for DisplayCellTree<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut stack = vec![(0usize, self.0)];

        while let Some((level, cell)) = stack.pop() {
            ok!(writeln!(
                f,
                "{:indent$}{} bits, {} refs: {}",
                "",
                cell.bit_len(),
                cell.reference_count(),
                cell.display_data(),
                indent = level * 2
            ));

            for i in (0..cell.reference_count()).rev() {
                if let Some(child) = cell.reference(i) {
                    stack.push((level + 1, child));
                }
            }
        }

        Ok(())
    }
}

/// Type alias for a cell hash.
#[derive(Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct HashBytes(pub [u8; 32]);

impl HashBytes {
    /// Array of zero bytes.
    pub const ZERO: Self = Self([0; 32]);

    /// Converts slice to a hash bytes.
    ///
    /// # Panics
    ///
    /// Panics if the length of the slice is not 32 bytes.
    #[inline]
    pub fn from_slice(slice: &[u8]) -> Self {
        let mut bytes = [0; 32];
        bytes.copy_from_slice(slice);
        Self(bytes)
    }

    /// Returns the inner bytes array.
    #[inline]
    pub const fn as_array(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns the inner bytes as a slice.
    #[inline]
    pub const fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl From<[u8; 32]> for HashBytes {
    #[inline]
    fn from(value: [u8; 32]) -> Self {
        Self(value)
    }
}

impl AsRef<[u8]> for HashBytes {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for HashBytes {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut result = Self::default();
        ok!(hex::decode_to_slice(s, &mut result.0));
        Ok(result)
    }
}

impl std::fmt::Display for HashBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut output = [0u8; 64];
        // NOTE: output is exactly twice as long as the input
        if hex::encode_to_slice(self.0, &mut output).is_err() {
            return Err(std::fmt::Error);
        }
        match std::str::from_utf8(&output) {
            Ok(output) => f.write_str(output),
            Err(_) => Err(std::fmt::Error),
        }
    }
}

impl std::fmt::Debug for HashBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

impl serde::Serialize for HashBytes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}
