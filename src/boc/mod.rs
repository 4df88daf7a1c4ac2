//! BOC (Bag Of Cells) implementation.

use sha2::Digest;

use crate::cell::{CellTree, HashBytes};

/// BOC decoder implementation.
pub mod de;

/// BOC file magic number.
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
pub enum BocTag {
    /// Single root, cells index, no CRC32
    Indexed,
    /// Single root, cells index, with CRC32
    IndexedCrc32,
    /// Multiple roots, optional cells index, optional CRC32
    #[default]
    Generic,
}

impl BocTag {
    const INDEXED: [u8; 4] = [0x68, 0xff, 0x65, 0xf3];
    const INDEXED_CRC32: [u8; 4] = [0xac, 0xc3, 0xa7, 0x28];
    const GENERIC: [u8; 4] = [0xb5, 0xee, 0x9c, 0x72];

    /// Tries to match bytes with BOC tag.
    pub const fn from_bytes(data: [u8; 4]) -> Option<Self> {
        match data {
            Self::GENERIC => Some(Self::Generic),
            Self::INDEXED_CRC32 => Some(Self::IndexedCrc32),
            Self::INDEXED => Some(Self::Indexed),
            _ => None,
        }
    }

    /// Converts BOC tag to bytes.
    pub const fn to_bytes(self) -> [u8; 4] {
        match self {
            Self::Indexed => Self::INDEXED,
            Self::IndexedCrc32 => Self::INDEXED_CRC32,
            Self::Generic => Self::GENERIC,
        }
    }
}

/// BOC (Bag Of Cells) helper.
pub struct Boc;

impl Boc {
    /// Computes a simple SHA256 hash of the data.
    #[inline]
    pub fn file_hash(data: impl AsRef<[u8]>) -> HashBytes {
        fn file_hash_impl(data: &[u8]) -> HashBytes {
            HashBytes(sha2::Sha256::digest(data).into())
        }
        file_hash_impl(data.as_ref())
    }

    /// Decodes a cell tree from a base64 encoded BOC.
    pub fn decode_base64<T: AsRef<[u8]>>(data: T) -> Result<CellTree, de::Error> {
        fn decode_base64_impl(data: &[u8]) -> Result<CellTree, de::Error> {
            match crate::util::decode_base64(data) {
                Ok(data) => Boc::decode(data),
                Err(_) => Err(de::Error::InvalidEncoding),
            }
        }
        decode_base64_impl(data.as_ref())
    }

    /// Decodes a cell tree from a hex encoded BOC.
    pub fn decode_hex<T: AsRef<[u8]>>(data: T) -> Result<CellTree, de::Error> {
        fn decode_hex_impl(data: &[u8]) -> Result<CellTree, de::Error> {
            match hex::decode(data) {
                Ok(data) => Boc::decode(data),
                Err(_) => Err(de::Error::InvalidEncoding),
            }
        }
        decode_hex_impl(data.as_ref())
    }

    /// Decodes a cell tree from bytes.
    pub fn decode<T>(data: T) -> Result<CellTree, de::Error>
    where
        T: AsRef<[u8]>,
    {
        fn decode_impl(data: &[u8]) -> Result<CellTree, de::Error> {
            let header = ok!(de::BocHeader::decode(data));
            header.finalize()
        }
        decode_impl(data.as_ref())
    }
}

#[cfg(test)]
mod tests;
