use super::*;
use crate::cell::CellBuilder;
use crate::util::decode_base64;

// root (deadbeef) -> [a, b], b (101) -> [a], a (01)
const SHARED_CHILD: &str = "b5ee9c7201010301000f000208deadbeef02010101b002000201";
const SHARED_CHILD_CRC: &str = "b5ee9c7241010301000f000208deadbeef02010101b002000201220665f8";
const SHARED_CHILD_INDEXED_CRC: &str =
    "b5ee9c72c1010301000f00080c0f0208deadbeef02010101b002000201cdde2376";
const SHARED_CHILD_LEGACY: &str = "68ff65f301010301000f080c0f0208deadbeef02010101b002000201";
const SHARED_CHILD_LEGACY_CRC: &str =
    "acc3a72801010301000f080c0f0208deadbeef02010101b002000201302d781f";

fn patched(hex: &str, offset: usize, byte: u8) -> Vec<u8> {
    let mut data = hex::decode(hex).unwrap();
    data[offset] = byte;
    data
}

fn check_shared_child(tree: &CellTree) {
    assert_eq!(tree.len(), 3);

    let root = tree.root().unwrap();
    assert_eq!(root.bit_len(), 32);
    assert_eq!(root.data(), &[0xde, 0xad, 0xbe, 0xef]);
    assert_eq!(root.reference_count(), 2);

    let a = root.reference(0).unwrap();
    let b = root.reference(1).unwrap();
    assert_eq!(a.bit_len(), 8);
    assert_eq!(a.data(), &[0x01]);

    assert_eq!(b.bit_len(), 3);
    assert_eq!(b.data(), &[0b1010_0000]);
    assert_eq!(b.reference(0).unwrap().index(), a.index());

    assert_eq!(
        root.display_tree().to_string(),
        "32 bits, 2 refs: deadbeef\n  8 bits, 0 refs: 01\n  3 bits, 1 refs: b_\n    8 bits, 0 refs: 01\n"
    );
}

#[test]
fn single_unaligned_cell() {
    let tree = Boc::decode(decode_base64("te6ccgEBAQEABQAABb23wA==").unwrap()).unwrap();
    assert_eq!(tree.len(), 1);

    let root = tree.root().unwrap();
    assert_eq!(root.bit_len(), 17);
    assert_eq!(root.reference_count(), 0);
    assert_eq!(root.display_data().to_string(), "bdb7c_");
}

#[test]
fn all_formats() {
    for boc in [
        SHARED_CHILD,
        SHARED_CHILD_CRC,
        SHARED_CHILD_INDEXED_CRC,
        SHARED_CHILD_LEGACY,
        SHARED_CHILD_LEGACY_CRC,
    ] {
        let tree = Boc::decode_hex(boc).unwrap();
        check_shared_child(&tree);
    }

    let tree = Boc::decode_base64("te6cckEBAwEADwACCN6tvu8CAQEBsAIAAgEiBmX4").unwrap();
    check_shared_child(&tree);
}

#[test]
fn header_fields() {
    let data = hex::decode(SHARED_CHILD_INDEXED_CRC).unwrap();
    let header = de::BocHeader::decode(&data).unwrap();
    assert_eq!(header.ref_size(), 1);
    assert_eq!(header.roots(), &[0]);
    assert_eq!(header.cells().len(), 3);
    assert_eq!(header.cells()[2], &[0x00, 0x02, 0x01]);
}

#[test]
fn boc_with_crc() {
    let mut data = hex::decode(SHARED_CHILD_CRC).unwrap();
    assert!(Boc::decode(&data).is_ok());

    let last_byte = data.last_mut().unwrap();
    *last_byte = !*last_byte;
    assert_eq!(Boc::decode(&data), Err(de::Error::InvalidChecksum));

    let mut data = hex::decode(SHARED_CHILD_LEGACY_CRC).unwrap();
    data[15] ^= 0x01;
    assert_eq!(Boc::decode(&data), Err(de::Error::InvalidChecksum));
}

#[test]
fn malformed_header() {
    assert_eq!(Boc::decode([0u8; 0]), Err(de::Error::UnexpectedEof));
    assert_eq!(
        Boc::decode(patched(SHARED_CHILD, 0, 0x00)),
        Err(de::Error::UnknownBocTag)
    );
    assert_eq!(
        Boc::decode(patched(SHARED_CHILD, 4, 0x00)),
        Err(de::Error::InvalidRefSize)
    );
    assert_eq!(
        Boc::decode(patched(SHARED_CHILD, 4, 0x05)),
        Err(de::Error::InvalidRefSize)
    );
    assert_eq!(
        Boc::decode(patched(SHARED_CHILD, 4, 0x21)),
        Err(de::Error::InvalidHeader)
    );
    assert_eq!(
        Boc::decode(patched(SHARED_CHILD, 5, 0x00)),
        Err(de::Error::InvalidOffsetSize)
    );
    assert_eq!(
        Boc::decode(patched(SHARED_CHILD, 5, 0x09)),
        Err(de::Error::InvalidOffsetSize)
    );
}

#[test]
fn malformed_roots() {
    assert_eq!(
        Boc::decode(patched(SHARED_CHILD, 7, 0x00)),
        Err(de::Error::RootCellNotFound)
    );
    assert_eq!(
        Boc::decode(patched(SHARED_CHILD, 7, 0x02)),
        Err(de::Error::TooManyRootCells)
    );
    assert_eq!(
        Boc::decode(patched(SHARED_CHILD_LEGACY, 7, 0x02)),
        Err(de::Error::UnexpectedMultipleRoots)
    );
    assert_eq!(
        Boc::decode(patched(SHARED_CHILD, 8, 0x01)),
        Err(de::Error::AbsentCellsNotSupported)
    );
    assert_eq!(
        Boc::decode(patched(SHARED_CHILD, 10, 0x03)),
        Err(de::Error::RootOutOfBounds)
    );
}

#[test]
fn malformed_cells() {
    // Total size does not match the cells
    assert_eq!(
        Boc::decode(patched(SHARED_CHILD, 9, 0x0e)),
        Err(de::Error::InvalidTotalSize)
    );

    // Truncated payload
    let mut data = hex::decode(SHARED_CHILD).unwrap();
    data.pop();
    assert_eq!(Boc::decode(&data), Err(de::Error::UnexpectedEof));

    // Completion tag without data bits
    assert_eq!(
        Boc::decode(patched(SHARED_CHILD, 21, 0x80)),
        Err(de::Error::UnnormalizedCell)
    );

    // Reference to the parent itself
    assert_eq!(
        Boc::decode(patched(SHARED_CHILD, 22, 0x01)),
        Err(de::Error::InvalidRefOrder)
    );

    // Reference to the root
    assert_eq!(
        Boc::decode(patched(SHARED_CHILD, 22, 0x00)),
        Err(de::Error::InvalidRefOrder)
    );

    // Reference out of bounds
    assert_eq!(
        Boc::decode(patched(SHARED_CHILD, 22, 0x05)),
        Err(de::Error::InvalidRef)
    );

    // Absent cell marker in the descriptor
    assert_eq!(
        Boc::decode(patched(SHARED_CHILD, 23, 0x07)),
        Err(de::Error::AbsentCellsNotSupported)
    );
}

#[test]
fn invalid_encoding() {
    assert_eq!(Boc::decode_hex("zz"), Err(de::Error::InvalidEncoding));
    assert_eq!(Boc::decode_base64("@@@@"), Err(de::Error::InvalidEncoding));
}

#[test]
fn file_hash() {
    let data = hex::decode(SHARED_CHILD).unwrap();
    assert_eq!(
        Boc::file_hash(&data).to_string(),
        "93aaafc376f1a09f527223464826a7a353ce41e1b1f75354bba18b93e86332a0"
    );
}

#[test]
fn decoded_tree_matches_built_tree() {
    let mut tree = CellTree::new();

    let mut a = CellBuilder::new();
    a.store_u8(0x01).unwrap();
    let a = tree.add(a).unwrap();

    let mut b = CellBuilder::new();
    b.store_small_uint(0b101, 3).unwrap();
    b.store_reference(a).unwrap();
    let b = tree.add(b).unwrap();

    let mut root = CellBuilder::new();
    root.store_u32(0xdeadbeef).unwrap();
    root.store_reference(a).unwrap();
    root.store_reference(b).unwrap();
    let root = tree.add(root).unwrap();
    tree.set_root(root).unwrap();

    assert_eq!(Boc::decode_hex(SHARED_CHILD).unwrap(), tree);
}
