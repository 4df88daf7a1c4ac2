//! Common error types.

/// Error type for cell and record decoding errors.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// There were not enough bits or refs in the cell slice.
    #[error("unexpected end of data")]
    UnexpectedEndOfData,
    /// Unknown TLB tag.
    #[error("invalid {record} tag: {tag:#x}")]
    InvalidTag {
        /// Name of the record which was being decoded.
        record: &'static str,
        /// Raw value of the discriminator.
        tag: u32,
    },
    /// Shard ident marker bits were not `$00`.
    #[error("invalid shard ident prefix: {0:#04b}")]
    InvalidShardPrefix(u8),
    /// The field exists in the cell tree but is not decoded by this crate.
    #[error("unsupported field `{field}` in {record}")]
    UnsupportedField {
        /// Name of the record which contains the field.
        record: &'static str,
        /// Name of the field.
        field: &'static str,
    },
    /// Underlying integer type does not fit into the target type.
    #[error("underlying integer is too large to fit in target type")]
    IntOverflow,
    /// There were not enough bits or refs capacity in the cell builder.
    #[error("cell overflow")]
    CellOverflow,
    /// Cell references an entry which is not in the tree.
    #[error("invalid cell")]
    InvalidCell,
}
