use crate::cell::CellSlice;
use crate::error::Error;

/// A closed set of TLB constructor tags of a record.
pub trait TlbTag: Sized + Copy {
    /// Record name used in errors.
    const RECORD: &'static str;
    /// Tag width in bits.
    const BITS: u16;

    /// Matches the raw value against the known tags.
    fn from_raw(tag: u32) -> Option<Self>;

    /// Returns the raw value of the tag.
    fn into_raw(self) -> u32;

    /// Reads and matches the tag.
    ///
    /// Nothing is consumed when the tag is unknown.
    fn load_tag(slice: &mut CellSlice<'_>) -> Result<Self, Error> {
        let tag = ok!(slice.get_uint(0, Self::BITS)) as u32;
        match Self::from_raw(tag) {
            Some(value) => {
                ok!(slice.skip_bits(Self::BITS));
                Ok(value)
            }
            None => Err(Error::InvalidTag {
                record: Self::RECORD,
                tag,
            }),
        }
    }
}

macro_rules! decl_tlb_tag {
    (
        $(#[doc = $doc:expr])*
        $vis:vis enum $ident:ident($record:literal, $bits:literal) {$(
            $(#[doc = $var_doc:expr])*
            $variant:ident = $value:literal
        ),*$(,)?}
    ) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, serde::Serialize)]
        #[repr(u32)]
        $vis enum $ident {$(
            $(#[doc = $var_doc])*
            $variant = $value
        ),*,}

        impl $crate::models::TlbTag for $ident {
            const RECORD: &'static str = $record;
            const BITS: u16 = $bits;

            #[inline]
            fn from_raw(tag: u32) -> Option<Self> {
                match tag {
                    $($value => Some(Self::$variant),)*
                    _ => None,
                }
            }

            #[inline]
            fn into_raw(self) -> u32 {
                self as u32
            }
        }
    };
}
