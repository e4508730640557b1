//! The NULL value.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use bytes::Bytes;
use crate::codec::Codec;
use crate::decode::{self, check_primitive, Decode};
use crate::encode::{self, Encode};
use crate::ident::Tag;
use crate::raw::RawValue;


//------------ Null ----------------------------------------------------------

/// The ASN.1 NULL value.
///
/// NULL carries no information beyond being present. It appears where a
/// protocol wants a placeholder, such as in algorithm parameters. Because
/// presence is its entire point, `Null` never counts as empty; to model a
/// NULL that may be absent, use `Option<Null>`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Null;

impl Encode for Null {
    fn to_raw(&self, _: &Codec) -> Result<RawValue, encode::Error> {
        Ok(RawValue::primitive(Tag::NULL, Bytes::new()))
    }
}

impl Decode for Null {
    const TAG: Option<Tag> = Some(Tag::NULL);

    fn from_raw(
        raw: &RawValue, _: &Codec, pos: u64
    ) -> Result<Self, decode::Error> {
        check_primitive(raw, pos)?;
        if !raw.content().is_empty() {
            return Err(decode::Error::content("invalid NULL", pos))
        }
        Ok(Null)
    }
}

//--- Encode and Decode for ()
//
// The unit type maps to NULL as well.

impl Encode for () {
    fn to_raw(&self, codec: &Codec) -> Result<RawValue, encode::Error> {
        Null.to_raw(codec)
    }
}

impl Decode for () {
    const TAG: Option<Tag> = Some(Tag::NULL);

    fn from_raw(
        raw: &RawValue, codec: &Codec, pos: u64
    ) -> Result<Self, decode::Error> {
        Null::from_raw(raw, codec, pos).map(|_| ())
    }
}


//============ Tests =========================================================
