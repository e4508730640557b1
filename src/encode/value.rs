//! The trait for encodable values.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use bytes::Bytes;
use crate::codec::Codec;
use crate::ident::Tag;
use crate::raw::RawValue;
use super::error::Error;


//------------ Encode --------------------------------------------------------

/// A type that can be encoded as a single BER value.
///
/// The one required method, [`to_raw`][Self::to_raw], produces the raw
/// value the type naturally maps to, before any field options apply. The
/// codec takes it from there: retagging, wrapping, omitting, ordering are
/// all done on the raw value, so an implementation never needs to deal
/// with options itself.
///
/// Structured types implement the trait by encoding each field through
/// [`Codec::encode_field`] with that field’s options and collecting the
/// results into [`RawValue::sequence`].
///
/// The two provided methods feed the rules for OPTIONAL and DEFAULT
/// fields. A type with a meaningful empty value should override
/// [`is_zero`][Self::is_zero]; integer-like types should override
/// [`as_int`][Self::as_int] so they can be compared against a declared
/// default.
pub trait Encode {
    /// Produces the raw value this value naturally encodes to.
    fn to_raw(&self, codec: &Codec) -> Result<RawValue, Error>;

    /// Returns whether this is the empty value of the type.
    ///
    /// An OPTIONAL field holding its empty value is left out of the
    /// encoding. The default of `false` means values of the type are
    /// always written.
    fn is_zero(&self) -> bool {
        false
    }

    /// Returns the value as an integer if it naturally is one.
    ///
    /// Used to compare a field against its declared DEFAULT value.
    fn as_int(&self) -> Option<i64> {
        None
    }
}

//--- Blanket impl

impl<T: Encode + ?Sized> Encode for &'_ T {
    fn to_raw(&self, codec: &Codec) -> Result<RawValue, Error> {
        (*self).to_raw(codec)
    }

    fn is_zero(&self) -> bool {
        (*self).is_zero()
    }

    fn as_int(&self) -> Option<i64> {
        (*self).as_int()
    }
}

//--- Impls for std types

impl Encode for bool {
    fn to_raw(&self, _: &Codec) -> Result<RawValue, Error> {
        Ok(RawValue::primitive(
            Tag::BOOLEAN,
            if *self { b"\xff".as_ref() } else { b"\x00".as_ref() }
        ))
    }

    fn is_zero(&self) -> bool {
        !*self
    }
}

impl Encode for str {
    fn to_raw(&self, _: &Codec) -> Result<RawValue, Error> {
        Ok(RawValue::primitive(
            Tag::OCTET_STRING, Bytes::copy_from_slice(self.as_bytes())
        ))
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl Encode for String {
    fn to_raw(&self, codec: &Codec) -> Result<RawValue, Error> {
        self.as_str().to_raw(codec)
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl Encode for Bytes {
    fn to_raw(&self, _: &Codec) -> Result<RawValue, Error> {
        Ok(RawValue::primitive(Tag::OCTET_STRING, self.clone()))
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Encode> Encode for [T] {
    fn to_raw(&self, codec: &Codec) -> Result<RawValue, Error> {
        let mut content = Vec::new();
        for item in self {
            item.to_raw(codec)?.write_encoded(&mut content)?;
        }
        Ok(RawValue::constructed(Tag::SEQUENCE, content))
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn to_raw(&self, codec: &Codec) -> Result<RawValue, Error> {
        self.as_slice().to_raw(codec)
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Encode> Encode for Option<T> {
    fn to_raw(&self, codec: &Codec) -> Result<RawValue, Error> {
        match *self {
            Some(ref value) => value.to_raw(codec),
            None => Err(Error::content("missing value")),
        }
    }

    fn is_zero(&self) -> bool {
        self.is_none()
    }

    fn as_int(&self) -> Option<i64> {
        self.as_ref().and_then(Encode::as_int)
    }
}


//============ Tests =========================================================
