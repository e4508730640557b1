//! The trait for decodable values.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use bytes::Bytes;
use crate::codec::Codec;
use crate::ident::Tag;
use crate::raw::RawValue;
use super::error::Error;


//------------ Decode --------------------------------------------------------

/// A type that can be decoded from a single BER value.
///
/// The codec drives decoding: it locates the raw value a field maps to,
/// undoes whatever the field options did to its tag, and only then hands
/// the value to [`from_raw`][Self::from_raw]. An implementation therefore
/// always sees the value with its natural tag and never needs to know
/// about options.
///
/// The two associated constants describe the natural shape of the type’s
/// encoding. They let the codec match a peeked value against a field
/// before committing to it, which is how OPTIONAL fields and DEFAULT
/// values work. A type that accepts several tags – which only happens
/// through a CHOICE group – uses `None` for [`TAG`][Self::TAG] and can
/// then only be decoded through options that determine the tag.
///
/// Structured types implement the trait by walking the children of the
/// raw value through [`RawValue::fields`] and decoding each field with
/// [`Codec::decode_field`].
pub trait Decode: Sized {
    /// The natural tag of values of this type, if there is a single one.
    const TAG: Option<Tag>;

    /// Whether values of this type are constructed.
    const CONSTRUCTED: bool = false;

    /// Creates a value from a raw value carrying the natural tag.
    ///
    /// `pos` is the position of the raw value’s content octets in the
    /// overall input, to be used when reporting errors.
    fn from_raw(
        raw: &RawValue, codec: &Codec, pos: u64
    ) -> Result<Self, Error>;

    /// Creates a value from the DEFAULT declared for an absent field.
    ///
    /// Returns `None` if the type cannot represent integer defaults,
    /// which is the case for everything that isn’t integer-like.
    fn from_int(_value: i64) -> Option<Self> {
        None
    }

    /// Returns the empty value an absent OPTIONAL field decodes into.
    ///
    /// This is the counterpart of [`Encode::is_zero`]: a type returning
    /// `Some` here must report `true` there for exactly this value.
    /// Returns `None` if the type has no empty value, in which case a
    /// field of the type cannot be absent even when marked optional and
    /// needs to be wrapped in `Option` instead.
    ///
    /// [`Encode::is_zero`]: crate::encode::Encode::is_zero
    fn zero() -> Option<Self> {
        None
    }
}

//--- Impls for std types

impl Decode for bool {
    const TAG: Option<Tag> = Some(Tag::BOOLEAN);

    fn from_raw(
        raw: &RawValue, codec: &Codec, pos: u64
    ) -> Result<Self, Error> {
        check_primitive(raw, pos)?;
        if raw.content().len() != 1 {
            return Err(Error::content("invalid boolean", pos))
        }
        match raw.content()[0] {
            0 => Ok(false),
            0xFF => Ok(true),
            // BER accepts any other octet as true, DER doesn’t.
            _ if !codec.mode().is_canonical() => Ok(true),
            _ => Err(Error::content("invalid boolean", pos)),
        }
    }

    fn zero() -> Option<Self> {
        Some(false)
    }
}

impl Decode for String {
    const TAG: Option<Tag> = Some(Tag::OCTET_STRING);

    fn from_raw(
        raw: &RawValue, _: &Codec, pos: u64
    ) -> Result<Self, Error> {
        check_primitive(raw, pos)?;
        match std::str::from_utf8(raw.content()) {
            Ok(s) => Ok(s.into()),
            Err(_) => Err(Error::content("invalid UTF-8 string", pos)),
        }
    }

    fn zero() -> Option<Self> {
        Some(String::new())
    }
}

impl Decode for Bytes {
    const TAG: Option<Tag> = Some(Tag::OCTET_STRING);

    fn from_raw(
        raw: &RawValue, _: &Codec, pos: u64
    ) -> Result<Self, Error> {
        check_primitive(raw, pos)?;
        Ok(raw.content().clone())
    }

    fn zero() -> Option<Self> {
        Some(Bytes::new())
    }
}

impl<T: Decode> Decode for Vec<T> {
    const TAG: Option<Tag> = Some(Tag::SEQUENCE);
    const CONSTRUCTED: bool = true;

    fn from_raw(
        raw: &RawValue, codec: &Codec, pos: u64
    ) -> Result<Self, Error> {
        let mut fields = raw.fields(pos)?;
        let mut res = Vec::new();
        while !fields.is_empty() {
            res.push(codec.decode_item(&mut fields)?);
        }
        Ok(res)
    }

    fn zero() -> Option<Self> {
        Some(Vec::new())
    }
}

impl<T: Decode> Decode for Option<T> {
    const TAG: Option<Tag> = T::TAG;
    const CONSTRUCTED: bool = T::CONSTRUCTED;

    fn from_raw(
        raw: &RawValue, codec: &Codec, pos: u64
    ) -> Result<Self, Error> {
        T::from_raw(raw, codec, pos).map(Some)
    }

    fn from_int(value: i64) -> Option<Self> {
        T::from_int(value).map(Some)
    }

    fn zero() -> Option<Self> {
        Some(None)
    }
}


//------------ Helpers -------------------------------------------------------

/// Checks that a raw value is primitive.
pub(crate) fn check_primitive(
    raw: &RawValue, pos: u64
) -> Result<(), Error> {
    if raw.is_constructed() {
        Err(Error::content("expected primitive value", pos))
    }
    else {
        Ok(())
    }
}


//============ Tests =========================================================
