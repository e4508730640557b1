//! INTEGER values.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use std::convert::TryFrom;
use bytes::Bytes;
use crate::codec::Codec;
use crate::decode::{self, check_primitive, Decode};
use crate::encode::{self, Encode};
use crate::ident::Tag;
use crate::raw::RawValue;


//------------ Integer -------------------------------------------------------

/// An INTEGER of arbitrary size.
///
/// As integers are variable length in BER, this type is a simple wrapper
/// atop the underlying `Bytes` value containing the content octets. Values
/// are signed. If an integer fits into a built-in integer type, the
/// built-in type can be used as a field type directly instead.
///
/// # BER Encoding
///
/// An INTEGER is encoded as a primitive value with the content octets
/// providing a variable-length, big-endian, two’s complement
/// representation. The representation has to be the shortest possible
/// one, so the first nine bits of a multi-octet integer are never all
/// equal. Both decoding and the `From` conversions maintain this, which
/// makes equality of values equality of their octets.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Integer(Bytes);

impl Integer {
    /// Returns the content octets of the integer.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Converts the integer into its content octets.
    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    /// Returns whether the integer is negative.
    pub fn is_negative(&self) -> bool {
        self.0[0] & 0x80 != 0
    }

    /// Returns the value as an `i64` if it fits.
    pub fn to_i64(&self) -> Option<i64> {
        self.to_i128().and_then(|value| i64::try_from(value).ok())
    }

    /// Returns the value as an `i128` if it fits.
    pub fn to_i128(&self) -> Option<i128> {
        if self.0.len() > 16 {
            return None
        }
        let mut res = if self.is_negative() { -1i128 } else { 0 };
        for &octet in self.0.iter() {
            res = res << 8 | i128::from(octet);
        }
        Some(res)
    }

    /// Returns the value as a `u128` if it is in range.
    pub fn to_u128(&self) -> Option<u128> {
        if self.is_negative() {
            return None
        }
        let slice = if self.0[0] == 0 {
            &self.0[1..]
        }
        else {
            &self.0[..]
        };
        if slice.len() > 16 {
            return None
        }
        let mut res = 0u128;
        for &octet in slice {
            res = res << 8 | u128::from(octet);
        }
        Some(res)
    }

    /// Checks that content octets are a valid, shortest-form integer.
    fn check_content(content: &[u8], pos: u64) -> Result<(), decode::Error> {
        match (content.first(), content.get(1).map(|x| x & 0x80 != 0)) {
            (None, _) => {
                Err(decode::Error::content("invalid integer", pos))
            }
            (Some(0), Some(false)) | (Some(0xFF), Some(true)) => {
                Err(decode::Error::content("non-minimal integer", pos))
            }
            _ => Ok(())
        }
    }
}

//--- From

macro_rules! from_signed {
    ( $( $t:ident ),* ) => {
        $(
            impl From<$t> for Integer {
                fn from(value: $t) -> Self {
                    let bytes = value.to_be_bytes();
                    let mut start = 0;
                    while start < bytes.len() - 1 {
                        match (bytes[start], bytes[start + 1] & 0x80) {
                            (0, 0) | (0xFF, 0x80) => start += 1,
                            _ => break,
                        }
                    }
                    Integer(Bytes::copy_from_slice(&bytes[start..]))
                }
            }
        )*
    }
}

macro_rules! from_unsigned {
    ( $( $t:ident ),* ) => {
        $(
            impl From<$t> for Integer {
                fn from(value: $t) -> Self {
                    let bytes = value.to_be_bytes();
                    let mut start = 0;
                    while start < bytes.len() - 1
                        && bytes[start] == 0
                        && bytes[start + 1] & 0x80 == 0
                    {
                        start += 1;
                    }
                    if bytes[start] & 0x80 != 0 {
                        // The sign bit needs to stay clear.
                        let mut vec = Vec::with_capacity(
                            bytes.len() - start + 1
                        );
                        vec.push(0);
                        vec.extend_from_slice(&bytes[start..]);
                        Integer(vec.into())
                    }
                    else {
                        Integer(Bytes::copy_from_slice(&bytes[start..]))
                    }
                }
            }
        )*
    }
}

from_signed!(i8, i16, i32, i64, i128);
from_unsigned!(u8, u16, u32, u64, u128);

//--- Encode and Decode

impl Encode for Integer {
    fn to_raw(&self, _: &Codec) -> Result<RawValue, encode::Error> {
        Ok(RawValue::primitive(Tag::INTEGER, self.0.clone()))
    }

    fn is_zero(&self) -> bool {
        self.0.as_ref() == [0]
    }

    fn as_int(&self) -> Option<i64> {
        self.to_i64()
    }
}

impl Decode for Integer {
    const TAG: Option<Tag> = Some(Tag::INTEGER);

    fn from_raw(
        raw: &RawValue, _: &Codec, pos: u64
    ) -> Result<Self, decode::Error> {
        check_primitive(raw, pos)?;
        Self::check_content(raw.content(), pos)?;
        Ok(Integer(raw.content().clone()))
    }

    fn from_int(value: i64) -> Option<Self> {
        Some(value.into())
    }

    fn zero() -> Option<Self> {
        Some(Integer(Bytes::from_static(b"\x00")))
    }
}


//------------ Built-in integers ---------------------------------------------

macro_rules! signed_impl {
    ( $( $t:ident ),* ) => {
        $(
            impl Encode for $t {
                fn to_raw(
                    &self, _: &Codec
                ) -> Result<RawValue, encode::Error> {
                    Ok(RawValue::primitive(
                        Tag::INTEGER, Integer::from(*self).into_bytes()
                    ))
                }

                fn is_zero(&self) -> bool {
                    *self == 0
                }

                fn as_int(&self) -> Option<i64> {
                    i64::try_from(*self).ok()
                }
            }

            impl Decode for $t {
                const TAG: Option<Tag> = Some(Tag::INTEGER);

                fn from_raw(
                    raw: &RawValue, codec: &Codec, pos: u64
                ) -> Result<Self, decode::Error> {
                    let int = Integer::from_raw(raw, codec, pos)?;
                    match int.to_i128().and_then(|x| $t::try_from(x).ok()) {
                        Some(res) => Ok(res),
                        None => Err(decode::Error::content(
                            "integer out of range", pos
                        )),
                    }
                }

                fn from_int(value: i64) -> Option<Self> {
                    $t::try_from(value).ok()
                }

                fn zero() -> Option<Self> {
                    Some(0)
                }
            }
        )*
    }
}

macro_rules! unsigned_impl {
    ( $( $t:ident ),* ) => {
        $(
            impl Encode for $t {
                fn to_raw(
                    &self, _: &Codec
                ) -> Result<RawValue, encode::Error> {
                    Ok(RawValue::primitive(
                        Tag::INTEGER, Integer::from(*self).into_bytes()
                    ))
                }

                fn is_zero(&self) -> bool {
                    *self == 0
                }

                fn as_int(&self) -> Option<i64> {
                    i64::try_from(*self).ok()
                }
            }

            impl Decode for $t {
                const TAG: Option<Tag> = Some(Tag::INTEGER);

                fn from_raw(
                    raw: &RawValue, codec: &Codec, pos: u64
                ) -> Result<Self, decode::Error> {
                    let int = Integer::from_raw(raw, codec, pos)?;
                    match int.to_u128().and_then(|x| $t::try_from(x).ok()) {
                        Some(res) => Ok(res),
                        None => Err(decode::Error::content(
                            "integer out of range", pos
                        )),
                    }
                }

                fn from_int(value: i64) -> Option<Self> {
                    $t::try_from(value).ok()
                }

                fn zero() -> Option<Self> {
                    Some(0)
                }
            }
        )*
    }
}

signed_impl!(i8, i16, i32, i64, i128);
unsigned_impl!(u8, u16, u32, u64, u128);


//============ Tests =========================================================
