//! Object identifiers.
//!
//! This module is home to [`Oid`], the type for ASN.1 object
//! identifiers, and its companions: [`Component`] and [`Iter`] for
//! looking at an identifier’s components and [`ParseOidError`] for
//! failed conversions from dotted-decimal notation. `Oid` and
//! [`ConstOid`] are also re-exported at the crate root.

use std::{error, fmt, hash, str};
use bytes::Bytes;
use crate::codec::Codec;
use crate::decode::{self, check_primitive, Decode};
use crate::encode::{self, Encode};
use crate::ident::Tag;
use crate::raw::RawValue;


//------------ Oid -----------------------------------------------------------

/// An object identifier.
///
/// Object identifiers are globally unique, hierarchical values that
/// identify objects or their type. When written, they are presented as a
/// sequence of integers separated by dots such as ‘1.3.6.1.5.5.7.1’.
///
/// Values of this type keep the identifier in the content octets of its
/// BER encoding. Because different representations of those octets may be
/// useful, the type is generic over something that can become a reference
/// to a bytes slice. Known identifiers are typically kept as constants of
/// the type alias [`ConstOid`] and compared against decoded values:
///
/// ```
/// use bermap::{ConstOid, Oid};
///
/// pub const SHA256: ConstOid =
///     Oid::new(&[96, 134, 72, 1, 101, 3, 4, 2, 1]);
/// ```
///
/// The crate ships with a `mkoid` binary that converts identifiers in dot
/// notation into such arrays.
///
/// Decoding and [`FromStr`][std::str::FromStr] check that the octets are
/// a structurally valid identifier. [`Oid::new`] accepts anything; for
/// invalid octets, [`iter`][Self::iter] and `Display` produce unspecified
/// output but won’t panic.
///
/// # BER Encoding
///
/// An OBJECT IDENTIFIER is encoded as a primitive value whose content is
/// a sequence of subidentifiers, each in big-endian base 128 with bit 8
/// marking continuation, using the fewest possible octets. The first two
/// components x and y share the first subidentifier as x · 40 + y.
#[derive(Clone, Debug)]
pub struct Oid<T: AsRef<[u8]> = Bytes>(T);

/// A type alias for `Oid<&'static [u8]>`.
///
/// This is useful when defining object identifier constants.
pub type ConstOid = Oid<&'static [u8]>;

impl<T: AsRef<[u8]>> Oid<T> {
    /// Creates an object identifier from its content octets.
    pub const fn new(octets: T) -> Self {
        Oid(octets)
    }

    /// Returns the content octets of the identifier.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Returns an iterator over the components of the identifier.
    pub fn iter(&self) -> Iter {
        Iter::new(self.0.as_ref())
    }
}

impl Oid<Bytes> {
    /// Checks that content octets form a valid identifier.
    ///
    /// There has to be at least one subidentifier, no subidentifier may
    /// start with a redundant leading octet, and the last octet must not
    /// announce a continuation.
    fn check_content(content: &[u8], pos: u64) -> Result<(), decode::Error> {
        let mut at_start = true;
        for &octet in content {
            if at_start && octet == 0x80 {
                return Err(decode::Error::content(
                    "invalid object identifier", pos
                ))
            }
            at_start = octet & 0x80 == 0;
        }
        if content.is_empty() || !at_start {
            return Err(decode::Error::content(
                "invalid object identifier", pos
            ))
        }
        Ok(())
    }
}

//--- FromStr

impl str::FromStr for Oid<Bytes> {
    type Err = ParseOidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut components = s.split('.').map(|item| {
            item.parse::<u32>().map_err(|_| {
                ParseOidError("component is not a decimal number")
            })
        });
        let first = components.next()
            .ok_or(ParseOidError("empty identifier"))??;
        let second = components.next()
            .ok_or(ParseOidError("at least two components needed"))??;
        if first > 2 {
            return Err(ParseOidError("first component must be 0, 1, or 2"))
        }
        if first < 2 && second > 39 {
            return Err(ParseOidError(
                "second component must be less than 40"
            ))
        }

        let mut octets = Vec::new();
        push_subid(
            &mut octets, u64::from(first) * 40 + u64::from(second)
        );
        for component in components {
            push_subid(&mut octets, u64::from(component?));
        }
        Ok(Oid(octets.into()))
    }
}

/// Appends a subidentifier in base 128 to a vec.
fn push_subid(octets: &mut Vec<u8>, subid: u64) {
    let mut started = false;
    let mut shift = 63;
    while shift > 0 {
        let group = ((subid >> shift) & 0x7F) as u8;
        if started || group != 0 {
            octets.push(group | 0x80);
            started = true;
        }
        shift -= 7;
    }
    octets.push((subid & 0x7F) as u8);
}

//--- AsRef

impl<T: AsRef<[u8]>> AsRef<[u8]> for Oid<T> {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

//--- PartialEq, Eq and Hash

impl<T: AsRef<[u8]>, U: AsRef<[u8]>> PartialEq<Oid<U>> for Oid<T> {
    fn eq(&self, other: &Oid<U>) -> bool {
        self.0.as_ref() == other.0.as_ref()
    }
}

impl<T: AsRef<[u8]>> Eq for Oid<T> { }

impl<T: AsRef<[u8]>> hash::Hash for Oid<T> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.0.as_ref().hash(state)
    }
}

//--- Display

impl<T: AsRef<[u8]>> fmt::Display for Oid<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for component in self.iter() {
            if first {
                first = false;
            }
            else {
                f.write_str(".")?;
            }
            match component.to_u128() {
                Some(value) => write!(f, "{}", value)?,
                None => f.write_str("?")?,
            }
        }
        Ok(())
    }
}

//--- Encode and Decode

impl<T: AsRef<[u8]>> Encode for Oid<T> {
    fn to_raw(&self, _: &Codec) -> Result<RawValue, encode::Error> {
        Ok(RawValue::primitive(
            Tag::OID, Bytes::copy_from_slice(self.0.as_ref())
        ))
    }
}

impl Decode for Oid<Bytes> {
    const TAG: Option<Tag> = Some(Tag::OID);

    fn from_raw(
        raw: &RawValue, _: &Codec, pos: u64
    ) -> Result<Self, decode::Error> {
        check_primitive(raw, pos)?;
        Self::check_content(raw.content(), pos)?;
        Ok(Oid(raw.content().clone()))
    }
}


//------------ Component -----------------------------------------------------

/// A single component of an object identifier.
///
/// Components are integers without any upper bound, so instead of
/// converting eagerly, a component keeps a reference to its underlying
/// octets. The methods [`to_u32`][Self::to_u32] and
/// [`to_u128`][Self::to_u128] convert to native integers where the value
/// fits.
#[derive(Clone, Copy, Debug)]
pub struct Component<'a> {
    /// The position of the component in the identifier.
    ///
    /// The first two components are folded into the first subidentifier
    /// on the wire, so converting to the component value depends on where
    /// we are.
    position: Position,

    /// The octets of the subidentifier.
    slice: &'a [u8],
}

/// The position of a component in the object identifier.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Position {
    First,
    Second,
    Other,
}

impl<'a> Component<'a> {
    fn new(slice: &'a [u8], position: Position) -> Self {
        Component { slice, position }
    }

    /// Attempts to convert the component to a `u32`.
    ///
    /// Since the component’s value can be larger than what fits into a
    /// `u32`, this may fail, in which case the method returns `None`.
    pub fn to_u32(self) -> Option<u32> {
        if self.slice.len() > 5
            || (self.slice.len() == 5 && self.slice[0] & 0x70 != 0)
        {
            return None
        }
        let mut res = 0u32;
        for &octet in self.slice {
            res = res << 7 | u32::from(octet & 0x7F);
        }
        Some(match self.position {
            Position::First => {
                if res < 40 { 0 }
                else if res < 80 { 1 }
                else { 2 }
            }
            Position::Second => {
                if res < 80 { res % 40 }
                else { res - 80 }
            }
            Position::Other => res,
        })
    }

    /// Attempts to convert the component to a `u128`.
    ///
    /// This covers the arcs derived from UUIDs under 2.25. Anything even
    /// larger returns `None`.
    pub fn to_u128(self) -> Option<u128> {
        if self.slice.len() > 19
            || (self.slice.len() == 19 && self.slice[0] & 0x7C != 0)
        {
            return None
        }
        let mut res = 0u128;
        for &octet in self.slice {
            res = res << 7 | u128::from(octet & 0x7F);
        }
        Some(match self.position {
            Position::First => {
                if res < 40 { 0 }
                else if res < 80 { 1 }
                else { 2 }
            }
            Position::Second => {
                if res < 80 { res % 40 }
                else { res - 80 }
            }
            Position::Other => res,
        })
    }
}

//--- PartialEq and Eq

impl<'a> PartialEq for Component<'a> {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position && self.slice == other.slice
    }
}

impl<'a> Eq for Component<'a> { }


//------------ Iter ----------------------------------------------------------

/// An iterator over the components of an object identifier.
pub struct Iter<'a> {
    /// The remaining octets of the identifier.
    slice: &'a [u8],

    /// The position of the next component.
    position: Position,
}

impl<'a> Iter<'a> {
    fn new(slice: &'a [u8]) -> Self {
        Iter { slice, position: Position::First }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = Component<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.slice.is_empty() {
            return None
        }
        let end = self.slice.iter().position(|octet| {
            octet & 0x80 == 0
        }).map(|idx| idx + 1).unwrap_or(self.slice.len());
        if let Position::First = self.position {
            // The first subidentifier folds two components into one,
            // so it is handed out again for the second component.
            self.position = Position::Second;
            return Some(
                Component::new(&self.slice[..end], Position::First)
            )
        }
        let (res, tail) = self.slice.split_at(end);
        self.slice = tail;
        let position = self.position;
        self.position = Position::Other;
        Some(Component::new(res, position))
    }
}


//------------ ParseOidError -------------------------------------------------

/// A string does not contain an object identifier in dot notation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ParseOidError(&'static str);

impl fmt::Display for ParseOidError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl error::Error for ParseOidError { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::mode::Mode;

    fn parse(s: &str) -> Oid<Bytes> {
        s.parse().unwrap()
    }

    #[test]
    fn from_str() {
        assert_eq!(
            parse("1.3.6.1.5.5.7.1").as_slice(),
            b"\x2b\x06\x01\x05\x05\x07\x01"
        );
        assert_eq!(parse("2.999.3").as_slice(), b"\x88\x37\x03");
        assert_eq!(parse("0.0").as_slice(), b"\x00");
        assert_eq!(parse("2.40").as_slice(), b"\x78");
        assert_eq!(
            parse("1.2.840.113549").as_slice(),
            b"\x2a\x86\x48\x86\xf7\x0d"
        );

        assert!("".parse::<Oid>().is_err());
        assert!("1".parse::<Oid>().is_err());
        assert!("3.1".parse::<Oid>().is_err());
        assert!("1.40".parse::<Oid>().is_err());
        assert!("1..2".parse::<Oid>().is_err());
        assert!("1.x".parse::<Oid>().is_err());
        assert!("1.3.-5".parse::<Oid>().is_err());
    }

    #[test]
    fn display() {
        fn step(s: &str) {
            assert_eq!(parse(s).to_string(), s);
        }

        step("1.3.6.1.5.5.7.1");
        step("2.999.3");
        step("0.0");
        step("1.39");
        step("2.40");
        step("1.2.840.113549.1.7.2");

        // A component beyond u32, straight from octets.
        assert_eq!(
            Oid::new(
                b"\x88\x37\x81\x80\x80\x80\x80\x00".as_ref()
            ).to_string(),
            "2.999.34359738368"
        );
    }

    #[test]
    fn components() {
        let oid = parse("1.2.840.113549");
        let mut iter = oid.iter();
        assert_eq!(iter.next().unwrap().to_u32(), Some(1));
        assert_eq!(iter.next().unwrap().to_u32(), Some(2));
        assert_eq!(iter.next().unwrap().to_u32(), Some(840));
        assert_eq!(iter.next().unwrap().to_u32(), Some(113549));
        assert!(iter.next().is_none());

        let oid = Oid::new(b"\x88\x37\x81\x80\x80\x80\x80\x00".as_ref());
        let last = oid.iter().last().unwrap();
        assert_eq!(last.to_u32(), None);
        assert_eq!(last.to_u128(), Some(1u128 << 35));
    }

    #[test]
    fn eq() {
        const STATIC: ConstOid = Oid::new(b"\x2b\x06\x01");
        assert_eq!(parse("1.3.6.1").iter().count(), 4);
        assert!(parse("1.3.6") == STATIC);
        assert!(parse("1.3.7") != STATIC);
    }

    #[test]
    fn decode_and_encode() {
        let codec = Codec::new(Mode::Der);

        let raw = RawValue::primitive(
            Tag::OID, b"\x2b\x06\x01".as_ref()
        );
        let oid = Oid::from_raw(&raw, &codec, 0).unwrap();
        assert_eq!(oid.to_string(), "1.3.6");
        assert_eq!(
            oid.to_raw(&codec).unwrap().to_vec().unwrap(),
            b"\x06\x03\x2b\x06\x01"
        );

        // Structurally broken identifiers are refused.
        fn bad(content: &'static [u8]) {
            let raw = RawValue::primitive(Tag::OID, content);
            assert!(
                Oid::from_raw(&raw, &Codec::new(Mode::Ber), 0).is_err()
            );
        }
        bad(b"");
        bad(b"\x2b\x81");
        bad(b"\x2b\x80\x01");
    }
}
