//! Raw encoded values.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use std::io;
use bytes::Bytes;
use crate::codec::Codec;
use crate::decode::{Decode, Error, Fields, Source};
use crate::encode::{self, Encode};
use crate::ident::{Ident, Tag};
use crate::length::Length;
use crate::mode::Mode;


//------------ RawValue ------------------------------------------------------

/// A single encoded value, independent of any Rust type.
///
/// Every BER or DER value is a triplet of identifier octets, length octets,
/// and content octets. A raw value keeps the decoded identifier – the tag
/// and whether the value is constructed – together with the content octets.
/// The content of a constructed value is the concatenation of the complete
/// encodings of its children; the content of a primitive value is just
/// data. Content octets are taken as given: the constructors don’t check
/// that the content of a constructed value actually parses.
///
/// A value remembers whether it uses the indefinite length form. When
/// decoding, the content of an indefinite value is re-assembled from its
/// children up to the end-of-contents marker, with each child rendered in
/// its shortest definite form unless it was itself indefinite. Because the
/// flag survives decoding, re-encoding such a value reproduces the original
/// octets.
///
/// Raw values are what the mapping layer produces and consumes. They can
/// also be used directly to work with encodings no Rust type describes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawValue {
    /// The tag of the value.
    pub(crate) tag: Tag,

    /// Whether the value is constructed.
    pub(crate) constructed: bool,

    /// Whether the value uses the indefinite length form.
    ///
    /// Only constructed values can. This is checked when encoding, not
    /// here.
    pub(crate) indefinite: bool,

    /// The content octets.
    pub(crate) content: Bytes,
}

/// # Creation
///
impl RawValue {
    /// Creates a primitive value with the given tag and content.
    pub fn primitive(tag: Tag, content: impl Into<Bytes>) -> Self {
        RawValue {
            tag,
            constructed: false,
            indefinite: false,
            content: content.into(),
        }
    }

    /// Creates a constructed value with the given tag and content.
    ///
    /// The content needs to be the concatenation of the complete encodings
    /// of the children.
    pub fn constructed(tag: Tag, content: impl Into<Bytes>) -> Self {
        RawValue {
            tag,
            constructed: true,
            indefinite: false,
            content: content.into(),
        }
    }

    /// Creates a SEQUENCE from the given children.
    pub fn sequence(
        children: impl IntoIterator<Item = RawValue>
    ) -> Result<Self, encode::Error> {
        let mut content = Vec::new();
        for child in children {
            child.write_encoded(&mut content)?;
        }
        Ok(Self::constructed(Tag::SEQUENCE, content))
    }
}

/// # Access to components
///
impl RawValue {
    /// Returns the tag of the value.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Returns whether the value is constructed.
    pub fn is_constructed(&self) -> bool {
        self.constructed
    }

    /// Returns whether the value uses the indefinite length form.
    pub fn is_indefinite(&self) -> bool {
        self.indefinite
    }

    /// Returns the content octets of the value.
    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// Returns a cursor over the children of a constructed value.
    ///
    /// `pos` is the position of the content within the overall input and
    /// is used for error reporting. Returns an error for a primitive
    /// value.
    pub fn fields(&self, pos: u64) -> Result<Fields, Error> {
        if !self.constructed {
            return Err(Error::content("expected constructed value", pos))
        }
        Ok(Fields::new(&self.content, pos))
    }
}

/// # Encoding
///
impl RawValue {
    /// Returns the number of octets of the complete encoding.
    pub fn encoded_len(&self) -> usize {
        self.header_len() + self.content.len()
            + if self.indefinite { 2 } else { 0 }
    }

    /// Returns the number of octets before the content octets.
    pub(crate) fn header_len(&self) -> usize {
        Ident::new(self.tag, self.constructed).encoded_len()
            + self.length().encoded_len()
    }

    /// Returns the length octets of the value.
    fn length(&self) -> Length {
        if self.indefinite {
            Length::Indefinite
        }
        else {
            Length::Definite(self.content.len())
        }
    }

    /// Writes the complete encoding of the value to a target.
    ///
    /// Fails with a content error if the value claims the indefinite
    /// length form but is primitive, which has no valid encoding.
    pub fn write_encoded<W: io::Write>(
        &self, target: &mut W
    ) -> Result<(), encode::Error> {
        if self.indefinite && !self.constructed {
            return Err(encode::Error::content(
                "indefinite length primitive value"
            ))
        }
        Ok(self.write_parts(target)?)
    }

    /// Writes identifier, length, content, and end-of-contents octets.
    ///
    /// This is the io core of [`write_encoded`][Self::write_encoded]. The
    /// shape check lives there.
    fn write_parts<W: io::Write>(
        &self, target: &mut W
    ) -> Result<(), io::Error> {
        Ident::new(self.tag, self.constructed).write(target)?;
        self.length().write(target)?;
        target.write_all(&self.content)?;
        if self.indefinite {
            target.write_all(&[0, 0])?;
        }
        Ok(())
    }

    /// Returns the complete encoding of the value as a vec.
    pub fn to_vec(&self) -> Result<Vec<u8>, encode::Error> {
        let mut res = Vec::with_capacity(self.encoded_len());
        self.write_encoded(&mut res)?;
        Ok(res)
    }
}

/// # Decoding
///
impl RawValue {
    /// Takes a single value from the beginning of a source.
    ///
    /// In [`Mode::Der`], the indefinite length form and redundant length
    /// octets are refused. An end-of-contents marker in place of a value
    /// is an error here; it is only valid inside an indefinite value,
    /// where the decoding loop handles it itself.
    pub fn take_from<R: io::Read>(
        source: &mut Source<R>, mode: Mode
    ) -> Result<Self, Error> {
        let start = source.pos();
        let first = source.take_u8()?;
        if first == 0 {
            return Err(Error::content("unexpected end-of-contents", start))
        }
        Self::take_tail(first, start, source, mode)
    }

    /// Takes a value whose first octet has already been read.
    fn take_tail<R: io::Read>(
        first: u8, start: u64, source: &mut Source<R>, mode: Mode
    ) -> Result<Self, Error> {
        let ident = Ident::read_tail(first, start, source)?;
        let length = Length::take_from(source, mode)?;
        match length.definite() {
            Some(len) => {
                Ok(RawValue {
                    tag: ident.tag,
                    constructed: ident.constructed,
                    indefinite: false,
                    content: source.take_bytes(len)?,
                })
            }
            None => {
                if !ident.constructed {
                    return Err(Error::content(
                        "indefinite length primitive value", start
                    ))
                }
                let mut content = Vec::new();
                loop {
                    let child_start = source.pos();
                    let octet = source.take_u8()?;
                    if octet == 0 {
                        if source.take_u8()? != 0 {
                            return Err(Error::content(
                                "invalid end-of-contents octets",
                                child_start
                            ))
                        }
                        break
                    }
                    let child = Self::take_tail(
                        octet, child_start, source, mode
                    )?;
                    child.write_parts(&mut content).map_err(|err| {
                        Error::io(err, child_start)
                    })?;
                }
                Ok(RawValue {
                    tag: ident.tag,
                    constructed: ident.constructed,
                    indefinite: true,
                    content: content.into(),
                })
            }
        }
    }
}

//--- Encode and Decode
//
// A raw value passes through the mapping layer unchanged. This makes it
// the field type for content that is kept encoded, such as the members of
// a heterogeneous SET or the value of an open type.

impl Encode for RawValue {
    fn to_raw(&self, _: &Codec) -> Result<RawValue, encode::Error> {
        Ok(self.clone())
    }
}

impl Decode for RawValue {
    const TAG: Option<Tag> = None;

    fn from_raw(
        raw: &RawValue, _: &Codec, _: u64
    ) -> Result<Self, Error> {
        Ok(raw.clone())
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn take(data: &[u8], mode: Mode) -> Result<RawValue, Error> {
        let mut source = Source::new(data);
        let res = RawValue::take_from(&mut source, mode)?;
        assert_eq!(source.pos(), data.len() as u64, "trailing data");
        Ok(res)
    }

    fn indefinite(tag: Tag, content: &'static [u8]) -> RawValue {
        RawValue {
            tag,
            constructed: true,
            indefinite: true,
            content: content.into(),
        }
    }

    #[test]
    fn encode_primitive() {
        fn step(value: RawValue, expected: &[u8]) {
            let vec = value.to_vec().unwrap();
            assert_eq!(vec, expected);
            assert_eq!(vec.len(), value.encoded_len());
        }

        step(
            RawValue::primitive(Tag::INTEGER, b"\x05".as_ref()),
            b"\x02\x01\x05"
        );
        step(RawValue::primitive(Tag::NULL, b"".as_ref()), b"\x05\x00");
        step(
            RawValue::primitive(Tag::ctx(200), b"\xab".as_ref()),
            b"\x9f\x81\x48\x01\xab"
        );
        step(
            RawValue::primitive(Tag::OCTET_STRING, vec![0u8; 0x80]),
            &[b"\x04\x81\x80".as_ref(), &[0u8; 0x80]].concat()
        );
    }

    #[test]
    fn encode_sequence() {
        let seq = RawValue::sequence([
            RawValue::primitive(Tag::INTEGER, b"\x05".as_ref()),
            RawValue::primitive(Tag::OCTET_STRING, b"hi".as_ref()),
        ]).unwrap();
        assert_eq!(seq.tag(), Tag::SEQUENCE);
        assert!(seq.is_constructed());
        assert_eq!(
            seq.to_vec().unwrap(),
            b"\x30\x07\x02\x01\x05\x04\x02hi"
        );

        let empty = RawValue::sequence([]).unwrap();
        assert_eq!(empty.to_vec().unwrap(), b"\x30\x00");
    }

    #[test]
    fn encode_indefinite() {
        let value = indefinite(Tag::SEQUENCE, b"\x02\x01\x05");
        assert_eq!(
            value.to_vec().unwrap(),
            b"\x30\x80\x02\x01\x05\x00\x00"
        );
        assert_eq!(value.encoded_len(), 7);

        // The indefinite form needs a constructed value.
        let bad = RawValue {
            constructed: false,
            ..indefinite(Tag::INTEGER, b"\x05")
        };
        assert!(bad.to_vec().is_err());
        assert!(bad.write_encoded(&mut Vec::new()).is_err());
    }

    #[test]
    fn take_definite() {
        assert_eq!(
            take(b"\x02\x01\x05", Mode::Ber).unwrap(),
            RawValue::primitive(Tag::INTEGER, b"\x05".as_ref())
        );
        assert_eq!(
            take(b"\x30\x05\x02\x01\x05\x05\x00", Mode::Der).unwrap(),
            RawValue::constructed(
                Tag::SEQUENCE, b"\x02\x01\x05\x05\x00".as_ref()
            )
        );
        assert_eq!(
            take(b"\x9f\x81\x48\x01\xab", Mode::Der).unwrap(),
            RawValue::primitive(Tag::ctx(200), b"\xab".as_ref())
        );

        // BER tolerates redundant length octets, DER doesn’t.
        assert_eq!(
            take(b"\x02\x81\x01\x05", Mode::Ber).unwrap(),
            RawValue::primitive(Tag::INTEGER, b"\x05".as_ref())
        );
        assert!(take(b"\x02\x81\x01\x05", Mode::Der).is_err());
    }

    #[test]
    fn take_indefinite() {
        assert_eq!(
            take(b"\x30\x80\x02\x01\x05\x00\x00", Mode::Ber).unwrap(),
            indefinite(Tag::SEQUENCE, b"\x02\x01\x05")
        );

        // Nested indefinite children keep their length form so that
        // re-encoding reproduces the input.
        let nested = take(
            b"\x30\x80\x30\x80\x02\x01\x05\x00\x00\x00\x00", Mode::Ber
        ).unwrap();
        assert_eq!(
            nested,
            indefinite(Tag::SEQUENCE, b"\x30\x80\x02\x01\x05\x00\x00")
        );
        assert_eq!(
            nested.to_vec().unwrap(),
            b"\x30\x80\x30\x80\x02\x01\x05\x00\x00\x00\x00"
        );

        // Redundant length octets of children are normalised away.
        assert_eq!(
            take(b"\x30\x80\x02\x81\x01\x05\x00\x00", Mode::Ber).unwrap(),
            indefinite(Tag::SEQUENCE, b"\x02\x01\x05")
        );

        // DER refuses the indefinite form whole.
        assert!(take(b"\x30\x80\x02\x01\x05\x00\x00", Mode::Der).is_err());
    }

    #[test]
    fn take_errors() {
        fn step(data: &[u8], pos: u64) {
            let err = take(data, Mode::Ber).unwrap_err();
            assert!(err.is_content(), "{data:02x?}");
            assert_eq!(err.pos(), pos, "{data:02x?}: {err}");
        }

        // Truncated content.
        step(b"\x02\x05\x01", 2);
        // Input ends in the middle of the length octets.
        step(b"\x02\x83\x01\x02", 4);
        // End-of-contents in place of a value.
        step(b"\x00\x00", 0);
        // Indefinite form on a primitive value.
        step(b"\x02\x80\x05\x00\x00", 0);
        // Missing end-of-contents marker.
        step(b"\x30\x80\x02\x01\x05", 5);
        // Half an end-of-contents marker.
        step(b"\x30\x80\x00\x01", 2);
    }

    #[test]
    fn fields() {
        let value = RawValue::constructed(
            Tag::SEQUENCE, b"\x02\x01\x05".as_ref()
        );
        assert!(value.fields(0).is_ok());
        assert!(
            RawValue::primitive(Tag::INTEGER, b"\x05".as_ref())
                .fields(0).is_err()
        );
    }
}
