//! The length octets.
//!
//! This is a private module. Its items stay internal to the crate.

use std::{io, mem};
use crate::decode::{Error, Source};
use crate::mode::Mode;


//------------ Length --------------------------------------------------------

/// The length octets of an encoded value.
///
/// A length is either definite, giving the exact number of content octets,
/// or indefinite, in which case the content runs until an end-of-contents
/// marker.
///
/// # BER Encoding
///
/// If the most significant bit of the first octet is clear, the remaining
/// seven bits are the definite length. Otherwise the remaining bits give
/// the number of octets that follow with the big-endian length, except
/// that 0x80 on its own marks the indefinite form and 0xFF is reserved.
///
/// Encoding always uses the shortest possible form. Decoding in BER mode
/// tolerates redundant leading zero octets in the long form; in DER mode
/// any non-minimal form and the indefinite form are errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Length {
    /// A definite length of the given number of octets.
    Definite(usize),

    /// The indefinite form.
    Indefinite,
}

impl Length {
    /// Returns the length if it is definite.
    pub fn definite(self) -> Option<usize> {
        match self {
            Length::Definite(len) => Some(len),
            Length::Indefinite => None,
        }
    }

    /// Parses the length octets from the beginning of a source.
    pub fn take_from<R: io::Read>(
        source: &mut Source<R>, mode: Mode
    ) -> Result<Self, Error> {
        let start = source.pos();
        let first = source.take_u8()?;
        if first & 0x80 == 0 {
            return Ok(Length::Definite(first as usize))
        }
        if first == 0x80 {
            if mode.is_canonical() {
                return Err(Error::content("indefinite length in DER", start))
            }
            return Ok(Length::Indefinite)
        }
        if first == 0xFF {
            return Err(Error::content("reserved length octets", start))
        }

        let count = (first & 0x7F) as usize;
        let mut res = 0usize;
        let mut seen = 0;
        for _ in 0..count {
            let octet = source.take_u8()?;
            if octet == 0 && seen == 0 {
                if mode.is_canonical() {
                    return Err(Error::content(
                        "non-minimal length octets", start
                    ))
                }
                continue
            }
            seen += 1;
            if seen > mem::size_of::<usize>() {
                return Err(Error::content("excessive length", start))
            }
            res = res << 8 | octet as usize;
        }
        if mode.is_canonical() && count == 1 && res < 0x80 {
            return Err(Error::content("non-minimal length octets", start))
        }
        Ok(Length::Definite(res))
    }

    /// Returns the number of octets of the encoded length.
    pub fn encoded_len(self) -> usize {
        match self {
            Length::Definite(len) if len < 0x80 => 1,
            Length::Definite(len) => 1 + Self::significant(len),
            Length::Indefinite => 1,
        }
    }

    /// Writes the encoded length in its shortest form.
    pub fn write<W: io::Write>(self, target: &mut W) -> Result<(), io::Error> {
        match self {
            Length::Definite(len) if len < 0x80 => {
                target.write_all(&[len as u8])
            }
            Length::Definite(len) => {
                let sig = Self::significant(len);
                target.write_all(&[(sig | 0x80) as u8])?;
                target.write_all(
                    &len.to_be_bytes()[mem::size_of::<usize>() - sig..]
                )
            }
            Length::Indefinite => target.write_all(&[0x80]),
        }
    }

    /// Returns the number of significant octets of a length value.
    fn significant(len: usize) -> usize {
        mem::size_of::<usize>() - (len.leading_zeros() / 8) as usize
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn take(data: &[u8], mode: Mode) -> Result<Length, Error> {
        let mut source = Source::new(data);
        let res = Length::take_from(&mut source, mode)?;
        assert_eq!(source.pos(), data.len() as u64, "trailing data");
        Ok(res)
    }

    #[test]
    fn ber_take_from() {
        fn step(data: &[u8]) -> Option<usize> {
            take(data, Mode::Ber).unwrap().definite()
        }

        assert_eq!(step(b"\x00"), Some(0x00));
        assert_eq!(step(b"\x12"), Some(0x12));
        assert_eq!(step(b"\x7f"), Some(0x7f));
        assert_eq!(step(b"\x80"), None);
        assert_eq!(step(b"\x81\x00"), Some(0));
        assert_eq!(step(b"\x81\xF0"), Some(0xF0));
        assert_eq!(step(b"\x82\x00\x00"), Some(0));
        assert_eq!(step(b"\x82\xF0\x0E"), Some(0xF00E));
        assert_eq!(step(b"\x82\x00\x0E"), Some(0x0E));
        assert!(take(b"\xFF", Mode::Ber).is_err());
        assert!(take(b"\x82\xF0", Mode::Ber).is_err());
    }

    #[test]
    fn der_take_from() {
        fn step(data: &[u8]) -> Option<usize> {
            take(data, Mode::Der).unwrap().definite()
        }

        assert_eq!(step(b"\x00"), Some(0x00));
        assert_eq!(step(b"\x12"), Some(0x12));
        assert_eq!(step(b"\x7f"), Some(0x7f));
        assert_eq!(step(b"\x81\x80"), Some(0x80));
        assert_eq!(step(b"\x81\xF0"), Some(0xF0));
        assert_eq!(step(b"\x82\xF0\x0E"), Some(0xF00E));

        // The indefinite form is out in DER.
        assert!(take(b"\x80", Mode::Der).is_err());

        // As is anything that has a shorter form.
        assert!(take(b"\x81\x00", Mode::Der).is_err());
        assert!(take(b"\x81\x7f", Mode::Der).is_err());
        assert!(take(b"\x82\x00\x00", Mode::Der).is_err());
        assert!(take(b"\x82\x00\x0E", Mode::Der).is_err());

        assert!(take(b"\xFF", Mode::Der).is_err());
    }

    #[test]
    fn encode() {
        fn step<const N: usize>(length: Length, res: &[u8; N]) {
            let mut vec = Vec::new();
            length.write(&mut vec).unwrap();
            assert_eq!(
                vec.as_slice(), res.as_ref(),
                "write failed for {length:?}: {vec:?}"
            );
            assert_eq!(vec.len(), length.encoded_len());
        }

        step(Length::Indefinite, b"\x80");
        step(Length::Definite(0), b"\x00");
        step(Length::Definite(0x12), b"\x12");
        step(Length::Definite(0x7f), b"\x7f");
        step(Length::Definite(0x80), b"\x81\x80");
        step(Length::Definite(0xdead), b"\x82\xde\xad");
        step(Length::Definite(0x10000), b"\x83\x01\x00\x00");
    }
}
