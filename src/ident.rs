//! The identifier octets of a BER encoded value.
//!
//! This is a private module. The relevant items are re-exported by the
//! parent.

use std::{fmt, io};
use crate::decode::{Error, Source};


//------------ Class ---------------------------------------------------------

/// The class of a tag.
///
/// Every tag belongs to one of four classes, encoded in the top two bits of
/// the first identifier octet. The variants are declared in the order of
/// their numerical class values, which is also the order used when sorting
/// SET members canonically.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Class {
    /// The universal class of the types defined by X.680 itself.
    Universal,

    /// The application class, assigned by an application’s specification.
    Application,

    /// The context-specific class, interpreted relative to the enclosing
    /// type. This is the class tagging options use unless told otherwise.
    Context,

    /// The private class.
    Private,
}

impl Class {
    /// Creates a class from its numerical value.
    ///
    /// The four classes have the values 0 through 3. Any other value does
    /// not name a class and results in `None`. This is the one place where
    /// numbers enter the system, so nothing downstream ever holds an
    /// out-of-range class.
    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            0 => Some(Class::Universal),
            1 => Some(Class::Application),
            2 => Some(Class::Context),
            3 => Some(Class::Private),
            _ => None,
        }
    }

    /// Returns the numerical value of the class.
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// Returns the class bits positioned for the first identifier octet.
    const fn bits(self) -> u8 {
        (self as u8) << 6
    }

    /// Creates a class from the top two bits of an identifier octet.
    const fn from_bits(octet: u8) -> Self {
        match octet & 0xC0 {
            0x00 => Class::Universal,
            0x40 => Class::Application,
            0x80 => Class::Context,
            _ => Class::Private,
        }
    }
}

//--- Display

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Class::Universal => f.write_str("UNIVERSAL"),
            Class::Application => f.write_str("APPLICATION"),
            Class::Context => f.write_str("CONTEXT"),
            Class::Private => f.write_str("PRIVATE"),
        }
    }
}


//------------ Tag -----------------------------------------------------------

/// The tag of a value.
///
/// A tag consists of a [`Class`] and a number within that class. Together
/// with the primitive-or-constructed bit it forms the identifier octets
/// that start every encoded value.
///
/// # Limitations
///
/// Only tag numbers that fit into a `u32` are supported. This should be
/// more than enough in practice.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Tag {
    /// The class of the tag.
    class: Class,

    /// The number of the tag within its class.
    number: u32,
}

impl Tag {
    /// Creates a tag from a class and number.
    pub const fn new(class: Class, number: u32) -> Self {
        Tag { class, number }
    }

    /// Creates a tag in the context-specific class with the given number.
    pub const fn ctx(number: u32) -> Self {
        Self::new(Class::Context, number)
    }

    /// Returns the class of the tag.
    pub const fn class(self) -> Class {
        self.class
    }

    /// Returns the number of the tag.
    pub const fn number(self) -> u32 {
        self.number
    }
}

/// # Constants for universal tags
///
/// See clause 8.4 of ITU Recommendation X.690. Only the universal types the
/// mapping layer produces are provided here; any other tag can be created
/// via [`Tag::new`].
impl Tag {
    /// The tag for the BOOLEAN type, UNIVERSAL 1.
    pub const BOOLEAN: Self = Self::new(Class::Universal, 1);

    /// The tag for the INTEGER type, UNIVERSAL 2.
    pub const INTEGER: Self = Self::new(Class::Universal, 2);

    /// The tag for the OCTET STRING type, UNIVERSAL 4.
    pub const OCTET_STRING: Self = Self::new(Class::Universal, 4);

    /// The tag for the NULL type, UNIVERSAL 5.
    pub const NULL: Self = Self::new(Class::Universal, 5);

    /// The tag for the OBJECT IDENTIFIER type, UNIVERSAL 6.
    pub const OID: Self = Self::new(Class::Universal, 6);

    /// The tag for the SEQUENCE and SEQUENCE OF types, UNIVERSAL 16.
    pub const SEQUENCE: Self = Self::new(Class::Universal, 16);

    /// The tag for the SET and SET OF types, UNIVERSAL 17.
    pub const SET: Self = Self::new(Class::Universal, 17);
}

//--- Display

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Tag::BOOLEAN => f.write_str("BOOLEAN"),
            Tag::INTEGER => f.write_str("INTEGER"),
            Tag::OCTET_STRING => f.write_str("OCTET STRING"),
            Tag::NULL => f.write_str("NULL"),
            Tag::OID => f.write_str("OBJECT IDENTIFIER"),
            Tag::SEQUENCE => f.write_str("SEQUENCE"),
            Tag::SET => f.write_str("SET"),
            _ => write!(f, "[{} {}]", self.class, self.number),
        }
    }
}


//------------ Ident ---------------------------------------------------------

/// The decoded identifier octets: a tag plus the constructed bit.
///
/// This is the transient carrier between the raw value type and the octet
/// level. It knows how to render itself in the shortest form and how to
/// read itself back.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Ident {
    /// The tag.
    pub tag: Tag,

    /// Whether the value is constructed.
    pub constructed: bool,
}

impl Ident {
    /// Creates a new identifier.
    pub fn new(tag: Tag, constructed: bool) -> Self {
        Ident { tag, constructed }
    }

    /// Returns the number of octets of the encoded identifier.
    ///
    /// Numbers up to 30 fit into the first octet. Anything larger needs
    /// the 0x1F marker followed by big-endian groups of seven bits.
    pub fn encoded_len(self) -> usize {
        let number = self.tag.number();
        if number < 0x1F {
            1
        }
        else {
            let bits = 32 - number.leading_zeros() as usize;
            1 + (bits + 6) / 7
        }
    }

    /// Writes the encoded identifier in its shortest form.
    pub fn write<W: io::Write>(self, target: &mut W) -> Result<(), io::Error> {
        let mut buf = [0u8; 6];
        let head = self.tag.class().bits()
            | if self.constructed { 0x20 } else { 0 };
        let number = self.tag.number();
        let len = if number < 0x1F {
            buf[0] = head | number as u8;
            1
        }
        else {
            buf[0] = head | 0x1F;
            let mut idx = 1;
            let mut shift = 28;
            while shift > 0 {
                let group = ((number >> shift) & 0x7F) as u8;
                if idx > 1 || group != 0 {
                    buf[idx] = group | 0x80;
                    idx += 1;
                }
                shift -= 7;
            }
            buf[idx] = (number & 0x7F) as u8;
            idx + 1
        };
        target.write_all(&buf[..len])
    }

    /// Reads the remainder of an identifier whose first octet is given.
    ///
    /// The caller has already taken the first octet from the source, at
    /// position `start`, and handled the end-of-contents marker. Extended
    /// tag numbers must be in their shortest form and fit into a `u32`.
    pub fn read_tail<R: io::Read>(
        first: u8, start: u64, source: &mut Source<R>
    ) -> Result<Self, Error> {
        let class = Class::from_bits(first);
        let constructed = first & 0x20 != 0;
        let mut number = u32::from(first & 0x1F);
        if number == 0x1F {
            let mut octet = source.take_u8()?;
            if octet == 0x80 {
                return Err(Error::content("invalid tag encoding", start))
            }
            number = 0;
            loop {
                if number > u32::MAX >> 7 {
                    return Err(Error::content("tag number too large", start))
                }
                number = number << 7 | u32::from(octet & 0x7F);
                if octet & 0x80 == 0 {
                    break
                }
                octet = source.take_u8()?;
            }
        }
        Ok(Ident::new(Tag::new(class, number), constructed))
    }
}


//============ Tests =========================================================
