//! Schema-directed handling of data in BER and DER.
//!
//! This crate lets you map Rust values to ASN.1 encodings and back
//! without going through a schema compiler. It works on two layers.
//!
//! The raw layer deals in [`RawValue`]s: single encoded values made up of
//! a [`Tag`], the constructed flag, and content octets. Raw values can be
//! parsed from and written to anything byte-shaped and know about both
//! length forms of the Basic Encoding Rules.
//!
//! The mapping layer is driven by a [`Codec`]. Types state how they
//! become a raw value by implementing [`Encode`] and how they are
//! rebuilt from one by implementing [`Decode`]; implementations for the
//! common types – booleans, the built-in integers, strings, byte
//! strings, vecs, and options – are provided, as are [`Integer`],
//! [`Oid`], and [`Null`] for their ASN.1 namesakes. Everything a real
//! schema would add to a field lives in [`FieldOptions`]: implicit and
//! explicit tagging, OPTIONAL fields, DEFAULT values, SET handling, the
//! indefinite length form, and references to CHOICE groups registered in
//! a [`ChoiceRegistry`]. The codec’s [`Mode`] selects between the
//! liberal BER rules and the canonical DER subset; the same value and
//! options thus serve lenient decoding and strict re-encoding alike.
//!
//! ```
//! use bermap::{Codec, FieldOptions, Mode};
//!
//! let codec = Codec::new(Mode::Der);
//! let options = FieldOptions::parse("tag:0,explicit").unwrap();
//! let bytes = codec.encode_with(&1969i64, &options).unwrap();
//! assert_eq!(bytes, b"\xa0\x04\x02\x02\x07\xb1");
//! assert_eq!(codec.decode_with::<i64>(&bytes, &options).unwrap(), 1969);
//! ```
//!
//! Structured types implement the two traits by encoding and decoding
//! their fields one by one through [`Codec::encode_field`] and
//! [`Codec::decode_field`]; the documentation of [`Codec`] shows a
//! complete example. The grammar of the options string is described at
//! [`FieldOptions`].

pub use self::choice::{ChoiceRegistry, RegistryError};
pub use self::codec::Codec;
pub use self::decode::Decode;
pub use self::encode::Encode;
pub use self::ident::{Class, Tag};
pub use self::int::Integer;
pub use self::mode::Mode;
pub use self::null::Null;
pub use self::oid::{ConstOid, Oid};
pub use self::options::{FieldOptions, ParseError};
pub use self::raw::RawValue;

pub mod decode;
pub mod encode;
pub mod oid;

mod choice;
mod codec;
mod ident;
mod int;
mod length;
mod mode;
mod null;
mod options;
mod order;
mod raw;
