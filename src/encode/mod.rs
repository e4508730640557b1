//! Encoding data in BER and DER.
//!
//! Encoding is driven by the [`Codec`]: a type implementing [`Encode`]
//! renders itself into a [`RawValue`] and the codec applies the field
//! options and writes out the octets. The [`Error`] type collects
//! everything that can go wrong on the way.
//!
//! [`Codec`]: crate::Codec
//! [`RawValue`]: crate::RawValue

pub use self::error::Error;
pub use self::value::Encode;

mod error;
mod value;
