//! Decoding BER-encoded data.
//!
//! The raw layer of decoding lives in [`RawValue`] itself; this module
//! provides everything around it: [`Source`] wraps a reader and keeps
//! track of the input position, [`Fields`] iterates over the children of
//! a constructed value, [`Decode`] is the trait for types that can be
//! created from a raw value, and [`Error`] is what every step of decoding
//! returns when the data is broken.
//!
//! [`RawValue`]: crate::RawValue

pub use self::error::Error;
pub use self::fields::Fields;
pub use self::source::Source;
pub use self::value::Decode;

pub(crate) use self::value::check_primitive;

mod error;
mod fields;
mod source;
mod value;
