//! Encoding errors.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use std::{error, fmt, io};
use std::borrow::Cow;
use crate::options::ParseError;


//------------ Error ---------------------------------------------------------

/// An error happened while encoding a value.
///
/// Encoding fails either because the value and its options cannot be
/// mapped onto a representation at all or because the target failed to
/// accept the produced octets. No partial output is kept in either case.
#[derive(Debug)]
pub enum Error {
    /// The value and options do not describe an encodable representation.
    Content(Cow<'static, str>),

    /// The field options are inconsistent.
    Options(ParseError),

    /// Writing to the target failed.
    Io(io::Error),
}

impl Error {
    /// Creates an error for a value that cannot be represented.
    pub fn content(msg: impl Into<Cow<'static, str>>) -> Self {
        Error::Content(msg.into())
    }
}

//--- From

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Options(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

//--- Display and Error

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Content(ref msg) => msg.fmt(f),
            Error::Options(ref err) => err.fmt(f),
            Error::Io(ref err) => write!(f, "write error: {}", err),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Content(_) => None,
            Error::Options(ref err) => Some(err),
            Error::Io(ref err) => Some(err),
        }
    }
}
