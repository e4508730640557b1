//! Decoding errors.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use std::{error, fmt, io};
use std::borrow::Cow;
use crate::options::ParseError;


//------------ Error ---------------------------------------------------------

/// An error happened while decoding data.
///
/// The error carries the position in the input at which the offending data
/// starts. For data read from a reader, this is the number of octets read
/// before the value in question. For data decoded from a slice, it is the
/// index into that slice. Within an indefinite length value the position
/// refers to the re-assembled content and may differ from the raw input if
/// that input used redundant length forms.
///
/// Errors are created through [`Error::content`] for violations of the
/// encoding rules and through [`Error::io`] for errors reported by the
/// underlying reader.
#[derive(Debug)]
pub struct Error {
    /// What happened.
    inner: Inner,

    /// Where it happened.
    pos: u64,
}

#[derive(Debug)]
enum Inner {
    /// The data did not conform to the encoding rules.
    Content(Cow<'static, str>),

    /// The field options driving the decoder were broken.
    Options(ParseError),

    /// The underlying reader failed.
    Io(io::Error),
}

impl Error {
    /// Creates an error for data violating the encoding rules.
    pub fn content(msg: impl Into<Cow<'static, str>>, pos: u64) -> Self {
        Error {
            inner: Inner::Content(msg.into()),
            pos,
        }
    }

    /// Creates an error for broken field options.
    pub(crate) fn options(err: ParseError) -> Self {
        Error {
            inner: Inner::Options(err),
            pos: 0,
        }
    }

    /// Creates an error for a failed read from the underlying reader.
    ///
    /// An unexpected end of the data is reported as a content error since
    /// it means the encoded lengths point past the end of the input.
    pub fn io(err: io::Error, pos: u64) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            return Error::content("unexpected end of data", pos)
        }
        Error {
            inner: Inner::Io(err),
            pos,
        }
    }

    /// Returns the position in the input at which the error occurred.
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Returns whether the error is a content error.
    ///
    /// Returns `false` if the underlying reader failed or the field
    /// options themselves were broken, i.e., if nothing can be said about
    /// the correctness of the data itself.
    pub fn is_content(&self) -> bool {
        matches!(self.inner, Inner::Content(_))
    }

    /// Moves the error position by the given base offset.
    ///
    /// Used when decoding happened against a slice that itself sits at
    /// `base` within the overall input.
    pub(crate) fn offset(mut self, base: u64) -> Self {
        self.pos += base;
        self
    }
}

//--- Display and Error

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.inner {
            Inner::Content(ref msg) => {
                write!(f, "invalid data at position {}: {}", self.pos, msg)
            }
            Inner::Options(ref err) => {
                write!(f, "invalid field options: {}", err)
            }
            Inner::Io(ref err) => {
                write!(f, "read error at position {}: {}", self.pos, err)
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self.inner {
            Inner::Content(_) => None,
            Inner::Options(ref err) => Some(err),
            Inner::Io(ref err) => Some(err),
        }
    }
}


//============ Tests =========================================================
