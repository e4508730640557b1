//! The data source for decoding.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use std::io;
use std::borrow::Cow;
use std::io::Read;
use bytes::Bytes;
use super::error::Error;


//------------ Source --------------------------------------------------------

/// A reader wrapped for decoding.
///
/// The type keeps track of the number of octets read so far so that errors
/// can point at the exact position of offending data. Reading is strictly
/// forward. There is no peeking and no seeking; anything that has been
/// handed out is considered consumed.
///
/// Since `&[u8]` implements [`io::Read`], a source can be created directly
/// atop a slice.
#[derive(Debug)]
pub struct Source<R> {
    /// The underlying reader.
    reader: R,

    /// The number of octets read so far.
    pos: u64,
}

impl<R: io::Read> Source<R> {
    /// Creates a new source atop a reader.
    pub fn new(reader: R) -> Self {
        Source { reader, pos: 0 }
    }

    /// Returns the current position in the input.
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Takes a single octet from the source.
    ///
    /// If there aren’t any more octets available, returns a content error.
    pub fn take_u8(&mut self) -> Result<u8, Error> {
        let mut buf = [0u8; 1];
        self.reader.read_exact(&mut buf).map_err(|err| {
            Error::io(err, self.pos)
        })?;
        self.pos += 1;
        Ok(buf[0])
    }

    /// Takes exactly `len` octets from the source.
    ///
    /// Allocation grows with the data actually present, so a length octet
    /// claiming more data than the input holds fails with a content error
    /// rather than attempting to reserve the claimed amount.
    pub fn take_bytes(&mut self, len: usize) -> Result<Bytes, Error> {
        let start = self.pos;
        let mut buf = Vec::new();
        let got = (&mut self.reader).take(len as u64).read_to_end(
            &mut buf
        ).map_err(|err| Error::io(err, start))?;
        self.pos += got as u64;
        if got < len {
            return Err(Error::content("unexpected end of data", start))
        }
        Ok(buf.into())
    }

    /// Returns a content error at the current position of the source.
    pub fn content_err(
        &self, msg: impl Into<Cow<'static, str>>
    ) -> Error {
        Error::content(msg, self.pos)
    }
}


//============ Tests =========================================================
