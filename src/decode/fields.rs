//! A cursor over the children of a constructed value.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use crate::mode::Mode;
use crate::raw::RawValue;
use super::error::Error;
use super::source::Source;


//------------ Fields --------------------------------------------------------

/// The children of a constructed value, one at a time.
///
/// A cursor is created via [`RawValue::fields`] and walks the content of
/// the value strictly forward. The next child can be inspected with
/// [`peek`][Self::peek] without consuming it, which is what drives the
/// matching of OPTIONAL fields and CHOICE alternatives: look at the tag,
/// then either [`take`][Self::take] the child or leave it for the next
/// field.
///
/// Positions reported in errors are absolute within the overall input,
/// based on the position the cursor was created with.
#[derive(Debug)]
pub struct Fields<'a> {
    /// The content octets that remain to be decoded.
    data: &'a [u8],

    /// The position of the start of `data` in the overall input.
    pos: u64,

    /// The next child if it has been peeked at already.
    pending: Option<Pending>,
}

/// A decoded child that hasn’t been taken yet.
#[derive(Debug)]
struct Pending {
    /// The child itself.
    value: RawValue,

    /// The position of the child’s content.
    content_pos: u64,

    /// The number of octets of the child’s complete encoding.
    consumed: usize,
}

impl<'a> Fields<'a> {
    /// Creates a cursor over content starting at `pos` in the input.
    pub(crate) fn new(data: &'a [u8], pos: u64) -> Self {
        Fields { data, pos, pending: None }
    }

    /// Returns whether all children have been taken.
    pub fn is_empty(&self) -> bool {
        self.pending.is_none() && self.data.is_empty()
    }

    /// Returns the position of the next child in the overall input.
    ///
    /// If the cursor is exhausted, this is the position right after the
    /// content.
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Returns the next child without consuming it.
    ///
    /// Returns `None` if there are no more children. The child stays put,
    /// so repeated peeking decodes it only once.
    pub fn peek(&mut self, mode: Mode) -> Result<Option<&RawValue>, Error> {
        if self.pending.is_none() {
            if self.data.is_empty() {
                return Ok(None)
            }
            let mut source = Source::new(self.data);
            let value = RawValue::take_from(
                &mut source, mode
            ).map_err(|err| err.offset(self.pos))?;
            self.pending = Some(Pending {
                content_pos: self.pos + value.header_len() as u64,
                consumed: source.pos() as usize,
                value,
            });
        }
        Ok(self.pending.as_ref().map(|pending| &pending.value))
    }

    /// Takes the next child.
    ///
    /// Returns the child together with the position of its content, or
    /// `None` if there are no more children.
    pub fn take(
        &mut self, mode: Mode
    ) -> Result<Option<(RawValue, u64)>, Error> {
        self.peek(mode)?;
        match self.pending.take() {
            Some(pending) => {
                self.data = &self.data[pending.consumed..];
                self.pos += pending.consumed as u64;
                Ok(Some((pending.value, pending.content_pos)))
            }
            None => Ok(None)
        }
    }

    /// Checks that all children have been taken.
    pub fn finish(&self) -> Result<(), Error> {
        if self.is_empty() {
            Ok(())
        }
        else {
            Err(Error::content("trailing data", self.pos))
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::ident::Tag;

    #[test]
    fn walk() {
        let mut fields = Fields::new(b"\x02\x01\x05\x04\x02hi", 10);
        assert!(!fields.is_empty());
        assert_eq!(fields.pos(), 10);

        assert_eq!(
            fields.peek(Mode::Ber).unwrap().unwrap().tag(), Tag::INTEGER
        );
        assert_eq!(
            fields.peek(Mode::Ber).unwrap().unwrap().tag(), Tag::INTEGER
        );
        assert_eq!(fields.pos(), 10);

        let (value, content_pos) = fields.take(Mode::Ber).unwrap().unwrap();
        assert_eq!(value.content().as_ref(), b"\x05");
        assert_eq!(content_pos, 12);
        assert_eq!(fields.pos(), 13);

        let (value, content_pos) = fields.take(Mode::Ber).unwrap().unwrap();
        assert_eq!(value.tag(), Tag::OCTET_STRING);
        assert_eq!(content_pos, 15);

        assert!(fields.is_empty());
        assert!(fields.take(Mode::Ber).unwrap().is_none());
        assert!(fields.peek(Mode::Ber).unwrap().is_none());
        fields.finish().unwrap();
    }

    #[test]
    fn empty() {
        let mut fields = Fields::new(b"", 5);
        assert!(fields.is_empty());
        assert!(fields.peek(Mode::Ber).unwrap().is_none());
        fields.finish().unwrap();
    }

    #[test]
    fn trailing() {
        let mut fields = Fields::new(b"\x02\x01\x05\x04\x02hi", 0);
        fields.take(Mode::Ber).unwrap();
        let err = fields.finish().unwrap_err();
        assert_eq!(err.pos(), 3);

        // A peeked but untaken child is trailing data, too.
        fields.peek(Mode::Ber).unwrap();
        assert!(fields.finish().is_err());
    }

    #[test]
    fn absolute_positions() {
        // The child claims more content than there is.
        let mut fields = Fields::new(b"\x02\x05\x01", 20);
        let err = fields.peek(Mode::Ber).unwrap_err();
        assert_eq!(err.pos(), 22);

        // Strictness follows the mode.
        let mut fields = Fields::new(b"\x02\x81\x01\x05", 0);
        assert!(fields.peek(Mode::Der).is_err());
        let mut fields = Fields::new(b"\x02\x81\x01\x05", 0);
        assert!(fields.take(Mode::Ber).unwrap().is_some());
    }
}
