//! Canonical ordering of SET members.
//!
//! This is a private module. Its items stay internal to the crate.

use std::cmp::Ordering;
use bytes::Bytes;
use smallvec::SmallVec;
use crate::decode::Source;
use crate::encode::Error;
use crate::ident::Tag;
use crate::mode::Mode;
use crate::raw::RawValue;


/// Compares two tags in canonical SET order.
///
/// Clause 10.3 of X.690 orders the members of a SET by their tags: by
/// class first, in the order universal, application, context-specific,
/// private, then by number within the class.
pub fn tag_cmp(left: Tag, right: Tag) -> Ordering {
    left.class().cmp(&right.class())
        .then_with(|| left.number().cmp(&right.number()))
}

/// Re-orders encoded values into canonical SET order.
///
/// `content` must be a concatenation of complete encodings, as produced
/// for the content of a constructed value. The sort is stable, so values
/// with equal tags keep their relative order.
pub fn sort_encoded(content: &[u8]) -> Result<Bytes, Error> {
    let mut source = Source::new(content);
    let mut children = SmallVec::<[RawValue; 8]>::new();
    while (source.pos() as usize) < content.len() {
        children.push(
            RawValue::take_from(&mut source, Mode::Ber).map_err(|err| {
                Error::content(format!("unreadable SET member: {}", err))
            })?
        );
    }
    children.sort_by(|left, right| tag_cmp(left.tag(), right.tag()));
    let mut res = Vec::with_capacity(content.len());
    for child in children {
        child.write_encoded(&mut res)?;
    }
    Ok(res.into())
}


//============ Tests =========================================================
