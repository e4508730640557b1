//! The BER variant in use.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

//------------ Mode ----------------------------------------------------------

/// The encoding rules in effect for a codec.
///
/// The Basic Encoding Rules leave a number of choices to the sender: lengths
/// may use any of several forms, SET members may appear in any order, and
/// DEFAULT values may be present or absent. The Distinguished Encoding Rules
/// remove all these choices so that a given value has exactly one encoding.
///
/// A codec carries one of these variants and applies it everywhere a choice
/// exists: length forms and indefinite lengths, SET member order, and the
/// emission of values equal to their DEFAULT.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Mode {
    /// Basic Encoding Rules.
    ///
    /// All length forms are accepted, SET members keep their given order,
    /// and DEFAULT values are emitted.
    Ber,

    /// Distinguished Encoding Rules.
    ///
    /// Lengths must be definite and minimal, SET members are sorted into
    /// canonical order, and values equal to their DEFAULT are dropped.
    Der,
}

impl Mode {
    /// Returns whether the mode demands canonical encodings.
    pub fn is_canonical(self) -> bool {
        matches!(self, Mode::Der)
    }
}

//--- Default

impl Default for Mode {
    fn default() -> Self {
        Mode::Ber
    }
}
