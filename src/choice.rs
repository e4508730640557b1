//! Registered CHOICE groups.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use std::{error, fmt};
use std::collections::HashMap;
use crate::ident::{Class, Tag};
use crate::options::{FieldOptions, ParseError};


//------------ ChoiceRegistry ------------------------------------------------

/// The CHOICE groups known to a codec.
///
/// An ASN.1 CHOICE carries no identity of its own; the encoding is that
/// of the chosen alternative, usually retagged so the alternatives can be
/// told apart. A registry collects such groups of alternatives under a
/// name which field options then refer to via `choice:<name>`.
///
/// Each alternative pairs the natural tag of the value being encoded with
/// the options applied to it. When encoding, the alternative whose natural
/// tag matches the value decides the options; when decoding, the
/// alternative whose resolved wire tag matches the data decides how to
/// read it. To keep decoding unambiguous, the resolved wire identities
/// within a group must be distinct. Natural tags may repeat; encoding then
/// picks the first registered alternative that matches.
///
/// A registry is built once and handed to [`Codec::with_choices`] which
/// shares it among all operations.
///
/// ```
/// use bermap::{ChoiceRegistry, FieldOptions, Tag};
///
/// let mut registry = ChoiceRegistry::new();
/// registry.add(
///     "value", Tag::INTEGER, FieldOptions::new().with_tag(0)
/// ).unwrap();
/// registry.add(
///     "value", Tag::OCTET_STRING, FieldOptions::new().with_tag(1)
/// ).unwrap();
/// ```
///
/// [`Codec::with_choices`]: crate::Codec::with_choices
#[derive(Clone, Debug, Default)]
pub struct ChoiceRegistry {
    /// The registered groups, by name.
    groups: HashMap<String, Vec<Alternative>>,
}

impl ChoiceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an alternative to the named group.
    ///
    /// The group is created if it doesn’t exist yet. `natural` is the tag
    /// the alternative’s value naturally encodes with and must be in the
    /// universal class. The options state how the alternative appears on
    /// the wire and are restricted to tagging, i.e., `tag`, a class, and
    /// `explicit`. They cannot refer to another choice group, and the
    /// resulting wire identity must differ from all alternatives already
    /// in the group.
    pub fn add(
        &mut self,
        group: &str,
        natural: Tag,
        options: FieldOptions,
    ) -> Result<(), RegistryError> {
        if natural.class() != Class::Universal {
            return Err(RegistryError::NotUniversal(natural))
        }
        if options.choice.is_some() {
            return Err(RegistryError::NestedChoice)
        }
        if let Some(option) = Self::non_tagging(&options) {
            return Err(RegistryError::NotTagging(option))
        }
        options.validate()?;
        let constructed = natural_constructed(natural);
        let wire = match options.wire_identity(Some((natural, constructed))) {
            Some(wire) => wire,
            None => return Err(RegistryError::Options(
                ParseError::ExplicitWithoutTag
            )),
        };
        let alternatives = self.groups.entry(group.into()).or_default();
        if alternatives.iter().any(|alt| alt.wire == wire) {
            return Err(RegistryError::Ambiguous {
                group: group.into(),
                tag: wire.0,
            })
        }
        alternatives.push(Alternative { natural, wire, options });
        Ok(())
    }

    /// Returns the alternatives of the named group.
    pub(crate) fn alternatives(&self, group: &str) -> Option<&[Alternative]> {
        self.groups.get(group).map(Vec::as_slice)
    }

    /// Returns the name of a non-tagging option, if the options use one.
    fn non_tagging(options: &FieldOptions) -> Option<&'static str> {
        if options.optional {
            Some("optional")
        }
        else if options.default.is_some() {
            Some("default")
        }
        else if options.set {
            Some("set")
        }
        else if options.indefinite {
            Some("indefinite")
        }
        else {
            None
        }
    }
}


//------------ Alternative ---------------------------------------------------

/// A single alternative of a CHOICE group.
#[derive(Clone, Debug)]
pub(crate) struct Alternative {
    /// The natural tag of the alternative’s value.
    natural: Tag,

    /// The tag and constructedness the alternative has on the wire.
    wire: (Tag, bool),

    /// The options applied to the alternative.
    options: FieldOptions,
}

impl Alternative {
    pub(crate) fn natural(&self) -> Tag {
        self.natural
    }

    pub(crate) fn wire(&self) -> (Tag, bool) {
        self.wire
    }

    pub(crate) fn options(&self) -> &FieldOptions {
        &self.options
    }
}


//------------ Helpers -------------------------------------------------------

/// Returns whether a value with the given universal tag is constructed.
pub(crate) fn natural_constructed(tag: Tag) -> bool {
    tag == Tag::SEQUENCE || tag == Tag::SET
}


//------------ RegistryError -------------------------------------------------

/// An alternative cannot be added to a choice group.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RegistryError {
    /// The natural tag is not in the universal class.
    NotUniversal(Tag),

    /// The alternative’s options name another choice group.
    NestedChoice,

    /// The alternative’s options use a non-tagging option.
    NotTagging(&'static str),

    /// Two alternatives of a group would share a wire tag.
    Ambiguous {
        /// The name of the group.
        group: String,

        /// The shared tag.
        tag: Tag,
    },

    /// The alternative’s options are inconsistent.
    Options(ParseError),
}

//--- From, Display and Error

impl From<ParseError> for RegistryError {
    fn from(err: ParseError) -> Self {
        RegistryError::Options(err)
    }
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            RegistryError::NotUniversal(tag) => {
                write!(f, "natural tag {} is not universal", tag)
            }
            RegistryError::NestedChoice => {
                f.write_str(
                    "choice alternatives cannot name another choice group"
                )
            }
            RegistryError::NotTagging(option) => {
                write!(
                    f,
                    "option '{}' cannot be used on a choice alternative",
                    option
                )
            }
            RegistryError::Ambiguous { ref group, tag } => {
                write!(
                    f,
                    "two alternatives of group '{}' share the wire tag {}",
                    group, tag
                )
            }
            RegistryError::Options(ref err) => err.fmt(f),
        }
    }
}

impl error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            RegistryError::Options(ref err) => Some(err),
            _ => None,
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn add_and_lookup() {
        let mut registry = ChoiceRegistry::new();
        registry.add(
            "value", Tag::INTEGER, FieldOptions::new().with_tag(0)
        ).unwrap();
        registry.add(
            "value", Tag::OCTET_STRING, FieldOptions::new().with_tag(1)
        ).unwrap();
        registry.add(
            "value", Tag::SEQUENCE, FieldOptions::new()
        ).unwrap();

        let alts = registry.alternatives("value").unwrap();
        assert_eq!(alts.len(), 3);
        assert_eq!(alts[0].natural(), Tag::INTEGER);
        assert_eq!(alts[0].wire(), (Tag::ctx(0), false));
        assert_eq!(alts[1].wire(), (Tag::ctx(1), false));
        assert_eq!(alts[2].wire(), (Tag::SEQUENCE, true));

        assert!(registry.alternatives("nope").is_none());
    }

    #[test]
    fn add_errors() {
        let mut registry = ChoiceRegistry::new();
        registry.add(
            "value", Tag::INTEGER, FieldOptions::new().with_tag(0)
        ).unwrap();

        assert_eq!(
            registry.add("value", Tag::ctx(0), FieldOptions::new()),
            Err(RegistryError::NotUniversal(Tag::ctx(0)))
        );
        assert_eq!(
            registry.add(
                "value", Tag::OCTET_STRING,
                FieldOptions::new().choice("other")
            ),
            Err(RegistryError::NestedChoice)
        );
        assert_eq!(
            registry.add(
                "value", Tag::OCTET_STRING, FieldOptions::new().with_tag(0)
            ),
            Err(RegistryError::Ambiguous {
                group: "value".into(), tag: Tag::ctx(0)
            })
        );
        assert_eq!(
            registry.add(
                "value", Tag::OCTET_STRING, FieldOptions::new().explicit()
            ),
            Err(RegistryError::Options(ParseError::ExplicitWithoutTag))
        );
        assert_eq!(
            registry.add(
                "value", Tag::OCTET_STRING, FieldOptions::new().optional()
            ),
            Err(RegistryError::NotTagging("optional"))
        );
        assert_eq!(
            registry.add(
                "value", Tag::SET, FieldOptions::new().set()
            ),
            Err(RegistryError::NotTagging("set"))
        );

        // An explicitly tagged primitive and an implicitly tagged
        // constructed value look the same on the wire.
        registry.add(
            "wrapped", Tag::INTEGER,
            FieldOptions::new().with_tag(4).explicit()
        ).unwrap();
        assert_eq!(
            registry.add(
                "wrapped", Tag::SEQUENCE, FieldOptions::new().with_tag(4)
            ),
            Err(RegistryError::Ambiguous {
                group: "wrapped".into(), tag: Tag::ctx(4)
            })
        );

        // The failed additions must not have left anything behind.
        assert_eq!(registry.alternatives("value").unwrap().len(), 1);
        assert_eq!(registry.alternatives("wrapped").unwrap().len(), 1);
    }
}
