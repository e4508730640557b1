//! Per-field encoding options.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use std::{error, fmt};
use std::borrow::Cow;
use std::str::FromStr;
use crate::ident::{Class, Tag};


//------------ FieldOptions --------------------------------------------------

/// The options directing how a single value is encoded and decoded.
///
/// Options are attached to struct fields, CHOICE alternatives, or a
/// top-level value. They select tagging, presence rules, and the shape
/// overrides of ASN.1: context tags, explicit wrapping, OPTIONAL, DEFAULT,
/// SET, CHOICE groups, and indefinite lengths.
///
/// A value is built either through the builder methods, typically into a
/// constant at schema definition time:
///
/// ```
/// use bermap::FieldOptions;
///
/// const VERSION: FieldOptions =
///     FieldOptions::new().with_tag(0).explicit().optional();
/// ```
///
/// or parsed once from the comma-separated option string grammar:
///
/// ```
/// use bermap::FieldOptions;
///
/// let opts = FieldOptions::parse("tag:0,explicit,optional").unwrap();
/// assert_eq!(
///     opts,
///     FieldOptions::new().with_tag(0).explicit().optional()
/// );
/// ```
///
/// The grammar knows the tokens `tag:<number>`, `explicit`, `implicit`,
/// `optional`, `default:<integer>`, `set`, `choice:<group>`, `indefinite`,
/// and the class overrides `universal`, `application` and `private`.
/// Context-specific is the class used when `tag` is given without an
/// override. Unknown tokens, malformed values, duplicates, and impossible
/// combinations are rejected here, before any data is processed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FieldOptions {
    /// The tag number replacing the natural one.
    pub(crate) tag: Option<u32>,

    /// The class of the replacement tag.
    pub(crate) class: Option<Class>,

    /// Wrap the complete encoding in an outer constructed value.
    pub(crate) explicit: bool,

    /// The field may be absent.
    pub(crate) optional: bool,

    /// The DEFAULT value of an integer field.
    pub(crate) default: Option<i64>,

    /// Encode a SEQUENCE-shaped value as a SET.
    pub(crate) set: bool,

    /// Resolve tagging through the named CHOICE group.
    pub(crate) choice: Option<Cow<'static, str>>,

    /// Use the indefinite length form for a constructed value.
    pub(crate) indefinite: bool,
}

impl FieldOptions {
    /// Creates empty options: natural tag, mandatory, definite length.
    pub const fn new() -> Self {
        FieldOptions {
            tag: None,
            class: None,
            explicit: false,
            optional: false,
            default: None,
            set: false,
            choice: None,
            indefinite: false,
        }
    }

    /// Replaces the tag number, by default in the context-specific class.
    pub const fn with_tag(mut self, number: u32) -> Self {
        self.tag = Some(number);
        self
    }

    /// Overrides the class of the tag.
    pub const fn with_class(mut self, class: Class) -> Self {
        self.class = Some(class);
        self
    }

    /// Requests explicit tagging. Only valid together with a tag.
    pub const fn explicit(mut self) -> Self {
        self.explicit = true;
        self
    }

    /// Marks the field as OPTIONAL.
    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Declares the DEFAULT value of an integer field.
    pub const fn with_default(mut self, value: i64) -> Self {
        self.default = Some(value);
        self
    }

    /// Encodes the SEQUENCE-shaped value as a SET.
    pub const fn set(mut self) -> Self {
        self.set = true;
        self
    }

    /// Resolves the tag through the named CHOICE group.
    pub fn choice(mut self, group: &'static str) -> Self {
        self.choice = Some(Cow::Borrowed(group));
        self
    }

    /// Requests the indefinite length form.
    pub const fn indefinite(mut self) -> Self {
        self.indefinite = true;
        self
    }

    /// Parses options from the option string grammar.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let mut res = Self::new();
        let mut implicit = false;
        let mut class_token = None;
        for token in s.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue
            }
            let (key, value) = match token.split_once(':') {
                Some((key, value)) => (key, Some(value.trim())),
                None => (token, None),
            };
            match (key, value) {
                ("tag", Some(value)) => {
                    if res.tag.is_some() {
                        return Err(ParseError::Duplicate("tag"))
                    }
                    res.tag = Some(value.parse().map_err(|_| {
                        ParseError::invalid("tag", value)
                    })?);
                }
                ("default", Some(value)) => {
                    if res.default.is_some() {
                        return Err(ParseError::Duplicate("default"))
                    }
                    res.default = Some(value.parse().map_err(|_| {
                        ParseError::invalid("default", value)
                    })?);
                }
                ("choice", Some(value)) => {
                    if res.choice.is_some() {
                        return Err(ParseError::Duplicate("choice"))
                    }
                    if value.is_empty() {
                        return Err(ParseError::invalid("choice", value))
                    }
                    res.choice = Some(Cow::Owned(value.into()));
                }
                ("tag" | "default" | "choice", None) => {
                    return Err(ParseError::invalid(
                        match key {
                            "tag" => "tag",
                            "default" => "default",
                            _ => "choice",
                        },
                        ""
                    ))
                }
                ("explicit", None) => {
                    if implicit {
                        return Err(
                            ParseError::Conflict("implicit", "explicit")
                        )
                    }
                    if res.explicit {
                        return Err(ParseError::Duplicate("explicit"))
                    }
                    res.explicit = true;
                }
                ("implicit", None) => {
                    if res.explicit {
                        return Err(
                            ParseError::Conflict("explicit", "implicit")
                        )
                    }
                    if implicit {
                        return Err(ParseError::Duplicate("implicit"))
                    }
                    implicit = true;
                }
                ("optional", None) => {
                    if res.optional {
                        return Err(ParseError::Duplicate("optional"))
                    }
                    res.optional = true;
                }
                ("set", None) => {
                    if res.set {
                        return Err(ParseError::Duplicate("set"))
                    }
                    res.set = true;
                }
                ("indefinite", None) => {
                    if res.indefinite {
                        return Err(ParseError::Duplicate("indefinite"))
                    }
                    res.indefinite = true;
                }
                ("universal", None) => {
                    res.set_class(Class::Universal, &mut class_token)?;
                }
                ("application", None) => {
                    res.set_class(Class::Application, &mut class_token)?;
                }
                ("private", None) => {
                    res.set_class(Class::Private, &mut class_token)?;
                }
                _ => return Err(ParseError::UnknownOption(token.into())),
            }
        }
        res.validate()?;
        Ok(res)
    }

    /// Sets the class from a class token, rejecting a second one.
    fn set_class(
        &mut self,
        class: Class,
        seen: &mut Option<&'static str>,
    ) -> Result<(), ParseError> {
        let token = match class {
            Class::Universal => "universal",
            Class::Application => "application",
            _ => "private",
        };
        if let Some(prev) = *seen {
            return Err(ParseError::Conflict(prev, token))
        }
        *seen = Some(token);
        self.class = Some(class);
        Ok(())
    }

    /// Checks combinations that the builders can express but that make
    /// no sense. The parser rejects them while parsing already.
    ///
    /// A tag or class without `explicit` retags the value in place. For a
    /// choice there is no single tag to replace, so these combinations are
    /// refused while an explicit tag around a choice is fine.
    pub(crate) fn validate(&self) -> Result<(), ParseError> {
        if self.explicit && self.tag.is_none() {
            return Err(ParseError::ExplicitWithoutTag)
        }
        if self.choice.is_some() && !self.explicit {
            if self.tag.is_some() {
                return Err(ParseError::Conflict("choice", "tag"))
            }
            if self.class.is_some() {
                return Err(ParseError::Conflict("choice", "class"))
            }
        }
        Ok(())
    }

    /// Returns the tag and constructedness the options put on the wire.
    ///
    /// `natural` is the identity the value encodes with before options
    /// apply; `None` if the target type has no single natural tag. Returns
    /// `None` if the wire identity cannot be determined, i.e., the natural
    /// identity would be needed but is not known.
    pub(crate) fn wire_identity(
        &self, natural: Option<(Tag, bool)>
    ) -> Option<(Tag, bool)> {
        if self.explicit {
            self.tag.map(|number| {
                (
                    Tag::new(
                        self.class.unwrap_or(Class::Context), number
                    ),
                    true
                )
            })
        }
        else if let Some(number) = self.tag {
            natural.map(|(_, constructed)| {
                (
                    Tag::new(
                        self.class.unwrap_or(Class::Context), number
                    ),
                    constructed
                )
            })
        }
        else if let Some(class) = self.class {
            natural.map(|(tag, constructed)| {
                (Tag::new(class, tag.number()), constructed)
            })
        }
        else {
            natural
        }
    }
}

//--- FromStr

impl FromStr for FieldOptions {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}


//------------ ParseError ----------------------------------------------------

/// An option string does not conform to the grammar.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// A token is not part of the grammar.
    UnknownOption(String),

    /// The value of an option cannot be parsed.
    InvalidValue {
        /// The option the value belongs to.
        option: &'static str,

        /// The offending value.
        value: String,
    },

    /// Two options cannot be used together.
    Conflict(&'static str, &'static str),

    /// An option appears more than once.
    Duplicate(&'static str),

    /// Explicit tagging was requested without a tag.
    ExplicitWithoutTag,
}

impl ParseError {
    fn invalid(option: &'static str, value: &str) -> Self {
        ParseError::InvalidValue { option, value: value.into() }
    }
}

//--- Display and Error

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ParseError::UnknownOption(ref token) => {
                write!(f, "unknown option '{}'", token)
            }
            ParseError::InvalidValue { option, ref value } => {
                write!(f, "invalid value '{}' for option '{}'", value, option)
            }
            ParseError::Conflict(first, second) => {
                write!(
                    f, "options '{}' and '{}' cannot be combined",
                    first, second
                )
            }
            ParseError::Duplicate(option) => {
                write!(f, "duplicate option '{}'", option)
            }
            ParseError::ExplicitWithoutTag => {
                f.write_str("option 'explicit' requires 'tag'")
            }
        }
    }
}

impl error::Error for ParseError { }


//============ Tests =========================================================
