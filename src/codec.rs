//! The codec driving schema-directed encoding and decoding.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use std::io;
use std::borrow::Cow;
use crate::choice::{natural_constructed, ChoiceRegistry};
use crate::decode::{self, Decode, Fields, Source};
use crate::encode::{self, Encode};
use crate::ident::{Class, Tag};
use crate::mode::Mode;
use crate::options::{FieldOptions, ParseError};
use crate::order;
use crate::raw::RawValue;


//------------ Codec ---------------------------------------------------------

/// Maps Rust values to their encoding and back.
///
/// A codec carries the shared context every operation needs: the [`Mode`]
/// selecting between the BER and DER rules and the [`ChoiceRegistry`] with
/// the CHOICE groups that field options may refer to. It is immutable and
/// can be shared freely.
///
/// Values are encoded through [`encode`][Self::encode] and decoded through
/// [`decode`][Self::decode], with `_with` variants that apply
/// [`FieldOptions`] to the outermost value and [`read`][Self::read] and
/// [`read_with`][Self::read_with] consuming a single value from a reader.
/// Structured types implement [`Encode`] and [`Decode`] themselves and use
/// [`encode_field`][Self::encode_field] and
/// [`decode_field`][Self::decode_field] for their fields, which is where
/// the options work happens: tagging, OPTIONAL fields, DEFAULT values,
/// SET handling, and choice groups.
///
/// ```
/// use bermap::{decode, encode};
/// use bermap::{Codec, Decode, Encode, FieldOptions, Mode, RawValue, Tag};
///
/// struct Request {
///     serial: i64,
///     name: String,
/// }
///
/// impl Encode for Request {
///     fn to_raw(&self, codec: &Codec) -> Result<RawValue, encode::Error> {
///         let mut fields = Vec::new();
///         fields.extend(
///             codec.encode_field(&self.serial, &FieldOptions::new())?
///         );
///         fields.extend(
///             codec.encode_field(&self.name, &FieldOptions::new())?
///         );
///         RawValue::sequence(fields)
///     }
/// }
///
/// impl Decode for Request {
///     const TAG: Option<Tag> = Some(Tag::SEQUENCE);
///     const CONSTRUCTED: bool = true;
///
///     fn from_raw(
///         raw: &RawValue, codec: &Codec, pos: u64
///     ) -> Result<Self, decode::Error> {
///         let mut fields = raw.fields(pos)?;
///         let res = Request {
///             serial: codec.decode_field(&mut fields, &FieldOptions::new())?,
///             name: codec.decode_field(&mut fields, &FieldOptions::new())?,
///         };
///         fields.finish()?;
///         Ok(res)
///     }
/// }
///
/// let codec = Codec::new(Mode::Der);
/// let request = Request { serial: 12, name: "ann".into() };
/// let bytes = codec.encode(&request).unwrap();
/// assert_eq!(bytes, b"\x30\x08\x02\x01\x0c\x04\x03\x61\x6e\x6e");
/// let back: Request = codec.decode(&bytes).unwrap();
/// assert_eq!(back.serial, 12);
/// assert_eq!(back.name, "ann");
/// ```
#[derive(Clone, Debug, Default)]
pub struct Codec {
    /// The encoding rules to apply.
    mode: Mode,

    /// The known choice groups.
    choices: ChoiceRegistry,
}

impl Codec {
    /// Creates a codec using the given mode and no choice groups.
    pub fn new(mode: Mode) -> Self {
        Codec {
            mode,
            choices: ChoiceRegistry::new(),
        }
    }

    /// Creates a codec using the given mode and choice groups.
    pub fn with_choices(mode: Mode, choices: ChoiceRegistry) -> Self {
        Codec { mode, choices }
    }

    /// Returns the mode the codec applies.
    pub fn mode(&self) -> Mode {
        self.mode
    }
}

/// # Encoding
///
impl Codec {
    /// Encodes a value into a vec.
    pub fn encode<V: Encode + ?Sized>(
        &self, value: &V
    ) -> Result<Vec<u8>, encode::Error> {
        self.encode_with(value, &FieldOptions::new())
    }

    /// Encodes a value with options applied into a vec.
    ///
    /// If the options make the value an omitted field – it is empty and
    /// marked `optional`, or it matches its `default` in DER – the
    /// returned vec is empty.
    pub fn encode_with<V: Encode + ?Sized>(
        &self, value: &V, options: &FieldOptions
    ) -> Result<Vec<u8>, encode::Error> {
        match self.encode_field(value, options)? {
            Some(raw) => raw.to_vec(),
            None => Ok(Vec::new()),
        }
    }

    /// Writes the encoding of a value to a writer.
    ///
    /// Writes nothing if the options make the value an omitted field.
    pub fn write_encoded<V: Encode + ?Sized, W: io::Write>(
        &self, value: &V, options: &FieldOptions, target: &mut W
    ) -> Result<(), encode::Error> {
        if let Some(raw) = self.encode_field(value, options)? {
            raw.write_encoded(target)?;
        }
        Ok(())
    }

    /// Encodes a single field of a structured value.
    ///
    /// This is the building block [`Encode`] implementations use for
    /// their fields. Returns `Ok(None)` if the field is to be left out of
    /// the encoding.
    ///
    /// An empty value – one whose [`is_zero`][Encode::is_zero] returns
    /// `true` – stands for an absent field. If the options declare a
    /// `default`, an absent field encodes as that default in BER and is
    /// dropped in DER, where encoding a default value is forbidden. If
    /// the options only say `optional`, an absent field is dropped in
    /// both modes. A field that is neither encodes its empty value
    /// normally. A present value that happens to equal its `default` is
    /// likewise dropped in DER.
    pub fn encode_field<V: Encode + ?Sized>(
        &self, value: &V, options: &FieldOptions
    ) -> Result<Option<RawValue>, encode::Error> {
        options.validate()?;
        if value.is_zero() {
            if let Some(default) = options.default {
                if self.mode.is_canonical() {
                    return Ok(None)
                }
                let raw = default.to_raw(self)?;
                return self.apply_options(raw, options).map(Some)
            }
            if options.optional {
                return Ok(None)
            }
        }
        else if let (Some(default), Some(int)) = (
            options.default, value.as_int()
        ) {
            if default == int && self.mode.is_canonical() {
                return Ok(None)
            }
        }
        let raw = value.to_raw(self)?;
        self.apply_options(raw, options).map(Some)
    }

    /// Applies the field options to an encoded value.
    ///
    /// The options apply in a fixed order: `set` first, then the choice
    /// group, then tagging, and the length form last. A choice resolves
    /// into the matched alternative’s tagging with the outer options’
    /// explicit tag and length form still applying afterwards.
    fn apply_options(
        &self, mut raw: RawValue, options: &FieldOptions
    ) -> Result<RawValue, encode::Error> {
        if options.set {
            if !raw.is_constructed() || raw.tag() != Tag::SEQUENCE {
                return Err(encode::Error::content(
                    "set option requires a sequence"
                ))
            }
            raw.tag = Tag::SET;
            if self.mode.is_canonical() {
                raw.content = order::sort_encoded(&raw.content)?;
            }
        }

        if let Some(ref group) = options.choice {
            let alternatives = match self.choices.alternatives(group) {
                Some(some) => some,
                None => {
                    return Err(encode::Error::content(
                        format!("unknown choice group '{}'", group)
                    ))
                }
            };
            let alt = match alternatives.iter().find(|alt| {
                alt.natural() == raw.tag()
            }) {
                Some(some) => some,
                None => {
                    return Err(encode::Error::content(format!(
                        "no alternative of choice group '{}' \
                         for tag {}",
                        group, raw.tag()
                    )))
                }
            };
            // Alternative options are tagging only, so this recursion
            // cannot meet another choice.
            raw = self.apply_options(raw, alt.options())?;
        }

        if options.explicit {
            let number = match options.tag {
                Some(number) => number,
                None => {
                    return Err(ParseError::ExplicitWithoutTag.into())
                }
            };
            let inner = raw.to_vec()?;
            raw = RawValue::constructed(
                Tag::new(
                    options.class.unwrap_or(Class::Context), number
                ),
                inner
            );
        }
        else if let Some(number) = options.tag {
            raw.tag = Tag::new(
                options.class.unwrap_or(Class::Context), number
            );
        }
        else if let Some(class) = options.class {
            raw.tag = Tag::new(class, raw.tag().number());
        }

        if options.indefinite {
            if self.mode.is_canonical() {
                return Err(encode::Error::content(
                    "indefinite length in DER"
                ))
            }
            if !raw.is_constructed() {
                return Err(encode::Error::content(
                    "indefinite length primitive value"
                ))
            }
            raw.indefinite = true;
        }

        Ok(raw)
    }
}

/// # Decoding
///
impl Codec {
    /// Decodes a value from a slice.
    ///
    /// The slice must hold exactly one encoded value; anything after it
    /// is an error.
    pub fn decode<V: Decode>(
        &self, data: &[u8]
    ) -> Result<V, decode::Error> {
        self.decode_with(data, &FieldOptions::new())
    }

    /// Decodes a value with options applied from a slice.
    ///
    /// This is the inverse of [`encode_with`][Self::encode_with]: an
    /// empty slice produces the `default` or the empty value of an
    /// `optional` field.
    pub fn decode_with<V: Decode>(
        &self, data: &[u8], options: &FieldOptions
    ) -> Result<V, decode::Error> {
        let mut fields = Fields::new(data, 0);
        let res = self.decode_field(&mut fields, options)?;
        fields.finish()?;
        Ok(res)
    }

    /// Reads a single value from a reader.
    ///
    /// Unlike [`decode`][Self::decode], this consumes exactly one value
    /// and leaves the reader at the first octet after it, so consecutive
    /// values can be read off a stream. Positions in errors are relative
    /// to where this particular read started.
    pub fn read<V: Decode, R: io::Read>(
        &self, reader: R
    ) -> Result<V, decode::Error> {
        self.read_with(reader, &FieldOptions::new())
    }

    /// Reads a single value with options applied from a reader.
    ///
    /// The value must be present: with no data to look ahead into,
    /// `optional` and `default` cannot apply here.
    pub fn read_with<V: Decode, R: io::Read>(
        &self, reader: R, options: &FieldOptions
    ) -> Result<V, decode::Error> {
        options.validate().map_err(decode::Error::options)?;
        let mut source = Source::new(reader);
        let raw = RawValue::take_from(&mut source, self.mode)?;
        let natural = self.natural_identity::<V>(options, 0)?;
        let ident = (raw.tag(), raw.is_constructed());
        if !self.field_matches(options, natural, ident, 0)? {
            return Err(decode::Error::content(
                self.expected_msg(options, natural), 0
            ))
        }
        let content_pos = raw.header_len() as u64;
        self.decode_raw(raw, content_pos, options)
    }

    /// Decodes the next field of a structured value.
    ///
    /// This is the building block [`Decode`] implementations use for
    /// their fields. If the next value in `fields` matches what the
    /// options and the type expect, it is consumed and decoded. An
    /// unmatched field falls back to its `default` if it has one, or to
    /// the type’s empty value if it is `optional` and the type has one.
    /// Everything else is an error.
    pub fn decode_field<V: Decode>(
        &self, fields: &mut Fields, options: &FieldOptions
    ) -> Result<V, decode::Error> {
        options.validate().map_err(decode::Error::options)?;
        if let Some(res) = self.try_field(fields, options)? {
            return Ok(res)
        }
        if let Some(default) = options.default {
            return match V::from_int(default) {
                Some(res) => Ok(res),
                None => Err(decode::Error::content(
                    "default value not representable", fields.pos()
                )),
            }
        }
        if options.optional {
            if let Some(res) = V::zero() {
                return Ok(res)
            }
        }
        let natural = self.natural_identity::<V>(options, fields.pos())?;
        Err(decode::Error::content(
            self.expected_msg(options, natural), fields.pos()
        ))
    }

    /// Decodes the next element of a SEQUENCE OF or SET OF.
    ///
    /// Elements carry no options, only the natural identity of the
    /// element type. Callers check for emptiness first, so a missing
    /// element is an error.
    pub(crate) fn decode_item<V: Decode>(
        &self, fields: &mut Fields
    ) -> Result<V, decode::Error> {
        let options = FieldOptions::new();
        match self.try_field(fields, &options)? {
            Some(res) => Ok(res),
            None => {
                let natural = self.natural_identity::<V>(
                    &options, fields.pos()
                )?;
                Err(decode::Error::content(
                    self.expected_msg(&options, natural), fields.pos()
                ))
            }
        }
    }

    /// Decodes the next value if it matches the field.
    ///
    /// Returns `Ok(None)` if there is no next value or it doesn’t match,
    /// leaving `fields` untouched in that case.
    fn try_field<V: Decode>(
        &self, fields: &mut Fields, options: &FieldOptions
    ) -> Result<Option<V>, decode::Error> {
        let natural = self.natural_identity::<V>(options, fields.pos())?;
        let ident = match fields.peek(self.mode)? {
            Some(value) => (value.tag(), value.is_constructed()),
            None => return Ok(None),
        };
        if !self.field_matches(options, natural, ident, fields.pos())? {
            return Ok(None)
        }
        let (raw, content_pos) = match fields.take(self.mode)? {
            Some(some) => some,
            None => return Ok(None),
        };
        self.decode_raw(raw, content_pos, options).map(Some)
    }

    /// Returns the identity the type encodes with before tagging.
    ///
    /// This is the type’s natural identity with the `set` option already
    /// applied, since that one changes the value itself rather than its
    /// tagging.
    fn natural_identity<V: Decode>(
        &self, options: &FieldOptions, pos: u64
    ) -> Result<Option<(Tag, bool)>, decode::Error> {
        let natural = V::TAG.map(|tag| (tag, V::CONSTRUCTED));
        if options.set {
            if natural != Some((Tag::SEQUENCE, true)) {
                return Err(decode::Error::content(
                    "set option requires a sequence", pos
                ))
            }
            return Ok(Some((Tag::SET, true)))
        }
        Ok(natural)
    }

    /// Returns whether a value with the given identity starts this field.
    fn field_matches(
        &self,
        options: &FieldOptions,
        natural: Option<(Tag, bool)>,
        ident: (Tag, bool),
        pos: u64,
    ) -> Result<bool, decode::Error> {
        if options.explicit {
            let number = match options.tag {
                Some(number) => number,
                None => {
                    return Err(decode::Error::options(
                        ParseError::ExplicitWithoutTag
                    ))
                }
            };
            let wrapper = (
                Tag::new(
                    options.class.unwrap_or(Class::Context), number
                ),
                true
            );
            return Ok(ident == wrapper)
        }
        if let Some(ref group) = options.choice {
            let alternatives = match self.choices.alternatives(group) {
                Some(some) => some,
                None => {
                    return Err(decode::Error::content(
                        format!("unknown choice group '{}'", group), pos
                    ))
                }
            };
            return Ok(alternatives.iter().any(|alt| {
                alt.wire() == ident && natural.map_or(
                    true, |(tag, _)| alt.natural() == tag
                )
            }))
        }
        if natural.is_none() && options.tag.is_none()
            && options.class.is_none()
        {
            // No natural identity and no tagging matches any value.
            return Ok(true)
        }
        match options.wire_identity(natural) {
            Some(wire) => Ok(ident == wire),
            None => Err(decode::Error::content(
                "cannot determine expected tag", pos
            )),
        }
    }

    /// Decodes a value known to match the field.
    ///
    /// Undoes whatever the options did to the value on the wire – strips
    /// an explicit tag, restores the natural tag of an implicitly tagged
    /// value – and hands the result to the type. `content_pos` is the
    /// position of the value’s content octets.
    fn decode_raw<V: Decode>(
        &self, mut raw: RawValue, content_pos: u64, options: &FieldOptions
    ) -> Result<V, decode::Error> {
        if options.explicit {
            let natural = self.natural_identity::<V>(options, content_pos)?;
            let stripped = FieldOptions {
                choice: options.choice.clone(),
                set: options.set,
                ..FieldOptions::new()
            };
            let mut inner = raw.fields(content_pos)?;
            let res = match self.try_field(&mut inner, &stripped)? {
                Some(res) => res,
                None => {
                    return Err(decode::Error::content(
                        self.expected_msg(&stripped, natural),
                        inner.pos()
                    ))
                }
            };
            inner.finish()?;
            return Ok(res)
        }

        if let Some(ref group) = options.choice {
            let alternatives = match self.choices.alternatives(group) {
                Some(some) => some,
                None => {
                    return Err(decode::Error::content(
                        format!("unknown choice group '{}'", group),
                        content_pos
                    ))
                }
            };
            let ident = (raw.tag(), raw.is_constructed());
            let alt = match alternatives.iter().find(|alt| {
                alt.wire() == ident
            }) {
                Some(some) => some,
                None => {
                    return Err(decode::Error::content(
                        format!(
                            "no alternative of choice group '{}' matches",
                            group
                        ),
                        content_pos
                    ))
                }
            };
            if alt.options().explicit {
                let mut inner = raw.fields(content_pos)?;
                let at = inner.pos();
                let (inner_raw, inner_pos) = match inner.take(self.mode)? {
                    Some(some) => some,
                    None => {
                        return Err(decode::Error::content(
                            format!(
                                "expected value with tag {}", alt.natural()
                            ),
                            at
                        ))
                    }
                };
                let expected = (
                    alt.natural(), natural_constructed(alt.natural())
                );
                if (inner_raw.tag(), inner_raw.is_constructed()) != expected {
                    return Err(decode::Error::content(
                        format!(
                            "expected value with tag {}", alt.natural()
                        ),
                        at
                    ))
                }
                let res = V::from_raw(&inner_raw, self, inner_pos)?;
                inner.finish()?;
                return Ok(res)
            }
            raw.tag = alt.natural();
            return V::from_raw(&raw, self, content_pos)
        }

        if let Some(tag) = V::TAG {
            raw.tag = tag;
        }
        V::from_raw(&raw, self, content_pos)
    }

    /// Returns the message for a field that had to be present but wasn’t.
    fn expected_msg(
        &self, options: &FieldOptions, natural: Option<(Tag, bool)>
    ) -> Cow<'static, str> {
        if let Some(ref group) = options.choice {
            if !options.explicit {
                return format!(
                    "no alternative of choice group '{}' matches", group
                ).into()
            }
        }
        match options.wire_identity(natural) {
            Some((tag, _)) => {
                format!("expected value with tag {}", tag).into()
            }
            None if natural.is_none() && options.tag.is_none()
                && options.class.is_none() => "expected a value".into(),
            None => "cannot determine expected tag".into(),
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    const FLAG_OPTS: FieldOptions =
        FieldOptions::new().with_tag(0).optional();
    const COUNT_OPTS: FieldOptions =
        FieldOptions::new().with_tag(1).explicit().with_default(1);

    /// A request with one field of every options flavor.
    #[derive(Clone, Debug, Eq, PartialEq)]
    struct Item {
        serial: i64,
        name: String,
        flag: bool,
        count: i64,
    }

    impl Encode for Item {
        fn to_raw(&self, codec: &Codec) -> Result<RawValue, encode::Error> {
            let mut fields = Vec::new();
            fields.extend(
                codec.encode_field(&self.serial, &FieldOptions::new())?
            );
            fields.extend(
                codec.encode_field(&self.name, &FieldOptions::new())?
            );
            fields.extend(codec.encode_field(&self.flag, &FLAG_OPTS)?);
            fields.extend(codec.encode_field(&self.count, &COUNT_OPTS)?);
            RawValue::sequence(fields)
        }
    }

    impl Decode for Item {
        const TAG: Option<Tag> = Some(Tag::SEQUENCE);
        const CONSTRUCTED: bool = true;

        fn from_raw(
            raw: &RawValue, codec: &Codec, pos: u64
        ) -> Result<Self, decode::Error> {
            let mut fields = raw.fields(pos)?;
            let res = Item {
                serial: codec.decode_field(
                    &mut fields, &FieldOptions::new()
                )?,
                name: codec.decode_field(
                    &mut fields, &FieldOptions::new()
                )?,
                flag: codec.decode_field(&mut fields, &FLAG_OPTS)?,
                count: codec.decode_field(&mut fields, &COUNT_OPTS)?,
            };
            fields.finish()?;
            Ok(res)
        }
    }

    fn opts(s: &str) -> FieldOptions {
        FieldOptions::parse(s).unwrap()
    }

    fn value_choices() -> ChoiceRegistry {
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
        registry.add(
            "wrapped", Tag::INTEGER,
            FieldOptions::new().with_tag(3).explicit()
        ).unwrap();
        registry
    }

    #[test]
    fn round_trip() {
        let item = Item {
            serial: 5,
            name: "ab".into(),
            flag: true,
            count: 3,
        };
        let expected = b"\x30\x0f\
            \x02\x01\x05\
            \x04\x02\x61\x62\
            \x80\x01\xff\
            \xa1\x03\x02\x01\x03";
        for mode in [Mode::Ber, Mode::Der] {
            let codec = Codec::new(mode);
            let bytes = codec.encode(&item).unwrap();
            assert_eq!(bytes, expected);
            assert_eq!(codec.decode::<Item>(&bytes).unwrap(), item);
        }
    }

    #[test]
    fn optional_and_default() {
        let item = Item {
            serial: 5,
            name: String::new(),
            flag: false,
            count: 1,
        };

        // DER drops the default, BER writes it. The empty name is
        // mandatory and encodes as an empty string either way.
        let der = Codec::new(Mode::Der);
        let bytes = der.encode(&item).unwrap();
        assert_eq!(bytes, b"\x30\x05\x02\x01\x05\x04\x00");
        assert_eq!(der.decode::<Item>(&bytes).unwrap(), item);

        let ber = Codec::new(Mode::Ber);
        let bytes = ber.encode(&item).unwrap();
        assert_eq!(
            bytes,
            b"\x30\x0a\x02\x01\x05\x04\x00\xa1\x03\x02\x01\x01"
        );
        assert_eq!(ber.decode::<Item>(&bytes).unwrap(), item);

        // A zero count stands for an absent field and comes back as the
        // default in both modes.
        let zeroed = Item { count: 0, ..item.clone() };
        for mode in [Mode::Ber, Mode::Der] {
            let codec = Codec::new(mode);
            let bytes = codec.encode(&zeroed).unwrap();
            assert_eq!(codec.decode::<Item>(&bytes).unwrap(), item);
        }
    }

    #[test]
    fn sets() {
        let members = vec![
            RawValue::primitive(Tag::ctx(2), b"\xbb".as_ref()),
            RawValue::primitive(Tag::INTEGER, b"\x05".as_ref()),
            RawValue::primitive(Tag::ctx(0), b"\xaa".as_ref()),
        ];

        // DER sorts the members, so any permutation encodes the same.
        let der = Codec::new(Mode::Der);
        let sorted =
            b"\x31\x09\x02\x01\x05\x80\x01\xaa\x82\x01\xbb";
        let bytes = der.encode_with(&members, &opts("set")).unwrap();
        assert_eq!(bytes, sorted);
        let mut reversed = members.clone();
        reversed.reverse();
        assert_eq!(
            der.encode_with(&reversed, &opts("set")).unwrap(),
            sorted
        );

        // BER keeps declaration order.
        let ber = Codec::new(Mode::Ber);
        assert_eq!(
            ber.encode_with(&members, &opts("set")).unwrap(),
            b"\x31\x09\x82\x01\xbb\x02\x01\x05\x80\x01\xaa"
        );

        let back: Vec<RawValue> = der.decode_with(
            sorted, &opts("set")
        ).unwrap();
        assert_eq!(back.len(), 3);
        assert_eq!(back[0].tag(), Tag::INTEGER);
        assert_eq!(back[2].tag(), Tag::ctx(2));

        // The set option insists on a sequence on both paths.
        assert!(der.encode_with(&5i64, &opts("set")).is_err());
        assert!(
            der.decode_with::<i64>(b"\x31\x00", &opts("set")).is_err()
        );
    }

    #[test]
    fn choices() {
        let codec = Codec::with_choices(Mode::Ber, value_choices());

        // Implicitly retagged alternatives.
        let bytes = codec.encode_with(&5i64, &opts("choice:value")).unwrap();
        assert_eq!(bytes, b"\x80\x01\x05");
        assert_eq!(
            codec.decode_with::<i64>(&bytes, &opts("choice:value")).unwrap(),
            5
        );
        let bytes = codec.encode_with("hi", &opts("choice:value")).unwrap();
        assert_eq!(bytes, b"\x81\x02\x68\x69");
        assert_eq!(
            codec.decode_with::<String>(
                &bytes, &opts("choice:value")
            ).unwrap(),
            "hi"
        );

        // An alternative that keeps its natural tag.
        let bytes = codec.encode_with(
            &vec![7i64], &opts("choice:value")
        ).unwrap();
        assert_eq!(bytes, b"\x30\x03\x02\x01\x07");
        assert_eq!(
            codec.decode_with::<Vec<i64>>(
                &bytes, &opts("choice:value")
            ).unwrap(),
            [7]
        );

        // A raw value decodes whatever alternative is present, with the
        // natural tag restored.
        let raw: RawValue = codec.decode_with(
            b"\x80\x01\x05", &opts("choice:value")
        ).unwrap();
        assert_eq!(raw.tag(), Tag::INTEGER);
        assert_eq!(raw.content().as_ref(), b"\x05");

        // An explicitly tagged alternative.
        let bytes = codec.encode_with(
            &7i64, &opts("choice:wrapped")
        ).unwrap();
        assert_eq!(bytes, b"\xa3\x03\x02\x01\x07");
        assert_eq!(
            codec.decode_with::<i64>(
                &bytes, &opts("choice:wrapped")
            ).unwrap(),
            7
        );

        // The whole choice wrapped in another explicit tag.
        let bytes = codec.encode_with(
            &5i64, &opts("choice:value,tag:7,explicit")
        ).unwrap();
        assert_eq!(bytes, b"\xa7\x03\x80\x01\x05");
        assert_eq!(
            codec.decode_with::<i64>(
                &bytes, &opts("choice:value,tag:7,explicit")
            ).unwrap(),
            5
        );

        // The data holds a valid alternative of the wrong type.
        let err = codec.decode_with::<i64>(
            b"\x81\x02\x68\x69", &opts("choice:value")
        ).unwrap_err();
        assert_eq!(err.pos(), 0);

        // Unknown groups fail on both paths.
        assert!(codec.encode_with(&5i64, &opts("choice:nope")).is_err());
        assert!(
            codec.decode_with::<i64>(
                b"\x02\x01\x05", &opts("choice:nope")
            ).is_err()
        );

        // No alternative for the value’s natural tag.
        assert!(codec.encode_with(&true, &opts("choice:value")).is_err());
    }

    #[test]
    fn tagging() {
        let codec = Codec::new(Mode::Der);

        let bytes = codec.encode_with(&5i64, &opts("tag:0")).unwrap();
        assert_eq!(bytes, b"\x80\x01\x05");
        assert_eq!(
            codec.decode_with::<i64>(&bytes, &opts("tag:0")).unwrap(), 5
        );

        let bytes = codec.encode_with(
            &5i64, &opts("tag:0,explicit")
        ).unwrap();
        assert_eq!(bytes, b"\xa0\x03\x02\x01\x05");
        assert_eq!(
            codec.decode_with::<i64>(
                &bytes, &opts("tag:0,explicit")
            ).unwrap(),
            5
        );

        let bytes = codec.encode_with(
            &5i64, &opts("application,tag:1")
        ).unwrap();
        assert_eq!(bytes, b"\x41\x01\x05");
        assert_eq!(
            codec.decode_with::<i64>(
                &bytes, &opts("application,tag:1")
            ).unwrap(),
            5
        );

        let bytes = codec.encode_with(&5i64, &opts("private")).unwrap();
        assert_eq!(bytes, b"\xc2\x01\x05");
        assert_eq!(
            codec.decode_with::<i64>(&bytes, &opts("private")).unwrap(), 5
        );

        // Implicit tagging keeps constructedness.
        let bytes = codec.encode_with(&vec![5i64], &opts("tag:0")).unwrap();
        assert_eq!(bytes, b"\xa0\x03\x02\x01\x05");
        assert_eq!(
            codec.decode_with::<Vec<i64>>(
                &bytes, &opts("tag:0")
            ).unwrap(),
            [5]
        );

        // The explicitly tagged value must be present inside the wrapper.
        let err = codec.decode_with::<i64>(
            b"\xa0\x00", &opts("tag:0,explicit")
        ).unwrap_err();
        assert_eq!(err.pos(), 2);
    }

    #[test]
    fn indefinite() {
        let ber = Codec::new(Mode::Ber);
        let bytes = ber.encode_with(
            &vec![5i64], &opts("indefinite")
        ).unwrap();
        assert_eq!(bytes, b"\x30\x80\x02\x01\x05\x00\x00");
        assert_eq!(ber.decode::<Vec<i64>>(&bytes).unwrap(), [5]);

        let der = Codec::new(Mode::Der);
        assert!(der.encode_with(&vec![5i64], &opts("indefinite")).is_err());
        assert!(der.decode::<Vec<i64>>(&bytes).is_err());

        // The indefinite form needs a constructed value.
        assert!(ber.encode_with(&5i64, &opts("indefinite")).is_err());
    }

    #[test]
    fn top_level_options() {
        let codec = Codec::new(Mode::Der);

        assert!(codec.encode_with(&0i64, &opts("optional")).unwrap()
            .is_empty());
        assert_eq!(
            codec.decode_with::<i64>(b"", &opts("optional")).unwrap(), 0
        );
        assert_eq!(
            codec.decode_with::<i64>(b"", &opts("default:9")).unwrap(), 9
        );
        assert_eq!(
            codec.decode_with::<Option<i64>>(
                b"", &opts("optional")
            ).unwrap(),
            None
        );
        assert!(codec.decode::<i64>(b"").is_err());
    }

    #[test]
    fn raw_passthrough() {
        let codec = Codec::new(Mode::Der);
        let raw = RawValue::primitive(Tag::OID, b"\x2b\x06\x01".as_ref());

        let bytes = codec.encode_with(&raw, &opts("tag:2")).unwrap();
        assert_eq!(bytes, b"\x82\x03\x2b\x06\x01");

        let bytes = codec.encode_with(&raw, &opts("tag:2,explicit")).unwrap();
        assert_eq!(bytes, b"\xa2\x05\x06\x03\x2b\x06\x01");
        let back: RawValue = codec.decode_with(
            &bytes, &opts("tag:2,explicit")
        ).unwrap();
        assert_eq!(back, raw);

        // Without tagging, a raw value accepts anything.
        let back: RawValue = codec.decode(b"\x02\x01\x05").unwrap();
        assert_eq!(back.tag(), Tag::INTEGER);

        // An implicit tag cannot be undone on a raw value.
        assert!(
            codec.decode_with::<RawValue>(
                b"\x82\x03\x2b\x06\x01", &opts("tag:2")
            ).is_err()
        );
    }

    #[test]
    fn mismatch_and_trailing() {
        let codec = Codec::new(Mode::Ber);

        let err = codec.decode::<i64>(b"\x04\x01\x61").unwrap_err();
        assert_eq!(err.pos(), 0);
        assert_eq!(
            err.to_string(),
            "invalid data at position 0: expected value with tag INTEGER"
        );

        let err = codec.decode::<i64>(b"\x02\x01\x05\x00").unwrap_err();
        assert_eq!(err.pos(), 3);
    }

    #[test]
    fn reads() {
        let codec = Codec::new(Mode::Ber);
        let mut data: &[u8] = b"\x02\x01\x05\x02\x01\x07";
        assert_eq!(codec.read::<i64, _>(&mut data).unwrap(), 5);
        assert_eq!(codec.read::<i64, _>(&mut data).unwrap(), 7);
        assert!(data.is_empty());

        let mut data: &[u8] = b"\x04\x01\x61";
        assert!(codec.read::<i64, _>(&mut data).is_err());

        let mut data: &[u8] = b"\xa0\x03\x02\x01\x09";
        assert_eq!(
            codec.read_with::<i64, _>(
                &mut data, &opts("tag:0,explicit")
            ).unwrap(),
            9
        );

        let mut target = Vec::new();
        codec.write_encoded(
            &9i64, &opts("tag:0,explicit"), &mut target
        ).unwrap();
        assert_eq!(target, b"\xa0\x03\x02\x01\x09");
    }
}
