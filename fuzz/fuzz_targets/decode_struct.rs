#![no_main]

use libfuzzer_sys::fuzz_target;
use bermap::{decode, encode};
use bermap::{
    ChoiceRegistry, Codec, Decode, Encode, FieldOptions, Mode, RawValue,
    Tag,
};

#[derive(Debug, PartialEq)]
struct Record {
    serial: i64,
    name: String,
    payload: RawValue,
}

const NAME_OPTS: FieldOptions = FieldOptions::new().optional();

fn payload_opts() -> FieldOptions {
    FieldOptions::new().choice("payload")
}

fn registry() -> ChoiceRegistry {
    let mut registry = ChoiceRegistry::new();
    registry.add(
        "payload", Tag::INTEGER, FieldOptions::new().with_tag(0)
    ).unwrap();
    registry.add(
        "payload", Tag::OCTET_STRING,
        FieldOptions::new().with_tag(1).explicit()
    ).unwrap();
    registry.add("payload", Tag::SEQUENCE, FieldOptions::new()).unwrap();
    registry
}

impl Encode for Record {
    fn to_raw(&self, codec: &Codec) -> Result<RawValue, encode::Error> {
        let mut fields = Vec::new();
        fields.extend(
            codec.encode_field(&self.serial, &FieldOptions::new())?
        );
        fields.extend(codec.encode_field(&self.name, &NAME_OPTS)?);
        fields.extend(codec.encode_field(&self.payload, &payload_opts())?);
        RawValue::sequence(fields)
    }
}

impl Decode for Record {
    const TAG: Option<Tag> = Some(Tag::SEQUENCE);
    const CONSTRUCTED: bool = true;

    fn from_raw(
        raw: &RawValue, codec: &Codec, pos: u64
    ) -> Result<Self, decode::Error> {
        let mut fields = raw.fields(pos)?;
        let res = Record {
            serial: codec.decode_field(&mut fields, &FieldOptions::new())?,
            name: codec.decode_field(&mut fields, &NAME_OPTS)?,
            payload: codec.decode_field(&mut fields, &payload_opts())?,
        };
        fields.finish()?;
        Ok(res)
    }
}

fuzz_target!(|data: &[u8]| {
    for mode in [Mode::Ber, Mode::Der] {
        let codec = Codec::with_choices(mode, registry());
        if let Ok(record) = codec.decode::<Record>(data) {
            // Whatever decodes must survive a round trip.
            let bytes = codec.encode(&record).unwrap();
            let again: Record = codec.decode(&bytes).unwrap();
            assert_eq!(record, again);
        }
    }
});
