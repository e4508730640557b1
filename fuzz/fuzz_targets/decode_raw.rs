#![no_main]

use libfuzzer_sys::fuzz_target;
use bermap::decode::Source;
use bermap::{Mode, RawValue};

fuzz_target!(|data: &[u8]| {
    let mut source = Source::new(data);
    let ber = RawValue::take_from(&mut source, Mode::Ber);

    if let Ok(value) = ber.as_ref() {
        // Whatever parses must re-encode and parse back to itself.
        let bytes = value.to_vec().unwrap();
        let mut source = Source::new(bytes.as_slice());
        let back = RawValue::take_from(&mut source, Mode::Ber).unwrap();
        assert_eq!(&back, value);
    }

    let mut source = Source::new(data);
    if let Ok(value) = RawValue::take_from(&mut source, Mode::Der) {
        // DER parses under BER too and re-encodes to the input octets.
        assert!(ber.is_ok());
        let consumed = source.pos() as usize;
        assert_eq!(value.to_vec().unwrap(), &data[..consumed]);
    }
});
