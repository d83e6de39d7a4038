#![no_main]
use deltarle::codec::{self, Method};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&selector, payload)) = data.split_first() else {
        return;
    };
    let method = Method::ALL[selector as usize % Method::ALL.len()];

    // Stretch the payload so runs longer than one record show up.
    let mut input = Vec::with_capacity(payload.len() * 4);
    for &b in payload {
        let reps = if b & 0x80 != 0 { 300 } else { 1 };
        input.extend(std::iter::repeat_n(b, reps));
    }

    let packed = codec::compress(&input, method);
    let decoded = codec::decompress(&packed, method).unwrap();
    assert_eq!(decoded, input);
});
