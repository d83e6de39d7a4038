#![no_main]
use deltarle::codec::{self, Method};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary input must decode or fail cleanly, never panic.
    for m in Method::ALL {
        if let Ok(out) = codec::decompress(data, m) {
            if m == Method::DeltaOnly {
                assert_eq!(out.len(), data.len());
            }
        }
    }
});
