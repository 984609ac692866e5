#![no_main]

use libfuzzer_sys::fuzz_target;
use icy_viz::{compose, SourceImage};

fuzz_target!(|data: &[u8]| {
    // Decoding and compositing should never panic, regardless of input
    if let Ok(source) = SourceImage::from_bytes(data, true) {
        let _ = compose(source);
    }
});
