#![no_main]

use libfuzzer_sys::fuzz_target;
use icy_viz::{FixedSize, RenderOptions, RenderTarget};
use arbitrary::Arbitrary;

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    rows: u8,
    columns: u8,
    user_width: u8,
    loop_count: u8,
    image: Vec<u8>,
}

fuzz_target!(|input: FuzzInput| {
    let terminal = FixedSize {
        rows: input.rows as u32,
        columns: input.columns as u32,
    };
    let options = RenderOptions {
        loop_count: (input.loop_count % 4) as u32,
        delay_multiplier: 1.0,
        user_width: input.user_width as u32,
    };

    // Identity palette; only the geometry and resize paths are under test
    let palette = |c: image::Rgba<u8>| c.0[0];
    if let Ok(target) = RenderTarget::from_bytes(&input.image, &options, &terminal, &palette) {
        for frame in target.frames() {
            assert_eq!(frame.grid.width(), target.width());
            assert_eq!(frame.grid.height(), target.height());
        }
    }
});
