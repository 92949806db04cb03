#![no_main]
use libfuzzer_sys::fuzz_target;

use bmpstego::{CarrierLayout, CipherParams, EmbedOptions};

/// Fuzz the full reveal pipeline (extract -> parse -> open) on hostile
/// carriers. Must not panic.
fuzz_target!(|data: &[u8]| {
    let opts = EmbedOptions {
        cipher: CipherParams {
            kdf_iterations: 1,
            ..CipherParams::v1()
        },
        layout: CarrierLayout::bmp(),
    };
    let _ = bmpstego::reveal(data, b"fuzz", &opts);
    let _ = bmpstego::inspect(data, &opts);
});
