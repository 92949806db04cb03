#![no_main]
use libfuzzer_sys::fuzz_target;

use bmpstego::stego::lsb;
use bmpstego::CarrierLayout;

/// Fuzz the LSB extractor with arbitrary carrier bytes.
///
/// The first input byte picks the header length so short and oversized
/// headers are both exercised. Must not panic, and must never return more
/// bytes than the carrier can hold.
fuzz_target!(|data: &[u8]| {
    let Some((&header, carrier)) = data.split_first() else {
        return;
    };
    let layout = CarrierLayout::with_header_len(header as usize);
    let out = lsb::extract(carrier, &layout);
    assert!(out.len() <= lsb::capacity(carrier.len(), &layout));
    assert!(!out.contains(&0));
});
