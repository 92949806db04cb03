use bmpstego::{CarrierLayout, CipherParams, EmbedOptions};

/// A zeroed carrier with a 54-byte header, as a minimal BMP stand-in.
fn zeroed_bmp(len: usize) -> Vec<u8> {
    let mut carrier = vec![0u8; len];
    carrier[..2].copy_from_slice(b"BM");
    carrier
}

fn cheap_opts() -> EmbedOptions {
    EmbedOptions {
        cipher: CipherParams {
            kdf_iterations: 64,
            ..CipherParams::v1()
        },
        layout: CarrierLayout::bmp(),
    }
}

#[test]
fn hello_secret_end_to_end() {
    let carrier = zeroed_bmp(10_000);

    let stego = bmpstego::hide_message(&carrier, "hello", "secret").expect("embed should succeed");
    assert_eq!(stego.len(), carrier.len());

    assert_eq!(bmpstego::reveal_message(&stego, "secret"), "hello");
    assert_eq!(bmpstego::reveal_message(&stego, "wrong"), "");
}

#[test]
fn layered_pipeline_with_default_params() {
    let blob = bmpstego::encrypt(b"hello", b"secret").expect("encrypt should succeed");
    assert_eq!(blob.len(), 32 + 16 + 32 + 5);

    let roundtrip = bmpstego::decrypt(&blob, b"secret").expect("decrypt should succeed");
    assert_eq!(&roundtrip[..], b"hello");
    assert!(bmpstego::decrypt(&blob, b"wrong").is_none());
}

#[test]
fn roundtrip_utf8_message() {
    let carrier = zeroed_bmp(20_000);
    let msg = "sn\u{00f8}w \u{2744} in the pixels";
    let stego = bmpstego::hide(&carrier, msg.as_bytes(), b"pw", &cheap_opts()).unwrap();
    let recovered = bmpstego::reveal(&stego, b"pw", &cheap_opts()).unwrap();
    assert_eq!(std::str::from_utf8(&recovered).unwrap(), msg);
}

#[test]
fn roundtrip_empty_message_is_some_empty() {
    let carrier = zeroed_bmp(2_000);
    let stego = bmpstego::hide(&carrier, b"", b"pw", &cheap_opts()).unwrap();
    let recovered = bmpstego::reveal(&stego, b"pw", &cheap_opts()).expect("empty message decodes");
    assert!(recovered.is_empty());
    assert!(bmpstego::reveal(&stego, b"other", &cheap_opts()).is_none());
}

#[test]
fn roundtrip_many_messages() {
    let carrier: Vec<u8> = (0..30_000u32).map(|i| (i.wrapping_mul(2654435761) >> 24) as u8).collect();
    for len in [1usize, 2, 15, 16, 17, 100, 500] {
        let msg: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        let stego = bmpstego::hide(&carrier, &msg, b"pw", &cheap_opts()).unwrap();
        let recovered = bmpstego::reveal(&stego, b"pw", &cheap_opts())
            .unwrap_or_else(|| panic!("message of {len} bytes did not round-trip"));
        assert_eq!(&recovered[..], &msg[..]);
    }
}

#[test]
fn two_hides_differ_but_both_reveal() {
    let carrier = zeroed_bmp(5_000);
    let a = bmpstego::hide(&carrier, b"same", b"pw", &cheap_opts()).unwrap();
    let b = bmpstego::hide(&carrier, b"same", b"pw", &cheap_opts()).unwrap();
    assert_ne!(a, b);
    assert_eq!(&bmpstego::reveal(&a, b"pw", &cheap_opts()).unwrap()[..], b"same");
    assert_eq!(&bmpstego::reveal(&b, b"pw", &cheap_opts()).unwrap()[..], b"same");
}

#[test]
fn message_filling_capacity_exactly() {
    let opts = cheap_opts();
    let msg = b"exact fit";
    // Header + (blob) bits, with no room left for the terminator.
    let carrier = zeroed_bmp(54 + (80 + msg.len()) * 8);
    assert_eq!(bmpstego::max_message_len(carrier.len(), &opts), msg.len());

    let stego = bmpstego::hide(&carrier, msg, b"pw", &opts).unwrap();
    assert_eq!(&bmpstego::reveal(&stego, b"pw", &opts).unwrap()[..], msg);
}

#[test]
fn legacy_layout_roundtrip() {
    let opts = EmbedOptions {
        layout: CarrierLayout::legacy(),
        ..cheap_opts()
    };
    let carrier = zeroed_bmp(4_000);
    let stego = bmpstego::hide(&carrier, b"old service", b"pw", &opts).unwrap();
    assert_eq!(stego[54], carrier[54], "byte 54 is skipped in the legacy layout");
    assert_eq!(&bmpstego::reveal(&stego, b"pw", &opts).unwrap()[..], b"old service");
}
