#![no_main]
use libfuzzer_sys::fuzz_target;

use bmpstego::blob;
use bmpstego::CipherParams;

/// Fuzz blob parsing + authenticated decryption with arbitrary bytes.
///
/// A low iteration count keeps throughput usable; the parsing and tag
/// check paths are the same as with version-1 parameters.
fuzz_target!(|data: &[u8]| {
    let params = CipherParams {
        kdf_iterations: 1,
        ..CipherParams::v1()
    };
    let _ = blob::decrypt_with(data, b"fuzz", &params);
});
