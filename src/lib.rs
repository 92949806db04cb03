//! bmpstego core library.
//!
//! Hides a password-protected message in the least significant bits of an
//! uncompressed bitmap's pixel bytes:
//! - Ciphertext blob: PBKDF2-HMAC-SHA256 key, HMAC-SHA256 tag, AES-256-CFB
//! - LSB embedding/extraction after a fixed, unparsed carrier header
//! - Versioned cipher parameters and carrier layout (config)
//! - Atomic, permission-hardened output writes for front ends

pub mod blob;
pub mod config;
pub mod crypto;
pub mod error;
pub mod secure_fs;
pub mod stego;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::debug;
use serde::Serialize;
use zeroize::Zeroizing;

pub use blob::{decrypt, encrypt, CiphertextBlob};
pub use config::{CarrierLayout, CipherParams, EmbedOptions};
pub use error::{Result, StegoError};

/// Hide `message` in a copy of `carrier`.
///
/// This function:
/// 1) Checks the message fits the carrier and the sealing ceiling
/// 2) Seals the message into a terminator-safe ciphertext blob
/// 3) Embeds the blob bits into the copy's LSBs
///
/// The returned buffer has the same length as `carrier`.
pub fn hide(
    carrier: &[u8],
    message: &[u8],
    password: &[u8],
    opts: &EmbedOptions,
) -> Result<Vec<u8>> {
    opts.validate()?;

    // Step 1: fail on capacity before paying for key derivation
    let needed_bits = (opts.cipher.overhead() + message.len()).saturating_mul(8);
    let available_bits = usable_bits(carrier.len(), opts);
    if needed_bits > available_bits {
        return Err(StegoError::Capacity {
            needed_bits,
            available_bits,
        });
    }

    // Step 2: seal
    let blob = CiphertextBlob::seal_embeddable(message, password, &opts.cipher)?;

    // Step 3: embed
    let mut out = carrier.to_vec();
    stego::lsb::embed(&mut out, &blob.to_bytes(), &opts.layout)?;
    debug!(
        "hid {} message bytes ({} blob bytes) in a {} byte carrier",
        message.len(),
        blob.len(),
        carrier.len()
    );
    Ok(out)
}

/// Recover a message hidden by [`hide`].
///
/// `None` means no message could be recovered: wrong password, corrupted
/// carrier, or nothing embedded. The cases are indistinguishable.
pub fn reveal(carrier: &[u8], password: &[u8], opts: &EmbedOptions) -> Option<Zeroizing<Vec<u8>>> {
    let raw = stego::lsb::extract(carrier, &opts.layout);
    let blob = CiphertextBlob::from_bytes(&raw, &opts.cipher)?;
    blob.open(password, &opts.cipher)
}

/// String-level [`hide`] with default options.
pub fn hide_message(carrier: &[u8], message: &str, password: &str) -> Result<Vec<u8>> {
    hide(
        carrier,
        message.as_bytes(),
        password.as_bytes(),
        &EmbedOptions::default(),
    )
}

/// String-level [`reveal`] with default options.
///
/// Returns an empty string on any failure. Use [`reveal`] to tell an empty
/// message apart from a failed decode.
pub fn reveal_message(carrier: &[u8], password: &str) -> String {
    reveal(carrier, password.as_bytes(), &EmbedOptions::default())
        .map(|pt| String::from_utf8_lossy(&pt).into_owned())
        .unwrap_or_default()
}

/// Largest message [`hide`] accepts for a carrier of `carrier_len` bytes.
///
/// Bounded by the carrier's LSB capacity and by the longest message that
/// seals without a zero byte.
pub fn max_message_len(carrier_len: usize, opts: &EmbedOptions) -> usize {
    let fits =
        stego::lsb::capacity(carrier_len, &opts.layout).saturating_sub(opts.cipher.overhead());
    fits.min(blob::max_embeddable_len(blob::SEAL_ATTEMPTS))
}

/// Blob bits `hide` may write: LSB capacity, capped at the sealing ceiling.
fn usable_bits(carrier_len: usize, opts: &EmbedOptions) -> usize {
    let lsb_bits = stego::lsb::capacity_bits(carrier_len, &opts.layout);
    let sealable_bits = (blob::max_embeddable_len(blob::SEAL_ATTEMPTS) + opts.cipher.overhead())
        .saturating_mul(8);
    lsb_bits.min(sealable_bits)
}

/// Structural view of whatever blob a carrier holds. Needs no password.
#[derive(Debug, Clone, Serialize)]
pub struct BlobSummary {
    /// Bytes read from the carrier before the terminator (or carrier end).
    pub extracted_len: usize,
    /// Whether a zero-byte terminator was found.
    pub terminated: bool,
    pub salt_b64: String,
    pub iv_b64: String,
    /// Encrypted tag + message bytes.
    pub sealed_len: usize,
    /// Implied message length, if the blob is long enough to hold a tag.
    pub message_len: Option<usize>,
}

/// Parse the blob in `carrier` without decrypting it.
///
/// `None` if fewer bytes than a blob header could be extracted. A summary is
/// not proof that a message exists; random LSBs parse just as well.
pub fn inspect(carrier: &[u8], opts: &EmbedOptions) -> Option<BlobSummary> {
    let (raw, ending) = stego::lsb::extract_with_ending(carrier, &opts.layout);
    let blob = CiphertextBlob::from_bytes(&raw, &opts.cipher)?;
    Some(BlobSummary {
        extracted_len: raw.len(),
        terminated: ending == stego::lsb::Ending::Terminator,
        salt_b64: STANDARD.encode(blob.salt()),
        iv_b64: STANDARD.encode(blob.iv()),
        sealed_len: blob.sealed_len(),
        message_len: blob.plaintext_len(),
    })
}
