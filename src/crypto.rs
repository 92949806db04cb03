use aes::Aes256;
use cfb_mode::cipher::{AsyncStreamCipher, KeyIvInit};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::config::CipherParams;
use crate::error::{Result, StegoError};

/// AES block size; CFB takes a full block as IV.
pub const IV_LEN: usize = 16;
/// HMAC-SHA256 output length.
pub const TAG_LEN: usize = 32;

type HmacSha256 = Hmac<Sha256>;
type Aes256CfbEnc = cfb_mode::Encryptor<Aes256>;
type Aes256CfbDec = cfb_mode::Decryptor<Aes256>;

/// Secure random bytes from OS RNG.
pub fn random_bytes(len: usize) -> Result<Vec<u8>> {
    let mut out = vec![0u8; len];
    getrandom::getrandom(&mut out).map_err(|e| StegoError::Randomness(e.to_string()))?;
    Ok(out)
}

/// Secure random bytes with every zero byte resampled.
///
/// Used for header fields that end up inside a carrier, where 0x00 is the
/// end-of-message marker.
pub fn random_nonzero_bytes(len: usize) -> Result<Vec<u8>> {
    let mut out = random_bytes(len)?;
    let mut byte = [0u8; 1];
    for b in out.iter_mut() {
        while *b == 0 {
            getrandom::getrandom(&mut byte).map_err(|e| StegoError::Randomness(e.to_string()))?;
            *b = byte[0];
        }
    }
    Ok(out)
}

/// Derive the cipher/MAC key with PBKDF2-HMAC-SHA256.
pub fn derive_key(password: &[u8], salt: &[u8], params: &CipherParams) -> Result<Zeroizing<Vec<u8>>> {
    if salt.len() != params.salt_len {
        return Err(StegoError::Kdf(format!(
            "salt is {} bytes (expected {})",
            salt.len(),
            params.salt_len
        )));
    }
    let mut key = Zeroizing::new(vec![0u8; params.key_len]);
    pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, params.kdf_iterations, key.as_mut_slice());
    Ok(key)
}

/// HMAC-SHA256 over `message`.
pub fn compute_tag(key: &[u8], message: &[u8]) -> Result<[u8; TAG_LEN]> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| StegoError::Kdf(format!("hmac key: {e}")))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().into())
}

/// Constant-time tag comparison. Length mismatch is not secret.
pub fn tags_match(received: &[u8], expected: &[u8]) -> bool {
    received.len() == expected.len() && bool::from(received.ct_eq(expected))
}

/// AES-256-CFB encryption in place.
pub fn cfb_encrypt(key: &[u8], iv: &[u8], buf: &mut [u8]) -> Result<()> {
    Aes256CfbEnc::new_from_slices(key, iv)
        .map_err(|e| StegoError::Cipher(format!("AES-256-CFB init: {e}")))?
        .encrypt(buf);
    Ok(())
}

/// AES-256-CFB decryption in place.
pub fn cfb_decrypt(key: &[u8], iv: &[u8], buf: &mut [u8]) -> Result<()> {
    Aes256CfbDec::new_from_slices(key, iv)
        .map_err(|e| StegoError::Cipher(format!("AES-256-CFB init: {e}")))?
        .decrypt(buf);
    Ok(())
}
