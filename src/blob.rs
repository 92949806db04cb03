//! Ciphertext blob.
//!
//! Wire layout:
//!
//! ```text
//! [salt (32)][iv (16)][AES-256-CFB( tag (32) || plaintext (N) )]
//! ```
//!
//! The tag is HMAC-SHA256 over the plaintext, keyed with the same
//! PBKDF2-derived key as the cipher (encrypt-and-MAC). Salt and iv are not
//! covered by the tag; tampering with them changes the key or keystream and
//! the tag check fails anyway.

use log::debug;
use zeroize::Zeroizing;

use crate::config::CipherParams;
use crate::crypto::{self, IV_LEN, TAG_LEN};
use crate::error::{Result, StegoError};

/// Upper bound on iv resamples when sealing for a carrier.
pub const SEAL_ATTEMPTS: u32 = 4096;

/// Expected zero-free draws at the sealing ceiling. Running out of attempts
/// there has odds of about e^-32.
const SEAL_MARGIN: f64 = 32.0;

/// Longest message [`CiphertextBlob::seal_embeddable`] reliably seals within
/// `attempts` iv draws.
///
/// One draw yields a zero-free region of `L` bytes with probability
/// (255/256)^L, so the region is capped where `attempts` draws still expect
/// `SEAL_MARGIN` successes.
pub fn max_embeddable_len(attempts: u32) -> usize {
    let attempts = f64::from(attempts);
    if attempts <= SEAL_MARGIN {
        return 0;
    }
    let per_byte = (255.0f64 / 256.0).ln();
    let region = ((SEAL_MARGIN / attempts).ln() / per_byte).floor() as usize;
    region.saturating_sub(TAG_LEN)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CiphertextBlob {
    salt: Vec<u8>,
    iv: Vec<u8>,
    /// Encrypted tag || plaintext.
    sealed: Vec<u8>,
}

impl CiphertextBlob {
    /// Encrypt and authenticate `plaintext` under `password`.
    pub fn seal(plaintext: &[u8], password: &[u8], params: &CipherParams) -> Result<Self> {
        params.validate()?;

        let salt = crypto::random_bytes(params.salt_len)?;
        let iv = crypto::random_bytes(IV_LEN)?;
        let key = crypto::derive_key(password, &salt, params)?;
        let tag = crypto::compute_tag(&key, plaintext)?;
        let sealed = seal_region(&key, &iv, &tag, plaintext)?;

        Ok(Self { salt, iv, sealed })
    }

    /// Like [`seal`](Self::seal), but the serialized blob contains no 0x00
    /// byte, so it survives the carrier's zero-byte terminator.
    ///
    /// Salt and iv are drawn from non-zero bytes; the iv is resampled until
    /// the encrypted region is zero-free. The key is derived once, so each
    /// retry costs one AES pass.
    pub fn seal_embeddable(
        plaintext: &[u8],
        password: &[u8],
        params: &CipherParams,
    ) -> Result<Self> {
        params.validate()?;

        let salt = crypto::random_nonzero_bytes(params.salt_len)?;
        let key = crypto::derive_key(password, &salt, params)?;
        let tag = crypto::compute_tag(&key, plaintext)?;

        for attempt in 1..=SEAL_ATTEMPTS {
            let iv = crypto::random_nonzero_bytes(IV_LEN)?;
            let sealed = seal_region(&key, &iv, &tag, plaintext)?;
            if !sealed.contains(&0) {
                debug!("sealed {} bytes after {attempt} iv draw(s)", sealed.len());
                return Ok(Self { salt, iv, sealed });
            }
        }

        Err(StegoError::TerminatorCollision {
            attempts: SEAL_ATTEMPTS,
        })
    }

    /// Verify and decrypt. `None` on any failure, with no detail.
    pub fn open(&self, password: &[u8], params: &CipherParams) -> Option<Zeroizing<Vec<u8>>> {
        let key = crypto::derive_key(password, &self.salt, params).ok()?;
        let mut region = Zeroizing::new(self.sealed.clone());
        let plaintext = open_region(&key, &self.iv, region.as_mut_slice())?;
        Some(Zeroizing::new(plaintext.to_vec()))
    }

    /// Split raw bytes into salt, iv and encrypted region.
    ///
    /// Only the fixed header is checked here; a region shorter than a tag is
    /// accepted and rejected later by [`open`](Self::open).
    pub fn from_bytes(input: &[u8], params: &CipherParams) -> Option<Self> {
        if input.len() < params.header_len() {
            return None;
        }
        let (salt, rest) = input.split_at(params.salt_len);
        let (iv, sealed) = rest.split_at(IV_LEN);
        Some(Self {
            salt: salt.to_vec(),
            iv: iv.to_vec(),
            sealed: sealed.to_vec(),
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.iv);
        out.extend_from_slice(&self.sealed);
        out
    }

    pub fn len(&self) -> usize {
        self.salt.len() + self.iv.len() + self.sealed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    pub fn sealed_len(&self) -> usize {
        self.sealed.len()
    }

    /// Message length implied by the blob size, if it is long enough to hold a tag.
    pub fn plaintext_len(&self) -> Option<usize> {
        self.sealed.len().checked_sub(TAG_LEN)
    }
}

fn seal_region(key: &[u8], iv: &[u8], tag: &[u8; TAG_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut region = Vec::with_capacity(TAG_LEN + plaintext.len());
    region.extend_from_slice(tag);
    region.extend_from_slice(plaintext);
    crypto::cfb_encrypt(key, iv, &mut region)?;
    Ok(region)
}

/// Decrypt `region` in place and check its tag. Returns the plaintext slice.
fn open_region<'a>(key: &[u8], iv: &[u8], region: &'a mut [u8]) -> Option<&'a [u8]> {
    if region.len() < TAG_LEN {
        debug!("encrypted region is {} bytes, shorter than a tag", region.len());
        return None;
    }
    crypto::cfb_decrypt(key, iv, region).ok()?;

    let region: &'a [u8] = region;
    let (received, candidate) = region.split_at(TAG_LEN);
    let expected = crypto::compute_tag(key, candidate).ok()?;
    if !crypto::tags_match(received, &expected) {
        debug!("tag mismatch");
        return None;
    }
    Some(candidate)
}

/// Encrypt with version-1 parameters. Returns the serialized blob.
pub fn encrypt(plaintext: &[u8], password: &[u8]) -> Result<Vec<u8>> {
    encrypt_with(plaintext, password, &CipherParams::v1())
}

pub fn encrypt_with(plaintext: &[u8], password: &[u8], params: &CipherParams) -> Result<Vec<u8>> {
    Ok(CiphertextBlob::seal(plaintext, password, params)?.to_bytes())
}

/// Verify and decrypt a serialized blob with version-1 parameters.
///
/// `None` covers a wrong password, a corrupted blob and bytes that were never
/// a blob. `Some` with an empty vector is a genuinely empty message.
pub fn decrypt(blob: &[u8], password: &[u8]) -> Option<Zeroizing<Vec<u8>>> {
    decrypt_with(blob, password, &CipherParams::v1())
}

pub fn decrypt_with(
    blob: &[u8],
    password: &[u8],
    params: &CipherParams,
) -> Option<Zeroizing<Vec<u8>>> {
    let mut buf = Zeroizing::new(blob.to_vec());
    let plaintext = decrypt_in_place(buf.as_mut_slice(), password, params)?;
    Some(Zeroizing::new(plaintext.to_vec()))
}

/// Decrypt a caller-owned blob buffer in place.
///
/// On success the returned slice points at the plaintext inside `blob`. On
/// failure the encrypted region may already have been overwritten with
/// keystream output.
pub fn decrypt_in_place<'a>(
    blob: &'a mut [u8],
    password: &[u8],
    params: &CipherParams,
) -> Option<&'a [u8]> {
    if blob.len() < params.header_len() {
        debug!("blob is {} bytes, shorter than its header", blob.len());
        return None;
    }
    let (header, region) = blob.split_at_mut(params.header_len());
    let (salt, iv) = header.split_at(params.salt_len);
    let key = crypto::derive_key(password, salt, params).ok()?;
    open_region(&key, iv, region)
}
