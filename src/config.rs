use serde::{Deserialize, Serialize};

use crate::crypto::{IV_LEN, TAG_LEN};
use crate::error::{Result, StegoError};

/// PBKDF2-HMAC-SHA256 rounds for protocol version 1.
pub const V1_KDF_ITERATIONS: u32 = 100_002;
/// Salt length for protocol version 1.
pub const V1_SALT_LEN: usize = 32;
/// Derived key length; AES-256 needs exactly 32 bytes.
pub const KEY_LEN: usize = 32;
/// Newest protocol version this crate can seal and open.
pub const CURRENT_VERSION: u8 = 1;

/// Classic BMP header: 14-byte file header + 40-byte info header.
pub const BMP_HEADER_LEN: usize = 54;
/// Offset used by carriers written by the legacy web encoder.
pub const LEGACY_HEADER_LEN: usize = 55;

/// Cipher parameters, pinned per protocol version.
///
/// The blob carries no version byte, so both sides must agree on these out
/// of band. A blob sealed under one set cannot be opened under another.
///
/// `version` names the pinned set the other fields came from. Fields may be
/// overridden (tests lower `kdf_iterations`), but the version must be known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherParams {
    pub version: u8,
    /// PBKDF2 rounds.
    pub kdf_iterations: u32,
    pub salt_len: usize,
    pub key_len: usize,
}

impl CipherParams {
    pub fn v1() -> Self {
        Self {
            version: 1,
            kdf_iterations: V1_KDF_ITERATIONS,
            salt_len: V1_SALT_LEN,
            key_len: KEY_LEN,
        }
    }

    /// Parameter set pinned for protocol `version`.
    pub fn for_version(version: u8) -> Result<Self> {
        match version {
            1 => Ok(Self::v1()),
            other => Err(StegoError::InvalidParams(format!(
                "unsupported protocol version {other} (known: 1..={CURRENT_VERSION})"
            ))),
        }
    }

    /// Bytes in front of the encrypted region: salt || iv.
    pub fn header_len(&self) -> usize {
        self.salt_len + IV_LEN
    }

    /// Total blob bytes that are not message: salt || iv || tag.
    pub fn overhead(&self) -> usize {
        self.header_len() + TAG_LEN
    }

    pub fn validate(&self) -> Result<()> {
        Self::for_version(self.version)?;
        if self.kdf_iterations == 0 {
            return Err(StegoError::InvalidParams(
                "kdf_iterations must be at least 1".into(),
            ));
        }
        if self.salt_len < 16 {
            return Err(StegoError::InvalidParams(format!(
                "salt_len {} is too short (min 16)",
                self.salt_len
            )));
        }
        if self.key_len != KEY_LEN {
            return Err(StegoError::InvalidParams(format!(
                "key_len {} unsupported (expected {KEY_LEN})",
                self.key_len
            )));
        }
        Ok(())
    }
}

impl Default for CipherParams {
    fn default() -> Self {
        Self::v1()
    }
}

/// Where the payload region of a carrier starts.
///
/// The embedder never parses the carrier's own header; the carrier format
/// decides how many leading bytes are off limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierLayout {
    pub header_len: usize,
}

impl CarrierLayout {
    pub fn bmp() -> Self {
        Self {
            header_len: BMP_HEADER_LEN,
        }
    }

    pub fn legacy() -> Self {
        Self {
            header_len: LEGACY_HEADER_LEN,
        }
    }

    pub fn with_header_len(header_len: usize) -> Self {
        Self { header_len }
    }
}

impl Default for CarrierLayout {
    fn default() -> Self {
        Self::bmp()
    }
}

/// Everything the hide/reveal pipeline needs besides the inputs themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedOptions {
    pub cipher: CipherParams,
    pub layout: CarrierLayout,
}

impl EmbedOptions {
    /// Pinned parameters for protocol `version` over `layout`.
    pub fn for_version(version: u8, layout: CarrierLayout) -> Result<Self> {
        Ok(Self {
            cipher: CipherParams::for_version(version)?,
            layout,
        })
    }

    pub fn with_layout(layout: CarrierLayout) -> Self {
        Self {
            layout,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.cipher.validate()
    }
}
