use thiserror::Error;

/// Errors surfaced by the hide/reveal pipeline.
///
/// Authentication failures are deliberately absent: a wrong password, a
/// corrupted carrier and a carrier with nothing embedded all come back as
/// `None` from the reveal side, never as an error.
#[derive(Debug, Error)]
pub enum StegoError {
    #[error("secure random source failed: {0}")]
    Randomness(String),

    #[error("carrier too small: need {needed_bits} bits, have {available_bits}")]
    Capacity {
        needed_bits: usize,
        available_bits: usize,
    },

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("key derivation failed: {0}")]
    Kdf(String),

    #[error("cipher setup failed: {0}")]
    Cipher(String),

    #[error("could not produce a terminator-safe ciphertext after {attempts} attempts")]
    TerminatorCollision { attempts: u32 },
}

pub type Result<T> = std::result::Result<T, StegoError>;
