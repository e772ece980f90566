//! Error type covering the three failure classes this crate can surface:
//! precondition violations, external-resource failures, and corrupt
//! deserialization. See the crate-level docs for the broader contract.

/// Errors produced by this crate's public operations.
///
/// The core never retries and never logs; callers decide how to react to
/// each variant.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An input violated a documented precondition (bad timestamp range,
    /// out-of-range decoder id, `t_lo > t_hi`, ...). Fatal; not recoverable
    /// by the core itself.
    #[error("precondition violated: {0}")]
    Precondition(&'static str),
    /// The CSRNG failed to produce randomness.
    #[error("secure random number generation failed")]
    Rng(#[source] rand_core::Error),
    /// Argon2id key derivation failed (e.g. allocation failure at the
    /// configured memory cost).
    #[error("argon2 key derivation failed")]
    Kdf(#[source] argon2::Error),
    /// AEAD decryption or Ed25519 signature verification failed on an
    /// envelope. Carries no further detail by design, so callers cannot
    /// distinguish "bad signature" from "bad ciphertext" and build an
    /// oracle out of it.
    #[error("envelope authentication failed")]
    Envelope,
    /// `GlobalSecrets` JSON was malformed or missing required fields
    /// (including a missing channel 0).
    #[error("failed to (de)serialize global secrets")]
    Serde(#[source] serde_json::Error),
}

impl From<argon2::Error> for Error {
    fn from(e: argon2::Error) -> Self {
        Error::Kdf(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serde(e)
    }
}

/// Convenience alias used throughout this crate's public API.
pub type Result<T> = core::result::Result<T, Error>;
