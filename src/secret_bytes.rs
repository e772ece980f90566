//! A zeroizing 32-byte secret buffer.
//!
//! Every key this crate handles — channel root keys, tree node keys,
//! subscription keys, signing seeds — is exactly 32 bytes, so a single
//! fixed-size newtype covers them all instead of the generic
//! buffer-filling abstraction a variable-length-secret crate would need.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A 32-byte secret that is zeroed when dropped and never printed in debug
/// output.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretBytes32([u8; 32]);

impl SecretBytes32 {
    /// Wraps a raw 32-byte array.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the wrapped bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Samples a fresh secret from the given CSRNG.
    pub fn generate<R: rand_core::RngCore + rand_core::CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = [0_u8; 32];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }
}

impl From<[u8; 32]> for SecretBytes32 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for SecretBytes32 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SecretBytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SecretBytes32").field(&"_").finish()
    }
}
