//! Provider-side secrets: per-channel key material (component G) and the
//! per-decoder subscription KDF (component F).

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use argon2::{Algorithm, Argon2, Params, Version};
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::secret_bytes::SecretBytes32;
use crate::validate::verify_decoder;

/// Argon2id tuning parameters for [`GlobalSecrets::subscription_key_for_decoder`]:
/// `t=3, m=64 MiB, p=4`, 32-byte output.
const ARGON2_TIME_COST: u32 = 3;
const ARGON2_MEMORY_COST_KIB: u32 = 65536;
const ARGON2_PARALLELISM: u32 = 4;
const ARGON2_OUTPUT_LEN: usize = 32;

/// Keys used for a single channel: the seed of its key-derivation tree
/// (see [`crate::node`]) and the Ed25519 seed used to sign its frames.
///
/// Channel 0 is special: it has no key tree, and `root_key` is used
/// directly as the frame key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelKey {
    /// Seed of this channel's 64-level key-derivation tree (see
    /// [`crate::node`]). For channel 0, used directly as the frame key
    /// instead, since channel 0 has no tree.
    pub root_key: SecretBytes32,
    /// Ed25519 seed used to sign this channel's frames and subscriptions.
    pub private_key: SecretBytes32,
}

impl ChannelKey {
    /// Samples a fresh channel key pair from the given CSRNG.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        ChannelKey {
            root_key: SecretBytes32::generate(rng),
            private_key: SecretBytes32::generate(rng),
        }
    }
}

/// All secrets a provider holds: the global subscription key material plus
/// one [`ChannelKey`] per channel (channel 0 is always present).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalSecrets {
    /// Salt/key for [`GlobalSecrets::subscription_key_for_decoder`]'s
    /// Argon2id derivation; shared by every decoder this provider issues
    /// a subscription to.
    pub subscribe_root_key: SecretBytes32,
    /// Ed25519 seed used to sign subscription blobs.
    pub subscribe_private_key: SecretBytes32,
    /// Per-channel key material, keyed by channel id. Channel 0 is always
    /// present.
    pub channels: BTreeMap<u32, ChannelKey>,
}

impl GlobalSecrets {
    /// Generates fresh global secrets: a subscription root and signing
    /// key, plus one [`ChannelKey`] for channel 0 and each id in
    /// `channel_ids`.
    pub fn generate<R: RngCore + CryptoRng>(channel_ids: &BTreeSet<u32>, rng: &mut R) -> Self {
        let mut channels = BTreeMap::new();
        channels.insert(0, ChannelKey::generate(rng));
        for &id in channel_ids {
            channels.entry(id).or_insert_with(|| ChannelKey::generate(rng));
        }

        GlobalSecrets {
            subscribe_root_key: SecretBytes32::generate(rng),
            subscribe_private_key: SecretBytes32::generate(rng),
            channels,
        }
    }

    /// Derives the per-decoder subscription key via Argon2id, keyed by
    /// `subscribe_root_key`.
    ///
    /// The password is the 4-byte little-endian encoding of `decoder_id`;
    /// the salt is the 32-byte `subscribe_root_key`. The memory-hard cost
    /// slows brute force of the decoder identity space, and binding to
    /// the subscription root ensures distinct providers derive disjoint
    /// key spaces.
    pub fn subscription_key_for_decoder(&self, decoder_id: u32) -> Result<SecretBytes32> {
        verify_decoder(decoder_id)?;

        let params = Params::new(
            ARGON2_MEMORY_COST_KIB,
            ARGON2_TIME_COST,
            ARGON2_PARALLELISM,
            Some(ARGON2_OUTPUT_LEN),
        )
        .map_err(Error::Kdf)?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let password = decoder_id.to_le_bytes();
        let mut output = [0_u8; ARGON2_OUTPUT_LEN];
        argon2
            .hash_password_into(&password, self.subscribe_root_key.as_bytes(), &mut output)
            .map_err(Error::Kdf)?;
        Ok(SecretBytes32::new(output))
    }

    /// Serializes this instance to the canonical JSON form: byte strings
    /// as arrays of `0..=255` integers, channel ids as string object keys.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restores an instance from its canonical JSON form. Fails if the
    /// JSON is malformed, any byte array has the wrong length, or channel
    /// 0 is missing.
    pub fn from_json(raw: &str) -> Result<Self> {
        let secrets: GlobalSecrets = serde_json::from_str(raw)?;
        if !secrets.channels.contains_key(&0) {
            return Err(Error::Precondition("channel 0 is missing"));
        }
        Ok(secrets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    fn sample_secrets() -> GlobalSecrets {
        let mut rng = OsRng;
        let channel_ids: BTreeSet<u32> = [1, 2, 42].into_iter().collect();
        GlobalSecrets::generate(&channel_ids, &mut rng)
    }

    #[test]
    fn generate_always_includes_channel_zero() {
        let secrets = sample_secrets();
        assert!(secrets.channels.contains_key(&0));
        assert_eq!(secrets.channels.len(), 4);
    }

    #[test]
    fn json_round_trip_is_byte_exact() {
        let secrets = sample_secrets();
        let json = secrets.to_json().unwrap();
        let restored = GlobalSecrets::from_json(&json).unwrap();
        assert_eq!(secrets, restored);
    }

    #[test]
    fn json_uses_string_channel_ids_and_byte_arrays() {
        let secrets = sample_secrets();
        let json = secrets.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let channels = value["channels"].as_object().unwrap();
        assert!(channels.contains_key("0"));
        let root_key = &channels["0"]["root_key"];
        assert_eq!(root_key.as_array().unwrap().len(), 32);
    }

    #[test]
    fn from_json_rejects_missing_channel_zero() {
        let json = r#"{
            "subscribe_root_key": [0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],
            "subscribe_private_key": [0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],
            "channels": {}
        }"#;
        assert!(GlobalSecrets::from_json(json).is_err());
    }

    #[test]
    fn from_json_rejects_malformed_json() {
        assert!(GlobalSecrets::from_json("not json").is_err());
    }

    #[test]
    fn subscription_key_is_deterministic_given_root_and_id() {
        let secrets = sample_secrets();
        let key_a = secrets.subscription_key_for_decoder(7).unwrap();
        let key_b = secrets.subscription_key_for_decoder(7).unwrap();
        assert_eq!(key_a, key_b);
    }

    #[test]
    fn subscription_keys_differ_by_decoder_id() {
        let secrets = sample_secrets();
        let key_a = secrets.subscription_key_for_decoder(7).unwrap();
        let key_b = secrets.subscription_key_for_decoder(8).unwrap();
        assert_ne!(key_a, key_b);
    }

    #[test]
    fn subscription_keys_differ_by_subscribe_root() {
        let a = sample_secrets();
        let b = sample_secrets();
        let key_a = a.subscription_key_for_decoder(7).unwrap();
        let key_b = b.subscription_key_for_decoder(7).unwrap();
        assert_ne!(key_a, key_b);
    }
}
