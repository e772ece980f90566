//! The uniform authenticated payload envelope (component E): encrypt +
//! MAC + sign, so that an attacker holding a leaked symmetric key still
//! cannot forge a message without the Ed25519 signing key.
//!
//! ```text
//! [ Ed25519 signature : 64 B ]
//! [ XChaCha20 nonce    : 24 B ]
//! [ Poly1305 tag       : 16 B ]
//! [ ciphertext         : |data| ]
//! [ aad                : |aad| ]
//! ```

use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand_core::{CryptoRng, RngCore};

use crate::error::{Error, Result};

const SIGNATURE_LEN: usize = 64;
const NONCE_LEN: usize = 24;
const TAG_LEN: usize = 16;

/// Encrypts `data` under `sym_key`, binds `aad`, and signs the resulting
/// blob with `sign_key` in pure (non-prehashed) Ed25519 mode.
///
/// The signature covers the nonce, the Poly1305 tag, the ciphertext, and
/// the AAD — not just the plaintext — so an attacker who recovers
/// `sym_key` cannot swap the nonce or AAD to coerce a different
/// decryption while keeping the envelope's signature valid.
pub fn encrypt_payload(
    data: &[u8],
    aad: &[u8],
    sym_key: &[u8; 32],
    sign_key: &SigningKey,
    rng: &mut (impl RngCore + CryptoRng),
) -> Result<Vec<u8>> {
    let mut nonce_bytes = [0_u8; NONCE_LEN];
    rng.try_fill_bytes(&mut nonce_bytes)
        .map_err(Error::Rng)?;
    let nonce = XNonce::from_slice(&nonce_bytes);

    let cipher = XChaCha20Poly1305::new_from_slice(sym_key).map_err(|_| Error::Envelope)?;
    let ciphertext_and_tag = cipher
        .encrypt(nonce, Payload { msg: data, aad })
        // The only failure mode here is a plaintext exceeding the AEAD's
        // length limit, far beyond anything this system sends.
        .map_err(|_| Error::Envelope)?;
    let (ciphertext, tag) = ciphertext_and_tag.split_at(ciphertext_and_tag.len() - TAG_LEN);

    let mut payload = Vec::with_capacity(NONCE_LEN + TAG_LEN + ciphertext.len() + aad.len());
    payload.extend_from_slice(&nonce_bytes);
    payload.extend_from_slice(tag);
    payload.extend_from_slice(ciphertext);
    payload.extend_from_slice(aad);

    let signature = sign_key.sign(&payload);

    let mut envelope = Vec::with_capacity(SIGNATURE_LEN + payload.len());
    envelope.extend_from_slice(&signature.to_bytes());
    envelope.extend_from_slice(&payload);
    Ok(envelope)
}

/// Verifies the Ed25519 signature on `envelope` against `verify_key`, then
/// decrypts and authenticates the XChaCha20-Poly1305 ciphertext with
/// `sym_key`, returning the original plaintext.
///
/// `aad_len` must equal the length of the associated data the sender used;
/// the envelope carries no internal framing (see module docs), so the
/// caller is the only one who knows where the ciphertext ends and the AAD
/// begins.
pub fn decrypt_and_verify(
    envelope: &[u8],
    aad_len: usize,
    sym_key: &[u8; 32],
    verify_key: &VerifyingKey,
) -> Result<Vec<u8>> {
    if envelope.len() < SIGNATURE_LEN + NONCE_LEN + TAG_LEN + aad_len {
        return Err(Error::Envelope);
    }

    let signature_bytes: [u8; SIGNATURE_LEN] = envelope[..SIGNATURE_LEN]
        .try_into()
        .map_err(|_| Error::Envelope)?;
    let signature = Signature::from_bytes(&signature_bytes);
    let payload = &envelope[SIGNATURE_LEN..];

    verify_key
        .verify(payload, &signature)
        .map_err(|_| Error::Envelope)?;

    let nonce_bytes = &payload[..NONCE_LEN];
    let tag = &payload[NONCE_LEN..NONCE_LEN + TAG_LEN];
    let ct_end = payload.len() - aad_len;
    let ciphertext = &payload[NONCE_LEN + TAG_LEN..ct_end];
    let aad = &payload[ct_end..];

    let mut ciphertext_and_tag = Vec::with_capacity(ciphertext.len() + TAG_LEN);
    ciphertext_and_tag.extend_from_slice(ciphertext);
    ciphertext_and_tag.extend_from_slice(tag);

    let cipher = XChaCha20Poly1305::new_from_slice(sym_key).map_err(|_| Error::Envelope)?;
    let nonce = XNonce::from_slice(nonce_bytes);
    cipher
        .decrypt(
            nonce,
            Payload {
                msg: &ciphertext_and_tag,
                aad,
            },
        )
        .map_err(|_| Error::Envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    fn signing_key() -> SigningKey {
        SigningKey::from_bytes(&[7_u8; 32])
    }

    #[test]
    fn envelope_length_matches_layout() {
        let mut rng = OsRng;
        let sym_key = [1_u8; 32];
        let sign_key = signing_key();
        let envelope =
            encrypt_payload(b"hello", b"ch=1", &sym_key, &sign_key, &mut rng).unwrap();
        assert_eq!(envelope.len(), 64 + 24 + 16 + 5 + 4);
    }

    #[test]
    fn round_trip_recovers_plaintext() {
        let mut rng = OsRng;
        let sym_key = [2_u8; 32];
        let sign_key = signing_key();
        let verify_key = sign_key.verifying_key();

        let envelope =
            encrypt_payload(b"frame payload", b"channel=7", &sym_key, &sign_key, &mut rng)
                .unwrap();
        let plaintext =
            decrypt_and_verify(&envelope, b"channel=7".len(), &sym_key, &verify_key).unwrap();
        assert_eq!(plaintext, b"frame payload");
    }

    #[test]
    fn tampering_with_aad_breaks_signature() {
        let mut rng = OsRng;
        let sym_key = [3_u8; 32];
        let sign_key = signing_key();
        let verify_key = sign_key.verifying_key();

        let mut envelope =
            encrypt_payload(b"hello", b"ch=1", &sym_key, &sign_key, &mut rng).unwrap();
        *envelope.last_mut().unwrap() ^= 0xFF;

        assert!(decrypt_and_verify(&envelope, 4, &sym_key, &verify_key).is_err());
    }

    #[test]
    fn tampering_with_ciphertext_breaks_signature() {
        let mut rng = OsRng;
        let sym_key = [4_u8; 32];
        let sign_key = signing_key();
        let verify_key = sign_key.verifying_key();

        let mut envelope =
            encrypt_payload(b"hello", b"ch=1", &sym_key, &sign_key, &mut rng).unwrap();
        let flip_index = 64 + 24 + 16; // first byte of the ciphertext
        envelope[flip_index] ^= 0xFF;

        assert!(decrypt_and_verify(&envelope, 4, &sym_key, &verify_key).is_err());
    }

    #[test]
    fn wrong_symmetric_key_fails_after_signature_checks_out() {
        let mut rng = OsRng;
        let sign_key = signing_key();
        let verify_key = sign_key.verifying_key();

        let envelope =
            encrypt_payload(b"hello", b"ch=1", &[5_u8; 32], &sign_key, &mut rng).unwrap();
        assert!(decrypt_and_verify(&envelope, 4, &[6_u8; 32], &verify_key).is_err());
    }

    #[test]
    fn empty_data_and_aad_round_trip() {
        let mut rng = OsRng;
        let sym_key = [8_u8; 32];
        let sign_key = signing_key();
        let verify_key = sign_key.verifying_key();

        let envelope = encrypt_payload(b"", b"", &sym_key, &sign_key, &mut rng).unwrap();
        assert_eq!(envelope.len(), 64 + 24 + 16);
        let plaintext = decrypt_and_verify(&envelope, 0, &sym_key, &verify_key).unwrap();
        assert!(plaintext.is_empty());
    }
}
