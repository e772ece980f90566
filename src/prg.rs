//! One length-doubling pseudo-random generator step.
//!
//! `prg_block` is the sole primitive the key-derivation tree (see
//! [`crate::node`]) is built from: it turns a 32-byte node key into 64
//! bytes of child key material, split in half between the left and right
//! children.

use chacha20::cipher::generic_array::GenericArray;
use chacha20::cipher::{KeyIvInit, StreamCipher};
use chacha20::ChaCha20Legacy;

/// Computes one length-doubling ChaCha20 block: the keystream produced by
/// `key` over an all-zero 64-bit nonce, applied to 64 zero bytes.
///
/// The nonce is always zero; this is safe only because every node key is
/// used to derive exactly one block before being discarded, so the
/// (key, nonce) pair is never reused. Do not change the nonce scheme
/// without re-deriving this guarantee.
///
/// The first 32 bytes of the output seed the left child, the last 32 bytes
/// seed the right child.
pub fn prg_block(key: &[u8; 32]) -> [u8; 64] {
    let mut block = [0_u8; 64];
    let key = GenericArray::from_slice(key);
    let nonce = GenericArray::from_slice(&[0_u8; 8]);
    let mut cipher = ChaCha20Legacy::new(key, nonce);
    cipher.apply_keystream(&mut block);
    block
}
