// Copyright 2024 Satellite TV Provider Cryptography Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Cryptographic core of a broadcast-subscription system.
//!
//! # How it works
//!
//! A provider maintains a [`GlobalSecrets`] instance: one [`ChannelKey`]
//! per channel, plus a global subscription root used to derive per-decoder
//! keys. Each channel (other than channel 0) owns a 64-level binary
//! key-derivation tree rooted at `ChannelKey::root_key`; the key for any
//! single 64-bit timestamp is the unique depth-64 node reached by walking
//! the tree according to the bits of that timestamp ([`node::derive_node`]).
//! Issuing a subscription for an interval `[t_lo, t_hi]` instead computes
//! the minimal set of subtree roots whose leaves exactly cover that
//! interval ([`node::generate_subscription_nodes`]) — logarithmic in the
//! interval's size rather than linear in the number of timestamps it
//! contains.
//!
//! Anything sensitive this system sends — a subscription, a live frame —
//! is wrapped in a uniform authenticated envelope
//! ([`envelope::encrypt_payload`] / [`envelope::decrypt_and_verify`]):
//! XChaCha20-Poly1305 for confidentiality and integrity, Ed25519 (in pure,
//! non-prehashed mode) over the whole envelope so a leaked symmetric key
//! alone is not enough to forge a message.
//!
//! Per-decoder subscription keys are derived from the global subscription
//! root via Argon2id ([`GlobalSecrets::subscription_key_for_decoder`]), a
//! memory-hard KDF that makes brute-forcing the decoder id space
//! expensive.
//!
//! # Implementation details
//!
//! The key-derivation tree uses a single primitive, [`prg::prg_block`]: 64
//! bytes of ChaCha20 keystream (the original, 64-bit-nonce variant of the
//! cipher) computed from a node's 32-byte key over an all-zero nonce and
//! an all-zero 64-byte plaintext. The first 32 bytes of that block seed
//! the left child, the last 32 bytes seed the right child. The nonce is
//! always zero; that is safe only because every node key feeds exactly
//! one `prg_block` call before being discarded, so the (key, nonce) pair
//! is never reused — do not change this without re-establishing that
//! guarantee.
//!
//! [`node::KeyNode`] is a plain value (`{ key, lo, hi }`), never a
//! heap-allocated tree node with child pointers: the covering algorithm
//! only ever needs one root-to-leaf path's worth of state at a time.
//!
//! # Design motivations
//!
//! - Interval covering is logarithmic, not linear, in the size of a
//!   subscription window: a decoder subscribed for a year receives on the
//!   order of 128 tree nodes, not one key per second.
//! - The envelope signs the *entire* ciphertext-bearing blob, including
//!   the nonce and AAD, specifically so a symmetric-key leak does not also
//!   grant forgery — only a combined leak of both keys does.
//! - Subscription-key derivation is deliberately memory-hard (Argon2id)
//!   rather than a fast hash, since the decoder id space is small enough
//!   (`u32`) that a fast KDF would make exhaustive enumeration practical.
//!
//! # Non-goals
//!
//! This crate implements the cryptographic core only. CLI front-ends,
//! serial I/O to physical decoders, repository tooling for packaging
//! subscription blobs, network transport, decoder-side firmware, and
//! revocation protocols are out of scope.

#![deny(missing_docs, missing_debug_implementations)]

pub mod envelope;
pub mod error;
pub mod node;
pub mod prg;
pub mod secret_bytes;
pub mod secrets;
pub mod validate;

pub use envelope::{decrypt_and_verify, encrypt_payload};
pub use error::{Error, Result};
pub use node::{derive_node, generate_subscription_nodes, KeyNode};
pub use prg::prg_block;
pub use secret_bytes::SecretBytes32;
pub use secrets::{ChannelKey, GlobalSecrets};
