//! The binary key-derivation tree: nodes, child derivation, interval
//! covering, and leaf derivation (components B, C, D of the design).
//!
//! A [`KeyNode`] is a plain value — key plus the inclusive `[lo, hi]`
//! timestamp range its subtree covers — never a heap-allocated tree.
//! The covering algorithm only ever walks one root-to-leaf path at a
//! time, so there is nothing to gain from materializing a full tree or
//! an arena of nodes.

use crate::prg::prg_block;
use crate::secret_bytes::SecretBytes32;
use crate::validate::{verify_range, verify_timestamp};
use crate::Result;

/// An interior or leaf node of the 64-level key-derivation tree.
///
/// `range()` is inclusive on both ends. The root covers `[0, 2^64 - 1]`;
/// a leaf has `lo == hi`, and that value is the timestamp whose frame key
/// is `key()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyNode {
    key: SecretBytes32,
    lo: u64,
    hi: u64,
}

impl KeyNode {
    /// Builds the root node of the tree seeded by `root_key`.
    pub fn root(root_key: &[u8; 32]) -> Self {
        KeyNode {
            key: SecretBytes32::new(*root_key),
            lo: 0,
            hi: u64::MAX,
        }
    }

    /// The key material for this node (the frame key, if this is a leaf).
    pub fn key(&self) -> &SecretBytes32 {
        &self.key
    }

    /// The inclusive timestamp range this node's subtree covers.
    pub fn range(&self) -> (u64, u64) {
        (self.lo, self.hi)
    }

    fn mid(&self) -> u64 {
        // Avoids overflowing `lo + hi`, which would happen for the right
        // half of the tree once `hi` approaches `u64::MAX`.
        self.lo + (self.hi - self.lo) / 2
    }

    /// Derives the left child: key material is the first 32 bytes of
    /// `prg_block(key)`, range is `[lo, mid]`.
    pub fn left_child(&self) -> Self {
        let block = prg_block(self.key.as_bytes());
        let mut left_key = [0_u8; 32];
        left_key.copy_from_slice(&block[..32]);
        KeyNode {
            key: SecretBytes32::new(left_key),
            lo: self.lo,
            hi: self.mid(),
        }
    }

    /// Derives the right child: key material is the last 32 bytes of
    /// `prg_block(key)`, range is `[mid + 1, hi]`.
    pub fn right_child(&self) -> Self {
        let block = prg_block(self.key.as_bytes());
        let mut right_key = [0_u8; 32];
        right_key.copy_from_slice(&block[32..]);
        KeyNode {
            key: SecretBytes32::new(right_key),
            lo: self.mid() + 1,
            hi: self.hi,
        }
    }

    fn is_leaf(&self) -> bool {
        self.lo == self.hi
    }
}

/// Derives the unique depth-64 node for timestamp `t`: the per-timestamp
/// symmetric key.
///
/// Walks from the root along the 64 bits of `t`, most-significant bit
/// first, taking the left child on a 0 bit and the right child on a 1
/// bit. Exactly 64 PRG evaluations.
pub fn derive_node(root_key: &[u8; 32], t: u64) -> Result<KeyNode> {
    verify_timestamp(t)?;

    let mut node = KeyNode::root(root_key);
    for i in 0..64_u32 {
        let bit = (t >> (63 - i)) & 1;
        node = if bit == 0 {
            node.left_child()
        } else {
            node.right_child()
        };
    }
    Ok(node)
}

/// Computes the minimum set of subtree roots whose leaf ranges exactly
/// cover `[t_lo, t_hi]`, in ascending timestamp order.
///
/// The result has at most `2 * ceil(log2(t_hi - t_lo + 1)) + 2` nodes and
/// never more than 128, regardless of the interval.
pub fn generate_subscription_nodes(
    root_key: &[u8; 32],
    t_lo: u64,
    t_hi: u64,
) -> Result<Vec<KeyNode>> {
    verify_timestamp(t_lo)?;
    verify_timestamp(t_hi)?;
    verify_range(t_lo, t_hi)?;

    let root = KeyNode::root(root_key);
    if t_lo == root.lo && t_hi == root.hi {
        // The whole tree is requested: the root itself is the minimal
        // covering, no need to split.
        return Ok(vec![root]);
    }
    Ok(cover(root, t_lo, t_hi))
}

/// Range-split recursion: splits `node`'s range at its midpoint and, for
/// each half that intersects `[t_lo, t_hi]`, either emits the half whole
/// (if fully contained) or recurses into it.
fn cover(node: KeyNode, t_lo: u64, t_hi: u64) -> Vec<KeyNode> {
    if node.is_leaf() {
        return vec![node];
    }

    let mut result = Vec::new();
    for child in [node.left_child(), node.right_child()] {
        if child.hi < t_lo || child.lo > t_hi {
            continue; // disjoint from the target interval
        }
        if t_lo <= child.lo && child.hi <= t_hi {
            result.push(child); // fully inside target: emit whole
        } else {
            result.extend(cover(child, t_lo, t_hi));
        }
    }
    result
}
