//! Pending-request commitment set.
//!
//! The coordinator's persisted state carries only a single field
//! element: the root of a sparse Poseidon Merkle tree keyed by request
//! id. A leaf holds Poseidon(requester.x, requester.y) while the
//! request is pending and zero otherwise, so the set scales past the
//! fixed width of a state slot and membership is provable to anyone
//! holding the root.
//!
//! The full node map is an off-ledger index: it mirrors the committed
//! root and serves the sibling paths callers attach to fulfillment
//! transactions. Verification only ever folds a [`PendingWitness`]
//! against the root.

use std::collections::HashMap;

use halo2curves_axiom::bn256::Fr;
use halo2curves_axiom::ff::Field;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use zkfeed_common::poseidon_hash;

use crate::types::{Address, RequestId};

/// Tree depth: one level per usable bit of a bn254 scalar key, so
/// distinct request ids can never collide on a path.
pub const TREE_DEPTH: usize = 254;

/// Root-to-leaf hashes of fully empty subtrees, by level.
static EMPTY_SUBTREES: Lazy<Vec<Fr>> = Lazy::new(|| {
    let mut table = Vec::with_capacity(TREE_DEPTH + 1);
    table.push(Fr::ZERO);
    for level in 1..=TREE_DEPTH {
        let below = table[level - 1];
        table.push(poseidon_hash(&[below, below]));
    }
    table
});

/// Leaf value binding a pending request to its requester.
pub fn requester_leaf(requester: &Address) -> Fr {
    poseidon_hash(&[requester.x, requester.y])
}

/// Merkle opening for one request id: the current leaf value and the
/// sibling hash at every level, leaf upward.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PendingWitness {
    pub request_id: RequestId,
    #[serde(with = "zkfeed_circuit::serde_fr")]
    pub leaf: Fr,
    pub siblings: Vec<Fr>,
}

impl PendingWitness {
    /// Fold the path with an arbitrary leaf value. Used both to check
    /// membership (`leaf`) and to compute the post-removal root
    /// (`Fr::ZERO`).
    pub fn compute_root(&self, leaf: Fr) -> Fr {
        let bits = id_bits(&self.request_id);
        let mut acc = leaf;
        for (level, sibling) in self.siblings.iter().enumerate() {
            acc = if bits[level] {
                poseidon_hash(&[*sibling, acc])
            } else {
                poseidon_hash(&[acc, *sibling])
            };
        }
        acc
    }

    /// True iff this opening is consistent with `root`.
    pub fn verify(&self, root: &Fr) -> bool {
        self.siblings.len() == TREE_DEPTH && self.compute_root(self.leaf) == *root
    }
}

/// Sparse Merkle tree over the pending-request set.
#[derive(Clone, Debug)]
pub struct PendingRequestTree {
    nodes: HashMap<(u16, [u8; 32]), Fr>,
    pending: usize,
}

impl Default for PendingRequestTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingRequestTree {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            pending: 0,
        }
    }

    pub fn root(&self) -> Fr {
        self.node(TREE_DEPTH, &[])
    }

    /// Number of live pending entries.
    pub fn pending_count(&self) -> usize {
        self.pending
    }

    pub fn leaf(&self, id: &RequestId) -> Fr {
        let bits = id_bits(id);
        self.node(0, &bits)
    }

    pub fn contains(&self, id: &RequestId) -> bool {
        self.leaf(id) != Fr::ZERO
    }

    pub fn insert(&mut self, id: &RequestId, leaf: Fr) {
        if !self.contains(id) {
            self.pending += 1;
        }
        self.set_leaf(id, leaf);
    }

    pub fn remove(&mut self, id: &RequestId) {
        if self.contains(id) {
            self.pending -= 1;
        }
        self.set_leaf(id, Fr::ZERO);
    }

    /// Merkle opening for `id` against the current root.
    pub fn witness(&self, id: &RequestId) -> PendingWitness {
        let bits = id_bits(id);
        let mut siblings = Vec::with_capacity(TREE_DEPTH);
        for level in 0..TREE_DEPTH {
            let mut suffix = bits[level..].to_vec();
            suffix[0] = !suffix[0];
            siblings.push(self.node(level, &suffix));
        }
        PendingWitness {
            request_id: *id,
            leaf: self.leaf(id),
            siblings,
        }
    }

    fn set_leaf(&mut self, id: &RequestId, value: Fr) {
        let bits = id_bits(id);
        let mut current = value;
        self.store(0, &bits, current);
        for level in 0..TREE_DEPTH {
            let mut sibling_suffix = bits[level..].to_vec();
            sibling_suffix[0] = !sibling_suffix[0];
            let sibling = self.node(level, &sibling_suffix);
            current = if bits[level] {
                poseidon_hash(&[sibling, current])
            } else {
                poseidon_hash(&[current, sibling])
            };
            self.store(level + 1, &bits[level + 1..], current);
        }
    }

    fn node(&self, level: usize, suffix: &[bool]) -> Fr {
        self.nodes
            .get(&(level as u16, pack_bits(suffix)))
            .copied()
            .unwrap_or(EMPTY_SUBTREES[level])
    }

    fn store(&mut self, level: usize, suffix: &[bool], value: Fr) {
        self.nodes.insert((level as u16, pack_bits(suffix)), value);
    }
}

/// Little-endian bit path of a request id. bn254 scalars fit in 254
/// bits, so the top two repr bits are always clear.
fn id_bits(id: &RequestId) -> Vec<bool> {
    let bytes = id.to_bytes();
    (0..TREE_DEPTH)
        .map(|i| (bytes[i / 8] >> (i % 8)) & 1 == 1)
        .collect()
}

fn pack_bits(bits: &[bool]) -> [u8; 32] {
    let mut out = [0u8; 32];
    for (i, bit) in bits.iter().enumerate() {
        if *bit {
            out[i / 8] |= 1 << (i % 8);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_id(n: u64) -> RequestId {
        RequestId::derive(n, &Address::from_seed(n))
    }

    #[test]
    fn empty_tree_root_is_stable() {
        assert_eq!(PendingRequestTree::new().root(), PendingRequestTree::new().root());
    }

    #[test]
    fn insert_changes_root_remove_restores_it() {
        let mut tree = PendingRequestTree::new();
        let empty_root = tree.root();
        let id = sample_id(1);

        tree.insert(&id, requester_leaf(&Address::from_seed(1)));
        assert_ne!(tree.root(), empty_root);
        assert!(tree.contains(&id));
        assert_eq!(tree.pending_count(), 1);

        tree.remove(&id);
        assert_eq!(tree.root(), empty_root);
        assert!(!tree.contains(&id));
        assert_eq!(tree.pending_count(), 0);
    }

    #[test]
    fn witness_opens_the_root() {
        let mut tree = PendingRequestTree::new();
        let id_a = sample_id(1);
        let id_b = sample_id(2);
        tree.insert(&id_a, requester_leaf(&Address::from_seed(1)));
        tree.insert(&id_b, requester_leaf(&Address::from_seed(2)));

        let witness = tree.witness(&id_a);
        assert!(witness.verify(&tree.root()));
        assert_eq!(witness.leaf, requester_leaf(&Address::from_seed(1)));
    }

    #[test]
    fn witness_computes_post_removal_root() {
        let mut tree = PendingRequestTree::new();
        let id_a = sample_id(1);
        let id_b = sample_id(2);
        tree.insert(&id_a, requester_leaf(&Address::from_seed(1)));
        tree.insert(&id_b, requester_leaf(&Address::from_seed(2)));

        let witness = tree.witness(&id_a);
        let predicted = witness.compute_root(Fr::ZERO);
        tree.remove(&id_a);
        assert_eq!(tree.root(), predicted);
    }

    #[test]
    fn absent_id_opens_to_zero_leaf() {
        let mut tree = PendingRequestTree::new();
        tree.insert(&sample_id(1), requester_leaf(&Address::from_seed(1)));

        let witness = tree.witness(&sample_id(99));
        assert!(witness.verify(&tree.root()));
        assert_eq!(witness.leaf, Fr::ZERO);
    }

    #[test]
    fn stale_witness_fails_after_mutation() {
        let mut tree = PendingRequestTree::new();
        let id = sample_id(1);
        tree.insert(&id, requester_leaf(&Address::from_seed(1)));
        let witness = tree.witness(&id);

        tree.insert(&sample_id(2), requester_leaf(&Address::from_seed(2)));
        assert!(!witness.verify(&tree.root()));
    }

    #[test]
    fn truncated_witness_rejected() {
        let mut tree = PendingRequestTree::new();
        let id = sample_id(1);
        tree.insert(&id, requester_leaf(&Address::from_seed(1)));
        let mut witness = tree.witness(&id);
        witness.siblings.pop();
        assert!(!witness.verify(&tree.root()));
    }
}
