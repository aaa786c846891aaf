//! Property-based tests for merkle tree invariants
//!
//! - Determinism: same payloads → same root
//! - Soundness: every leaf proves against the root
//! - Padding: an odd level behaves like an explicit trailing duplicate

use merklechain_core::{hash, merkle_root, verify_proof, Hash, MerkleError, MerkleTree};
use proptest::prelude::*;

/// Strategy for generating non-empty payload lists
fn payloads_strategy() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 1..40)
}

proptest! {
    #[test]
    fn prop_root_is_deterministic(items in payloads_strategy()) {
        let a = MerkleTree::new(&items).unwrap();
        let b = MerkleTree::new(&items).unwrap();
        prop_assert_eq!(a.root(), b.root());
    }

    #[test]
    fn prop_single_item_root_is_leaf_hash(item in prop::collection::vec(any::<u8>(), 0..128)) {
        prop_assert_eq!(merkle_root([&item]).unwrap(), hash(&item));
    }

    #[test]
    fn prop_every_leaf_verifies(items in payloads_strategy()) {
        let tree = MerkleTree::new(&items).unwrap();

        for item in &items {
            let leaf = hash(item);
            let proof = tree.make_proof(&leaf).unwrap();
            prop_assert_eq!(proof.len(), tree.height());
            prop_assert!(verify_proof(&tree.root(), &leaf, &proof));
        }
    }

    #[test]
    fn prop_absent_leaf_not_found(items in payloads_strategy(), extra in prop::collection::vec(any::<u8>(), 64..65)) {
        // Payloads are shorter than 64 bytes, so `extra` is never one of them.
        let tree = MerkleTree::new(&items).unwrap();
        let target = hash(&extra);
        prop_assert_eq!(tree.make_proof(&target), Err(MerkleError::NodeNotFound(target)));
    }

    #[test]
    fn prop_odd_padding_matches_duplicate(items in payloads_strategy()) {
        prop_assume!(items.len() % 2 == 1 && items.len() > 1);

        let mut padded = items.clone();
        padded.push(items[items.len() - 1].clone());

        prop_assert_eq!(merkle_root(&items).unwrap(), merkle_root(&padded).unwrap());
    }

    #[test]
    fn prop_proof_rejects_other_root(items in payloads_strategy(), index in any::<prop::sample::Index>()) {
        let tree = MerkleTree::new(&items).unwrap();
        let i = index.index(items.len());
        let leaf = hash(&items[i]);
        let proof = tree.proof(i).unwrap();

        let other = Hash::from_bytes([0xAB; 32]);
        prop_assume!(other != tree.root());
        prop_assert!(!verify_proof(&other, &leaf, &proof));
    }
}
