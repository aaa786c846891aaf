//! Core primitives for merklechain.
//!
//! This crate provides the integrity core of the ledger:
//! - SHA-256 hashing
//! - Merkle trees with inclusion proofs
//! - Opaque transaction payloads
//! - Blocks and the block header hash
//! - Clock abstraction for block timestamps

pub mod block;
pub mod clock;
pub mod hash;
pub mod merkle;
pub mod transaction;

// Re-export commonly used types at the crate root
pub use block::{header_hash, Block, BlockError, BlockHeader};
pub use clock::{Clock, FixedClock, SystemClock};
pub use hash::{hash, hash_concat, Hash};
pub use merkle::{
    hash_leaf, hash_node, merkle_root, verify_proof, Direction, MerkleError, MerkleNode,
    MerkleProof, MerkleTree,
};
pub use transaction::Transaction;
