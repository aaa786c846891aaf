//! Merkle tree over block payloads.
//!
//! Leaves are `H(item)`, internal nodes are `H(left ++ right)`. A level with an
//! odd number of nodes is padded by repeating its last node, so every internal
//! node has exactly two children.

use crate::hash::{hash, hash_concat, Hash};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by the merkle tree engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MerkleError {
    #[error("no merkle tree nodes")]
    Empty,

    #[error("node {0} not found")]
    NodeNotFound(Hash),
}

pub type Result<T> = std::result::Result<T, MerkleError>;

/// Hash of a leaf holding `data`.
pub fn hash_leaf(data: &[u8]) -> Hash {
    hash(data)
}

/// Hash of an internal node with the given children.
pub fn hash_node(left: &Hash, right: &Hash) -> Hash {
    hash_concat(&[left.as_ref(), right.as_ref()])
}

/// Compute the merkle root of a list of payloads.
pub fn merkle_root<I, T>(items: I) -> Result<Hash>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    MerkleTree::new(items).map(|tree| tree.root())
}

/// Position of a proof sibling relative to the node being proven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Sibling is the left operand: `H(sibling ++ current)`.
    Left,
    /// Sibling is the right operand: `H(current ++ sibling)`.
    Right,
}

/// A node in the tree arena.
///
/// Children are indices into the level directly below the node's own level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MerkleNode {
    pub hash: Hash,
    pub left: Option<usize>,
    pub right: Option<usize>,
}

impl MerkleNode {
    fn leaf(hash: Hash) -> Self {
        Self {
            hash,
            left: None,
            right: None,
        }
    }

    fn parent(level: &[MerkleNode], left: usize, right: usize) -> Self {
        Self {
            hash: hash_node(&level[left].hash, &level[right].hash),
            left: Some(left),
            right: Some(right),
        }
    }

    /// Check if node is a leaf.
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// An inclusion proof for a single leaf.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Sibling hashes from leaf to root.
    pub siblings: Vec<Hash>,
    /// Position of each sibling.
    pub directions: Vec<Direction>,
}

impl MerkleProof {
    pub fn new(siblings: Vec<Hash>, directions: Vec<Direction>) -> Self {
        Self {
            siblings,
            directions,
        }
    }

    /// Number of levels covered by the proof.
    pub fn len(&self) -> usize {
        self.siblings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.siblings.is_empty()
    }

    /// Iterate over `(sibling, direction)` pairs, leaf first.
    pub fn steps(&self) -> impl Iterator<Item = (&Hash, Direction)> {
        self.siblings.iter().zip(self.directions.iter().copied())
    }
}

/// A merkle tree for efficient proofs.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    /// All nodes in the tree, level by level (leaves first). Every level
    /// below the root has even length once padded.
    levels: Vec<Vec<MerkleNode>>,
    /// Number of leaves before padding.
    leaf_count: usize,
    root: Hash,
}

impl MerkleTree {
    /// Build a merkle tree over a list of payloads.
    pub fn new<I, T>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        Self::from_leaves(items.into_iter().map(|item| hash_leaf(item.as_ref())))
    }

    /// Build a merkle tree from already hashed leaves.
    pub fn from_leaves<I>(leaves: I) -> Result<Self>
    where
        I: IntoIterator<Item = Hash>,
    {
        let mut current: Vec<MerkleNode> = leaves.into_iter().map(MerkleNode::leaf).collect();
        if current.is_empty() {
            return Err(MerkleError::Empty);
        }

        let leaf_count = current.len();
        let mut levels = Vec::new();

        while current.len() > 1 {
            if current.len() % 2 == 1 {
                let last = current[current.len() - 1];
                current.push(last);
            }

            let next: Vec<MerkleNode> = (0..current.len())
                .step_by(2)
                .map(|i| MerkleNode::parent(&current, i, i + 1))
                .collect();

            levels.push(std::mem::replace(&mut current, next));
        }

        let root = current[0].hash;
        levels.push(current);

        Ok(Self {
            levels,
            leaf_count,
            root,
        })
    }

    /// Get the root of the merkle tree.
    pub fn root(&self) -> Hash {
        self.root
    }

    /// Get the number of leaves in the tree, excluding padding.
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Number of levels above the leaves (0 for a single leaf).
    pub fn height(&self) -> usize {
        self.levels.len() - 1
    }

    /// Leaf hashes in input order, excluding padding.
    pub fn leaves(&self) -> impl Iterator<Item = Hash> + '_ {
        self.levels[0][..self.leaf_count].iter().map(|node| node.hash)
    }

    /// Nodes of one level, padding included. Level 0 holds the leaves.
    pub fn level(&self, depth: usize) -> Option<&[MerkleNode]> {
        self.levels.get(depth).map(Vec::as_slice)
    }

    /// Position of the first leaf whose hash equals `target`.
    pub fn position(&self, target: &Hash) -> Option<usize> {
        self.leaves().position(|leaf| leaf == *target)
    }

    /// Generate a proof for the leaf at the given index.
    pub fn proof(&self, index: usize) -> Option<MerkleProof> {
        if index >= self.leaf_count {
            return None;
        }

        let height = self.height();
        let mut siblings = Vec::with_capacity(height);
        let mut directions = Vec::with_capacity(height);
        let mut idx = index;

        for level in &self.levels[..height] {
            let (sibling_idx, direction) = if idx % 2 == 0 {
                (idx + 1, Direction::Right)
            } else {
                (idx - 1, Direction::Left)
            };

            siblings.push(level[sibling_idx].hash);
            directions.push(direction);
            idx /= 2;
        }

        Some(MerkleProof {
            siblings,
            directions,
        })
    }

    /// Generate a proof for the leaf with the given hash.
    pub fn make_proof(&self, target: &Hash) -> Result<MerkleProof> {
        self.position(target)
            .and_then(|index| self.proof(index))
            .ok_or(MerkleError::NodeNotFound(*target))
    }

    /// Verify a merkle proof against this tree's root.
    pub fn verify_proof(&self, leaf: &Hash, proof: &MerkleProof) -> bool {
        verify_proof(&self.root, leaf, proof)
    }
}

/// Verify that `proof` links `leaf` to `root`.
pub fn verify_proof(root: &Hash, leaf: &Hash, proof: &MerkleProof) -> bool {
    if proof.siblings.len() != proof.directions.len() {
        return false;
    }

    let computed = proof
        .steps()
        .fold(*leaf, |current, (sibling, direction)| match direction {
            Direction::Right => hash_node(&current, sibling),
            Direction::Left => hash_node(sibling, &current),
        });

    computed == *root
}
