//! Block and block header structures.
//!
//! # Header hash
//!
//! A block hash is `SHA-256(prev_hash ++ merkle_root ++ timestamp)` where
//! `prev_hash` is 32 bytes (or nothing for the genesis block), `merkle_root` is
//! 32 bytes, and `timestamp` is the 8-byte big-endian encoding of the `i64`
//! Unix time in seconds. This layout is part of the external hash contract.

use crate::clock::Clock;
use crate::hash::{hash_concat, Hash};
use crate::merkle::{MerkleError, MerkleProof, MerkleTree};
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while building blocks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    #[error("block has no transactions")]
    NoTransactions,

    #[error("merkle error: {0}")]
    Merkle(#[from] MerkleError),
}

pub type Result<T> = std::result::Result<T, BlockError>;

/// Hash a block header from its parts.
pub fn header_hash(prev_hash: Option<&Hash>, merkle_root: &Hash, timestamp: i64) -> Hash {
    let prev: &[u8] = match prev_hash {
        Some(h) => h.as_ref(),
        None => &[],
    };
    hash_concat(&[prev, merkle_root.as_ref(), &timestamp.to_be_bytes()])
}

/// The header of a block containing metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Hash of the previous block (None for genesis).
    pub prev_hash: Option<Hash>,
    /// Merkle root of transactions.
    pub merkle_root: Hash,
    /// Unix timestamp in seconds.
    pub timestamp: i64,
}

impl BlockHeader {
    /// Calculate the hash of this block header.
    pub fn hash(&self) -> Hash {
        header_hash(self.prev_hash.as_ref(), &self.merkle_root, self.timestamp)
    }
}

/// A block: header, transactions and the header hash.
///
/// Constructors always derive `hash` from the header. A block decoded from
/// outside the process carries whatever hash it was given, so check it with
/// [`Block::verify_hash`] before trusting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    header: BlockHeader,
    transactions: Vec<Transaction>,
    hash: Hash,
}

impl Block {
    /// Create a new block stamped with the clock's current time.
    pub fn new(
        transactions: Vec<Transaction>,
        prev_hash: Option<Hash>,
        clock: &dyn Clock,
    ) -> Result<Self> {
        Self::at(transactions, prev_hash, clock.now())
    }

    /// Create a new block with an explicit timestamp.
    pub fn at(
        transactions: Vec<Transaction>,
        prev_hash: Option<Hash>,
        timestamp: i64,
    ) -> Result<Self> {
        if transactions.is_empty() {
            return Err(BlockError::NoTransactions);
        }

        let merkle_root = MerkleTree::new(&transactions)?.root();
        let header = BlockHeader {
            prev_hash,
            merkle_root,
            timestamp,
        };
        let hash = header.hash();

        Ok(Self {
            header,
            transactions,
            hash,
        })
    }

    /// Create the genesis block holding a single coinbase transaction.
    pub fn genesis(coinbase: Transaction, clock: &dyn Clock) -> Result<Self> {
        Self::new(vec![coinbase], None, clock)
    }

    /// Create the genesis block with an explicit timestamp.
    pub fn genesis_at(coinbase: Transaction, timestamp: i64) -> Result<Self> {
        Self::at(vec![coinbase], None, timestamp)
    }

    /// Get the block hash.
    pub fn hash(&self) -> Hash {
        self.hash
    }

    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn prev_hash(&self) -> Option<&Hash> {
        self.header.prev_hash.as_ref()
    }

    pub fn merkle_root(&self) -> Hash {
        self.header.merkle_root
    }

    pub fn timestamp(&self) -> i64 {
        self.header.timestamp
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Check if this is the genesis block.
    pub fn is_genesis(&self) -> bool {
        self.header.prev_hash.is_none()
    }

    /// Get the number of transactions in this block.
    pub fn tx_count(&self) -> usize {
        self.transactions.len()
    }

    /// Rebuild the merkle tree over this block's transactions.
    pub fn merkle_tree(&self) -> Result<MerkleTree> {
        Ok(MerkleTree::new(&self.transactions)?)
    }

    /// Inclusion proof for one of this block's transactions, checked against
    /// [`Block::merkle_root`].
    pub fn prove_transaction(&self, tx: &Transaction) -> Result<MerkleProof> {
        Ok(self.merkle_tree()?.make_proof(&tx.hash())?)
    }

    /// Verify the merkle root matches the transactions.
    pub fn verify_merkle_root(&self) -> bool {
        self.merkle_tree()
            .map(|tree| tree.root() == self.header.merkle_root)
            .unwrap_or(false)
    }

    /// Verify the stored hash matches the header and the transactions.
    pub fn verify_hash(&self) -> bool {
        self.header.hash() == self.hash && self.verify_merkle_root()
    }
}
