//! Thread-safe handle to a [`Blockchain`].
//!
//! Appends hold the write lock for the whole read-tip, build, push and index
//! update sequence. Lookups share the read lock and return owned blocks.

use crate::blockchain::{Blockchain, BlockchainStats, Result};
use merklechain_core::{Block, Hash, Transaction};
use parking_lot::RwLock;
use std::sync::Arc;

/// Cloneable, lock-guarded blockchain.
#[derive(Debug, Clone)]
pub struct SharedBlockchain {
    inner: Arc<RwLock<Blockchain>>,
}

impl SharedBlockchain {
    pub fn new(blockchain: Blockchain) -> Self {
        Self {
            inner: Arc::new(RwLock::new(blockchain)),
        }
    }

    /// Append a block on top of the current tip.
    pub fn add_block(&self, transactions: Vec<Transaction>) -> Result<Block> {
        let mut chain = self.inner.write();
        chain.add_block(transactions).cloned()
    }

    pub fn current_block(&self) -> Result<Block> {
        self.inner.read().current_block().cloned()
    }

    pub fn genesis_block(&self) -> Result<Block> {
        self.inner.read().genesis_block().cloned()
    }

    pub fn get_block(&self, hash: &Hash) -> Result<Block> {
        self.inner.read().get_block(hash).cloned()
    }

    pub fn height(&self) -> u64 {
        self.inner.read().height()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn verify_chain(&self) -> Result<()> {
        self.inner.read().verify_chain()
    }

    pub fn stats(&self) -> Result<BlockchainStats> {
        self.inner.read().stats()
    }

    /// Run `f` with shared access to the underlying chain.
    pub fn with_read<R>(&self, f: impl FnOnce(&Blockchain) -> R) -> R {
        f(&self.inner.read())
    }
}

impl From<Blockchain> for SharedBlockchain {
    fn from(blockchain: Blockchain) -> Self {
        Self::new(blockchain)
    }
}
