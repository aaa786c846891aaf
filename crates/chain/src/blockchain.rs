//! Append-only, hash-linked ledger.

use merklechain_core::{Block, BlockError, Clock, Hash, SystemClock, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during blockchain operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockchainError {
    #[error("block error: {0}")]
    Block(#[from] BlockError),

    #[error("block not found: {0}")]
    BlockNotFound(Hash),

    #[error("invalid chain state")]
    InvalidChainState,

    #[error("block {height} does not link to its predecessor")]
    BrokenLink { height: u64 },

    #[error("block {height} hash does not match its header")]
    InvalidBlockHash { height: u64 },

    #[error("block {height} merkle root does not match its transactions")]
    InvalidMerkleRoot { height: u64 },
}

pub type Result<T> = std::result::Result<T, BlockchainError>;

/// Blockchain configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// Payload of the genesis block's coinbase transaction.
    pub genesis_data: Vec<u8>,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            genesis_data: b"Genesis Block".to_vec(),
        }
    }
}

/// Ordered sequence of blocks with a hash index.
pub struct Blockchain {
    /// Blocks in append order; index is the block height.
    blocks: Vec<Block>,
    /// Block hash → height.
    index: HashMap<Hash, usize>,
    /// Timestamp source for new blocks.
    clock: Box<dyn Clock>,
    config: BlockchainConfig,
}

impl Blockchain {
    /// Create a blockchain with the default configuration and wall-clock time.
    pub fn new() -> Result<Self> {
        Self::with_config(BlockchainConfig::default(), SystemClock)
    }

    /// Create a blockchain seeded with a genesis block built from `config`.
    pub fn with_config(config: BlockchainConfig, clock: impl Clock + 'static) -> Result<Self> {
        let clock: Box<dyn Clock> = Box::new(clock);
        let coinbase = Transaction::new(config.genesis_data.clone());
        let genesis = Block::genesis(coinbase, clock.as_ref())?;

        info!(hash = %genesis.hash(), timestamp = genesis.timestamp(), "created genesis block");

        let mut index = HashMap::new();
        index.insert(genesis.hash(), 0);

        Ok(Self {
            blocks: vec![genesis],
            index,
            clock,
            config,
        })
    }

    /// Append a block holding `transactions` on top of the current tip.
    pub fn add_block(&mut self, transactions: Vec<Transaction>) -> Result<&Block> {
        let prev_hash = self.current_block()?.hash();
        let block = Block::new(transactions, Some(prev_hash), self.clock.as_ref())?;

        let height = self.blocks.len();
        self.index.insert(block.hash(), height);
        self.blocks.push(block);

        let block = &self.blocks[height];
        debug!(height, hash = %block.hash(), txs = block.tx_count(), "appended block");
        Ok(block)
    }

    /// Get the latest block.
    pub fn current_block(&self) -> Result<&Block> {
        self.blocks.last().ok_or(BlockchainError::InvalidChainState)
    }

    /// Get the first block.
    pub fn genesis_block(&self) -> Result<&Block> {
        self.blocks.first().ok_or(BlockchainError::InvalidChainState)
    }

    /// Get a block by hash.
    pub fn get_block(&self, hash: &Hash) -> Result<&Block> {
        self.index
            .get(hash)
            .and_then(|&height| self.blocks.get(height))
            .ok_or(BlockchainError::BlockNotFound(*hash))
    }

    /// Get a block by height.
    pub fn get_block_by_height(&self, height: u64) -> Option<&Block> {
        usize::try_from(height)
            .ok()
            .and_then(|h| self.blocks.get(h))
    }

    /// Check if a block exists by hash.
    pub fn contains(&self, hash: &Hash) -> bool {
        self.index.contains_key(hash)
    }

    /// Get the current chain height (0 when only genesis is present).
    pub fn height(&self) -> u64 {
        self.blocks.len().saturating_sub(1) as u64
    }

    /// Number of blocks, genesis included.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterate over blocks from genesis to tip.
    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    pub fn config(&self) -> &BlockchainConfig {
        &self.config
    }

    /// Re-check every block's hash, merkle root and link to its predecessor.
    pub fn verify_chain(&self) -> Result<()> {
        let mut prev: Option<Hash> = None;

        for (height, block) in self.blocks.iter().enumerate() {
            let height = height as u64;

            if block.prev_hash().copied() != prev {
                return Err(BlockchainError::BrokenLink { height });
            }
            if !block.verify_merkle_root() {
                return Err(BlockchainError::InvalidMerkleRoot { height });
            }
            if block.header().hash() != block.hash() {
                return Err(BlockchainError::InvalidBlockHash { height });
            }

            prev = Some(block.hash());
        }

        Ok(())
    }

    /// Get blockchain statistics.
    pub fn stats(&self) -> Result<BlockchainStats> {
        let genesis = self.genesis_block()?;
        let latest = self.current_block()?;

        Ok(BlockchainStats {
            height: self.height(),
            genesis_hash: genesis.hash(),
            latest_block_hash: latest.hash(),
            latest_timestamp: latest.timestamp(),
            total_transactions: self.blocks.iter().map(Block::tx_count).sum(),
        })
    }
}

impl fmt::Debug for Blockchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blockchain")
            .field("blocks", &self.blocks.len())
            .field("tip", &self.blocks.last().map(Block::hash))
            .field("config", &self.config)
            .finish()
    }
}

impl<'a> IntoIterator for &'a Blockchain {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

/// Blockchain statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockchainStats {
    /// Current chain height.
    pub height: u64,
    /// Hash of the genesis block.
    pub genesis_hash: Hash,
    /// Hash of the latest block.
    pub latest_block_hash: Hash,
    /// Timestamp of the latest block.
    pub latest_timestamp: i64,
    /// Transactions across all blocks, coinbase included.
    pub total_transactions: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use merklechain_core::FixedClock;

    const BLOCK_TIME: i64 = 1563897484;

    fn setup_blockchain() -> Blockchain {
        Blockchain::with_config(BlockchainConfig::default(), FixedClock(BLOCK_TIME)).unwrap()
    }

    #[test]
    fn test_blockchain_init() {
        let blockchain = setup_blockchain();

        assert_eq!(blockchain.config(), &BlockchainConfig::default());
        assert_eq!(blockchain.len(), 1);
        assert_eq!(blockchain.height(), 0);

        let genesis = blockchain.genesis_block().unwrap();
        assert!(genesis.is_genesis());
        assert_eq!(genesis.transactions()[0].data(), b"Genesis Block");
        assert_eq!(blockchain.current_block().unwrap(), genesis);
    }

    #[test]
    fn test_genesis_is_reproducible() {
        let a = setup_blockchain();
        let b = setup_blockchain();
        assert_eq!(
            a.genesis_block().unwrap().hash(),
            b.genesis_block().unwrap().hash()
        );
    }

    #[test]
    fn test_add_block_links_to_tip() {
        let mut blockchain = setup_blockchain();
        let genesis_hash = blockchain.genesis_block().unwrap().hash();

        let b1 = blockchain
            .add_block(vec![Transaction::from("Send 1 coin to Satoshi")])
            .unwrap()
            .clone();
        assert_eq!(b1.prev_hash(), Some(&genesis_hash));

        let b2 = blockchain
            .add_block(vec![Transaction::from("Send 3 coins to Satoshi")])
            .unwrap()
            .clone();
        assert_eq!(b2.prev_hash(), Some(&b1.hash()));

        assert_eq!(blockchain.current_block().unwrap(), &b2);
        assert_eq!(blockchain.height(), 2);
    }

    #[test]
    fn test_add_empty_block_rejected() {
        let mut blockchain = setup_blockchain();
        let err = blockchain.add_block(vec![]).unwrap_err();

        assert_eq!(err, BlockchainError::Block(BlockError::NoTransactions));
        assert_eq!(blockchain.len(), 1);
    }

    #[test]
    fn test_get_block() {
        let mut blockchain = setup_blockchain();
        let tip = blockchain.add_block(vec![Transaction::from("tx")]).unwrap().hash();

        assert_eq!(blockchain.get_block(&tip).unwrap().hash(), tip);
        assert!(blockchain.contains(&tip));
        assert_eq!(blockchain.get_block_by_height(1).unwrap().hash(), tip);
        assert!(blockchain.get_block_by_height(2).is_none());
    }

    #[test]
    fn test_get_unknown_block() {
        let blockchain = setup_blockchain();
        let unknown = Hash::from_bytes([9u8; 32]);

        assert_eq!(
            blockchain.get_block(&unknown),
            Err(BlockchainError::BlockNotFound(unknown))
        );
        assert!(!blockchain.contains(&unknown));
    }

    #[test]
    fn test_verify_chain() {
        let mut blockchain = setup_blockchain();
        for i in 0..5 {
            blockchain
                .add_block(vec![Transaction::from(format!("tx {i}"))])
                .unwrap();
        }

        assert!(blockchain.verify_chain().is_ok());
    }

    #[test]
    fn test_verify_chain_detects_broken_link() {
        let mut blockchain = setup_blockchain();
        blockchain.add_block(vec![Transaction::from("tx")]).unwrap();

        let stray = Block::at(vec![Transaction::from("stray")], Some(Hash::ZERO), BLOCK_TIME).unwrap();
        blockchain.blocks.push(stray);

        assert_eq!(
            blockchain.verify_chain(),
            Err(BlockchainError::BrokenLink { height: 2 })
        );
    }

    /// Replace the tip with a JSON-edited copy of itself.
    fn tamper_tip(blockchain: &mut Blockchain, edit: impl FnOnce(&mut serde_json::Value)) {
        let tip = blockchain.blocks.pop().unwrap();
        let mut json = serde_json::to_value(&tip).unwrap();
        edit(&mut json);
        blockchain.blocks.push(serde_json::from_value(json).unwrap());
    }

    #[test]
    fn test_verify_chain_detects_bad_hash() {
        let mut blockchain = setup_blockchain();
        blockchain.add_block(vec![Transaction::from("tx")]).unwrap();

        tamper_tip(&mut blockchain, |json| {
            json["header"]["timestamp"] = serde_json::json!(BLOCK_TIME - 60);
        });

        assert_eq!(
            blockchain.verify_chain(),
            Err(BlockchainError::InvalidBlockHash { height: 1 })
        );
    }

    #[test]
    fn test_verify_chain_detects_bad_merkle_root() {
        let mut blockchain = setup_blockchain();
        blockchain.add_block(vec![Transaction::from("tx")]).unwrap();

        tamper_tip(&mut blockchain, |json| {
            json["transactions"][0] = serde_json::to_value(Transaction::from("forged")).unwrap();
        });

        assert_eq!(
            blockchain.verify_chain(),
            Err(BlockchainError::InvalidMerkleRoot { height: 1 })
        );
    }

    #[test]
    fn test_blockchain_stats() {
        let mut blockchain = setup_blockchain();
        blockchain
            .add_block(vec![Transaction::from("a"), Transaction::from("b")])
            .unwrap();

        let stats = blockchain.stats().unwrap();
        assert_eq!(stats.height, 1);
        assert_eq!(stats.total_transactions, 3);
        assert_eq!(stats.latest_timestamp, BLOCK_TIME);
        assert_eq!(stats.genesis_hash, blockchain.genesis_block().unwrap().hash());
    }

    #[test]
    fn test_config_from_json() {
        let config: BlockchainConfig =
            serde_json::from_str(r#"{"genesis_data": [104, 105]}"#).unwrap();
        assert_eq!(config.genesis_data, b"hi");

        let defaulted: BlockchainConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(defaulted, BlockchainConfig::default());
    }
}
