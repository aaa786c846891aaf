//! Ledger orchestration for merklechain.
//!
//! This crate holds the append-only chain of blocks:
//! - **Blockchain**: genesis creation, append, lookup by hash or height, verification
//! - **SharedBlockchain**: the same ledger behind a read/write lock for concurrent callers
//!
//! # Example
//!
//! ```rust
//! use merklechain_chain::{Blockchain, BlockchainConfig};
//! use merklechain_core::{FixedClock, Transaction};
//!
//! let config = BlockchainConfig {
//!     genesis_data: b"Genesis data info".to_vec(),
//! };
//! let mut blockchain = Blockchain::with_config(config, FixedClock(1563897484)).unwrap();
//!
//! let block = blockchain
//!     .add_block(vec![Transaction::from("Send 1 coin to Satoshi")])
//!     .unwrap()
//!     .clone();
//!
//! assert_eq!(blockchain.current_block().unwrap(), &block);
//! assert_eq!(
//!     block.prev_hash(),
//!     Some(&blockchain.genesis_block().unwrap().hash())
//! );
//! ```

pub mod blockchain;
pub mod shared;

// Re-export commonly used types
pub use blockchain::{Blockchain, BlockchainConfig, BlockchainError, BlockchainStats, Result};
pub use shared::SharedBlockchain;
