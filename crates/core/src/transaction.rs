//! Opaque transaction payloads.
//!
//! The ledger does not interpret transaction contents. Callers encode their
//! records into bytes before handing them over.

use crate::hash::{hash, Hash};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A transaction carried by a block.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Transaction {
    /// Encoded transaction data.
    pub data: Vec<u8>,
}

impl Transaction {
    /// Create a transaction from encoded bytes.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    /// Get the encoded bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Hash of the transaction, which is also its merkle leaf hash.
    pub fn hash(&self) -> Hash {
        hash(&self.data)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.data) {
            Ok(text) => write!(f, "Transaction({text:?})"),
            Err(_) => write!(f, "Transaction(0x{})", hex::encode(&self.data)),
        }
    }
}

impl AsRef<[u8]> for Transaction {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl From<Vec<u8>> for Transaction {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl From<&[u8]> for Transaction {
    fn from(data: &[u8]) -> Self {
        Self::new(data)
    }
}

impl From<&str> for Transaction {
    fn from(data: &str) -> Self {
        Self::new(data)
    }
}

impl From<String> for Transaction {
    fn from(data: String) -> Self {
        Self::new(data)
    }
}
