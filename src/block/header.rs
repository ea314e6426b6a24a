// src/block/header.rs
use crate::miner::algorithm::Algorithm;
use crate::utils::error::MinerError;
use std::sync::Arc;

/// Identifier digested into the previous-block fingerprint when none is configured
pub const DEFAULT_PREVIOUS_BLOCK_ID: &str = "prevblockhash";

/// Fixed input every worker searches against
///
/// Holds the hex fingerprints of the previous block and of the transaction
/// payload; the header bytes are their ASCII concatenation. Never mutated
/// after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    previous_fingerprint: String,
    payload_fingerprint: String,
    bytes: Vec<u8>,
}

impl BlockHeader {
    /// Assembles a header from two hex fingerprints
    pub fn new(previous_fingerprint: String, payload_fingerprint: String) -> Self {
        let bytes = [previous_fingerprint.as_bytes(), payload_fingerprint.as_bytes()].concat();
        BlockHeader {
            previous_fingerprint,
            payload_fingerprint,
            bytes,
        }
    }

    /// Hex digest of the previous block identifier
    pub fn previous_fingerprint(&self) -> &str {
        &self.previous_fingerprint
    }

    /// Hex digest of the payload (the merkle root)
    pub fn payload_fingerprint(&self) -> &str {
        &self.payload_fingerprint
    }

    /// Header bytes hashed together with each candidate nonce
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Builds the block header from a payload
pub struct BlockHeaderBuilder {
    algorithm: Arc<dyn Algorithm>,
    previous_block_id: String,
}

impl BlockHeaderBuilder {
    /// Creates a builder using [`DEFAULT_PREVIOUS_BLOCK_ID`]
    pub fn new(algorithm: Arc<dyn Algorithm>) -> Self {
        BlockHeaderBuilder {
            algorithm,
            previous_block_id: DEFAULT_PREVIOUS_BLOCK_ID.to_string(),
        }
    }

    /// Overrides the previous block identifier
    pub fn previous_block_id(mut self, id: impl Into<String>) -> Self {
        self.previous_block_id = id.into();
        self
    }

    /// Digests the previous block id and `payload` into a header
    ///
    /// # Errors
    /// Propagates digest failures from the algorithm.
    pub fn build(&self, payload: &[u8]) -> Result<BlockHeader, MinerError> {
        let previous = self.algorithm.digest(self.previous_block_id.as_bytes())?;
        let merkle_root = self.algorithm.digest(payload)?;

        log::debug!(
            "Built header from {} payload bytes (algorithm: {})",
            payload.len(),
            self.algorithm.algorithm_type()
        );

        Ok(BlockHeader::new(hex::encode(previous), hex::encode(merkle_root)))
    }
}
