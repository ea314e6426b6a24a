// src/miner/algorithm/blake2s.rs
use crate::miner::algorithm::{Algorithm, HashOutput};
use crate::types::AlgorithmType;
use crate::utils::error::MinerError;
use blake2::{Blake2s256, Digest};

/// BLAKE2s-256 algorithm
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake2sAlgo;

impl Algorithm for Blake2sAlgo {
    fn digest(&self, data: &[u8]) -> Result<HashOutput, MinerError> {
        Ok(Blake2s256::digest(data).into())
    }

    fn algorithm_type(&self) -> AlgorithmType {
        AlgorithmType::Blake2s
    }
}
