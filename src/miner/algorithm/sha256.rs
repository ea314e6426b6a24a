// src/miner/algorithm/sha256.rs
//! SHA-256 digest

use crate::miner::algorithm::{Algorithm, HashOutput};
use crate::types::AlgorithmType;
use crate::utils::error::MinerError;
use sha2::{Digest, Sha256};

/// SHA-256 algorithm
///
/// Stateless; a fresh hasher is created for every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Algo;

impl Algorithm for Sha256Algo {
    fn digest(&self, data: &[u8]) -> Result<HashOutput, MinerError> {
        Ok(Sha256::digest(data).into())
    }

    fn algorithm_type(&self) -> AlgorithmType {
        AlgorithmType::Sha256
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn known_vectors() {
        assert_eq!(
            Sha256Algo.digest(b"").unwrap(),
            hex!("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
        );
        assert_eq!(
            Sha256Algo.digest(b"abc").unwrap(),
            hex!("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
        );
    }
}
