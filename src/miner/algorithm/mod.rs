// src/miner/algorithm/mod.rs
//! Digest algorithm implementations
//!
//! Every algorithm is a pure function from bytes to a 32-byte digest. Workers
//! call them concurrently without any synchronization.

/// SHA-256 implementation (the default)
pub mod sha256;

/// BLAKE2s-256 implementation
pub mod blake2s;

use crate::types::{AlgorithmType, Difficulty};
use crate::utils::error::MinerError;
use std::sync::Arc;

pub use self::blake2s::Blake2sAlgo;
pub use self::sha256::Sha256Algo;

/// Raw digest produced by every supported algorithm
pub type HashOutput = [u8; 32];

/// Common interface for all digest algorithms
pub trait Algorithm: Send + Sync {
    /// Digest arbitrary bytes
    fn digest(&self, data: &[u8]) -> Result<HashOutput, MinerError>;

    /// Digest the header bytes followed by the nonce in decimal ASCII
    ///
    /// # Arguments
    /// * `header` - Immutable block header bytes shared by all workers
    /// * `nonce` - Candidate nonce
    fn hash(&self, header: &[u8], nonce: u64) -> Result<HashOutput, MinerError> {
        let nonce = nonce.to_string();
        let mut input = Vec::with_capacity(header.len() + nonce.len());
        input.extend_from_slice(header);
        input.extend_from_slice(nonce.as_bytes());
        self.digest(&input)
    }

    /// Recompute the digest for `nonce` and check it against `difficulty`
    ///
    /// Returns the digest when it meets `difficulty`, `None` otherwise.
    fn verify(
        &self,
        header: &[u8],
        nonce: u64,
        difficulty: Difficulty,
    ) -> Result<Option<HashOutput>, MinerError> {
        let hash = self.hash(header, nonce)?;
        Ok(difficulty.is_satisfied_by(&hash).then_some(hash))
    }

    /// Get the algorithm type
    fn algorithm_type(&self) -> AlgorithmType;
}

/// Creates the algorithm instance for `algo`
pub fn create(algo: AlgorithmType) -> Arc<dyn Algorithm> {
    match algo {
        AlgorithmType::Sha256 => Arc::new(Sha256Algo),
        AlgorithmType::Blake2s => Arc::new(Blake2sAlgo),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_appends_decimal_nonce() {
        let algo = Sha256Algo;
        let direct = algo.digest(b"header42").unwrap();
        assert_eq!(algo.hash(b"header", 42).unwrap(), direct);
    }

    #[test]
    fn verify_uses_difficulty() {
        let algo = create(AlgorithmType::Sha256);
        assert_eq!(
            algo.verify(b"anything", 7, Difficulty::from(0)).unwrap(),
            Some(algo.hash(b"anything", 7).unwrap())
        );
        assert_eq!(algo.verify(b"anything", 7, Difficulty::from(65)).unwrap(), None);
    }

    #[test]
    fn create_honours_algorithm_type() {
        for algo in [AlgorithmType::Sha256, AlgorithmType::Blake2s] {
            assert_eq!(create(algo).algorithm_type(), algo);
        }
    }

    #[test]
    fn digest_is_deterministic_across_threads() {
        let algo = create(AlgorithmType::Sha256);
        let expected = algo.hash(b"shared header", 1234).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let algo = Arc::clone(&algo);
                std::thread::spawn(move || algo.hash(b"shared header", 1234).unwrap())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }
}
