// src/types.rs
use crate::utils::error::MinerError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported digest algorithms
///
/// The race only needs a deterministic, collision-resistant 32-byte digest;
/// SHA-256 reproduces the historical behaviour and is the default.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmType {
    /// SHA-256
    #[default]
    #[value(name = "sha256")]
    Sha256,

    /// BLAKE2s with a 256-bit output
    #[value(name = "blake2s")]
    Blake2s,
}

impl fmt::Display for AlgorithmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgorithmType::Sha256 => write!(f, "sha256"),
            AlgorithmType::Blake2s => write!(f, "blake2s"),
        }
    }
}

impl FromStr for AlgorithmType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(AlgorithmType::Sha256),
            "blake2s" | "blake2s256" => Ok(AlgorithmType::Blake2s),
            _ => Err(format!("Unknown algorithm: {}", s)),
        }
    }
}

/// Required number of leading `'0'` characters in a digest's lowercase hex form
///
/// A difficulty larger than the digest's hex length can never be met; the
/// race then only ends through a deadline or external cancellation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Difficulty(usize);

impl Difficulty {
    /// Validates a raw difficulty level
    ///
    /// # Errors
    /// `InvalidConfiguration` if `level` is negative.
    pub fn new(level: i64) -> Result<Self, MinerError> {
        usize::try_from(level).map(Difficulty).map_err(|_| {
            MinerError::InvalidConfiguration(format!(
                "difficulty must be non-negative, got {}",
                level
            ))
        })
    }

    /// Number of leading zero characters required
    pub fn level(&self) -> usize {
        self.0
    }

    /// Checks the leading-zero condition against a raw digest
    ///
    /// Hex character `i` of the digest is `'0'` exactly when nibble `i` is
    /// zero, so this is the same test as comparing the first `k` characters
    /// of `hex::encode(digest)` with `"0" * k`.
    pub fn is_satisfied_by(&self, digest: &[u8]) -> bool {
        if self.0 > digest.len() * 2 {
            return false;
        }

        (0..self.0).all(|i| {
            let byte = digest[i / 2];
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            nibble == 0
        })
    }
}

impl From<usize> for Difficulty {
    fn from(level: usize) -> Self {
        Difficulty(level)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_prefix_check(digest: &[u8], level: usize) -> bool {
        let hex = hex::encode(digest);
        hex.len() >= level && hex[..level] == "0".repeat(level)
    }

    #[test]
    fn negative_difficulty_is_rejected() {
        assert!(matches!(
            Difficulty::new(-1),
            Err(MinerError::InvalidConfiguration(_))
        ));
        assert_eq!(Difficulty::new(3).unwrap().level(), 3);
    }

    #[test]
    fn zero_difficulty_accepts_anything() {
        let difficulty = Difficulty::from(0);
        assert!(difficulty.is_satisfied_by(&[0xff; 32]));
        assert!(difficulty.is_satisfied_by(&[]));
    }

    #[test]
    fn odd_levels_check_high_nibble_only() {
        // "0f..." has one leading zero character but only four zero bits
        let digest = [0x0f, 0xff, 0xff];
        assert!(Difficulty::from(1).is_satisfied_by(&digest));
        assert!(!Difficulty::from(2).is_satisfied_by(&digest));

        // "00f..." passes level 2 and fails level 3 although bit 8 is clear
        let digest = [0x00, 0x7f, 0xff];
        assert!(Difficulty::from(2).is_satisfied_by(&digest));
        assert!(!Difficulty::from(3).is_satisfied_by(&digest));
    }

    #[test]
    fn difficulty_beyond_digest_length_is_never_met() {
        let all_zero = [0u8; 32];
        assert!(Difficulty::from(64).is_satisfied_by(&all_zero));
        assert!(!Difficulty::from(65).is_satisfied_by(&all_zero));
    }

    #[test]
    fn matches_hex_string_prefix_comparison() {
        let samples: [[u8; 4]; 5] = [
            [0x00, 0x00, 0x00, 0x01],
            [0x00, 0x10, 0xab, 0xcd],
            [0x01, 0x00, 0x00, 0x00],
            [0x00, 0x0a, 0x00, 0x00],
            [0xf0, 0x00, 0x00, 0x00],
        ];
        for digest in samples {
            for level in 0..=9 {
                assert_eq!(
                    Difficulty::from(level).is_satisfied_by(&digest),
                    hex_prefix_check(&digest, level),
                    "level {} digest {}",
                    level,
                    hex::encode(digest)
                );
            }
        }
    }

    #[test]
    fn algorithm_names_round_trip() {
        for algo in [AlgorithmType::Sha256, AlgorithmType::Blake2s] {
            assert_eq!(algo.to_string().parse::<AlgorithmType>(), Ok(algo));
        }
        assert!("randomx".parse::<AlgorithmType>().is_err());
    }
}
