// src/config/config.rs
use crate::{
    block::DEFAULT_PREVIOUS_BLOCK_ID,
    miner::RaceConfig,
    network::{DEFAULT_PAYLOAD_URL, PayloadSource},
    types::{AlgorithmType, Difficulty},
    utils::error::MinerError,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for a mining run
///
/// Every field has a default, so an empty file (or no file at all) is a
/// valid configuration. Command-line flags override individual fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Required leading zero characters (validated in [`Config::race_config`])
    #[serde(default = "default_difficulty")]
    pub difficulty: i64,

    /// Number of workers (default: number of CPU cores)
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Digest algorithm
    #[serde(default)]
    pub algorithm: AlgorithmType,

    /// Payload location: http(s) URL, file URL or path
    #[serde(default = "default_payload")]
    pub payload: String,

    /// Identifier digested into the previous block fingerprint
    #[serde(default = "default_previous_block_id")]
    pub previous_block_id: String,

    /// Give up after this many seconds (0 or absent = run until found)
    #[serde(default)]
    pub deadline_secs: Option<u64>,

    /// Seconds between progress log lines (0 = disabled)
    #[serde(default = "default_report_interval")]
    pub report_interval_secs: u64,

    /// HTTP timeout for the payload fetch, in seconds
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

fn default_difficulty() -> i64 {
    2
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_payload() -> String {
    DEFAULT_PAYLOAD_URL.into()
}

fn default_previous_block_id() -> String {
    DEFAULT_PREVIOUS_BLOCK_ID.into()
}

fn default_report_interval() -> u64 {
    10
}

fn default_fetch_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Config {
            difficulty: default_difficulty(),
            workers: default_workers(),
            algorithm: AlgorithmType::default(),
            payload: default_payload(),
            previous_block_id: default_previous_block_id(),
            deadline_secs: None,
            report_interval_secs: default_report_interval(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

impl Config {
    /// Loads configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Ok(Config)` - Successfully loaded configuration
    /// * `Err(MinerError)` - If file couldn't be read or parsed
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, MinerError> {
        let path = path.into();
        let config_str = std::fs::read_to_string(&path).map_err(|e| {
            MinerError::ConfigError(format!(
                "Failed to read config at {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::parse(&config_str)
    }

    /// Parses configuration from TOML text
    pub fn parse(config_str: &str) -> Result<Self, MinerError> {
        toml::from_str(config_str)
            .map_err(|e| MinerError::ConfigError(format!("Invalid config format: {}", e)))
    }

    /// Validated race parameters
    ///
    /// # Errors
    /// `InvalidConfiguration` for a negative difficulty or zero workers.
    pub fn race_config(&self) -> Result<RaceConfig, MinerError> {
        let difficulty = Difficulty::new(self.difficulty)?;
        if self.workers == 0 {
            return Err(MinerError::InvalidConfiguration(
                "worker count must be at least 1".into(),
            ));
        }

        let mut race = RaceConfig::new(self.workers, difficulty);
        if let Some(secs) = self.deadline_secs.filter(|s| *s > 0) {
            race = race.with_deadline(Duration::from_secs(secs));
        }
        if self.report_interval_secs > 0 {
            race = race.with_report_interval(Duration::from_secs(self.report_interval_secs));
        }
        Ok(race)
    }

    /// Parsed payload source
    pub fn payload_source(&self) -> Result<PayloadSource, MinerError> {
        self.payload.parse()
    }

    /// HTTP timeout for the payload fetch
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Generates a configuration template string
    ///
    /// # Returns
    /// String containing a commented TOML configuration template
    pub fn generate_template() -> String {
        let mut template = String::new();
        template.push_str("# Hashcash Miner Configuration\n\n");
        template.push_str("# Number of leading zero hex characters required\n");
        template.push_str("difficulty = 2\n");
        template.push_str("# Number of workers (defaults to the number of CPU cores)\n");
        template.push_str(&format!("workers = {}\n", num_cpus::get()));
        template.push_str("# Supported algorithms: sha256, blake2s\n");
        template.push_str("algorithm = \"sha256\"\n\n");
        template.push_str("# Transaction payload: http(s) URL, file:// URL or local path\n");
        template.push_str(&format!("payload = \"{}\"\n", DEFAULT_PAYLOAD_URL));
        template.push_str(&format!(
            "previous_block_id = \"{}\"\n",
            DEFAULT_PREVIOUS_BLOCK_ID
        ));
        template.push_str("fetch_timeout_secs = 30\n\n");
        template.push_str("# Stop the race after this many seconds (0 = never)\n");
        template.push_str("deadline_secs = 0\n");
        template.push_str("# Seconds between progress log lines (0 = disabled)\n");
        template.push_str("report_interval_secs = 10\n");

        template
    }
}
