// src/utils/error.rs
use crate::miner::coordinator::WorkerEvent;
use std::io;
use thiserror::Error;

/// Main error type for the hashcash miner
///
/// Setup failures (`PayloadUnavailable`, `InvalidConfiguration`,
/// `ConfigError`) abort a run before any worker is launched. A race that
/// ends without a winner is not an error; see
/// [`RaceState::Cancelled`](crate::miner::RaceState::Cancelled).
#[derive(Error, Debug)]
pub enum MinerError {
    /// The transaction payload could not be fetched
    #[error("Payload unavailable: {0}")]
    PayloadUnavailable(String),

    /// Worker count, worker id or difficulty out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Errors raised while computing a digest
    #[error("Algorithm error: {0}")]
    AlgorithmError(String),

    /// A published solution failed the coordinator's re-check
    #[error("Solution verification failed: {0}")]
    VerificationFailed(String),

    /// Standard I/O operation errors
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Malformed payload URL
    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    /// HTTP request/response errors
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Thread communication channel errors
    #[error("Thread communication error: {0}")]
    ChannelError(String),

    /// Worker thread or thread pool failures
    #[error("Task execution error: {0}")]
    TaskError(String),
}

/// Converts crossbeam channel send errors for worker events into MinerError
///
/// Raised when a worker reports to a coordinator that has already stopped listening.
impl From<crossbeam_channel::SendError<WorkerEvent>> for MinerError {
    fn from(e: crossbeam_channel::SendError<WorkerEvent>) -> Self {
        MinerError::ChannelError(format!("Worker event send failed: {}", e))
    }
}
