// src/network/payload.rs

//! Transaction payload retrieval
//!
//! The payload is opaque to the miner: it is fetched once, digested into the
//! merkle root and never looked at again. Every failure maps to
//! `PayloadUnavailable`; there are no retries here.
use crate::utils::error::MinerError;
use reqwest::Client;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Records payload used when no source is configured
pub const DEFAULT_PAYLOAD_URL: &str =
    "https://raw.githubusercontent.com/roxavinante/blockchain/master/records.json";

/// Where the payload comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadSource {
    /// `http://` or `https://` URL
    Url(Url),
    /// Local file (bare path or `file://` URL)
    File(PathBuf),
    /// Bytes supplied directly
    Inline(Vec<u8>),
}

impl FromStr for PayloadSource {
    type Err = MinerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let url = match Url::parse(s) {
            Ok(url) => url,
            Err(e) if s.starts_with("http://") || s.starts_with("https://") => {
                return Err(e.into());
            }
            // Relative paths are not URLs
            Err(_) => return Ok(PayloadSource::File(PathBuf::from(s))),
        };

        match url.scheme() {
            "http" | "https" => Ok(PayloadSource::Url(url)),
            "file" => url
                .to_file_path()
                .map(PayloadSource::File)
                .map_err(|_| MinerError::ConfigError(format!("Invalid file URL '{}'", s))),
            // Windows drive letters parse as one-letter schemes
            scheme if scheme.len() == 1 => Ok(PayloadSource::File(PathBuf::from(s))),
            scheme => Err(MinerError::ConfigError(format!(
                "Unsupported payload scheme '{}' in '{}'",
                scheme, s
            ))),
        }
    }
}

impl fmt::Display for PayloadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadSource::Url(url) => write!(f, "{}", url),
            PayloadSource::File(path) => write!(f, "{}", path.display()),
            PayloadSource::Inline(bytes) => write!(f, "<{} inline bytes>", bytes.len()),
        }
    }
}

impl Default for PayloadSource {
    fn default() -> Self {
        // The constant is a valid URL
        PayloadSource::Url(Url::parse(DEFAULT_PAYLOAD_URL).expect("default payload URL parses"))
    }
}

/// Fetches payload bytes from a [`PayloadSource`]
pub struct PayloadClient {
    client: Client,
}

impl PayloadClient {
    /// Creates a client whose HTTP requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, MinerError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(PayloadClient { client })
    }

    /// Reads the whole payload
    ///
    /// # Errors
    /// `PayloadUnavailable` on transport errors, non-success HTTP statuses
    /// and unreadable files.
    pub async fn fetch(&self, source: &PayloadSource) -> Result<Vec<u8>, MinerError> {
        let payload = match source {
            PayloadSource::Url(url) => self.fetch_url(url).await?,
            PayloadSource::File(path) => tokio::fs::read(path).await.map_err(|e| {
                MinerError::PayloadUnavailable(format!("{}: {}", path.display(), e))
            })?,
            PayloadSource::Inline(bytes) => bytes.clone(),
        };

        log::debug!("Fetched {} payload bytes from {}", payload.len(), source);
        Ok(payload)
    }

    async fn fetch_url(&self, url: &Url) -> Result<Vec<u8>, MinerError> {
        let unavailable = |e: reqwest::Error| MinerError::PayloadUnavailable(format!("{}: {}", url, e));

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?;

        let body = response.bytes().await.map_err(unavailable)?;
        Ok(body.to_vec())
    }
}
