//! Main client for interacting with the dataset API

use crate::error::{Error, Result};
use crate::transport::Transport;
use bon::bon;
use std::time::Duration;

/// SDK version for User-Agent header
const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");
const SDK_NAME: &str = env!("CARGO_PKG_NAME");

/// Default base URL of the API
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080/api";

/// Default timeout for API requests
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default connection timeout
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for bulk dataset creation, which ingests every document up front
pub const LONG_RUNNING_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Main client for interacting with the dataset API
#[derive(Debug, Clone)]
pub struct DatasetClient {
    transport: Transport,
}

#[bon]
impl DatasetClient {
    /// Create a new dataset client
    ///
    /// Pass `http_client` to reuse a preconfigured `reqwest::Client`, for
    /// example one that injects authentication headers. `connect_timeout`
    /// and `user_agent` only apply to the client built here.
    #[builder]
    pub fn new(
        #[builder(into, default = String::from(DEFAULT_BASE_URL))] base_url: String,
        timeout: Option<Duration>,
        connect_timeout: Option<Duration>,
        #[builder(into)] user_agent: Option<String>,
        http_client: Option<reqwest::Client>,
    ) -> Result<Self> {
        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);

        let client = match http_client {
            Some(client) => client,
            None => {
                let default_user_agent = format!("{}/{} (Rust)", SDK_NAME, SDK_VERSION);
                reqwest::Client::builder()
                    .timeout(timeout)
                    .connect_timeout(connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT))
                    .user_agent(user_agent.unwrap_or(default_user_agent))
                    .pool_max_idle_per_host(10)
                    .pool_idle_timeout(Duration::from_secs(90))
                    .build()
                    .map_err(|e| {
                        Error::Configuration(format!("Failed to build HTTP client: {}", e))
                    })?
            }
        };

        Ok(Self {
            transport: Transport::new(client, &base_url, timeout)?,
        })
    }

    /// Create a new dataset client from environment variables
    ///
    /// Reads from:
    /// - `DATASET_API_BASE_URL`: Required base URL, e.g. `http://127.0.0.1:8080/api`
    /// - `DATASET_API_TIMEOUT_SECS`: Optional default timeout in seconds
    pub fn from_env() -> Result<Self> {
        use std::env;

        let base_url = env::var("DATASET_API_BASE_URL").map_err(|_| {
            Error::Configuration("DATASET_API_BASE_URL environment variable not set".to_string())
        })?;

        let timeout = match env::var("DATASET_API_TIMEOUT_SECS") {
            Ok(raw) => Some(raw.trim().parse::<u64>().map(Duration::from_secs).map_err(|_| {
                Error::Configuration(format!(
                    "DATASET_API_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    raw
                ))
            })?),
            Err(_) => None,
        };

        Self::builder()
            .base_url(base_url)
            .maybe_timeout(timeout)
            .build()
    }

    /// Get the underlying transport
    pub fn transport(&self) -> &Transport {
        &self.transport
    }
}
