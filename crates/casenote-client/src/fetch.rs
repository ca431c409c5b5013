//! The outbound fetch capability.
//!
//! [`RecordFetch`] is the seam between the aggregation pipeline and the
//! network: perform an authenticated GET, hand back status and body, fail
//! only on transport problems. Status interpretation is the caller's job —
//! a 500 is a successful fetch of an unsuccessful response.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;

use casenote_core::{Error, Result};

use crate::config::ClientConfig;

/// Status and body of one upstream response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstract authenticated-GET capability.
///
/// `Err` means the request never produced a response (connection failure,
/// local timeout, malformed transport); every received response comes back
/// as `Ok`, whatever its status.
#[async_trait]
pub trait RecordFetch: Send + Sync {
    async fn get(&self, url: &str) -> Result<FetchResponse>;
}

/// reqwest-backed [`RecordFetch`] with HTTP Basic authentication and a
/// bounded per-request timeout.
pub struct HttpFetcher {
    client: Client,
    auth_header: String,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;
        let credentials = BASE64.encode(format!("{}:{}", config.username, config.password));
        Ok(Self {
            client,
            auth_header: format!("Basic {}", credentials),
            timeout,
        })
    }
}

#[async_trait]
impl RecordFetch for HttpFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse> {
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, self.auth_header.as_str())
            .timeout(self.timeout)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(FetchResponse { status, body })
    }
}
