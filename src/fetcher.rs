use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::USER_AGENT;
use std::time::Duration;
use tracing::{debug, warn};

use crate::utils::error::Result;

/// Retrieves the raw body of a product page.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, user_agent: &str) -> Result<Vec<u8>>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, user_agent: &str) -> Result<Vec<u8>> {
        let start_time = std::time::Instant::now();

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .send()
            .await?;

        // Error pages still get parsed; they simply won't contain a price.
        let status = response.status();
        if !status.is_success() {
            warn!(%status, url, "product page returned a non-success status");
        }

        let body = response.bytes().await?;
        debug!(
            %status,
            bytes = body.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "fetched product page"
        );

        Ok(body.to_vec())
    }
}
