use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Response};
use url::Url;

use crate::error::LoadError;

/// Fetches bytes for a URL or fails with a classified error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch_text(&self, url: &Url) -> Result<String, LoadError>;

    /// Raw body bytes, never re-encoded.
    async fn fetch_binary(&self, url: &Url) -> Result<Vec<u8>, LoadError>;
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self, LoadError> {
        let mut builder = ClientBuilder::new().use_rustls_tls().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| LoadError::network("<client>", e))?;

        Ok(Self { client })
    }

    async fn get(&self, url: &Url) -> Result<Response, LoadError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| LoadError::network(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, url: &Url) -> Result<String, LoadError> {
        self.get(url)
            .await?
            .text()
            .await
            .map_err(|e| LoadError::network(url.as_str(), e))
    }

    async fn fetch_binary(&self, url: &Url) -> Result<Vec<u8>, LoadError> {
        let bytes = self
            .get(url)
            .await?
            .bytes()
            .await
            .map_err(|e| LoadError::network(url.as_str(), e))?;
        Ok(bytes.to_vec())
    }
}
