//! HTTP client for the catalog, taxonomy and file-download endpoints.
//!
//! Provides an async client with:
//! - Connection pooling via reqwest
//! - Optional retry middleware with exponential backoff (off by default)
//! - Status-code mapping into [`ClientError`]
//! - Strict JSON decoding into the records in [`crate::models`]
//!
//! The client holds no per-call state. It is built explicitly by the caller and is
//! cheap to clone, so independent pipelines can share or own one as they see fit.

mod gbif;
mod sciencebase;

use std::time::Duration;

use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use url::Url;

use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};

/// Species range API client.
#[derive(Clone)]
pub struct SpeciesRangeClient {
    /// HTTP client with middleware.
    client: ClientWithMiddleware,

    /// Configuration the client was built from.
    config: Config,
}

impl SpeciesRangeClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: Config) -> ClientResult<Self> {
        let client = Client::builder()
            .user_agent(api::USER_AGENT)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        let mut builder = ClientBuilder::new(client);
        if config.max_retries > 0 {
            let retry_policy = ExponentialBackoff::builder()
                .retry_bounds(Duration::from_secs(1), Duration::from_secs(30))
                .build_with_max_retries(config.max_retries);
            builder = builder.with(RetryTransientMiddleware::new_with_policy(retry_policy));
        }

        Ok(Self { client: builder.build(), config })
    }

    /// Configuration the client was built from.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Start a GET for a file locator and return the response once its status is known.
    ///
    /// The body is left unread so the caller can stream it.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or a non-success status.
    pub async fn open_download(&self, url: &Url) -> ClientResult<reqwest::Response> {
        tracing::debug!(%url, "Opening download");
        let response = self.client.get(url.clone()).send().await?;
        Self::handle_response(response).await
    }

    /// Make a GET request and decode the JSON body.
    async fn get<T>(&self, url: Url, params: &[(&str, String)]) -> ClientResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        tracing::debug!(%url, "GET");
        let response = self.client.get(url).query(params).send().await?;
        let response = Self::handle_response(response).await?;

        // Decode from bytes so malformed bodies surface as `ClientError::Parse`.
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(ClientError::from)
    }

    /// Handle API response status codes.
    async fn handle_response(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status.as_u16() {
            429 => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60);

                Err(ClientError::rate_limited(retry_after))
            }
            404 => {
                let resource = response.url().to_string();
                Err(ClientError::not_found(resource))
            }
            400 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::bad_request(text))
            }
            500..=599 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::server(status.as_u16(), text))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text })
            }
        }
    }

    /// Append path segments to a base URL, percent-encoding each segment.
    fn endpoint(base: &str, segments: &[&str]) -> ClientResult<Url> {
        let mut url = Url::parse(base).map_err(|e| ClientError::invalid_url(base, e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| ClientError::invalid_url(base, "cannot be a base URL"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

impl std::fmt::Debug for SpeciesRangeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeciesRangeClient")
            .field("sciencebase_url", &self.config.sciencebase_url)
            .field("gbif_api_url", &self.config.gbif_api_url)
            .field("max_retries", &self.config.max_retries)
            .finish()
    }
}
