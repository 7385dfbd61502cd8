//! HTTP client abstraction for testability

use super::types::SourceError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent string for data source requests.
pub const DEFAULT_USER_AGENT: &str = concat!("fclayer/", env!("CARGO_PKG_VERSION"));

/// Trait for asynchronous HTTP client operations.
///
/// Allows the data source to be exercised against canned responses in tests.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an async HTTP GET request.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    ///
    /// # Returns
    ///
    /// The response body as bytes. A non-success status is an error.
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, SourceError>> + Send;
}

/// Async HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Creates a new AsyncReqwestClient with default configuration.
    pub fn new() -> Result<Self, SourceError> {
        Self::with_options(Duration::from_secs(DEFAULT_TIMEOUT_SECS), DEFAULT_USER_AGENT)
    }

    /// Creates a client with a custom timeout and user agent.
    ///
    /// Connections are pooled; a viewport change typically issues several
    /// requests to the same handful of hosts.
    pub fn with_options(timeout: Duration, user_agent: &str) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .pool_max_idle_per_host(16)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| SourceError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        trace!(url = url, "HTTP GET request starting");

        let response = match self.client.get(url).send().await {
            Ok(resp) => {
                debug!(
                    url = url,
                    status = resp.status().as_u16(),
                    "HTTP response received"
                );
                resp
            }
            Err(e) => {
                warn!(
                    url = url,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "HTTP request failed"
                );
                return Err(SourceError::Http(format!("Request failed: {}", e)));
            }
        };

        if !response.status().is_success() {
            warn!(
                url = url,
                status = response.status().as_u16(),
                "HTTP error status"
            );
            return Err(SourceError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        match response.bytes().await {
            Ok(bytes) => {
                trace!(url = url, bytes = bytes.len(), "HTTP response body read");
                Ok(bytes.to_vec())
            }
            Err(e) => {
                warn!(url = url, error = %e, "Failed to read response body");
                Err(SourceError::Http(format!("Failed to read response: {}", e)))
            }
        }
    }
}

impl<T: AsyncHttpClient> AsyncHttpClient for Arc<T> {
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, SourceError>> + Send {
        (**self).get(url)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock async HTTP client routing on URL substrings.
    ///
    /// The first route whose pattern occurs in the URL answers; unmatched
    /// URLs get a 404.
    #[derive(Clone, Default)]
    pub struct MockAsyncHttpClient {
        routes: Vec<(String, Result<Vec<u8>, SourceError>)>,
        requests: Arc<Mutex<Vec<String>>>,
    }

    impl MockAsyncHttpClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn route(mut self, pattern: &str, response: Result<Vec<u8>, SourceError>) -> Self {
            self.routes.push((pattern.to_string(), response));
            self
        }

        pub fn json(self, pattern: &str, body: serde_json::Value) -> Self {
            self.route(pattern, Ok(body.to_string().into_bytes()))
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl AsyncHttpClient for MockAsyncHttpClient {
        async fn get(&self, url: &str) -> Result<Vec<u8>, SourceError> {
            self.requests.lock().unwrap().push(url.to_string());
            self.routes
                .iter()
                .find(|(pattern, _)| url.contains(pattern.as_str()))
                .map(|(_, response)| response.clone())
                .unwrap_or_else(|| {
                    Err(SourceError::Status {
                        status: 404,
                        url: url.to_string(),
                    })
                })
        }
    }

    #[tokio::test]
    async fn test_mock_async_client_routes() {
        let mock = MockAsyncHttpClient::new()
            .route("/a", Ok(vec![1, 2, 3]))
            .route("/b", Err(SourceError::Http("Test error".to_string())));

        assert_eq!(mock.get("http://example.com/a").await.unwrap(), vec![1, 2, 3]);
        assert!(mock.get("http://example.com/b").await.is_err());
        assert!(matches!(
            mock.get("http://example.com/c").await,
            Err(SourceError::Status { status: 404, .. })
        ));
        assert_eq!(mock.requests().len(), 3);
    }

    #[test]
    fn test_reqwest_client_builds() {
        assert!(AsyncReqwestClient::with_options(Duration::from_secs(5), "test-agent").is_ok());
    }

    #[test]
    fn test_default_user_agent() {
        assert!(DEFAULT_USER_AGENT.starts_with("fclayer/"));
    }
}
