//! Remote data fetcher.
//!
//! Performs one GET against an [`Endpoint`] and reports the raw body and
//! status. There are no retries; a request timeout applies only when the
//! caller configures one on the builder.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::{AdapterError, Endpoint};

/// Result of one fetch.
///
/// A transport failure has neither status nor body. A completed request
/// always has a status; the body is `None` when the server sent nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code, if a response was received.
    pub status: Option<u16>,
    /// Response body, if a non-empty one was received.
    pub body: Option<String>,
}

impl FetchResponse {
    /// A response for a request that never completed.
    pub fn failed() -> Self {
        Self::default()
    }

    /// A response with a status and body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        Self {
            status: Some(status),
            body: if body.trim().is_empty() { None } else { Some(body) },
        }
    }

    /// Whether the server answered with a 2xx status.
    pub fn is_success(&self) -> bool {
        matches!(self.status, Some(200..=299))
    }

    /// Whether the server refused the credentials with 403.
    pub fn is_forbidden(&self) -> bool {
        self.status == Some(403)
    }

    /// The body of a successful response.
    ///
    /// Error responses are treated as carrying no data.
    pub fn into_payload(self) -> Option<String> {
        if self.is_success() {
            self.body
        } else {
            None
        }
    }
}

/// Performs the network call for a polling controller.
#[async_trait]
pub trait Fetcher: Send + Sync + Debug {
    /// GET the endpoint's resource once.
    async fn fetch(&self, endpoint: &dyn Endpoint) -> FetchResponse;
}

/// [`Fetcher`] backed by a reqwest client.
///
/// # Example
///
/// ```rust,no_run
/// use xmrwatch_adapters::{Fetcher, HttpFetcher, SummaryEndpoint};
/// use xmrwatch_types::ConnectionConfig;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let fetcher = HttpFetcher::builder().build()?;
///     let endpoint = SummaryEndpoint::new(ConnectionConfig::new("http://localhost:8080"));
///
///     let response = fetcher.fetch(&endpoint).await;
///     println!("status: {:?}", response.status);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a new builder for configuring the fetcher.
    pub fn builder() -> HttpFetcherBuilder {
        HttpFetcherBuilder::default()
    }

    async fn try_fetch(&self, endpoint: &dyn Endpoint) -> Result<FetchResponse, AdapterError> {
        let mut request = self.client.get(endpoint.resource());
        if let Some(token) = endpoint.bearer_token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();

        // Keep the status even if the body is lost
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(
                    "GET {} -> {}: reading body failed: {}",
                    endpoint.resource(),
                    status,
                    AdapterError::from(e)
                );
                String::new()
            }
        };

        Ok(FetchResponse::new(status, body))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, endpoint: &dyn Endpoint) -> FetchResponse {
        match self.try_fetch(endpoint).await {
            Ok(response) => {
                debug!(
                    "GET {} -> {:?} ({} bytes)",
                    endpoint.resource(),
                    response.status,
                    response.body.as_ref().map_or(0, String::len)
                );
                response
            }
            Err(e) => {
                warn!("GET {} failed: {}", endpoint.resource(), e);
                FetchResponse::failed()
            }
        }
    }
}

/// Builder for HttpFetcher.
#[derive(Debug, Default)]
pub struct HttpFetcherBuilder {
    timeout: Option<Duration>,
    no_proxy: bool,
}

impl HttpFetcherBuilder {
    /// Set a request timeout (default: none).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Ignore proxies configured in the environment.
    pub fn no_proxy(mut self) -> Self {
        self.no_proxy = true;
        self
    }

    /// Build the fetcher.
    pub fn build(self) -> Result<HttpFetcher, AdapterError> {
        let mut builder = Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if self.no_proxy {
            builder = builder.no_proxy();
        }

        Ok(HttpFetcher {
            client: builder.build()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SummaryEndpoint;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;
    use xmrwatch_types::ConnectionConfig;

    /// Serve exactly one HTTP response on a loopback port.
    ///
    /// Returns the base address and a handle resolving to the raw request.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        serve_raw(response).await
    }

    /// Like [`serve_once`], but writes `response` verbatim.
    async fn serve_raw(response: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }

            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;

            String::from_utf8_lossy(&request).to_string()
        });

        (format!("http://{}", addr), handle)
    }

    fn fetcher() -> HttpFetcher {
        HttpFetcher::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap()
    }

    #[test]
    fn test_response_payload() {
        assert_eq!(FetchResponse::new(200, "{}").into_payload(), Some("{}".to_string()));
        assert_eq!(FetchResponse::new(403, "{}").into_payload(), None);
        assert_eq!(FetchResponse::new(200, "  ").into_payload(), None);
        assert_eq!(FetchResponse::failed().into_payload(), None);
    }

    #[test]
    fn test_forbidden() {
        assert!(FetchResponse::new(403, "").is_forbidden());
        assert!(!FetchResponse::new(401, "").is_forbidden());
        assert!(!FetchResponse::failed().is_forbidden());
    }

    #[tokio::test]
    async fn test_fetch_sends_bearer_token() {
        let (address, server) = serve_once("200 OK", r#"{"algo":"rx/0"}"#).await;
        let endpoint = SummaryEndpoint::new(ConnectionConfig::new(address).with_token("secret"));

        let response = fetcher().fetch(&endpoint).await;
        let request = server.await.unwrap().to_lowercase();

        assert_eq!(response.status, Some(200));
        assert_eq!(response.body.as_deref(), Some(r#"{"algo":"rx/0"}"#));
        assert!(request.starts_with("get /2/summary http/1.1"));
        assert!(request.contains("authorization: bearer secret"));
    }

    #[tokio::test]
    async fn test_fetch_without_token_has_no_auth_header() {
        let (address, server) = serve_once("200 OK", "{}").await;
        let endpoint = SummaryEndpoint::new(ConnectionConfig::new(address));

        let response = fetcher().fetch(&endpoint).await;
        let request = server.await.unwrap().to_lowercase();

        assert!(response.is_success());
        assert!(!request.contains("authorization:"));
    }

    #[tokio::test]
    async fn test_fetch_keeps_error_status() {
        let (address, server) =
            serve_once("403 Forbidden", r#"{"status":403,"error":"Forbidden"}"#).await;
        let endpoint = SummaryEndpoint::new(ConnectionConfig::new(address));

        let response = fetcher().fetch(&endpoint).await;
        server.await.unwrap();

        assert!(response.is_forbidden());
        assert!(response.body.is_some());
        assert_eq!(response.into_payload(), None);
    }

    #[tokio::test]
    async fn test_truncated_body_keeps_status() {
        let truncated = "HTTP/1.1 403 Forbidden\r\nContent-Length: 100\r\nConnection: close\r\n\r\n{\"err".to_string();
        let (address, server) = serve_raw(truncated).await;
        let endpoint = SummaryEndpoint::new(ConnectionConfig::new(address));

        let response = fetcher().fetch(&endpoint).await;
        server.await.unwrap();

        assert_eq!(response.status, Some(403));
        assert_eq!(response.body, None);
        assert!(response.is_forbidden());
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        // Bind and drop to get a port with nothing listening
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let endpoint = SummaryEndpoint::new(ConnectionConfig::new(format!("http://{}", addr)));
        let response = fetcher().fetch(&endpoint).await;

        assert_eq!(response, FetchResponse::failed());
    }
}
