// src/crawl/fetch.rs
// =============================================================================
// Page retrieval.
//
// The crawl loop only sees the Fetcher trait, so tests can swap in an
// in-memory site while the CLI uses HttpFetcher (reqwest).
//
// One request per URL, bounded by a timeout, no retries. Anything other than
// a 2xx response is a failure for that URL.
// =============================================================================

use crate::error::{CrawlError, FetchError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use std::time::Duration;

#[async_trait]
pub trait Fetcher {
    /// Returns the body of `url` as text.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

#[async_trait]
impl<T: Fetcher + Sync + ?Sized> Fetcher for &T {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        (**self).fetch(url).await
    }
}

/// reqwest-backed fetcher with a fixed user agent and timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, CrawlError> {
        let mut headers = HeaderMap::new();
        // An invalid header value only falls back to reqwest's default agent
        if let Ok(value) = HeaderValue::from_str(user_agent) {
            headers.insert(USER_AGENT, value);
        } else {
            tracing::warn!(user_agent, "ignoring user agent with invalid characters");
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(CrawlError::Client)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await.map_err(categorize_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response.text().await.map_err(categorize_error)
    }
}

// Sorts reqwest errors into the failure kinds we log
fn categorize_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_redirect() {
        FetchError::TooManyRedirects
    } else if error.is_connect() {
        FetchError::Connect(error.to_string())
    } else {
        FetchError::Request(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    // Local server that answers one connection with `response` (None = never
    // answer) and hands back the raw request it read.
    async fn serve_once(response: Option<&'static str>) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/page", listener.local_addr().unwrap());
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = stream.read(&mut buf).await.unwrap_or(0);
            let _ = tx.send(String::from_utf8_lossy(&buf[..n]).into_owned());

            match response {
                Some(response) => {
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                }
                // Hold the connection open without replying
                None => tokio::time::sleep(Duration::from_secs(30)).await,
            }
        });

        (url, rx)
    }

    #[test]
    fn test_client_builds_with_profile_defaults() {
        let fetcher = HttpFetcher::new(
            "IR-RAG-Networking-Project/1.0 (+course project)",
            Duration::from_secs(25),
        );
        assert!(fetcher.is_ok());
    }

    #[test]
    fn test_bad_user_agent_is_not_fatal() {
        assert!(HttpFetcher::new("bad\nagent", Duration::from_secs(1)).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_fetch_error() {
        let fetcher = HttpFetcher::new("test", Duration::from_millis(500)).unwrap();
        // Port 9 on localhost (discard) is closed in test environments
        let result = fetcher.fetch("http://127.0.0.1:9/").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_success_returns_body_and_sends_user_agent() {
        let (url, request) = serve_once(Some(
            "HTTP/1.1 200 OK\r\ncontent-type: text/html\r\ncontent-length: 13\r\nconnection: close\r\n\r\n<p>hello</p>\n",
        ))
        .await;
        let fetcher = HttpFetcher::new("topic-crawler-test/1.0", Duration::from_secs(5)).unwrap();

        let body = fetcher.fetch(&url).await.unwrap();

        assert_eq!(body, "<p>hello</p>\n");
        let request = request.await.unwrap().to_ascii_lowercase();
        assert!(request.contains("user-agent: topic-crawler-test/1.0"), "{request}");
    }

    #[tokio::test]
    async fn test_not_found_is_a_status_error() {
        let (url, _request) = serve_once(Some(
            "HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        ))
        .await;
        let fetcher = HttpFetcher::new("test", Duration::from_secs(5)).unwrap();

        let result = fetcher.fetch(&url).await;

        assert!(matches!(result, Err(FetchError::Status(404))), "{result:?}");
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let (url, _request) = serve_once(None).await;
        let fetcher = HttpFetcher::new("test", Duration::from_millis(200)).unwrap();

        let result = fetcher.fetch(&url).await;

        assert!(matches!(result, Err(FetchError::Timeout)), "{result:?}");
    }
}
