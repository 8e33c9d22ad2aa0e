// src/fetch/client.rs
// =============================================================================
// The HTTP fetcher every other part of the harvester goes through.
//
// What it does:
// - One shared reqwest Client (connection pooling) with a fixed browser
//   User-Agent and an optional Cookie header set once at construction
// - 10 second timeout per request, certificate validation disabled
//   (recon targets often run self-signed or expired certificates)
// - Transparent retries with exponential backoff on 429/500/502/503/504,
//   connection errors and timeouts
//
// Callers pick between two entry points:
// - get():   the raw outcome (final status + body), used by the page analyzer
// - fetch(): "body or nothing", failures are logged and swallowed
// =============================================================================

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::error::FetchError;

/// The User-Agent every request is sent with.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

// Statuses that are worth asking again for
const RETRY_STATUSES: [StatusCode; 5] = [
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

/// Knobs for the HTTP layer.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Timeout for a single request (each retry gets its own).
    pub timeout: Duration,
    /// How many times a retryable failure is retried before giving up.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for every retry after that.
    pub backoff_base: Duration,
    pub user_agent: String,
    /// Raw Cookie header value, sent with every request when present.
    pub cookie: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_retries: 3,
            backoff_base: Duration::from_secs(1),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cookie: None,
        }
    }
}

/// What came back from a GET once the retry policy was done with it.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    /// 2xx and 3xx count as a usable response.
    pub fn is_usable(&self) -> bool {
        (200..400).contains(&self.status)
    }
}

// Cloning a Fetcher is cheap: reqwest::Client is reference counted inside
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = &config.cookie {
            let value = HeaderValue::from_str(cookie)
                .context("cookie contains characters that are not allowed in a header")?;
            headers.insert(COOKIE, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(true)
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self { client, config })
    }

    /// GET a URL, retrying retryable failures, and return the final status
    /// with its body.
    ///
    /// A retryable status that is still there after the last retry is an
    /// error (`FetchError::Status`); any other status is returned as is.
    pub async fn get(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let target = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let mut attempt: u32 = 0;
        loop {
            match self.client.get(target.clone()).send().await {
                Ok(response) => {
                    let status = response.status();
                    if RETRY_STATUSES.contains(&status) {
                        if attempt >= self.config.max_retries {
                            return Err(FetchError::Status(status.as_u16()));
                        }
                        let delay = self.backoff(attempt);
                        warn!(
                            url,
                            status = status.as_u16(),
                            attempt = attempt + 1,
                            backoff_ms = delay.as_millis() as u64,
                            "retryable status, backing off"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }

                    let body = response.text().await?;
                    debug!(url, status = status.as_u16(), bytes = body.len(), "fetched");
                    return Ok(FetchedPage {
                        status: status.as_u16(),
                        body,
                    });
                }
                Err(e) if (e.is_connect() || e.is_timeout()) && attempt < self.config.max_retries => {
                    let delay = self.backoff(attempt);
                    warn!(
                        url,
                        error = %e,
                        attempt = attempt + 1,
                        backoff_ms = delay.as_millis() as u64,
                        "request failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// GET a URL and return its body, or None when anything went wrong.
    ///
    /// Failures are logged as warnings here so callers can simply skip
    /// the URL.
    pub async fn fetch(&self, url: &str) -> Option<String> {
        match self.get(url).await {
            Ok(page) if page.is_usable() => Some(page.body),
            Ok(page) => {
                warn!(url, error = %FetchError::Status(page.status), "failed to fetch");
                None
            }
            Err(e) => {
                warn!(url, error = %e, "failed to fetch");
                None
            }
        }
    }

    // base, 2*base, 4*base, ...
    fn backoff(&self, attempt: u32) -> Duration {
        self.config
            .backoff_base
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_fetcher(cookie: Option<&str>) -> Fetcher {
        Fetcher::new(FetchConfig {
            backoff_base: Duration::from_millis(5),
            cookie: cookie.map(String::from),
            ..FetchConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&server)
            .await;

        let body = fast_fetcher(None)
            .fetch(&format!("{}/page", server.uri()))
            .await;
        assert_eq!(body.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_fetch_client_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let body = fast_fetcher(None)
            .fetch(&format!("{}/missing", server.uri()))
            .await;
        assert!(body.is_none());
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let server = MockServer::start().await;
        // Mounted first, so it answers the first two requests
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
            .mount(&server)
            .await;

        let page = fast_fetcher(None)
            .get(&format!("{}/flaky", server.uri()))
            .await
            .unwrap();
        assert_eq!(page.status, 200);
        assert_eq!(page.body, "recovered");
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(4)
            .mount(&server)
            .await;

        let fetcher = fast_fetcher(None);
        let url = format!("{}/down", server.uri());

        let result = fetcher.get(&url).await;
        assert!(matches!(result, Err(FetchError::Status(503))));
    }

    #[tokio::test]
    async fn test_timeouts_are_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("second try"))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(FetchConfig {
            timeout: Duration::from_millis(200),
            backoff_base: Duration::from_millis(5),
            ..FetchConfig::default()
        })
        .unwrap();

        let body = fetcher.fetch(&format!("{}/slow", server.uri())).await;
        assert_eq!(body.as_deref(), Some("second try"));
    }

    #[tokio::test]
    async fn test_cookie_and_user_agent_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("cookie", "session=abc"))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(200).set_body_string("authed"))
            .mount(&server)
            .await;

        let body = fast_fetcher(Some("session=abc"))
            .fetch(&server.uri())
            .await;
        assert_eq!(body.as_deref(), Some("authed"));
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected_without_a_request() {
        let result = fast_fetcher(None).get("not a url").await;
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }

    #[test]
    fn test_backoff_doubles() {
        let fetcher = fast_fetcher(None);
        assert_eq!(fetcher.backoff(0), Duration::from_millis(5));
        assert_eq!(fetcher.backoff(1), Duration::from_millis(10));
        assert_eq!(fetcher.backoff(2), Duration::from_millis(20));
    }
}
