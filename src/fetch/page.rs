// src/fetch/page.rs
// =============================================================================
// Page analysis: fetch a URL once and record what we learned about it.
//
// A PageInfo is produced for every URL we process, even when the request
// fails, so the final report can list every page with its status, title
// and size.
// =============================================================================

use scraper::{Html, Selector};
use serde::Serialize;
use std::sync::LazyLock;
use tracing::warn;

use super::Fetcher;

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("title selector is valid"));

/// Title used when the page has no usable <title>.
pub const NO_TITLE: &str = "No title";
/// Title used when the page could not be fetched at all.
pub const ERROR_TITLE: &str = "Error";

/// Everything we record about one fetched page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageInfo {
    pub url: String,
    /// HTTP status of the final response, 0 when no response arrived.
    pub status_code: u16,
    pub title: String,
    /// Body length in characters.
    pub content_length: usize,
    /// The body, kept only for 200 responses.
    #[serde(skip_serializing)]
    pub content: Option<String>,
}

impl PageInfo {
    /// The record for a URL that never produced a response.
    pub fn failed(url: &str) -> Self {
        Self {
            url: url.to_string(),
            status_code: 0,
            title: ERROR_TITLE.to_string(),
            content_length: 0,
            content: None,
        }
    }

    /// True when a server actually answered.
    pub fn responded(&self) -> bool {
        self.status_code > 0
    }
}

impl Fetcher {
    /// Fetch a page and build its PageInfo. Never fails: transport errors
    /// become a `PageInfo::failed` record.
    pub async fn analyze(&self, url: &str) -> PageInfo {
        match self.get(url).await {
            Ok(page) => {
                let title = extract_title(&page.body);
                let content_length = page.body.chars().count();
                let content = (page.status == 200).then_some(page.body);

                PageInfo {
                    url: url.to_string(),
                    status_code: page.status,
                    title,
                    content_length,
                    content,
                }
            }
            Err(e) => {
                warn!(url, error = %e, "failed to analyze page");
                PageInfo::failed(url)
            }
        }
    }
}

/// The trimmed text of the document's <title>, or "No title".
pub fn extract_title(html: &str) -> String {
    let document = Html::parse_document(html);

    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|title| title.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| NO_TITLE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_extract_title() {
        let html = "<html><head><title>  Admin Portal </title></head></html>";
        assert_eq!(extract_title(html), "Admin Portal");
    }

    #[test]
    fn test_missing_or_empty_title() {
        assert_eq!(extract_title("<html><body>hi</body></html>"), NO_TITLE);
        assert_eq!(extract_title("<title>   </title>"), NO_TITLE);
        assert_eq!(extract_title("var x = 1;"), NO_TITLE);
    }

    #[tokio::test]
    async fn test_analyze_ok_page_keeps_content() {
        let server = MockServer::start().await;
        let body = "<title>Home</title><p>héllo</p>";
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(FetchConfig::default()).unwrap();
        let url = format!("{}/", server.uri());
        let info = fetcher.analyze(&url).await;

        assert_eq!(info.url, url);
        assert_eq!(info.status_code, 200);
        assert_eq!(info.title, "Home");
        assert_eq!(info.content_length, body.chars().count());
        assert_eq!(info.content.as_deref(), Some(body));
    }

    #[tokio::test]
    async fn test_analyze_non_200_drops_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("<title>Not Found</title>"))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(FetchConfig::default()).unwrap();
        let info = fetcher.analyze(&format!("{}/gone", server.uri())).await;

        assert_eq!(info.status_code, 404);
        assert_eq!(info.title, "Not Found");
        assert!(info.content.is_none());
        assert!(info.responded());
    }

    #[tokio::test]
    async fn test_analyze_exhausted_retries_is_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("<title>Busy</title>"))
            .expect(4)
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(FetchConfig {
            backoff_base: std::time::Duration::from_millis(5),
            ..FetchConfig::default()
        })
        .unwrap();
        let url = format!("{}/busy", server.uri());
        let info = fetcher.analyze(&url).await;

        assert_eq!(info, PageInfo::failed(&url));
        assert_eq!(info.status_code, 0);
        assert_eq!(info.title, ERROR_TITLE);
    }

    #[tokio::test]
    async fn test_analyze_unreachable_page() {
        let fetcher = Fetcher::new(FetchConfig::default()).unwrap();
        let info = fetcher.analyze("definitely not a url").await;

        assert_eq!(info, PageInfo::failed("definitely not a url"));
        assert_eq!(info.title, ERROR_TITLE);
        assert!(!info.responded());
    }

    #[test]
    fn test_content_is_not_serialized() {
        let mut info = PageInfo::failed("https://example.com/");
        info.content = Some("secret body".to_string());
        let json = serde_json::to_string(&info).unwrap();
        assert!(!json.contains("secret body"));
        assert!(json.contains("\"status_code\":0"));
    }
}
