// src/extract/html.rs
// =============================================================================
// This module pulls the pieces we need out of an HTML page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// scraper's Html type is not Send, so everything here is synchronous and
// returns owned data. The async extractor never holds a parsed document
// across an .await.
// =============================================================================

use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::warn;
use url::Url;

use super::filter::normalize_url;

static SCRIPT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script").expect("script selector is valid"));
static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector is valid"));

/// The scripts of one page, split by where their code lives.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PageScripts {
    /// Text of every <script> without a src attribute.
    pub inline: Vec<String>,
    /// Raw src attribute of every external <script>, unresolved.
    pub sources: Vec<String>,
}

pub fn collect_scripts(html: &str) -> PageScripts {
    let document = Html::parse_document(html);
    let mut scripts = PageScripts::default();

    for element in document.select(&SCRIPT_SELECTOR) {
        match element.value().attr("src") {
            Some(src) => scripts.sources.push(src.to_string()),
            None => scripts.inline.push(element.text().collect()),
        }
    }

    scripts
}

// Extracts every http(s) link from the page's <a href> tags
//
// Parameters:
//   html: the HTML content to parse
//   base_url: the URL of the page (for resolving relative links)
//
// Returns: absolute URLs, deduplicated, in document order
//
// Example:
//   html = "<a href='/docs'>Docs</a>"
//   base_url = "https://example.com"
//   result = ["https://example.com/docs"]
pub fn extract_anchor_links(html: &str, base_url: &str) -> Vec<String> {
    let mut links = Vec::new();

    let base = match Url::parse(base_url) {
        Ok(url) => url,
        Err(e) => {
            warn!(base_url, error = %e, "invalid base URL, cannot resolve links");
            return links;
        }
    };

    let document = Html::parse_document(html);
    let mut seen = HashSet::new();

    for element in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(absolute) = normalize_url(&base, href.trim()) else {
            continue;
        };

        // Only pages we can actually fetch in the next hop
        if !matches!(absolute.scheme(), "http" | "https") {
            continue;
        }

        let absolute = String::from(absolute);
        if seen.insert(absolute.clone()) {
            links.push(absolute);
        }
    }

    links
}
