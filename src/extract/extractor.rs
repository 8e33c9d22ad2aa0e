// src/extract/extractor.rs
// =============================================================================
// The per-page pipeline: fetch a page, scan it (and optionally its external
// scripts) with the URL pattern, then normalise and filter what we found.
//
// One Extractor is created per run and shared by every worker through an
// Arc. It owns the set of pages already fetched for link discovery, so that
// set lives exactly as long as the run does.
// =============================================================================

use dashmap::DashSet;
use futures::future::join_all;
use tracing::{debug, info, warn};
use url::Url;

use super::filter::{normalize_url, scope_candidates, MatchMode};
use super::html::{collect_scripts, extract_anchor_links};
use super::pattern::find_candidates;
use crate::fetch::{Fetcher, PageInfo};

/// What one processed URL produced.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    pub page_info: PageInfo,
    /// Normalised in-scope endpoint URLs, first-seen order, no duplicates.
    pub urls: Vec<String>,
}

pub struct Extractor {
    fetcher: Fetcher,
    match_mode: MatchMode,
    // Pages already fetched for link discovery during this run
    processed: DashSet<String>,
}

impl Extractor {
    pub fn new(fetcher: Fetcher, match_mode: MatchMode) -> Self {
        Self {
            fetcher,
            match_mode,
            processed: DashSet::new(),
        }
    }

    pub fn match_mode(&self) -> MatchMode {
        self.match_mode
    }

    /// Analyze `url` and harvest endpoint URLs from it.
    ///
    /// Pages without content (failed or non-200) yield an empty URL list
    /// alongside their PageInfo.
    pub async fn extract(&self, url: &str, include_external_scripts: bool) -> ExtractionResult {
        info!(url, "processing");

        let page_info = self.fetcher.analyze(url).await;
        let urls = match page_info.content.as_deref() {
            Some(content) => self.harvest(url, content, include_external_scripts).await,
            None => Vec::new(),
        };

        info!(url, found = urls.len(), "extraction finished");
        ExtractionResult { page_info, urls }
    }

    async fn harvest(&self, url: &str, content: &str, include_external_scripts: bool) -> Vec<String> {
        let page_url = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(url, error = %e, "cannot resolve matches against an invalid page URL");
                return Vec::new();
            }
        };

        let scripts = collect_scripts(content);
        let mut raw: Vec<String> = Vec::new();

        for inline in &scripts.inline {
            raw.extend(find_candidates(inline).map(str::to_owned));
        }

        if include_external_scripts {
            let script_urls: Vec<Url> = scripts
                .sources
                .iter()
                .filter_map(|src| normalize_url(&page_url, src))
                .collect();
            debug!(url, scripts = script_urls.len(), "fetching external scripts");

            let bodies = join_all(script_urls.iter().map(|src| self.fetcher.fetch(src.as_str()))).await;
            for body in bodies.into_iter().flatten() {
                raw.extend(find_candidates(&body).map(str::to_owned));
            }
        }

        // Catch-all pass over the whole page
        raw.extend(find_candidates(content).map(str::to_owned));

        scope_candidates(&page_url, raw.iter().map(String::as_str), self.match_mode)
    }

    /// Absolute http(s) links of a page, for one extra hop in deep mode.
    ///
    /// A page is fetched at most once per run; asking again returns nothing.
    pub async fn links(&self, url: &str) -> Vec<String> {
        if !self.processed.insert(url.to_string()) {
            debug!(url, "already fetched for links, skipping");
            return Vec::new();
        }

        match self.fetcher.fetch(url).await {
            Some(content) => extract_anchor_links(&content, url),
            None => Vec::new(),
        }
    }
}
