// src/extract/filter.rs
// =============================================================================
// Turning raw pattern matches into endpoint URLs.
//
// Steps, in order:
// 1. Drop blocked references (javascript:, mailto:, tel:, #fragment)
// 2. Resolve against the page URL, like a browser resolves an href
// 3. Drop static resources (images, fonts, stylesheets, scripts, ...)
// 4. Keep only URLs on the seed's domain family (or with no host at all)
// 5. Deduplicate, keeping the first occurrence
//
// The same domain logic drives subdomain collection, so it lives here too.
// =============================================================================

use std::collections::{BTreeSet, HashSet};
use tracing::debug;
use url::Url;

/// References that never point at an endpoint.
pub const BLOCKED_PREFIXES: [&str; 4] = ["javascript:", "mailto:", "tel:", "#"];

/// Path suffixes of static resources, compared against the lowercased path.
pub const STATIC_EXTENSIONS: [&str; 14] = [
    ".png", ".jpg", ".jpeg", ".gif", ".css", ".js", ".svg", ".ico", ".woff", ".woff2", ".ttf",
    ".eot", ".vue", ".exe",
];

/// How a host is compared against the seed's main domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// The host is the main domain or one of its subdomains:
    /// `example.com` and `api.example.com` match, `evilexample.com` does not.
    #[default]
    LabelSuffix,
    /// The main domain appears anywhere in the host. Looser, and also
    /// accepts lookalikes such as `evilexample.com`.
    Substring,
}

impl MatchMode {
    pub fn matches(self, main_domain: &str, host: &str) -> bool {
        match self {
            MatchMode::LabelSuffix => {
                host == main_domain
                    || host
                        .strip_suffix(main_domain)
                        .is_some_and(|prefix| prefix.ends_with('.'))
            }
            MatchMode::Substring => host.contains(main_domain),
        }
    }
}

/// The parts of a URL's host we care about.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DomainInfo {
    /// Lowercased host, empty when the URL has none.
    pub full_domain: String,
    /// Last two dot-separated labels of the host.
    pub main_domain: String,
    pub scheme: String,
}

impl DomainInfo {
    pub fn from_url(url: &Url) -> Self {
        let full_domain = url.host_str().unwrap_or_default().to_ascii_lowercase();
        let main_domain = main_domain_of(&full_domain);

        Self {
            full_domain,
            main_domain,
            scheme: url.scheme().to_string(),
        }
    }

    /// Like `from_url`, for strings. Protocol-relative references
    /// (`//host/path`) are read as http; anything unparseable has no domain.
    pub fn parse(raw: &str) -> Self {
        let parsed = if raw.starts_with("//") {
            Url::parse(&format!("http:{raw}"))
        } else {
            Url::parse(raw)
        };

        match parsed {
            Ok(url) => Self::from_url(&url),
            Err(_) => Self::default(),
        }
    }
}

// "a.b.example.com" -> "example.com"; hosts with fewer than two labels stay as they are
fn main_domain_of(host: &str) -> String {
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() >= 2 {
        labels[labels.len() - 2..].join(".")
    } else {
        host.to_string()
    }
}

/// Resolve a raw match against the page it was found on.
///
/// Returns None for blocked references and for anything that does not
/// resolve to a valid URL.
pub fn normalize_url(base: &Url, raw: &str) -> Option<Url> {
    if BLOCKED_PREFIXES.iter().any(|prefix| raw.starts_with(prefix)) {
        return None;
    }

    match base.join(raw) {
        Ok(url) => Some(url),
        Err(e) => {
            debug!(base = %base, raw, error = %e, "could not resolve reference");
            None
        }
    }
}

/// False for static resources and for paths containing '@'.
pub fn is_valid_endpoint(url: &Url) -> bool {
    let path = url.path().to_lowercase();

    if STATIC_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        return false;
    }

    !path.contains('@')
}

/// Whether a resolved URL belongs to the seed's domain family.
/// URLs without a host are kept.
pub fn in_scope(seed: &DomainInfo, candidate: &Url, mode: MatchMode) -> bool {
    let candidate = DomainInfo::from_url(candidate);
    candidate.full_domain.is_empty() || mode.matches(&seed.main_domain, &candidate.full_domain)
}

/// Runs the full normalise/filter/dedup chain over the raw matches found
/// on `page_url`, preserving first-seen order.
pub fn scope_candidates<'a, I>(page_url: &Url, raw_matches: I, mode: MatchMode) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let seed = DomainInfo::from_url(page_url);
    let mut seen = HashSet::new();
    let mut kept = Vec::new();

    for raw in raw_matches {
        let Some(resolved) = normalize_url(page_url, raw) else {
            continue;
        };
        if !is_valid_endpoint(&resolved) || !in_scope(&seed, &resolved, mode) {
            continue;
        }

        let resolved = String::from(resolved);
        if seen.insert(resolved.clone()) {
            kept.push(resolved);
        }
    }

    kept
}

/// Sorted, unique hosts of every URL on `base_url`'s domain family.
pub fn subdomains<'a, I>(urls: I, base_url: &str, mode: MatchMode) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let base = DomainInfo::parse(base_url);

    urls.into_iter()
        .map(DomainInfo::parse)
        .filter(|info| {
            !info.full_domain.is_empty() && mode.matches(&base.main_domain, &info.full_domain)
        })
        .map(|info| info.full_domain)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
