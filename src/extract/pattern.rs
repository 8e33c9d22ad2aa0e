// src/extract/pattern.rs
// =============================================================================
// The one regular expression the whole harvester is built around.
//
// Instead of parsing JavaScript, we scan raw text for quoted string literals
// that look like URLs or paths. A candidate must sit between quotes (" or ')
// and match one of four shapes:
//
//   1. absolute URL            "https://api.example.com/v1", "//cdn.x.io/a"
//   2. root/dot relative path  "/api/login", "./conf", "../up"
//   3. path ending in a file   "static/app/main.js", "do/login.action?x=1"
//   4. bare known filename     "config.json", "index.php?id=1"
//
// This is purely lexical: a match is a string that LOOKS like a URL, nothing
// more. Normalisation and filtering happen in filter.rs.
// =============================================================================

use regex::Regex;
use std::sync::LazyLock;

// Verbose mode ignores whitespace even inside classes, so a literal space
// is spelled \x20
const URL_PATTERN_SOURCE: &str = r#"(?x)
    (?:"|')                                 # opening quote
    (
        (?:[a-zA-Z]{1,10}://|//)            # scheme or protocol-relative
        [^"'/]+\.                           # host
        [a-zA-Z]{2,}[^"']*                  # tld and anything after it
      |
        (?:/|\.\./|\./)                     # /, ../ or ./
        [^"'><,;|\x20*()(%%$^/\\\[\]]       # first char after the prefix
        [^"'><,;|()]+                       # the rest of the path
      |
        [a-zA-Z0-9_\-/]+/                   # directories
        [a-zA-Z0-9_\-/]+                    # file name
        \.(?:[a-zA-Z]{1,4}|action)          # extension
        (?:[\?|/][^"|']*|)                  # query string or trailing path
      |
        [a-zA-Z0-9_\-]+                     # bare file name
        \.(?:php|asp|aspx|jsp|json|action|html|js|txt|xml)
        (?:\?[^"|']*|)                      # query string
    )
    (?:"|')                                 # closing quote
"#;

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(URL_PATTERN_SOURCE).expect("URL pattern is valid"));

/// Lazily yields every quoted URL-like literal in `text`, quotes stripped.
///
/// The iterator borrows `text`; calling this again on the same text yields
/// the same sequence.
pub fn find_candidates(text: &str) -> impl Iterator<Item = &str> + '_ {
    URL_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(text: &str) -> Vec<&str> {
        find_candidates(text).collect()
    }

    #[test]
    fn test_absolute_urls() {
        let js = r#"var a = "https://api.example.com/v1/users"; b = '//cdn.example.com/lib';"#;
        assert_eq!(
            candidates(js),
            vec!["https://api.example.com/v1/users", "//cdn.example.com/lib"]
        );
    }

    #[test]
    fn test_relative_paths() {
        let js = r#"fetch("/api/v1/login"); load('./conf/app'); up("../admin/panel")"#;
        assert_eq!(
            candidates(js),
            vec!["/api/v1/login", "./conf/app", "../admin/panel"]
        );
    }

    #[test]
    fn test_paths_with_extensions() {
        let js = r#"x = "static/app/main.js"; y = "user/login.action?next=1""#;
        assert_eq!(
            candidates(js),
            vec!["static/app/main.js", "user/login.action?next=1"]
        );
    }

    #[test]
    fn test_bare_filenames() {
        let js = r#"get("config.json"); get('index.php?id=3'); get("notes.md")"#;
        assert_eq!(candidates(js), vec!["config.json", "index.php?id=3"]);
    }

    #[test]
    fn test_requires_quotes() {
        assert!(candidates("fetch(/api/v1/login)").is_empty());
        assert!(candidates("see https://example.com/docs for more").is_empty());
    }

    #[test]
    fn test_plain_strings_are_ignored() {
        let js = r#"msg = "hello world"; lang = "en"; sep = "/"; mail = "mailto:a@b.com""#;
        assert!(candidates(js).is_empty());
    }

    #[test]
    fn test_quotes_are_stripped() {
        for found in candidates(r#"'/a/b' "/c/d" "https://x.io/e""#) {
            assert!(!found.starts_with('"') && !found.starts_with('\''));
            assert!(!found.ends_with('"') && !found.ends_with('\''));
        }
    }

    #[test]
    fn test_matching_is_repeatable() {
        let html = r#"<a href="/about">About</a><script src="/js/app.js"></script>"#;
        let first = candidates(html);
        let second = candidates(html);
        assert_eq!(first, vec!["/about", "/js/app.js"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_is_case_sensitive_on_extensions() {
        assert!(candidates(r#""CONFIG.JSON""#).is_empty());
    }
}
