//! Static policy tables and path rules.
//!
//! Netloc matching is always by suffix (`cdn.ads.example.com` matches
//! `example.com`), path matching by prefix or, for the same-path table, by
//! equality.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::utils::pattern::compile_regex_unsafe;

/// Netloc suffixes that are never resolved.
pub const STATIC_BLACKLIST_NETLOC: &[&str] = &[
    "127.0.0.1",
    "a.adtng.com",
    "about:blank",
    "abv.bg",
    "adfox.ru",
    "cbox.ws",
    "googletagmanager.com",
    "javascript:false",
    "accounts.google.com",
];

/// Path suffixes of images, chat rooms and placeholder videos.
pub const BLACKLIST_ENDSWITH: &[&str] = &[
    ".gif",
    ".jpg",
    ".png",
    ".svg",
    ".vtt",
    "/chat.html",
    "/chat",
    "/novideo.mp4",
    "/vidthumb.mp4",
    "/ads-iframe-display.php",
];

const STATIC_BLACKLIST_PATH: &[(&str, &str)] = &[
    ("facebook.com", "/connect"),
    ("facebook.com", "/plugins"),
    ("google.com", "/recaptcha/"),
    ("youtube.com", "/["),
];

// Hosts whose bare embed path is handled by a dedicated resolver
const SAME_PATH_BLACKLIST: &[(&str, &str)] =
    &[("player.vimeo.com", "/video/"), ("youtube.com", "/embed/")];

/// Embed widget whose query carries the real media URL.
pub const EMBEDLY_NETLOC: &str = "cdn.embedly.com";
/// Path of the embed widget on [`EMBEDLY_NETLOC`].
pub const EMBEDLY_PATH: &str = "/widgets/media.html";

/// CDN hosts that require an `Origin` header.
pub const ORIGIN_SENSITIVE_SUFFIXES: &[&str] = &[".cloudfront.net"];

/// Hosts whose pages break when fetched with a `Referer`.
pub const REFERER_INCOMPATIBLE_HOSTS: &[&str] = &["dailymotion.com"];

const ADS_PATH_PATTERN: &str = r"/ads?/?(?:\w+)?(?:\d+x\d+)?(?:_\w+)?\.(?:html?|php)$";

static ADS_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(ADS_PATH_PATTERN, "ADS_PATH_RE"));

/// A (netloc suffix, path) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRule {
    /// Matched against the end of the URL netloc
    pub netloc: String,
    /// Matched against the start of (or all of) the URL path
    pub path: String,
}

impl PathRule {
    /// Creates a rule from its two parts.
    pub fn new(netloc: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            netloc: netloc.into(),
            path: path.into(),
        }
    }

    /// Netloc ends with the rule netloc and path starts with the rule path.
    pub fn matches_prefix(&self, url: &Url) -> bool {
        netloc(url).ends_with(&self.netloc) && url.path().starts_with(&self.path)
    }

    /// Netloc ends with the rule netloc and path equals the rule path.
    pub fn matches_exact(&self, url: &Url) -> bool {
        netloc(url).ends_with(&self.netloc) && url.path() == self.path
    }
}

/// `host[:port]` of a URL, empty for URLs without a host.
pub fn netloc(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        _ => String::new(),
    }
}

/// Built-in path deny rules.
pub fn static_blacklist_path() -> Vec<PathRule> {
    STATIC_BLACKLIST_PATH
        .iter()
        .map(|(netloc, path)| PathRule::new(*netloc, *path))
        .collect()
}

/// True if some rule matches `url` by netloc suffix and path prefix.
pub fn matches_any_prefix(rules: &[PathRule], url: &Url) -> bool {
    rules.iter().any(|rule| rule.matches_prefix(url))
}

/// True if `url` is one of the bare embed paths that must not be resolved here.
pub fn is_same_path_blacklisted(url: &Url) -> bool {
    SAME_PATH_BLACKLIST
        .iter()
        .any(|(netloc, path)| PathRule::new(*netloc, *path).matches_exact(url))
}

/// True for obvious ad pages: `/ad/...`/`/ads/...` HTML or PHP paths, or an
/// `ads.` host.
pub fn is_ads_url(url: &Url) -> bool {
    ADS_PATH_RE.is_match(url.path()) || netloc(url).starts_with("ads.")
}

/// True if the URL is served by a CDN that checks the `Origin` header.
pub fn is_origin_sensitive(url: &Url) -> bool {
    let netloc = netloc(url);
    ORIGIN_SENSITIVE_SUFFIXES
        .iter()
        .any(|suffix| netloc.ends_with(suffix))
}

/// True if the next page at `url` must be fetched without a `Referer`.
pub fn drops_referer(url: &str) -> bool {
    REFERER_INCOMPATIBLE_HOSTS.iter().any(|host| url.contains(host))
}

/// True if the raw entry names a path after its authority (`host/` counts,
/// bare `host` does not).
fn has_explicit_path(entry: &str) -> bool {
    let after_scheme = entry.split_once("//").map_or(entry, |(_, rest)| rest);
    after_scheme
        .find(&['/', '?', '#'][..])
        .is_some_and(|i| after_scheme[i..].starts_with('/'))
}

/// Appends user-supplied URL-like entries to `rules`.
///
/// Entries without a scheme get `http://`; `//host/path` entries are taken as
/// is. Entries lacking either a host or a path are dropped.
pub fn merge_path_list(mut rules: Vec<PathRule>, user: &[String]) -> Vec<PathRule> {
    for entry in user {
        let entry = entry.trim();
        let absolute = if entry.starts_with("//") {
            format!("http:{entry}")
        } else if entry.starts_with("http") {
            entry.to_string()
        } else {
            format!("http://{entry}")
        };
        if !has_explicit_path(&absolute) {
            log::debug!("Path rule without a path ignored: {entry}");
            continue;
        }
        match Url::parse(&absolute) {
            Ok(url) if url.host_str().is_some() => {
                rules.push(PathRule::new(netloc(&url), url.path()));
            }
            _ => log::debug!("Invalid path rule ignored: {entry}"),
        }
    }
    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_prefix_and_exact_matching() {
        let rule = PathRule::new("youtube.com", "/embed/");
        assert!(rule.matches_prefix(&url("https://www.youtube.com/embed/abc")));
        assert!(!rule.matches_exact(&url("https://www.youtube.com/embed/abc")));
        assert!(rule.matches_exact(&url("https://www.youtube.com/embed/")));
        assert!(!rule.matches_prefix(&url("https://youtube.community.net/embed/")));
    }

    #[test]
    fn test_static_blacklist_path() {
        let rules = static_blacklist_path();
        assert!(matches_any_prefix(&rules, &url("https://www.facebook.com/plugins/like.php")));
        assert!(matches_any_prefix(&rules, &url("https://www.google.com/recaptcha/api")));
        assert!(!matches_any_prefix(&rules, &url("https://www.facebook.com/video")));
    }

    #[test]
    fn test_merge_path_list() {
        let user = vec![
            "example.com/private/".to_string(),
            "https://cdn.example.net/x".to_string(),
            "//other.org/y".to_string(),
            "nopath.com".to_string(),
        ];
        let rules = merge_path_list(static_blacklist_path(), &user);
        assert_eq!(rules.len(), STATIC_BLACKLIST_PATH.len() + 3);
        assert_eq!(rules[4], PathRule::new("example.com", "/private/"));
        assert_eq!(rules[5], PathRule::new("cdn.example.net", "/x"));
        assert_eq!(rules[6], PathRule::new("other.org", "/y"));
    }

    #[test]
    fn test_ads_heuristic() {
        assert!(is_ads_url(&url("http://a.com/ads/banner300x250_top.html")));
        assert!(is_ads_url(&url("http://a.com/ad.php")));
        assert!(is_ads_url(&url("http://ads.example.com/player")));
        assert!(!is_ads_url(&url("http://a.com/ads/video.mp4")));
        assert!(!is_ads_url(&url("http://a.com/embed/1")));
    }

    #[test]
    fn test_same_path_blacklist() {
        assert!(is_same_path_blacklisted(&url("https://player.vimeo.com/video/")));
        assert!(!is_same_path_blacklisted(&url("https://player.vimeo.com/video/123")));
    }

    #[test]
    fn test_origin_sensitive() {
        assert!(is_origin_sensitive(&url("https://d1234.cloudfront.net/live.m3u8")));
        assert!(!is_origin_sensitive(&url("https://cloudfront.net.example.com/a")));
    }

    #[test]
    fn test_netloc_with_port() {
        assert_eq!(netloc(&url("http://a.com:8080/x")), "a.com:8080");
        assert_eq!(netloc(&url("http://a.com:80/x")), "a.com");
        assert_eq!(netloc(&url("about:blank")), "");
    }

    #[test]
    fn test_drops_referer() {
        assert!(drops_referer("https://www.dailymotion.com/embed/video/x7"));
        assert!(!drops_referer("https://player.example.com/embed/x7"));
    }
}
