//! Request header construction.
//!
//! Page fetches look like a browser navigation: the usual `Accept` and
//! `Accept-Language` headers plus the `Referer` chained from the previous
//! attempt.

use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, REFERER, USER_AGENT,
};

use crate::config::{FALLBACK_ACCEPT_ENCODING, FALLBACK_USER_AGENT};

const PAGE_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
const PAGE_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Inserts `value` under `name` unless it is not a valid header value.
fn insert_header(headers: &mut HeaderMap, name: reqwest::header::HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(_) => log::warn!("Invalid value for header {}: {}", name, value),
    }
}

/// Headers for a page fetch, with an optional `Referer`.
pub fn page_headers(referer: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(PAGE_ACCEPT));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(PAGE_ACCEPT_LANGUAGE));
    if let Some(referer) = referer {
        insert_header(&mut headers, REFERER, referer);
    }
    headers
}

/// `headers` with the alternate `User-Agent` and `Accept-Encoding` used to
/// re-fetch a page whose body could not be decoded.
pub fn alternate_headers(headers: &HeaderMap) -> HeaderMap {
    let mut headers = headers.clone();
    headers.insert(USER_AGENT, HeaderValue::from_static(FALLBACK_USER_AGENT));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static(FALLBACK_ACCEPT_ENCODING));
    headers
}

/// Headers for manifest and stream requests: `Referer`, plus `Origin` when
/// the stream host requires it.
pub fn stream_headers(referer: &str, origin: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert_header(&mut headers, REFERER, referer);
    if let Some(origin) = origin {
        insert_header(&mut headers, reqwest::header::ORIGIN, origin);
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_headers_with_referer() {
        let headers = page_headers(Some("https://a.com/page"));
        assert_eq!(headers.get(REFERER).unwrap(), "https://a.com/page");
        assert!(headers.contains_key(ACCEPT));
        assert!(!page_headers(None).contains_key(REFERER));
    }

    #[test]
    fn test_invalid_referer_is_skipped() {
        let headers = page_headers(Some("https://a.com/\n"));
        assert!(!headers.contains_key(REFERER));
    }

    #[test]
    fn test_alternate_headers_keep_referer() {
        let headers = alternate_headers(&page_headers(Some("https://a.com/")));
        assert_eq!(headers.get(USER_AGENT).unwrap(), FALLBACK_USER_AGENT);
        assert_eq!(headers.get(ACCEPT_ENCODING).unwrap(), "deflate");
        assert_eq!(headers.get(REFERER).unwrap(), "https://a.com/");
    }

    #[test]
    fn test_stream_headers() {
        let headers = stream_headers("https://a.com/", Some("https://a.com"));
        assert_eq!(headers.get(reqwest::header::ORIGIN).unwrap(), "https://a.com");
        assert!(!stream_headers("https://a.com/", None).contains_key(reqwest::header::ORIGIN));
    }
}
