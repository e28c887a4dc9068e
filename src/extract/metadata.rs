//! Page title and author.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

use crate::utils::parse_selector_unsafe;

static OG_TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    parse_selector_unsafe(r#"meta[property="og:title"]"#, "OG_TITLE_SELECTOR")
});
static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("title", "TITLE_SELECTOR"));

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extracts the page title: the `og:title` meta property, else the first
/// `<title>` element. Whitespace is collapsed and entities decoded.
///
/// Returns `None` when neither is present or both are blank.
pub fn page_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let og_title = document
        .select(&OG_TITLE_SELECTOR)
        .filter_map(|element| element.value().attr("content"))
        .map(collapse_whitespace)
        .find(|title| !title.is_empty());
    if og_title.is_some() {
        return og_title;
    }

    document
        .select(&TITLE_SELECTOR)
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .find(|title| !title.is_empty())
}

/// Derives an author from the page URL: its only path segment, else its
/// fragment.
///
/// `https://live.example.com/channel42` gives `channel42`.
pub fn page_author(page_url: &str) -> Option<String> {
    let url = Url::parse(page_url).ok()?;
    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();
    if let [segment] = segments.as_slice() {
        return Some(segment.to_string());
    }
    url.fragment()
        .filter(|fragment| !fragment.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_element() {
        let html = "<html><head><title>\n  My   Stream &amp; Chat\n</title></head></html>";
        assert_eq!(page_title(html).as_deref(), Some("My Stream & Chat"));
    }

    #[test]
    fn test_og_title_preferred() {
        let html = r#"<html><head><title>Site</title><meta property="og:title" content="Live Show"/></head></html>"#;
        assert_eq!(page_title(html).as_deref(), Some("Live Show"));
    }

    #[test]
    fn test_missing_title() {
        assert_eq!(page_title("<html><body>no title</body></html>"), None);
        assert_eq!(page_title("<title>   </title>"), None);
    }

    #[test]
    fn test_author_single_segment() {
        assert_eq!(
            page_author("https://live.example.com/channel42").as_deref(),
            Some("channel42")
        );
        assert_eq!(
            page_author("https://live.example.com/channel42/").as_deref(),
            Some("channel42")
        );
    }

    #[test]
    fn test_author_fragment() {
        assert_eq!(
            page_author("https://live.example.com/a/b#studio").as_deref(),
            Some("studio")
        );
        assert_eq!(page_author("https://live.example.com/a/b"), None);
        assert_eq!(page_author("https://live.example.com/"), None);
    }
}
