//! CSS selectors for page metadata.

use scraper::Selector;

/// Parses a selector literal used by the metadata extractors.
///
/// `name` identifies the static the selector is stored in.
///
/// # Panics
///
/// Panics if `css` is not a valid selector, which only happens for a typo in
/// one of the crate's own selector constants.
pub(crate) fn parse_selector_unsafe(css: &str, name: &str) -> Selector {
    match Selector::parse(css) {
        Ok(selector) => selector,
        Err(e) => panic!("Invalid CSS selector {css:?} for {name}: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_selectors_parse() {
        parse_selector_unsafe("title", "TITLE");
        parse_selector_unsafe(r#"meta[property="og:title"]"#, "OG_TITLE");
    }
}
