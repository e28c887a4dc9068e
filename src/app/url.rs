//! Input URL validation and normalization.

use log::warn;

use crate::error_handling::ResolveError;

/// Maximum accepted input length, matching common browser and server limits.
const MAX_URL_LENGTH: usize = 2048;

/// Prefixes that explicitly route a URL to this resolver.
const OPT_IN_PREFIXES: &[&str] = &["generic://", "resolve://"];

/// Strips an opt-in prefix and adds `http://` when no scheme is given.
///
/// `//host/path` becomes `http://host/path`. The result is in serialized
/// `Url` form (`http://host` becomes `http://host/`), the same form candidates
/// are compared in; it becomes the first history entry and the referer of the
/// next attempt.
///
/// # Errors
///
/// Returns `ResolveError::NoResolver` if the input is empty, too long, not
/// parseable, has no host, or uses a scheme other than http/https.
pub fn normalize_input(input: &str) -> Result<String, ResolveError> {
    let trimmed = input.trim();
    let stripped = OPT_IN_PREFIXES
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .unwrap_or(trimmed);

    let normalized = if stripped.contains("://") {
        stripped.to_string()
    } else if let Some(rest) = stripped.strip_prefix("//") {
        format!("http://{rest}")
    } else {
        format!("http://{stripped}")
    };

    if normalized.len() > MAX_URL_LENGTH {
        warn!(
            "Skipping URL exceeding maximum length ({} > {})",
            normalized.len(),
            MAX_URL_LENGTH
        );
        return Err(ResolveError::NoResolver(input.to_string()));
    }

    match ::url::Url::parse(&normalized) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => {
            Ok(parsed.to_string())
        }
        Ok(_) => {
            warn!("Unsupported scheme for URL: {input}");
            Err(ResolveError::NoResolver(input.to_string()))
        }
        Err(e) => {
            warn!("Invalid URL {input}: {e}");
            Err(ResolveError::NoResolver(input.to_string()))
        }
    }
}
