//! Repair of raw candidate URLs into absolute URLs.

use url::Url;

use crate::unpack::percent_decode;

/// Turns a raw candidate into an absolute URL.
///
/// Backslash escapes are removed, the `&#58;` entity in a leading `http` or
/// `https` scheme is fixed, the result is percent-decoded and finally joined
/// against `base_url`. When `stream_base` is given and the candidate is not
/// protocol-relative (`//host/...`), it is joined against `stream_base`
/// instead, with a leading `/` removed.
pub fn repair(raw: &str, base_url: &Url, stream_base: Option<&Url>) -> Result<Url, url::ParseError> {
    let mut new_url = raw.replace('\\', "");
    if let Some(rest) = new_url.strip_prefix("http&#58;//") {
        new_url = format!("http://{rest}");
    } else if let Some(rest) = new_url.strip_prefix("https&#58;//") {
        new_url = format!("https://{rest}");
    }
    let new_url = percent_decode(&new_url);

    match stream_base {
        Some(stream_base) if new_url.chars().nth(1) != Some('/') => {
            stream_base.join(new_url.strip_prefix('/').unwrap_or(&new_url))
        }
        _ => base_url.join(&new_url),
    }
}
