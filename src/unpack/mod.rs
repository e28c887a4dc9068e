//! Deobfuscation engine.
//!
//! A fixed chain of independent unpackers, each reversing one JavaScript
//! obfuscation idiom found on streaming pages:
//!
//! 1. Dean Edwards' p.a.c.k.e.r (symbol-table packing)
//! 2. Obfuscator-HTML (chunked base64 character codes)
//! 3. `document.write(unescape("..."))`
//! 4. `atob("...")` encoded player source URLs
//! 5. unicode-escaped `m3u8` string literals
//!
//! Every stage is best-effort: a stage that does not recognize its idiom, or
//! finds it malformed, leaves the text as it is. Later stages see the output
//! of earlier ones, so nested obfuscation unwinds in one call.

mod obfuscator;
mod packer;
mod source_url;
mod unescape;
mod unicode;
pub mod unbaser;

pub use obfuscator::unpack_obfuscator;
pub use packer::unpack_packer;
pub use source_url::{unpack_source_url, INVALID_SOURCE_URL};
pub use unbaser::Unbaser;
pub use unescape::unpack_unescape;
pub use unicode::unpack_unicode_m3u8;

use log::{trace, warn};

use crate::config::MAX_UNPACK_PASSES;

/// Runs all five unpackers over `html`, in order.
pub fn deobfuscate(html: &str) -> String {
    let text = unpack_packer(html);
    let text = unpack_obfuscator(&text);
    let text = unpack_unescape(&text);
    let text = unpack_source_url(&text);
    unpack_unicode_m3u8(&text)
}

/// Applies `step` until it returns `None` or stops changing the text.
///
/// The number of passes is capped at `MAX_UNPACK_PASSES`; a page that keeps
/// producing new matches past the cap is returned as it stands.
pub(crate) fn fixed_point<F>(mut text: String, stage: &str, step: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    for pass in 1..=MAX_UNPACK_PASSES {
        match step(&text) {
            Some(next) if next != text => {
                trace!("{stage}: pass {pass} changed the text");
                text = next;
            }
            _ => return text,
        }
    }
    warn!("{stage}: stopped after {MAX_UNPACK_PASSES} passes");
    text
}

/// Percent-decodes `s`, replacing invalid UTF-8 sequences.
pub(crate) fn percent_decode(s: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(s.as_bytes())).into_owned()
}
