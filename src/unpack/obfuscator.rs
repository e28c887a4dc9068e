//! Unpacker for Obfuscator-HTML.
//!
//! The obfuscated page is a script that iterates an array of base64 chunks;
//! each chunk decodes to a number which, minus a fixed offset, is one
//! character code of the original markup.

use std::sync::LazyLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::{Captures, Regex};

use super::fixed_point;
use crate::error_handling::UnpackError;
use crate::utils::pattern::{compile_regex_unsafe, find_filtered};

// `list` and `iter` must name the same variable
const OBFUSCATOR_PATTERN: &str = r"<script[^<>]*>[^<>]*var\s*(?P<list>\w+)\s*=\s*\[(?P<chunks>[^\[\]]+)\];\s*(?P<iter>\w+)\.forEach.*-\s*(?P<minus>\d+)[^<>]*</script>";
const CHUNK_PATTERN: &str = r#"["'](?P<chunk>[A-z0-9+/=]+)["']"#;

static OBFUSCATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(OBFUSCATOR_PATTERN, "OBFUSCATOR_RE"));
static CHUNK_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(CHUNK_PATTERN, "CHUNK_RE"));

fn same_variable(caps: &Captures) -> bool {
    caps.name("list").map(|m| m.as_str()) == caps.name("iter").map(|m| m.as_str())
}

/// Decodes the chunk list of one obfuscated script.
fn decode_chunks(chunks: &str, minus: &str) -> Result<String, UnpackError> {
    let minus: i64 = minus
        .parse()
        .map_err(|_| UnpackError::InvalidChunk(minus.to_string()))?;
    let mut unpacked = String::new();
    for caps in CHUNK_RE.captures_iter(chunks) {
        let chunk = caps.name("chunk").map_or("", |m| m.as_str());
        // The chunk class spans `A-z`, which also admits `[\]^_` and a backtick
        let alphabet: Vec<u8> = chunk
            .bytes()
            .filter(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
            .collect();
        let decoded = STANDARD.decode(alphabet)?;
        let digits: String = decoded
            .iter()
            .filter(|b| b.is_ascii_digit())
            .map(|&b| b as char)
            .collect();
        let code = digits
            .parse::<i64>()
            .ok()
            .and_then(|n| u32::try_from(n - minus).ok())
            .and_then(char::from_u32)
            .ok_or_else(|| UnpackError::InvalidChunk(chunk.to_string()))?;
        unpacked.push(code);
    }
    Ok(unpacked)
}

/// Replaces every Obfuscator-HTML script block with the markup it encodes.
///
/// A block whose chunks cannot be decoded stops the stage; the text keeps the
/// substitutions made so far.
pub fn unpack_obfuscator(text: &str) -> String {
    fixed_point(text.to_string(), "obfuscator-html", |text| {
        let caps = find_filtered(&OBFUSCATOR_RE, text, same_variable)?;
        let whole = caps.get(0)?.as_str();
        let chunks = caps.name("chunks")?.as_str();
        let minus = caps.name("minus")?.as_str();
        match decode_chunks(chunks, minus) {
            Ok(unpacked) => Some(text.replace(whole, &unpacked)),
            Err(e) => {
                log::debug!("Obfuscator-HTML block skipped: {e}");
                None
            }
        }
    })
}
