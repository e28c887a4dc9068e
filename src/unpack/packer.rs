//! Unpacker for Dean Edwards' p.a.c.k.e.r.
//!
//! Recognizes `eval(function(p,a,c,k,e,d){...}(payload, radix, count,
//! 'symtab'.split('|'), ...))` and rebuilds the payload by replacing every
//! word with its entry in the symbol table.

use std::sync::LazyLock;

use log::debug;
use regex::{Captures, Regex};

use super::unbaser::Unbaser;
use crate::error_handling::UnpackError;
use crate::utils::pattern::compile_regex_unsafe;

const PACKED_CALL_PATTERN: &str = r"eval\(function\(p,a,c,k,e,(?:d|r)\).*\)";
const PACKER_START_PATTERN: &str = r"eval *\( *function *\( *p *, *a *, *c *, *k *, *e *,";
const ARGS_FULL_PATTERN: &str =
    r"(?s)\}\('(.*)', *(\d+|\[\]), *(\d+), *'(.*)'\.split\('\|'\), *(\d+), *(.*)\)\)";
const ARGS_SHORT_PATTERN: &str = r"(?s)\}\('(.*)', *(\d+|\[\]), *(\d+), *'(.*)'\.split\('\|'\)";
const WORD_PATTERN: &str = r"\b\w+\b";
const STRING_LIST_PATTERN: &str = r#"(?s)var *(_\w+)=\["(.*?)"\];"#;

static PACKED_CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(PACKED_CALL_PATTERN, "PACKED_CALL_RE"));
static PACKER_START_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(PACKER_START_PATTERN, "PACKER_START_RE"));
static ARGS_FULL_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(ARGS_FULL_PATTERN, "ARGS_FULL_RE"));
static ARGS_SHORT_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(ARGS_SHORT_PATTERN, "ARGS_SHORT_RE"));
static WORD_RE: LazyLock<Regex> = LazyLock::new(|| compile_regex_unsafe(WORD_PATTERN, "WORD_RE"));
static STRING_LIST_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(STRING_LIST_PATTERN, "STRING_LIST_RE"));

/// Arguments of a packed call.
struct PackedArgs<'a> {
    payload: &'a str,
    radix: u32,
    count: usize,
    symtab: Vec<&'a str>,
}

/// Returns true if `source` contains a packed call.
pub fn detect(source: &str) -> bool {
    PACKER_START_RE.is_match(source)
}

/// Unpacks the first packed call in `source`.
///
/// Code before the call and after its closing `')))` or `}))` is kept around
/// the unpacked payload, unless the payload carries a string list, in which
/// case everything up to the list assignment is dropped.
pub fn unpack(source: &str) -> Result<String, UnpackError> {
    let args = filter_args(source)?;
    if args.count != args.symtab.len() {
        return Err(UnpackError::SymbolCount {
            expected: args.count,
            found: args.symtab.len(),
        });
    }

    // radix 1 means the indices are plain decimal
    let unbaser = match args.radix {
        1 => None,
        radix => Some(Unbaser::new(radix)?),
    };
    let lookup = |word: &str| -> Option<String> {
        let index = match unbaser {
            Some(unbaser) => unbaser.decode(word).ok()?,
            None => word.parse::<u64>().ok()?,
        };
        let symbol = args.symtab.get(usize::try_from(index).ok()?)?;
        (!symbol.is_empty()).then(|| symbol.to_string())
    };
    let unpacked = WORD_RE.replace_all(args.payload, |caps: &Captures| {
        let word = caps.get(0).map_or("", |m| m.as_str());
        lookup(word).unwrap_or_else(|| word.to_string())
    });

    Ok(replace_strings(&unpacked, begin_str(source), end_str(source)))
}

fn filter_args(source: &str) -> Result<PackedArgs<'_>, UnpackError> {
    for juicer in [&*ARGS_FULL_RE, &*ARGS_SHORT_RE] {
        let Some(caps) = juicer.captures(source) else {
            continue;
        };
        let group = |i: usize| caps.get(i).map_or("", |m| m.as_str());
        let radix = match group(2) {
            "[]" => 62,
            digits => digits
                .parse::<u32>()
                .map_err(|_| UnpackError::MalformedArguments)?,
        };
        let count = group(3)
            .parse::<usize>()
            .map_err(|_| UnpackError::MalformedArguments)?;
        return Ok(PackedArgs {
            payload: group(1),
            radix,
            count,
            symtab: group(4).split('|').collect(),
        });
    }
    Err(UnpackError::MalformedArguments)
}

fn begin_str(source: &str) -> &str {
    PACKER_START_RE
        .find(source)
        .map_or("", |m| &source[..m.start()])
}

fn end_str(source: &str) -> &str {
    source
        .split_once("')))")
        .or_else(|| source.split_once("}))"))
        .map_or("", |(_, rest)| rest)
}

/// Inlines a `var _X=["a","b"];` string list into its `_X[i]` references.
fn replace_strings(source: &str, begin: &str, end: &str) -> String {
    let Some(caps) = STRING_LIST_RE.captures(source) else {
        return format!("{begin}{source}{end}");
    };
    let (Some(whole), Some(varname), Some(strings)) = (caps.get(0), caps.get(1), caps.get(2))
    else {
        return format!("{begin}{source}{end}");
    };
    let mut tail = source[whole.end()..].to_string();
    for (index, value) in strings.as_str().split("\",\"").enumerate() {
        tail = tail.replace(
            &format!("{}[{}]", varname.as_str(), index),
            &format!("\"{value}\""),
        );
    }
    tail
}

/// Replaces every packed call in `text` with its unpacked source.
///
/// Backslashes are removed from the unpacked source. Calls that cannot be
/// unpacked are left as they are.
pub fn unpack_packer(text: &str) -> String {
    if !detect(text) {
        return text.to_string();
    }
    let calls: Vec<&str> = PACKED_CALL_RE.find_iter(text).map(|m| m.as_str()).collect();
    let mut result = text.to_string();
    for call in calls {
        match unpack(call) {
            Ok(unpacked) => {
                result = result.replace(call, &unpacked.replace('\\', ""));
            }
            Err(e) => debug!("p.a.c.k.e.r skipped: {e}"),
        }
    }
    result
}
