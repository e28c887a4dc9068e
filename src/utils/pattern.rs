//! Regex helpers shared by the unpackers and extractors.
//!
//! The `regex` crate has no look-around or backreferences. Patterns that need
//! them are written without, and the missing condition is checked on each
//! match with [`CapturesFiltered`], which resumes the search one character
//! after a rejected match start, the way a backtracking engine would.

use regex::{Captures, Regex};

/// Compiles a static regex pattern, panicking with a detailed error message
/// if compilation fails. Used for patterns that are compile-time constants.
pub(crate) fn compile_regex_unsafe(pattern: &str, context: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| {
        panic!(
            "Failed to compile regex pattern '{}' in {}: {}. This is a programming error.",
            pattern, context, e
        )
    })
}

/// Iterator over non-overlapping matches accepted by a predicate.
pub(crate) struct CapturesFiltered<'r, 'h, F> {
    re: &'r Regex,
    haystack: &'h str,
    pos: usize,
    accept: F,
}

impl<'r, 'h, F> Iterator for CapturesFiltered<'r, 'h, F>
where
    F: FnMut(&Captures<'h>) -> bool,
{
    type Item = Captures<'h>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos <= self.haystack.len() {
            let caps = self.re.captures_at(self.haystack, self.pos)?;
            let whole = caps.get(0)?;
            if (self.accept)(&caps) {
                self.pos = if whole.end() > whole.start() {
                    whole.end()
                } else {
                    next_boundary(self.haystack, whole.end())
                };
                return Some(caps);
            }
            self.pos = next_boundary(self.haystack, whole.start());
        }
        None
    }
}

/// All matches of `re` in `haystack` for which `accept` holds.
pub(crate) fn captures_filtered<'r, 'h, F>(
    re: &'r Regex,
    haystack: &'h str,
    accept: F,
) -> CapturesFiltered<'r, 'h, F>
where
    F: FnMut(&Captures<'h>) -> bool,
{
    CapturesFiltered {
        re,
        haystack,
        pos: 0,
        accept,
    }
}

/// First match of `re` in `haystack` for which `accept` holds.
pub(crate) fn find_filtered<'h, F>(re: &Regex, haystack: &'h str, accept: F) -> Option<Captures<'h>>
where
    F: FnMut(&Captures<'h>) -> bool,
{
    captures_filtered(re, haystack, accept).next()
}

/// Byte offset of the character after the one starting at `i`.
fn next_boundary(s: &str, i: usize) -> usize {
    i + s[i..].chars().next().map_or(1, char::len_utf8)
}
