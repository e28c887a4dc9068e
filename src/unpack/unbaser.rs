//! Radix conversion for packed symbol indices.
//!
//! Bases 2 to 36 use the usual case-insensitive digits. Bases 37 to 61 use a
//! prefix of the 62-character alphabet, and 62 and 95 use fixed alphabets.

use crate::error_handling::UnbaseError;

const ALPHABET_62: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ALPHABET_95: &[u8] =
    b" !\"#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`abcdefghijklmnopqrstuvwxyz{|}~";

/// Converter between integers and strings in one base.
#[derive(Debug, Clone, Copy)]
pub struct Unbaser {
    base: u32,
    // None for bases handled by `char::to_digit`
    alphabet: Option<&'static [u8]>,
}

impl Unbaser {
    /// Creates an unbaser, failing for bases without an alphabet.
    pub fn new(base: u32) -> Result<Self, UnbaseError> {
        let alphabet = match base {
            2..=36 => None,
            37..=62 => Some(&ALPHABET_62[..base as usize]),
            95 => Some(ALPHABET_95),
            _ => return Err(UnbaseError::UnsupportedBase(base)),
        };
        Ok(Self { base, alphabet })
    }

    fn digit_value(&self, digit: char) -> Option<u32> {
        match self.alphabet {
            None => digit.to_digit(self.base),
            Some(alphabet) => alphabet
                .iter()
                .position(|&c| c as char == digit)
                .map(|i| i as u32),
        }
    }

    /// Decodes `digits` as a number in this base.
    pub fn decode(&self, digits: &str) -> Result<u64, UnbaseError> {
        if digits.is_empty() {
            return Err(UnbaseError::Empty);
        }
        let base = u64::from(self.base);
        let mut value: u64 = 0;
        for digit in digits.chars() {
            let index = self.digit_value(digit).ok_or(UnbaseError::InvalidDigit {
                digit,
                base: self.base,
            })?;
            value = value
                .checked_mul(base)
                .and_then(|v| v.checked_add(u64::from(index)))
                .ok_or_else(|| UnbaseError::Overflow(digits.to_string()))?;
        }
        Ok(value)
    }

    /// Encodes `value` in this base. Inverse of [`Unbaser::decode`].
    pub fn encode(&self, mut value: u64) -> String {
        let base = u64::from(self.base);
        let mut digits = Vec::new();
        loop {
            let index = (value % base) as usize;
            let digit = match self.alphabet {
                None => ALPHABET_62[index] as char,
                Some(alphabet) => alphabet[index] as char,
            };
            digits.push(digit);
            value /= base;
            if value == 0 {
                break;
            }
        }
        digits.iter().rev().collect()
    }
}

/// Decodes `digits` in `base`.
pub fn decode(digits: &str, base: u32) -> Result<u64, UnbaseError> {
    Unbaser::new(base)?.decode(digits)
}
