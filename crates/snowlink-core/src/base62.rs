//! Base62 codec used to render ids as short codes.
//!
//! The alphabet order is fixed: digits, then lowercase, then uppercase
//! (`0-9a-zA-Z`). Digit `0` is `'0'`, digit `10` is `'a'`, digit `36` is `'A'`.
//! Output is most-significant digit first, so changing the order would change
//! every code ever issued.

use thiserror::Error;

/// The 62 symbols in digit order.
pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

const BASE: u64 = 62;

/// `u64::MAX` needs 11 base62 digits.
const MAX_DIGITS: usize = 11;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("cannot encode negative value {0}")]
    Negative(i64),
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("cannot decode an empty string")]
    Empty,
    #[error("invalid base62 symbol {symbol:?} at position {position}")]
    InvalidSymbol { symbol: char, position: usize },
    #[error("value does not fit in 64 bits")]
    Overflow,
}

/// Encodes a signed id. Negative input is rejected rather than rendered.
pub fn encode(value: i64) -> Result<String, EncodeError> {
    u64::try_from(value)
        .map(encode_u64)
        .map_err(|_| EncodeError::Negative(value))
}

/// Encodes an unsigned id.
pub fn encode_u64(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = [0_u8; MAX_DIGITS];
    let mut start = MAX_DIGITS;
    while value > 0 {
        start -= 1;
        digits[start] = ALPHABET[(value % BASE) as usize];
        value /= BASE;
    }

    digits[start..].iter().map(|&b| b as char).collect()
}

/// Decodes a base62 string back into the id it was encoded from.
pub fn decode(input: &str) -> Result<u64, DecodeError> {
    if input.is_empty() {
        return Err(DecodeError::Empty);
    }

    input.chars().enumerate().try_fold(0_u64, |acc, (position, symbol)| {
        let digit = digit_of(symbol).ok_or(DecodeError::InvalidSymbol { symbol, position })?;
        acc.checked_mul(BASE)
            .and_then(|v| v.checked_add(digit))
            .ok_or(DecodeError::Overflow)
    })
}

/// Returns true if every character of `input` belongs to [`ALPHABET`].
pub fn is_base62(input: &str) -> bool {
    input.bytes().all(|b| b.is_ascii_alphanumeric())
}

fn digit_of(symbol: char) -> Option<u64> {
    let digit = match symbol {
        '0'..='9' => symbol as u64 - '0' as u64,
        'a'..='z' => symbol as u64 - 'a' as u64 + 10,
        'A'..='Z' => symbol as u64 - 'A' as u64 + 36,
        _ => return None,
    };
    Some(digit)
}
