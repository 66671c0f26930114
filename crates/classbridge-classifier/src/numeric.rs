//! C-style numeric prefix parsing
//!
//! Artifact and sample fields follow `strtod` rules: leading whitespace is
//! skipped, the longest numeric prefix is taken and anything after it is
//! ignored. A field with no numeric prefix, or whose value overflows or
//! underflows the target type, is rejected.

use std::str::FromStr;

/// Parse the numeric prefix of `text` as an `f32`
pub fn parse_f32_prefix(text: &str) -> Option<f32> {
    parse_prefix::<f32>(text, |v| v.is_infinite(), |v| v != 0.0 && !v.is_normal(), |v| v == 0.0)
}

/// Parse the numeric prefix of `text` as an `f64`
pub fn parse_f64_prefix(text: &str) -> Option<f64> {
    parse_prefix::<f64>(text, |v| v.is_infinite(), |v| v != 0.0 && !v.is_normal(), |v| v == 0.0)
}

fn parse_prefix<T: FromStr + Copy>(
    text: &str,
    is_infinite: impl Fn(T) -> bool,
    is_subnormal: impl Fn(T) -> bool,
    is_zero: impl Fn(T) -> bool,
) -> Option<T> {
    let text = text.trim_start();
    let prefix = scan(text)?;

    let value = prefix.text.parse::<T>().ok()?;
    if prefix.finite {
        // Out of range for the target type
        if is_infinite(value) || is_subnormal(value) || (is_zero(value) && prefix.nonzero_digits) {
            return None;
        }
    }
    Some(value)
}

struct Prefix<'a> {
    text: &'a str,
    /// A decimal number rather than an inf/nan literal
    finite: bool,
    nonzero_digits: bool,
}

/// Longest prefix accepted as a decimal float or an inf/nan literal
fn scan(text: &str) -> Option<Prefix<'_>> {
    let bytes = text.as_bytes();
    let mut pos = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        pos += 1;
    }

    let rest = &text[pos..];
    for literal in ["infinity", "inf", "nan"] {
        if rest.len() >= literal.len() && rest[..literal.len()].eq_ignore_ascii_case(literal) {
            return Some(Prefix {
                text: &text[..pos + literal.len()],
                finite: false,
                nonzero_digits: false,
            });
        }
    }

    let mut digits = 0;
    let mut nonzero_digits = false;
    while let Some(b) = bytes.get(pos).filter(|b| b.is_ascii_digit()) {
        nonzero_digits |= *b != b'0';
        digits += 1;
        pos += 1;
    }
    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        while let Some(b) = bytes.get(pos).filter(|b| b.is_ascii_digit()) {
            nonzero_digits |= *b != b'0';
            digits += 1;
            pos += 1;
        }
    }
    if digits == 0 {
        return None;
    }

    // An exponent counts only if at least one digit follows it
    if matches!(bytes.get(pos), Some(b'e') | Some(b'E')) {
        let mut exp = pos + 1;
        if matches!(bytes.get(exp), Some(b'+') | Some(b'-')) {
            exp += 1;
        }
        if bytes.get(exp).is_some_and(|b| b.is_ascii_digit()) {
            while bytes.get(exp).is_some_and(|b| b.is_ascii_digit()) {
                exp += 1;
            }
            pos = exp;
        }
    }

    Some(Prefix {
        text: &text[..pos],
        finite: true,
        nonzero_digits,
    })
}
