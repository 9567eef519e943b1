//! Permissive parsing for free-text numeric fields.
//!
//! Grammar (whitespace allowed between tokens):
//!
//! ```text
//! input  := sign? symbol? sign? body "%"?
//! symbol := "R$" | "US$" | "$" | "€" | "£" | "¥" | three uppercase ASCII letters
//! body   := digits and the separators `.` / `,`
//! ```
//!
//! Separator rules, with `dec`/`grp` taken from the locale:
//! * both kinds present: `dec` is the decimal point, `grp` groups the integer part;
//! * one kind repeated: grouping, every group after the first has three digits;
//! * one kind once: `dec` is always decimal, `grp` is grouping only when exactly
//!   three digits follow it.
//!
//! Input that does not match evaluates to `0.0`.

use super::LocaleConfig;

const CURRENCY_SYMBOLS: [&str; 6] = ["R$", "US$", "$", "€", "£", "¥"];

/// Parses a user-entered amount, returning `0.0` for anything unparseable.
pub fn parse_amount(input: &str, locale: &LocaleConfig) -> f64 {
    parse_strict(input, locale).unwrap_or(0.0)
}

/// Parses a percentage string (`"10"`, `"10%"`, `"0,5"`) into a decimal rate.
pub fn parse_percent(input: &str, locale: &LocaleConfig) -> f64 {
    parse_amount(input, locale) / 100.0
}

/// Parses a horizon in days: `max(0, floor(value))`, saturating at `u32::MAX`.
pub fn parse_days(input: &str, locale: &LocaleConfig) -> u32 {
    whole_days(parse_amount(input, locale))
}

/// Coerces a numeric day count to `max(0, floor(days))`; non-finite input is zero.
pub fn whole_days(days: f64) -> u32 {
    let days = sanitize(days);
    if days <= 0.0 {
        return 0;
    }
    let floored = days.floor();
    if floored >= u32::MAX as f64 {
        u32::MAX
    } else {
        floored as u32
    }
}

/// Replaces NaN and infinities with `0.0`.
pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn parse_strict(input: &str, locale: &LocaleConfig) -> Option<f64> {
    let mut rest = input.trim();
    let mut negative = false;

    if let Some(stripped) = rest.strip_prefix('-') {
        negative = true;
        rest = stripped.trim_start();
    }
    rest = strip_symbol(rest).trim_start();
    if !negative {
        if let Some(stripped) = rest.strip_prefix('-') {
            negative = true;
            rest = stripped.trim_start();
        }
    }
    rest = rest.trim_end();
    if let Some(stripped) = rest.strip_suffix('%') {
        rest = stripped.trim_end();
    }

    let normalized = normalize_body(rest, locale)?;
    let value: f64 = normalized.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(if negative { -value } else { value })
}

fn strip_symbol(input: &str) -> &str {
    for symbol in CURRENCY_SYMBOLS {
        if let Some(rest) = input.strip_prefix(symbol) {
            return rest;
        }
    }
    let code_len = input
        .chars()
        .take(3)
        .take_while(|c| c.is_ascii_uppercase())
        .count();
    if code_len == 3 {
        return &input[3..];
    }
    input
}

/// Rewrites the body into a plain `digits[.digits]` string understood by `f64::from_str`.
fn normalize_body(body: &str, locale: &LocaleConfig) -> Option<String> {
    if body.is_empty()
        || !body
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == ',')
    {
        return None;
    }

    let dec = if locale.decimal_separator == ',' { ',' } else { '.' };
    let grp = if dec == ',' { '.' } else { ',' };
    let dec_count = body.matches(dec).count();
    let grp_count = body.matches(grp).count();

    let (int_part, frac_part) = match (dec_count, grp_count) {
        (0, 0) => (body, ""),
        (1, g) if g > 0 => {
            let (int_part, frac_part) = body.split_once(dec)?;
            if frac_part.contains(grp) {
                return None;
            }
            (int_part, frac_part)
        }
        (d, 0) if d > 1 => (body, ""),
        (0, g) if g > 1 => (body, ""),
        (1, 0) => body.split_once(dec)?,
        (0, 1) => {
            let (head, tail) = body.split_once(grp)?;
            if tail.len() == 3 && !head.is_empty() {
                (body, "")
            } else {
                (head, tail)
            }
        }
        _ => return None,
    };

    let digits = ungroup(int_part)?;
    if digits.is_empty() && frac_part.is_empty() {
        return None;
    }
    let int_digits = if digits.is_empty() { "0" } else { digits.as_str() };
    let frac_digits = if frac_part.is_empty() { "0" } else { frac_part };
    Some(format!("{int_digits}.{frac_digits}"))
}

/// Removes grouping separators, validating that groups after the first hold three digits.
fn ungroup(int_part: &str) -> Option<String> {
    let mut groups = int_part.split(['.', ',']);
    let first = groups.next().unwrap_or_default();
    let mut digits = first.to_string();
    let mut grouped = false;
    for group in groups {
        grouped = true;
        if group.len() != 3 {
            return None;
        }
        digits.push_str(group);
    }
    if grouped && first.is_empty() {
        return None;
    }
    Some(digits)
}
