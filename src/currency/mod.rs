//! Locale description, permissive numeric input parsing, and presentation formatting.
//!
//! Values flow through the engines unrounded; rounding happens only in the
//! `format_*` helpers here.

mod parse;

pub use parse::{parse_amount, parse_days, parse_percent, sanitize, whole_days};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// ISO 4217 currency representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("BRL")
    }
}

/// Locale-aware separators and date style.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocaleConfig {
    pub language_tag: String,
    pub decimal_separator: char,
    pub grouping_separator: char,
    pub date_format: DateFormatStyle,
}

impl LocaleConfig {
    /// Builds the separators for a BCP 47 tag. Comma-decimal languages get `,`/`.`,
    /// everything else `.`/`,`.
    pub fn for_tag(tag: &str) -> Self {
        let language = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        let comma_decimal = matches!(
            language.as_str(),
            "pt" | "es" | "fr" | "de" | "it" | "nl" | "ru" | "tr"
        );
        let (decimal_separator, grouping_separator) = if comma_decimal {
            (',', '.')
        } else {
            ('.', ',')
        };
        Self {
            language_tag: tag.to_string(),
            decimal_separator,
            grouping_separator,
            date_format: if comma_decimal {
                DateFormatStyle::DayFirst
            } else {
                DateFormatStyle::Iso
            },
        }
    }

    pub fn pt_br() -> Self {
        Self::for_tag("pt-BR")
    }

    pub fn en_us() -> Self {
        Self::for_tag("en-US")
    }
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self::pt_br()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormatOptions {
    pub currency_display: CurrencyDisplay,
    pub negative_style: NegativeStyle,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            currency_display: CurrencyDisplay::Symbol,
            negative_style: NegativeStyle::Sign,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NegativeStyle {
    Sign,
    Parentheses,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CurrencyDisplay {
    Symbol,
    Code,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DateFormatStyle {
    /// `2025-04-30`
    Iso,
    /// `30/04/2025`
    DayFirst,
    /// `30 Apr 2025`
    Medium,
}

pub fn symbol_for(code: &str) -> String {
    match code {
        "BRL" => "R$".into(),
        "USD" => "$".into(),
        "EUR" => "€".into(),
        "GBP" => "£".into(),
        "JPY" => "¥".into(),
        _ => code.into(),
    }
}

pub fn minor_units_for(code: &str) -> u8 {
    match code {
        "JPY" => 0,
        "KWD" | "BHD" => 3,
        _ => 2,
    }
}

/// Renders `value` with `precision` fraction digits and locale grouping.
pub fn format_number(locale: &LocaleConfig, value: f64, precision: u8) -> String {
    let rendered = format!("{:.*}", precision as usize, value.abs());
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (rendered.as_str(), None),
    };
    let mut body = group_digits(int_part, locale.grouping_separator);
    if let Some(frac) = frac_part {
        body.push(locale.decimal_separator);
        body.push_str(frac);
    }
    // `-0.00` reads as zero.
    if value < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
        body.insert(0, '-');
    }
    body
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx != 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}

pub fn format_currency_value(
    amount: f64,
    code: &CurrencyCode,
    locale: &LocaleConfig,
    options: &FormatOptions,
) -> String {
    let precision = minor_units_for(code.as_str());
    let magnitude = format_number(locale, amount.abs(), precision);
    let negative = amount < 0.0 && magnitude.chars().any(|c| c.is_ascii_digit() && c != '0');
    let prefix = match options.currency_display {
        CurrencyDisplay::Symbol => {
            let symbol = symbol_for(code.as_str());
            if symbol.chars().count() > 1 {
                format!("{symbol} ")
            } else {
                symbol
            }
        }
        CurrencyDisplay::Code => format!("{} ", code.as_str()),
    };
    let body = format!("{prefix}{magnitude}");
    match (negative, options.negative_style) {
        (false, _) => body,
        (true, NegativeStyle::Sign) => format!("-{body}"),
        (true, NegativeStyle::Parentheses) => format!("({body})"),
    }
}

/// Formats a decimal rate as a percentage with at most `max_fraction_digits`
/// digits, dropping trailing zeros (`0.1` → `10%`, `0.0005` → `0,05%`).
pub fn format_percent(locale: &LocaleConfig, rate: f64, max_fraction_digits: u8) -> String {
    let mut body = format_number(locale, rate * 100.0, max_fraction_digits);
    if body.contains(locale.decimal_separator) {
        while body.ends_with('0') {
            body.pop();
        }
        if body.ends_with(locale.decimal_separator) {
            body.pop();
        }
    }
    format!("{body}%")
}

pub fn format_date(locale: &LocaleConfig, date: NaiveDate) -> String {
    match locale.date_format {
        DateFormatStyle::Iso => date.format("%Y-%m-%d").to_string(),
        DateFormatStyle::DayFirst => date.format("%d/%m/%Y").to_string(),
        DateFormatStyle::Medium => format!(
            "{:02} {} {}",
            date.day(),
            month_label(date.month()),
            date.year()
        ),
    }
}

fn month_label(month: u32) -> &'static str {
    match month {
        1 => "Jan",
        2 => "Feb",
        3 => "Mar",
        4 => "Apr",
        5 => "May",
        6 => "Jun",
        7 => "Jul",
        8 => "Aug",
        9 => "Sep",
        10 => "Oct",
        11 => "Nov",
        12 => "Dec",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_groups_with_locale_separators() {
        assert_eq!(format_number(&LocaleConfig::pt_br(), 1234567.891, 2), "1.234.567,89");
        assert_eq!(format_number(&LocaleConfig::en_us(), 1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(&LocaleConfig::en_us(), 999.0, 0), "999");
        assert_eq!(format_number(&LocaleConfig::en_us(), -1000.0, 1), "-1,000.0");
    }

    #[test]
    fn negative_zero_is_rendered_without_sign() {
        assert_eq!(format_number(&LocaleConfig::en_us(), -0.001, 2), "0.00");
    }

    #[test]
    fn currency_uses_symbol_and_negative_style() {
        let brl = CurrencyCode::new("brl");
        let locale = LocaleConfig::pt_br();
        assert_eq!(
            format_currency_value(13.31, &brl, &locale, &FormatOptions::default()),
            "R$ 13,31"
        );
        let parens = FormatOptions {
            negative_style: NegativeStyle::Parentheses,
            ..FormatOptions::default()
        };
        assert_eq!(
            format_currency_value(-1500.0, &brl, &locale, &parens),
            "(R$ 1.500,00)"
        );
        let usd = CurrencyCode::new("USD");
        assert_eq!(
            format_currency_value(-2.5, &usd, &LocaleConfig::en_us(), &FormatOptions::default()),
            "-$2.50"
        );
    }

    #[test]
    fn percent_drops_trailing_zeros() {
        let locale = LocaleConfig::pt_br();
        assert_eq!(format_percent(&locale, 0.1, 6), "10%");
        assert_eq!(format_percent(&locale, 0.0005, 6), "0,05%");
    }

    #[test]
    fn locale_tags_pick_separators() {
        let de = LocaleConfig::for_tag("de_DE");
        assert_eq!(de.decimal_separator, ',');
        let en = LocaleConfig::for_tag("en-GB");
        assert_eq!(en.decimal_separator, '.');
        assert_eq!(en.grouping_separator, ',');
    }

    #[test]
    fn dates_follow_locale_style() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 30).unwrap();
        assert_eq!(format_date(&LocaleConfig::pt_br(), date), "30/04/2025");
        assert_eq!(format_date(&LocaleConfig::en_us(), date), "2025-04-30");
    }
}
