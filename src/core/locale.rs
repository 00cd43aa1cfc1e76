// CampaignLens - core/locale.rs
//
// Spanish-locale numeric and date handling.
//
// Grammar accepted by `parse_locale_number` (surrounding whitespace ignored):
//
//   number   := sign? integer fraction? ws? suffix?
//   sign     := "-" | "+"
//   integer  := digit{1,3} ("." digit{3})+ | digit+
//   fraction := "," digit+
//   suffix   := "%" | "€"
//
// The suffix is dropped without scaling: "54,00%" parses to 54.0.
// Canonical decimals ("1234.56") are rejected rather than guessed at.

use crate::util::constants;
use crate::util::error::LocaleNumberError;
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(?P<sign>[-+])?(?P<int>[0-9]{1,3}(?:\.[0-9]{3})+|[0-9]+)(?:,(?P<frac>[0-9]+))?\s*[%€]?$",
        )
        .expect("locale number pattern is valid")
    })
}

/// Parse a Spanish-locale number such as `"1.234,56"`, `"0,5"` or `"12,5 %"`.
///
/// The value is the one obtained by removing every thousands separator and
/// turning the decimal comma into a point.
pub fn parse_locale_number(input: &str) -> Result<f64, LocaleNumberError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(LocaleNumberError::Empty);
    }

    let caps = number_pattern()
        .captures(trimmed)
        .ok_or_else(|| LocaleNumberError::Malformed {
            input: trimmed.to_string(),
        })?;

    let mut canonical = String::with_capacity(trimmed.len());
    if caps.name("sign").map(|m| m.as_str()) == Some("-") {
        canonical.push('-');
    }
    if let Some(int) = caps.name("int") {
        canonical.extend(
            int.as_str()
                .chars()
                .filter(|c| *c != constants::THOUSANDS_SEPARATOR),
        );
    }
    if let Some(frac) = caps.name("frac") {
        canonical.push('.');
        canonical.push_str(frac.as_str());
    }

    let value: f64 = canonical
        .parse()
        .map_err(|_| LocaleNumberError::Malformed {
            input: trimmed.to_string(),
        })?;

    if !value.is_finite() {
        return Err(LocaleNumberError::NotFinite {
            input: trimmed.to_string(),
        });
    }
    Ok(value)
}

/// Render `value` with `.` thousands and `,` decimal separators.
///
/// Non-finite values render as the no-data label. A value that rounds to
/// zero never carries a minus sign.
pub fn format_locale_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return constants::NO_DATA_LABEL.to_string();
    }

    let rendered = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (rendered.as_str(), None),
    };

    let mut out = String::with_capacity(rendered.len() + int_part.len() / 3 + 1);
    let is_zero = rendered.chars().all(|c| c == '0' || c == '.');
    if value < 0.0 && !is_zero {
        out.push('-');
    }

    let len = int_part.len();
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(constants::THOUSANDS_SEPARATOR);
        }
        out.push(digit);
    }

    if let Some(frac) = frac_part {
        out.push(constants::DECIMAL_SEPARATOR);
        out.push_str(frac);
    }
    out
}

/// Render a monetary value with the dataset's two decimal places.
pub fn format_money(value: f64) -> String {
    format_locale_number(value, constants::MONEY_DECIMALS)
}

/// Parse a campaign date. Returns `None` for empty or unrecognised input.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    constants::DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            constants::DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                .map(|dt| dt.date())
        })
}
