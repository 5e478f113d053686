//! Locales and locale-aware date/number formatting
//!
//! Formatters are strategies: a render either supplies its own through
//! `RenderOptions` or gets the default-style formatters. Every formatter is
//! handed the request's locale at call time, so explicit and default
//! formatters always agree on the locale of a render.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// A language with an optional region, e.g. `en-US` or `fr`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale {
    language: String,
    region: Option<String>,
}

impl Locale {
    /// Parse a BCP 47-ish tag; both `-` and `_` separators are accepted
    pub fn parse(tag: &str) -> Result<Self> {
        let invalid = || CoreError::InvalidLocale {
            tag: tag.to_string(),
        };

        let mut parts = tag.trim().split(['-', '_']);
        let language = parts.next().filter(|l| is_alpha(l, 2..=3)).ok_or_else(invalid)?;
        let region = match parts.next() {
            Some(region) if is_alpha(region, 2..=2) || is_digit(region, 3) => {
                Some(region.to_ascii_uppercase())
            }
            Some(_) => return Err(invalid()),
            None => None,
        };
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self {
            language: language.to_ascii_lowercase(),
            region,
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Locale data used by chrono for month/day names and date layouts
    pub fn chrono_locale(&self) -> chrono::Locale {
        let mut candidates = Vec::with_capacity(2);
        if let Some(region) = &self.region {
            candidates.push(format!("{}_{}", self.language, region));
        }
        candidates.push(format!(
            "{}_{}",
            self.language,
            self.language.to_ascii_uppercase()
        ));

        candidates
            .iter()
            .find_map(|candidate| chrono::Locale::try_from(candidate.as_str()).ok())
            .unwrap_or(chrono::Locale::POSIX)
    }

    /// Decimal and grouping separators for this locale's language
    pub fn number_symbols(&self) -> NumberSymbols {
        let (decimal, group) = match self.language.as_str() {
            "de" | "es" | "it" | "nl" | "pt" | "id" | "tr" | "da" => (',', '.'),
            "fr" | "ru" | "pl" | "cs" | "sv" | "fi" | "nb" | "uk" => (',', '\u{a0}'),
            _ => ('.', ','),
        };
        NumberSymbols { decimal, group }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            region: Some("US".to_string()),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.region {
            Some(region) => write!(f, "{}-{}", self.language, region),
            None => f.write_str(&self.language),
        }
    }
}

impl FromStr for Locale {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Locale {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Locale> for String {
    fn from(value: Locale) -> Self {
        value.to_string()
    }
}

fn is_alpha(s: &str, len: std::ops::RangeInclusive<usize>) -> bool {
    len.contains(&s.len()) && s.chars().all(|c| c.is_ascii_alphabetic())
}

fn is_digit(s: &str, len: usize) -> bool {
    s.len() == len && s.chars().all(|c| c.is_ascii_digit())
}

/// Separators used when printing numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberSymbols {
    pub decimal: char,
    pub group: char,
}

/// Strategy for turning a timestamp into text
pub trait DateFormat: Send + Sync + fmt::Debug {
    fn format_date(&self, date: &DateTime<FixedOffset>, locale: &Locale) -> String;
}

/// Strategy for turning a number into text
pub trait NumberFormat: Send + Sync + fmt::Debug {
    fn format_number(&self, value: f64, locale: &Locale) -> String;
}

/// The locale's preferred date representation (`%x`)
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDateFormat;

impl DateFormat for DefaultDateFormat {
    fn format_date(&self, date: &DateTime<FixedOffset>, locale: &Locale) -> String {
        date.format_localized("%x", locale.chrono_locale()).to_string()
    }
}

/// A strftime pattern rendered with the locale's month and day names
#[derive(Debug, Clone)]
pub struct PatternDateFormat {
    pattern: String,
}

impl PatternDateFormat {
    /// Validate a strftime pattern such as `%d %B %Y`
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        if StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error)) {
            return Err(CoreError::InvalidOption {
                key: "date".to_string(),
                message: format!("invalid date pattern `{}`", pattern),
            });
        }
        Ok(Self { pattern })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl DateFormat for PatternDateFormat {
    fn format_date(&self, date: &DateTime<FixedOffset>, locale: &Locale) -> String {
        let mut out = String::new();
        if write!(out, "{}", date.format_localized(&self.pattern, locale.chrono_locale())).is_err() {
            // Patterns are validated up front; fall back to RFC 3339 regardless.
            return date.to_rfc3339();
        }
        out
    }
}

/// Grouped number with up to three fraction digits, trailing zeros trimmed
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNumberFormat;

impl NumberFormat for DefaultNumberFormat {
    fn format_number(&self, value: f64, locale: &Locale) -> String {
        format_grouped(value, locale.number_symbols(), 0, 3)
    }
}

/// Grouped number with an exact number of fraction digits
#[derive(Debug, Clone, Copy)]
pub struct FixedNumberFormat {
    fraction_digits: usize,
}

impl FixedNumberFormat {
    pub fn new(fraction_digits: usize) -> Self {
        Self { fraction_digits }
    }

    pub fn fraction_digits(&self) -> usize {
        self.fraction_digits
    }
}

impl NumberFormat for FixedNumberFormat {
    fn format_number(&self, value: f64, locale: &Locale) -> String {
        format_grouped(
            value,
            locale.number_symbols(),
            self.fraction_digits,
            self.fraction_digits,
        )
    }
}

fn format_grouped(value: f64, symbols: NumberSymbols, min_fraction: usize, max_fraction: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rounded = format!("{:.*}", max_fraction, value.abs());
    let (integer, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));

    let mut fraction = fraction.to_string();
    while fraction.len() > min_fraction && fraction.ends_with('0') {
        fraction.pop();
    }

    let is_zero = integer.chars().all(|c| c == '0') && fraction.chars().all(|c| c == '0');
    let mut out = String::with_capacity(rounded.len() + integer.len() / 3 + 1);
    if value.is_sign_negative() && !is_zero {
        out.push('-');
    }

    let digits = integer.len();
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (digits - i) % 3 == 0 {
            out.push(symbols.group);
        }
        out.push(digit);
    }

    if !fraction.is_empty() {
        out.push(symbols.decimal);
        out.push_str(&fraction);
    }

    out
}
