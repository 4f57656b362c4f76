use crate::error::FeedError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single observed price for a product, extracted from one feed row.
///
/// Observations are plain values: two rows with the same product, date and
/// price produce two equal observations and both are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Source identifier column (usually the receipt or file the price came from)
    pub source: String,
    /// Product name, matched case-sensitively everywhere
    pub product: String,
    /// Calendar date of the observation
    pub date: NaiveDate,
    /// Price, normalized to two decimals
    pub price: f64,
}

impl Observation {
    /// Creates a new Observation, normalizing the price to cents.
    pub fn new(
        source: impl Into<String>,
        product: impl Into<String>,
        date: NaiveDate,
        price: f64,
    ) -> Self {
        Observation {
            source: source.into(),
            product: product.into(),
            date,
            price: round_cents(price),
        }
    }

    /// Price rendered with exactly two decimals (e.g. `"3.50"`).
    pub fn price_text(&self) -> String {
        format!("{:.2}", self.price)
    }
}

/// Rounds a value to two decimal places, the way a fixed two-decimal
/// rendering of its exact binary value would.
///
/// The decision is made on the exact decimal expansion, so `0.015` (stored
/// just below the half cent) becomes `0.01` while an exact tie such as
/// `0.125` rounds away from zero to `0.13`.
pub fn round_cents(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }

    // Far more digits than any f64 near a price needs to settle the third decimal
    let exact = format!("{:.40}", value.abs());
    let Some((whole, fraction)) = exact.split_once('.') else {
        return value;
    };

    let mut digits: Vec<u8> = whole.bytes().chain(fraction.bytes().take(2)).collect();
    if fraction.as_bytes().get(2).is_some_and(|d| *d >= b'5') {
        carry_one(&mut digits);
    }

    let split = digits.len() - 2;
    let text: String = digits[..split]
        .iter()
        .map(|d| *d as char)
        .chain(std::iter::once('.'))
        .chain(digits[split..].iter().map(|d| *d as char))
        .collect();

    match text.parse::<f64>() {
        Ok(rounded) if value < 0.0 => -rounded,
        Ok(rounded) => rounded,
        Err(_) => value,
    }
}

/// Adds one to the last digit of an ASCII decimal digit string.
fn carry_one(digits: &mut Vec<u8>) {
    for digit in digits.iter_mut().rev() {
        if *digit == b'9' {
            *digit = b'0';
        } else {
            *digit += 1;
            return;
        }
    }
    digits.insert(0, b'1');
}

/// The date layouts accepted in the feed's date column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateFormat {
    /// `YYYY-MM-DD`
    Iso,
    /// `MM/DD/YYYY` (US order; never interpreted as `DD/MM/YYYY`)
    MonthDayYear,
}

impl DateFormat {
    fn pattern(&self) -> &'static str {
        match self {
            DateFormat::Iso => "%Y-%m-%d",
            DateFormat::MonthDayYear => "%m/%d/%Y",
        }
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateFormat::Iso => write!(f, "YYYY-MM-DD"),
            DateFormat::MonthDayYear => write!(f, "MM/DD/YYYY"),
        }
    }
}

/// A successfully resolved feed date together with the layout it was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedDate {
    pub date: NaiveDate,
    pub format: DateFormat,
}

/// Parses a feed date written either as `YYYY-MM-DD` or `MM/DD/YYYY`.
///
/// The layout is chosen from the separator, then parsed strictly with that
/// layout. There is no fallback to any other interpretation.
///
/// # Errors
/// Returns `FeedError::InvalidDate` if the text fits neither layout or names
/// a day that does not exist.
pub fn parse_feed_date(text: &str) -> Result<ParsedDate, FeedError> {
    let trimmed = text.trim();
    let format = if trimmed.contains('/') {
        DateFormat::MonthDayYear
    } else if trimmed.contains('-') {
        DateFormat::Iso
    } else {
        return Err(FeedError::InvalidDate(text.to_string()));
    };

    NaiveDate::parse_from_str(trimmed, format.pattern())
        .map(|date| ParsedDate { date, format })
        .map_err(|_| FeedError::InvalidDate(text.to_string()))
}

/// Parses a feed price: finite, non-negative, rounded to cents.
///
/// # Errors
/// Returns `FeedError::InvalidPrice` for empty, non-numeric, negative or
/// non-finite text.
pub fn parse_feed_price(text: &str) -> Result<f64, FeedError> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| FeedError::InvalidPrice(text.to_string()))?;

    if !value.is_finite() || value < 0.0 {
        return Err(FeedError::InvalidPrice(text.to_string()));
    }

    Ok(round_cents(value))
}
