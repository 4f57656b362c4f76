//! Per-product summary statistics and the comparators used to sort them.

use crate::observation::round_cents;
use crate::series::{ProductSeries, SeriesSet};
use chrono::{Datelike, Months, NaiveDate};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

const DAYS_PER_YEAR: f64 = 365.25;

/// Summary of one product's raw observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductStats {
    pub product: String,
    pub observation_count: usize,
    /// Mean of every observed price, rounded to cents
    pub average_price: f64,
    pub first_date: NaiveDate,
    pub first_price: f64,
    pub latest_date: NaiveDate,
    pub latest_price: f64,
    /// Compound annual growth between the first and latest observation, in
    /// percent, rounded to two decimals
    pub annualized_growth_pct: f64,
}

impl ProductStats {
    /// Computes statistics for a series. Returns `None` for an empty series.
    pub fn compute(series: &ProductSeries) -> Option<ProductStats> {
        let first = series.first()?;
        let latest = series.latest()?;
        let count = series.len();

        let average = series.observations.iter().map(|o| o.price).sum::<f64>() / count as f64;

        Some(ProductStats {
            product: series.product.clone(),
            observation_count: count,
            average_price: round_cents(average),
            first_date: first.date,
            first_price: first.price,
            latest_date: latest.date,
            latest_price: latest.price,
            annualized_growth_pct: annualized_growth_pct(
                count,
                first.date,
                first.price,
                latest.date,
                latest.price,
            ),
        })
    }

    /// Growth rendered as `"10.00%"`.
    pub fn growth_label(&self) -> String {
        format_percent(self.annualized_growth_pct)
    }

    /// Display text of one table column, with currency and percent decoration.
    pub fn cell(&self, column: StatsColumn) -> String {
        match column {
            StatsColumn::Product => self.product.clone(),
            StatsColumn::ObservationCount => self.observation_count.to_string(),
            StatsColumn::AveragePrice => format_currency(self.average_price),
            StatsColumn::FirstDate => self.first_date.format("%Y-%m-%d").to_string(),
            StatsColumn::FirstPrice => format_currency(self.first_price),
            StatsColumn::LatestDate => self.latest_date.format("%Y-%m-%d").to_string(),
            StatsColumn::LatestPrice => format_currency(self.latest_price),
            StatsColumn::AnnualizedGrowth => self.growth_label(),
        }
    }
}

/// Compound annual growth rate in percent between two price points, rounded
/// to two decimals.
///
/// Degenerate inputs (a single observation, no elapsed time, a zero first
/// price) yield `0.0` rather than NaN or infinity.
pub fn annualized_growth_pct(
    observation_count: usize,
    first_date: NaiveDate,
    first_price: f64,
    latest_date: NaiveDate,
    latest_price: f64,
) -> f64 {
    if observation_count <= 1 {
        return 0.0;
    }

    let years = elapsed_years(first_date, latest_date);
    if years <= 0.0 {
        return 0.0;
    }

    let pct = ((latest_price / first_price).powf(1.0 / years) - 1.0) * 100.0;
    if !pct.is_finite() {
        return 0.0;
    }

    let rounded = round_cents(pct);
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Elapsed time in years: whole anniversaries plus the remaining days over 365.25.
///
/// Spans under a year are exactly `days / 365.25`. Longer spans land on
/// whole numbers at anniversaries and otherwise stay within a day per year
/// of `days / 365.25`.
pub fn elapsed_years(start: NaiveDate, end: NaiveDate) -> f64 {
    if end <= start {
        return (end - start).num_days() as f64 / DAYS_PER_YEAR;
    }

    let anniversary = |years: i32| start.checked_add_months(Months::new(12 * years as u32));

    let mut whole = end.year() - start.year();
    while whole > 0 && anniversary(whole).map_or(true, |d| d > end) {
        whole -= 1;
    }

    let anchor = anniversary(whole).unwrap_or(start);
    whole as f64 + (end - anchor).num_days() as f64 / DAYS_PER_YEAR
}

/// Statistics for every product in the set, ordered by product name.
pub fn compute_all_stats(series: &SeriesSet) -> Vec<ProductStats> {
    let all: Vec<&ProductSeries> = series.iter().collect();
    let stats: Vec<ProductStats> = all
        .par_iter()
        .filter_map(|s| ProductStats::compute(s))
        .collect();

    tracing::debug!(products = stats.len(), "computed product statistics");
    stats
}

/// Statistics for the products in `basket`, keeping the name order of `stats`.
pub fn basket_stats(stats: &[ProductStats], basket: &[String]) -> Vec<ProductStats> {
    stats
        .iter()
        .filter(|s| basket.iter().any(|name| *name == s.product))
        .cloned()
        .collect()
}

/// Statistics for products observed more than once.
pub fn multi_observation_stats(stats: &[ProductStats]) -> Vec<ProductStats> {
    stats
        .iter()
        .filter(|s| s.observation_count > 1)
        .cloned()
        .collect()
}

pub fn format_percent(value: f64) -> String {
    // Avoid "-0.00%" for values that round to zero
    let rounded = round_cents(value);
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{:.2}%", rounded)
}

/// `$1,234.50` style currency text.
pub fn format_currency(value: f64) -> String {
    let text = format!("{:.2}", value.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}

/// Columns of the statistics table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsColumn {
    Product,
    ObservationCount,
    AveragePrice,
    FirstDate,
    FirstPrice,
    LatestDate,
    LatestPrice,
    AnnualizedGrowth,
}

impl StatsColumn {
    /// Whether the column holds decorated numbers rather than text.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            StatsColumn::ObservationCount
                | StatsColumn::AveragePrice
                | StatsColumn::FirstPrice
                | StatsColumn::LatestPrice
                | StatsColumn::AnnualizedGrowth
        )
    }
}

/// Sort direction for [`sort_stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Numeric value of decorated text such as `"$1,234.50"` or `" 10.00% "`.
///
/// Currency symbols, thousands separators, percent signs and whitespace are
/// stripped; anything that still fails to parse counts as zero.
pub fn decorated_number(text: &str) -> f64 {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, ',' | '%') && !c.is_whitespace() && !is_currency_symbol(*c))
        .collect();

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Characters of the Unicode currency-symbol (`Sc`) category.
fn is_currency_symbol(c: char) -> bool {
    matches!(
        c,
        '$' | '\u{A2}'..='\u{A5}'
            | '\u{58F}'
            | '\u{60B}'
            | '\u{7FE}'..='\u{7FF}'
            | '\u{9F2}'..='\u{9F3}'
            | '\u{9FB}'
            | '\u{AF1}'
            | '\u{BF9}'
            | '\u{E3F}'
            | '\u{17DB}'
            | '\u{20A0}'..='\u{20C0}'
            | '\u{A838}'
            | '\u{FDFC}'
            | '\u{FE69}'
            | '\u{FF04}'
            | '\u{FFE0}'..='\u{FFE1}'
            | '\u{FFE5}'..='\u{FFE6}'
            | '\u{11FDD}'..='\u{11FE0}'
            | '\u{1E2FF}'
            | '\u{1ECB0}'
    )
}

/// Compares two decorated numeric cells by value.
pub fn compare_decorated_numbers(a: &str, b: &str) -> Ordering {
    OrderedFloat(decorated_number(a)).cmp(&OrderedFloat(decorated_number(b)))
}

/// Compares two rows on one column, ascending.
///
/// Numeric columns compare by the value behind their decorated cell text,
/// date columns by calendar date and the product column lexically
/// (case-sensitive).
pub fn compare_stats(a: &ProductStats, b: &ProductStats, column: StatsColumn) -> Ordering {
    match column {
        StatsColumn::Product => a.product.cmp(&b.product),
        StatsColumn::FirstDate => a.first_date.cmp(&b.first_date),
        StatsColumn::LatestDate => a.latest_date.cmp(&b.latest_date),
        numeric => compare_decorated_numbers(&a.cell(numeric), &b.cell(numeric)),
    }
}

/// Returns a sorted copy of `stats`. The sort is stable.
pub fn sort_stats(
    stats: &[ProductStats],
    column: StatsColumn,
    direction: SortDirection,
) -> Vec<ProductStats> {
    let mut sorted = stats.to_vec();
    sorted.sort_by(|a, b| {
        let ord = compare_stats(a, b, column);
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
    sorted
}
