//! Per-period averaging and gap filling.
//!
//! A product's observations are averaged into the shared period range, then
//! every run of empty periods is filled from its neighbours:
//!
//! - bounded on both sides: evenly spaced points strictly between the bounds
//! - bounded on the left only: the left value is carried forward
//! - bounded on the right only: the right value is carried backward
//! - unbounded: the run stays empty
//!
//! Filled periods are flagged as estimates so callers can tell them apart
//! from averages of real observations.

use crate::period::Period;
use crate::series::ProductSeries;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::trace;

/// Value of one product in one period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodValue {
    pub period: Period,
    /// Average of real observations, an estimate, or `None` when unresolvable
    pub value: Option<f64>,
    /// `true` when the period had no real observation
    pub is_estimated: bool,
}

/// One product's values over the full shared period range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPeriodSeries {
    pub product: String,
    pub values: Vec<PeriodValue>,
}

impl ProductPeriodSeries {
    /// Value at period index `idx`, if resolved.
    pub fn value_at(&self, idx: usize) -> Option<f64> {
        self.values.get(idx).and_then(|v| v.value)
    }

    pub fn periods(&self) -> Vec<Period> {
        self.values.iter().map(|v| v.period).collect()
    }

    /// Number of periods backed by real observations.
    pub fn observed_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_estimated).count()
    }
}

/// Arithmetic mean of the observed prices falling in each period.
///
/// Observations outside `periods` are ignored.
pub fn period_averages(series: &ProductSeries, periods: &[Period]) -> Vec<Option<f64>> {
    let Some(first) = periods.first() else {
        return Vec::new();
    };
    let granularity = first.granularity();

    let mut buckets: HashMap<Period, (f64, usize)> = HashMap::new();
    for obs in &series.observations {
        let entry = buckets.entry(granularity.period_of(obs.date)).or_insert((0.0, 0));
        entry.0 += obs.price;
        entry.1 += 1;
    }

    periods
        .iter()
        .map(|period| {
            buckets
                .get(period)
                .map(|(sum, count)| sum / *count as f64)
        })
        .collect()
}

/// Fills runs of missing values in a single left-to-right pass.
///
/// Returns `(value, is_estimated)` per input slot; slots that had a value are
/// returned unchanged with `is_estimated = false`.
pub fn fill_gaps(product: &str, averages: &[Option<f64>]) -> Vec<(Option<f64>, bool)> {
    let mut filled: Vec<(Option<f64>, bool)> = averages.iter().map(|v| (*v, v.is_none())).collect();

    let mut idx = 0;
    while idx < averages.len() {
        if averages[idx].is_some() {
            idx += 1;
            continue;
        }

        let run_start = idx;
        let mut run_end = idx;
        while run_end < averages.len() && averages[run_end].is_none() {
            run_end += 1;
        }

        let prev = if run_start > 0 { filled[run_start - 1].0 } else { None };
        let next = averages.get(run_end).copied().flatten();
        let num_missing = run_end - run_start;

        trace!(
            product = product,
            run_start,
            num_missing,
            prev = ?prev,
            next = ?next,
            "filling gap"
        );

        for k in 0..num_missing {
            filled[run_start + k].0 = match (prev, next) {
                (Some(p), Some(n)) => {
                    Some(p + (n - p) * (k + 1) as f64 / (num_missing + 1) as f64)
                }
                (Some(p), None) => Some(p),
                (None, Some(n)) => Some(n),
                (None, None) => None,
            };
        }

        idx = run_end;
    }

    filled
}

/// Builds a product's gap-free series over `periods`.
pub fn build_period_series(series: &ProductSeries, periods: &[Period]) -> ProductPeriodSeries {
    let averages = period_averages(series, periods);
    let filled = fill_gaps(&series.product, &averages);

    let values = periods
        .iter()
        .zip(filled)
        .map(|(period, (value, is_estimated))| PeriodValue {
            period: *period,
            value,
            is_estimated,
        })
        .collect();

    ProductPeriodSeries {
        product: series.product.clone(),
        values,
    }
}
