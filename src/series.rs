use crate::observation::Observation;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All observations of one product, in chronological order.
///
/// Observations sharing a date keep the order they had in the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSeries {
    pub product: String,
    pub observations: Vec<Observation>,
}

impl ProductSeries {
    /// Builds a series from observations of a single product.
    ///
    /// The sort is stable, so same-date observations stay in input order.
    pub fn new(product: impl Into<String>, mut observations: Vec<Observation>) -> Self {
        observations.sort_by_key(|obs| obs.date);
        ProductSeries {
            product: product.into(),
            observations,
        }
    }

    /// An empty series, returned for products that were never observed.
    pub fn empty(product: impl Into<String>) -> Self {
        ProductSeries {
            product: product.into(),
            observations: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.observations.first()
    }

    pub fn latest(&self) -> Option<&Observation> {
        self.observations.last()
    }

    /// Earliest and latest observation dates, if any.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.first()?.date, self.latest()?.date))
    }
}

/// Every product's series, keyed by exact product name.
///
/// Iteration order is the byte-wise order of product names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesSet {
    series: BTreeMap<String, ProductSeries>,
}

impl SeriesSet {
    /// Groups observations by product name (case-sensitive) and sorts each
    /// group chronologically.
    pub fn from_observations(observations: &[Observation]) -> Self {
        let mut grouped: BTreeMap<String, Vec<Observation>> = BTreeMap::new();
        for obs in observations {
            grouped
                .entry(obs.product.clone())
                .or_default()
                .push(obs.clone());
        }

        let series = grouped
            .into_iter()
            .map(|(product, obs)| {
                let built = ProductSeries::new(product.clone(), obs);
                (product, built)
            })
            .collect();

        SeriesSet { series }
    }

    /// Returns the series for `product`, or an empty series if it was never seen.
    pub fn series(&self, product: &str) -> ProductSeries {
        self.series
            .get(product)
            .cloned()
            .unwrap_or_else(|| ProductSeries::empty(product))
    }

    pub fn get(&self, product: &str) -> Option<&ProductSeries> {
        self.series.get(product)
    }

    pub fn contains(&self, product: &str) -> bool {
        self.series.contains_key(product)
    }

    /// Product names in sorted order.
    pub fn products(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductSeries> {
        self.series.values()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Earliest and latest observation dates across every product.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.iter()
            .filter_map(ProductSeries::date_span)
            .reduce(|(lo, hi), (start, end)| (lo.min(start), hi.max(end)))
    }
}

/// All observations ordered by date, then product name; ties keep feed order.
///
/// This is the flat "raw prices" listing.
pub fn chronological_listing(observations: &[Observation]) -> Vec<Observation> {
    let mut listing = observations.to_vec();
    listing.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.product.cmp(&b.product)));
    listing
}
