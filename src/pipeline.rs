//! End-to-end transform: feed text → statistics and basket series.
//!
//! A run is a pure function of the feed text and the configuration:
//! parse → group → bucket → interpolate → aggregate. Nothing is shared
//! between runs.

use crate::basket::{build_basket_table, BasketAggregate, BasketTable};
use crate::config::PipelineConfig;
use crate::error::SourceError;
use crate::feed::{parse_feed_with_summary, FeedSource, FeedSummary};
use crate::observation::Observation;
use crate::period::{global_period_range, Granularity, Period};
use crate::series::SeriesSet;
use crate::stats::{compute_all_stats, ProductStats};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// All outputs of a single pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub summary: FeedSummary,
    pub observations: Vec<Observation>,
    /// Statistics for every product, ordered by product name
    pub stats: Vec<ProductStats>,
    /// The shared period range every basket series is aligned to
    pub periods: Vec<Period>,
    /// Basket products' period values and totals
    pub basket: BasketTable,
}

impl PipelineOutput {
    /// The basket's weighted totals per period.
    pub fn aggregate(&self) -> BasketAggregate {
        self.basket.aggregate()
    }

    /// Statistics for one product, if it was observed.
    pub fn stats_for(&self, product: &str) -> Option<&ProductStats> {
        self.stats.iter().find(|s| s.product == product)
    }
}

/// Runs the full transform over feed text.
pub fn run_pipeline(text: &str, config: &PipelineConfig) -> PipelineOutput {
    let (observations, summary) = parse_feed_with_summary(text);
    let series = SeriesSet::from_observations(&observations);
    let periods = global_period_range(config.granularity, &series);
    let stats = compute_all_stats(&series);
    let basket = build_basket_table(&series, &periods, &config.basket);

    tracing::info!(
        rows_kept = summary.rows_kept,
        rows_dropped = summary.rows_dropped,
        products = series.len(),
        periods = periods.len(),
        granularity = %config.granularity,
        "pipeline run complete"
    );

    PipelineOutput {
        summary,
        observations,
        stats,
        periods,
        basket,
    }
}

/// Reads the feed from `source` and runs the transform.
///
/// # Errors
/// Only reading the source can fail; the transform itself cannot.
pub fn run_from_source(
    source: &dyn FeedSource,
    config: &PipelineConfig,
) -> Result<PipelineOutput, SourceError> {
    let text = source.read_feed()?;
    Ok(run_pipeline(&text, config))
}

/// One row of a product's detail listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRow {
    pub date: NaiveDate,
    pub period: Period,
    pub price: f64,
}

/// A single product's observations in date order, labelled with their period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetail {
    pub product: String,
    pub rows: Vec<DetailRow>,
}

/// Builds the detail listing of `product`; empty for unknown products.
pub fn product_detail(
    observations: &[Observation],
    product: &str,
    granularity: Granularity,
) -> ProductDetail {
    let series = SeriesSet::from_observations(observations).series(product);
    let rows = series
        .observations
        .iter()
        .map(|obs| DetailRow {
            date: obs.date,
            period: granularity.period_of(obs.date),
            price: obs.price,
        })
        .collect();

    ProductDetail {
        product: product.to_string(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basket::{BasketConfig, BasketSelection, UnitWeight};
    use crate::feed::InMemoryFeedSource;

    const FEED: &str = "Filename,Date,Product,Price\n\
        a.jpg,2023-01-10,Milk,3.00\n\
        a.jpg,2023-01-10,Bananas lb,0.50\n\
        b.jpg,2023-08-15,Milk,4.00\n\
        c.jpg,12/01/2023,Bananas lb,0.70\n\
        c.jpg,12/01/2023,Milk,oops\n";

    fn config() -> PipelineConfig {
        PipelineConfig::new(
            Granularity::Quarter,
            BasketConfig {
                selection: BasketSelection::curated(["Milk", "Bananas lb"]),
                unit_weight: Some(UnitWeight {
                    product: "Bananas lb".to_string(),
                    multiplier: 5.0,
                }),
            },
        )
    }

    #[test]
    fn test_run_pipeline() {
        let output = run_pipeline(FEED, &config());

        assert_eq!(output.summary.rows_kept, 4);
        assert_eq!(output.summary.rows_dropped, 1);

        let labels: Vec<String> = output.periods.iter().map(|p| p.to_string()).collect();
        assert_eq!(labels, vec!["Q1-2023", "Q2-2023", "Q3-2023", "Q4-2023"]);

        // Milk: [3, 3.5 (est), 4, 4 (est)]
        // Bananas: [0.5, 0.567 (est), 0.633 (est), 0.7] * 5
        let aggregate = output.aggregate();
        assert_eq!(aggregate.totals, vec![5.5, 6.33, 7.17, 7.5]);

        let milk = output.stats_for("Milk").unwrap();
        assert_eq!(milk.observation_count, 2);
        assert_eq!(milk.average_price, 3.5);
        assert!(output.stats_for("Bread").is_none());
    }

    #[test]
    fn test_run_pipeline_on_empty_feed() {
        let output = run_pipeline("", &config());
        assert!(output.observations.is_empty());
        assert!(output.stats.is_empty());
        assert!(output.periods.is_empty());
        assert!(output.aggregate().is_empty());
        assert_eq!(output.basket.products.len(), 2);
    }

    #[test]
    fn test_run_from_source() {
        let source = InMemoryFeedSource::new(FEED);
        let output = run_from_source(&source, &config()).unwrap();
        assert_eq!(output.stats.len(), 2);
    }

    #[test]
    fn test_product_detail() {
        let output = run_pipeline(FEED, &config());
        let detail = product_detail(&output.observations, "Milk", Granularity::Quarter);
        assert_eq!(detail.rows.len(), 2);
        assert_eq!(detail.rows[1].period.to_string(), "Q3-2023");

        let missing = product_detail(&output.observations, "milk", Granularity::Quarter);
        assert!(missing.rows.is_empty());
    }
}
