pub mod observation;
pub mod feed;
pub mod series;
pub mod period;
pub mod interpolation;
pub mod stats;
pub mod basket;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;

#[cfg(test)]
mod integration_tests;

pub use observation::{parse_feed_date, parse_feed_price, DateFormat, Observation, ParsedDate};
pub use feed::{
    parse_feed, parse_feed_with_summary, FeedSource, FeedSummary, FileFeedSource,
    InMemoryFeedSource,
};
pub use series::{chronological_listing, ProductSeries, SeriesSet};
pub use period::{enumerate_periods, global_period_range, Granularity, ParsePeriodError, Period};
pub use interpolation::{build_period_series, fill_gaps, period_averages, PeriodValue, ProductPeriodSeries};
pub use stats::{
    annualized_growth_pct,
    basket_stats,
    compare_decorated_numbers,
    compare_stats,
    compute_all_stats,
    multi_observation_stats,
    sort_stats,
    ProductStats,
    SortDirection,
    StatsColumn,
};
pub use basket::{
    aggregate, build_basket_table, BasketAggregate, BasketConfig, BasketSelection, BasketTable,
    UnitWeight,
};
pub use config::PipelineConfig;
pub use error::{ConfigError, FeedError, SourceError};
pub use pipeline::{product_detail, run_from_source, run_pipeline, PipelineOutput, ProductDetail};
pub use report::{format_basket_table, format_stats_table};
