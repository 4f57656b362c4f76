//! Feed parsing and feed sources.
//!
//! The feed is hand-curated comma-separated text with one header line and the
//! columns `source, date, product, price`. Noise is expected, so rows that
//! cannot be turned into an [`Observation`] are dropped and counted rather
//! than reported as errors.

use crate::error::{FeedError, SourceError};
use crate::observation::{parse_feed_date, parse_feed_price, DateFormat, Observation};
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Counts describing what happened to the rows of one feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSummary {
    /// Data rows seen after dropping blank lines, comma-only lines and the header
    pub rows_read: usize,
    /// Rows turned into observations
    pub rows_kept: usize,
    /// Rows dropped because a field was missing or unparseable
    pub rows_dropped: usize,
    /// Kept rows whose date was written `YYYY-MM-DD`
    pub iso_dates: usize,
    /// Kept rows whose date was written `MM/DD/YYYY`
    pub month_day_year_dates: usize,
}

/// Parses feed text into observations, silently dropping malformed rows.
///
/// Parsing is a pure function of the text: the same input always yields the
/// same observations in the same order.
pub fn parse_feed(text: &str) -> Vec<Observation> {
    parse_feed_with_summary(text).0
}

/// Parses feed text into observations and reports row counts.
pub fn parse_feed_with_summary(text: &str) -> (Vec<Observation>, FeedSummary) {
    // (source line number, line) for every line that carries data
    let data_lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !is_ignorable_line(line))
        .skip(1)
        .map(|(idx, line)| (idx + 1, line))
        .collect();

    let body = data_lines
        .iter()
        .map(|(_, line)| *line)
        .collect::<Vec<_>>()
        .join("\n");

    // One record per line: only '\n' ends a record, a stray '\r' is field data
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::None)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_reader(body.as_bytes());

    let mut observations = Vec::with_capacity(data_lines.len());
    let mut summary = FeedSummary::default();

    let mut records = reader.records();
    for (line, _) in &data_lines {
        summary.rows_read += 1;

        let parsed = match records.next() {
            Some(Ok(record)) => parse_record(&record),
            _ => Err(FeedError::MissingField("record")),
        };

        match parsed {
            Ok((observation, format)) => {
                summary.rows_kept += 1;
                match format {
                    DateFormat::Iso => summary.iso_dates += 1,
                    DateFormat::MonthDayYear => summary.month_day_year_dates += 1,
                }
                observations.push(observation);
            }
            Err(e) => {
                summary.rows_dropped += 1;
                log::debug!("Dropping feed line {}: {}", line, e);
            }
        }
    }

    tracing::debug!(
        rows_read = summary.rows_read,
        rows_kept = summary.rows_kept,
        rows_dropped = summary.rows_dropped,
        iso_dates = summary.iso_dates,
        month_day_year_dates = summary.month_day_year_dates,
        "parsed price feed"
    );

    if summary.iso_dates > 0 && summary.month_day_year_dates > 0 {
        tracing::warn!(
            month_day_year_dates = summary.month_day_year_dates,
            "feed mixes date layouts; slash dates are read as MM/DD/YYYY"
        );
    }

    (observations, summary)
}

/// Blank lines and lines made only of commas carry no data and are not
/// counted as the header either.
fn is_ignorable_line(line: &str) -> bool {
    line.trim().is_empty() || line.chars().all(|c| c == ',')
}

fn parse_record(record: &StringRecord) -> Result<(Observation, DateFormat), FeedError> {
    let source = required_field(record, 0, "source")?;
    let date_text = required_field(record, 1, "date")?;
    let product = required_field(record, 2, "product")?;
    let price_text = required_field(record, 3, "price")?;

    let price = parse_feed_price(price_text)?;
    let parsed_date = parse_feed_date(date_text)?;

    Ok((
        Observation::new(source, product, parsed_date.date, price),
        parsed_date.format,
    ))
}

fn required_field<'r>(
    record: &'r StringRecord,
    index: usize,
    name: &'static str,
) -> Result<&'r str, FeedError> {
    match record.get(index) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(FeedError::MissingField(name)),
    }
}

/// Abstraction over where raw feed text comes from.
///
/// The pipeline only ever consumes text; how it was retrieved (file, HTTP,
/// test fixture) is the source's business.
pub trait FeedSource {
    /// Returns the full feed text.
    ///
    /// # Errors
    /// Returns an error if the underlying source cannot be read.
    fn read_feed(&self) -> Result<String, SourceError>;
}

/// Feed source backed by a CSV file on disk.
#[derive(Debug, Clone)]
pub struct FileFeedSource {
    path: PathBuf,
}

impl FileFeedSource {
    /// Creates a file-backed source. The file is only opened on `read_feed`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileFeedSource {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FeedSource for FileFeedSource {
    fn read_feed(&self) -> Result<String, SourceError> {
        let text = std::fs::read_to_string(&self.path)?;
        tracing::info!(path = %self.path.display(), bytes = text.len(), "read feed file");
        Ok(text)
    }
}

/// In-memory feed source, mostly for tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFeedSource {
    text: String,
}

impl InMemoryFeedSource {
    pub fn new(text: impl Into<String>) -> Self {
        InMemoryFeedSource { text: text.into() }
    }
}

impl FeedSource for InMemoryFeedSource {
    fn read_feed(&self) -> Result<String, SourceError> {
        Ok(self.text.clone())
    }
}
