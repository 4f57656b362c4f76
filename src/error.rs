//! Error types for the outer boundary of the pipeline.
//!
//! The transform core never fails: malformed rows are dropped, unknown products
//! yield empty series. Errors only exist where the crate touches the outside
//! world (reading a feed, reading configuration) and for describing why a row
//! was rejected.

/// Reasons a single feed row was rejected by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// Fewer than four fields, or one of the four fields is empty
    MissingField(&'static str),
    /// Price is not a finite, non-negative number
    InvalidPrice(String),
    /// Date matches neither `YYYY-MM-DD` nor `MM/DD/YYYY`
    InvalidDate(String),
}

impl std::fmt::Display for FeedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedError::MissingField(field) => write!(f, "Missing field: {}", field),
            FeedError::InvalidPrice(text) => write!(f, "Invalid price: '{}'", text),
            FeedError::InvalidDate(text) => write!(f, "Invalid date: '{}'", text),
        }
    }
}

impl std::error::Error for FeedError {}

/// Errors that can occur when reading raw feed text from a source.
#[derive(Debug)]
pub enum SourceError {
    /// The source could not be read
    Io(std::io::Error),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Io(err) => write!(f, "Failed to read feed: {}", err),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        SourceError::Io(err)
    }
}

/// Errors raised while resolving pipeline configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// An environment variable holds a value we cannot interpret
    InvalidValue { key: String, value: String },
    /// The basket product file could not be read
    Io(std::io::Error),
    /// The basket product file is not valid JSON
    Json(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { key, value } => {
                write!(f, "Invalid value for {}: '{}'", key, value)
            }
            ConfigError::Io(err) => write!(f, "Failed to read configuration: {}", err),
            ConfigError::Json(err) => write!(f, "JSON error: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Json(err)
    }
}
