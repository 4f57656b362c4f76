use crate::basket::{BasketConfig, BasketSelection, DEFAULT_MIN_OBSERVATIONS};
use crate::error::ConfigError;
use crate::period::Granularity;
use serde::{Deserialize, Serialize};

pub const GRANULARITY_VAR: &str = "BASKET_GRANULARITY";
pub const MODE_VAR: &str = "BASKET_MODE";
pub const MIN_OBSERVATIONS_VAR: &str = "BASKET_MIN_OBSERVATIONS";
pub const PRODUCTS_FILE_VAR: &str = "BASKET_PRODUCTS_FILE";

/// Everything a pipeline run needs besides the feed text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Bucket size for the basket series (default: quarter)
    #[serde(default)]
    pub granularity: Granularity,
    /// Basket selection and unit weighting (default: curated list, bananas x5)
    #[serde(default)]
    pub basket: BasketConfig,
}

impl PipelineConfig {
    pub fn new(granularity: Granularity, basket: BasketConfig) -> Self {
        PipelineConfig {
            granularity,
            basket,
        }
    }

    /// Reads configuration from environment variables.
    ///
    /// - `BASKET_GRANULARITY`: `quarter` (default) or `year`
    /// - `BASKET_MODE`: `curated` (default) or `threshold`
    /// - `BASKET_MIN_OBSERVATIONS`: threshold for `threshold` mode (default: 5)
    /// - `BASKET_PRODUCTS_FILE`: JSON array of product names for `curated` mode
    ///
    /// # Errors
    /// Returns `ConfigError` if a variable holds an unrecognised value or the
    /// products file cannot be read or parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`PipelineConfig::from_env`], with variables supplied by `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = PipelineConfig::default();

        if let Some(value) = lookup(GRANULARITY_VAR) {
            config.granularity = value.parse().map_err(|_| ConfigError::InvalidValue {
                key: GRANULARITY_VAR.to_string(),
                value: value.clone(),
            })?;
        }

        let mode = lookup(MODE_VAR).unwrap_or_else(|| "curated".to_string());
        config.basket.selection = match mode.trim().to_ascii_lowercase().as_str() {
            "curated" => match lookup(PRODUCTS_FILE_VAR) {
                Some(path) => BasketSelection::curated(read_products_file(&path)?),
                None => BasketSelection::default(),
            },
            "threshold" => {
                let min_observations = match lookup(MIN_OBSERVATIONS_VAR) {
                    Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                        key: MIN_OBSERVATIONS_VAR.to_string(),
                        value: value.clone(),
                    })?,
                    None => DEFAULT_MIN_OBSERVATIONS,
                };
                BasketSelection::threshold(min_observations)
            }
            _ => {
                return Err(ConfigError::InvalidValue {
                    key: MODE_VAR.to_string(),
                    value: mode.clone(),
                })
            }
        };

        tracing::debug!(
            granularity = %config.granularity,
            selection = ?config.basket.selection,
            "resolved pipeline configuration"
        );

        Ok(config)
    }
}

/// Reads a JSON array of product names.
pub fn read_products_file(path: &str) -> Result<Vec<String>, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    let products: Vec<String> = serde_json::from_str(&text)?;
    Ok(products)
}
