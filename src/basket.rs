//! Basket selection and weighted aggregation.
//!
//! The basket is a configured set of products whose per-period values are
//! summed into one series. One product may be priced per pound and carries a
//! multiplier to bring it to a standard unit; everything else has weight 1.

use crate::interpolation::{build_period_series, ProductPeriodSeries};
use crate::observation::round_cents;
use crate::period::Period;
use crate::series::SeriesSet;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Curated basket of everyday groceries.
pub const DEFAULT_BASKET: [&str; 26] = [
    "2% Milk Gallon",
    "Bananas lb",
    "Big Dipper Chips",
    "Black Beans",
    "Blackberries",
    "Bran Flakes",
    "Celery",
    "Cheddar Cheese",
    "Cheese Crackers",
    "Chopped Walnuts",
    "Flat Leaf Spinach",
    "Frozen Blueberries",
    "Granny Smith Apples",
    "Greek Plain Yogurt",
    "Ground Coffee",
    "Half and Half",
    "Hot Sauce",
    "Ice Cream",
    "Large Eggs",
    "Multi Peppers",
    "Protein Energy Bar",
    "Protein Energy Bars",
    "Raisin Bran",
    "Thin Pizza",
    "Tuna",
    "Walnuts",
];

/// Products need strictly more observations than this to join a derived basket.
pub const DEFAULT_MIN_OBSERVATIONS: usize = 5;

/// Product priced per pound in the feed.
pub const PER_POUND_PRODUCT: &str = "Bananas lb";

/// Pounds per standard unit of the per-pound product.
pub const PER_POUND_MULTIPLIER: f64 = 5.0;

/// How the basket's products are chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BasketSelection {
    /// A fixed, ordered list of product names
    Curated { products: Vec<String> },
    /// Every product with more than `min_observations` observations, by name
    Threshold { min_observations: usize },
}

impl BasketSelection {
    pub fn curated<I, S>(products: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        BasketSelection::Curated {
            products: products.into_iter().map(Into::into).collect(),
        }
    }

    pub fn threshold(min_observations: usize) -> Self {
        BasketSelection::Threshold { min_observations }
    }

    /// Resolves the selection against the products seen in a feed.
    ///
    /// Curated products are returned as configured, including products the
    /// feed never mentions.
    pub fn resolve(&self, series: &SeriesSet) -> Vec<String> {
        match self {
            BasketSelection::Curated { products } => products.clone(),
            BasketSelection::Threshold { min_observations } => series
                .iter()
                .filter(|s| s.len() > *min_observations)
                .map(|s| s.product.clone())
                .collect(),
        }
    }
}

impl Default for BasketSelection {
    fn default() -> Self {
        BasketSelection::curated(DEFAULT_BASKET)
    }
}

/// A per-product multiplier converting its feed unit to the basket's unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitWeight {
    pub product: String,
    pub multiplier: f64,
}

/// Basket configuration: which products, and how they are weighted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketConfig {
    pub selection: BasketSelection,
    #[serde(default)]
    pub unit_weight: Option<UnitWeight>,
}

impl Default for BasketConfig {
    fn default() -> Self {
        BasketConfig {
            selection: BasketSelection::default(),
            unit_weight: Some(UnitWeight {
                product: PER_POUND_PRODUCT.to_string(),
                multiplier: PER_POUND_MULTIPLIER,
            }),
        }
    }
}

impl BasketConfig {
    /// Weight applied to `product`'s values in the basket sum.
    pub fn weight_of(&self, product: &str) -> f64 {
        match &self.unit_weight {
            Some(unit) if unit.product == product => unit.multiplier,
            _ => 1.0,
        }
    }

    /// A product's contribution to a period total; absent values contribute zero.
    pub fn weighted_value(&self, product: &str, value: Option<f64>) -> f64 {
        value.map_or(0.0, |v| v * self.weight_of(product))
    }
}

/// The basket's weighted total per period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketAggregate {
    pub periods: Vec<Period>,
    /// Weighted totals, rounded to cents, aligned with `periods`
    pub totals: Vec<f64>,
}

impl BasketAggregate {
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// The most recent period and its total.
    pub fn latest(&self) -> Option<(Period, f64)> {
        Some((*self.periods.last()?, *self.totals.last()?))
    }
}

/// Sums each period across the basket's series.
///
/// Every series must cover `periods`; a missing or absent value adds zero.
pub fn aggregate(
    periods: &[Period],
    basket: &[ProductPeriodSeries],
    config: &BasketConfig,
) -> BasketAggregate {
    let mut totals = vec![0.0; periods.len()];

    for series in basket {
        for (idx, total) in totals.iter_mut().enumerate() {
            *total += config.weighted_value(&series.product, series.value_at(idx));
        }
    }

    BasketAggregate {
        periods: periods.to_vec(),
        totals: totals.into_iter().map(round_cents).collect(),
    }
}

/// Basket products with their period values, plus the weighted totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketTable {
    pub periods: Vec<Period>,
    pub products: Vec<ProductPeriodSeries>,
    pub totals: Vec<f64>,
}

impl BasketTable {
    /// Whether the value of `product` at period index `idx` is an estimate.
    pub fn is_estimate(&self, product: &str, idx: usize) -> bool {
        self.products
            .iter()
            .find(|p| p.product == product)
            .and_then(|p| p.values.get(idx))
            .is_some_and(|v| v.is_estimated)
    }

    pub fn aggregate(&self) -> BasketAggregate {
        BasketAggregate {
            periods: self.periods.clone(),
            totals: self.totals.clone(),
        }
    }
}

/// Resolves the basket, builds every basket product's series over `periods`
/// and aggregates them.
pub fn build_basket_table(
    series: &SeriesSet,
    periods: &[Period],
    config: &BasketConfig,
) -> BasketTable {
    let products = config.selection.resolve(series);

    let basket: Vec<ProductPeriodSeries> = products
        .par_iter()
        .map(|name| build_period_series(&series.series(name), periods))
        .collect();

    let aggregate = aggregate(periods, &basket, config);

    tracing::debug!(
        products = basket.len(),
        periods = periods.len(),
        "built basket table"
    );

    BasketTable {
        periods: aggregate.periods,
        products: basket,
        totals: aggregate.totals,
    }
}
