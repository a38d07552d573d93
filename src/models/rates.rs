//! Per-currency default exchange rates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Currency;

/// Seed values used when nothing has been stored yet.
const SEED: [(Currency, f64); 3] = [
    (Currency::Cop, 4200.0),
    (Currency::Usd, 1.16),
    (Currency::Eur, 1.0),
];

/// Default exchange rate per currency, expressed as units of that
/// currency per unit of the base currency.
///
/// Overwritten (last write wins) whenever a movement is saved with an
/// explicit rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefaultRates(BTreeMap<Currency, f64>);

impl Default for DefaultRates {
    #[inline]
    fn default() -> Self {
        Self::seeded()
    }
}

impl DefaultRates {
    /// Table holding only the built-in seed values.
    #[inline]
    #[must_use]
    pub fn seeded() -> Self {
        Self(SEED.into_iter().collect())
    }

    /// Empty table, used for tests and to model a missing store entry.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Seeds overlaid with `stored`; stored entries win.
    #[must_use]
    pub fn merged_with(stored: Option<Self>) -> Self {
        let mut table = Self::seeded();
        if let Some(stored_rates) = stored {
            table.0.extend(stored_rates.0);
        }
        table
    }

    /// Returns the default rate for `currency` if it is usable (positive
    /// and finite).
    #[inline]
    #[must_use]
    pub fn get(&self, currency: Currency) -> Option<f64> {
        self.0
            .get(&currency)
            .copied()
            .filter(|rate| is_usable_rate(*rate))
    }

    /// Stores `rate` as the default for `currency`.
    ///
    /// Returns `false` and leaves the table untouched when the rate is not
    /// positive and finite.
    pub fn set(&mut self, currency: Currency, rate: f64) -> bool {
        if !is_usable_rate(rate) {
            return false;
        }
        let _previous = self.0.insert(currency, rate);
        true
    }

    /// Iterates over all entries in currency order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (Currency, f64)> + '_ {
        self.0.iter().map(|(currency, rate)| (*currency, *rate))
    }
}

/// A rate may be divided by only when it is positive and finite.
#[inline]
#[must_use]
pub fn is_usable_rate(rate: f64) -> bool {
    rate.is_finite() && rate > 0.0_f64
}
