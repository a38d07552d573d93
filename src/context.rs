//! Explicit ledger context and currency normalization.
//!
//! A [`LedgerContext`] is built once from the store when the ledger is
//! opened and is passed by reference into every aggregation. There is no
//! global state: two contexts with different rate tables can coexist.

use crate::models::{CategoryRegistry, Currency, DefaultRates, Movement, MovementId, is_usable_rate};

/// Base currency, default-rate table and category registry.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerContext {
    /// Accounting currency every amount is normalized into.
    base: Currency,
    /// Per-currency fallback rates.
    rates: DefaultRates,
    /// Allowed categories per movement type.
    registry: CategoryRegistry,
}

impl Default for LedgerContext {
    #[inline]
    fn default() -> Self {
        Self::new(Currency::Eur, DefaultRates::seeded())
    }
}

impl LedgerContext {
    /// Creates a context with the built-in category registry.
    #[inline]
    #[must_use]
    pub const fn new(base: Currency, rates: DefaultRates) -> Self {
        Self {
            base,
            rates,
            registry: CategoryRegistry::new(),
        }
    }

    /// The accounting currency.
    #[inline]
    #[must_use]
    pub const fn base(&self) -> Currency {
        self.base
    }

    /// The default-rate table.
    #[inline]
    #[must_use]
    pub const fn rates(&self) -> &DefaultRates {
        &self.rates
    }

    /// The category registry.
    #[inline]
    #[must_use]
    pub const fn registry(&self) -> CategoryRegistry {
        self.registry
    }

    /// Default rate for `currency`, or `1` when none is usable.
    #[inline]
    #[must_use]
    pub fn default_rate(&self, currency: Currency) -> f64 {
        self.rates.get(currency).unwrap_or(1.0_f64)
    }

    /// Overrides the default rate for `currency` (last write wins).
    ///
    /// Returns `false` if the rate is not positive and finite.
    #[inline]
    pub fn set_default_rate(&mut self, currency: Currency, rate: f64) -> bool {
        self.rates.set(currency, rate)
    }

    /// Rate the movement is divided by: its own when usable, else the
    /// table default, else `1`.
    #[must_use]
    pub fn effective_rate(&self, movement: &Movement) -> f64 {
        match movement.rate {
            Some(rate) if is_usable_rate(rate) => rate,
            Some(rate) => {
                tracing::warn!(
                    id = %movement.id,
                    rate,
                    currency = %movement.currency,
                    "unusable exchange rate replaced by default"
                );
                self.default_rate(movement.currency)
            }
            None => self.default_rate(movement.currency),
        }
    }

    /// Converts the movement amount into the base currency.
    ///
    /// Never fails. A non-finite amount contributes `0` and is logged; an
    /// unusable rate degrades to the table default and then to `1`.
    #[must_use]
    pub fn normalize(&self, movement: &Movement) -> f64 {
        if !movement.amount.is_finite() {
            tracing::warn!(
                id = %movement.id,
                amount = movement.amount,
                "non-finite amount counted as zero"
            );
            return 0.0_f64;
        }
        if movement.currency == self.base {
            return movement.amount;
        }
        movement.amount / self.effective_rate(movement)
    }

    /// Normalized amount with the balance sign applied (`+` income,
    /// `-` expense).
    #[inline]
    #[must_use]
    pub fn signed(&self, movement: &Movement) -> f64 {
        self.normalize(movement) * movement.kind.sign()
    }

    /// Scans `records` for values that normalization has to paper over.
    #[must_use]
    pub fn data_quality(&self, records: &[Movement]) -> Vec<DataIssue> {
        let mut issues = Vec::new();
        for movement in records {
            if !movement.amount.is_finite() {
                issues.push(DataIssue {
                    id: movement.id.clone(),
                    kind: IssueKind::NonFiniteAmount(movement.amount),
                });
            }
            if movement.currency != self.base
                && let Some(rate) = movement.rate
                && !is_usable_rate(rate)
            {
                issues.push(DataIssue {
                    id: movement.id.clone(),
                    kind: IssueKind::InvalidRate(rate),
                });
            }
        }
        issues
    }
}

/// A stored movement whose values are tolerated but suspect.
#[derive(Debug, Clone, PartialEq)]
pub struct DataIssue {
    /// Offending movement.
    pub id: MovementId,
    /// What is wrong with it.
    pub kind: IssueKind,
}

/// Kind of data-quality problem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IssueKind {
    /// Amount is NaN or infinite; counted as zero.
    NonFiniteAmount(f64),
    /// Rate is zero, negative or non-finite; replaced by the default.
    InvalidRate(f64),
}

impl core::fmt::Display for IssueKind {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match *self {
            Self::NonFiniteAmount(amount) => write!(f, "non-finite amount {amount}"),
            Self::InvalidRate(rate) => write!(f, "unusable exchange rate {rate}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MovementType;

    fn movement(amount: f64, currency: Currency, rate: Option<f64>) -> Movement {
        Movement {
            id: MovementId::generate(),
            kind: MovementType::Variable,
            category: "Ocio".to_owned(),
            amount,
            currency,
            rate,
            description: String::new(),
            date: "2024-01-20".to_owned(),
            enabled: true,
        }
    }

    #[test]
    fn base_currency_is_unchanged() {
        let ctx = LedgerContext::default();
        for rate in [None, Some(3.0), Some(0.0), Some(-1.0)] {
            let value = ctx.normalize(&movement(123.45, Currency::Eur, rate));
            assert!((value - 123.45).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn foreign_currency_divides_by_rate() {
        let ctx = LedgerContext::default();
        let value = ctx.normalize(&movement(100.0, Currency::Usd, Some(2.0)));
        assert!((value - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unusable_rate_falls_back_to_default() {
        let ctx = LedgerContext::default();
        for rate in [None, Some(0.0), Some(-4.0), Some(f64::NAN)] {
            let value = ctx.normalize(&movement(8400.0, Currency::Cop, rate));
            assert!((value - 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn missing_default_falls_back_to_one() {
        let ctx = LedgerContext::new(Currency::Eur, DefaultRates::empty());
        let value = ctx.normalize(&movement(70.0, Currency::Usd, Some(0.0)));
        assert!((value - 70.0).abs() < f64::EPSILON);
        let value = ctx.normalize(&movement(70.0, Currency::Usd, None));
        assert!((value - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn non_finite_amount_contributes_zero() {
        let ctx = LedgerContext::default();
        assert!(ctx.normalize(&movement(f64::NAN, Currency::Eur, None)).abs() < f64::EPSILON);
        assert!(
            ctx.normalize(&movement(f64::INFINITY, Currency::Usd, Some(2.0)))
                .abs()
                < f64::EPSILON
        );
    }

    #[test]
    fn signed_applies_type_sign() {
        let ctx = LedgerContext::default();
        let mut income = movement(10.0, Currency::Eur, None);
        income.kind = MovementType::Income;
        assert!((ctx.signed(&income) - 10.0).abs() < f64::EPSILON);
        assert!((ctx.signed(&movement(10.0, Currency::Eur, None)) + 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn other_base_currency() {
        let ctx = LedgerContext::new(Currency::Usd, DefaultRates::seeded());
        let value = ctx.normalize(&movement(5.0, Currency::Usd, Some(9.0)));
        assert!((value - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn set_default_rate_changes_fallback() {
        let mut ctx = LedgerContext::default();
        assert!(ctx.set_default_rate(Currency::Cop, 4000.0));
        assert!(!ctx.set_default_rate(Currency::Cop, 0.0));
        let value = ctx.normalize(&movement(8000.0, Currency::Cop, None));
        assert!((value - 2.0).abs() < 1e-12);
    }

    #[test]
    fn data_quality_reports_bad_values() {
        let ctx = LedgerContext::default();
        let records = vec![
            movement(10.0, Currency::Eur, Some(1.0)),
            movement(f64::NAN, Currency::Eur, Some(1.0)),
            movement(10.0, Currency::Usd, Some(0.0)),
        ];
        let issues = ctx.data_quality(&records);
        assert_eq!(issues.len(), 2);
        assert!(matches!(issues.first().map(|i| i.kind), Some(IssueKind::NonFiniteAmount(_))));
        assert!(matches!(issues.get(1).map(|i| i.kind), Some(IssueKind::InvalidRate(_))));
        assert!(issues.get(1).unwrap().kind.to_string().contains("exchange rate"));
    }

    #[test]
    fn data_quality_ignores_rate_of_base_currency() {
        let ctx = LedgerContext::default();
        let records = vec![
            movement(10.0, Currency::Eur, Some(0.0)),
            movement(10.0, Currency::Eur, Some(f64::NAN)),
        ];
        assert!(ctx.data_quality(&records).is_empty());

        let usd_base = LedgerContext::new(Currency::Usd, DefaultRates::seeded());
        let issues = usd_base.data_quality(&records);
        assert_eq!(issues.len(), 2);
    }
}
