//! Predicate filter over the movement collection.

use crate::context::LedgerContext;
use crate::models::{Movement, MovementType};

/// Criteria for narrowing a movement listing.
///
/// All set criteria must hold; unset (or blank) criteria match everything.
///
/// # Example
///
/// ```rust
/// use cashbook::models::MovementType;
/// use cashbook::views::MovementFilter;
///
/// let filter = MovementFilter::new()
///     .date_range("2024-01-01", "2024-03-31")
///     .kind(MovementType::Variable)
///     .description("pharmacy");
/// ```
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MovementFilter {
    /// Earliest date (inclusive, `YYYY-MM-DD`).
    pub date_from: Option<String>,
    /// Latest date (inclusive, `YYYY-MM-DD`).
    pub date_to: Option<String>,
    /// Movement type.
    pub kind: Option<MovementType>,
    /// Exact category name.
    pub category: Option<String>,
    /// Minimum normalized amount (inclusive).
    pub amount_min: Option<f64>,
    /// Maximum normalized amount (inclusive).
    pub amount_max: Option<f64>,
    /// Description substring (case-insensitive).
    pub description: Option<String>,
}

impl MovementFilter {
    /// Creates an empty filter that matches all movements.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to movements dated within `[from, to]`.
    #[inline]
    #[must_use]
    pub fn date_range<F: Into<String>, T: Into<String>>(mut self, from: F, to: T) -> Self {
        self.date_from = Some(from.into());
        self.date_to = Some(to.into());
        self
    }

    /// Restricts to movements of the given type.
    #[inline]
    #[must_use]
    pub const fn kind(mut self, kind: MovementType) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Restricts to movements in the given category.
    #[inline]
    #[must_use]
    pub fn category<T: Into<String>>(mut self, category: T) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Restricts to normalized amounts within `[min, max]`.
    #[inline]
    #[must_use]
    pub const fn amount_range(mut self, min: f64, max: f64) -> Self {
        self.amount_min = Some(min);
        self.amount_max = Some(max);
        self
    }

    /// Restricts to descriptions containing `text` (case-insensitive).
    #[inline]
    #[must_use]
    pub fn description<T: Into<String>>(mut self, text: T) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Returns `true` if the movement satisfies all set criteria.
    #[inline]
    #[must_use]
    pub fn matches(&self, ctx: &LedgerContext, movement: &Movement) -> bool {
        self.matches_date(movement)
            && self.kind.is_none_or(|kind| movement.kind == kind)
            && non_blank(self.category.as_deref()).is_none_or(|cat| movement.category == cat)
            && self.matches_amount(ctx, movement)
            && self.matches_description(movement)
    }

    /// Checks date bounds by string comparison.
    fn matches_date(&self, movement: &Movement) -> bool {
        let date = movement.date.as_str();
        non_blank(self.date_from.as_deref()).is_none_or(|from| date >= from)
            && non_blank(self.date_to.as_deref()).is_none_or(|to| date <= to)
    }

    /// Checks amount bounds against the normalized amount.
    fn matches_amount(&self, ctx: &LedgerContext, movement: &Movement) -> bool {
        let min = self.amount_min.filter(|value| !value.is_nan());
        let max = self.amount_max.filter(|value| !value.is_nan());
        if min.is_none() && max.is_none() {
            return true;
        }
        let amount = ctx.normalize(movement);
        min.is_none_or(|low| amount >= low) && max.is_none_or(|high| amount <= high)
    }

    /// Checks the description substring.
    fn matches_description(&self, movement: &Movement) -> bool {
        non_blank(self.description.as_deref()).is_none_or(|needle| {
            movement
                .description
                .to_lowercase()
                .contains(&needle.trim().to_lowercase())
        })
    }
}

/// Treats an empty or whitespace-only criterion as unset.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

/// Returns the movements matching `spec`, most recent first.
///
/// Movements sharing a date keep their relative input order.
#[must_use]
pub fn filter(ctx: &LedgerContext, records: &[Movement], spec: &MovementFilter) -> Vec<Movement> {
    let mut matched: Vec<Movement> = records
        .iter()
        .filter(|movement| spec.matches(ctx, movement))
        .cloned()
        .collect();
    matched.sort_by(|a, b| b.date.cmp(&a.date));
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Currency, MovementId};

    fn movement(
        id: &str,
        kind: MovementType,
        category: &str,
        amount: f64,
        date: &str,
        description: &str,
    ) -> Movement {
        Movement {
            id: MovementId::from(id),
            kind,
            category: category.to_owned(),
            amount,
            currency: Currency::Eur,
            rate: Some(1.0),
            description: description.to_owned(),
            date: date.to_owned(),
            enabled: true,
        }
    }

    fn sample() -> Vec<Movement> {
        vec![
            movement("a", MovementType::Income, "Salario", 1000.0, "2024-01-10", "Payroll"),
            movement("b", MovementType::Fixed, "Vivienda", 400.0, "2024-01-15", "Rent"),
            movement("c", MovementType::Variable, "Ocio", 30.0, "2024-02-01", "Cinema night"),
            movement("d", MovementType::Variable, "Ocio", 12.0, "2024-01-15", "Popcorn"),
            movement("e", MovementType::Fixed, "Servicios", 60.0, "2023-12-30", "Power bill"),
        ]
    }

    fn ids(records: &[Movement]) -> Vec<&str> {
        records.iter().map(|m| m.id.as_inner()).collect()
    }

    #[test]
    fn empty_filter_sorts_descending_and_is_stable() {
        let ctx = LedgerContext::default();
        let out = filter(&ctx, &sample(), &MovementFilter::new());
        assert_eq!(ids(&out), vec!["c", "b", "d", "a", "e"]);
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let ctx = LedgerContext::default();
        let spec = MovementFilter::new().date_range("2024-01-10", "2024-01-15");
        let out = filter(&ctx, &sample(), &spec);
        assert_eq!(ids(&out), vec!["b", "d", "a"]);
    }

    #[test]
    fn type_and_category_are_exact() {
        let ctx = LedgerContext::default();
        let out = filter(&ctx, &sample(), &MovementFilter::new().kind(MovementType::Fixed));
        assert_eq!(ids(&out), vec!["b", "e"]);
        let out = filter(&ctx, &sample(), &MovementFilter::new().category("Ocio"));
        assert_eq!(ids(&out), vec!["c", "d"]);
        let out = filter(&ctx, &sample(), &MovementFilter::new().category("ocio"));
        assert!(out.is_empty());
    }

    #[test]
    fn amount_bounds_use_normalized_amount() {
        let ctx = LedgerContext::default();
        let mut records = sample();
        records.push(Movement {
            currency: Currency::Usd,
            rate: Some(2.0),
            ..movement("f", MovementType::Variable, "Otros", 100.0, "2024-03-01", "")
        });
        let spec = MovementFilter {
            amount_max: Some(60.0),
            ..MovementFilter::new()
        };
        let out = filter(&ctx, &records, &spec);
        assert_eq!(ids(&out), vec!["f", "c", "d", "e"]);
        let out = filter(&ctx, &records, &MovementFilter::new().amount_range(50.0, 50.0));
        assert_eq!(ids(&out), vec!["f"]);
    }

    #[test]
    fn description_is_case_insensitive_substring() {
        let ctx = LedgerContext::default();
        let out = filter(&ctx, &sample(), &MovementFilter::new().description("  NIGHT "));
        assert_eq!(ids(&out), vec!["c"]);
    }

    #[test]
    fn blank_criteria_are_ignored() {
        let ctx = LedgerContext::default();
        let spec = MovementFilter {
            date_from: Some(String::new()),
            category: Some("  ".to_owned()),
            description: Some(String::new()),
            amount_min: Some(f64::NAN),
            ..MovementFilter::new()
        };
        assert_eq!(filter(&ctx, &sample(), &spec).len(), 5);
    }

    #[test]
    fn criteria_combine_with_and() {
        let ctx = LedgerContext::default();
        let spec = MovementFilter::new()
            .kind(MovementType::Variable)
            .date_range("2024-01-01", "2024-01-31");
        assert_eq!(ids(&filter(&ctx, &sample(), &spec)), vec!["d"]);
    }

    #[test]
    fn filter_is_idempotent() {
        let ctx = LedgerContext::default();
        let specs = [
            MovementFilter::new(),
            MovementFilter::new().kind(MovementType::Variable),
            MovementFilter::new().date_range("2024-01-01", "2024-12-31"),
            MovementFilter::new().amount_range(20.0, 500.0).description("n"),
        ];
        for spec in specs {
            let once = filter(&ctx, &sample(), &spec);
            let twice = filter(&ctx, &once, &spec);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn disabled_movements_are_still_listed() {
        let ctx = LedgerContext::default();
        let mut records = sample();
        if let Some(first) = records.first_mut() {
            first.enabled = false;
        }
        assert_eq!(filter(&ctx, &records, &MovementFilter::new()).len(), 5);
    }
}
