//! Expense distribution by category.

use std::collections::HashMap;

use super::period::{month_prefix, year_prefix};
use crate::context::LedgerContext;
use crate::models::Movement;

/// Time window of a distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// A single month.
    Month {
        /// Calendar year.
        year: i32,
        /// Month number, 1 to 12.
        month: u32,
    },
    /// A whole year.
    Year(i32),
}

impl Scope {
    /// Date prefix a movement must start with to fall in scope.
    #[inline]
    #[must_use]
    pub fn prefix(&self) -> String {
        match *self {
            Self::Month { year, month } => month_prefix(year, month),
            Self::Year(year) => year_prefix(year),
        }
    }
}

/// One category's slice of the expenses.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    /// Category name.
    pub category: String,
    /// Normalized expense total.
    pub total: f64,
    /// Fraction of the grand total, `0` when the grand total is zero.
    pub share: f64,
}

/// Expenses per category, largest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryDistribution {
    /// Sorted entries.
    pub entries: Vec<CategoryShare>,
    /// Sum of every entry total.
    pub grand_total: f64,
}

/// Sums the enabled, non-income movements of `scope` per category.
///
/// Categories tied on total keep the order in which they were first seen.
#[must_use]
pub fn category_distribution(
    ctx: &LedgerContext,
    records: &[Movement],
    scope: Scope,
) -> CategoryDistribution {
    let prefix = scope.prefix();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<(&str, f64)> = Vec::new();

    for movement in records
        .iter()
        .filter(|m| m.enabled && !m.kind.is_income() && m.in_period(&prefix))
    {
        let amount = ctx.normalize(movement);
        let category = movement.category.as_str();
        match positions.get(category).and_then(|&index| totals.get_mut(index)) {
            Some(entry) => entry.1 += amount,
            None => {
                let _previous = positions.insert(category, totals.len());
                totals.push((category, amount));
            }
        }
    }

    totals.sort_by(|a, b| b.1.total_cmp(&a.1));
    let grand_total: f64 = totals.iter().map(|entry| entry.1).sum();
    let entries = totals
        .into_iter()
        .map(|(category, total)| CategoryShare {
            category: category.to_owned(),
            total,
            share: if grand_total == 0.0_f64 {
                0.0_f64
            } else {
                total / grand_total
            },
        })
        .collect();

    CategoryDistribution {
        entries,
        grand_total,
    }
}
