//! Cumulative savings and investment tracking.

use super::period::{MONTHS, month_prefix, year_prefix};
use crate::context::LedgerContext;
use crate::models::{Movement, MovementType, is_savings_category};

/// Month-by-month cumulative savings of one year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SavingsSeries {
    /// Active year.
    pub year: i32,
    /// Savings accumulated in all previous years.
    pub prior_total: f64,
    /// Running total after each month, January first.
    pub cumulative: [f64; MONTHS],
}

impl SavingsSeries {
    /// Running total after December.
    #[inline]
    #[must_use]
    pub fn closing(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(self.prior_total)
    }
}

/// Returns `true` for enabled fixed movements in a savings category.
#[inline]
fn is_saving(movement: &Movement) -> bool {
    movement.enabled && movement.kind == MovementType::Fixed && is_savings_category(&movement.category)
}

/// Cumulative savings through `year`, seeded with every earlier year.
///
/// This is a plain running sum: negative stored amounts make it go down.
#[must_use]
pub fn savings_series(ctx: &LedgerContext, records: &[Movement], year: i32) -> SavingsSeries {
    let start = format!("{}-01-01", year_prefix(year));
    let prior_total: f64 = records
        .iter()
        .filter(|movement| is_saving(movement) && movement.before(&start))
        .map(|movement| ctx.normalize(movement))
        .sum();

    let mut cumulative = [0.0_f64; MONTHS];
    let mut running = prior_total;
    for (month, slot) in (1_u32..).zip(cumulative.iter_mut()) {
        let prefix = month_prefix(year, month);
        running += records
            .iter()
            .filter(|movement| is_saving(movement) && movement.in_period(&prefix))
            .map(|movement| ctx.normalize(movement))
            .sum::<f64>();
        *slot = running;
    }

    SavingsSeries {
        year,
        prior_total,
        cumulative,
    }
}
