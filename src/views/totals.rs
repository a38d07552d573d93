//! Headline balances and listing totals.

use super::period::Flow;
use crate::context::LedgerContext;
use crate::models::{Movement, MovementType, is_savings_category};

/// Balances shown above every other view.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Headline {
    /// Net of every enabled movement.
    pub balance: f64,
    /// Net of the enabled movements of the selected month.
    pub month_balance: f64,
    /// All-time sum of enabled fixed savings/investment movements.
    pub savings: f64,
}

/// Income and expense over the enabled movements of a listing.
#[must_use]
pub fn filter_totals(ctx: &LedgerContext, records: &[Movement]) -> Flow {
    let mut flow = Flow::default();
    for movement in records.iter().filter(|m| m.enabled) {
        flow.add(ctx, movement);
    }
    flow
}

/// Computes the headline balances. `month` is a `YYYY-MM` prefix; when
/// absent the month balance covers every movement.
#[must_use]
pub fn headline(ctx: &LedgerContext, records: &[Movement], month: Option<&str>) -> Headline {
    let mut out = Headline::default();
    for movement in records.iter().filter(|m| m.enabled) {
        let signed = ctx.signed(movement);
        out.balance += signed;
        if month.is_none_or(|prefix| movement.in_period(prefix)) {
            out.month_balance += signed;
        }
        if movement.kind == MovementType::Fixed && is_savings_category(&movement.category) {
            out.savings += ctx.normalize(movement);
        }
    }
    out
}
