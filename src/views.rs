//! Derived views over a snapshot of the movement collection.
//!
//! Every function here is pure: it takes the full collection (or a
//! listing derived from it) plus a [`LedgerContext`](crate::context::LedgerContext)
//! and recomputes its result from scratch. Nothing is cached, so callers
//! re-invoke the views after each mutation.
//!
//! Dates are compared as `YYYY-MM-DD` strings. Bucketing by month or year
//! is a prefix match, which is only sound because stored dates are always
//! zero padded (enforced when movements are created or edited).

mod balance;
mod distribution;
mod filter;
mod period;
mod savings;
mod totals;

pub use balance::{RunningBalance, running_balances};
pub use distribution::{CategoryDistribution, CategoryShare, Scope, category_distribution};
pub use filter::{MovementFilter, filter};
pub use period::{
    CashFlowMode, DayBucket, Flow, MONTHS, PeriodRow, PeriodSummary, PeriodTotals,
    daily_cash_flow, days_in_month, month_prefix, monthly_cash_flow, opening_balance,
    period_summary, year_prefix,
};
pub use savings::{SavingsSeries, savings_series};
pub use totals::{Headline, filter_totals, headline};
