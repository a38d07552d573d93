//! Monthly and daily cash-flow rollups with a carried-forward opening
//! balance.

use core::fmt;
use core::str::FromStr;

use chrono::{Datelike, NaiveDate};

use crate::context::LedgerContext;
use crate::error::LedgerError;
use crate::models::Movement;

/// Number of monthly rows in a summary.
pub const MONTHS: usize = 12;

/// Granularity of the cash-flow breakdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CashFlowMode {
    /// Twelve monthly buckets for the active year.
    #[default]
    Year,
    /// Daily buckets for one selected month of the active year.
    Month,
}

impl fmt::Display for CashFlowMode {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match *self {
            Self::Year => "year",
            Self::Month => "month",
        })
    }
}

impl FromStr for CashFlowMode {
    type Err = LedgerError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "year" => Ok(Self::Year),
            "month" => Ok(Self::Month),
            _ => Err(LedgerError::UnknownValue {
                kind: "cash-flow mode",
                value: s.to_owned(),
            }),
        }
    }
}

/// Income and expense totals of one bucket, in the base currency.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Flow {
    /// Sum of income movements.
    pub income: f64,
    /// Sum of every non-income movement.
    pub expense: f64,
}

impl Flow {
    /// `income - expense`.
    #[inline]
    #[must_use]
    pub fn net(&self) -> f64 {
        self.income - self.expense
    }

    /// Adds an enabled movement to the matching side.
    #[inline]
    pub(crate) fn add(&mut self, ctx: &LedgerContext, movement: &Movement) {
        let amount = ctx.normalize(movement);
        if movement.kind.is_income() {
            self.income += amount;
        } else {
            self.expense += amount;
        }
    }
}

/// One calendar day of a month-mode breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct DayBucket {
    /// Day of month, starting at 1.
    pub day: u32,
    /// Full date of the bucket (`YYYY-MM-DD`).
    pub date: String,
    /// Totals for that day.
    pub flow: Flow,
}

/// One row of the yearly summary table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodRow {
    /// Month number, 1 to 12.
    pub month: u32,
    /// Income of the month.
    pub income: f64,
    /// Expense of the month.
    pub expense: f64,
    /// `income - expense`.
    pub net: f64,
    /// Opening balance plus every net up to and including this month.
    pub cumulative: f64,
}

/// Twelve-row cash-flow summary of one year.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodSummary {
    /// Active year.
    pub year: i32,
    /// Net of every enabled movement dated before the year.
    pub opening_balance: f64,
    /// Exactly twelve rows, January first.
    pub rows: Vec<PeriodRow>,
}

/// Footer of a [`PeriodSummary`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeriodTotals {
    /// Income over the twelve rows.
    pub income: f64,
    /// Expense over the twelve rows.
    pub expense: f64,
    /// Net over the twelve rows.
    pub net: f64,
    /// Cumulative balance after December.
    pub closing: f64,
}

impl PeriodSummary {
    /// Column sums and the closing balance.
    #[must_use]
    pub fn totals(&self) -> PeriodTotals {
        let mut totals = PeriodTotals {
            closing: self.opening_balance,
            ..PeriodTotals::default()
        };
        for row in &self.rows {
            totals.income += row.income;
            totals.expense += row.expense;
            totals.net += row.net;
            totals.closing = row.cumulative;
        }
        totals
    }
}

/// `YYYY` prefix of a year.
#[inline]
#[must_use]
pub fn year_prefix(year: i32) -> String {
    format!("{year:04}")
}

/// `YYYY-MM` prefix of a month.
#[inline]
#[must_use]
pub fn month_prefix(year: i32, month: u32) -> String {
    format!("{year:04}-{month:02}")
}

/// Number of days in a month, or `0` for an invalid month.
#[must_use]
pub fn days_in_month(year: i32, month: u32) -> u32 {
    if !(1..=12).contains(&month) {
        return 0;
    }
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(0, |last| last.day())
}

/// Net of every enabled movement dated strictly before January 1st of
/// `year`.
#[must_use]
pub fn opening_balance(ctx: &LedgerContext, records: &[Movement], year: i32) -> f64 {
    let start = format!("{}-01-01", year_prefix(year));
    records
        .iter()
        .filter(|movement| movement.enabled && movement.before(&start))
        .map(|movement| ctx.signed(movement))
        .sum()
}

/// Income and expense per month of `year`, January first.
#[must_use]
pub fn monthly_cash_flow(ctx: &LedgerContext, records: &[Movement], year: i32) -> [Flow; MONTHS] {
    let mut flows = [Flow::default(); MONTHS];
    for (month, slot) in (1_u32..).zip(flows.iter_mut()) {
        let prefix = month_prefix(year, month);
        for movement in records.iter().filter(|m| m.enabled && m.in_period(&prefix)) {
            slot.add(ctx, movement);
        }
    }
    flows
}

/// Income and expense per calendar day of one month.
///
/// Returns an empty vector for an invalid month.
#[must_use]
pub fn daily_cash_flow(
    ctx: &LedgerContext,
    records: &[Movement],
    year: i32,
    month: u32,
) -> Vec<DayBucket> {
    let prefix = month_prefix(year, month);
    let mut buckets: Vec<DayBucket> = (1..=days_in_month(year, month))
        .map(|day| DayBucket {
            day,
            date: format!("{prefix}-{day:02}"),
            flow: Flow::default(),
        })
        .collect();
    for movement in records.iter().filter(|m| m.enabled) {
        if let Some(bucket) = buckets.iter_mut().find(|b| b.date == movement.date) {
            bucket.flow.add(ctx, movement);
        }
    }
    buckets
}

/// Builds the twelve-row summary of `year`.
///
/// In [`CashFlowMode::Month`] only the selected month is filled (from its
/// daily buckets); every other month reads zero. Without a valid selected
/// month all twelve rows read zero. Either way the cumulative column
/// starts from the opening balance.
#[must_use]
pub fn period_summary(
    ctx: &LedgerContext,
    records: &[Movement],
    year: i32,
    mode: CashFlowMode,
    selected_month: Option<u32>,
) -> PeriodSummary {
    let flows = match mode {
        CashFlowMode::Year => monthly_cash_flow(ctx, records, year),
        CashFlowMode::Month => {
            let mut flows = [Flow::default(); MONTHS];
            let slot = selected_month
                .and_then(|month| month.checked_sub(1))
                .and_then(|index| usize::try_from(index).ok())
                .and_then(|index| flows.get_mut(index));
            if let (Some(slot), Some(month)) = (slot, selected_month) {
                for bucket in daily_cash_flow(ctx, records, year, month) {
                    slot.income += bucket.flow.income;
                    slot.expense += bucket.flow.expense;
                }
            }
            flows
        }
    };

    let opening = opening_balance(ctx, records, year);
    let mut cumulative = opening;
    let rows = (1_u32..)
        .zip(flows)
        .map(|(month, flow)| {
            let net = flow.net();
            cumulative += net;
            PeriodRow {
                month,
                income: flow.income,
                expense: flow.expense,
                net,
                cumulative,
            }
        })
        .collect();

    tracing::debug!(year, %mode, opening, "period summary computed");
    PeriodSummary {
        year,
        opening_balance: opening,
        rows,
    }
}
