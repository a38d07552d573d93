//! Running balance over an arbitrarily ordered listing.

use crate::context::LedgerContext;
use crate::models::Movement;

/// A listed movement paired with the balance after it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunningBalance<'rec> {
    /// The listed movement.
    pub movement: &'rec Movement,
    /// Cumulative balance of every enabled movement at or before this one.
    pub balance: f64,
}

/// Computes the balance after each movement of a most-recent-first listing.
///
/// The listing is walked oldest to newest starting from zero; enabled
/// movements add their signed normalized amount, disabled ones carry the
/// previous balance unchanged. The result is returned in the input order.
#[must_use]
pub fn running_balances<'rec>(
    ctx: &LedgerContext,
    records: &'rec [Movement],
) -> Vec<RunningBalance<'rec>> {
    let mut balance = 0.0_f64;
    let mut ascending: Vec<f64> = records
        .iter()
        .rev()
        .map(|movement| {
            if movement.enabled {
                balance += ctx.signed(movement);
            }
            balance
        })
        .collect();
    ascending.reverse();
    records
        .iter()
        .zip(ascending)
        .map(|(movement, after)| RunningBalance {
            movement,
            balance: after,
        })
        .collect()
}
