//! Enumeration types for constrained movement values.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Kind of a movement.
///
/// Anything that is not [`MovementType::Income`] counts as an expense.
/// The Spanish names written by the legacy browser store are accepted on
/// input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    /// Recurring, planned expense (rent, utilities, savings transfers).
    #[serde(alias = "fijo")]
    Fixed,
    /// Discretionary expense.
    Variable,
    /// Money coming in.
    #[serde(alias = "ingreso")]
    Income,
}

impl MovementType {
    /// All variants, in menu order.
    pub const ALL: [Self; 3] = [Self::Fixed, Self::Variable, Self::Income];

    /// Returns `true` for [`MovementType::Income`].
    #[inline]
    #[must_use]
    pub const fn is_income(self) -> bool {
        matches!(self, Self::Income)
    }

    /// Balance sign: `+1` for income, `-1` for every expense kind.
    #[inline]
    #[must_use]
    pub const fn sign(self) -> f64 {
        if self.is_income() { 1.0_f64 } else { -1.0_f64 }
    }

    /// Lowercase wire name.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Variable => "variable",
            Self::Income => "income",
        }
    }
}

impl fmt::Display for MovementType {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementType {
    type Err = LedgerError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fixed" | "fijo" => Ok(Self::Fixed),
            "variable" => Ok(Self::Variable),
            "income" | "ingreso" => Ok(Self::Income),
            _ => Err(LedgerError::UnknownValue {
                kind: "movement type",
                value: s.to_owned(),
            }),
        }
    }
}

/// Currency a movement amount is denominated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Euro, the default accounting currency.
    Eur,
    /// US dollar.
    Usd,
    /// Colombian peso.
    Cop,
}

impl Currency {
    /// All supported currencies.
    pub const ALL: [Self; 3] = [Self::Eur, Self::Usd, Self::Cop];

    /// ISO 4217 code.
    #[inline]
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Eur => "EUR",
            Self::Usd => "USD",
            Self::Cop => "COP",
        }
    }
}

impl fmt::Display for Currency {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = LedgerError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|currency| currency.code() == upper)
            .ok_or_else(|| LedgerError::UnknownValue {
                kind: "currency",
                value: s.to_owned(),
            })
    }
}
