//! Movement model and its creation/edit boundary.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Currency, MovementId, MovementType, is_usable_rate};
use crate::context::LedgerContext;
use crate::error::{LedgerError, Result};

/// Canonical date format. Fixed width and zero padded, so lexical order
/// equals chronological order.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    /// Unique identifier, immutable after creation.
    pub id: MovementId,
    /// Income or one of the expense kinds.
    #[serde(rename = "type")]
    pub kind: MovementType,
    /// Category name, validated against the registry only at creation.
    pub category: String,
    /// Amount in `currency` (non-negative at entry, not enforced here).
    pub amount: f64,
    /// Currency of `amount`.
    pub currency: Currency,
    /// Units of `currency` per unit of the base currency.
    #[serde(default, alias = "trm", skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    /// Free text.
    #[serde(default, alias = "desc")]
    pub description: String,
    /// Booking date (`YYYY-MM-DD`).
    pub date: String,
    /// Disabled movements are listed but excluded from every balance.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

/// Serde default for [`Movement::enabled`].
const fn enabled_by_default() -> bool {
    true
}

impl Movement {
    /// Returns `true` if the date starts with `prefix` (`YYYY` or
    /// `YYYY-MM`).
    #[inline]
    #[must_use]
    pub fn in_period(&self, prefix: &str) -> bool {
        self.date.starts_with(prefix)
    }

    /// Returns `true` if the movement is dated strictly before `date`.
    #[inline]
    #[must_use]
    pub fn before(&self, date: &str) -> bool {
        self.date.as_str() < date
    }

    /// Copy of this movement under a fresh identifier.
    #[inline]
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self {
            id: MovementId::generate(),
            ..self.clone()
        }
    }

    /// Checks a stored movement coming from outside the creation
    /// boundary: canonical date, finite non-negative amount and a
    /// non-blank category. Registry membership is not required.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidRecord`] or
    /// [`LedgerError::NonFiniteAmount`] for the first failing field.
    pub fn validate(&self) -> Result<()> {
        if self.category.trim().is_empty() {
            return Err(LedgerError::invalid("category", "is required"));
        }
        check_amount(self.amount)?;
        validate_date(&self.date)
    }
}

/// Input for a new movement.
///
/// Every field is optional so that incomplete user input is representable;
/// [`MovementDraft::build`] rejects what is missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovementDraft {
    /// Movement type (required).
    pub kind: Option<MovementType>,
    /// Category (required).
    pub category: Option<String>,
    /// Amount (required).
    pub amount: Option<f64>,
    /// Currency; the context base currency when absent.
    pub currency: Option<Currency>,
    /// Explicit exchange rate; the stored default when absent or unusable.
    pub rate: Option<f64>,
    /// Free text.
    pub description: Option<String>,
    /// Booking date (required).
    pub date: Option<String>,
}

impl MovementDraft {
    /// Creates an empty draft.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the movement type.
    #[inline]
    #[must_use]
    pub const fn kind(mut self, kind: MovementType) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Sets the category.
    #[inline]
    #[must_use]
    pub fn category<T: Into<String>>(mut self, category: T) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the amount.
    #[inline]
    #[must_use]
    pub const fn amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Sets the currency.
    #[inline]
    #[must_use]
    pub const fn currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    /// Sets an explicit exchange rate.
    #[inline]
    #[must_use]
    pub const fn rate(mut self, rate: f64) -> Self {
        self.rate = Some(rate);
        self
    }

    /// Sets the description.
    #[inline]
    #[must_use]
    pub fn description<T: Into<String>>(mut self, description: T) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the date (`YYYY-MM-DD`).
    #[inline]
    #[must_use]
    pub fn date<T: Into<String>>(mut self, date: T) -> Self {
        self.date = Some(date.into());
        self
    }

    /// The explicit rate, if it is usable as a new currency default.
    #[inline]
    #[must_use]
    pub fn explicit_rate(&self) -> Option<(Currency, f64)> {
        let rate = self.rate.filter(|value| is_usable_rate(*value))?;
        self.currency.map(|currency| (currency, rate))
    }

    /// Validates the draft and produces an enabled movement with a fresh
    /// identifier.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidRecord`] when type, category, amount
    /// or date is missing or malformed, or the category is not allowed
    /// for the type. Returns [`LedgerError::NonFiniteAmount`] for NaN or
    /// infinite amounts.
    pub fn build(self, ctx: &LedgerContext) -> Result<Movement> {
        let kind = self
            .kind
            .ok_or_else(|| LedgerError::invalid("type", "is required"))?;
        let category = required_text("category", self.category)?;
        check_category(ctx, kind, &category)?;
        let amount = self
            .amount
            .ok_or_else(|| LedgerError::invalid("amount", "is required"))?;
        check_amount(amount)?;
        let date = required_text("date", self.date)?;
        validate_date(&date)?;

        let currency = self.currency.unwrap_or_else(|| ctx.base());
        let rate = self
            .rate
            .filter(|value| is_usable_rate(*value))
            .unwrap_or_else(|| ctx.default_rate(currency));

        Ok(Movement {
            id: MovementId::generate(),
            kind,
            category,
            amount,
            currency,
            rate: Some(rate),
            description: self.description.map(|text| text.trim().to_owned()).unwrap_or_default(),
            date,
            enabled: true,
        })
    }
}

/// Changes to apply to an existing movement. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovementPatch {
    /// New type.
    pub kind: Option<MovementType>,
    /// New category.
    pub category: Option<String>,
    /// New amount.
    pub amount: Option<f64>,
    /// New currency.
    pub currency: Option<Currency>,
    /// New explicit rate.
    pub rate: Option<f64>,
    /// New description.
    pub description: Option<String>,
    /// New date.
    pub date: Option<String>,
}

impl MovementPatch {
    /// The explicit rate and the currency it applies to, if usable.
    #[inline]
    #[must_use]
    pub fn explicit_rate(&self, current: Currency) -> Option<(Currency, f64)> {
        let rate = self.rate.filter(|value| is_usable_rate(*value))?;
        Some((self.currency.unwrap_or(current), rate))
    }

    /// Returns `true` if no field would change.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.category.is_none()
            && self.amount.is_none()
            && self.currency.is_none()
            && self.rate.is_none()
            && self.description.is_none()
            && self.date.is_none()
    }

    /// Applies the patch to a copy of `movement`. The identifier and the
    /// enabled flag are never touched.
    ///
    /// The category is checked against the registry only when the patch
    /// changes the type or the category.
    ///
    /// # Errors
    ///
    /// Same conditions as [`MovementDraft::build`], for the fields present.
    pub fn apply(self, movement: &Movement, ctx: &LedgerContext) -> Result<Movement> {
        let mut updated = movement.clone();
        let recheck_category = self.kind.is_some() || self.category.is_some();
        if let Some(kind) = self.kind {
            updated.kind = kind;
        }
        if let Some(category) = self.category {
            updated.category = required_text("category", Some(category))?;
        }
        if recheck_category {
            check_category(ctx, updated.kind, &updated.category)?;
        }
        if let Some(amount) = self.amount {
            check_amount(amount)?;
            updated.amount = amount;
        }
        if let Some(date) = self.date {
            let date_text = required_text("date", Some(date))?;
            validate_date(&date_text)?;
            updated.date = date_text;
        }
        if let Some(description) = self.description {
            updated.description = description.trim().to_owned();
        }

        let currency_changed = self
            .currency
            .is_some_and(|currency| currency != movement.currency);
        if let Some(currency) = self.currency {
            updated.currency = currency;
        }
        let kept_rate = movement
            .rate
            .filter(|value| !currency_changed && is_usable_rate(*value));
        updated.rate = Some(
            self.rate
                .filter(|value| is_usable_rate(*value))
                .or(kept_rate)
                .unwrap_or_else(|| ctx.default_rate(updated.currency)),
        );
        Ok(updated)
    }
}

/// Checks that `date` is a real calendar date in canonical
/// zero-padded `YYYY-MM-DD` form.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidRecord`] otherwise.
pub fn validate_date(date: &str) -> Result<()> {
    let parsed = NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|err| LedgerError::invalid("date", format!("{date:?}: {err}")))?;
    if parsed.format(DATE_FORMAT).to_string() != date {
        return Err(LedgerError::invalid(
            "date",
            format!("{date:?} must be zero-padded YYYY-MM-DD"),
        ));
    }
    Ok(())
}

/// Rejects a missing or blank text field.
fn required_text(field: &'static str, value: Option<String>) -> Result<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text.trim().to_owned()),
        Some(_) | None => Err(LedgerError::invalid(field, "is required")),
    }
}

/// Rejects a category that is not registered for `kind`.
fn check_category(ctx: &LedgerContext, kind: MovementType, category: &str) -> Result<()> {
    if ctx.registry().allows(kind, category) {
        Ok(())
    } else {
        Err(LedgerError::invalid(
            "category",
            format!("{category:?} is not a {kind} category"),
        ))
    }
}

/// Rejects non-finite and negative amounts.
fn check_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() {
        return Err(LedgerError::NonFiniteAmount(amount));
    }
    if amount < 0.0_f64 {
        return Err(LedgerError::invalid("amount", "must not be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> LedgerContext {
        LedgerContext::default()
    }

    fn valid_draft() -> MovementDraft {
        MovementDraft::new()
            .kind(MovementType::Variable)
            .category("Ocio")
            .amount(40.0)
            .date("2024-03-09")
    }

    #[test]
    fn build_fills_defaults() {
        let movement = valid_draft().description("  cinema ").build(&ctx()).unwrap();
        assert!(movement.enabled);
        assert_eq!(movement.currency, Currency::Eur);
        assert_eq!(movement.rate, Some(1.0));
        assert_eq!(movement.description, "cinema");
        assert_eq!(movement.date, "2024-03-09");
    }

    #[test]
    fn build_uses_default_rate_for_foreign_currency() {
        let movement = valid_draft().currency(Currency::Cop).build(&ctx()).unwrap();
        assert_eq!(movement.rate, Some(4200.0));
        let explicit = valid_draft()
            .currency(Currency::Cop)
            .rate(4000.0)
            .build(&ctx())
            .unwrap();
        assert_eq!(explicit.rate, Some(4000.0));
        let bogus = valid_draft()
            .currency(Currency::Usd)
            .rate(-1.0)
            .build(&ctx())
            .unwrap();
        assert_eq!(bogus.rate, Some(1.16));
    }

    #[test]
    fn build_rejects_missing_fields() {
        let cases = [
            (MovementDraft { kind: None, ..valid_draft() }, "type"),
            (MovementDraft { category: None, ..valid_draft() }, "category"),
            (MovementDraft { amount: None, ..valid_draft() }, "amount"),
            (MovementDraft { date: None, ..valid_draft() }, "date"),
            (valid_draft().category("   "), "category"),
        ];
        for (draft, expected_field) in cases {
            match draft.build(&ctx()) {
                Err(LedgerError::InvalidRecord { field, .. }) => assert_eq!(field, expected_field),
                other => panic!("expected InvalidRecord for {expected_field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn build_rejects_category_of_other_type() {
        let err = valid_draft().category("Salario").build(&ctx()).unwrap_err();
        assert!(err.to_string().contains("not a variable category"));
    }

    #[test]
    fn build_rejects_bad_amounts() {
        let err = valid_draft().amount(f64::NAN).build(&ctx()).unwrap_err();
        assert!(matches!(err, LedgerError::NonFiniteAmount(_)));
        let err = valid_draft().amount(f64::INFINITY).build(&ctx()).unwrap_err();
        assert!(matches!(err, LedgerError::NonFiniteAmount(_)));
        let err = valid_draft().amount(-5.0).build(&ctx()).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidRecord { field: "amount", .. }));
        assert!(valid_draft().amount(0.0).build(&ctx()).is_ok());
    }

    #[test]
    fn validate_date_requires_canonical_form() {
        assert!(validate_date("2024-02-29").is_ok());
        assert!(validate_date("2023-02-29").is_err());
        assert!(validate_date("2024-2-09").is_err());
        assert!(validate_date("09/02/2024").is_err());
        assert!(validate_date("").is_err());
    }

    #[test]
    fn explicit_rate_requires_currency_and_usable_value() {
        assert_eq!(valid_draft().rate(2.0).explicit_rate(), None);
        assert_eq!(
            valid_draft().currency(Currency::Usd).rate(2.0).explicit_rate(),
            Some((Currency::Usd, 2.0))
        );
        assert_eq!(valid_draft().currency(Currency::Usd).rate(0.0).explicit_rate(), None);
    }

    #[test]
    fn patch_keeps_id_and_enabled() {
        let mut original = valid_draft().build(&ctx()).unwrap();
        original.enabled = false;
        let patch = MovementPatch {
            amount: Some(55.5),
            description: Some("updated".to_owned()),
            ..MovementPatch::default()
        };
        let updated = patch.apply(&original, &ctx()).unwrap();
        assert_eq!(updated.id, original.id);
        assert!(!updated.enabled);
        assert!((updated.amount - 55.5).abs() < f64::EPSILON);
        assert_eq!(updated.description, "updated");
    }

    #[test]
    fn patch_currency_change_picks_new_default_rate() {
        let original = valid_draft().build(&ctx()).unwrap();
        let patch = MovementPatch {
            currency: Some(Currency::Cop),
            ..MovementPatch::default()
        };
        let updated = patch.apply(&original, &ctx()).unwrap();
        assert_eq!(updated.currency, Currency::Cop);
        assert_eq!(updated.rate, Some(4200.0));
    }

    #[test]
    fn patch_revalidates_category_only_when_touched() {
        let mut original = valid_draft().build(&ctx()).unwrap();
        original.category = "Retired category".to_owned();
        let amount_only = MovementPatch {
            amount: Some(1.0),
            ..MovementPatch::default()
        };
        assert!(amount_only.apply(&original, &ctx()).is_ok());
        let type_change = MovementPatch {
            kind: Some(MovementType::Fixed),
            ..MovementPatch::default()
        };
        assert!(type_change.apply(&original, &ctx()).is_err());
    }

    #[test]
    fn patch_rejects_invalid_date() {
        let original = valid_draft().build(&ctx()).unwrap();
        let patch = MovementPatch {
            date: Some("2024-13-01".to_owned()),
            ..MovementPatch::default()
        };
        assert!(patch.apply(&original, &ctx()).is_err());
        assert!(MovementPatch::default().is_empty());
    }

    #[test]
    fn deserialize_legacy_record() {
        let json = r#"{
            "id": "id1700000000123",
            "type": "fijo",
            "category": "Vivienda",
            "amount": 850,
            "currency": "EUR",
            "trm": 1,
            "desc": "Alquiler",
            "date": "2024-01-01"
        }"#;
        let movement: Movement = serde_json::from_str(json).unwrap();
        assert_eq!(movement.kind, MovementType::Fixed);
        assert_eq!(movement.rate, Some(1.0));
        assert_eq!(movement.description, "Alquiler");
        assert!(movement.enabled);
    }

    #[test]
    fn serialize_keeps_every_field() {
        let mut movement = valid_draft().currency(Currency::Usd).build(&ctx()).unwrap();
        movement.enabled = false;
        let json = serde_json::to_string(&movement).unwrap();
        assert!(json.contains(r#""type":"variable""#));
        assert!(json.contains(r#""enabled":false"#));
        assert!(json.contains(r#""rate":1.16"#));
        let back: Movement = serde_json::from_str(&json).unwrap();
        assert_eq!(back, movement);
    }

    #[test]
    fn duplicate_changes_only_id() {
        let movement = valid_draft().build(&ctx()).unwrap();
        let copy = movement.duplicate();
        assert_ne!(copy.id, movement.id);
        assert_eq!(Movement { id: movement.id.clone(), ..copy }, movement);
    }

    #[test]
    fn period_helpers() {
        let movement = valid_draft().build(&ctx()).unwrap();
        assert!(movement.in_period("2024"));
        assert!(movement.in_period("2024-03"));
        assert!(!movement.in_period("2024-04"));
        assert!(movement.before("2025-01-01"));
        assert!(!movement.before("2024-03-09"));
    }

    #[test]
    fn validate_stored_movement() {
        let movement = valid_draft().build(&ctx()).unwrap();
        assert!(movement.validate().is_ok());

        let legacy = Movement {
            category: "Regalos".to_owned(),
            ..movement.clone()
        };
        assert!(legacy.validate().is_ok());

        let unpadded = Movement {
            date: "2024-3-5".to_owned(),
            ..movement.clone()
        };
        assert!(matches!(
            unpadded.validate(),
            Err(LedgerError::InvalidRecord { field: "date", .. })
        ));

        let negative = Movement {
            amount: -50.0,
            ..movement.clone()
        };
        assert!(matches!(
            negative.validate(),
            Err(LedgerError::InvalidRecord { field: "amount", .. })
        ));

        let blank = Movement {
            category: "  ".to_owned(),
            ..movement
        };
        assert!(matches!(
            blank.validate(),
            Err(LedgerError::InvalidRecord { field: "category", .. })
        ));
    }
}
