//! High-level ledger with integrated storage.
//!
//! Combines a [`MovementStore`] backend with the [`LedgerContext`] built
//! from it. Every mutation reads the full collection, changes it and writes
//! it back; every view reads a fresh snapshot and recomputes from scratch.

use std::collections::HashSet;

use crate::context::{DataIssue, LedgerContext};
use crate::error::{LedgerError, Result};
use crate::models::{
    Currency, DefaultRates, Movement, MovementDraft, MovementId, MovementPatch,
};
use crate::storage::MovementStore;
use crate::views::{
    self, CashFlowMode, CategoryDistribution, DayBucket, Headline, MovementFilter, PeriodSummary,
    SavingsSeries, Scope,
};

/// Builder for constructing a [`Ledger`].
#[derive(Debug)]
pub struct LedgerBuilder<S: MovementStore> {
    /// Storage backend.
    storage: Option<S>,
    /// Base currency override.
    base: Option<Currency>,
}

impl<S: MovementStore> LedgerBuilder<S> {
    /// Sets the storage backend.
    #[inline]
    #[must_use]
    pub fn storage(mut self, storage: S) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Overrides the base currency (`EUR` by default).
    #[inline]
    #[must_use]
    pub const fn base_currency(mut self, base: Currency) -> Self {
        self.base = Some(base);
        self
    }

    /// Opens the ledger.
    ///
    /// The stored default rates are laid over the seeded table and the
    /// merged table is written back.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Storage`] if no storage was provided, or any
    /// error the backend reports while reading or writing the rate table.
    #[tracing::instrument(skip_all)]
    pub fn build(self) -> Result<Ledger<S>> {
        let storage = self
            .storage
            .ok_or_else(|| LedgerError::storage("storage backend is required"))?;
        let rates = DefaultRates::merged_with(storage.default_rates()?);
        storage.save_default_rates(&rates)?;
        let base = self.base.unwrap_or(Currency::Eur);
        tracing::debug!(%base, "ledger opened");
        Ok(Ledger {
            storage,
            context: LedgerContext::new(base, rates),
        })
    }
}

/// A movement ledger backed by a [`MovementStore`].
#[derive(Debug)]
pub struct Ledger<S: MovementStore> {
    /// Storage backend.
    storage: S,
    /// Base currency, default rates and category registry.
    context: LedgerContext,
}

impl<S: MovementStore> Ledger<S> {
    /// Creates a new builder for configuring the ledger.
    #[inline]
    #[must_use]
    pub const fn builder() -> LedgerBuilder<S> {
        LedgerBuilder {
            storage: None,
            base: None,
        }
    }

    /// The context every view is computed with.
    #[inline]
    #[must_use]
    pub const fn context(&self) -> &LedgerContext {
        &self.context
    }

    /// The storage backend.
    #[inline]
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    // ── Mutations ───────────────────────────────────────────────────

    /// Validates `draft` and appends the new movement.
    ///
    /// A usable explicit rate also becomes the default for its currency.
    ///
    /// # Errors
    ///
    /// Returns the validation error of [`MovementDraft::build`] or a
    /// storage error.
    #[tracing::instrument(skip_all)]
    pub fn add(&mut self, draft: MovementDraft) -> Result<Movement> {
        let explicit = draft.explicit_rate();
        let movement = draft.build(&self.context)?;
        let mut all = self.storage.movements()?;
        all.push(movement.clone());
        self.storage.save_movements(all)?;
        if let Some((currency, rate)) = explicit {
            let _applied = self.set_default_rate(currency, rate)?;
        }
        tracing::debug!(id = %movement.id, "movement added");
        Ok(movement)
    }

    /// Applies `patch` to the movement with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] for an unknown id, the validation
    /// error of [`MovementPatch::apply`], or a storage error.
    #[tracing::instrument(skip_all)]
    pub fn edit(&mut self, id: &MovementId, patch: MovementPatch) -> Result<Movement> {
        let mut all = self.storage.movements()?;
        let slot = all
            .iter_mut()
            .find(|movement| movement.id == *id)
            .ok_or_else(|| LedgerError::NotFound(id.clone()))?;
        let explicit = patch.explicit_rate(slot.currency);
        let updated = patch.apply(slot, &self.context)?;
        slot.clone_from(&updated);
        self.storage.save_movements(all)?;
        if let Some((currency, rate)) = explicit {
            let _applied = self.set_default_rate(currency, rate)?;
        }
        tracing::debug!(%id, "movement edited");
        Ok(updated)
    }

    /// Removes the movement with the given id and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] for an unknown id or a storage
    /// error.
    #[tracing::instrument(skip_all)]
    pub fn delete(&self, id: &MovementId) -> Result<Movement> {
        let mut all = self.storage.movements()?;
        let position = all
            .iter()
            .position(|movement| movement.id == *id)
            .ok_or_else(|| LedgerError::NotFound(id.clone()))?;
        let removed = all.remove(position);
        self.storage.save_movements(all)?;
        tracing::debug!(%id, "movement deleted");
        Ok(removed)
    }

    /// Appends a copy of the movement under a fresh id and returns the copy.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] for an unknown id or a storage
    /// error.
    #[tracing::instrument(skip_all)]
    pub fn duplicate(&self, id: &MovementId) -> Result<Movement> {
        let mut all = self.storage.movements()?;
        let copy = all
            .iter()
            .find(|movement| movement.id == *id)
            .map(Movement::duplicate)
            .ok_or_else(|| LedgerError::NotFound(id.clone()))?;
        all.push(copy.clone());
        self.storage.save_movements(all)?;
        tracing::debug!(%id, copy = %copy.id, "movement duplicated");
        Ok(copy)
    }

    /// Flips the enabled flag of one movement and returns the new state.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] for an unknown id or a storage
    /// error.
    #[tracing::instrument(skip_all)]
    pub fn toggle(&self, id: &MovementId) -> Result<bool> {
        let mut all = self.storage.movements()?;
        let movement = all
            .iter_mut()
            .find(|movement| movement.id == *id)
            .ok_or_else(|| LedgerError::NotFound(id.clone()))?;
        movement.enabled = !movement.enabled;
        let enabled = movement.enabled;
        self.storage.save_movements(all)?;
        tracing::debug!(%id, enabled, "movement toggled");
        Ok(enabled)
    }

    /// Enables every listed movement if any of them is disabled, otherwise
    /// disables them all. Returns the state applied.
    ///
    /// Unknown ids are ignored. An empty selection changes nothing and
    /// returns `true`.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    #[tracing::instrument(skip_all)]
    pub fn toggle_all(&self, ids: &[MovementId]) -> Result<bool> {
        let selected: HashSet<&MovementId> = ids.iter().collect();
        let mut all = self.storage.movements()?;
        let enable = all
            .iter()
            .filter(|movement| selected.contains(&movement.id))
            .any(|movement| !movement.enabled);
        let mut changed = 0_usize;
        for movement in all
            .iter_mut()
            .filter(|movement| selected.contains(&movement.id))
        {
            movement.enabled = enable;
            changed += 1;
        }
        if changed == 0 {
            return Ok(true);
        }
        self.storage.save_movements(all)?;
        tracing::debug!(changed, enable, "movements toggled");
        Ok(enable)
    }

    /// Sets the default rate for `currency` and persists the table.
    ///
    /// Returns `false` (and stores nothing) if the rate is not positive and
    /// finite.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    #[tracing::instrument(skip_all)]
    pub fn set_default_rate(&mut self, currency: Currency, rate: f64) -> Result<bool> {
        if !self.context.set_default_rate(currency, rate) {
            tracing::warn!(%currency, rate, "ignored unusable default rate");
            return Ok(false);
        }
        self.storage.save_default_rates(self.context.rates())?;
        tracing::debug!(%currency, rate, "default rate updated");
        Ok(true)
    }

    /// Appends movements from an export. Movements whose id is already
    /// present get a fresh one. Returns the number imported.
    ///
    /// Nothing is written unless every incoming movement passes
    /// [`Movement::validate`].
    ///
    /// # Errors
    ///
    /// Returns the validation error of the first malformed movement or a
    /// storage error.
    #[tracing::instrument(skip_all)]
    pub fn import(&self, incoming: Vec<Movement>) -> Result<usize> {
        for movement in &incoming {
            movement.validate().inspect_err(|err| {
                tracing::warn!(id = %movement.id, %err, "rejected imported movement");
            })?;
        }
        let mut all = self.storage.movements()?;
        let mut taken: HashSet<MovementId> = all.iter().map(|m| m.id.clone()).collect();
        let count = incoming.len();
        for mut movement in incoming {
            if taken.contains(&movement.id) {
                movement.id = MovementId::generate();
            }
            let _fresh = taken.insert(movement.id.clone());
            all.push(movement);
        }
        self.storage.save_movements(all)?;
        tracing::debug!(count, "movements imported");
        Ok(count)
    }

    // ── Views ───────────────────────────────────────────────────────

    /// Returns every movement in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails to read.
    #[inline]
    pub fn movements(&self) -> Result<Vec<Movement>> {
        self.storage.movements()
    }

    /// Looks up a movement by id.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] for an unknown id or a storage
    /// error.
    #[inline]
    pub fn movement(&self, id: &MovementId) -> Result<Movement> {
        self.storage
            .movements()?
            .into_iter()
            .find(|movement| movement.id == *id)
            .ok_or_else(|| LedgerError::NotFound(id.clone()))
    }

    /// Movements matching `spec`, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails to read.
    #[inline]
    pub fn filter(&self, spec: &MovementFilter) -> Result<Vec<Movement>> {
        Ok(views::filter(&self.context, &self.storage.movements()?, spec))
    }

    /// Twelve-month cash-flow summary of `year`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails to read.
    #[inline]
    pub fn period_summary(
        &self,
        year: i32,
        mode: CashFlowMode,
        selected_month: Option<u32>,
    ) -> Result<PeriodSummary> {
        let records = self.storage.movements()?;
        Ok(views::period_summary(
            &self.context,
            &records,
            year,
            mode,
            selected_month,
        ))
    }

    /// Per-day cash flow of one month.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails to read.
    #[inline]
    pub fn daily_cash_flow(&self, year: i32, month: u32) -> Result<Vec<DayBucket>> {
        let records = self.storage.movements()?;
        Ok(views::daily_cash_flow(&self.context, &records, year, month))
    }

    /// Expense distribution by category.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails to read.
    #[inline]
    pub fn category_distribution(&self, scope: Scope) -> Result<CategoryDistribution> {
        let records = self.storage.movements()?;
        Ok(views::category_distribution(&self.context, &records, scope))
    }

    /// Cumulative savings of `year`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails to read.
    #[inline]
    pub fn savings_series(&self, year: i32) -> Result<SavingsSeries> {
        let records = self.storage.movements()?;
        Ok(views::savings_series(&self.context, &records, year))
    }

    /// Headline balances; `month` is a `YYYY-MM` prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails to read.
    #[inline]
    pub fn headline(&self, month: Option<&str>) -> Result<Headline> {
        let records = self.storage.movements()?;
        Ok(views::headline(&self.context, &records, month))
    }

    /// Stored values that normalization has to paper over.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails to read.
    #[inline]
    pub fn data_quality(&self) -> Result<Vec<DataIssue>> {
        Ok(self.context.data_quality(&self.storage.movements()?))
    }
}
