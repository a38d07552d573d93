//! In-memory storage backend for testing.
//!
//! Provides [`InMemoryStorage`], a thread-safe in-memory implementation of
//! [`super::MovementStore`]. Ideal for unit tests where file I/O is
//! undesirable.

use std::sync::Mutex;

use crate::error::{LedgerError, Result};
use crate::models::{DefaultRates, Movement};

/// Thread-safe in-memory storage.
///
/// # Example
///
/// ```rust
/// use cashbook::ledger::Ledger;
/// use cashbook::storage::InMemoryStorage;
///
/// let ledger = Ledger::builder().storage(InMemoryStorage::new()).build();
/// assert!(ledger.is_ok());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    /// All state behind a single mutex for thread-safe interior mutability.
    inner: Mutex<Inner>,
}

/// Inner mutable state.
#[derive(Debug, Default)]
struct Inner {
    /// Stored movements.
    movements: Vec<Movement>,
    /// Stored default rates, absent until first saved.
    rates: Option<DefaultRates>,
}

impl InMemoryStorage {
    /// Creates a new empty in-memory storage.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storage pre-filled with `movements`.
    #[inline]
    #[must_use]
    pub fn with_movements(movements: Vec<Movement>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                movements,
                rates: None,
            }),
        }
    }

    /// Runs `op` on the state while holding the mutex.
    fn access<R>(&self, op: impl FnOnce(&mut Inner) -> R) -> Result<R> {
        self.inner
            .lock()
            .map(|mut state| op(&mut state))
            .map_err(|poisoned| LedgerError::storage(format!("in-memory store poisoned: {poisoned}")))
    }
}

impl super::MovementStore for InMemoryStorage {
    #[inline]
    fn movements(&self) -> Result<Vec<Movement>> {
        self.access(|inner| inner.movements.clone())
    }

    #[inline]
    fn save_movements(&self, items: Vec<Movement>) -> Result<()> {
        self.access(|inner| inner.movements = items)
    }

    #[inline]
    fn default_rates(&self) -> Result<Option<DefaultRates>> {
        self.access(|inner| inner.rates.clone())
    }

    #[inline]
    fn save_default_rates(&self, rates: &DefaultRates) -> Result<()> {
        self.access(|inner| inner.rates = Some(rates.clone()))
    }

    #[inline]
    fn clear(&self) -> Result<()> {
        self.access(|inner| *inner = Inner::default())
    }
}
