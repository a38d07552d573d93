//! Pluggable storage backends for the movement collection.
//!
//! The aggregation core never touches storage itself: the [`Ledger`]
//! facade reads a full snapshot, hands it to the views, and writes the
//! whole collection back after a mutation.
//!
//! [`Ledger`]: crate::ledger::Ledger

#[cfg(feature = "storage-file")]
mod file;
mod memory;

#[cfg(feature = "storage-file")]
pub use file::FileStorage;
pub use memory::InMemoryStorage;

use crate::error::Result;
use crate::models::{DefaultRates, Movement};

/// Blocking storage backend for movements and default rates.
///
/// All methods take `&self`; implementations use interior mutability
/// (e.g. `Mutex`) for mutation.
pub trait MovementStore: core::fmt::Debug + Send + Sync {
    /// Returns every stored movement in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails to read.
    fn movements(&self) -> Result<Vec<Movement>>;

    /// Replaces the stored collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails to write.
    fn save_movements(&self, items: Vec<Movement>) -> Result<()>;

    /// Returns the stored default-rate table, or `Ok(None)` if none has
    /// been saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails to read.
    fn default_rates(&self) -> Result<Option<DefaultRates>>;

    /// Replaces the stored default-rate table.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails to write.
    fn save_default_rates(&self, rates: &DefaultRates) -> Result<()>;

    /// Removes all stored data.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails to write.
    fn clear(&self) -> Result<()>;
}
