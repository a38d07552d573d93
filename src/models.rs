//! Data models for ledger movements.
//!
//! This module contains the [`Movement`] entity, its creation and edit
//! inputs, the closed category registry, the default-rate table and the
//! enumeration types for constrained values.

mod category;
mod enums;
mod ids;
mod movement;
mod rates;

pub use category::{CategoryRegistry, SAVINGS_CATEGORIES, is_savings_category};
pub use enums::{Currency, MovementType};
pub use ids::MovementId;
pub use movement::{DATE_FORMAT, Movement, MovementDraft, MovementPatch, validate_date};
pub use rates::{DefaultRates, is_usable_rate};
