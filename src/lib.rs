//! Personal multi-currency cashbook.
//!
//! This crate keeps a ledger of dated, categorized movements recorded in
//! several currencies and derives views from it: filtered listings with
//! running balances, monthly and yearly cash-flow summaries with carried
//! forward opening balances, category expense distributions and cumulative
//! savings.
//!
//! # Example
//!
//! ```rust
//! use cashbook::ledger::Ledger;
//! use cashbook::models::{Currency, MovementDraft, MovementType};
//! use cashbook::storage::InMemoryStorage;
//!
//! let mut ledger = Ledger::builder()
//!     .storage(InMemoryStorage::new())
//!     .build()
//!     .unwrap();
//! let movement = ledger
//!     .add(
//!         MovementDraft::new()
//!             .kind(MovementType::Variable)
//!             .category("Ocio")
//!             .amount(84_000.0)
//!             .currency(Currency::Cop)
//!             .date("2024-05-04"),
//!     )
//!     .unwrap();
//! assert_eq!(movement.rate, Some(4200.0));
//! assert!((ledger.headline(None).unwrap().balance + 20.0).abs() < 1e-9);
//! ```

pub mod context;
pub mod error;
pub mod ledger;
pub mod models;
pub mod storage;
pub mod views;
