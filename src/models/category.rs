//! Closed registry of the categories each movement type may use.

use super::MovementType;

/// Categories available to [`MovementType::Fixed`] movements.
const FIXED: &[&str] = &[
    "Alimentación",
    "Vivienda",
    "Transporte",
    "Servicios",
    "Ahorros",
    "Inversiones",
];

/// Categories available to [`MovementType::Variable`] movements.
const VARIABLE: &[&str] = &[
    "Tarjetas de crédito",
    "Créditos",
    "Salud e higiene",
    "Ocio",
    "Deporte",
    "Otros",
];

/// Categories available to [`MovementType::Income`] movements.
const INCOME: &[&str] = &["Salario", "Extra", "Inversiones"];

/// Categories whose fixed movements count towards savings.
pub const SAVINGS_CATEGORIES: [&str; 2] = ["Ahorros", "Inversiones"];

/// Mapping from movement type to its allowed category set.
///
/// Only consulted when a movement is created or edited. Stored movements
/// keep their category as a plain string and are never re-validated, so
/// a record whose category later disappears from the registry still
/// aggregates normally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryRegistry;

impl CategoryRegistry {
    /// Creates the built-in registry.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns the categories allowed for the given movement type.
    #[inline]
    #[must_use]
    pub const fn categories(self, kind: MovementType) -> &'static [&'static str] {
        match kind {
            MovementType::Fixed => FIXED,
            MovementType::Variable => VARIABLE,
            MovementType::Income => INCOME,
        }
    }

    /// Returns `true` if `category` belongs to the set for `kind`.
    #[inline]
    #[must_use]
    pub fn allows(self, kind: MovementType, category: &str) -> bool {
        self.categories(kind).contains(&category)
    }

    /// Union of every category set, first-seen order, without duplicates.
    #[must_use]
    pub fn all(self) -> Vec<&'static str> {
        let mut out: Vec<&'static str> = Vec::new();
        for kind in MovementType::ALL {
            for &category in self.categories(kind) {
                if !out.contains(&category) {
                    out.push(category);
                }
            }
        }
        out
    }
}

/// Returns `true` for the savings/investment categories.
#[inline]
#[must_use]
pub fn is_savings_category(category: &str) -> bool {
    SAVINGS_CATEGORIES.contains(&category)
}
