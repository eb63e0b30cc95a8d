use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::money::{Currency, Money};

/// One budget category line: money earmarked (`allocated`) versus money
/// already recorded against it (`spent`).
///
/// Only stored fields live here. Everything a view renders beyond these
/// comes out of [`CategoryLedger::derive`], recomputed on demand, so no
/// stored value can go stale relative to `allocated`/`spent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryLedger {
    /// Unique identifier, immutable for the category's lifetime.
    pub id: Uuid,

    /// Display label (e.g., "Venue", "Catering").
    pub name: String,

    /// Money earmarked for this category, independent of money spent.
    pub allocated: Money,

    /// Money already recorded against this category. Never decreases
    /// through the engine; corrections are a separate concern.
    pub spent: Money,

    /// Utilization ratio at which the category gets a near-limit badge.
    /// Within (0, 1] when set.
    #[serde(default)]
    pub alert_threshold: Option<f64>,

    /// Whether spending past the allocation is expected here. Affects
    /// warnings only — recording real-world spend is never blocked.
    #[serde(default)]
    pub allows_overspend: bool,

    /// Position in the user's display order.
    pub sort_order: u32,

    /// Display color tag. Opaque to the engine.
    #[serde(default)]
    pub color: Option<String>,

    /// Soft-delete flag. Categories with spend history are archived, never
    /// removed, so the audit trail stays intact.
    #[serde(default)]
    pub archived: bool,

    /// Per-category revision counter used by sync reconciliation.
    /// Bumped locally on every mutation; the server assigns the
    /// authoritative value on acknowledgement.
    #[serde(default)]
    pub revision: u64,
}

impl CategoryLedger {
    /// Create a fresh category with nothing allocated and nothing spent.
    pub fn new(name: impl Into<String>, currency: Currency, sort_order: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            allocated: Money::zero(currency),
            spent: Money::zero(currency),
            alert_threshold: None,
            allows_overspend: false,
            sort_order,
            color: None,
            archived: false,
            revision: 0,
        }
    }

    /// Compute the derived metrics for this category against the plan's
    /// total budget. Pure and deterministic: identical input always yields
    /// identical output, so every consuming view stays visually consistent
    /// without sharing render code.
    #[must_use]
    pub fn derive(&self, total_budget: Money) -> CategoryDerived {
        // The plan upholds a single currency across all amounts, so raw
        // minor-unit arithmetic is safe here and keeps derive infallible.
        let remaining = Money::from_minor(
            self.allocated.minor_units() - self.spent.minor_units(),
            self.allocated.currency(),
        );
        let utilization = self.spent.percent_of(self.allocated);
        let is_over_budget = self.spent.minor_units() > self.allocated.minor_units();

        CategoryDerived {
            remaining,
            percent_of_total: self.allocated.percent_of(total_budget),
            utilization,
            is_over_budget,
            is_near_limit: self
                .alert_threshold
                .map(|t| utilization >= t)
                .unwrap_or(false),
        }
    }
}

/// Derived, never-stored metrics for one category. Recomputed atomically
/// with every snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDerived {
    /// allocated − spent; negative when overspent.
    pub remaining: Money,

    /// allocated / total budget (0 when the budget is 0).
    pub percent_of_total: f64,

    /// spent / allocated (0 when nothing is allocated; can exceed 1).
    pub utilization: f64,

    /// spent > allocated.
    pub is_over_budget: bool,

    /// alert threshold set and utilization at or past it.
    pub is_near_limit: bool,
}
