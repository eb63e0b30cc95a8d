use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::category::CategoryLedger;
use super::expense::ExpenseRecord;
use super::money::{Currency, Money};
use super::recommendation::AppliedRecommendation;
use super::settings::PlanSettings;

/// The main data container — the engine's single source of truth.
///
/// Everything in here serializes: the sync envelope pushed to the remote
/// store is built from it, and callers can round-trip the whole plan as
/// JSON for local caching.
///
/// Invariants upheld by every mutation path: category ids are unique; no
/// `allocated` or `spent` goes negative; the sum of allocations MAY exceed
/// the total budget (that is a warning state, never silently clamped).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetPlan {
    /// Currency every amount in the plan is denominated in.
    pub currency: Currency,

    /// The fixed wedding budget being divided across categories. Changes
    /// only through the explicit "revise total budget" operation.
    pub total_budget: Money,

    /// Category lines, kept sorted by (archived, sort_order).
    pub categories: Vec<CategoryLedger>,

    /// Append-only spend audit trail (manual entries and scanned receipts).
    #[serde(default)]
    pub expenses: Vec<ExpenseRecord>,

    /// User-configurable knobs.
    #[serde(default)]
    pub settings: PlanSettings,

    /// Plan-level revision, bumped on every successful mutation and
    /// replaced by the server-assigned value on push acknowledgement.
    #[serde(default)]
    pub revision: u64,

    /// Total savings realized through applied recommendations.
    pub realized_savings: Money,

    /// Log of recommendations already applied against this plan.
    #[serde(default)]
    pub applied_recommendations: Vec<AppliedRecommendation>,
}

impl BudgetPlan {
    /// Create an empty plan around a total budget. The plan's currency is
    /// taken from the budget amount.
    pub fn new(total_budget: Money) -> Self {
        let currency = total_budget.currency();
        Self {
            currency,
            total_budget,
            categories: Vec::new(),
            expenses: Vec::new(),
            settings: PlanSettings::default(),
            revision: 0,
            realized_savings: Money::zero(currency),
            applied_recommendations: Vec::new(),
        }
    }

    /// Find a category by id, archived ones included.
    #[must_use]
    pub fn category(&self, id: Uuid) -> Option<&CategoryLedger> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub(crate) fn category_mut(&mut self, id: Uuid) -> Option<&mut CategoryLedger> {
        self.categories.iter_mut().find(|c| c.id == id)
    }

    /// Active (non-archived) categories in display order.
    pub fn active_categories(&self) -> impl Iterator<Item = &CategoryLedger> {
        self.categories.iter().filter(|c| !c.archived)
    }

    /// Sum of active allocations. Archived categories are history — they
    /// drop out of the ledger math but keep their expense records.
    #[must_use]
    pub fn total_allocated(&self) -> Money {
        let sum: i64 = self
            .active_categories()
            .map(|c| c.allocated.minor_units())
            .sum();
        Money::from_minor(sum, self.currency)
    }

    /// Sum of active spend.
    #[must_use]
    pub fn total_spent(&self) -> Money {
        let sum: i64 = self
            .active_categories()
            .map(|c| c.spent.minor_units())
            .sum();
        Money::from_minor(sum, self.currency)
    }

    /// Expense records for one category, oldest first.
    #[must_use]
    pub fn expenses_for(&self, category_id: Uuid) -> Vec<&ExpenseRecord> {
        self.expenses
            .iter()
            .filter(|e| e.category_id == category_id)
            .collect()
    }

    /// Restore the (archived, sort_order) ordering after a structural
    /// mutation.
    pub(crate) fn resort_categories(&mut self) {
        self.categories.sort_by_key(|c| (c.archived, c.sort_order));
    }
}

impl Default for BudgetPlan {
    fn default() -> Self {
        // GBP is the product's home market; fresh plans start here.
        Self::new(Money::zero(Currency::GBP))
    }
}
