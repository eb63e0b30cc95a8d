use std::collections::HashSet;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::errors::EngineError;
use crate::models::category::CategoryLedger;
use crate::models::expense::{ExpenseRecord, ReceiptCapture};
use crate::models::money::Money;
use crate::models::plan::BudgetPlan;

/// Mutation primitives for the budget plan: category lifecycle, allocation
/// edits, and spend recording.
///
/// Pure business logic — no I/O, no subscribers, no snapshots. Every method
/// validates before it writes, so a returned error leaves the plan exactly
/// as it was.
pub struct AllocationService;

impl AllocationService {
    pub fn new() -> Self {
        Self
    }

    /// Create a new category with nothing allocated and nothing spent
    /// (optionally seeded with an initial allocation). Inherits the plan's
    /// default alert threshold.
    pub fn add_category(
        &self,
        plan: &mut BudgetPlan,
        name: &str,
        initial_allocation: Option<Money>,
    ) -> Result<Uuid, EngineError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(EngineError::Validation(
                "Category name must not be empty".into(),
            ));
        }
        if let Some(amount) = initial_allocation {
            self.check_amount(plan, amount)?;
        }

        let next_order = plan
            .categories
            .iter()
            .map(|c| c.sort_order + 1)
            .max()
            .unwrap_or(0);

        let mut category = CategoryLedger::new(trimmed, plan.currency, next_order);
        category.alert_threshold = plan.settings.default_alert_threshold;
        if let Some(amount) = initial_allocation {
            category.allocated = amount;
        }
        let id = category.id;
        plan.categories.push(category);
        plan.resort_categories();
        Ok(id)
    }

    /// Physically remove a category. Only permitted while nothing has been
    /// spent against it — once spend history exists the caller must archive
    /// instead, preserving the audit trail.
    pub fn remove_category(&self, plan: &mut BudgetPlan, id: Uuid) -> Result<(), EngineError> {
        let category = plan.category(id).ok_or(EngineError::UnknownCategory(id))?;
        let has_expenses = plan.expenses.iter().any(|e| e.category_id == id);
        if !category.spent.is_zero() || has_expenses {
            return Err(EngineError::CategoryHasActivity(id));
        }
        plan.categories.retain(|c| c.id != id);
        Ok(())
    }

    /// Soft-delete: the category drops out of ledger math but keeps its
    /// spend history. Idempotent.
    pub fn archive_category(&self, plan: &mut BudgetPlan, id: Uuid) -> Result<(), EngineError> {
        let category = plan
            .category_mut(id)
            .ok_or(EngineError::UnknownCategory(id))?;
        if !category.archived {
            category.archived = true;
            category.revision += 1;
        }
        plan.resort_categories();
        Ok(())
    }

    pub fn rename_category(
        &self,
        plan: &mut BudgetPlan,
        id: Uuid,
        name: &str,
    ) -> Result<(), EngineError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(EngineError::Validation(
                "Category name must not be empty".into(),
            ));
        }
        let category = self.active_category_mut(plan, id)?;
        category.name = trimmed.to_string();
        category.revision += 1;
        Ok(())
    }

    /// Set or clear the near-limit alert threshold. Must be within (0, 1].
    pub fn set_alert_threshold(
        &self,
        plan: &mut BudgetPlan,
        id: Uuid,
        threshold: Option<f64>,
    ) -> Result<(), EngineError> {
        if let Some(t) = threshold {
            if !(t > 0.0 && t <= 1.0) {
                return Err(EngineError::Validation(format!(
                    "Alert threshold {t} out of range: must be within (0, 1]"
                )));
            }
        }
        let category = self.active_category_mut(plan, id)?;
        category.alert_threshold = threshold;
        category.revision += 1;
        Ok(())
    }

    pub fn set_allows_overspend(
        &self,
        plan: &mut BudgetPlan,
        id: Uuid,
        allows: bool,
    ) -> Result<(), EngineError> {
        let category = self.active_category_mut(plan, id)?;
        category.allows_overspend = allows;
        category.revision += 1;
        Ok(())
    }

    pub fn set_category_color(
        &self,
        plan: &mut BudgetPlan,
        id: Uuid,
        color: Option<String>,
    ) -> Result<(), EngineError> {
        let category = self.active_category_mut(plan, id)?;
        category.color = color;
        category.revision += 1;
        Ok(())
    }

    /// Directly set a category's allocation (typed-entry / slider path).
    ///
    /// Any non-negative amount is accepted — exceeding the remaining budget
    /// is deliberately allowed (it surfaces as a warning, never a
    /// rejection), so users can over-plan temporarily and resolve later.
    pub fn set_allocation(
        &self,
        plan: &mut BudgetPlan,
        id: Uuid,
        amount: Money,
    ) -> Result<(), EngineError> {
        self.check_amount(plan, amount)?;
        let category = self.active_category_mut(plan, id)?;
        category.allocated = amount;
        category.revision += 1;
        Ok(())
    }

    /// Add a signed delta to a category's allocation (gesture-commit path),
    /// floored at the category's spent — a drag can never pull an
    /// allocation below what is already committed in the real world.
    pub fn apply_delta(
        &self,
        plan: &mut BudgetPlan,
        id: Uuid,
        delta: Money,
    ) -> Result<(), EngineError> {
        if delta.currency() != plan.currency {
            return Err(EngineError::CurrencyMismatch {
                left: plan.currency,
                right: delta.currency(),
            });
        }
        let category = self.active_category_mut(plan, id)?;
        let proposed = category.allocated.minor_units() + delta.minor_units();
        let floored = proposed.max(category.spent.minor_units());
        category.allocated = Money::from_minor(floored, category.allocated.currency());
        category.revision += 1;
        Ok(())
    }

    /// Record real-world spend. Never blocked: money already left the
    /// couple's account, so the ledger must reflect it even when it pushes
    /// the category over its allocation (that becomes a warning on the
    /// snapshot, not an error here).
    pub fn record_expense(
        &self,
        plan: &mut BudgetPlan,
        id: Uuid,
        amount: Money,
        date: NaiveDate,
    ) -> Result<(), EngineError> {
        self.check_spend(plan, amount)?;
        let category = self.active_category_mut(plan, id)?;
        category.spent = category.spent.add(amount)?;
        category.revision += 1;
        plan.expenses.push(ExpenseRecord::manual(id, amount, date));
        Ok(())
    }

    /// Record spend extracted from a scanned receipt, once the caller has
    /// resolved which category it belongs to.
    pub fn record_receipt(
        &self,
        plan: &mut BudgetPlan,
        id: Uuid,
        capture: &ReceiptCapture,
    ) -> Result<(), EngineError> {
        self.check_spend(plan, capture.amount)?;
        let category = self.active_category_mut(plan, id)?;
        category.spent = category.spent.add(capture.amount)?;
        category.revision += 1;
        plan.expenses.push(ExpenseRecord::from_receipt(id, capture));
        Ok(())
    }

    /// Replace the display order of the active categories. `ids` must list
    /// every active category exactly once.
    pub fn reorder(&self, plan: &mut BudgetPlan, ids: &[Uuid]) -> Result<(), EngineError> {
        let active: HashSet<Uuid> = plan.active_categories().map(|c| c.id).collect();
        if ids.len() != active.len() {
            return Err(EngineError::Validation(format!(
                "Reorder must list every active category exactly once ({} given, {} active)",
                ids.len(),
                active.len()
            )));
        }
        let mut seen = HashSet::new();
        for id in ids {
            if !active.contains(id) {
                return Err(EngineError::UnknownCategory(*id));
            }
            if !seen.insert(*id) {
                return Err(EngineError::Validation(format!(
                    "Duplicate category {id} in reorder"
                )));
            }
        }

        for (position, id) in ids.iter().enumerate() {
            if let Some(category) = plan.category_mut(*id) {
                category.sort_order = position as u32;
                category.revision += 1;
            }
        }
        plan.resort_categories();
        Ok(())
    }

    /// Change the total budget. Rebalancing, when requested, is composed by
    /// the engine facade so the two steps commit as one atomic mutation.
    pub fn revise_total_budget(
        &self,
        plan: &mut BudgetPlan,
        new_total: Money,
    ) -> Result<(), EngineError> {
        self.check_amount(plan, new_total)?;
        plan.total_budget = new_total;
        Ok(())
    }

    // ── Internal ────────────────────────────────────────────────────

    /// Currency must match the plan and the amount must not be negative.
    fn check_amount(&self, plan: &BudgetPlan, amount: Money) -> Result<(), EngineError> {
        if amount.currency() != plan.currency {
            return Err(EngineError::CurrencyMismatch {
                left: plan.currency,
                right: amount.currency(),
            });
        }
        if amount.is_negative() {
            return Err(EngineError::NegativeResult(format!(
                "{amount} is not a valid allocation amount"
            )));
        }
        Ok(())
    }

    /// Spend amounts must additionally be strictly positive.
    fn check_spend(&self, plan: &BudgetPlan, amount: Money) -> Result<(), EngineError> {
        self.check_amount(plan, amount)?;
        if !amount.is_positive() {
            return Err(EngineError::Validation(
                "Expense amount must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Mutable handle to an active category. Archived categories reject
    /// mutations the same way a missing id does.
    fn active_category_mut<'a>(
        &self,
        plan: &'a mut BudgetPlan,
        id: Uuid,
    ) -> Result<&'a mut CategoryLedger, EngineError> {
        plan.categories
            .iter_mut()
            .find(|c| c.id == id && !c.archived)
            .ok_or(EngineError::UnknownCategory(id))
    }
}

impl Default for AllocationService {
    fn default() -> Self {
        Self::new()
    }
}
