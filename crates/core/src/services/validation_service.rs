use uuid::Uuid;

use crate::models::money::Money;
use crate::models::plan::BudgetPlan;
use crate::models::snapshot::BudgetWarning;

/// Pure warning computation, consumed by every UI surface so badges stay
/// consistent across the desktop chart, mobile slider, and wizards.
///
/// These functions never mutate and never fail — the absence of a warning
/// is simply an empty result. Safe to call from any view at any time.
pub struct ValidationService;

impl ValidationService {
    pub fn new() -> Self {
        Self
    }

    /// Whether the sum of allocations exceeds the total budget.
    #[must_use]
    pub fn is_over_allocated(&self, plan: &BudgetPlan) -> bool {
        plan.total_allocated().minor_units() > plan.total_budget.minor_units()
    }

    /// How far allocations exceed the budget, when they do.
    #[must_use]
    pub fn over_allocation_excess(&self, plan: &BudgetPlan) -> Option<Money> {
        let excess = plan.total_allocated().minor_units() - plan.total_budget.minor_units();
        (excess > 0).then(|| Money::from_minor(excess, plan.currency))
    }

    /// Active categories whose spend exceeds their allocation.
    #[must_use]
    pub fn overspent_categories(&self, plan: &BudgetPlan) -> Vec<Uuid> {
        plan.active_categories()
            .filter(|c| c.spent.minor_units() > c.allocated.minor_units())
            .map(|c| c.id)
            .collect()
    }

    /// Active categories at or past their alert threshold, with their
    /// utilization ratio.
    #[must_use]
    pub fn near_limit_categories(&self, plan: &BudgetPlan) -> Vec<(Uuid, f64)> {
        plan.active_categories()
            .filter_map(|c| {
                let derived = c.derive(plan.total_budget);
                derived.is_near_limit.then_some((c.id, derived.utilization))
            })
            .collect()
    }

    /// The full badge list for a snapshot: plan-level over-allocation
    /// first, then per-category warnings in display order. An overspent
    /// category gets only the over-budget badge — near-limit is subsumed
    /// once utilization passes 1.
    #[must_use]
    pub fn warnings(&self, plan: &BudgetPlan) -> Vec<BudgetWarning> {
        let mut warnings = Vec::new();

        if let Some(excess) = self.over_allocation_excess(plan) {
            warnings.push(BudgetWarning::OverAllocated { excess });
        }

        for category in plan.active_categories() {
            let derived = category.derive(plan.total_budget);
            if derived.is_over_budget {
                warnings.push(BudgetWarning::OverBudget {
                    category_id: category.id,
                    overspend: Money::from_minor(
                        category.spent.minor_units() - category.allocated.minor_units(),
                        plan.currency,
                    ),
                });
            } else if derived.is_near_limit {
                warnings.push(BudgetWarning::NearLimit {
                    category_id: category.id,
                    utilization: derived.utilization,
                });
            }
        }

        warnings
    }
}

impl Default for ValidationService {
    fn default() -> Self {
        Self::new()
    }
}
