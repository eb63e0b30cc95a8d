use uuid::Uuid;

use crate::errors::EngineError;
use crate::models::money::Money;
use crate::models::plan::BudgetPlan;
use crate::models::recommendation::{
    AllocationChange, AppliedRecommendation, Recommendation, RecommendationKind,
};
use crate::models::snapshot::PlanSnapshot;

/// Confidence at or above which an unapplied recommendation drags the
/// optimization score down. Product policy constant, not an invariant.
const HIGH_CONFIDENCE: u8 = 70;

/// Score points deducted per unapplied high-confidence recommendation.
const UNAPPLIED_PENALTY: f64 = 5.0;

/// Applies externally generated cost-saving recommendations as atomic
/// transactions against the ledger, and scores how well-optimized the plan
/// currently is.
pub struct RecommendationService;

impl RecommendationService {
    pub fn new() -> Self {
        Self
    }

    /// Apply a recommendation to the plan.
    ///
    /// - `CategoryReallocation` moves `potential_savings` from the first
    ///   listed category (the over-funded source) to the second (the
    ///   target). Nothing is freed — money changes hands inside the plan.
    /// - Every other kind reduces the targeted categories' allocations by
    ///   `potential_savings` (split proportionally by current allocation
    ///   when several targets are listed) and leaves the freed amount in
    ///   the unallocated pool — the user decides where it goes next.
    ///
    /// No allocation is ever pushed below its category's spent floor
    /// (`InsufficientAllocation`). A second application of the same record
    /// is `AlreadyApplied` and leaves the ledger untouched. On success the
    /// record's `is_applied` flag flips and the change set is logged on the
    /// plan; the recommendation's analytical fields are never modified.
    pub fn apply(
        &self,
        plan: &mut BudgetPlan,
        recommendation: &mut Recommendation,
    ) -> Result<AppliedRecommendation, EngineError> {
        if recommendation.is_applied {
            return Err(EngineError::AlreadyApplied(recommendation.id));
        }
        let savings = recommendation.potential_savings;
        if savings.currency() != plan.currency {
            return Err(EngineError::CurrencyMismatch {
                left: plan.currency,
                right: savings.currency(),
            });
        }
        if savings.is_negative() {
            return Err(EngineError::NegativeResult(format!(
                "{savings} is not a valid savings amount"
            )));
        }

        // Phase 1: compute every new allocation without touching the plan,
        // so a failed validation rejects the whole transaction.
        let changes = match recommendation.kind {
            RecommendationKind::CategoryReallocation => {
                self.reallocation_changes(plan, recommendation)?
            }
            _ => self.reduction_changes(plan, recommendation)?,
        };

        // Phase 2: all valid — write through.
        for change in &changes {
            if let Some(category) = plan.category_mut(change.category_id) {
                category.allocated = change.after;
                category.revision += 1;
            }
        }

        let realized = match recommendation.kind {
            RecommendationKind::CategoryReallocation => Money::zero(plan.currency),
            _ => savings,
        };
        plan.realized_savings = plan.realized_savings.add(realized)?;

        let applied = AppliedRecommendation {
            recommendation_id: recommendation.id,
            kind: recommendation.kind,
            changes,
            realized_savings: realized,
        };
        plan.applied_recommendations.push(applied.clone());
        recommendation.is_applied = true;
        Ok(applied)
    }

    /// How well-optimized the plan is, 0–100, shown by dashboards.
    ///
    /// Pure function of the snapshot and the pending recommendation list —
    /// no hidden state. The weighting is product policy (see the constants
    /// above): overspend erodes the score proportionally to the budget, and
    /// each ignored high-confidence suggestion costs a fixed penalty.
    #[must_use]
    pub fn optimization_score(
        &self,
        snapshot: &PlanSnapshot,
        recommendations: &[Recommendation],
    ) -> u8 {
        let overspend_excess: i64 = snapshot
            .categories
            .iter()
            .map(|c| (c.spent.minor_units() - c.allocated.minor_units()).max(0))
            .sum();

        let mut score = 100.0;
        let total = snapshot.total_budget.minor_units();
        if total > 0 {
            score -= 100.0 * overspend_excess as f64 / total as f64;
        }

        let ignored = recommendations
            .iter()
            .filter(|r| !r.is_applied && r.confidence >= HIGH_CONFIDENCE)
            .count();
        score -= UNAPPLIED_PENALTY * ignored as f64;

        score.clamp(0.0, 100.0).round() as u8
    }

    // ── Internal ────────────────────────────────────────────────────

    fn reallocation_changes(
        &self,
        plan: &BudgetPlan,
        recommendation: &Recommendation,
    ) -> Result<Vec<AllocationChange>, EngineError> {
        let [source_id, target_id] = recommendation.target_category_ids[..] else {
            return Err(EngineError::Validation(format!(
                "Reallocation needs exactly two categories (source, target), got {}",
                recommendation.target_category_ids.len()
            )));
        };
        if source_id == target_id {
            return Err(EngineError::Validation(
                "Reallocation source and target must differ".into(),
            ));
        }
        let source = self.active_category(plan, source_id)?;
        let target = self.active_category(plan, target_id)?;
        let savings = recommendation.potential_savings;

        let source_after = source.allocated.minor_units() - savings.minor_units();
        if source_after < source.spent.minor_units() {
            return Err(EngineError::InsufficientAllocation {
                category: source_id,
                allocated: source.allocated,
                spent: source.spent,
            });
        }

        Ok(vec![
            AllocationChange {
                category_id: source_id,
                before: source.allocated,
                after: Money::from_minor(source_after, plan.currency),
            },
            AllocationChange {
                category_id: target_id,
                before: target.allocated,
                after: target.allocated.add(savings)?,
            },
        ])
    }

    fn reduction_changes(
        &self,
        plan: &BudgetPlan,
        recommendation: &Recommendation,
    ) -> Result<Vec<AllocationChange>, EngineError> {
        if recommendation.target_category_ids.is_empty() {
            return Err(EngineError::Validation(
                "Recommendation lists no target categories".into(),
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for id in &recommendation.target_category_ids {
            if !seen.insert(*id) {
                return Err(EngineError::Validation(format!(
                    "Duplicate category {id} in recommendation targets"
                )));
            }
        }
        let targets: Vec<_> = recommendation
            .target_category_ids
            .iter()
            .map(|id| self.active_category(plan, *id))
            .collect::<Result<_, _>>()?;

        let weights: Vec<i64> = targets
            .iter()
            .map(|c| c.allocated.minor_units())
            .collect();
        let reductions = recommendation.potential_savings.split_proportional(&weights);

        let mut changes = Vec::with_capacity(targets.len());
        for (category, reduction) in targets.iter().zip(reductions) {
            let after = category.allocated.minor_units() - reduction.minor_units();
            if after < category.spent.minor_units() {
                return Err(EngineError::InsufficientAllocation {
                    category: category.id,
                    allocated: category.allocated,
                    spent: category.spent,
                });
            }
            changes.push(AllocationChange {
                category_id: category.id,
                before: category.allocated,
                after: Money::from_minor(after, plan.currency),
            });
        }
        Ok(changes)
    }

    fn active_category<'a>(
        &self,
        plan: &'a BudgetPlan,
        id: Uuid,
    ) -> Result<&'a crate::models::category::CategoryLedger, EngineError> {
        plan.categories
            .iter()
            .find(|c| c.id == id && !c.archived)
            .ok_or(EngineError::UnknownCategory(id))
    }
}

impl Default for RecommendationService {
    fn default() -> Self {
        Self::new()
    }
}
