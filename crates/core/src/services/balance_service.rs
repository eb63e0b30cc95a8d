use crate::errors::EngineError;
use crate::models::money::Money;
use crate::models::plan::BudgetPlan;

/// Proportional redistribution of budget headroom across categories,
/// preserving each category's already-spent floor.
///
/// The whole pass is computed first and written in one go — subscribers
/// never observe a partially rebalanced plan.
pub struct BalanceService;

impl BalanceService {
    pub fn new() -> Self {
        Self
    }

    /// Rebalance all active allocations so they sum to the total budget.
    ///
    /// Partition: "committed" = Σ spent, "free pool" = total − committed.
    /// The free pool is distributed proportionally to each category's
    /// current share of total allocation; `new_allocated = spent + share`
    /// with largest-remainder exactness, so `Σ allocated == total` whenever
    /// `Σ spent ≤ total`. Categories with nothing allocated share the
    /// rounding residue equally (an all-empty plan falls back to a full
    /// equal split). When committed spend already exceeds the budget there
    /// is nothing sane to distribute — that is `CannotBalance`, never a
    /// negative allocation.
    pub fn rebalance(&self, plan: &mut BudgetPlan) -> Result<(), EngineError> {
        let committed = plan.total_spent();
        let total = plan.total_budget;
        if committed.minor_units() > total.minor_units() {
            return Err(EngineError::CannotBalance { committed, total });
        }
        let free_pool = total.sub_non_negative(committed)?;

        let active: Vec<usize> = plan
            .categories
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.archived)
            .map(|(i, _)| i)
            .collect();
        if active.is_empty() {
            return Ok(());
        }

        let weights: Vec<i64> = active
            .iter()
            .map(|&i| plan.categories[i].allocated.minor_units())
            .collect();

        let shares = self.shares_for(free_pool, &weights);

        // Compute-then-write: all new values exist before any is stored.
        let new_allocations: Vec<Money> = active
            .iter()
            .zip(&shares)
            .map(|(&i, share)| {
                Money::from_minor(
                    plan.categories[i].spent.minor_units() + share.minor_units(),
                    plan.currency,
                )
            })
            .collect();

        for (&i, allocated) in active.iter().zip(new_allocations) {
            let category = &mut plan.categories[i];
            category.allocated = allocated;
            category.revision += 1;
        }
        Ok(())
    }

    /// Split the free pool by allocation weights. Weighted categories take
    /// the floor of their proportional share; the rounding residue goes to
    /// zero-allocation categories in equal parts when any exist, so a
    /// freshly added category is never starved of the leftover units.
    fn shares_for(&self, free_pool: Money, weights: &[i64]) -> Vec<Money> {
        let weight_sum: i64 = weights.iter().map(|w| (*w).max(0)).sum();
        let empty: Vec<usize> = weights
            .iter()
            .enumerate()
            .filter(|(_, w)| **w <= 0)
            .map(|(i, _)| i)
            .collect();

        if weight_sum == 0 || empty.is_empty() {
            // Pure largest-remainder split (equal fallback when all weights
            // are zero).
            return free_pool.split_proportional(weights);
        }

        let total = free_pool.minor_units() as i128;
        let mut shares: Vec<i64> = weights
            .iter()
            .map(|w| {
                let w = (*w).max(0) as i128;
                ((total * w) / weight_sum as i128) as i64
            })
            .collect();

        let assigned: i64 = shares.iter().sum();
        let residue = Money::from_minor(
            free_pool.minor_units() - assigned,
            free_pool.currency(),
        );
        let residue_shares = residue.split_proportional(&vec![1; empty.len()]);
        for (slot, part) in empty.iter().zip(residue_shares) {
            shares[*slot] += part.minor_units();
        }

        shares
            .into_iter()
            .map(|s| Money::from_minor(s, free_pool.currency()))
            .collect()
    }
}

impl Default for BalanceService {
    fn default() -> Self {
        Self::new()
    }
}
