use tracing::{debug, warn};
use uuid::Uuid;

use super::traits::SyncEnvelope;
use crate::errors::EngineError;
use crate::models::plan::BudgetPlan;

/// What a merge did: which local edits survived against diverged server
/// rows (and must be re-surfaced to the user), and whether anything in the
/// plan changed at all.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReconcileOutcome {
    /// Categories where the local value won over a diverged server row.
    /// These become `SyncConflict` warnings — a conflicting local change is
    /// never silently dropped.
    pub conflicted: Vec<Uuid>,
    pub changed: bool,
}

/// Merge a server envelope into the local plan: last-write-wins per
/// category, keyed by the revision counter.
///
/// - server revision ahead of local → the server row replaces the local one
/// - local revision at or ahead of the server's, values differing → the
///   local (optimistic, unacknowledged) edit is kept and reported back
/// - categories present on only one side are kept (union)
///
/// The plan-level revision advances to the server's when the server is
/// ahead, so the next push carries a current base.
pub fn merge_server_state(
    plan: &mut BudgetPlan,
    server: &SyncEnvelope,
) -> Result<ReconcileOutcome, EngineError> {
    if server.currency != plan.currency {
        return Err(EngineError::CurrencyMismatch {
            left: plan.currency,
            right: server.currency,
        });
    }

    let mut outcome = ReconcileOutcome::default();

    if server.revision > plan.revision && server.total_budget != plan.total_budget {
        debug!(
            local = %plan.total_budget,
            remote = %server.total_budget,
            "total budget updated from server"
        );
        plan.total_budget = server.total_budget;
        outcome.changed = true;
    }

    for server_category in &server.categories {
        let position = plan
            .categories
            .iter()
            .position(|c| c.id == server_category.id);
        match position {
            Some(idx) => {
                let local = &mut plan.categories[idx];
                if server_category.revision > local.revision {
                    if !same_content(local, server_category) {
                        outcome.changed = true;
                    }
                    *local = server_category.clone();
                } else if !same_content(local, server_category) {
                    warn!(category = %local.id, "local edit conflicts with server row — keeping local");
                    outcome.conflicted.push(local.id);
                }
            }
            None => {
                plan.categories.push(server_category.clone());
                outcome.changed = true;
            }
        }
    }

    if server.revision > plan.revision {
        plan.revision = server.revision;
    }
    plan.resort_categories();

    debug!(
        conflicted = outcome.conflicted.len(),
        changed = outcome.changed,
        "reconciliation complete"
    );
    Ok(outcome)
}

/// Row equality ignoring the revision counter — two rows with the same
/// values but different revisions are not a conflict.
fn same_content(a: &crate::models::category::CategoryLedger, b: &crate::models::category::CategoryLedger) -> bool {
    a.id == b.id
        && a.name == b.name
        && a.allocated == b.allocated
        && a.spent == b.spent
        && a.alert_threshold == b.alert_threshold
        && a.allows_overspend == b.allows_overspend
        && a.sort_order == b.sort_order
        && a.color == b.color
        && a.archived == b.archived
}
