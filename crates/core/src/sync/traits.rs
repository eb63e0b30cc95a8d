use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::models::category::CategoryLedger;
use crate::models::money::{Currency, Money};
use crate::models::plan::BudgetPlan;

/// Wire document exchanged with the remote store: the plan state plus the
/// revision counters reconciliation keys on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncEnvelope {
    /// Plan-level revision (server-assigned after the first acknowledged
    /// push).
    pub revision: u64,
    pub currency: Currency,
    pub total_budget: Money,
    pub categories: Vec<CategoryLedger>,
}

impl SyncEnvelope {
    /// Snapshot the syncable part of a plan. Expenses and the applied-
    /// recommendation log travel separately in the product's API; the
    /// engine's contract is only `{total_budget, categories[]}` plus
    /// revisions.
    #[must_use]
    pub fn from_plan(plan: &BudgetPlan) -> Self {
        Self {
            revision: plan.revision,
            currency: plan.currency,
            total_budget: plan.total_budget,
            categories: plan.categories.clone(),
        }
    }
}

/// Result of pushing local state to the remote store.
#[derive(Debug, Clone, PartialEq)]
pub enum PushOutcome {
    /// The server accepted the state and assigned this plan revision.
    Ack { revision: u64 },
    /// The server's state diverged (a collaborator edited concurrently);
    /// reconcile against the returned state.
    Conflict { server: SyncEnvelope },
}

/// Trait abstraction for the persistence/sync collaborator.
///
/// The engine applies every mutation to its in-memory snapshot immediately
/// (optimistic) and reconciles with the remote result later; implementations
/// of this trait are the only place network I/O happens. Swapping the
/// backing store touches one implementation, nothing else.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait SyncBackend: Send + Sync {
    /// Human-readable name of this backend (for logs/errors).
    fn name(&self) -> &str;

    /// Push the local state. Returns `Ack` with the server-assigned plan
    /// revision, or `Conflict` carrying the diverged server state.
    async fn push(&self, envelope: &SyncEnvelope) -> Result<PushOutcome, EngineError>;

    /// Fetch the server's current state.
    async fn pull(&self) -> Result<SyncEnvelope, EngineError>;
}
