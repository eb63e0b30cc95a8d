pub mod errors;
pub mod models;
pub mod services;
pub mod sync;

use uuid::Uuid;

use errors::EngineError;
use models::expense::ReceiptCapture;
use models::money::Money;
use models::plan::BudgetPlan;
use models::recommendation::{AppliedRecommendation, Recommendation};
use models::snapshot::{BudgetWarning, PlanSnapshot, SyncStatus};
use services::allocation_service::AllocationService;
use services::balance_service::BalanceService;
use services::gesture_service::{GestureService, Sensitivity};
use services::recommendation_service::RecommendationService;
use services::validation_service::ValidationService;
use sync::reconcile;
use sync::traits::{PushOutcome, SyncBackend, SyncEnvelope};

/// Subscriber callback plus the handle used to remove it.
struct Subscriber {
    id: Uuid,
    callback: Box<dyn Fn(&PlanSnapshot)>,
}

/// Main entry point for the wedding budget core library.
///
/// Holds the plan state (single source of truth), the services that operate
/// on it, and the subscriber list fed after every successful mutation. All
/// four input surfaces — typed entry, slider, touch drag, recommendation
/// application — go through the mutation methods here; no surface mutates
/// category state directly.
///
/// Every mutation is a synchronous transition from one consistent snapshot
/// to the next: it either fully applies or fully rejects, and a subscriber
/// never observes a half-applied state. Sync with the remote store is
/// optimistic — the in-memory mutation always succeeds first, and the
/// network outcome lands in the snapshot's `sync_status` later.
#[must_use]
pub struct BudgetEngine {
    plan: BudgetPlan,
    allocation_service: AllocationService,
    balance_service: BalanceService,
    gesture_service: GestureService,
    recommendation_service: RecommendationService,
    validation_service: ValidationService,
    subscribers: Vec<Subscriber>,
    sync_status: SyncStatus,
    /// Categories whose local edits survived the last reconciliation
    /// against diverged server rows. Cleared by the next acknowledged push.
    sync_conflicts: Vec<Uuid>,
}

impl std::fmt::Debug for BudgetEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BudgetEngine")
            .field("categories", &self.plan.categories.len())
            .field("expenses", &self.plan.expenses.len())
            .field("revision", &self.plan.revision)
            .field("subscribers", &self.subscribers.len())
            .field("sync_status", &self.sync_status)
            .finish()
    }
}

impl BudgetEngine {
    /// Create a brand new plan around a total budget. The plan's currency
    /// is taken from the budget amount.
    pub fn create_new(total_budget: Money) -> Result<Self, EngineError> {
        if total_budget.is_negative() {
            return Err(EngineError::NegativeResult(format!(
                "{total_budget} is not a valid total budget"
            )));
        }
        Ok(Self::build(BudgetPlan::new(total_budget)))
    }

    /// Resume from an existing plan (e.g., pulled from the remote store or
    /// restored from a local cache).
    pub fn from_plan(plan: BudgetPlan) -> Self {
        Self::build(plan)
    }

    /// Restore a plan from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let plan: BudgetPlan = serde_json::from_str(json)?;
        Ok(Self::build(plan))
    }

    /// Serialize the full plan as JSON (local caching, export, debugging).
    pub fn to_json(&self) -> Result<String, EngineError> {
        serde_json::to_string_pretty(&self.plan)
            .map_err(|e| EngineError::Serialization(format!("Failed to serialize plan: {e}")))
    }

    // ── Subscriptions ───────────────────────────────────────────────

    /// Register a callback that receives the full immutable snapshot after
    /// every successful mutation (single-writer, multi-reader fan-out).
    /// Returns the handle to pass to [`BudgetEngine::unsubscribe`].
    pub fn subscribe(&mut self, callback: impl Fn(&PlanSnapshot) + 'static) -> Uuid {
        let id = Uuid::new_v4();
        self.subscribers.push(Subscriber {
            id,
            callback: Box::new(callback),
        });
        id
    }

    /// Remove a subscriber. Returns whether it existed.
    pub fn unsubscribe(&mut self, id: Uuid) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// The current state, frozen. Derived fields, warnings, and sync status
    /// are all computed in this one pass.
    #[must_use]
    pub fn snapshot(&self) -> PlanSnapshot {
        PlanSnapshot::capture(&self.plan, self.current_warnings(), self.sync_status.clone())
    }

    // ── Category lifecycle ──────────────────────────────────────────

    /// Add a category (allocated = spent = 0 unless seeded). Returns its id.
    pub fn add_category(
        &mut self,
        name: &str,
        initial_allocation: Option<Money>,
    ) -> Result<Uuid, EngineError> {
        let id = self
            .allocation_service
            .add_category(&mut self.plan, name, initial_allocation)?;
        self.commit_and_notify();
        Ok(id)
    }

    /// Physically remove a category that has no spend history. Categories
    /// with activity must be archived instead.
    pub fn remove_category(&mut self, id: Uuid) -> Result<PlanSnapshot, EngineError> {
        self.allocation_service.remove_category(&mut self.plan, id)?;
        Ok(self.commit_and_notify())
    }

    /// Soft-delete a category, keeping its audit trail.
    pub fn archive_category(&mut self, id: Uuid) -> Result<PlanSnapshot, EngineError> {
        self.allocation_service.archive_category(&mut self.plan, id)?;
        Ok(self.commit_and_notify())
    }

    pub fn rename_category(&mut self, id: Uuid, name: &str) -> Result<PlanSnapshot, EngineError> {
        self.allocation_service
            .rename_category(&mut self.plan, id, name)?;
        Ok(self.commit_and_notify())
    }

    /// Set or clear a category's near-limit alert threshold (within (0, 1]).
    pub fn set_alert_threshold(
        &mut self,
        id: Uuid,
        threshold: Option<f64>,
    ) -> Result<PlanSnapshot, EngineError> {
        self.allocation_service
            .set_alert_threshold(&mut self.plan, id, threshold)?;
        Ok(self.commit_and_notify())
    }

    pub fn set_allows_overspend(
        &mut self,
        id: Uuid,
        allows: bool,
    ) -> Result<PlanSnapshot, EngineError> {
        self.allocation_service
            .set_allows_overspend(&mut self.plan, id, allows)?;
        Ok(self.commit_and_notify())
    }

    pub fn set_category_color(
        &mut self,
        id: Uuid,
        color: Option<String>,
    ) -> Result<PlanSnapshot, EngineError> {
        self.allocation_service
            .set_category_color(&mut self.plan, id, color)?;
        Ok(self.commit_and_notify())
    }

    /// Replace the display order. `ids` must list every active category
    /// exactly once.
    pub fn reorder(&mut self, ids: &[Uuid]) -> Result<PlanSnapshot, EngineError> {
        self.allocation_service.reorder(&mut self.plan, ids)?;
        Ok(self.commit_and_notify())
    }

    // ── Allocation edits ────────────────────────────────────────────

    /// Directly set a category's allocation (typed-entry / slider path).
    /// Over-allocating the plan is allowed and surfaces as a warning on the
    /// returned snapshot, never a rejection.
    pub fn set_category_allocation(
        &mut self,
        id: Uuid,
        amount: Money,
    ) -> Result<PlanSnapshot, EngineError> {
        self.allocation_service
            .set_allocation(&mut self.plan, id, amount)?;
        Ok(self.commit_and_notify())
    }

    /// Commit a gesture's delta to a category's allocation, floored at the
    /// category's spent.
    pub fn apply_gesture_delta(
        &mut self,
        id: Uuid,
        delta: Money,
    ) -> Result<PlanSnapshot, EngineError> {
        self.allocation_service
            .apply_delta(&mut self.plan, id, delta)?;
        Ok(self.commit_and_notify())
    }

    /// Gesture sensitivity for the current budget and configured span.
    #[must_use]
    pub fn gesture_sensitivity(&self) -> Sensitivity {
        self.gesture_service
            .sensitivity(self.plan.total_budget, self.plan.settings.gesture_span_units)
    }

    /// Map a raw drag/slider offset to a bounded Money delta against a
    /// baseline captured at gesture start. Pure — commit the result with
    /// [`BudgetEngine::apply_gesture_delta`] on gesture end.
    #[must_use]
    pub fn map_gesture_offset(&self, baseline: Money, offset_units: f64) -> Money {
        self.gesture_service
            .map_offset(baseline, offset_units, self.gesture_sensitivity())
    }

    // ── Spend recording ─────────────────────────────────────────────

    /// Record real-world spend against a category, dated today. Never
    /// blocked — overspending surfaces as a warning on the snapshot.
    pub fn record_expense(&mut self, id: Uuid, amount: Money) -> Result<PlanSnapshot, EngineError> {
        let today = chrono::Utc::now().date_naive();
        self.allocation_service
            .record_expense(&mut self.plan, id, amount, today)?;
        Ok(self.commit_and_notify())
    }

    /// Record spend extracted from a scanned receipt, once the category has
    /// been resolved by the user or a suggestion service.
    pub fn record_receipt(
        &mut self,
        id: Uuid,
        capture: &ReceiptCapture,
    ) -> Result<PlanSnapshot, EngineError> {
        self.allocation_service
            .record_receipt(&mut self.plan, id, capture)?;
        Ok(self.commit_and_notify())
    }

    // ── Budget & balancing ──────────────────────────────────────────

    /// Change the total budget; optionally rebalance all allocations to the
    /// new total in the same atomic mutation. If rebalancing fails nothing
    /// changes, including the total.
    pub fn revise_total_budget(
        &mut self,
        new_total: Money,
        rebalance: bool,
    ) -> Result<PlanSnapshot, EngineError> {
        // Two-phase: validate against a working copy, then swap it in, so
        // revise+rebalance commits as one transition.
        let mut next = self.plan.clone();
        self.allocation_service
            .revise_total_budget(&mut next, new_total)?;
        if rebalance {
            self.balance_service.rebalance(&mut next)?;
        }
        self.plan = next;
        Ok(self.commit_and_notify())
    }

    /// Redistribute budget headroom across categories proportionally to
    /// their current share, preserving each category's spent floor.
    pub fn auto_balance(&mut self) -> Result<PlanSnapshot, EngineError> {
        self.balance_service.rebalance(&mut self.plan)?;
        Ok(self.commit_and_notify())
    }

    // ── Recommendations ─────────────────────────────────────────────

    /// Apply an external cost-saving recommendation as one atomic
    /// transaction. Flips the record's `is_applied`; analytical fields are
    /// never touched.
    pub fn apply_recommendation(
        &mut self,
        recommendation: &mut Recommendation,
    ) -> Result<PlanSnapshot, EngineError> {
        self.recommendation_service
            .apply(&mut self.plan, recommendation)?;
        Ok(self.commit_and_notify())
    }

    /// Dashboard optimization score (0–100) for the current state and a
    /// list of pending recommendations. Pure — no hidden state.
    #[must_use]
    pub fn optimization_score(&self, recommendations: &[Recommendation]) -> u8 {
        self.recommendation_service
            .optimization_score(&self.snapshot(), recommendations)
    }

    /// Recommendations applied so far, oldest first.
    #[must_use]
    pub fn applied_recommendations(&self) -> &[AppliedRecommendation] {
        &self.plan.applied_recommendations
    }

    // ── Settings ────────────────────────────────────────────────────

    /// Alert threshold stamped onto newly created categories. Must be
    /// within (0, 1] when set.
    pub fn set_default_alert_threshold(
        &mut self,
        threshold: Option<f64>,
    ) -> Result<PlanSnapshot, EngineError> {
        if let Some(t) = threshold {
            if !(t > 0.0 && t <= 1.0) {
                return Err(EngineError::Validation(format!(
                    "Alert threshold {t} out of range: must be within (0, 1]"
                )));
            }
        }
        self.plan.settings.default_alert_threshold = threshold;
        Ok(self.commit_and_notify())
    }

    /// Input units a full-range gesture spans. Must be positive.
    pub fn set_gesture_span(&mut self, span_units: f64) -> Result<PlanSnapshot, EngineError> {
        if !(span_units > 0.0) {
            return Err(EngineError::Validation(format!(
                "Gesture span {span_units} must be positive"
            )));
        }
        self.plan.settings.gesture_span_units = span_units;
        Ok(self.commit_and_notify())
    }

    // ── Queries ─────────────────────────────────────────────────────

    #[must_use]
    pub fn plan(&self) -> &BudgetPlan {
        &self.plan
    }

    /// A single category's stored record, archived ones included.
    #[must_use]
    pub fn category(&self, id: Uuid) -> Option<&models::category::CategoryLedger> {
        self.plan.category(id)
    }

    #[must_use]
    pub fn total_allocated(&self) -> Money {
        self.plan.total_allocated()
    }

    #[must_use]
    pub fn total_spent(&self) -> Money {
        self.plan.total_spent()
    }

    /// Expense audit trail for one category, oldest first.
    #[must_use]
    pub fn expenses_for(&self, category_id: Uuid) -> Vec<&models::expense::ExpenseRecord> {
        self.plan.expenses_for(category_id)
    }

    /// Expenses within a date range (inclusive), oldest first.
    #[must_use]
    pub fn expenses_in_range(
        &self,
        from: chrono::NaiveDate,
        to: chrono::NaiveDate,
    ) -> Vec<&models::expense::ExpenseRecord> {
        self.plan
            .expenses
            .iter()
            .filter(|e| e.date >= from && e.date <= to)
            .collect()
    }

    // ── Sync ────────────────────────────────────────────────────────

    /// Outcome of the most recent sync interaction.
    #[must_use]
    pub fn sync_status(&self) -> &SyncStatus {
        &self.sync_status
    }

    /// Push local state to the remote store. Never fails the in-memory
    /// state: network errors land in `sync_status`, conflicts reconcile
    /// last-write-wins per category, and subscribers get the resulting
    /// snapshot either way.
    pub async fn push_state(&mut self, backend: &dyn SyncBackend) -> PlanSnapshot {
        let envelope = SyncEnvelope::from_plan(&self.plan);
        match backend.push(&envelope).await {
            Ok(PushOutcome::Ack { revision }) => {
                tracing::debug!(revision, backend = backend.name(), "push acknowledged");
                self.plan.revision = revision;
                self.sync_conflicts.clear();
                self.sync_status = SyncStatus::Synced;
            }
            Ok(PushOutcome::Conflict { server }) => {
                tracing::warn!(backend = backend.name(), "push conflict — reconciling");
                self.merge_remote(&server);
            }
            Err(e) => {
                tracing::warn!(backend = backend.name(), error = %e, "push failed");
                self.sync_status = SyncStatus::Failed(e.to_string());
            }
        }
        self.notify_current()
    }

    /// Pull the server's state and reconcile it into the local plan.
    pub async fn pull_state(&mut self, backend: &dyn SyncBackend) -> PlanSnapshot {
        match backend.pull().await {
            Ok(server) => self.merge_remote(&server),
            Err(e) => {
                tracing::warn!(backend = backend.name(), error = %e, "pull failed");
                self.sync_status = SyncStatus::Failed(e.to_string());
            }
        }
        self.notify_current()
    }

    /// Reconcile an already-fetched server envelope (testable without any
    /// network). Subscribers receive the merged, re-validated snapshot.
    pub fn reconcile(&mut self, server: &SyncEnvelope) -> PlanSnapshot {
        self.merge_remote(server);
        self.notify_current()
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(plan: BudgetPlan) -> Self {
        Self {
            plan,
            allocation_service: AllocationService::new(),
            balance_service: BalanceService::new(),
            gesture_service: GestureService::new(),
            recommendation_service: RecommendationService::new(),
            validation_service: ValidationService::new(),
            subscribers: Vec::new(),
            sync_status: SyncStatus::LocalOnly,
            sync_conflicts: Vec::new(),
        }
    }

    /// Warnings for the current state: validation badges plus outstanding
    /// sync conflicts.
    fn current_warnings(&self) -> Vec<BudgetWarning> {
        let mut warnings = self.validation_service.warnings(&self.plan);
        warnings.extend(
            self.sync_conflicts
                .iter()
                .map(|id| BudgetWarning::SyncConflict { category_id: *id }),
        );
        warnings
    }

    /// Seal a successful mutation: bump the plan revision, mark the state
    /// as ahead of the server, and fan the fresh snapshot out.
    fn commit_and_notify(&mut self) -> PlanSnapshot {
        self.plan.revision += 1;
        if self.sync_status == SyncStatus::Synced {
            self.sync_status = SyncStatus::LocalOnly;
        }
        self.notify_current()
    }

    fn notify_current(&self) -> PlanSnapshot {
        let snapshot = self.snapshot();
        for subscriber in &self.subscribers {
            (subscriber.callback)(&snapshot);
        }
        snapshot
    }

    fn merge_remote(&mut self, server: &SyncEnvelope) {
        match reconcile::merge_server_state(&mut self.plan, server) {
            Ok(outcome) => {
                self.sync_conflicts = outcome.conflicted;
                self.sync_status = if self.sync_conflicts.is_empty() {
                    SyncStatus::Synced
                } else {
                    SyncStatus::Conflicted
                };
            }
            Err(e) => {
                self.sync_status = SyncStatus::Failed(e.to_string());
            }
        }
    }
}
