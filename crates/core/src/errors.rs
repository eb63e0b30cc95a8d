use thiserror::Error;
use uuid::Uuid;

use crate::models::money::{Currency, Money};

/// Unified error type for the entire wedding-budget-core library.
/// Every fallible public function returns `Result<T, EngineError>`.
///
/// Errors are returned synchronously from the mutation that triggered them
/// and always leave the plan untouched. Warnings (over-allocated, overspent,
/// near-limit) are not errors — they ride on the successful post-mutation
/// snapshot instead.
#[derive(Debug, Error)]
pub enum EngineError {
    // ── Ledger / Mutation ───────────────────────────────────────────
    #[error("Unknown category: {0}")]
    UnknownCategory(Uuid),

    #[error("Amount would go negative: {0}")]
    NegativeResult(String),

    #[error("Category {0} has recorded spend — archive it instead of removing")]
    CategoryHasActivity(Uuid),

    #[error("Cannot balance: committed spend {committed} exceeds total budget {total}")]
    CannotBalance { committed: Money, total: Money },

    #[error("Recommendation {0} has already been applied")]
    AlreadyApplied(Uuid),

    #[error("Applying would push category {category} below its spent floor ({spent} spent, {allocated} allocated)")]
    InsufficientAllocation {
        category: Uuid,
        allocated: Money,
        spent: Money,
    },

    #[error("Currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: Currency, right: Currency },

    #[error("Validation failed: {0}")]
    Validation(String),

    // ── Serialization ───────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    // ── Sync / Network ──────────────────────────────────────────────
    #[error("Sync API error ({endpoint}): {message}")]
    Api { endpoint: String, message: String },

    #[error("Network error: {0}")]
    Network(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for EngineError {
    fn from(e: reqwest::Error) -> Self {
        // Sanitize error message: strip query parameters from URLs so auth
        // tokens never end up in error strings. reqwest errors often contain
        // full URLs.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        EngineError::Network(sanitized)
    }
}
