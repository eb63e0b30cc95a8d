// ═══════════════════════════════════════════════════════════════════
// Error Tests — EngineError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use uuid::Uuid;
use wedding_budget_core::errors::EngineError;
use wedding_budget_core::models::money::{Currency, Money};
use wedding_budget_core::models::plan::BudgetPlan;

fn gbp(minor: i64) -> Money {
    Money::from_minor(minor, Currency::GBP)
}

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn unknown_category() {
        let id = Uuid::new_v4();
        let err = EngineError::UnknownCategory(id);
        assert_eq!(err.to_string(), format!("Unknown category: {id}"));
    }

    #[test]
    fn negative_result() {
        let err = EngineError::NegativeResult("1.00 GBP - 2.00 GBP is below zero".into());
        assert_eq!(
            err.to_string(),
            "Amount would go negative: 1.00 GBP - 2.00 GBP is below zero"
        );
    }

    #[test]
    fn category_has_activity() {
        let id = Uuid::new_v4();
        let err = EngineError::CategoryHasActivity(id);
        assert_eq!(
            err.to_string(),
            format!("Category {id} has recorded spend — archive it instead of removing")
        );
    }

    #[test]
    fn cannot_balance() {
        let err = EngineError::CannotBalance {
            committed: gbp(70_000),
            total: gbp(50_000),
        };
        assert_eq!(
            err.to_string(),
            "Cannot balance: committed spend 700.00 GBP exceeds total budget 500.00 GBP"
        );
    }

    #[test]
    fn already_applied() {
        let id = Uuid::new_v4();
        let err = EngineError::AlreadyApplied(id);
        assert_eq!(
            err.to_string(),
            format!("Recommendation {id} has already been applied")
        );
    }

    #[test]
    fn insufficient_allocation() {
        let id = Uuid::new_v4();
        let err = EngineError::InsufficientAllocation {
            category: id,
            allocated: gbp(10_000),
            spent: gbp(9_000),
        };
        assert_eq!(
            err.to_string(),
            format!(
                "Applying would push category {id} below its spent floor (90.00 GBP spent, 100.00 GBP allocated)"
            )
        );
    }

    #[test]
    fn currency_mismatch() {
        let err = EngineError::CurrencyMismatch {
            left: Currency::GBP,
            right: Currency::new("USD").unwrap(),
        };
        assert_eq!(err.to_string(), "Currency mismatch: GBP vs USD");
    }

    #[test]
    fn validation() {
        let err = EngineError::Validation("Category name must not be empty".into());
        assert_eq!(
            err.to_string(),
            "Validation failed: Category name must not be empty"
        );
    }

    #[test]
    fn validation_empty_message() {
        let err = EngineError::Validation(String::new());
        assert_eq!(err.to_string(), "Validation failed: ");
    }

    #[test]
    fn serialization() {
        let err = EngineError::Serialization("bad json".into());
        assert_eq!(err.to_string(), "Serialization error: bad json");
    }

    #[test]
    fn api() {
        let err = EngineError::Api {
            endpoint: "POST /budget".into(),
            message: "ack without a revision".into(),
        };
        assert_eq!(
            err.to_string(),
            "Sync API error (POST /budget): ack without a revision"
        );
    }

    #[test]
    fn network() {
        let err = EngineError::Network("connection refused".into());
        assert_eq!(err.to_string(), "Network error: connection refused");
    }
}

// ── From impls ──────────────────────────────────────────────────────

mod conversions {
    use super::*;

    #[test]
    fn serde_json_error_becomes_serialization() {
        let parse_err = serde_json::from_str::<BudgetPlan>("not json").unwrap_err();
        let err: EngineError = parse_err.into();
        assert!(matches!(err, EngineError::Serialization(_)));
    }

    #[test]
    fn serde_json_error_keeps_message() {
        let parse_err = serde_json::from_str::<BudgetPlan>("{").unwrap_err();
        let message = parse_err.to_string();
        let err: EngineError = parse_err.into();
        assert!(err.to_string().contains(&message));
    }
}

// ── Error-state behavior ────────────────────────────────────────────

mod behavior {
    use super::*;
    use wedding_budget_core::BudgetEngine;

    #[test]
    fn failed_mutation_leaves_engine_untouched() {
        let mut engine = BudgetEngine::create_new(gbp(1_000_000)).unwrap();
        let id = engine.add_category("Venue", Some(gbp(100_000))).unwrap();
        let before = engine.snapshot();

        let err = engine
            .set_category_allocation(Uuid::new_v4(), gbp(1))
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownCategory(_)));

        let after = engine.snapshot();
        assert_eq!(after.revision, before.revision);
        assert_eq!(after.category(id).unwrap().allocated, gbp(100_000));
    }

    #[test]
    fn create_new_rejects_negative_budget() {
        let err = BudgetEngine::create_new(gbp(-1)).unwrap_err();
        assert!(matches!(err, EngineError::NegativeResult(_)));
    }
}
