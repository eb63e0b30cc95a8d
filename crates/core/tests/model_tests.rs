use chrono::NaiveDate;
use uuid::Uuid;
use wedding_budget_core::errors::EngineError;
use wedding_budget_core::models::category::CategoryLedger;
use wedding_budget_core::models::expense::{ExpenseRecord, ExpenseSource, ReceiptCapture};
use wedding_budget_core::models::money::{Currency, Money};
use wedding_budget_core::models::plan::BudgetPlan;
use wedding_budget_core::models::recommendation::{Recommendation, RecommendationKind};
use wedding_budget_core::models::settings::PlanSettings;
use wedding_budget_core::models::snapshot::{BudgetWarning, PlanSnapshot, SyncStatus};

fn gbp(minor: i64) -> Money {
    Money::from_minor(minor, Currency::GBP)
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
//  Currency
// ═══════════════════════════════════════════════════════════════════

mod currency {
    use super::*;

    #[test]
    fn new_uppercases() {
        let c = Currency::new("gbp").unwrap();
        assert_eq!(c.as_str(), "GBP");
    }

    #[test]
    fn new_trims_whitespace() {
        let c = Currency::new("  usd ").unwrap();
        assert_eq!(c.as_str(), "USD");
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(Currency::new("GB").is_err());
        assert!(Currency::new("GBPX").is_err());
        assert!(Currency::new("").is_err());
    }

    #[test]
    fn rejects_non_alphabetic() {
        assert!(Currency::new("G8P").is_err());
        assert!(Currency::new("£££").is_err());
    }

    #[test]
    fn display() {
        assert_eq!(Currency::GBP.to_string(), "GBP");
    }

    #[test]
    fn serde_roundtrip_as_string() {
        let json = serde_json::to_string(&Currency::GBP).unwrap();
        assert_eq!(json, "\"GBP\"");
        let back: Currency = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Currency::GBP);
    }

    #[test]
    fn deserialize_rejects_invalid_code() {
        let result: Result<Currency, _> = serde_json::from_str("\"NOPE\"");
        assert!(result.is_err());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Money
// ═══════════════════════════════════════════════════════════════════

mod money {
    use super::*;

    // ── Construction & predicates ─────────────────────────────────

    #[test]
    fn from_minor_and_accessors() {
        let m = gbp(1099);
        assert_eq!(m.minor_units(), 1099);
        assert_eq!(m.currency(), Currency::GBP);
    }

    #[test]
    fn zero_is_zero() {
        let z = Money::zero(Currency::GBP);
        assert!(z.is_zero());
        assert!(!z.is_positive());
        assert!(!z.is_negative());
    }

    #[test]
    fn sign_predicates() {
        assert!(gbp(1).is_positive());
        assert!(gbp(-1).is_negative());
    }

    // ── Arithmetic ────────────────────────────────────────────────

    #[test]
    fn add_same_currency() {
        let sum = gbp(1000).add(gbp(500)).unwrap();
        assert_eq!(sum, gbp(1500));
    }

    #[test]
    fn add_mismatched_currency_fails() {
        let usd = Money::from_minor(100, Currency::new("USD").unwrap());
        let err = gbp(100).add(usd).unwrap_err();
        assert!(matches!(err, EngineError::CurrencyMismatch { .. }));
    }

    #[test]
    fn sub_allows_negative_result() {
        let diff = gbp(100).sub(gbp(300)).unwrap();
        assert_eq!(diff, gbp(-200));
    }

    #[test]
    fn sub_non_negative_ok_at_zero() {
        let diff = gbp(300).sub_non_negative(gbp(300)).unwrap();
        assert!(diff.is_zero());
    }

    #[test]
    fn sub_non_negative_rejects_below_zero() {
        let err = gbp(100).sub_non_negative(gbp(101)).unwrap_err();
        assert!(matches!(err, EngineError::NegativeResult(_)));
    }

    // ── percent_of ────────────────────────────────────────────────

    #[test]
    fn percent_of_whole() {
        assert!((gbp(400).percent_of(gbp(1000)) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn percent_of_zero_whole_is_zero() {
        assert_eq!(gbp(400).percent_of(gbp(0)), 0.0);
    }

    #[test]
    fn percent_of_can_exceed_one() {
        assert!(gbp(1100).percent_of(gbp(1000)) > 1.0);
    }

    // ── Ordering & display ────────────────────────────────────────

    #[test]
    fn same_currency_values_are_ordered() {
        assert!(gbp(100) < gbp(200));
        assert!(gbp(200) >= gbp(200));
    }

    #[test]
    fn cross_currency_values_are_unordered() {
        let usd = Money::from_minor(100, Currency::new("USD").unwrap());
        assert_eq!(gbp(100).partial_cmp(&usd), None);
    }

    #[test]
    fn display_two_decimals() {
        assert_eq!(gbp(1099).to_string(), "10.99 GBP");
        assert_eq!(gbp(500).to_string(), "5.00 GBP");
        assert_eq!(gbp(-550).to_string(), "-5.50 GBP");
        assert_eq!(gbp(0).to_string(), "0.00 GBP");
    }

    #[test]
    fn serde_roundtrip() {
        let m = gbp(123_456);
        let json = serde_json::to_string(&m).unwrap();
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Money::split_proportional
// ═══════════════════════════════════════════════════════════════════

mod split_proportional {
    use super::*;

    fn minor_sum(parts: &[Money]) -> i64 {
        parts.iter().map(Money::minor_units).sum()
    }

    #[test]
    fn parts_sum_to_total_exactly() {
        let parts = gbp(550_000).split_proportional(&[400_000, 250_000, 100_000]);
        assert_eq!(minor_sum(&parts), 550_000);
        assert_eq!(parts, vec![gbp(293_334), gbp(183_333), gbp(73_333)]);
    }

    #[test]
    fn even_thirds_tie_goes_to_earlier_position() {
        let parts = gbp(1000).split_proportional(&[1, 1, 1]);
        assert_eq!(parts, vec![gbp(334), gbp(333), gbp(333)]);
    }

    #[test]
    fn equal_remainders_resolved_by_position() {
        // ideal shares 7.5 / 2.5 — both remainders equal, earlier entry wins
        let parts = gbp(10).split_proportional(&[3, 1]);
        assert_eq!(parts, vec![gbp(8), gbp(2)]);
    }

    #[test]
    fn all_zero_weights_fall_back_to_equal_split() {
        let parts = gbp(1001).split_proportional(&[0, 0, 0, 0]);
        assert_eq!(minor_sum(&parts), 1001);
        assert_eq!(parts, vec![gbp(251), gbp(250), gbp(250), gbp(250)]);
    }

    #[test]
    fn negative_weights_treated_as_zero() {
        let parts = gbp(100).split_proportional(&[-5, 1]);
        assert_eq!(parts, vec![gbp(0), gbp(100)]);
    }

    #[test]
    fn single_weight_takes_everything() {
        let parts = gbp(777).split_proportional(&[42]);
        assert_eq!(parts, vec![gbp(777)]);
    }

    #[test]
    fn empty_weights_yield_empty_vec() {
        let parts = gbp(777).split_proportional(&[]);
        assert!(parts.is_empty());
    }

    #[test]
    fn zero_total_splits_to_zeros() {
        let parts = gbp(0).split_proportional(&[3, 7]);
        assert_eq!(parts, vec![gbp(0), gbp(0)]);
    }

    #[test]
    fn exactness_over_many_weight_sets() {
        let totals = [1, 7, 999, 1_000_000, 123_456_789];
        let weight_sets: [&[i64]; 4] =
            [&[1, 2, 3], &[997, 3], &[5, 5, 5, 5, 5, 5, 5], &[1, 0, 99]];
        for total in totals {
            for weights in weight_sets {
                let parts = gbp(total).split_proportional(weights);
                assert_eq!(minor_sum(&parts), total, "total {total} weights {weights:?}");
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
//  CategoryLedger
// ═══════════════════════════════════════════════════════════════════

mod category {
    use super::*;

    #[test]
    fn new_starts_empty_and_active() {
        let c = CategoryLedger::new("Venue", Currency::GBP, 0);
        assert_eq!(c.name, "Venue");
        assert!(c.allocated.is_zero());
        assert!(c.spent.is_zero());
        assert!(!c.archived);
        assert!(!c.allows_overspend);
        assert_eq!(c.revision, 0);
    }

    #[test]
    fn derive_remaining_and_ratios() {
        let mut c = CategoryLedger::new("Catering", Currency::GBP, 0);
        c.allocated = gbp(250_000);
        c.spent = gbp(200_000);
        let derived = c.derive(gbp(1_000_000));
        assert_eq!(derived.remaining, gbp(50_000));
        assert!((derived.percent_of_total - 0.25).abs() < 1e-12);
        assert!((derived.utilization - 0.8).abs() < 1e-12);
        assert!(!derived.is_over_budget);
    }

    #[test]
    fn derive_zero_allocation_has_zero_utilization() {
        let c = CategoryLedger::new("Flowers", Currency::GBP, 0);
        let derived = c.derive(gbp(1_000_000));
        assert_eq!(derived.utilization, 0.0);
        assert_eq!(derived.percent_of_total, 0.0);
    }

    #[test]
    fn derive_zero_total_budget_has_zero_percent() {
        let mut c = CategoryLedger::new("Venue", Currency::GBP, 0);
        c.allocated = gbp(400_000);
        let derived = c.derive(gbp(0));
        assert_eq!(derived.percent_of_total, 0.0);
    }

    #[test]
    fn derive_overspent_category() {
        let mut c = CategoryLedger::new("Venue", Currency::GBP, 0);
        c.allocated = gbp(100_000);
        c.spent = gbp(110_000);
        let derived = c.derive(gbp(1_000_000));
        assert!(derived.is_over_budget);
        assert_eq!(derived.remaining, gbp(-10_000));
        assert!(derived.utilization > 1.0);
    }

    #[test]
    fn derive_near_limit_at_threshold() {
        let mut c = CategoryLedger::new("Venue", Currency::GBP, 0);
        c.allocated = gbp(100_000);
        c.spent = gbp(85_000);
        c.alert_threshold = Some(0.85);
        assert!(c.derive(gbp(1_000_000)).is_near_limit);
    }

    #[test]
    fn derive_not_near_limit_below_threshold() {
        let mut c = CategoryLedger::new("Venue", Currency::GBP, 0);
        c.allocated = gbp(100_000);
        c.spent = gbp(84_999);
        c.alert_threshold = Some(0.85);
        assert!(!c.derive(gbp(1_000_000)).is_near_limit);
    }

    #[test]
    fn derive_no_threshold_never_near_limit() {
        let mut c = CategoryLedger::new("Venue", Currency::GBP, 0);
        c.allocated = gbp(100);
        c.spent = gbp(100);
        assert!(!c.derive(gbp(1_000)).is_near_limit);
    }

    #[test]
    fn derive_is_deterministic() {
        let mut c = CategoryLedger::new("Venue", Currency::GBP, 0);
        c.allocated = gbp(123_456);
        c.spent = gbp(65_432);
        c.alert_threshold = Some(0.5);
        let total = gbp(1_000_000);
        assert_eq!(c.derive(total), c.derive(total));
    }

    #[test]
    fn serde_roundtrip() {
        let mut c = CategoryLedger::new("Música", Currency::GBP, 3);
        c.allocated = gbp(42);
        c.color = Some("#aabbcc".into());
        let json = serde_json::to_string(&c).unwrap();
        let back: CategoryLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  ExpenseRecord & ReceiptCapture
// ═══════════════════════════════════════════════════════════════════

mod expense {
    use super::*;

    #[test]
    fn manual_has_no_vendor() {
        let cat = Uuid::new_v4();
        let e = ExpenseRecord::manual(cat, gbp(5_000), d(2026, 6, 20));
        assert_eq!(e.category_id, cat);
        assert_eq!(e.source, ExpenseSource::Manual);
        assert_eq!(e.vendor, None);
    }

    #[test]
    fn from_receipt_carries_vendor_and_date() {
        let cat = Uuid::new_v4();
        let capture = ReceiptCapture {
            vendor_name: "Bloom & Wild".into(),
            amount: gbp(12_050),
            date: d(2026, 5, 2),
            category_id: Some(cat),
        };
        let e = ExpenseRecord::from_receipt(cat, &capture);
        assert_eq!(e.vendor.as_deref(), Some("Bloom & Wild"));
        assert_eq!(e.amount, gbp(12_050));
        assert_eq!(e.date, d(2026, 5, 2));
        assert_eq!(e.source, ExpenseSource::Receipt);
    }

    #[test]
    fn source_display() {
        assert_eq!(ExpenseSource::Manual.to_string(), "Manual");
        assert_eq!(ExpenseSource::Receipt.to_string(), "Receipt");
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Recommendation
// ═══════════════════════════════════════════════════════════════════

mod recommendation {
    use super::*;

    #[test]
    fn kind_serializes_kebab_case() {
        let json = serde_json::to_string(&RecommendationKind::VendorAlternative).unwrap();
        assert_eq!(json, "\"vendor-alternative\"");
        let json = serde_json::to_string(&RecommendationKind::CategoryReallocation).unwrap();
        assert_eq!(json, "\"category-reallocation\"");
        let json = serde_json::to_string(&RecommendationKind::DiyOpportunity).unwrap();
        assert_eq!(json, "\"diy-opportunity\"");
    }

    #[test]
    fn kind_display_matches_wire_form() {
        for kind in [
            RecommendationKind::VendorAlternative,
            RecommendationKind::CategoryReallocation,
            RecommendationKind::TimingOptimization,
            RecommendationKind::FeatureSubstitution,
            RecommendationKind::BulkBooking,
            RecommendationKind::SeasonalDiscount,
            RecommendationKind::DiyOpportunity,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }

    #[test]
    fn is_applied_defaults_to_false() {
        let json = format!(
            r#"{{"id":"{}","kind":"bulk-booking","potential_savings":{{"minor_units":5000,"currency":"GBP"}},"target_category_ids":[],"confidence":60}}"#,
            Uuid::new_v4()
        );
        let rec: Recommendation = serde_json::from_str(&json).unwrap();
        assert!(!rec.is_applied);
        assert_eq!(rec.confidence, 60);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  BudgetPlan & PlanSettings
// ═══════════════════════════════════════════════════════════════════

mod plan {
    use super::*;

    #[test]
    fn default_is_empty_gbp() {
        let plan = BudgetPlan::default();
        assert_eq!(plan.currency, Currency::GBP);
        assert!(plan.total_budget.is_zero());
        assert!(plan.categories.is_empty());
        assert_eq!(plan.revision, 0);
    }

    #[test]
    fn settings_default() {
        let settings = PlanSettings::default();
        assert_eq!(settings.default_alert_threshold, Some(0.85));
        assert!(settings.gesture_span_units > 0.0);
    }

    #[test]
    fn totals_sum_active_categories() {
        let mut plan = BudgetPlan::new(gbp(1_000_000));
        let mut a = CategoryLedger::new("Venue", Currency::GBP, 0);
        a.allocated = gbp(400_000);
        a.spent = gbp(100_000);
        let mut b = CategoryLedger::new("Catering", Currency::GBP, 1);
        b.allocated = gbp(300_000);
        b.spent = gbp(50_000);
        plan.categories.push(a);
        plan.categories.push(b);
        assert_eq!(plan.total_allocated(), gbp(700_000));
        assert_eq!(plan.total_spent(), gbp(150_000));
    }

    #[test]
    fn archived_categories_drop_out_of_totals() {
        let mut plan = BudgetPlan::new(gbp(1_000_000));
        let mut a = CategoryLedger::new("Venue", Currency::GBP, 0);
        a.allocated = gbp(400_000);
        let mut b = CategoryLedger::new("Old", Currency::GBP, 1);
        b.allocated = gbp(300_000);
        b.archived = true;
        plan.categories.push(a);
        plan.categories.push(b);
        assert_eq!(plan.total_allocated(), gbp(400_000));
    }

    #[test]
    fn serde_roundtrip() {
        let mut plan = BudgetPlan::new(gbp(1_000_000));
        let mut c = CategoryLedger::new("Venue", Currency::GBP, 0);
        c.allocated = gbp(400_000);
        plan.categories.push(c);
        plan.expenses.push(ExpenseRecord::manual(
            plan.categories[0].id,
            gbp(1_000),
            d(2026, 4, 1),
        ));
        let json = serde_json::to_string(&plan).unwrap();
        let back: BudgetPlan = serde_json::from_str(&json).unwrap();
        assert_eq!(back, plan);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  PlanSnapshot
// ═══════════════════════════════════════════════════════════════════

mod snapshot {
    use super::*;

    fn sample_plan() -> BudgetPlan {
        let mut plan = BudgetPlan::new(gbp(1_000_000));
        let mut a = CategoryLedger::new("Venue", Currency::GBP, 0);
        a.allocated = gbp(400_000);
        a.spent = gbp(150_000);
        let mut b = CategoryLedger::new("Catering", Currency::GBP, 1);
        b.allocated = gbp(250_000);
        plan.categories.push(a);
        plan.categories.push(b);
        plan
    }

    #[test]
    fn capture_computes_totals_and_unallocated() {
        let plan = sample_plan();
        let snap = PlanSnapshot::capture(&plan, Vec::new(), SyncStatus::LocalOnly);
        assert_eq!(snap.total_allocated, gbp(650_000));
        assert_eq!(snap.total_spent, gbp(150_000));
        assert_eq!(snap.unallocated, gbp(350_000));
        assert_eq!(snap.categories.len(), 2);
    }

    #[test]
    fn capture_unallocated_goes_negative_when_over_planned() {
        let mut plan = sample_plan();
        plan.categories[0].allocated = gbp(900_000);
        let snap = PlanSnapshot::capture(&plan, Vec::new(), SyncStatus::LocalOnly);
        assert_eq!(snap.unallocated, gbp(-150_000));
    }

    #[test]
    fn capture_derives_in_same_pass() {
        let plan = sample_plan();
        let snap = PlanSnapshot::capture(&plan, Vec::new(), SyncStatus::LocalOnly);
        let venue = snap.category(plan.categories[0].id).unwrap();
        assert_eq!(venue.derived.remaining, gbp(250_000));
        assert!((venue.derived.percent_of_total - 0.4).abs() < 1e-12);
    }

    #[test]
    fn capture_excludes_archived_categories() {
        let mut plan = sample_plan();
        plan.categories[1].archived = true;
        let snap = PlanSnapshot::capture(&plan, Vec::new(), SyncStatus::LocalOnly);
        assert_eq!(snap.categories.len(), 1);
    }

    #[test]
    fn warnings_pass_through() {
        let plan = sample_plan();
        let warnings = vec![BudgetWarning::OverAllocated { excess: gbp(1) }];
        let snap = PlanSnapshot::capture(&plan, warnings.clone(), SyncStatus::LocalOnly);
        assert_eq!(snap.warnings, warnings);
    }

    #[test]
    fn serde_roundtrip() {
        let plan = sample_plan();
        let snap = PlanSnapshot::capture(&plan, Vec::new(), SyncStatus::Failed("offline".into()));
        let json = serde_json::to_string(&snap).unwrap();
        let back: PlanSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }
}
