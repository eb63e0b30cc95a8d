use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::money::Money;

/// Kind of cost-saving recommendation produced by the external analysis
/// service. Fixed enumeration — the engine applies recommendations, it
/// never generates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationKind {
    /// A cheaper vendor offering the same service
    VendorAlternative,
    /// Move budget from an over-funded category to an under-funded one
    CategoryReallocation,
    /// Booking earlier/later for a better rate
    TimingOptimization,
    /// Swapping a feature for a cheaper equivalent
    FeatureSubstitution,
    /// Bundling bookings for a volume discount
    BulkBooking,
    /// Off-season pricing
    SeasonalDiscount,
    /// Doing it yourself instead of hiring out
    DiyOpportunity,
}

impl std::fmt::Display for RecommendationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RecommendationKind::VendorAlternative => "vendor-alternative",
            RecommendationKind::CategoryReallocation => "category-reallocation",
            RecommendationKind::TimingOptimization => "timing-optimization",
            RecommendationKind::FeatureSubstitution => "feature-substitution",
            RecommendationKind::BulkBooking => "bulk-booking",
            RecommendationKind::SeasonalDiscount => "seasonal-discount",
            RecommendationKind::DiyOpportunity => "diy-opportunity",
        };
        write!(f, "{label}")
    }
}

/// An externally generated cost-saving suggestion.
///
/// Analytical fields are read-only to the engine — applying one only flips
/// `is_applied` and records which ledger entries changed as a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Unique identifier
    pub id: Uuid,

    /// What kind of saving this is
    pub kind: RecommendationKind,

    /// How much the producer estimates can be saved
    pub potential_savings: Money,

    /// Affected categories. Ordered: for `CategoryReallocation` the first
    /// id is the over-funded source and the second the target receiving the
    /// funds; other kinds treat every listed id as a reduction target.
    pub target_category_ids: Vec<Uuid>,

    /// Producer's confidence in the suggestion, 0–100.
    pub confidence: u8,

    /// Whether this recommendation has been applied to the plan.
    #[serde(default)]
    pub is_applied: bool,
}

/// One allocation change made while applying a recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationChange {
    pub category_id: Uuid,
    pub before: Money,
    pub after: Money,
}

/// Record of a recommendation that was applied against the plan: which
/// ledger entries changed and how much was actually freed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedRecommendation {
    pub recommendation_id: Uuid,
    pub kind: RecommendationKind,

    /// Every allocation the application touched, with before/after values.
    pub changes: Vec<AllocationChange>,

    /// Money freed into the unallocated pool. Zero for reallocations, which
    /// move money between categories without freeing any.
    pub realized_savings: Money,
}
