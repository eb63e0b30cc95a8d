use crate::models::money::Money;

/// How many minor currency units one input unit (pixel, slider step) moves.
///
/// Derived from the total budget so a full-span drag always covers a usable
/// fraction of the budget — a £5,000 wedding and a £50,000 wedding both
/// traverse their whole range in the same physical gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sensitivity {
    pub minor_units_per_input_unit: f64,
}

/// Converts continuous drag/slider offsets into bounded allocation deltas.
///
/// Stateless per call: the caller captures the baseline (the category's
/// allocation at gesture start) once, feeds offsets through `map_offset`,
/// and commits the final delta through the store on gesture end or via
/// throttled intermediate commits. The mapper itself never touches the
/// store, which keeps gesture math testable without a UI.
pub struct GestureService;

impl GestureService {
    pub fn new() -> Self {
        Self
    }

    /// Sensitivity for a given budget and gesture span. A zero or negative
    /// span, or an empty budget, yields zero sensitivity — offsets then map
    /// to no movement rather than a fault.
    #[must_use]
    pub fn sensitivity(&self, total_budget: Money, span_units: f64) -> Sensitivity {
        if span_units <= 0.0 || !total_budget.is_positive() {
            return Sensitivity {
                minor_units_per_input_unit: 0.0,
            };
        }
        Sensitivity {
            minor_units_per_input_unit: total_budget.minor_units() as f64 / span_units,
        }
    }

    /// Map an offset to a Money delta relative to the captured baseline.
    ///
    /// Pure function of (baseline, offset, sensitivity) — same inputs always
    /// produce the same delta, independent of call order or prior gesture
    /// history. Rounding is half-away-from-zero; the result is clamped so
    /// `baseline + delta` can never go negative.
    #[must_use]
    pub fn map_offset(
        &self,
        baseline: Money,
        offset_units: f64,
        sensitivity: Sensitivity,
    ) -> Money {
        let raw = (offset_units * sensitivity.minor_units_per_input_unit).round();
        // `as` saturates on out-of-range floats, so a wild offset cannot
        // wrap around.
        let delta = (raw as i64).max(-baseline.minor_units());
        Money::from_minor(delta, baseline.currency())
    }
}

impl Default for GestureService {
    fn default() -> Self {
        Self::new()
    }
}
