use serde::{Deserialize, Serialize};

/// User-configurable settings carried inside the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSettings {
    /// Alert threshold stamped onto newly created categories, within (0, 1].
    /// `None` means new categories start without a near-limit badge.
    pub default_alert_threshold: Option<f64>,

    /// How many input units (pixels on touch surfaces, steps on sliders) a
    /// full-range gesture spans. Together with the total budget this fixes
    /// the gesture sensitivity: a full-span drag always covers the whole
    /// budget regardless of wedding size.
    pub gesture_span_units: f64,
}

impl Default for PlanSettings {
    fn default() -> Self {
        Self {
            default_alert_threshold: Some(0.85),
            gesture_span_units: 320.0,
        }
    }
}
