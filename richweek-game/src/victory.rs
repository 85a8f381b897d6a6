//! Victory evaluation: every bar at or above its threshold.

use serde::{Deserialize, Serialize};

use crate::resources::{ResourceKind, Resources};

/// Outcome of a victory check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VictoryResult {
    pub is_victory: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_of_completion: Option<u32>,
    /// Copy of the bars at the moment the thresholds were met.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_snapshot: Option<Resources>,
}

/// Check the bars against the victory thresholds.
///
/// Pure and idempotent; the snapshot is a copy, so later bar changes never
/// rewrite a recorded win.
#[must_use]
pub fn evaluate_victory(bars: &Resources, thresholds: &Resources, current_week: u32) -> VictoryResult {
    let all_met = ResourceKind::ALL
        .iter()
        .all(|&kind| bars.get(kind) >= thresholds.get(kind));
    if all_met {
        VictoryResult {
            is_victory: true,
            week_of_completion: Some(current_week),
            completion_snapshot: Some(*bars),
        }
    } else {
        VictoryResult {
            is_victory: false,
            week_of_completion: None,
            completion_snapshot: None,
        }
    }
}
