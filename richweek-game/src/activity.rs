//! Plan execution: time allocation, reward clamping, and the activity log.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::numbers::{round2, usize_to_u32};
use crate::resources::{ResourceKind, Resources};
use crate::week::{WeekState, allocate_activity};

/// Obligation tags carried by an activity; most carry zero or one.
pub type TagSet = SmallVec<[String; 4]>;

/// A schedulable activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityDef {
    pub id: String,
    /// Hours required; must be positive.
    pub time_cost: f64,
    #[serde(default)]
    pub rewards: Resources,
    #[serde(default)]
    pub tags: TagSet,
    /// Monetary price of scheduling the activity; only the forecast reads it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

/// Outcome status for a single log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityStatus {
    Ok,
    Skipped,
    Truncated,
    Adjusted,
}

impl ActivityStatus {
    /// True when the entry's tags count toward obligations.
    #[must_use]
    pub const fn counts_for_obligations(self) -> bool {
        matches!(self, Self::Ok | Self::Adjusted)
    }
}

/// One executed (or skipped) plan slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub id: String,
    pub start_order: u32,
    /// Applied hours; zero when skipped.
    pub time_cost: f64,
    /// Applied rewards after clamping and multipliers.
    #[serde(default)]
    pub rewards: Resources,
    pub status: ActivityStatus,
    #[serde(default)]
    pub tags: TagSet,
}

/// Execution tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecuteOptions {
    /// Clamp negative reward components to zero, marking the entry ADJUSTED.
    pub disallow_negative: bool,
    /// Additive reward boost (0.08 = +8%), applied after clamping.
    pub reward_multiplier: f64,
    /// Cost reduction (0.08 = 8% faster), applied before the remaining check.
    pub time_efficiency: f64,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            disallow_negative: true,
            reward_multiplier: 0.0,
            time_efficiency: 0.0,
        }
    }
}

/// Everything a finished plan reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanExecution {
    pub log: Vec<ActivityLogEntry>,
    /// Aggregate deltas ready for the status bars.
    pub resource_deltas: Resources,
    pub final_state: WeekState,
    pub total_time_spent: f64,
}

/// Run a locked plan against the week's remaining hours.
///
/// Activities execute in order. The first one that does not fit is logged
/// `SKIPPED` and the rest of the plan is abandoned; there is no partial
/// execution past that point. Infallible and deterministic.
#[must_use]
pub fn execute_plan(plan: &[ActivityDef], week: WeekState, opts: &ExecuteOptions) -> PlanExecution {
    let mut log = Vec::with_capacity(plan.len());
    let mut deltas = Resources::default();
    let mut total_time = 0.0;
    let mut state = week;
    let time_eff = opts.time_efficiency.max(0.0);
    let reward_mult = opts.reward_multiplier.max(0.0);

    for (i, act) in plan.iter().enumerate() {
        let start_order = usize_to_u32(i);
        let adjusted_cost = round2(act.time_cost * (1.0 - time_eff));
        if adjusted_cost > state.remaining() {
            log.push(skipped(act, start_order));
            break;
        }
        // Remaining-hours check cannot catch a cost driven to zero by 100%
        // time efficiency; the allocator still rejects it.
        let Ok(next) = allocate_activity(&state, adjusted_cost) else {
            log.push(skipped(act, start_order));
            break;
        };
        state = next;

        let mut applied = Resources::default();
        let mut status = ActivityStatus::Ok;
        for kind in ResourceKind::ALL {
            let raw = act.rewards.get(kind);
            let value = if opts.disallow_negative && raw < 0.0 {
                status = ActivityStatus::Adjusted;
                0.0
            } else {
                raw
            };
            applied.set(kind, value);
            deltas.add(kind, value);
        }

        total_time += adjusted_cost;

        if reward_mult > 0.0 {
            for kind in ResourceKind::ALL {
                let base = applied.get(kind);
                let boosted = round2(base * (1.0 + reward_mult));
                applied.set(kind, boosted);
                // base already aggregated; add only the boost on top
                deltas.add(kind, boosted - base);
            }
        }

        log.push(ActivityLogEntry {
            id: act.id.clone(),
            start_order,
            time_cost: adjusted_cost,
            rewards: applied,
            status,
            tags: act.tags.clone(),
        });
    }

    PlanExecution {
        log,
        resource_deltas: deltas,
        final_state: state,
        total_time_spent: total_time,
    }
}

fn skipped(act: &ActivityDef, start_order: u32) -> ActivityLogEntry {
    ActivityLogEntry {
        id: act.id.clone(),
        start_order,
        time_cost: 0.0,
        rewards: Resources::default(),
        status: ActivityStatus::Skipped,
        tags: act.tags.clone(),
    }
}
