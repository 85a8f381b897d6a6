//! Plan preview: the committing pipeline's arithmetic without the commit.
//!
//! Nothing here allocates time or moves money; the forecast recomputes what
//! a tentative plan would do and flags the problems a player should see
//! before locking the week in.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::activity::ActivityDef;
use crate::constants::{
    EPSILON, WARN_INVALID_ROUTE, WARN_MISSING_TAG_PREFIX, WARN_OVER_TIME,
    WARN_PENALTIES_PROJECTED, WARN_TRAVEL_NOT_POSSIBLE,
};
use crate::finance::FinanceState;
use crate::numbers::round2;
use crate::obligations::{ObligationConfig, evaluate_obligations};
use crate::resources::{ResourceKind, Resources};
use crate::travel::{DistanceMatrix, TravelConfig, TravelError, compute_travel};
use crate::week::WeekState;

/// Tentative route to be priced alongside the activity plan.
#[derive(Debug, Clone, Copy)]
pub struct TravelPlan<'a> {
    pub locations: &'a [String],
    pub matrix: &'a DistanceMatrix,
    pub config: &'a TravelConfig,
}

/// Explicit multiplier overrides; any unset field falls back to the
/// `upgrade_multipliers` map, then to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MultiplierOverrides {
    pub activity_reward: Option<f64>,
    pub activity_time_efficiency: Option<f64>,
    pub travel_time_efficiency: Option<f64>,
}

/// Read-only finance data for the investment preview.
#[derive(Debug, Clone, Copy)]
pub struct FinancePreview<'a> {
    pub state: &'a FinanceState,
    pub current_week: u32,
    pub include_investments: bool,
}

/// Everything the preview looks at; borrows only.
#[derive(Debug, Clone)]
pub struct ForecastInput<'a> {
    pub week: &'a WeekState,
    pub tentative_activities: &'a [ActivityDef],
    /// Required obligation tags; each absent one yields a `MISSING_` warning.
    pub obligation_tags: &'a [String],
    /// When non-empty, penalties are projected as if the plan fully executes.
    pub obligation_configs: &'a [ObligationConfig],
    pub travel: Option<TravelPlan<'a>>,
    pub multipliers: MultiplierOverrides,
    /// Derived multipliers keyed `reward` / `activityTimeEfficiency` /
    /// `travel`, typically from [`crate::upgrades::compute_multipliers`].
    pub upgrade_multipliers: Option<&'a BTreeMap<String, f64>>,
    pub finance_preview: Option<FinancePreview<'a>>,
}

impl<'a> ForecastInput<'a> {
    /// A minimal preview of just the activities.
    #[must_use]
    pub const fn new(week: &'a WeekState, tentative_activities: &'a [ActivityDef]) -> Self {
        Self {
            week,
            tentative_activities,
            obligation_tags: &[],
            obligation_configs: &[],
            travel: None,
            multipliers: MultiplierOverrides {
                activity_reward: None,
                activity_time_efficiency: None,
                travel_time_efficiency: None,
            },
            upgrade_multipliers: None,
            finance_preview: None,
        }
    }
}

/// Time the plan would consume, split by lane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeUsage {
    pub activity_time: f64,
    pub travel_time: f64,
    pub total: f64,
}

/// Penalty projection assuming every tentative activity succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPenalties {
    pub total_applied: f64,
    pub types: usize,
    pub missed: Vec<String>,
}

/// Preview output; deterministic for identical inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub net_deltas: Resources,
    /// Sum of declared activity `cost` fields.
    pub expected_cost: f64,
    pub time_usage: TimeUsage,
    pub warnings: Vec<String>,
    pub travel_ok: bool,
    pub projected_penalties: Option<ProjectedPenalties>,
    pub projected_investment_values: Option<BTreeMap<String, f64>>,
}

fn derived(map: Option<&BTreeMap<String, f64>>, key: &str) -> f64 {
    map.and_then(|m| m.get(key)).copied().unwrap_or(0.0)
}

/// Simulate a tentative plan without committing any state.
///
/// Mirrors the arithmetic of [`crate::activity::execute_plan`] and
/// [`crate::travel::compute_travel`], but nothing is allocated: overruns
/// surface as warnings instead of skipped entries.
#[must_use]
pub fn simulate_plan(input: &ForecastInput<'_>) -> ForecastResult {
    let mut warnings = Vec::new();
    let reward_mult = input
        .multipliers
        .activity_reward
        .unwrap_or_else(|| derived(input.upgrade_multipliers, "reward"))
        .max(0.0);
    let time_eff = input
        .multipliers
        .activity_time_efficiency
        .unwrap_or_else(|| derived(input.upgrade_multipliers, "activityTimeEfficiency"))
        .max(0.0);
    let travel_eff = input
        .multipliers
        .travel_time_efficiency
        .unwrap_or_else(|| derived(input.upgrade_multipliers, "travel"))
        .max(0.0);

    let mut net = Resources::default();
    let mut activity_time = 0.0;
    let mut expected_cost = 0.0;
    for act in input.tentative_activities {
        activity_time += round2(act.time_cost * (1.0 - time_eff));
        for kind in ResourceKind::ALL {
            net.add(kind, round2(act.rewards.get(kind) * (1.0 + reward_mult)));
        }
        expected_cost += act.cost.unwrap_or(0.0);
    }
    let activity_time = round2(activity_time);

    let mut travel_ok = true;
    let mut travel_time = 0.0;
    if let Some(plan) = &input.travel {
        let mut cfg = plan.config.clone();
        cfg.travel_time_efficiency = travel_eff;
        match compute_travel(plan.locations, plan.matrix, &cfg, input.week.remaining()) {
            Ok(r) => travel_time = r.total_travel_time,
            Err(err) => {
                warnings.push(
                    match err {
                        TravelError::NotEnoughTime => WARN_TRAVEL_NOT_POSSIBLE,
                        TravelError::InvalidRoute => WARN_INVALID_ROUTE,
                    }
                    .to_string(),
                );
                travel_ok = false;
            }
        }
    }
    let total = round2(activity_time + travel_time);

    let projected_penalties = if input.obligation_configs.is_empty() {
        None
    } else {
        // Pretend the whole plan executed cleanly; misses here are the ones
        // no amount of good luck can avoid.
        let pseudo_log: Vec<_> = input
            .tentative_activities
            .iter()
            .enumerate()
            .map(|(i, act)| crate::activity::ActivityLogEntry {
                id: act.id.clone(),
                start_order: crate::numbers::usize_to_u32(i),
                time_cost: act.time_cost,
                rewards: act.rewards,
                status: crate::activity::ActivityStatus::Ok,
                tags: act.tags.clone(),
            })
            .collect();
        let eval = evaluate_obligations(&pseudo_log, input.obligation_configs);
        if !eval.missed.is_empty() {
            warnings.push(WARN_PENALTIES_PROJECTED.to_string());
        }
        Some(ProjectedPenalties {
            total_applied: eval.report.total_applied,
            types: eval.report.types,
            missed: eval.missed,
        })
    };

    let projected_investment_values = input
        .finance_preview
        .as_ref()
        .filter(|p| p.include_investments)
        .map(|p| p.state.evaluate_investments(p.current_week));

    if total > input.week.effective_hours + EPSILON {
        warnings.push(WARN_OVER_TIME.to_string());
    }

    for tag in input.obligation_tags {
        let present = input
            .tentative_activities
            .iter()
            .any(|a| a.tags.iter().any(|t| t == tag));
        if !present {
            warnings.push(format!("{WARN_MISSING_TAG_PREFIX}{tag}"));
        }
    }

    ForecastResult {
        net_deltas: net,
        expected_cost: round2(expected_cost),
        time_usage: TimeUsage {
            activity_time,
            travel_time,
            total,
        },
        warnings,
        travel_ok,
        projected_penalties,
        projected_investment_values,
    }
}
