//! The weekly pipeline: one call from time budget to victory check.
//!
//! Every step runs in a fixed order over values threaded explicitly through
//! the chain. Recoverable failures (a purchase the wallet cannot cover) are
//! recorded in the result; only caller programming errors abort.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::activity::{ActivityDef, ExecuteOptions, PlanExecution, execute_plan};
use crate::constants::{PENALTY_TOKEN_MONEY, PENALTY_TOKEN_TIME};
use crate::finance::{FinanceState, RepaymentConfig};
use crate::obligations::{ObligationConfig, ObligationEvaluation, evaluate_obligations};
use crate::resources::Resources;
use crate::status::{CompletionFlags, StatusError, apply_deltas};
use crate::summary::{UpgradeApplied, WeekSummary, WeekSummaryInput, build_week_summary};
use crate::upgrades::{HardCaps, UpgradeDef, UpgradeState, compute_multipliers};
use crate::victory::{VictoryResult, evaluate_victory};
use crate::week::{WeekError, WeekState, init_week};

/// Finance step configuration for one simulated week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceInput {
    /// Carried-over finance state; an empty wallet is created when absent.
    #[serde(default)]
    pub state: Option<FinanceState>,
    /// Penalty interest per overdue loan cycle.
    pub weekly_penalty_rate: f64,
    pub current_week: u32,
    /// Also report the current value of every open investment.
    #[serde(default)]
    pub evaluate_investments: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryOptions {
    pub enable: bool,
    #[serde(default)]
    pub max_entries: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VictoryOptions {
    pub enable: bool,
    pub current_week: u32,
    #[serde(default)]
    pub thresholds_override: Option<Resources>,
}

/// Full input contract for [`simulate_week`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekSimulationInput {
    pub base_hours: f64,
    #[serde(default)]
    pub carry_over_penalty: f64,
    pub initial_bars: Resources,
    pub bar_thresholds: Resources,
    #[serde(default)]
    pub activities: Vec<ActivityDef>,
    #[serde(default)]
    pub obligations: Vec<ObligationConfig>,
    #[serde(default)]
    pub upgrade_defs: Vec<UpgradeDef>,
    /// Upgrade ids attempted in order after activities and penalties.
    #[serde(default)]
    pub planned_purchases: Vec<String>,
    #[serde(default)]
    pub hard_caps: Option<HardCaps>,
    #[serde(default)]
    pub finance: Option<FinanceInput>,
    #[serde(default)]
    pub summary: Option<SummaryOptions>,
    #[serde(default)]
    pub victory: Option<VictoryOptions>,
}

/// Obligation penalties routed to their consequences.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PenaltyProjection {
    /// Hours deducted from next week's budget.
    pub time_penalty_next_week: f64,
    /// Money debited from the bars this week.
    pub money_penalty_applied: f64,
}

/// One attempted purchase, success or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOutcome {
    pub id: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    pub remaining_money: f64,
}

/// Everything one simulated week produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekSimulationResult {
    pub week: WeekState,
    pub activities: PlanExecution,
    pub bars_after_activities: Resources,
    pub bars_after_penalties: Resources,
    pub completion_flags: CompletionFlags,
    pub obligations_missed: Vec<String>,
    pub penalties: PenaltyProjection,
    pub purchases: Vec<PurchaseOutcome>,
    /// Capped per-category multipliers from the final owned set.
    pub multipliers: BTreeMap<String, f64>,
    pub raw_multipliers: BTreeMap<String, f64>,
    pub next_week_carry_over_penalty: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finance_state: Option<FinanceState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finance_repayment_paid_total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finance_penalties_applied: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investment_values: Option<BTreeMap<String, f64>>,
    /// The single authoritative money value: post-repayment finance money
    /// when finance ran, else post-penalty bars money.
    pub final_money: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<WeekSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub victory: Option<VictoryResult>,
}

/// Aborts from the two caller-programming-error conditions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Week(#[from] WeekError),
    #[error(transparent)]
    Status(#[from] StatusError),
}

fn aggregate_penalties(eval: &ObligationEvaluation) -> PenaltyProjection {
    let mut projection = PenaltyProjection::default();
    for p in &eval.penalties {
        if p.penalty_type.contains(PENALTY_TOKEN_TIME) {
            projection.time_penalty_next_week += p.applied_value;
        }
        if p.penalty_type.contains(PENALTY_TOKEN_MONEY) {
            projection.money_penalty_applied += p.applied_value;
        }
    }
    projection
}

/// Run one complete week.
///
/// Order: init week, execute activities, apply deltas to bars, evaluate
/// obligations, debit any money penalty, attempt purchases, compute
/// multipliers, run the optional finance cycle, then the optional summary
/// and victory checks. A failed purchase is recorded and processing moves
/// to the next id; the pipeline never aborts on it.
///
/// # Errors
///
/// [`SimulationError::Week`] for a non-positive weekly budget and
/// [`SimulationError::Status`] for a non-positive bar threshold.
pub fn simulate_week(
    input: &WeekSimulationInput,
) -> Result<WeekSimulationResult, SimulationError> {
    let week = init_week(input.base_hours, input.carry_over_penalty)?;

    let exec = execute_plan(&input.activities, week, &ExecuteOptions::default());

    let after_activities = apply_deltas(
        &input.initial_bars,
        &exec.resource_deltas,
        &input.bar_thresholds,
    )?;

    let obligations_eval = evaluate_obligations(&exec.log, &input.obligations);
    let penalties = aggregate_penalties(&obligations_eval);

    let after_penalties = if penalties.money_penalty_applied > 0.0 {
        let debit = Resources {
            money: -penalties.money_penalty_applied,
            ..Resources::default()
        };
        apply_deltas(&after_activities.bars, &debit, &input.bar_thresholds)?
    } else {
        after_activities.clone()
    };

    let mut upgrade_state = UpgradeState::new(after_penalties.bars.money);
    let mut purchases = Vec::with_capacity(input.planned_purchases.len());
    for id in &input.planned_purchases {
        match upgrade_state.purchase(&input.upgrade_defs, id) {
            Ok(_) => purchases.push(PurchaseOutcome {
                id: id.clone(),
                ok: true,
                error_code: None,
                remaining_money: upgrade_state.money,
            }),
            Err(err) => purchases.push(PurchaseOutcome {
                id: id.clone(),
                ok: false,
                error_code: Some(err.code().to_string()),
                remaining_money: upgrade_state.money,
            }),
        }
    }
    let multipliers = compute_multipliers(
        &upgrade_state.owned,
        &input.upgrade_defs,
        input.hard_caps.as_ref(),
    );

    let mut finance_state = None;
    let mut finance_repayment_paid_total = None;
    let mut finance_penalties_applied = None;
    let mut investment_values = None;
    let mut final_money = after_penalties.bars.money;
    if let Some(fin) = &input.finance {
        let mut state = fin.state.clone().unwrap_or_default();
        // Bars money is authoritative going into the repayment cycle.
        state.money = after_penalties.bars.money;
        let repay = state.weekly_repayment(
            fin.current_week,
            &RepaymentConfig {
                penalty_rate: fin.weekly_penalty_rate,
            },
        );
        finance_repayment_paid_total = Some(repay.paid_total);
        finance_penalties_applied = Some(repay.penalties_applied);
        final_money = state.money;
        if fin.evaluate_investments {
            investment_values = Some(state.evaluate_investments(fin.current_week));
        }
        finance_state = Some(state);
    }

    let summary = input
        .summary
        .as_ref()
        .filter(|opts| opts.enable)
        .map(|opts| {
            let upgrades_applied: Vec<UpgradeApplied> = purchases
                .iter()
                .filter(|p| p.ok)
                .filter_map(|p| input.upgrade_defs.iter().find(|d| d.id == p.id))
                .map(|def| UpgradeApplied {
                    id: def.id.clone(),
                    cost: def.cost,
                    benefit: None,
                })
                .collect();
            build_week_summary(&WeekSummaryInput {
                execution_log: &exec.log,
                penalties: &obligations_eval.penalties,
                upgrades_applied: &upgrades_applied,
                max_entries: opts.max_entries,
            })
        });

    let victory = input
        .victory
        .as_ref()
        .filter(|opts| opts.enable)
        .map(|opts| {
            let thresholds = opts
                .thresholds_override
                .as_ref()
                .unwrap_or(&input.bar_thresholds);
            let bars_for_victory = Resources {
                money: final_money,
                ..after_penalties.bars
            };
            evaluate_victory(&bars_for_victory, thresholds, opts.current_week)
        });

    Ok(WeekSimulationResult {
        week,
        bars_after_activities: after_activities.bars,
        bars_after_penalties: after_penalties.bars,
        completion_flags: after_penalties.completion_flags,
        obligations_missed: obligations_eval.missed,
        next_week_carry_over_penalty: penalties.time_penalty_next_week,
        penalties,
        purchases,
        multipliers: multipliers.multipliers,
        raw_multipliers: multipliers.raw,
        activities: exec,
        finance_state,
        finance_repayment_paid_total,
        finance_penalties_applied,
        investment_values,
        final_money,
        summary,
        victory,
    })
}
