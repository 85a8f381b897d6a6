//! Caller-owned session threading bars, finance, and upgrades across weeks.
//!
//! One value, no statics, no interior mutability: two sessions fed the same
//! plans produce identical histories.

use serde::{Deserialize, Serialize};

use crate::activity::ActivityDef;
use crate::constants::DEFAULT_WEEKLY_BUDGET;
use crate::finance::FinanceState;
use crate::obligations::ObligationConfig;
use crate::resources::Resources;
use crate::snapshot::GameSnapshot;
use crate::upgrades::{HardCaps, UpgradeDef};
use crate::weekly::{
    FinanceInput, SimulationError, SummaryOptions, VictoryOptions, WeekSimulationInput,
    WeekSimulationResult, simulate_week,
};

/// Finance switches for a single planned week.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanFinance {
    pub weekly_penalty_rate: f64,
    #[serde(default)]
    pub evaluate_investments: bool,
}

/// What the player intends to do this week.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeekPlan {
    #[serde(default)]
    pub activities: Vec<ActivityDef>,
    #[serde(default)]
    pub obligations: Vec<ObligationConfig>,
    #[serde(default)]
    pub upgrade_defs: Vec<UpgradeDef>,
    #[serde(default)]
    pub planned_purchases: Vec<String>,
    #[serde(default)]
    pub hard_caps: Option<HardCaps>,
    /// Runs the weekly finance cycle when set.
    #[serde(default)]
    pub finance: Option<PlanFinance>,
    #[serde(default)]
    pub summary: Option<SummaryOptions>,
    /// Evaluate victory against the session thresholds this week.
    #[serde(default)]
    pub check_victory: bool,
}

/// One advanced week: the index simulated plus its full result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekOutcome {
    pub week_index: u32,
    pub result: WeekSimulationResult,
}

/// The cross-week state a caller owns instead of global managers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    /// Zero-based index of the next week to simulate.
    pub week_index: u32,
    pub bars: Resources,
    pub thresholds: Resources,
    /// Time penalty carried into the next week.
    pub carry_over_penalty: f64,
    pub base_hours: f64,
    #[serde(default)]
    pub finance: Option<FinanceState>,
    #[serde(default)]
    pub owned_upgrades: Vec<String>,
}

impl GameSession {
    /// A fresh session on the default full-calendar-week budget.
    #[must_use]
    pub const fn new(bars: Resources, thresholds: Resources) -> Self {
        Self {
            week_index: 0,
            bars,
            thresholds,
            carry_over_penalty: 0.0,
            base_hours: DEFAULT_WEEKLY_BUDGET,
            finance: None,
            owned_upgrades: Vec::new(),
        }
    }

    /// Simulate the next week and adopt its results.
    ///
    /// On success the session's bars carry the week's `final_money`, the
    /// carry-over penalty and finance state are replaced, successful
    /// purchases join the owned set, and the week index advances.
    ///
    /// # Errors
    ///
    /// Propagates [`SimulationError`]; the session is unchanged on error.
    pub fn advance_week(&mut self, plan: &WeekPlan) -> Result<WeekOutcome, SimulationError> {
        let input = WeekSimulationInput {
            base_hours: self.base_hours,
            carry_over_penalty: self.carry_over_penalty,
            initial_bars: self.bars,
            bar_thresholds: self.thresholds,
            activities: plan.activities.clone(),
            obligations: plan.obligations.clone(),
            upgrade_defs: plan.upgrade_defs.clone(),
            planned_purchases: plan.planned_purchases.clone(),
            hard_caps: plan.hard_caps.clone(),
            finance: plan.finance.map(|f| FinanceInput {
                state: self.finance.clone(),
                weekly_penalty_rate: f.weekly_penalty_rate,
                current_week: self.week_index,
                evaluate_investments: f.evaluate_investments,
            }),
            summary: plan.summary,
            victory: plan.check_victory.then(|| VictoryOptions {
                enable: true,
                current_week: self.week_index,
                thresholds_override: None,
            }),
        };
        let result = simulate_week(&input)?;

        let simulated = self.week_index;
        self.bars = Resources {
            money: result.final_money,
            ..result.bars_after_penalties
        };
        self.carry_over_penalty = result.next_week_carry_over_penalty;
        if let Some(state) = &result.finance_state {
            self.finance = Some(state.clone());
        }
        for purchase in result.purchases.iter().filter(|p| p.ok) {
            self.owned_upgrades.push(purchase.id.clone());
        }
        self.week_index += 1;

        Ok(WeekOutcome {
            week_index: simulated,
            result,
        })
    }

    /// Capture the persistable part of the session.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            finance: self.finance.clone(),
            owned_upgrades: if self.owned_upgrades.is_empty() {
                None
            } else {
                Some(self.owned_upgrades.clone())
            },
            ..GameSnapshot::new(self.week_index, self.bars)
        }
    }

    /// Adopt a snapshot's bars, finance, upgrades, and week index.
    ///
    /// Thresholds and the weekly budget are session configuration and stay
    /// as they are; the carry-over penalty resets with the restored week.
    pub fn restore(&mut self, snapshot: &GameSnapshot) {
        self.week_index = snapshot.week;
        self.bars = snapshot.bars;
        self.finance = snapshot.finance.clone();
        self.owned_upgrades = snapshot.owned_upgrades.clone().unwrap_or_default();
        self.carry_over_penalty = 0.0;
    }
}
