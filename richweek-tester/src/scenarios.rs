//! Named end-to-end scenarios over the engine.
//!
//! Every scenario is a pure function of its seed: it builds a plan (random
//! where that adds coverage, fixed where the fixture is the point), drives
//! the engine, checks its expectations with `ensure!`, and returns a JSON
//! digest of the outcome. The runner replays each iteration and compares
//! digests, so any hidden nondeterminism fails the scenario.

use anyhow::{Context, Result, ensure};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use richweek_game::{
    ActivityDef, ActivityStatus, FinanceState, ForecastInput, GameSession, HardCaps,
    InvestmentRequest, LoanRequest, ObligationConfig, RepaymentConfig, Resources, TagSet,
    UpgradeDef, WeekPlan, WeekSimulationInput, init_week, simulate_plan, simulate_week,
};

/// One registered scenario.
pub struct Scenario {
    pub name: &'static str,
    pub description: &'static str,
    pub run: fn(u64) -> Result<String>,
}

pub const CATALOG: &[Scenario] = &[
    Scenario {
        name: "smoke",
        description: "random plan walkthrough checking time accounting and bar clamps",
        run: smoke,
    },
    Scenario {
        name: "integration",
        description: "fixed full-pipeline fixture with obligations, purchases, and caps",
        run: integration,
    },
    Scenario {
        name: "debt-spiral",
        description: "unaffordable loan accumulates overdue penalties without paying down",
        run: debt_spiral,
    },
    Scenario {
        name: "investor",
        description: "investment opens, compounds weekly, and withdraws at value",
        run: investor,
    },
    Scenario {
        name: "campaign",
        description: "session advances week by week until victory",
        run: campaign,
    },
    Scenario {
        name: "forecast-audit",
        description: "forecast warnings and totals match the committed run of the same plan",
        run: forecast_audit,
    },
];

#[must_use]
pub fn get(name: &str) -> Option<&'static Scenario> {
    CATALOG.iter().find(|s| s.name == name)
}

#[must_use]
pub fn list() -> Vec<(&'static str, &'static str)> {
    CATALOG.iter().map(|s| (s.name, s.description)).collect()
}

fn activity(id: &str, time_cost: f64, rewards: Resources, tags: &[&str]) -> ActivityDef {
    ActivityDef {
        id: id.to_string(),
        time_cost,
        rewards,
        tags: tags.iter().map(ToString::to_string).collect::<TagSet>(),
        cost: None,
    }
}

fn money(amount: f64) -> Resources {
    Resources {
        money: amount,
        ..Resources::default()
    }
}

fn digest<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).context("digest serialization failed")
}

/// Random activities against the weekly budget; no obligations, no upgrades.
fn smoke(seed: u64) -> Result<String> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let carry = f64::from(rng.gen_range(0..=6));
    let activities = (0..rng.gen_range(1..=6usize))
        .map(|i| {
            activity(
                &format!("A{i}"),
                f64::from(rng.gen_range(1..=12)) * 0.5,
                money(f64::from(rng.gen_range(0..=100))),
                &[],
            )
        })
        .collect();
    let input = WeekSimulationInput {
        base_hours: 40.0,
        carry_over_penalty: carry,
        initial_bars: Resources::new(f64::from(rng.gen_range(0..=200)), 50.0, 50.0, 50.0),
        bar_thresholds: Resources::new(1000.0, 100.0, 100.0, 100.0),
        activities,
        obligations: Vec::new(),
        upgrade_defs: Vec::new(),
        planned_purchases: Vec::new(),
        hard_caps: None,
        finance: None,
        summary: None,
        victory: None,
    };
    let r = simulate_week(&input)?;

    let week = &r.activities.final_state;
    ensure!(
        (week.effective_hours - (40.0 - carry).max(4.0)).abs() < 1e-9,
        "effective hours {} for carry {carry}",
        week.effective_hours
    );
    ensure!(
        week.spent_travel + week.spent_activity <= week.effective_hours + 1e-9,
        "time overspent: {} + {} > {}",
        week.spent_travel,
        week.spent_activity,
        week.effective_hours
    );
    let logged: f64 = r.activities.log.iter().map(|e| e.time_cost).sum();
    ensure!(
        (logged - r.activities.total_time_spent).abs() < 1e-9,
        "log time {logged} != total {}",
        r.activities.total_time_spent
    );
    for (bar, limit) in [
        (r.bars_after_penalties.money, 1000.0),
        (r.bars_after_penalties.health, 100.0),
        (r.bars_after_penalties.happiness, 100.0),
        (r.bars_after_penalties.education, 100.0),
    ] {
        ensure!((0.0..=limit).contains(&bar), "bar {bar} outside [0, {limit}]");
    }
    digest(&r)
}

/// The canonical fixture: three activities, two obligations, three
/// purchases against hard caps. Every number is pinned.
fn integration(_seed: u64) -> Result<String> {
    let input = WeekSimulationInput {
        base_hours: 40.0,
        carry_over_penalty: 0.0,
        initial_bars: Resources::new(100.0, 10.0, 5.0, 0.0),
        bar_thresholds: Resources::new(1000.0, 100.0, 100.0, 100.0),
        activities: vec![
            activity("JOB1", 4.0, money(200.0), &["RENT"]),
            activity(
                "MEAL1",
                1.0,
                Resources {
                    health: 3.0,
                    ..Resources::default()
                },
                &["EAT"],
            ),
            activity(
                "MEAL2",
                1.0,
                Resources {
                    health: 3.0,
                    ..Resources::default()
                },
                &["EAT"],
            ),
        ],
        obligations: vec![
            ObligationConfig {
                id: "eat".to_string(),
                tag: "EAT".to_string(),
                frequency_per_week: 2,
                penalty_type: "TIME_PENALTY".to_string(),
                penalty_value: 2.0,
                cap_per_category: 4.0,
            },
            ObligationConfig {
                id: "rent".to_string(),
                tag: "RENT".to_string(),
                frequency_per_week: 1,
                penalty_type: "MONEY_PENALTY".to_string(),
                penalty_value: 100.0,
                cap_per_category: 200.0,
            },
        ],
        upgrade_defs: vec![
            UpgradeDef {
                id: "spd1".to_string(),
                category: "travel".to_string(),
                cost: 150.0,
                bonus_percent: 0.1,
                unique: true,
            },
            UpgradeDef {
                id: "coffee".to_string(),
                category: "activity".to_string(),
                cost: 50.0,
                bonus_percent: 0.05,
                unique: false,
            },
        ],
        planned_purchases: vec![
            "spd1".to_string(),
            "coffee".to_string(),
            "coffee".to_string(),
        ],
        hard_caps: Some(HardCaps::from([
            ("activity".to_string(), 0.08),
            ("travel".to_string(), 0.5),
        ])),
        finance: None,
        summary: None,
        victory: None,
    };
    let r = simulate_week(&input)?;

    ensure!((r.activities.total_time_spent - 6.0).abs() < 1e-9);
    ensure!(r.bars_after_activities == Resources::new(300.0, 16.0, 5.0, 0.0));
    ensure!(r.obligations_missed.is_empty(), "missed {:?}", r.obligations_missed);
    ensure!(r.penalties.money_penalty_applied.abs() < 1e-9);
    ensure!(r.next_week_carry_over_penalty.abs() < 1e-9);
    ensure!(r.purchases.len() == 3 && r.purchases.iter().all(|p| p.ok));
    ensure!((r.purchases[2].remaining_money - 50.0).abs() < 1e-9);
    ensure!((r.multipliers["activity"] - 0.08).abs() < 1e-9);
    ensure!((r.raw_multipliers["activity"] - 0.10).abs() < 1e-9);
    ensure!((r.multipliers["travel"] - 0.1).abs() < 1e-9);
    ensure!((r.final_money - 300.0).abs() < 1e-9);
    digest(&r)
}

/// A loan the wallet can never service: nothing is paid down, penalty
/// interest piles up, the loan stays overdue.
fn debt_spiral(seed: u64) -> Result<String> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut state = FinanceState::new(0.0);
    state.issue_loan(&LoanRequest {
        amount: 500.0,
        weekly_rate: 0.05,
        term_weeks: 10,
        start_week: 0,
    })?;
    // The borrowed cash is already spent elsewhere.
    state.money = f64::from(rng.gen_range(5..20));
    let wallet_before = state.money;

    let config = RepaymentConfig { penalty_rate: 7.5 };
    for week in 1..=6 {
        let cycle = state.weekly_repayment(week, &config);
        ensure!(cycle.paid_total.abs() < 1e-9, "week {week} paid {}", cycle.paid_total);
        ensure!((cycle.penalties_applied - 7.5).abs() < 1e-9);
    }

    let loan = &state.loans[0];
    ensure!(loan.overdue);
    ensure!((loan.principal_remaining - 500.0).abs() < 1e-9);
    ensure!((loan.penalty_applied - 45.0).abs() < 1e-9);
    ensure!((state.money - wallet_before).abs() < 1e-9, "wallet moved");
    digest(&state)
}

/// Open, compound, withdraw; early withdrawal must be rejected.
fn investor(seed: u64) -> Result<String> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let opening = f64::from(rng.gen_range(400..800));
    let amount = f64::from(rng.gen_range(100..300));
    let mut state = FinanceState::new(opening);
    let investment = state.open_investment(&InvestmentRequest {
        amount,
        growth_rate: 0.1,
        start_week: 1,
    })?;

    ensure!(
        state.withdraw_investment(&investment.id, 1).is_err(),
        "same-week withdrawal must be rejected"
    );

    let mut last = 0.0;
    for week in 1..=4 {
        let values = state.evaluate_investments(week);
        let value = values[&investment.id];
        ensure!(value + 1e-9 >= last, "value shrank at week {week}");
        last = value;
    }

    let withdrawal = state.withdraw_investment(&investment.id, 5)?;
    ensure!((withdrawal.value - amount * 1.1_f64.powi(4)).abs() < 1e-6);
    ensure!((state.money - (opening - amount + withdrawal.value)).abs() < 1e-9);
    ensure!(state.investments.is_empty());
    digest(&state)
}

/// Advance a session on a sustainable weekly plan until every bar crosses
/// its threshold.
fn campaign(seed: u64) -> Result<String> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let wage = f64::from(rng.gen_range(280..=340));
    let mut session = GameSession::new(
        Resources::new(50.0, 40.0, 50.0, 0.0),
        Resources::new(2000.0, 100.0, 100.0, 100.0),
    );
    let plan = WeekPlan {
        activities: vec![
            activity("job:shift", 40.0, money(wage), &[]),
            activity(
                "meal:prep",
                3.0,
                Resources {
                    health: 6.0,
                    ..Resources::default()
                },
                &["EAT"],
            ),
            activity(
                "study:night",
                6.0,
                Resources {
                    education: 8.0,
                    ..Resources::default()
                },
                &[],
            ),
            activity(
                "fun:walk",
                2.0,
                Resources {
                    happiness: 5.0,
                    ..Resources::default()
                },
                &[],
            ),
        ],
        obligations: vec![ObligationConfig {
            id: "eat".to_string(),
            tag: "EAT".to_string(),
            frequency_per_week: 1,
            penalty_type: "TIME_PENALTY".to_string(),
            penalty_value: 6.0,
            cap_per_category: 12.0,
        }],
        check_victory: true,
        ..WeekPlan::default()
    };

    let mut last = None;
    for _ in 0..30 {
        let outcome = session.advance_week(&plan)?;
        let won = outcome.result.victory.as_ref().is_some_and(|v| v.is_victory);
        last = Some(outcome);
        if won {
            break;
        }
    }
    let last = last.context("no weeks simulated")?;
    let victory = last.result.victory.as_ref().context("victory never evaluated")?;
    ensure!(victory.is_victory, "no victory within 30 weeks");
    ensure!(victory.week_of_completion == Some(last.week_index));
    ensure!(session.bars.money >= 2000.0 - 1e-9);
    digest(&last)
}

/// The forecast and the committed run must agree on the same plan: same
/// time totals, same net money, and warnings only where the committed run
/// actually misses.
fn forecast_audit(seed: u64) -> Result<String> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let covers_eat = rng.gen_bool(0.5);
    let mut activities: Vec<ActivityDef> = (0..3)
        .map(|i| {
            activity(
                &format!("A{i}"),
                f64::from(rng.gen_range(2..=8)),
                money(f64::from(rng.gen_range(0..=100))),
                &[],
            )
        })
        .collect();
    if covers_eat {
        activities[1].tags.push("EAT".to_string());
    }
    let eat = ObligationConfig {
        id: "eat".to_string(),
        tag: "EAT".to_string(),
        frequency_per_week: 1,
        penalty_type: "TIME_PENALTY".to_string(),
        penalty_value: 4.0,
        cap_per_category: 8.0,
    };

    let week = init_week(40.0, 0.0)?;
    let tags = vec!["EAT".to_string()];
    let configs = vec![eat.clone()];
    let mut preview = ForecastInput::new(&week, &activities);
    preview.obligation_tags = &tags;
    preview.obligation_configs = &configs;
    let forecast = simulate_plan(&preview);

    let input = WeekSimulationInput {
        base_hours: 40.0,
        carry_over_penalty: 0.0,
        initial_bars: Resources::new(100.0, 50.0, 50.0, 0.0),
        bar_thresholds: Resources::new(10_000.0, 100.0, 100.0, 100.0),
        activities: activities.clone(),
        obligations: vec![eat],
        upgrade_defs: Vec::new(),
        planned_purchases: Vec::new(),
        hard_caps: None,
        finance: None,
        summary: None,
        victory: None,
    };
    let r = simulate_week(&input)?;

    // The plan fits, so the preview's optimism is justified.
    ensure!(r.activities.log.iter().all(|e| e.status == ActivityStatus::Ok));
    ensure!(!forecast.warnings.iter().any(|w| w == "OVER_TIME"));
    ensure!(forecast.travel_ok);
    ensure!(
        (forecast.time_usage.total - r.activities.total_time_spent).abs() < 1e-9,
        "forecast time {} vs committed {}",
        forecast.time_usage.total,
        r.activities.total_time_spent
    );
    ensure!(
        (forecast.net_deltas.money - r.activities.resource_deltas.money).abs() < 1e-9,
        "forecast money {} vs committed {}",
        forecast.net_deltas.money,
        r.activities.resource_deltas.money
    );

    let missing_warned = forecast.warnings.iter().any(|w| w == "MISSING_EAT");
    let missed = r.obligations_missed.contains(&"eat".to_string());
    ensure!(
        missing_warned == !covers_eat && missed == !covers_eat,
        "warning/outcome mismatch: warned {missing_warned}, missed {missed}"
    );
    let projected = forecast
        .projected_penalties
        .as_ref()
        .context("penalties were not projected")?;
    ensure!(projected.missed == r.obligations_missed);

    digest(&(forecast, r))
}
