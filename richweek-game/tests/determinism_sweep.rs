//! Randomized sweep: identical inputs must yield identical results, and
//! every result must respect the week's conservation and clamping rules.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use richweek_game::{
    ActivityDef, HardCaps, ObligationConfig, Resources, TagSet, UpgradeDef, WeekSimulationInput,
    WeekSimulationResult, simulate_week,
};

const TAG_POOL: [&str; 3] = ["EAT", "RENT", "GYM"];

fn random_activity(rng: &mut ChaCha20Rng, index: usize) -> ActivityDef {
    let mut tags = TagSet::new();
    for tag in TAG_POOL {
        if rng.gen_bool(0.3) {
            tags.push(tag.to_string());
        }
    }
    ActivityDef {
        id: format!("A{index}"),
        time_cost: f64::from(rng.gen_range(1..=16)) * 0.5,
        rewards: Resources::new(
            f64::from(rng.gen_range(-20..=200)),
            f64::from(rng.gen_range(-5..=10)),
            f64::from(rng.gen_range(-5..=10)),
            f64::from(rng.gen_range(0..=8)),
        ),
        tags,
        cost: None,
    }
}

fn random_input(seed: u64) -> WeekSimulationInput {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let activities = (0..rng.gen_range(0..10usize))
        .map(|i| random_activity(&mut rng, i))
        .collect();
    let obligations = TAG_POOL
        .iter()
        .filter_map(|tag| {
            if !rng.gen_bool(0.5) {
                return None;
            }
            Some(ObligationConfig {
                id: format!("ob_{}", tag.to_lowercase()),
                tag: (*tag).to_string(),
                frequency_per_week: rng.gen_range(1..=3),
                penalty_type: if rng.gen_bool(0.5) {
                    "TIME_PENALTY".to_string()
                } else {
                    "MONEY_PENALTY".to_string()
                },
                penalty_value: f64::from(rng.gen_range(1..=6)),
                cap_per_category: f64::from(rng.gen_range(4..=12)),
            })
        })
        .collect();
    let upgrade_defs = vec![
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
    ];
    let planned_purchases = ["spd1", "coffee", "coffee"]
        .iter()
        .filter(|_| rng.gen_bool(0.4))
        .map(ToString::to_string)
        .collect();
    WeekSimulationInput {
        base_hours: f64::from(rng.gen_range(20..=60)),
        carry_over_penalty: f64::from(rng.gen_range(0..=10)),
        initial_bars: Resources::new(
            f64::from(rng.gen_range(0..=500)),
            f64::from(rng.gen_range(0..=100)),
            f64::from(rng.gen_range(0..=100)),
            f64::from(rng.gen_range(0..=100)),
        ),
        bar_thresholds: Resources::new(1000.0, 100.0, 100.0, 100.0),
        activities,
        obligations,
        upgrade_defs,
        planned_purchases,
        hard_caps: Some(HardCaps::from([
            ("activity".to_string(), 0.08),
            ("travel".to_string(), 0.5),
        ])),
        finance: None,
        summary: None,
        victory: None,
    }
}

fn check_invariants(input: &WeekSimulationInput, r: &WeekSimulationResult) {
    let week = &r.activities.final_state;
    assert!(
        week.spent_travel + week.spent_activity <= week.effective_hours + 1e-9,
        "time overspent for base {}",
        input.base_hours
    );
    for (bar, limit) in [
        (r.bars_after_penalties.money, input.bar_thresholds.money),
        (r.bars_after_penalties.health, input.bar_thresholds.health),
        (
            r.bars_after_penalties.happiness,
            input.bar_thresholds.happiness,
        ),
        (
            r.bars_after_penalties.education,
            input.bar_thresholds.education,
        ),
    ] {
        assert!((0.0..=limit).contains(&bar), "bar {bar} outside [0, {limit}]");
    }
    let time_cap: f64 = input
        .obligations
        .iter()
        .filter(|o| o.penalty_type.contains("TIME"))
        .map(|o| o.cap_per_category)
        .sum();
    assert!(r.next_week_carry_over_penalty >= 0.0);
    assert!(r.next_week_carry_over_penalty <= time_cap + 1e-9);
}

#[test]
fn identical_inputs_give_identical_results() {
    for seed in 0..200u64 {
        let input = random_input(seed);
        let first = simulate_week(&input).unwrap();
        let second = simulate_week(&input).unwrap();
        assert_eq!(first, second, "seed {seed} diverged");
        check_invariants(&input, &first);
    }
}

#[test]
fn serialized_results_are_stable() {
    // JSON output ordering is part of the deterministic contract.
    let input = random_input(71);
    let a = serde_json::to_string(&simulate_week(&input).unwrap()).unwrap();
    let b = serde_json::to_string(&simulate_week(&input).unwrap()).unwrap();
    assert_eq!(a, b);
}
