use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::scenarios::Scenario;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

pub struct ScenarioRunner {
    verbose: bool,
}

impl ScenarioRunner {
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn run_scenario(
        &self,
        scenario: &Scenario,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::new();

        for &seed in seeds {
            if self.verbose {
                println!(
                    "🧪 Testing scenario: {} (seed: {})",
                    scenario.name.bright_white(),
                    seed
                );
            }
            results.push(self.run_single_scenario(scenario, seed, iterations));
        }

        results
    }

    fn run_single_scenario(
        &self,
        scenario: &Scenario,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let (successes, failures, performance_data) =
            self.run_iterations(scenario, seed, iterations);

        let average_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.name.to_string(),
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            average_duration,
            performance_data,
        }
    }

    /// Each iteration runs the scenario twice on the same derived seed; a
    /// digest mismatch means the engine leaked nondeterminism.
    fn run_iterations(
        &self,
        scenario: &Scenario,
        seed: u64,
        iterations: usize,
    ) -> (usize, Vec<String>, Vec<Duration>) {
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));
            log::debug!(
                "scenario {} iteration {} seed {}",
                scenario.name,
                i + 1,
                iteration_seed
            );

            let failure = match (scenario.run)(iteration_seed) {
                Ok(first) => match (scenario.run)(iteration_seed) {
                    Ok(second) if second == first => None,
                    Ok(_) => Some("replay produced a different result".to_string()),
                    Err(e) => Some(format!("replay failed: {e:#}")),
                },
                Err(e) => Some(format!("{e:#}")),
            };

            if let Some(err) = failure {
                failures.push(format!(
                    "Iteration {} (seed {iteration_seed}): {err}",
                    i + 1
                ));
                if self.verbose {
                    println!("  ❌ Iteration {}/{} failed: {}", i + 1, iterations, err.red());
                }
            } else {
                successes += 1;
                let duration = start_time.elapsed();
                performance_data.push(duration);
                if self.verbose {
                    println!("  ✅ Iteration {}/{} passed ({duration:?})", i + 1, iterations);
                }
            }
        }

        (successes, failures, performance_data)
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations
            .iter()
            .map(std::time::Duration::as_millis)
            .collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis_vec = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis_vec
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    fn passing(_seed: u64) -> anyhow::Result<String> {
        Ok("ok".to_string())
    }

    fn failing(seed: u64) -> anyhow::Result<String> {
        bail!("seed {seed} always fails")
    }

    fn scenario(run: fn(u64) -> anyhow::Result<String>) -> Scenario {
        Scenario {
            name: "local",
            description: "test double",
            run,
        }
    }

    #[test]
    fn passing_scenario_counts_every_iteration() {
        let runner = ScenarioRunner::new(false);
        let results = runner.run_scenario(&scenario(passing), &[42], 5);
        assert_eq!(results.len(), 1);
        assert!(results[0].passed);
        assert_eq!(results[0].successful_iterations, 5);
        assert_eq!(results[0].performance_data.len(), 5);
    }

    #[test]
    fn failing_scenario_records_each_seed_used() {
        let runner = ScenarioRunner::new(false);
        let results = runner.run_scenario(&scenario(failing), &[100], 3);
        assert!(!results[0].passed);
        assert_eq!(results[0].failures.len(), 3);
        assert!(results[0].failures[0].contains("seed 100"));
        assert!(results[0].failures[2].contains("seed 102"));
    }

    #[test]
    fn one_result_per_base_seed() {
        let runner = ScenarioRunner::new(false);
        let results = runner.run_scenario(&scenario(passing), &[1, 2, 3], 1);
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn seed_derivation_wraps_at_the_boundary() {
        let runner = ScenarioRunner::new(false);
        let results = runner.run_scenario(&scenario(passing), &[u64::MAX], 2);
        assert!(results[0].passed);
    }

    #[test]
    fn result_serializes_durations_as_millis() {
        let result = ScenarioResult {
            scenario_name: "smoke".to_string(),
            passed: true,
            iterations_run: 1,
            successful_iterations: 1,
            failures: Vec::new(),
            average_duration: Duration::from_millis(12),
            performance_data: vec![Duration::from_millis(12)],
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"average_duration\":12"));
        let back: ScenarioResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.average_duration, Duration::from_millis(12));
    }
}
