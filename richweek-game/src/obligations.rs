//! Recurring obligations: tag-frequency checks and capped penalty stacking.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::activity::ActivityLogEntry;

/// A recurring requirement satisfied by tagged activities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObligationConfig {
    pub id: String,
    /// Tag searched for in the executed activity log.
    pub tag: String,
    /// Required occurrences per week; 0 disables the obligation.
    pub frequency_per_week: u32,
    /// Grouping key for penalty stacking and caps.
    pub penalty_type: String,
    /// Value contributed to the bucket when missed.
    pub penalty_value: f64,
    /// Ceiling for the bucket's total applied value.
    pub cap_per_category: f64,
}

/// Aggregated penalty for one type bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyEntry {
    #[serde(rename = "type")]
    pub penalty_type: String,
    /// Raw sum of contributing penalty values.
    pub value: f64,
    /// Sum after the bucket cap.
    pub applied_value: f64,
}

/// Headline numbers for reports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObligationReport {
    pub missed_count: usize,
    /// Number of distinct penalty buckets.
    pub types: usize,
    pub total_applied: f64,
}

/// Full evaluation output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObligationEvaluation {
    /// Ids of missed obligations, in config order.
    pub missed: Vec<String>,
    /// Penalty buckets, sorted by type for determinism.
    pub penalties: Vec<PenaltyEntry>,
    pub report: ObligationReport,
}

/// Check the executed log against the obligation configs.
///
/// Only OK and ADJUSTED entries count toward tag frequencies. A missed
/// config adds its penalty value to a per-type bucket whose cap is the
/// minimum `cap_per_category` among the missed configs of that type.
#[must_use]
pub fn evaluate_obligations(
    log: &[ActivityLogEntry],
    configs: &[ObligationConfig],
) -> ObligationEvaluation {
    let mut tag_counts: HashMap<&str, u32> = HashMap::new();
    for entry in log {
        if entry.status.counts_for_obligations() {
            for tag in &entry.tags {
                *tag_counts.entry(tag.as_str()).or_insert(0) += 1;
            }
        }
    }

    struct Bucket {
        total: f64,
        cap: f64,
    }

    let mut missed = Vec::new();
    let mut buckets: BTreeMap<&str, Bucket> = BTreeMap::new();
    for config in configs {
        if config.frequency_per_week == 0 {
            continue;
        }
        let count = tag_counts.get(config.tag.as_str()).copied().unwrap_or(0);
        if count < config.frequency_per_week {
            missed.push(config.id.clone());
            buckets
                .entry(config.penalty_type.as_str())
                .and_modify(|b| {
                    // Tightest cap among the missed configs of this type wins.
                    b.cap = b.cap.min(config.cap_per_category);
                    b.total += config.penalty_value;
                })
                .or_insert(Bucket {
                    total: config.penalty_value,
                    cap: config.cap_per_category,
                });
        }
    }

    let penalties: Vec<PenaltyEntry> = buckets
        .iter()
        .map(|(penalty_type, bucket)| PenaltyEntry {
            penalty_type: (*penalty_type).to_string(),
            value: bucket.total,
            applied_value: bucket.total.min(bucket.cap),
        })
        .collect();

    let total_applied = penalties.iter().map(|p| p.applied_value).sum();
    let report = ObligationReport {
        missed_count: missed.len(),
        types: penalties.len(),
        total_applied,
    };

    ObligationEvaluation {
        missed,
        penalties,
        report,
    }
}
