//! Minimal JSON save/load interchange for cross-week state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::SNAPSHOT_VERSION;
use crate::finance::FinanceState;
use crate::resources::Resources;

/// The persisted record: everything a caller carries between weeks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub version: u32,
    /// Zero-based week index the session will simulate next.
    pub week: u32,
    pub bars: Resources,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finance: Option<FinanceState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owned_upgrades: Option<Vec<String>>,
}

impl GameSnapshot {
    /// A snapshot at the current schema version.
    #[must_use]
    pub const fn new(week: u32, bars: Resources) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            week,
            bars,
            finance: None,
            owned_upgrades: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Malformed JSON or a field of the wrong shape.
    #[error("snapshot does not parse: {0}")]
    Parse(#[from] serde_json::Error),
    /// Structurally valid JSON that is not a snapshot.
    #[error("invalid snapshot: missing or non-numeric version")]
    Invalid,
}

/// Serialize a snapshot to its JSON wire form.
///
/// # Errors
///
/// Returns [`SnapshotError::Parse`] if serialization fails.
pub fn export_snapshot(snapshot: &GameSnapshot) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string(snapshot)?)
}

/// Parse a snapshot, insisting on a numeric `version`.
///
/// # Errors
///
/// [`SnapshotError::Invalid`] when `version` is absent or not a JSON
/// number; [`SnapshotError::Parse`] for malformed JSON or wrong shapes.
pub fn import_snapshot(json: &str) -> Result<GameSnapshot, SnapshotError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if !value.get("version").is_some_and(serde_json::Value::is_number) {
        return Err(SnapshotError::Invalid);
    }
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finance::LoanRequest;

    #[test]
    fn snapshot_round_trips_through_json() {
        let mut finance = FinanceState::new(250.0);
        finance
            .issue_loan(&LoanRequest {
                amount: 100.0,
                weekly_rate: 0.05,
                term_weeks: 4,
                start_week: 2,
            })
            .unwrap();
        let snapshot = GameSnapshot {
            finance: Some(finance),
            owned_upgrades: Some(vec!["spd1".to_string(), "coffee".to_string()]),
            ..GameSnapshot::new(3, Resources::new(350.0, 40.0, 30.0, 20.0))
        };
        let json = export_snapshot(&snapshot).unwrap();
        let restored = import_snapshot(&json).unwrap();
        assert_eq!(restored, snapshot);
        assert_eq!(restored.version, SNAPSHOT_VERSION);
    }

    #[test]
    fn minimal_snapshot_omits_optional_blocks() {
        let snapshot = GameSnapshot::new(0, Resources::default());
        let json = export_snapshot(&snapshot).unwrap();
        assert!(!json.contains("finance"));
        assert!(!json.contains("owned_upgrades"));
        let restored = import_snapshot(&json).unwrap();
        assert!(restored.finance.is_none());
        assert!(restored.owned_upgrades.is_none());
    }

    #[test]
    fn missing_version_is_invalid() {
        let err = import_snapshot(r#"{"week":1,"bars":{}}"#).unwrap_err();
        assert!(matches!(err, SnapshotError::Invalid));
    }

    #[test]
    fn non_numeric_version_is_invalid() {
        let err = import_snapshot(r#"{"version":"1","week":1,"bars":{}}"#).unwrap_err();
        assert!(matches!(err, SnapshotError::Invalid));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = import_snapshot("{not json").unwrap_err();
        assert!(matches!(err, SnapshotError::Parse(_)));
    }

    #[test]
    fn wrong_shape_is_a_parse_error() {
        let err = import_snapshot(r#"{"version":1,"week":"three","bars":{}}"#).unwrap_err();
        assert!(matches!(err, SnapshotError::Parse(_)));
    }
}
