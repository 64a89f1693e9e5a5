// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The run report: one JSON document per `drover run` invocation, rendered
//! to JSON, HTML, and a stdout summary by `drover-engine`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepOutcome {
    pub message: String,
}

/// One dispatched step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    pub step: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<StepOutcome>,
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u64,
    pub results: Vec<StepResult>,
    pub summary: Summary,
}

impl Report {
    pub fn from_results(timestamp: DateTime<Utc>, duration_ms: u64, results: Vec<StepResult>) -> Self {
        let passed = results.iter().filter(|r| r.success).count();
        let total = results.len();
        Self {
            timestamp,
            duration_ms,
            summary: Summary { total, passed, failed: total - passed },
            results,
        }
    }

    pub fn exit_code(&self) -> i32 {
        if self.summary.failed > 0 {
            1
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn from_results_computes_summary() {
        let results = vec![
            StepResult {
                step: "I echo \"hi\"".to_string(),
                success: true,
                data: None,
                error: None,
                timestamp: ts(),
                duration_ms: 5,
            },
            StepResult {
                step: "I do something unknown".to_string(),
                success: false,
                data: None,
                error: Some(StepOutcome { message: "UnmatchedStep".to_string() }),
                timestamp: ts(),
                duration_ms: 1,
            },
        ];
        let report = Report::from_results(ts(), 6, results);
        assert_eq!(report.summary, Summary { total: 2, passed: 1, failed: 1 });
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn clean_run_exits_zero() {
        let report = Report::from_results(ts(), 0, vec![]);
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let report = Report::from_results(ts(), 10, vec![]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["durationMs"], 10);
        assert!(json.get("duration_ms").is_none());
    }
}
