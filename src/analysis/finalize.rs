//! Result finalization.
//!
//! Injects default recommendations when no analyzer produced any,
//! deduplicates the string lists, and stamps the analysis timestamp.
//!
//! Dedup keeps the first occurrence of each string. Callers may run
//! finalize more than once: re-running re-deduplicates and re-stamps the
//! timestamp, but default injection is suppressed by any recommendation
//! already present, including defaults from an earlier run.

use crate::analysis::junit::FIX_FAILING_TESTS;
use crate::models::{AnalysisResult, Status};
use chrono::{SecondsFormat, Utc};
use std::collections::HashSet;

/// Default recommendation for a passing run.
pub const ADD_COVERAGE: &str = "Consider adding more test coverage";

/// Default recommendation for a passing run.
pub const SCHEDULE_SECURITY_SCANS: &str = "Set up regular security scanning";

/// Default recommendation when no test signal was ever observed.
pub const SET_UP_AUTOMATED_TESTS: &str =
    "Set up automated tests so pipeline health can be measured";

/// Finalize the aggregate: defaults, dedup, timestamp.
pub fn finalize(result: &mut AnalysisResult) {
    if result.recommendations.is_empty() {
        for rec in default_recommendations(result.status) {
            result.recommend(rec);
        }
    }

    dedup_in_place(&mut result.errors);
    dedup_in_place(&mut result.warnings);
    dedup_in_place(&mut result.recommendations);

    result.analysis_timestamp = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
}

fn default_recommendations(status: Status) -> Vec<&'static str> {
    match status {
        Status::Passed => vec![ADD_COVERAGE, SCHEDULE_SECURITY_SCANS],
        Status::Failed => vec![FIX_FAILING_TESTS],
        Status::Unknown => vec![SET_UP_AUTOMATED_TESTS],
    }
}

/// First-occurrence dedup. Consumers must still treat the lists as
/// unordered sets of strings.
fn dedup_in_place(items: &mut Vec<String>) {
    let mut seen = HashSet::new();
    items.retain(|item| seen.insert(item.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn test_repeated_recommendation_collapses_to_one() {
        let mut result = AnalysisResult::new();
        for _ in 0..3 {
            result.recommend("Review server logs for application errors");
        }

        finalize(&mut result);

        assert_eq!(
            result
                .recommendations
                .iter()
                .filter(|r| r.as_str() == "Review server logs for application errors")
                .count(),
            1
        );
        assert_eq!(result.recommendations.len(), 1);
    }

    #[test]
    fn test_defaults_for_passed_run() {
        let mut result = AnalysisResult::new();
        result.status.observe(Status::Passed);

        finalize(&mut result);

        assert!(result.recommendations.iter().any(|r| r == ADD_COVERAGE));
        assert!(result
            .recommendations
            .iter()
            .any(|r| r == SCHEDULE_SECURITY_SCANS));
    }

    #[test]
    fn test_defaults_for_failed_run() {
        let mut result = AnalysisResult::new();
        result.status.observe(Status::Failed);

        finalize(&mut result);

        assert_eq!(result.recommendations, vec![FIX_FAILING_TESTS.to_string()]);
    }

    #[test]
    fn test_defaults_for_run_with_no_signals() {
        let mut result = AnalysisResult::new();

        finalize(&mut result);

        assert_eq!(
            result.recommendations,
            vec![SET_UP_AUTOMATED_TESTS.to_string()]
        );
    }

    #[test]
    fn test_existing_recommendation_suppresses_defaults() {
        let mut result = AnalysisResult::new();
        result.status.observe(Status::Passed);
        result.recommend("Pin the base image digest");

        finalize(&mut result);

        assert_eq!(
            result.recommendations,
            vec!["Pin the base image digest".to_string()]
        );
    }

    #[test]
    fn test_finalize_twice_does_not_duplicate_defaults() {
        let mut result = AnalysisResult::new();
        result.status.observe(Status::Passed);

        finalize(&mut result);
        let first = result.recommendations.clone();
        finalize(&mut result);

        assert_eq!(result.recommendations, first);
    }

    #[test]
    fn test_warnings_and_errors_are_deduplicated() {
        let mut result = AnalysisResult::new();
        result.record_warning("w");
        result.record_warning("w");
        result.record_error("e");
        result.record_error("e");

        finalize(&mut result);

        assert_eq!(result.warnings, vec!["w".to_string()]);
        assert_eq!(result.errors, vec!["e".to_string()]);
    }

    #[test]
    fn test_timestamp_is_utc_with_trailing_z() {
        let mut result = AnalysisResult::new();
        finalize(&mut result);

        let stamp = result.analysis_timestamp.unwrap();
        assert!(stamp.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(&stamp).is_ok());
    }
}
