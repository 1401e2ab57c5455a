//! Data models for pipeline triage.
//!
//! This module contains all the core data structures used throughout
//! the application for representing test results, security findings,
//! and the aggregated analysis result.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Overall outcome of a pipeline run.
///
/// The status only moves toward [`Status::Failed`]: once any analyzer
/// reports a failure signal, later "passed" signals cannot revert it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// No signal observed yet.
    #[default]
    Unknown,
    /// All observed signals were healthy.
    Passed,
    /// At least one failure signal was observed.
    Failed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Unknown => write!(f, "unknown"),
            Status::Passed => write!(f, "passed"),
            Status::Failed => write!(f, "failed"),
        }
    }
}

impl Status {
    /// Fold a new signal into the current status.
    ///
    /// `Failed` is absorbing; `Unknown` never overwrites a known state.
    pub fn observe(&mut self, observed: Status) {
        *self = match (*self, observed) {
            (Status::Failed, _) | (_, Status::Failed) => Status::Failed,
            (current, Status::Unknown) => current,
            (Status::Unknown, signal) => signal,
            (Status::Passed, Status::Passed) => Status::Passed,
        };
    }
}

/// Severity level of a vulnerability.
///
/// Declaration order is the sort order: critical ranks first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Moderate,
    Low,
    Info,
    /// Catch-all for absent or unrecognized labels.
    Unknown,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Severity {
    /// Parse a free-form severity label, case-insensitively.
    pub fn parse(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "moderate" | "medium" => Severity::Moderate,
            "low" => Severity::Low,
            "info" | "informational" => Severity::Info,
            _ => Severity::Unknown,
        }
    }

    /// Lowercase label, as used in report keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Moderate => "moderate",
            Severity::Low => "low",
            Severity::Info => "info",
            Severity::Unknown => "unknown",
        }
    }

    /// Numeric rank, critical = 0 through unknown = 5.
    pub fn rank(&self) -> u8 {
        *self as u8
    }
}

/// One failing or erroring test case from a JUnit report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Test case name (`"unknown"` when the attribute is absent).
    pub test_name: String,
    /// Owning class or suite name.
    pub class_name: String,
    /// Failure message attribute.
    pub message: String,
    /// Failure type attribute (assertion, error class, ...).
    #[serde(rename = "type")]
    pub failure_type: String,
    /// Trimmed body text of the failure element.
    pub content: String,
}

/// Aggregated test counts from a JUnit report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestResults {
    /// Total number of test cases across all suites.
    pub total: u64,
    /// Derived count: `total - failed - errors - skipped`.
    ///
    /// Signed on purpose: inconsistent reports can drive this negative
    /// and the value is recorded as-is.
    pub passed: i64,
    /// Number of assertion failures.
    pub failed: u64,
    /// Number of test errors.
    pub errors: u64,
    /// Number of skipped tests.
    pub skipped: u64,
    /// Percentage of passing tests, 0-100, rounded to two decimals.
    pub pass_rate: f64,
    /// Per-case detail for every failing or erroring test.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FailureRecord>,
}

/// A single vulnerability entry surfaced in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    /// Identifier from the scan report (key, `name` or `id` field).
    pub name: String,
    /// Parsed severity.
    pub severity: Severity,
    /// Human-readable description.
    pub description: String,
}

/// Summary of a security scan report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityScan {
    /// Count of vulnerabilities keyed by severity label.
    pub vulnerability_counts: BTreeMap<String, u64>,
    /// Sum of all counts.
    pub total_vulnerabilities: u64,
    /// Worst offenders, sorted by severity rank, capped at a small N.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_vulnerabilities: Option<Vec<Vulnerability>>,
    /// Leading slice of the raw report when it was not valid JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<String>,
}

impl SecurityScan {
    /// Build a scan summary from severity counts.
    pub fn from_counts(counts: BTreeMap<String, u64>) -> Self {
        let total = counts.values().sum();
        Self {
            vulnerability_counts: counts,
            total_vulnerabilities: total,
            top_vulnerabilities: None,
            raw_content: None,
        }
    }

    /// Count recorded for a severity label, 0 when absent.
    pub fn count(&self, severity: Severity) -> u64 {
        self.vulnerability_counts
            .get(severity.as_str())
            .copied()
            .unwrap_or(0)
    }
}

/// One server-log line that matched an error marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMatch {
    /// 1-indexed line number.
    pub line: usize,
    /// Trimmed line content.
    pub content: String,
}

/// The complete triage result for one pipeline run.
///
/// Constructed empty, mutated by each artifact analyzer, then finalized
/// (deduplication, default recommendations, timestamp) before rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Overall pass/fail status.
    pub status: Status,
    /// Human-readable one-line result description.
    pub summary: String,
    /// Test metrics, present when a JUnit report was analyzed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_results: Option<TestResults>,
    /// Security scan metrics, present when a scan report was analyzed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_scan: Option<SecurityScan>,
    /// First matching error lines from the server log.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub server_log_errors: Vec<LogMatch>,
    /// Free-form numeric metrics (durations, counts).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub performance_metrics: BTreeMap<String, f64>,
    /// Non-fatal analyzer errors (bad XML, bad JSON, missing test report).
    pub errors: Vec<String>,
    /// Non-fatal observations (missing optional files, suspicious counts).
    pub warnings: Vec<String>,
    /// Suggested follow-up actions. Deduplicated at finalize time;
    /// consumers must treat this as an unordered set.
    pub recommendations: Vec<String>,
    /// UTC timestamp (ISO-8601, trailing `Z`) stamped at finalize.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_timestamp: Option<String>,
}

impl AnalysisResult {
    /// Fresh result with all-empty defaults and `unknown` status.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a non-fatal analyzer error.
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Record a non-fatal warning.
    pub fn record_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Append a recommendation (deduplicated later at finalize).
    pub fn recommend(&mut self, message: impl Into<String>) {
        self.recommendations.push(message.into());
    }

    /// Write a numeric metric, overwriting any prior value.
    pub fn set_metric(&mut self, name: impl Into<String>, value: f64) {
        self.performance_metrics.insert(name.into(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_starts_unknown() {
        assert_eq!(AnalysisResult::new().status, Status::Unknown);
    }

    #[test]
    fn test_status_failed_is_absorbing() {
        let mut status = Status::Unknown;
        status.observe(Status::Failed);
        assert_eq!(status, Status::Failed);

        status.observe(Status::Passed);
        assert_eq!(status, Status::Failed);

        status.observe(Status::Unknown);
        assert_eq!(status, Status::Failed);
    }

    #[test]
    fn test_status_unknown_upgrades_to_passed() {
        let mut status = Status::Unknown;
        status.observe(Status::Passed);
        assert_eq!(status, Status::Passed);

        status.observe(Status::Failed);
        assert_eq!(status, Status::Failed);
    }

    #[test]
    fn test_status_unknown_signal_is_ignored() {
        let mut status = Status::Passed;
        status.observe(Status::Unknown);
        assert_eq!(status, Status::Passed);
    }

    #[test]
    fn test_severity_rank_order() {
        assert!(Severity::Critical < Severity::High);
        assert!(Severity::High < Severity::Moderate);
        assert!(Severity::Moderate < Severity::Low);
        assert!(Severity::Low < Severity::Info);
        assert!(Severity::Info < Severity::Unknown);
        assert_eq!(Severity::Critical.rank(), 0);
        assert_eq!(Severity::Unknown.rank(), 5);
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!(Severity::parse("CRITICAL"), Severity::Critical);
        assert_eq!(Severity::parse("High"), Severity::High);
        assert_eq!(Severity::parse("medium"), Severity::Moderate);
        assert_eq!(Severity::parse(""), Severity::Unknown);
        assert_eq!(Severity::parse("banana"), Severity::Unknown);
    }

    #[test]
    fn test_security_scan_from_counts() {
        let counts: BTreeMap<String, u64> = [("critical".to_string(), 1), ("high".to_string(), 2)]
            .into_iter()
            .collect();

        let scan = SecurityScan::from_counts(counts);
        assert_eq!(scan.total_vulnerabilities, 3);
        assert_eq!(scan.count(Severity::Critical), 1);
        assert_eq!(scan.count(Severity::High), 2);
        assert_eq!(scan.count(Severity::Low), 0);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Status::Failed).unwrap(),
            "\"failed\""
        );
        assert_eq!(
            serde_json::to_string(&Severity::Critical).unwrap(),
            "\"critical\""
        );
    }

    #[test]
    fn test_failure_record_type_key() {
        let record = FailureRecord {
            test_name: "t".to_string(),
            class_name: "c".to_string(),
            message: "m".to_string(),
            failure_type: "AssertionError".to_string(),
            content: String::new(),
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"type\":\"AssertionError\""));
    }

    #[test]
    fn test_empty_result_omits_optional_sections() {
        let json = serde_json::to_string(&AnalysisResult::new()).unwrap();
        assert!(!json.contains("test_results"));
        assert!(!json.contains("security_scan"));
        assert!(!json.contains("server_log_errors"));
        assert!(json.contains("\"status\":\"unknown\""));
    }
}
