//! Security scan report analysis.
//!
//! The report is tried as JSON first. Two JSON shapes are supported:
//! counts published under `metadata.vulnerabilities`, or a `vulnerabilities`
//! array/object whose entries carry a `severity` field. Anything that is
//! not valid JSON falls back to a raw-text heuristic behind the
//! [`RawReportParser`] capability.

use crate::analysis::AnalysisLimits;
use crate::models::{AnalysisResult, SecurityScan, Severity, Status, Vulnerability};
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// Recommendation appended when critical vulnerabilities are present.
pub const FIX_CRITICAL_VULNS: &str = "Address critical security vulnerabilities immediately";

/// Recommendation appended when high severity vulnerabilities are present.
pub const PLAN_HIGH_VULNS: &str = "Plan to address high severity vulnerabilities soon";

/// Capability for recovering approximate severity counts from a report
/// that is not valid JSON.
///
/// Implementations are best-effort by contract: the only guarantee is
/// "first numeric token following the keyword", so adversarial text can
/// produce wrong numbers. Keeping this behind a trait lets the heuristic
/// be swapped without touching the JSON-shaped path.
pub trait RawReportParser {
    /// Extract severity counts from free text.
    fn extract_counts(&self, content: &str) -> BTreeMap<String, u64>;
}

/// Default heuristic: case-insensitive keyword scan for `critical` and
/// `high` followed by a number on the same line.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexHeuristic;

impl RawReportParser for RegexHeuristic {
    fn extract_counts(&self, content: &str) -> BTreeMap<String, u64> {
        let mut counts = BTreeMap::new();

        if let Some(count) = first_count(critical_count_regex(), content) {
            counts.insert(Severity::Critical.as_str().to_string(), count);
        }
        if let Some(count) = first_count(high_count_regex(), content) {
            counts.insert(Severity::High.as_str().to_string(), count);
        }

        counts
    }
}

fn critical_count_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)critical.*?(\d+)").expect("critical count regex"))
}

fn high_count_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)high.*?(\d+)").expect("high count regex"))
}

fn first_count(re: &Regex, content: &str) -> Option<u64> {
    re.captures(content)
        .and_then(|caps| caps.get(1))
        .and_then(|group| group.as_str().parse().ok())
}

/// Analyze a security scan report at `path`, mutating `result` in place.
///
/// A missing file is a non-fatal warning. Returns `false` when no scan
/// data could be attached.
pub fn analyze_security_report(
    result: &mut AnalysisResult,
    path: &Path,
    raw_parser: &dyn RawReportParser,
    limits: &AnalysisLimits,
) -> bool {
    if !path.exists() {
        result.record_warning(format!("Security report not found: {}", path.display()));
        return false;
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            result.record_error(format!(
                "Failed to read security report {}: {}",
                path.display(),
                err
            ));
            return false;
        }
    };

    let scan = match serde_json::from_str::<Value>(&content) {
        Ok(json) => summarize_json(&json, limits),
        Err(err) => {
            debug!("security report is not JSON ({}), using raw capture", err);
            summarize_raw(&content, raw_parser, limits)
        }
    };

    apply_thresholds(result, &scan);
    result.security_scan = Some(scan);
    true
}

/// Counts from the JSON shapes, plus a top-vulnerabilities list when the
/// `vulnerabilities` collection carries enough detail to build one.
fn summarize_json(json: &Value, limits: &AnalysisLimits) -> SecurityScan {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();

    if let Some(published) = json
        .pointer("/metadata/vulnerabilities")
        .and_then(Value::as_object)
    {
        for (severity, count) in published {
            if let Some(count) = count.as_u64() {
                counts.insert(severity.to_lowercase(), count);
            }
        }
    } else {
        match json.get("vulnerabilities") {
            Some(Value::Array(entries)) => {
                for entry in entries {
                    *counts.entry(entry_severity_label(entry)).or_insert(0) += 1;
                }
            }
            Some(Value::Object(map)) => {
                for entry in map.values() {
                    *counts.entry(entry_severity_label(entry)).or_insert(0) += 1;
                }
            }
            _ => {}
        }
    }

    let mut scan = SecurityScan::from_counts(counts);
    scan.top_vulnerabilities = top_vulnerabilities(json.get("vulnerabilities"), limits);
    scan
}

fn entry_severity_label(entry: &Value) -> String {
    entry
        .get("severity")
        .and_then(Value::as_str)
        .unwrap_or(Severity::Unknown.as_str())
        .to_lowercase()
}

/// Up to N vulnerabilities sorted ascending by severity rank
/// (critical first). `None` when the collection yields no entries.
fn top_vulnerabilities(
    vulnerabilities: Option<&Value>,
    limits: &AnalysisLimits,
) -> Option<Vec<Vulnerability>> {
    let mut entries: Vec<Vulnerability> = match vulnerabilities {
        Some(Value::Array(list)) => list
            .iter()
            .filter(|entry| entry.is_object())
            .map(|entry| to_vulnerability(entry, None))
            .collect(),
        Some(Value::Object(map)) => map
            .iter()
            .filter(|(_, entry)| entry.is_object())
            .map(|(name, entry)| to_vulnerability(entry, Some(name)))
            .collect(),
        _ => Vec::new(),
    };

    if entries.is_empty() {
        return None;
    }

    // Stable sort keeps report order within a severity.
    entries.sort_by_key(|vuln| vuln.severity.rank());
    entries.truncate(limits.max_top_vulnerabilities);
    Some(entries)
}

fn to_vulnerability(entry: &Value, key: Option<&str>) -> Vulnerability {
    let name = key
        .map(str::to_string)
        .or_else(|| string_field(entry, "name"))
        .or_else(|| string_field(entry, "id"))
        .unwrap_or_else(|| "unknown".to_string());

    Vulnerability {
        name,
        severity: Severity::parse(
            entry
                .get("severity")
                .and_then(Value::as_str)
                .unwrap_or_default(),
        ),
        description: string_field(entry, "description").unwrap_or_else(|| "unknown".to_string()),
    }
}

fn string_field(entry: &Value, field: &str) -> Option<String> {
    entry.get(field).and_then(Value::as_str).map(str::to_string)
}

/// Raw capture plus heuristic counts for non-JSON reports.
fn summarize_raw(
    content: &str,
    raw_parser: &dyn RawReportParser,
    limits: &AnalysisLimits,
) -> SecurityScan {
    let mut scan = SecurityScan::from_counts(raw_parser.extract_counts(content));
    scan.raw_content = Some(content.chars().take(limits.raw_capture_chars).collect());
    scan
}

/// Critical findings fail the run; high findings warn.
fn apply_thresholds(result: &mut AnalysisResult, scan: &SecurityScan) {
    let critical = scan.count(Severity::Critical);
    if critical > 0 {
        result.status.observe(Status::Failed);
        result.record_error(format!(
            "Found {} critical security vulnerabilities",
            critical
        ));
        result.recommend(FIX_CRITICAL_VULNS);
    }

    let high = scan.count(Severity::High);
    if high > 0 {
        result.record_warning(format!(
            "Found {} high severity security vulnerabilities",
            high
        ));
        result.recommend(PLAN_HIGH_VULNS);
    }
}
