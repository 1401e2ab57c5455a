//! JUnit XML test report analysis.
//!
//! Accepts either a `<testsuites>` document (counts aggregated over the
//! child `<testsuite>` elements) or a bare `<testsuite>` root. Parse
//! failures are recorded on the aggregate, never raised.

use crate::models::{AnalysisResult, FailureRecord, Status, TestResults};
use roxmltree::{Document, Node};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Recommendation appended when the report contains failing tests.
pub const FIX_FAILING_TESTS: &str = "Fix failing tests before merging";

/// Recommendation appended when the report contains skipped tests.
pub const REVIEW_SKIPPED_TESTS: &str = "Review skipped tests to ensure they're not critical";

#[derive(Debug, Error)]
enum JunitError {
    #[error("JUnit XML file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to read JUnit XML {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed JUnit XML in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: roxmltree::Error,
    },
    #[error("Unexpected root element <{root}> in {}", .path.display())]
    UnexpectedRoot { path: PathBuf, root: String },
}

/// Analyze a JUnit XML report at `path`, mutating `result` in place.
///
/// Returns `false` when the artifact could not be analyzed (missing file,
/// malformed XML, or a report with zero tests); the reason is recorded in
/// `result.errors` either way.
pub fn analyze_junit_xml(result: &mut AnalysisResult, path: &Path) -> bool {
    let counts = match parse_report(path) {
        Ok(counts) => counts,
        Err(err) => {
            result.record_error(err.to_string());
            return false;
        }
    };

    debug!(
        total = counts.total,
        failed = counts.failed,
        errors = counts.errors,
        "parsed JUnit report"
    );

    let total = counts.total;
    let failed = counts.failed;
    let errors = counts.errors;
    let skipped = counts.skipped;
    result.test_results = Some(counts);

    // A report that ran nothing is an error condition, not a pass.
    if total == 0 {
        result.record_error(format!(
            "No tests executed in JUnit XML report: {}",
            path.display()
        ));
        return false;
    }

    if failed + errors > 0 {
        result.status.observe(Status::Failed);
        result.summary = format!("Tests failed: {} failures, {} errors", failed, errors);
        result.recommend(FIX_FAILING_TESTS);
    } else {
        result.status.observe(Status::Passed);
        result.summary = format!("All {} tests passed", total);
    }

    if skipped > 0 {
        result.record_warning(format!("{} tests were skipped", skipped));
        result.recommend(REVIEW_SKIPPED_TESTS);
    }

    true
}

fn parse_report(path: &Path) -> Result<TestResults, JunitError> {
    if !path.exists() {
        return Err(JunitError::NotFound(path.to_path_buf()));
    }

    let text = fs::read_to_string(path).map_err(|source| JunitError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let doc = Document::parse(&text).map_err(|source| JunitError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let root = doc.root_element();
    let suites: Vec<Node> = match root.tag_name().name() {
        "testsuites" => root
            .children()
            .filter(|node| node.has_tag_name("testsuite"))
            .collect(),
        "testsuite" => vec![root],
        other => {
            return Err(JunitError::UnexpectedRoot {
                path: path.to_path_buf(),
                root: other.to_string(),
            })
        }
    };

    let mut counts = TestResults::default();
    for suite in &suites {
        counts.total += attr_count(*suite, "tests");
        counts.failed += attr_count(*suite, "failures");
        counts.errors += attr_count(*suite, "errors");
        counts.skipped += attr_count(*suite, "skipped");
    }

    // Signed arithmetic: inconsistent reports can make this negative.
    counts.passed = counts.total as i64
        - counts.failed as i64
        - counts.errors as i64
        - counts.skipped as i64;

    counts.pass_rate = if counts.total > 0 {
        round2(counts.passed as f64 / counts.total as f64 * 100.0)
    } else {
        0.0
    };

    counts.failures = collect_failures(&doc);

    Ok(counts)
}

/// Numeric attribute with a 0 default, matching JUnit producers that
/// omit zero counts.
fn attr_count(node: Node, name: &str) -> u64 {
    node.attribute(name)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One failure record per `<failure>` or `<error>` child of a test case.
fn collect_failures(doc: &Document) -> Vec<FailureRecord> {
    let mut records = Vec::new();

    for case in doc
        .descendants()
        .filter(|node| node.has_tag_name("testcase"))
    {
        for child in case.children().filter(|node| {
            node.is_element() && (node.has_tag_name("failure") || node.has_tag_name("error"))
        }) {
            records.push(FailureRecord {
                test_name: attr_or_unknown(case, "name"),
                class_name: attr_or_unknown(case, "classname"),
                message: attr_or_unknown(child, "message"),
                failure_type: attr_or_unknown(child, "type"),
                content: child.text().map(str::trim).unwrap_or("").to_string(),
            });
        }
    }

    records
}

fn attr_or_unknown(node: Node, name: &str) -> String {
    node.attribute(name).unwrap_or("unknown").to_string()
}
