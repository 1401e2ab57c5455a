//! Auxiliary metrics from loosely structured inputs.
//!
//! Covers the two inputs that arrive outside the main artifacts: a
//! free-text test duration and the HTML report directory produced by the
//! test runner.

use crate::models::AnalysisResult;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;
use walkdir::WalkDir;

fn number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?").expect("number regex"))
}

/// Record a test duration from free text ("217.4s", "duration 98 sec").
///
/// The first numeric token is taken as seconds. Unparseable text is a
/// non-fatal warning.
pub fn record_test_duration(result: &mut AnalysisResult, text: &str) -> bool {
    let parsed = number_regex()
        .find(text)
        .and_then(|token| token.as_str().parse::<f64>().ok());

    match parsed {
        Some(seconds) => {
            result.set_metric("test_duration", seconds);
            true
        }
        None => {
            result.record_warning(format!("Could not parse test duration from {:?}", text));
            false
        }
    }
}

/// Record how many files the HTML report directory contains.
///
/// Missing or empty directories are non-fatal warnings.
pub fn analyze_report_dir(result: &mut AnalysisResult, dir: &Path) -> bool {
    if !dir.is_dir() {
        result.record_warning(format!("HTML report directory not found: {}", dir.display()));
        return false;
    }

    let files = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .count();

    debug!(files, dir = %dir.display(), "scanned report directory");

    if files == 0 {
        result.record_warning(format!("HTML report directory is empty: {}", dir.display()));
    }
    result.set_metric("report_files", files as f64);

    true
}
