//! Server log analysis.
//!
//! Line-by-line scan for well-known error markers. Only the first few
//! matches are kept on the result; the warning carries the full count.

use crate::analysis::AnalysisLimits;
use crate::models::{AnalysisResult, LogMatch};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// Recommendation appended when the log contains error lines.
pub const REVIEW_SERVER_LOGS: &str = "Review server logs for application errors";

fn error_marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)Error:|Exception:|Failed to|fatal:|\[ERROR\]").expect("error marker regex")
    })
}

/// Scan a server log at `path` for error markers, mutating `result`.
///
/// A missing file is a non-fatal warning. Returns `false` when the log
/// could not be read.
pub fn analyze_server_log(
    result: &mut AnalysisResult,
    path: &Path,
    limits: &AnalysisLimits,
) -> bool {
    if !path.exists() {
        result.record_warning(format!("Server log not found: {}", path.display()));
        return false;
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            result.record_error(format!(
                "Failed to read server log {}: {}",
                path.display(),
                err
            ));
            return false;
        }
    };

    let mut total = 0usize;
    let mut matches = Vec::new();

    for (index, line) in content.lines().enumerate() {
        if error_marker_regex().is_match(line) {
            total += 1;
            if matches.len() < limits.max_server_log_errors {
                matches.push(LogMatch {
                    line: index + 1,
                    content: line.trim().to_string(),
                });
            }
        }
    }

    debug!(total, kept = matches.len(), "scanned server log");

    if total > 0 {
        result.record_warning(format!("Found {} errors in server logs", total));
        result.server_log_errors = matches;
        result.recommend(REVIEW_SERVER_LOGS);
    }

    true
}
