//! JSON report rendering and output.
//!
//! JSON is the only supported format. Output goes to a file when one is
//! given, otherwise to stdout.

use crate::models::AnalysisResult;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Render the result as pretty-printed JSON (2-space indentation).
pub fn render_json(result: &AnalysisResult) -> Result<String> {
    serde_json::to_string_pretty(result).map_err(Into::into)
}

/// Write the rendered report to `path`, or to stdout when `path` is `None`.
pub fn write_report(result: &AnalysisResult, path: Option<&Path>) -> Result<()> {
    let content = render_json(result)?;

    match path {
        Some(path) => std::fs::write(path, &content)
            .with_context(|| format!("Failed to write report to {}", path.display()))?,
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(content.as_bytes())?;
            handle.write_all(b"\n")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LogMatch, Status, TestResults};
    use tempfile::TempDir;

    fn sample_result() -> AnalysisResult {
        let mut result = AnalysisResult::new();
        result.status.observe(Status::Failed);
        result.summary = "Tests failed: 2 failures, 1 errors".to_string();
        result.test_results = Some(TestResults {
            total: 10,
            passed: 6,
            failed: 2,
            errors: 1,
            skipped: 1,
            pass_rate: 60.0,
            failures: Vec::new(),
        });
        result.server_log_errors = vec![LogMatch {
            line: 3,
            content: "Error: boom".to_string(),
        }];
        result.set_metric("duration", 127.53);
        result.record_warning("1 tests were skipped");
        result.recommend("Fix failing tests before merging");
        result.analysis_timestamp = Some("2026-08-06T12:00:00Z".to_string());
        result
    }

    #[test]
    fn test_render_uses_two_space_indentation() {
        let json = render_json(&sample_result()).unwrap();
        assert!(json.starts_with("{\n  \"status\": \"failed\""));
        assert!(json.contains("\n  \"summary\""));
    }

    #[test]
    fn test_round_trip_preserves_field_values() {
        let result = sample_result();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("triage.json");

        write_report(&result, Some(&path)).unwrap();

        let restored: AnalysisResult =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(restored, result);
    }

    #[test]
    fn test_unwritable_path_is_an_error() {
        let outcome = write_report(
            &AnalysisResult::new(),
            Some(Path::new("/nonexistent/dir/triage.json")),
        );
        assert!(outcome.is_err());
    }
}
