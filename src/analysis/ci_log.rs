//! CI job log analysis.
//!
//! Works on text already in memory (inline argument or fetched trace).
//! Three independent probes: timeout mentions, memory exhaustion phrases,
//! and a duration metric.

use crate::models::AnalysisResult;
use regex::Regex;
use std::sync::OnceLock;

/// Recommendation appended when a timeout is suspected.
pub const RAISE_TIMEOUT: &str = "Consider increasing job timeout limits";

/// Recommendation appended when the job ran out of memory.
pub const RAISE_MEMORY: &str = "Increase memory allocation for CI jobs";

fn timeout_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)timeout.*?\d+").expect("timeout regex"))
}

fn memory_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)out of memory|memory limit exceeded").expect("memory regex")
    })
}

fn duration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Duration: (\d+\.\d+) seconds").expect("duration regex"))
}

/// Probe CI log text for common build issues, mutating `result`.
///
/// Empty content is a non-fatal warning; returns `false` in that case.
pub fn analyze_ci_log(result: &mut AnalysisResult, log_content: &str) -> bool {
    if log_content.is_empty() {
        result.record_warning("No CI log content provided");
        return false;
    }

    if timeout_regex().is_match(log_content) {
        result.record_warning("Possible timeout issue detected in CI log");
        result.recommend(RAISE_TIMEOUT);
    }

    if memory_regex().is_match(log_content) {
        result.record_warning("Memory limit exceeded in CI job");
        result.recommend(RAISE_MEMORY);
    }

    if let Some(captures) = duration_regex().captures(log_content) {
        if let Ok(seconds) = captures[1].parse::<f64>() {
            result.set_metric("duration", seconds);
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_content_warns() {
        let mut result = AnalysisResult::new();
        assert!(!analyze_ci_log(&mut result, ""));
        assert!(result
            .warnings
            .iter()
            .any(|w| w == "No CI log content provided"));
    }

    #[test]
    fn test_timeout_probe() {
        let mut result = AnalysisResult::new();
        assert!(analyze_ci_log(
            &mut result,
            "ERROR: Job failed: execution took longer than timeout of 3600 seconds"
        ));
        assert!(result.warnings.iter().any(|w| w.contains("timeout")));
        assert!(result.recommendations.iter().any(|r| r == RAISE_TIMEOUT));
    }

    #[test]
    fn test_memory_probe() {
        let mut result = AnalysisResult::new();
        analyze_ci_log(&mut result, "container killed: Out of Memory");
        assert!(result
            .warnings
            .iter()
            .any(|w| w == "Memory limit exceeded in CI job"));
        assert!(result.recommendations.iter().any(|r| r == RAISE_MEMORY));
    }

    #[test]
    fn test_duration_metric_is_extracted() {
        let mut result = AnalysisResult::new();
        analyze_ci_log(&mut result, "Job succeeded\nDuration: 127.53 seconds\n");
        assert_eq!(result.performance_metrics.get("duration"), Some(&127.53));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_duration_requires_exact_phrase() {
        let mut result = AnalysisResult::new();
        analyze_ci_log(&mut result, "duration: 127.53 seconds");
        assert!(result.performance_metrics.is_empty());
    }

    #[test]
    fn test_probes_are_independent() {
        let mut result = AnalysisResult::new();
        analyze_ci_log(
            &mut result,
            "timeout after 600\nout of memory\nDuration: 30.00 seconds",
        );
        assert_eq!(result.warnings.len(), 2);
        assert_eq!(result.recommendations.len(), 2);
        assert_eq!(result.performance_metrics.get("duration"), Some(&30.0));
    }
}
