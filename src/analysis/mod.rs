//! Artifact analyzers.
//!
//! One module per artifact type. Every analyzer takes the shared
//! [`crate::models::AnalysisResult`] by mutable reference, records its own
//! failures as warnings or errors on the aggregate, and never aborts the
//! process.

pub mod ci_log;
pub mod finalize;
pub mod junit;
pub mod metrics;
pub mod security;
pub mod server_log;

/// Caps applied while analyzing artifacts.
#[derive(Debug, Clone)]
pub struct AnalysisLimits {
    /// Maximum server-log matches kept on the result.
    pub max_server_log_errors: usize,
    /// Maximum entries in the top-vulnerabilities list.
    pub max_top_vulnerabilities: usize,
    /// Characters of a non-JSON security report captured verbatim.
    pub raw_capture_chars: usize,
}

impl Default for AnalysisLimits {
    fn default() -> Self {
        Self {
            max_server_log_errors: 10,
            max_top_vulnerabilities: 5,
            raw_capture_chars: 1000,
        }
    }
}

impl From<&crate::config::LimitsConfig> for AnalysisLimits {
    fn from(config: &crate::config::LimitsConfig) -> Self {
        Self {
            max_server_log_errors: config.max_server_log_errors,
            max_top_vulnerabilities: config.max_top_vulnerabilities,
            raw_capture_chars: config.raw_capture_chars,
        }
    }
}
