//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Pipetriage - CI/CD pipeline artifact triage
///
/// Turn the artifacts of a pipeline run (JUnit XML report, security scan
/// report, server log, CI job log) into one structured JSON summary with
/// pass/fail status, warnings, and recommendations.
///
/// Examples:
///   pipetriage --junit-xml-report results.xml
///   pipetriage --junit-xml-report results.xml --security-report audit.json -o triage.json
///   pipetriage --server-log server.log --ci-log "$(cat job.log)"
///   pipetriage --job-trace-url https://ci.example.com/api/v4/jobs/42/trace
///   pipetriage --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to a JUnit XML test report
    ///
    /// Either a <testsuites> document or a bare <testsuite> root.
    #[arg(long, value_name = "FILE")]
    pub junit_xml_report: Option<PathBuf>,

    /// Path to a security scan report
    ///
    /// JSON is tried first; anything else is captured as raw text with
    /// best-effort count extraction.
    #[arg(long, value_name = "FILE")]
    pub security_report: Option<PathBuf>,

    /// Path to a server log file
    #[arg(long, value_name = "FILE")]
    pub server_log: Option<PathBuf>,

    /// Inline CI job log content
    ///
    /// Used as-is, or as the fallback when --job-trace-url fails.
    #[arg(long, value_name = "TEXT")]
    pub ci_log: Option<String>,

    /// CI job trace endpoint to fetch log content from
    ///
    /// One GET with a fixed timeout, no retry. On failure the --ci-log
    /// text is used instead.
    #[arg(long, value_name = "URL")]
    pub job_trace_url: Option<String>,

    /// Private token for the trace endpoint
    ///
    /// Sent as the PRIVATE-TOKEN header.
    #[arg(long, value_name = "TOKEN", env = "PIPETRIAGE_PRIVATE_TOKEN")]
    pub private_token: Option<String>,

    /// Free-text duration of the test stage (e.g. "217.4s")
    #[arg(long, value_name = "TEXT")]
    pub test_duration: Option<String>,

    /// Path to the HTML test report directory
    #[arg(long, value_name = "DIR")]
    pub report_dir: Option<PathBuf>,

    /// Output file for the JSON summary (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .pipetriage.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Trace fetch timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub fetch_timeout: Option<u64>,

    /// Exit with code 2 when the condition holds
    ///
    /// Useful for CI gating. Values: failed, critical
    #[arg(long, value_name = "CONDITION")]
    pub fail_on: Option<FailOnCondition>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .pipetriage.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Gate condition for --fail-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FailOnCondition {
    /// Overall status is "failed".
    Failed,
    /// Any critical vulnerability was found.
    Critical,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref url) = self.job_trace_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Trace URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(timeout) = self.fetch_timeout {
            if timeout == 0 {
                return Err("Fetch timeout must be at least 1 second".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            junit_xml_report: Some(PathBuf::from("results.xml")),
            security_report: None,
            server_log: None,
            ci_log: None,
            job_trace_url: None,
            private_token: None,
            test_duration: None,
            report_dir: None,
            output: None,
            config: None,
            fetch_timeout: None,
            fail_on: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_accepts_defaults() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_trace_url() {
        let mut args = make_args();
        args.job_trace_url = Some("ftp://ci.example.com/trace".to_string());
        assert!(args.validate().is_err());

        args.job_trace_url = Some("https://ci.example.com/trace".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut args = make_args();
        args.fetch_timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_init_config_skips_validation() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
