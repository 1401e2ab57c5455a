//! Pipetriage - CI/CD Pipeline Artifact Triage
//!
//! A CLI tool that ingests pipeline artifacts (JUnit XML test reports,
//! security scan reports, server logs, CI job logs) and emits a single
//! structured JSON summary with status, warnings, and recommendations.
//!
//! Exit codes:
//!   0 - Success (report emitted, no --fail-on condition met)
//!   1 - Runtime error (bad arguments, unwritable output, config failure)
//!   2 - --fail-on condition met

mod analysis;
mod cli;
mod config;
mod fetch;
mod models;
mod report;

use analysis::security::RegexHeuristic;
use analysis::AnalysisLimits;
use anyhow::{Context, Result};
use cli::{Args, FailOnCondition};
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use models::{AnalysisResult, Severity, Status};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Pipetriage v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the triage
    match run_triage(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Triage failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .pipetriage.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".pipetriage.toml");

    if path.exists() {
        eprintln!("⚠️  .pipetriage.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .pipetriage.toml")?;

    println!("✅ Created .pipetriage.toml with default settings.");
    println!("   Edit it to customize output, analyzer limits, and fetch timeout.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete triage workflow. Returns exit code (0 or 2).
async fn run_triage(args: Args) -> Result<i32> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let limits = AnalysisLimits::from(&config.limits);
    let mut result = AnalysisResult::new();

    // Step 1: Resolve CI log content (fetched trace wins, inline text is
    // the fallback). This is the only network touchpoint.
    let ci_log_content = resolve_ci_log(&args, &config).await;

    // Step 2: Analyze whatever artifacts were provided. Each analyzer
    // records its own failures on the aggregate and never aborts the run.
    if let Some(ref path) = args.junit_xml_report {
        info!("Analyzing JUnit XML report: {}", path.display());
        analysis::junit::analyze_junit_xml(&mut result, path);
    }

    if let Some(ref path) = args.security_report {
        info!("Analyzing security report: {}", path.display());
        analysis::security::analyze_security_report(&mut result, path, &RegexHeuristic, &limits);
    }

    if let Some(ref path) = args.server_log {
        info!("Analyzing server log: {}", path.display());
        analysis::server_log::analyze_server_log(&mut result, path, &limits);
    }

    if let Some(ref content) = ci_log_content {
        info!("Analyzing CI log content");
        analysis::ci_log::analyze_ci_log(&mut result, content);
    }

    if let Some(ref text) = args.test_duration {
        analysis::metrics::record_test_duration(&mut result, text);
    }

    if let Some(ref dir) = args.report_dir {
        info!("Scanning HTML report directory: {}", dir.display());
        analysis::metrics::analyze_report_dir(&mut result, dir);
    }

    // Step 3: Finalize (dedup, default recommendations, timestamp) and emit
    analysis::finalize::finalize(&mut result);

    let output = output_path(&args, &config);
    report::write_report(&result, output.as_deref())?;

    if let Some(ref path) = output {
        print_summary(&result, path);
    }

    // Step 4: Apply the --fail-on gate
    if let Some(condition) = args.fail_on {
        if gate_tripped(condition, &result) {
            eprintln!(
                "\n⛔ --fail-on {:?} condition met. Failing (exit code 2).",
                condition
            );
            return Ok(2);
        }
    }

    Ok(0)
}

/// Resolve the CI log text: fetch the job trace when a URL was given,
/// falling back to the inline --ci-log text on any fetch failure.
async fn resolve_ci_log(args: &Args, config: &Config) -> Option<String> {
    let url = match args.job_trace_url {
        Some(ref url) => url,
        None => return args.ci_log.clone(),
    };

    let spinner = if args.quiet {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message("Fetching CI job trace...");
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    };

    let fetched = match fetch::TraceClient::new(config.fetch.timeout_seconds) {
        Ok(client) => {
            client
                .fetch_job_trace(url, args.private_token.as_deref())
                .await
        }
        Err(e) => Err(e),
    };

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    match fetched {
        Ok(trace) => Some(trace),
        Err(e) => {
            // Degrade gracefully to whatever the caller supplied inline.
            warn!("Trace fetch failed, using provided CI log content: {}", e);
            args.ci_log.clone()
        }
    }
}

/// Effective output path: CLI flag first, then config, else stdout.
fn output_path(args: &Args, config: &Config) -> Option<PathBuf> {
    args.output
        .clone()
        .or_else(|| config.general.output.as_ref().map(PathBuf::from))
}

/// Short human summary, printed only when the JSON went to a file.
fn print_summary(result: &AnalysisResult, path: &std::path::Path) {
    println!("\n📊 Triage Summary:");
    println!("   Status: {}", result.status);

    if let Some(ref tests) = result.test_results {
        println!(
            "   Tests: {} total | {} passed | {} failed | {} errors | {} skipped ({}%)",
            tests.total, tests.passed, tests.failed, tests.errors, tests.skipped, tests.pass_rate
        );
    }

    if let Some(ref scan) = result.security_scan {
        println!("   Vulnerabilities: {} total", scan.total_vulnerabilities);
    }

    println!(
        "   Errors: {} | Warnings: {} | Recommendations: {}",
        result.errors.len(),
        result.warnings.len(),
        result.recommendations.len()
    );

    println!(
        "\n✅ Triage complete! Report saved to: {}",
        path.display()
    );
}

/// Evaluate the --fail-on gate against the finalized result.
fn gate_tripped(condition: FailOnCondition, result: &AnalysisResult) -> bool {
    match condition {
        FailOnCondition::Failed => result.status == Status::Failed,
        FailOnCondition::Critical => result
            .security_scan
            .as_ref()
            .map(|scan| scan.count(Severity::Critical) > 0)
            .unwrap_or(false),
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .pipetriage.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
