//! Scan command implementation

use anyhow::Result;
use clap::Args;
use std::time::Duration;

use crate::cli::Output;
use crate::config::DriftscanConfig;
use crate::patterns::{PatternRegistry, Severity};
use crate::report;
use crate::scanner::{ScanOutcome, ScanRequest, Scanner};

#[derive(Args)]
pub struct ScanArgs {
    /// Paths or glob patterns to scan (defaults to the current directory)
    #[arg(value_name = "PATH")]
    pub paths: Vec<String>,

    /// Additional exclude globs
    #[arg(short, long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Minimum entropy for the high-entropy sweep
    #[arg(long)]
    pub entropy: Option<f64>,

    /// Maximum file size to scan, in bytes
    #[arg(long)]
    pub max_file_size: Option<u64>,

    /// Scan timeout in milliseconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Exit non-zero when any finding meets this severity (low, medium, high, critical)
    #[arg(long, value_name = "SEVERITY")]
    pub fail_on: Option<String>,
}

/// Execute the scan command
pub async fn execute(args: ScanArgs, config_path: Option<&str>, output: &Output) -> Result<()> {
    let config = DriftscanConfig::load_with_custom_config(config_path)?;
    let request = build_request(&args, &config)?;

    let registry = PatternRegistry::from_config(&config.patterns, &config.allowlist)?;
    output.verbose(&format!("{} detection patterns active", registry.pattern_count()));
    let scanner = Scanner::new(registry);

    let outcome = run_scan(&scanner, &request, output)?;
    render(&outcome, &args.format, output)?;

    // Blocking on findings is caller policy, not engine behavior.
    if let Some(threshold) = &args.fail_on {
        let threshold: Severity = threshold.parse()?;
        let blocking = outcome
            .findings
            .iter()
            .filter(|f| f.pattern.severity >= threshold)
            .count();
        if blocking > 0 {
            output.error(&format!("{} findings at or above {}", blocking, threshold));
            std::process::exit(1);
        }
    }

    Ok(())
}

pub(super) fn build_request(args: &ScanArgs, config: &DriftscanConfig) -> Result<ScanRequest> {
    let mut request = config.scan_request(std::env::current_dir()?);

    if !args.paths.is_empty() {
        request.include = args.paths.clone();
    }
    request.exclude.extend(args.exclude.iter().cloned());
    if let Some(entropy) = args.entropy {
        request.entropy_threshold = entropy;
    }
    if let Some(max_file_size) = args.max_file_size {
        request.max_file_size = max_file_size;
    }
    if let Some(timeout) = args.timeout {
        request.timeout = Duration::from_millis(timeout);
    }

    Ok(request)
}

pub(super) fn run_scan(
    scanner: &Scanner,
    request: &ScanRequest,
    output: &Output,
) -> Result<ScanOutcome> {
    let spinner = output.spinner("Scanning for secrets");
    let outcome = scanner.scan(request)?;
    spinner.finish_and_clear();

    if outcome.timed_out {
        output.warning(&format!(
            "Scan timed out after {}ms; results are partial ({} files skipped)",
            request.timeout.as_millis(),
            outcome.stats.files_skipped
        ));
    }

    Ok(outcome)
}

fn render(outcome: &ScanOutcome, format: &str, output: &Output) -> Result<()> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&outcome.findings)?),
        _ => {
            output.header("Secret Scan");
            print!("{}", report::render_findings(&outcome.findings));
            output.separator();
            output.count(
                "»",
                "Files scanned",
                outcome.stats.files_scanned,
            );
            if outcome.stats.files_skipped > 0 {
                output.count("»", "Files skipped", outcome.stats.files_skipped);
            }
            if outcome.findings.is_empty() {
                output.success("No secrets detected");
            } else {
                output.warning(&format!("Found {} findings", outcome.findings.len()));
            }
        }
    }

    Ok(())
}
