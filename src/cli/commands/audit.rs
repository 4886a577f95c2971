//! Audit command implementation
//!
//! Runs a scan, diffs it against the resolved baseline, records the result in
//! the audit history, and renders the diff.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use std::sync::Arc;

use super::scan::{ScanArgs, build_request, run_scan};
use crate::audit::{AuditHistory, DiffAuditor, DiffRequest, JsonFileStore};
use crate::cli::Output;
use crate::config::DriftscanConfig;
use crate::patterns::PatternRegistry;
use crate::report;
use crate::scanner::{Finding, Scanner};

#[derive(Args)]
pub struct AuditArgs {
    #[command(flatten)]
    pub scan: ScanArgs,

    /// Version label for this audit (also selects the baseline when no
    /// --since or --compare-to is given)
    #[arg(long, value_name = "VERSION")]
    pub label: Option<String>,

    /// Diff against the most recent record at or after this ISO-8601 timestamp
    #[arg(long, value_name = "TIMESTAMP")]
    pub since: Option<String>,

    /// Diff against an explicit findings JSON file instead of the history
    #[arg(long, value_name = "FILE")]
    pub compare_to: Option<String>,
}

/// Execute the audit command
pub async fn execute(args: AuditArgs, config_path: Option<&str>, output: &Output) -> Result<()> {
    let config = DriftscanConfig::load_with_custom_config(config_path)?;
    let request = build_request(&args.scan, &config)?;

    let registry = PatternRegistry::from_config(&config.patterns, &config.allowlist)?;
    let scanner = Scanner::new(registry);
    let outcome = run_scan(&scanner, &request, output)?;

    let since = args
        .since
        .as_deref()
        .map(parse_timestamp)
        .transpose()
        .context("Invalid --since timestamp")?;
    let compare_to = args
        .compare_to
        .as_deref()
        .map(load_findings)
        .transpose()
        .context("Failed to load --compare-to findings")?;

    let history = AuditHistory::new(
        Arc::new(JsonFileStore::new(&config.history.path)),
        config.history.cap,
    );
    let auditor = DiffAuditor::new(history);

    let diff = auditor.audit(&DiffRequest {
        since,
        version: args.label,
        current: outcome.findings,
        compare_to,
    })?;

    match args.scan.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&diff)?),
        _ => {
            output.header("Security Audit Diff");
            print!("{}", report::render_diff(&diff));
        }
    }

    Ok(())
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}

fn load_findings(path: &str) -> Result<Vec<Finding>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read findings file: {}", path))?;
    Ok(serde_json::from_str(&content)?)
}
