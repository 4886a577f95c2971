//! History command implementations

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::audit::{AuditHistory, JsonFileStore, history};
use crate::cli::{HistoryCommands, Output};
use crate::config::DriftscanConfig;

/// Execute history commands
pub async fn execute(
    cmd: HistoryCommands,
    config_path: Option<&str>,
    output: &Output,
) -> Result<()> {
    let config = DriftscanConfig::load_with_custom_config(config_path)?;
    let audit_history = AuditHistory::new(
        Arc::new(JsonFileStore::new(&config.history.path)),
        config.history.cap,
    );

    match cmd {
        HistoryCommands::List { count } => list(&audit_history, count, output),
        HistoryCommands::Export { format, output: target } => {
            export(&audit_history, &format, target.as_deref(), output)
        }
    }
}

fn list(audit_history: &AuditHistory, count: usize, output: &Output) -> Result<()> {
    let records = audit_history.recent(count)?;
    if records.is_empty() {
        output.info("Audit history is empty");
        return Ok(());
    }

    output.header("Audit History");
    for record in records.iter().rev() {
        let risk = record
            .diff
            .as_ref()
            .map(|d| d.summary.risk_level.to_string())
            .unwrap_or_else(|| "-".to_string());
        output.table_row(
            &record.version,
            &format!(
                "{}  {} secrets  risk {}",
                record.timestamp.to_rfc3339(),
                record.secrets.len(),
                risk
            ),
        );
    }

    Ok(())
}

fn export(
    audit_history: &AuditHistory,
    format: &str,
    target: Option<&str>,
    output: &Output,
) -> Result<()> {
    let records = audit_history.records()?;

    let rendered = match format {
        "csv" => history::export_csv(&records),
        "json" => history::export_json(&records)?,
        other => anyhow::bail!("unknown export format: {} (expected json or csv)", other),
    };

    match target {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write export file: {}", path))?;
            output.success(&format!("Exported {} records to {}", records.len(), path));
        }
        None => print!("{}", rendered),
    }

    Ok(())
}
