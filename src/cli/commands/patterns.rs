//! Patterns command implementation

use anyhow::Result;

use crate::cli::Output;
use crate::config::DriftscanConfig;
use crate::patterns::PatternRegistry;

/// List the active detection patterns
pub async fn execute(config_path: Option<&str>, output: &Output) -> Result<()> {
    let config = DriftscanConfig::load_with_custom_config(config_path)?;
    let registry = PatternRegistry::from_config(&config.patterns, &config.allowlist)?;

    output.header("Detection Patterns");
    for pattern in registry.patterns() {
        let gate = pattern
            .min_entropy
            .map(|g| format!("  entropy >= {g}"))
            .unwrap_or_default();
        output.table_row(&pattern.name, &format!("{}{}", pattern.severity, gate));
    }
    output.blank_line();
    output.count("»", "Active patterns", registry.pattern_count());

    Ok(())
}
