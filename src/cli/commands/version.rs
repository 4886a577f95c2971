//! Version command implementation

use crate::cli::Output;
use anyhow::Result;

/// Execute the version command
pub async fn execute(output: &Output) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let name = env!("CARGO_PKG_NAME");
    let description = env!("CARGO_PKG_DESCRIPTION");

    output.header("Version Information");
    output.table_row("Version:", &format!("{} v{}", name, version));
    output.table_row("Description:", description);
    output.table_row("Rust edition:", "2024");
    output.table_row(
        "Profile:",
        if cfg!(debug_assertions) { "debug" } else { "release" },
    );
    output.blank_line();
    output.success("Run 'driftscan --help' for usage information");

    Ok(())
}
