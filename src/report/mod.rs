//! Deterministic report rendering
//!
//! Pure formatting over finding lists and diffs: no side effects, no I/O.
//! Findings group by severity tier (critical first); entries keep their input
//! order within a tier.

use crate::audit::DiffResult;
use crate::patterns::Severity;
use crate::scanner::Finding;
use std::fmt::Write as _;

const TIERS: [Severity; 4] = [
    Severity::Critical,
    Severity::High,
    Severity::Medium,
    Severity::Low,
];

/// Render a finding list grouped by severity tier.
pub fn render_findings(findings: &[Finding]) -> String {
    if findings.is_empty() {
        return "No secrets detected.\n".to_string();
    }

    let mut out = String::new();
    for tier in TIERS {
        let entries: Vec<&Finding> = findings
            .iter()
            .filter(|f| f.pattern.severity == tier)
            .collect();
        if entries.is_empty() {
            continue;
        }

        let _ = writeln!(out, "{} ({})", tier, entries.len());
        for finding in entries {
            let _ = writeln!(out, "  {}", finding_line(finding));
        }
    }

    out
}

/// Render a diff: added/removed/modified sections plus the summary.
pub fn render_diff(diff: &DiffResult) -> String {
    let mut out = String::new();

    render_section(&mut out, "Added", &diff.added);
    render_section(&mut out, "Removed", &diff.removed);

    if !diff.modified.is_empty() {
        let _ = writeln!(out, "Modified ({})", diff.modified.len());
        for pair in &diff.modified {
            let _ = writeln!(out, "  {}", finding_line(&pair.new));
        }
    }

    let summary = &diff.summary;
    let _ = writeln!(
        out,
        "Summary: {} added, {} removed, {} modified, {} unchanged",
        summary.total_added, summary.total_removed, summary.total_modified, summary.total_unchanged
    );
    let _ = writeln!(out, "Risk level: {}", summary.risk_level);

    out
}

fn render_section(out: &mut String, title: &str, findings: &[Finding]) {
    if findings.is_empty() {
        return;
    }

    let _ = writeln!(out, "{} ({})", title, findings.len());
    for tier in TIERS {
        for finding in findings.iter().filter(|f| f.pattern.severity == tier) {
            let _ = writeln!(out, "  {}", finding_line(finding));
        }
    }
}

fn finding_line(finding: &Finding) -> String {
    format!(
        "{}:{} - {}",
        finding.file, finding.line, finding.pattern.name
    )
}
