//! Audit trail for secret scans
//!
//! Diffs a scan's findings against a stored baseline, classifies the changes,
//! and persists the resulting record in a bounded history.

pub mod diff;
pub mod history;

pub use diff::DiffAuditor;
pub use history::{AuditHistory, AuditRecord, HistoryStore, JsonFileStore, MemoryStore};

use crate::scanner::Finding;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity key correlating findings across scans
///
/// Deliberately excludes the matched value: a changed value at a stable
/// location is a modification, not an add/remove pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FindingKey {
    pub file: String,
    pub line: usize,
    pub pattern_name: String,
}

impl FindingKey {
    pub fn of(finding: &Finding) -> Self {
        Self {
            file: finding.file.clone(),
            line: finding.line,
            pattern_name: finding.pattern.name.clone(),
        }
    }
}

/// Request to diff a current finding set against a baseline
///
/// Baseline priority: `compare_to`, then `since`, then `version`, then the
/// most recent stored record. No resolvable baseline means an empty one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiffRequest {
    pub since: Option<DateTime<Utc>>,
    pub version: Option<String>,
    pub current: Vec<Finding>,
    pub compare_to: Option<Vec<Finding>>,
}

/// A finding whose identity survived but whose content changed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifiedPair {
    pub old: Finding,
    pub new: Finding,
}

/// Ordinal risk classification summarizing a diff
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
            RiskLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Count summary attached to every diff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffSummary {
    pub total_added: usize,
    pub total_removed: usize,
    pub total_modified: usize,
    pub total_unchanged: usize,
    pub risk_level: RiskLevel,
}

/// Classification of how a finding set changed relative to its baseline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffResult {
    pub added: Vec<Finding>,
    pub removed: Vec<Finding>,
    pub modified: Vec<ModifiedPair>,
    pub unchanged: Vec<Finding>,
    pub summary: DiffSummary,
}
