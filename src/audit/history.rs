//! Bounded, queryable audit history
//!
//! The history is an append-only log of audit records behind a storage
//! trait, so a flat JSON file, an embedded kv store, or a database can back
//! it without touching the diff logic. Writers are serialized; readers get
//! consistent snapshots via `load()`.

use super::DiffResult;
use crate::scanner::Finding;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// One audited scan: version label, timestamp, findings, optional diff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub secrets: Vec<Finding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<DiffResult>,
}

/// Storage backend for the audit history
pub trait HistoryStore: Send + Sync {
    fn load(&self) -> Result<Vec<AuditRecord>>;
    fn append(&self, record: &AuditRecord) -> Result<()>;
    /// Drop oldest records until at most `cap` remain.
    fn evict_to(&self, cap: usize) -> Result<()>;
}

/// Flat pretty-JSON file store
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, records: &[AuditRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create history directory: {}", parent.display())
                })?;
            }
        }

        let json = serde_json::to_string_pretty(records)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write history file: {}", self.path.display()))
    }
}

impl HistoryStore for JsonFileStore {
    fn load(&self) -> Result<Vec<AuditRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read history file: {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Malformed history file: {}", self.path.display()))
    }

    fn append(&self, record: &AuditRecord) -> Result<()> {
        let mut records = self.load()?;
        records.push(record.clone());
        self.write(&records)
    }

    fn evict_to(&self, cap: usize) -> Result<()> {
        let mut records = self.load()?;
        if records.len() > cap {
            let excess = records.len() - cap;
            records.drain(..excess);
            tracing::debug!(evicted = excess, cap, "audit history trimmed");
            self.write(&records)?;
        }
        Ok(())
    }
}

/// In-memory store, for tests and embedding
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<AuditRecord>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl HistoryStore for MemoryStore {
    fn load(&self) -> Result<Vec<AuditRecord>> {
        Ok(self.lock().clone())
    }

    fn append(&self, record: &AuditRecord) -> Result<()> {
        self.lock().push(record.clone());
        Ok(())
    }

    fn evict_to(&self, cap: usize) -> Result<()> {
        let mut records = self.lock();
        if records.len() > cap {
            let excess = records.len() - cap;
            records.drain(..excess);
        }
        Ok(())
    }
}

/// The bounded audit log
///
/// Append-only except for eviction past the cap. A single writer lock
/// serializes append+evict; readers work off `load()` snapshots and may run
/// concurrently with writers.
pub struct AuditHistory {
    store: Arc<dyn HistoryStore>,
    cap: usize,
    writer: Mutex<()>,
}

impl AuditHistory {
    pub const DEFAULT_CAP: usize = 50;

    pub fn new(store: Arc<dyn HistoryStore>, cap: usize) -> Self {
        Self {
            store,
            cap: cap.max(1),
            writer: Mutex::new(()),
        }
    }

    pub fn append(&self, record: AuditRecord) -> Result<()> {
        let _guard = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        self.store.append(&record)?;
        self.store.evict_to(self.cap)
    }

    /// Full snapshot, oldest first.
    pub fn records(&self) -> Result<Vec<AuditRecord>> {
        self.store.load()
    }

    /// The most recent `n` records, oldest of those first.
    pub fn recent(&self, n: usize) -> Result<Vec<AuditRecord>> {
        let records = self.store.load()?;
        let start = records.len().saturating_sub(n);
        Ok(records[start..].to_vec())
    }

    pub fn latest(&self) -> Result<Option<AuditRecord>> {
        Ok(self.store.load()?.pop())
    }

    /// The most recent record stamped at or after `since`.
    pub fn record_since(&self, since: DateTime<Utc>) -> Result<Option<AuditRecord>> {
        let records = self.store.load()?;
        Ok(records
            .into_iter()
            .filter(|r| r.timestamp >= since)
            .next_back())
    }

    /// The most recent record carrying `version`.
    pub fn record_with_version(&self, version: &str) -> Result<Option<AuditRecord>> {
        let records = self.store.load()?;
        Ok(records.into_iter().rev().find(|r| r.version == version))
    }
}

/// Export records as pretty JSON.
pub fn export_json(records: &[AuditRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Export records as CSV with the audit-trail columns. Records without an
/// attached diff leave the diff-derived columns empty.
pub fn export_csv(records: &[AuditRecord]) -> String {
    let mut out = String::from("Version,Timestamp,Total Secrets,Added,Removed,Modified,Risk Level\n");

    for record in records {
        let (added, removed, modified, risk) = match &record.diff {
            Some(diff) => (
                diff.summary.total_added.to_string(),
                diff.summary.total_removed.to_string(),
                diff.summary.total_modified.to_string(),
                diff.summary.risk_level.to_string(),
            ),
            None => (String::new(), String::new(), String::new(), String::new()),
        };

        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{}",
            csv_field(&record.version),
            record.timestamp.to_rfc3339(),
            record.secrets.len(),
            added,
            removed,
            modified,
            risk
        );
    }

    out
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{DiffSummary, RiskLevel};
    use chrono::Duration;
    use tempfile::TempDir;

    fn record(version: &str, offset_minutes: i64) -> AuditRecord {
        AuditRecord {
            version: version.to_string(),
            timestamp: Utc::now() + Duration::minutes(offset_minutes),
            secrets: Vec::new(),
            diff: None,
        }
    }

    fn record_with_diff(version: &str) -> AuditRecord {
        AuditRecord {
            version: version.to_string(),
            timestamp: Utc::now(),
            secrets: Vec::new(),
            diff: Some(DiffResult {
                added: Vec::new(),
                removed: Vec::new(),
                modified: Vec::new(),
                unchanged: Vec::new(),
                summary: DiffSummary {
                    total_added: 2,
                    total_removed: 1,
                    total_modified: 0,
                    total_unchanged: 3,
                    risk_level: RiskLevel::Medium,
                },
            }),
        }
    }

    #[test]
    fn test_eviction_past_cap() {
        let history = AuditHistory::new(Arc::new(MemoryStore::new()), 3);
        for i in 0..5 {
            history.append(record(&format!("v{i}"), i)).unwrap();
        }

        let records = history.records().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].version, "v2");
        assert_eq!(records[2].version, "v4");
    }

    #[test]
    fn test_recent_query() {
        let history = AuditHistory::new(Arc::new(MemoryStore::new()), 50);
        for i in 0..5 {
            history.append(record(&format!("v{i}"), i)).unwrap();
        }

        let recent = history.recent(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].version, "v3");
        assert_eq!(recent[1].version, "v4");
    }

    #[test]
    fn test_since_and_version_lookup() {
        let history = AuditHistory::new(Arc::new(MemoryStore::new()), 50);
        let base = Utc::now();
        for i in 0..4 {
            history.append(record(&format!("v{i}"), i * 10)).unwrap();
        }

        let hit = history
            .record_since(base + Duration::minutes(15))
            .unwrap()
            .unwrap();
        assert_eq!(hit.version, "v3");

        let hit = history.record_with_version("v1").unwrap().unwrap();
        assert_eq!(hit.version, "v1");
        assert!(history.record_with_version("nope").unwrap().is_none());
    }

    #[test]
    fn test_json_file_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/history.json");

        let store = JsonFileStore::new(&path);
        store.append(&record("v0", 0)).unwrap();
        store.append(&record("v1", 1)).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].version, "v1");

        store.evict_to(1).unwrap();
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn test_csv_export_shape() {
        let csv = export_csv(&[record_with_diff("v1"), record("plain", 0)]);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "Version,Timestamp,Total Secrets,Added,Removed,Modified,Risk Level"
        );
        assert!(lines[1].starts_with("v1,"));
        assert!(lines[1].ends_with(",2,1,0,MEDIUM"));
        assert!(lines[2].ends_with(",0,,,,"));
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("has,comma"), "\"has,comma\"");
        assert_eq!(csv_field("has\"quote"), "\"has\"\"quote\"");
    }
}
