//! Diff classification and risk scoring

use super::history::{AuditHistory, AuditRecord};
use super::{DiffRequest, DiffResult, DiffSummary, FindingKey, ModifiedPair, RiskLevel};
use crate::patterns::Severity;
use crate::scanner::Finding;
use anyhow::Result;
use chrono::Utc;
use std::collections::HashMap;
use std::collections::VecDeque;
use uuid::Uuid;

/// Compares finding sets against stored baselines and records the result
pub struct DiffAuditor {
    history: AuditHistory,
}

impl DiffAuditor {
    pub fn new(history: AuditHistory) -> Self {
        Self { history }
    }

    pub fn history(&self) -> &AuditHistory {
        &self.history
    }

    /// Diff the request's current findings against the resolved baseline,
    /// append the audit record, and return the diff.
    pub fn audit(&self, request: &DiffRequest) -> Result<DiffResult> {
        let baseline = self.resolve_baseline(request)?;
        let diff = classify(&baseline, &request.current);

        let version = request
            .version
            .clone()
            .unwrap_or_else(generated_version_label);
        tracing::debug!(
            version = %version,
            added = diff.summary.total_added,
            removed = diff.summary.total_removed,
            risk = %diff.summary.risk_level,
            "audit recorded"
        );

        self.history.append(AuditRecord {
            version,
            timestamp: Utc::now(),
            secrets: request.current.clone(),
            diff: Some(diff.clone()),
        })?;

        Ok(diff)
    }

    /// Baseline priority: compare_to, since, version, latest. A missing
    /// baseline is the empty set, never an error.
    fn resolve_baseline(&self, request: &DiffRequest) -> Result<Vec<Finding>> {
        if let Some(explicit) = &request.compare_to {
            return Ok(explicit.clone());
        }

        let record = if let Some(since) = request.since {
            self.history.record_since(since)?
        } else if let Some(version) = &request.version {
            self.history.record_with_version(version)?
        } else {
            self.history.latest()?
        };

        Ok(record.map(|r| r.secrets).unwrap_or_default())
    }
}

fn generated_version_label() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("scan-{}", &id[..8])
}

/// Classify current findings against a baseline, keyed by
/// (file, line, pattern name). Findings sharing a key pair up positionally;
/// surplus on either side classifies as added/removed.
pub fn classify(baseline: &[Finding], current: &[Finding]) -> DiffResult {
    let mut pool: HashMap<FindingKey, VecDeque<Finding>> = HashMap::new();
    for finding in baseline {
        pool.entry(FindingKey::of(finding))
            .or_default()
            .push_back(finding.clone());
    }

    let mut added = Vec::new();
    let mut modified = Vec::new();
    let mut unchanged = Vec::new();

    for finding in current {
        let key = FindingKey::of(finding);
        match pool.get_mut(&key).and_then(|bucket| bucket.pop_front()) {
            Some(old) => {
                if old.value == finding.value
                    && old.entropy == finding.entropy
                    && old.pattern.severity == finding.pattern.severity
                {
                    unchanged.push(finding.clone());
                } else {
                    modified.push(ModifiedPair {
                        old,
                        new: finding.clone(),
                    });
                }
            }
            None => added.push(finding.clone()),
        }
    }

    let mut removed: Vec<Finding> = pool.into_values().flatten().collect();
    removed.sort_by(|a, b| {
        (&a.file, a.line, &a.pattern.name).cmp(&(&b.file, b.line, &b.pattern.name))
    });

    let risk_level = risk_level(&added, &modified);
    let summary = DiffSummary {
        total_added: added.len(),
        total_removed: removed.len(),
        total_modified: modified.len(),
        total_unchanged: unchanged.len(),
        risk_level,
    };

    DiffResult {
        added,
        removed,
        modified,
        unchanged,
        summary,
    }
}

/// The ordinal risk table. Counts additions plus severity-escalating
/// modifications (bucketed at the new severity):
/// any critical -> critical; more than two high -> high; any high or more
/// than five medium -> medium; otherwise low.
pub fn risk_level(added: &[Finding], modified: &[ModifiedPair]) -> RiskLevel {
    let mut critical = 0usize;
    let mut high = 0usize;
    let mut medium = 0usize;

    let escalated = modified
        .iter()
        .filter(|pair| pair.new.pattern.severity > pair.old.pattern.severity)
        .map(|pair| pair.new.pattern.severity);

    for severity in added.iter().map(|f| f.pattern.severity).chain(escalated) {
        match severity {
            Severity::Critical => critical += 1,
            Severity::High => high += 1,
            Severity::Medium => medium += 1,
            Severity::Low => {}
        }
    }

    if critical > 0 {
        RiskLevel::Critical
    } else if high > 2 {
        RiskLevel::High
    } else if high > 0 || medium > 5 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::history::MemoryStore;
    use crate::patterns::{PatternRef, Severity};
    use std::sync::Arc;

    fn finding(file: &str, line: usize, name: &str, value: &str, severity: Severity) -> Finding {
        Finding {
            file: file.to_string(),
            line,
            column: 1,
            pattern: PatternRef {
                name: name.to_string(),
                description: String::new(),
                severity,
            },
            value: value.to_string(),
            entropy: 4.0,
            context: Vec::new(),
        }
    }

    #[test]
    fn test_removed_only_diff_is_low_risk() {
        let baseline = vec![finding("a.js", 10, "GitHub Token", "ghp_x", Severity::Critical)];
        let diff = classify(&baseline, &[]);

        assert_eq!(diff.removed.len(), 1);
        assert_eq!(diff.added.len(), 0);
        assert_eq!(diff.summary.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_two_critical_additions_are_critical_risk() {
        let current = vec![
            finding("a.js", 1, "AWS Access Key", "AKIA1", Severity::Critical),
            finding("b.js", 2, "AWS Access Key", "AKIA2", Severity::Critical),
        ];
        let diff = classify(&[], &current);
        assert_eq!(diff.summary.risk_level, RiskLevel::Critical);
        assert_eq!(diff.summary.total_added, 2);
    }

    #[test]
    fn test_changed_value_is_modified_not_add_remove() {
        let baseline = vec![finding("a.js", 5, "Generic Secret", "oldvalue1234567", Severity::Medium)];
        let current = vec![finding("a.js", 5, "Generic Secret", "newvalue7654321", Severity::Medium)];

        let diff = classify(&baseline, &current);
        assert_eq!(diff.modified.len(), 1);
        assert!(diff.added.is_empty());
        assert!(diff.removed.is_empty());
        assert_eq!(diff.modified[0].old.value, "oldvalue1234567");
        assert_eq!(diff.modified[0].new.value, "newvalue7654321");
    }

    #[test]
    fn test_identical_findings_are_unchanged() {
        let baseline = vec![finding("a.js", 5, "GitHub Token", "ghp_x", Severity::Critical)];
        let diff = classify(&baseline, &baseline.clone());
        assert_eq!(diff.unchanged.len(), 1);
        assert_eq!(diff.summary.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_high_count_thresholds() {
        let highs =
            |n: usize| -> Vec<Finding> {
                (0..n)
                    .map(|i| finding("a.js", i + 1, "GitLab Token", "glpat-x", Severity::High))
                    .collect()
            };

        assert_eq!(classify(&[], &highs(1)).summary.risk_level, RiskLevel::Medium);
        assert_eq!(classify(&[], &highs(2)).summary.risk_level, RiskLevel::Medium);
        assert_eq!(classify(&[], &highs(3)).summary.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_medium_count_threshold() {
        let mediums = |n: usize| -> Vec<Finding> {
            (0..n)
                .map(|i| finding("a.js", i + 1, "JWT/JWE Token", "eyJx", Severity::Medium))
                .collect()
        };

        assert_eq!(classify(&[], &mediums(5)).summary.risk_level, RiskLevel::Low);
        assert_eq!(classify(&[], &mediums(6)).summary.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_risk_is_monotonic_under_critical_additions() {
        let mut current = vec![finding("a.js", 1, "GitLab Token", "glpat-x", Severity::High)];
        let before = classify(&[], &current).summary.risk_level;
        current.push(finding("b.js", 1, "AWS Access Key", "AKIA1", Severity::Critical));
        let after = classify(&[], &current).summary.risk_level;
        assert!(after >= before);
        assert_eq!(after, RiskLevel::Critical);
    }

    #[test]
    fn test_escalating_modification_counts_toward_risk() {
        let baseline = vec![finding("a.js", 5, "Generic Secret", "oldvalue1234567", Severity::Medium)];
        let mut escalated = finding("a.js", 5, "Generic Secret", "newvalue7654321", Severity::Medium);
        escalated.pattern.severity = Severity::Critical;

        let diff = classify(&baseline, &[escalated]);
        assert_eq!(diff.modified.len(), 1);
        assert_eq!(diff.summary.risk_level, RiskLevel::Critical);
    }

    #[test]
    fn test_auditor_records_each_audit() {
        let history = AuditHistory::new(Arc::new(MemoryStore::new()), 50);
        let auditor = DiffAuditor::new(history);

        let current = vec![finding("a.js", 1, "AWS Access Key", "AKIA1", Severity::Critical)];
        let diff = auditor
            .audit(&DiffRequest {
                version: Some("v1".to_string()),
                current: current.clone(),
                ..DiffRequest::default()
            })
            .unwrap();
        assert_eq!(diff.summary.total_added, 1);

        // Second audit with the same label diffs against the first record.
        let diff = auditor
            .audit(&DiffRequest {
                version: Some("v1".to_string()),
                current,
                ..DiffRequest::default()
            })
            .unwrap();
        assert_eq!(diff.summary.total_unchanged, 1);
        assert_eq!(diff.summary.total_added, 0);

        let records = auditor.history().records().unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_missing_baseline_is_all_additions() {
        let history = AuditHistory::new(Arc::new(MemoryStore::new()), 50);
        let auditor = DiffAuditor::new(history);

        let diff = auditor
            .audit(&DiffRequest {
                current: vec![finding("a.js", 1, "GitLab Token", "glpat-x", Severity::High)],
                ..DiffRequest::default()
            })
            .unwrap();
        assert_eq!(diff.summary.total_added, 1);
        assert_eq!(diff.summary.total_removed, 0);
    }
}
