//! Finding deduplication and overlap filtering
//!
//! Applied once, after all matching passes. Duplicate detections collapse
//! only when their full dedup key (file, line, column, value) is identical;
//! a named-pattern finding and an entropy-sweep finding on the same token
//! carry different pattern labels and are governed by the overlap policy
//! instead.

use super::types::{Finding, OverlapPolicy};
use crate::patterns::HIGH_ENTROPY_PATTERN_NAME;
use std::collections::HashSet;

/// Dedup, then apply the overlap policy.
pub fn finalize(findings: Vec<Finding>, policy: OverlapPolicy) -> Vec<Finding> {
    apply_overlap_policy(dedup_findings(findings), policy)
}

/// Remove findings sharing an identical dedup key, keeping first occurrence.
pub fn dedup_findings(findings: Vec<Finding>) -> Vec<Finding> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(findings.len());

    for finding in findings {
        let key = (
            finding.file.clone(),
            finding.line,
            finding.column,
            finding.value.clone(),
        );
        if seen.insert(key) {
            unique.push(finding);
        } else {
            tracing::trace!(file = %finding.file, line = finding.line, "duplicate finding dropped");
        }
    }

    unique
}

/// Under `PreferNamed`, drop entropy-sweep findings whose (file, line, value)
/// was also flagged by a named pattern. `KeepBoth` returns the input as is.
pub fn apply_overlap_policy(findings: Vec<Finding>, policy: OverlapPolicy) -> Vec<Finding> {
    match policy {
        OverlapPolicy::KeepBoth => findings,
        OverlapPolicy::PreferNamed => {
            let named: HashSet<(String, usize, String)> = findings
                .iter()
                .filter(|f| f.pattern.name != HIGH_ENTROPY_PATTERN_NAME)
                .map(|f| (f.file.clone(), f.line, f.value.clone()))
                .collect();

            findings
                .into_iter()
                .filter(|f| {
                    f.pattern.name != HIGH_ENTROPY_PATTERN_NAME
                        || !named.contains(&(f.file.clone(), f.line, f.value.clone()))
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::{PatternRef, Severity, high_entropy_pattern_ref};

    fn finding(file: &str, line: usize, column: usize, value: &str, pattern: PatternRef) -> Finding {
        Finding {
            file: file.to_string(),
            line,
            column,
            pattern,
            value: value.to_string(),
            entropy: 4.2,
            context: Vec::new(),
        }
    }

    fn named(name: &str) -> PatternRef {
        PatternRef {
            name: name.to_string(),
            description: String::new(),
            severity: Severity::High,
        }
    }

    #[test]
    fn test_identical_dedup_keys_collapse() {
        let findings = vec![
            finding("a.js", 3, 7, "tok", named("GitHub Token")),
            finding("a.js", 3, 7, "tok", named("GitHub Token")),
        ];
        assert_eq!(dedup_findings(findings).len(), 1);
    }

    #[test]
    fn test_different_columns_survive_dedup() {
        let findings = vec![
            finding("a.js", 3, 7, "tok", named("GitHub Token")),
            finding("a.js", 3, 9, "tok", named("GitHub Token")),
        ];
        assert_eq!(dedup_findings(findings).len(), 2);
    }

    #[test]
    fn test_no_shared_dedup_keys_after_finalize() {
        let findings = vec![
            finding("a.js", 1, 1, "x", named("A")),
            finding("a.js", 1, 1, "x", named("B")),
            finding("a.js", 1, 1, "x", named("A")),
        ];
        let result = finalize(findings, OverlapPolicy::KeepBoth);
        let mut keys = HashSet::new();
        for f in &result {
            assert!(keys.insert((f.file.clone(), f.line, f.column, f.value.clone())));
        }
    }

    #[test]
    fn test_prefer_named_drops_entropy_twin() {
        let findings = vec![
            finding("a.js", 3, 15, "g9Xq2LmV7RtY4wZa", named("Generic Secret")),
            finding("a.js", 3, 15, "g9Xq2LmV7RtY4wZa", high_entropy_pattern_ref()),
        ];

        let kept = apply_overlap_policy(findings.clone(), OverlapPolicy::KeepBoth);
        assert_eq!(kept.len(), 2);

        let preferred = apply_overlap_policy(findings, OverlapPolicy::PreferNamed);
        assert_eq!(preferred.len(), 1);
        assert_eq!(preferred[0].pattern.name, "Generic Secret");
    }

    #[test]
    fn test_prefer_named_keeps_lone_entropy_finding() {
        let findings = vec![finding(
            "a.js",
            8,
            1,
            "zZk93hfQ2LmXw",
            high_entropy_pattern_ref(),
        )];
        let result = apply_overlap_policy(findings, OverlapPolicy::PreferNamed);
        assert_eq!(result.len(), 1);
    }
}
