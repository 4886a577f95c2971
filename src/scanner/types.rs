//! Scanner data types

use crate::patterns::PatternRef;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// A single detected secret occurrence
///
/// Identity for deduplication is (file, line, column, value); identity for
/// diffing is (file, line, pattern name) and deliberately excludes the value,
/// so a changed value at a stable location classifies as a modification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// File identifier (path or inline unit name)
    pub file: String,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
    /// The pattern that matched, or the high-entropy pseudo-pattern
    pub pattern: PatternRef,
    /// Literal matched value
    pub value: String,
    /// Shannon entropy of the value
    pub entropy: f64,
    /// Surrounding lines (window of N before/after the match line)
    pub context: Vec<String>,
}

impl Finding {
    /// Key under which duplicate detections of the same occurrence collapse.
    pub fn dedup_key(&self) -> (&str, usize, usize, &str) {
        (&self.file, self.line, self.column, &self.value)
    }
}

/// Inline content entry supplied in a ScanRequest, bypassing the filesystem
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineContent {
    pub file: String,
    pub content: String,
}

/// One unit of scannable content
///
/// File-backed and inline units route through the same matching routine;
/// file units are read once into memory first.
#[derive(Debug, Clone)]
pub enum ContentUnit {
    FileRef(PathBuf),
    Inline { name: String, text: String },
}

impl ContentUnit {
    pub fn name(&self) -> String {
        match self {
            ContentUnit::FileRef(path) => path.display().to_string(),
            ContentUnit::Inline { name, .. } => name.clone(),
        }
    }
}

/// Policy for tokens flagged by both a named pattern and the entropy sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapPolicy {
    /// Keep both findings (defense-in-depth).
    #[default]
    KeepBoth,
    /// Drop the high-entropy finding when a named pattern flagged the same
    /// (file, line, value).
    PreferNamed,
}

/// Parameters for one scan
#[derive(Debug, Clone)]
pub struct ScanRequest {
    /// Include globs or literal paths, resolved under `root`
    pub include: Vec<String>,
    /// Exclude globs
    pub exclude: Vec<String>,
    /// Minimum entropy for the generic high-entropy sweep
    pub entropy_threshold: f64,
    /// Per-file size cap in bytes
    pub max_file_size: u64,
    /// Wall-clock budget for the whole scan
    pub timeout: Duration,
    /// Context lines captured before/after each match
    pub context_lines: usize,
    pub overlap_policy: OverlapPolicy,
    /// Base directory for glob resolution
    pub root: PathBuf,
    /// Inline content entries; these bypass filesystem resolution
    pub contents: Vec<InlineContent>,
}

impl Default for ScanRequest {
    fn default() -> Self {
        Self {
            include: vec!["**/*".to_string()],
            exclude: Vec::new(),
            entropy_threshold: 3.5,
            max_file_size: 1_048_576,
            timeout: Duration::from_millis(30_000),
            context_lines: 2,
            overlap_policy: OverlapPolicy::default(),
            root: PathBuf::from("."),
            contents: Vec::new(),
        }
    }
}

impl ScanRequest {
    /// Request that scans only the given inline entries.
    pub fn inline(contents: Vec<InlineContent>) -> Self {
        Self {
            include: Vec::new(),
            contents,
            ..Self::default()
        }
    }
}

/// Statistics from a scanning operation
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanStats {
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub total_findings: usize,
    pub scan_duration_ms: u64,
}

/// Result of a scanning operation
///
/// `timed_out` marks a valid partial result: the deadline passed before every
/// unit was scanned. It is not an error.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub findings: Vec<Finding>,
    pub stats: ScanStats,
    pub timed_out: bool,
}
