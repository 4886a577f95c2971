//! Configuration management
//!
//! Typed configuration merged by figment from embedded defaults, a
//! `driftscan.toml` in the working directory (or an explicit `--config`
//! file in TOML/JSON/YAML), and `DRIFTSCAN_*` environment variables.

use crate::patterns::PatternConfig;
use crate::scanner::{OverlapPolicy, ScanRequest};
use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Json, Toml, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DriftscanConfig {
    pub scanner: ScannerConfig,
    pub history: HistoryConfig,

    /// Exact literal values that must never be reported, for any pattern.
    #[serde(default)]
    pub allowlist: Vec<String>,

    /// Custom detection rules, merged after the built-in set.
    #[serde(default)]
    pub patterns: Vec<PatternConfig>,
}

/// Scanner thresholds and filters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Minimum entropy for the generic high-entropy sweep
    pub entropy_threshold: f64,

    /// Per-file size cap in bytes
    pub max_file_size: u64,

    /// Wall-clock budget for a whole scan, in milliseconds
    pub timeout_ms: u64,

    /// Context lines captured before/after each match
    pub context_lines: usize,

    /// Policy for tokens flagged by both a named pattern and the sweep
    pub overlap_policy: OverlapPolicy,

    /// Globs excluded from every scan
    pub exclude: Vec<String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            entropy_threshold: 3.5,
            max_file_size: 1_048_576,
            timeout_ms: 30_000,
            context_lines: 2,
            overlap_policy: OverlapPolicy::KeepBoth,
            exclude: Vec::new(),
        }
    }
}

/// Audit history location and bound
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    pub path: String,
    pub cap: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: ".driftscan/history.json".to_string(),
            cap: 50,
        }
    }
}

impl DriftscanConfig {
    pub fn load() -> Result<Self> {
        Self::load_with_custom_config(None)
    }

    pub fn load_with_custom_config(custom_config: Option<&str>) -> Result<Self> {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG)); // Embedded defaults

        // If a custom config is specified, use only that + defaults + env vars
        if let Some(custom_path) = custom_config {
            figment = figment
                .merge(Toml::file(custom_path))
                .merge(Json::file(custom_path))
                .merge(Yaml::file(custom_path));
        } else {
            figment = figment
                .merge(Toml::file("driftscan.toml"))
                .merge(Json::file("driftscan.json"))
                .merge(Yaml::file("driftscan.yaml"));
        }

        // Environment variables always have highest priority
        figment = figment.merge(Env::prefixed("DRIFTSCAN_"));

        figment.extract().context("Failed to load configuration")
    }

    /// Scan request seeded from this configuration, targeting `root`.
    pub fn scan_request(&self, root: PathBuf) -> ScanRequest {
        ScanRequest {
            include: vec!["**/*".to_string()],
            exclude: self.scanner.exclude.clone(),
            entropy_threshold: self.scanner.entropy_threshold,
            max_file_size: self.scanner.max_file_size,
            timeout: Duration::from_millis(self.scanner.timeout_ms),
            context_lines: self.scanner.context_lines,
            overlap_policy: self.scanner.overlap_policy,
            root,
            contents: Vec::new(),
        }
    }
}
