//! # driftscan - Secret Detection with an Audit Trail
//!
//! driftscan scans text content for credential-shaped or high-entropy
//! substrings, classifies them by severity, and tracks how the detected set
//! changes across successive scans.
//!
//! ## Features
//!
//! - **Pattern + entropy detection**: a curated rule set plus a generic
//!   high-entropy sweep with false-positive suppression
//! - **Audit trail**: version-over-version diffs with a deterministic risk
//!   classification, persisted in a bounded history
//! - **Bounded scans**: wall-clock timeouts yield partial results instead of
//!   failures
//! - **Parallel**: files are scanned on a bounded worker pool
//!
//! ## Quick Start
//!
//! ```bash
//! # Scan the working tree
//! driftscan scan
//!
//! # Record an audit point and diff against the previous one
//! driftscan audit run --label v1.2.0
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod entropy;
pub mod parallel;
pub mod patterns;
pub mod report;
pub mod scanner;
pub mod shared;

pub use cli::{Cli, Output};
pub use config::DriftscanConfig;

/// Result type alias for driftscan operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
