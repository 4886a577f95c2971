//! Glob pattern utilities
//!
//! Unified glob pattern matching for resolving scan targets.

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Expand a list of file patterns (literal paths and glob patterns) into a
/// list of actual file paths under `base_dir`. An invalid glob is logged and
/// skipped; it never aborts resolution.
pub fn expand_file_patterns<P: AsRef<Path>>(
    patterns: &[String],
    base_dir: P,
) -> Result<Vec<PathBuf>> {
    let mut valid_paths = Vec::new();
    let base_dir = base_dir.as_ref();

    for pattern in patterns {
        if is_glob_pattern(pattern) {
            match expand_glob_pattern(pattern, base_dir) {
                Ok(glob_paths) => valid_paths.extend(glob_paths),
                Err(e) => {
                    tracing::warn!("Skipping invalid glob pattern '{}': {}", pattern, e);
                }
            }
        } else {
            let path = if Path::new(pattern).is_absolute() {
                PathBuf::from(pattern)
            } else {
                base_dir.join(pattern)
            };

            if path.is_file() {
                valid_paths.push(path);
            } else if path.is_dir() {
                // A bare directory means everything under it.
                for entry in WalkDir::new(&path).into_iter().filter_map(|e| e.ok()) {
                    if entry.path().is_file() {
                        valid_paths.push(entry.path().to_path_buf());
                    }
                }
            } else {
                tracing::warn!("Scan target not found: {}", path.display());
            }
        }
    }

    Ok(valid_paths)
}

/// Check if a string contains glob pattern characters
pub fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?') || pattern.contains('[')
}

/// Expand a single glob pattern to matching file paths
pub fn expand_glob_pattern<P: AsRef<Path>>(pattern: &str, base_dir: P) -> Result<Vec<PathBuf>> {
    let mut matching_paths = Vec::new();
    let base_dir = base_dir.as_ref();

    let glob = Glob::new(pattern)?;
    let matcher = glob.compile_matcher();

    for entry in WalkDir::new(base_dir).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.is_file() {
            // Check both absolute and relative paths
            let matches = matcher.is_match(path)
                || path
                    .strip_prefix(base_dir)
                    .ok()
                    .map(|rel_path| matcher.is_match(rel_path))
                    .unwrap_or(false);

            if matches {
                matching_paths.push(path.to_path_buf());
            }
        }
    }

    Ok(matching_paths)
}

/// Create a GlobSet from a list of patterns for efficient batch matching
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob =
            Glob::new(pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))?;
        builder.add(glob);
    }

    Ok(builder.build()?)
}

/// Like `build_globset`, but an invalid pattern is logged and skipped
/// instead of failing the whole set.
pub fn build_globset_lenient(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => {
                tracing::warn!("Skipping invalid glob pattern '{}': {}", pattern, e);
            }
        }
    }

    builder.build().unwrap_or_else(|e| {
        tracing::warn!("Failed to build glob set: {}", e);
        GlobSet::empty()
    })
}

/// Check a path against an exclude set, trying both the absolute path and the
/// path relative to `base_dir`.
pub fn is_excluded(path: &Path, base_dir: &Path, exclude: &GlobSet) -> bool {
    if exclude.is_match(path) {
        return true;
    }

    path.strip_prefix(base_dir)
        .map(|rel| exclude.is_match(rel))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_is_glob_pattern() {
        assert!(is_glob_pattern("*.rs"));
        assert!(is_glob_pattern("src/**/*.js"));
        assert!(is_glob_pattern("test?.txt"));
        assert!(is_glob_pattern("file[123].txt"));
        assert!(!is_glob_pattern("simple.txt"));
        assert!(!is_glob_pattern("path/to/file.rs"));
    }

    #[test]
    fn test_expand_file_patterns() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let base_path = temp_dir.path();

        fs::write(base_path.join("test1.rs"), "// test")?;
        fs::write(base_path.join("test2.js"), "// test")?;
        fs::write(base_path.join("readme.md"), "# readme")?;

        // Literal file patterns
        let patterns = vec!["test1.rs".to_string(), "readme.md".to_string()];
        let results = expand_file_patterns(&patterns, base_path)?;
        assert_eq!(results.len(), 2);

        // Glob patterns
        let patterns = vec!["*.rs".to_string()];
        let results = expand_file_patterns(&patterns, base_path)?;
        assert_eq!(results.len(), 1);
        assert!(results[0].to_string_lossy().contains("test1.rs"));

        Ok(())
    }

    #[test]
    fn test_exclude_matching() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let base_path = temp_dir.path();
        fs::create_dir_all(base_path.join("target"))?;
        fs::write(base_path.join("target/app.rs"), "// build artifact")?;
        fs::write(base_path.join("app.rs"), "// source")?;

        let exclude = build_globset(&["target/**".to_string()])?;
        assert!(is_excluded(&base_path.join("target/app.rs"), base_path, &exclude));
        assert!(!is_excluded(&base_path.join("app.rs"), base_path, &exclude));
        Ok(())
    }
}
