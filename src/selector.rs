//! File selection from include/exclude glob patterns

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{MutationError, Result};

/// Resolve patterns to the set of files to mutate
///
/// Relative patterns are resolved against `root`. The result is the union of
/// all include expansions minus the union of all exclude expansions, sorted
/// and without duplicates. Directories are dropped.
pub fn select_files(root: &Path, include: &[String], exclude: &[String]) -> Result<Vec<PathBuf>> {
    let included = expand_all(root, include)?;
    let excluded = expand_all(root, exclude)?;

    Ok(included
        .difference(&excluded)
        .filter(|path| !path.is_dir())
        .cloned()
        .collect())
}

/// Check a pattern without touching the filesystem
pub fn validate_pattern(pattern: &str) -> Result<()> {
    glob::Pattern::new(pattern)
        .map(|_| ())
        .map_err(|e| invalid_pattern(pattern, e))
}

fn expand_all(root: &Path, patterns: &[String]) -> Result<BTreeSet<PathBuf>> {
    let mut paths = BTreeSet::new();
    for pattern in patterns {
        paths.extend(expand(root, pattern)?);
    }
    Ok(paths)
}

fn expand(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let full_pattern = if Path::new(pattern).is_absolute() {
        PathBuf::from(pattern)
    } else {
        root.join(pattern)
    };
    let pattern_str = full_pattern.to_string_lossy();

    let entries = glob::glob(&pattern_str).map_err(|e| invalid_pattern(pattern, e))?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => paths.push(path),
            Err(e) => debug!("skipping unreadable entry while expanding '{}': {}", pattern, e),
        }
    }

    if paths.is_empty() {
        debug!("pattern '{}' matched nothing", pattern);
    }
    Ok(paths)
}

fn invalid_pattern(pattern: &str, error: glob::PatternError) -> MutationError {
    MutationError::InvalidPattern {
        pattern: pattern.to_string(),
        error: error.to_string(),
    }
}
