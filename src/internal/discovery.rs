//! Model file discovery: expands glob patterns into absolute file paths.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use wax::{Glob, Pattern};

use crate::internal::error::{LoaderError, LoaderResult};
use crate::utils::path;

/// Expands a single pattern into file paths.
pub trait FileDiscovery: Send + Sync {
    /// Files matching `pattern`. Relative patterns are evaluated from `working_dir`.
    fn discover(&self, pattern: &str, working_dir: &Path) -> LoaderResult<Vec<PathBuf>>;
}

/// Glob discovery backed by `wax` patterns and a `walkdir` traversal.
///
/// Only regular files are returned, sorted by path within each pattern.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobDiscovery;

impl FileDiscovery for GlobDiscovery {
    fn discover(&self, pattern: &str, working_dir: &Path) -> LoaderResult<Vec<PathBuf>> {
        let (prefix, rest) = path::split_literal_prefix(&path::normalize_globstar(pattern));
        let base = working_dir.join(prefix);

        if rest.is_empty() {
            return Ok(if base.is_file() { vec![base] } else { Vec::new() });
        }

        let glob = Glob::new(&rest).map_err(|e| LoaderError::Glob {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        if !base.is_dir() {
            tracing::debug!(pattern, base = %base.display(), "glob base does not exist");
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&base).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&base) else {
                continue;
            };
            if glob.is_match(relative) {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }
}

/// Expand every pattern in order and concatenate the results.
///
/// A file matched by several patterns appears once per match. Every path in
/// the result is absolute.
pub fn discover_all(
    discovery: &dyn FileDiscovery,
    patterns: &[String],
    working_dir: &Path,
) -> LoaderResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let matched = discovery.discover(pattern, working_dir)?;
        tracing::debug!(pattern = %pattern, count = matched.len(), "expanded model glob");
        for file in matched {
            files.push(path::resolve(&file, working_dir)?);
        }
    }
    Ok(files)
}
