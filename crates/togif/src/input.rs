//! Expanding user-supplied patterns into an ordered list of PNG files.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use regex::Regex;
use togif_types::{TogifError, TogifResult};
use tracing::debug;

/// File extensions accepted as frame sources (compared case-insensitively)
pub const ALLOWED_EXTENSIONS: &[&str] = &["png"];

/// Characters that make a base name worth trying as a regular expression
const REGEX_META: &[char] = &['.', '*', '+', '?', '[', ']', '(', ')', '{', '}', '|'];

pub fn has_allowed_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

/// Resolve one pattern into a sorted list of PNG paths.
///
/// The part after the last `/` is the name pattern, the part before it the
/// directory (`.` when absent). Resolution tries, in order: the whole pattern
/// as a shell glob, the name as a regular expression searched within each
/// file name, and finally the name as a glob against each file name.
pub fn resolve_pattern(pattern: &str) -> TogifResult<Vec<PathBuf>> {
    let (dir, base) = split_pattern(pattern);
    let read_dir = dir.unwrap_or_else(|| Path::new("."));

    if !read_dir.is_dir() {
        return Err(TogifError::DirectoryMissing {
            dir: read_dir.to_path_buf(),
        });
    }

    let globbed = glob_matches(pattern);
    if !globbed.is_empty() {
        debug!(pattern = pattern, matches = globbed.len(), "Resolved as glob");
        return Ok(globbed);
    }

    if base.starts_with('^') || base.contains(REGEX_META) {
        let re = Regex::new(base).map_err(|e| TogifError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        let matches = png_entries(read_dir, dir, |name| re.is_match(name))?;
        if !matches.is_empty() {
            debug!(pattern = pattern, matches = matches.len(), "Resolved as regex");
            return Ok(matches);
        }
    }

    let matches = match glob::Pattern::new(base) {
        Ok(name_glob) => png_entries(read_dir, dir, |name| name_glob.matches(name))?,
        Err(_) => Vec::new(),
    };
    if matches.is_empty() {
        return Err(TogifError::NoMatches {
            pattern: pattern.to_string(),
        });
    }
    debug!(pattern = pattern, matches = matches.len(), "Resolved by directory scan");
    Ok(matches)
}

/// Resolve several patterns, keeping flag order and dropping repeated paths
pub fn resolve_patterns<S: AsRef<str>>(patterns: &[S]) -> TogifResult<Vec<PathBuf>> {
    let mut resolved = Vec::new();
    for pattern in patterns {
        resolved.extend(resolve_pattern(pattern.as_ref())?);
    }
    Ok(dedup_paths(resolved))
}

/// Keep the first occurrence of each file; `./a.png` and `a.png` are the same file
fn dedup_paths(paths: impl IntoIterator<Item = PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    paths
        .into_iter()
        .filter(|path| seen.insert(dedup_key(path)))
        .collect()
}

fn dedup_key(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

fn split_pattern(pattern: &str) -> (Option<&Path>, &str) {
    match pattern.rfind('/') {
        Some(0) => (Some(Path::new("/")), &pattern[1..]),
        Some(idx) => (Some(Path::new(&pattern[..idx])), &pattern[idx + 1..]),
        None => (None, pattern),
    }
}

fn glob_matches(pattern: &str) -> Vec<PathBuf> {
    let paths = match glob::glob(pattern) {
        Ok(paths) => paths,
        Err(_) => return Vec::new(),
    };
    let mut matches: Vec<PathBuf> = paths
        .filter_map(Result::ok)
        .filter(|p| p.is_file() && has_allowed_extension(p))
        .collect();
    matches.sort();
    matches
}

fn png_entries(
    read_dir: &Path,
    prefix: Option<&Path>,
    mut keep: impl FnMut(&str) -> bool,
) -> TogifResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(read_dir).map_err(|source| TogifError::Io {
        path: read_dir.to_path_buf(),
        source,
    })?;

    let mut matches = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| TogifError::Io {
            path: read_dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().map_or(false, |t| t.is_file()) {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !has_allowed_extension(Path::new(name)) || !keep(name) {
            continue;
        }
        matches.push(match prefix {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        });
    }
    matches.sort();
    Ok(matches)
}
