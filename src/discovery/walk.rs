use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::profile::LanguageProfile;

use super::types::FileSet;

/// Walk `root` and collect every regular file matching one of the profile's
/// include globs and none of its exclude globs.
///
/// Excluded directories are pruned, never descended into. Globs match the
/// root-relative path with `/` separators.
pub fn discover(root: &Path, profile: &LanguageProfile) -> Result<FileSet> {
    let include = build_globset(&profile.include)?;
    let exclude = build_globset(&profile.exclude)?;
    let prune = build_globset(&directory_patterns(&profile.exclude))?;

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_pruned(root, e, &prune));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("skipping unreadable path: {e}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(rel) = relative(root, entry.path()) else {
            continue;
        };
        if include.is_match(&rel) && !exclude.is_match(&rel) {
            files.push(PathBuf::from(rel));
        }
    }

    debug!(profile = %profile.name, files = files.len(), "discovered files");
    Ok(FileSet::new(files))
}

/// Resolve an explicit shell script supplied by the caller.
///
/// The path bypasses include/exclude filtering but must name an existing
/// file inside `root`, since that is all a container can see.
pub fn script_override(root: &Path, script: &Path) -> Result<FileSet> {
    let absolute = if script.is_absolute() {
        script.to_path_buf()
    } else {
        root.join(script)
    };
    if !absolute.is_file() {
        return Err(Error::ScriptNotFound(absolute));
    }
    let rel = absolute.strip_prefix(root).map_err(|_| {
        Error::Config(format!(
            "script override must be inside the scan root: {}",
            absolute.display()
        ))
    })?;
    Ok(FileSet::new(vec![rel.to_path_buf()]))
}

fn is_pruned(root: &Path, entry: &walkdir::DirEntry, exclude: &GlobSet) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    relative(root, entry.path()).is_some_and(|rel| exclude.is_match(&rel))
}

/// Exclude patterns plus the directory each `dir/**` pattern names, so the
/// directory itself is pruned and not just its contents.
fn directory_patterns(exclude: &[String]) -> Vec<String> {
    let mut patterns = exclude.to_vec();
    for pattern in exclude {
        if let Some(dir) = pattern.strip_suffix("/**")
            && !dir.is_empty()
        {
            patterns.push(dir.to_string());
        }
    }
    patterns
}

fn relative(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| Error::Glob {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| Error::Glob {
        pattern: patterns.join(", "),
        source,
    })
}
