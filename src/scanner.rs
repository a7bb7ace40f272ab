//! # Source Scanner
//!
//! Walks a target's source directory and yields every file with a recognized
//! source extension. Entries are visited in file-name order at every level so
//! the resulting dispatch table, and therefore the generated file, does not
//! depend on the platform's directory listing order.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::config::GeneratorConfig;
use crate::generator::GenerateError;
use crate::table::PipelineKind;

/// Lazily enumerate the source files of a target.
///
/// `source_dir` is the absolute directory to walk. Files matching `skip` (the
/// target's own generated output) are never yielded. A missing `source_dir`
/// fails with [`GenerateError::MissingSourceDir`] before anything is read.
pub fn scan_sources<'a>(
    kind: PipelineKind,
    source_dir: &Path,
    config: &'a GeneratorConfig,
    skip: Option<&'a Path>,
) -> anyhow::Result<impl Iterator<Item = anyhow::Result<PathBuf>> + 'a> {
    if !source_dir.is_dir() {
        return Err(GenerateError::MissingSourceDir {
            target: kind,
            path: source_dir.to_path_buf(),
        }
        .into());
    }

    let walker = WalkDir::new(source_dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |entry| !is_excluded(entry, config));

    Ok(walker.filter_map(move |entry| match entry {
        Ok(entry) => {
            if !entry.file_type().is_file() || !config.is_source_file(entry.path()) {
                return None;
            }
            if skip.is_some_and(|skip| skip == entry.path()) {
                tracing::debug!(path = %entry.path().display(), "Skipping generated output");
                return None;
            }
            Some(Ok(entry.into_path()))
        }
        Err(err) => Some(Err(anyhow::Error::new(err).context("Failed to walk source directory"))),
    }))
}

fn is_excluded(entry: &DirEntry, config: &GeneratorConfig) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| config.exclude.iter().any(|ex| ex == name))
}
