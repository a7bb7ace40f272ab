use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

use super::error::GenerateError;
use super::templates::{render_target, write_generated};
use crate::config::GeneratorConfig;
use crate::extract::extract_file;
use crate::linter::{lint_table, LintIssue};
use crate::scanner::scan_sources;
use crate::syntax::{Dialect, SourceParser};
use crate::table::{DispatchTable, PipelineKind};

/// What happened to one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOutcome {
    /// Target switched off in the configuration.
    Disabled,
    /// Source directory missing; nothing was written.
    Skipped { source_dir: PathBuf },
    /// Output rewritten from a fresh scan.
    Written { path: PathBuf, records: usize },
    /// Rendered but not written (`--dry-run`).
    DryRun { path: PathBuf, contents: String },
    /// On-disk output matches a fresh render (`check`).
    UpToDate { path: PathBuf },
}

/// Scan the source directory of `kind` and build its dispatch table.
///
/// Conflicts are not checked here; see [`prepare_target`].
pub fn build_table(
    kind: PipelineKind,
    root: &Path,
    config: &GeneratorConfig,
) -> anyhow::Result<DispatchTable> {
    let source_dir = root.join(config.source_dir(kind));
    let output = root.join(config.output(kind));
    let mut parser = SourceParser::new()?;
    let mut table = DispatchTable::new();

    for path in scan_sources(kind, &source_dir, config, Some(&output))? {
        let path = path?;
        let source = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read source file {path:?}"))?;
        let tree = parser
            .parse(&source, Dialect::for_path(&path))
            .with_context(|| format!("Failed to parse {path:?}"))?;
        let module = path.strip_prefix(root).unwrap_or(&path);
        let facts = extract_file(&tree, &source, module, kind);
        tracing::debug!(
            file = %module.display(),
            classes = facts.classes.len(),
            routes = facts.routes.len(),
            tasks = facts.tasks.len(),
            "Scanned source file"
        );
        table.absorb(facts);
    }
    Ok(table)
}

/// Build, lint and render a target without touching its output file.
///
/// Fails with [`GenerateError::Conflicts`] when the table has error-level issues.
pub fn prepare_target(
    kind: PipelineKind,
    root: &Path,
    config: &GeneratorConfig,
) -> anyhow::Result<(DispatchTable, String)> {
    let table = build_table(kind, root, config)?;
    let errors: Vec<LintIssue> = lint_table(&table, kind)
        .into_iter()
        .filter(LintIssue::is_error)
        .collect();
    if !errors.is_empty() {
        return Err(GenerateError::Conflicts {
            target: kind,
            errors,
        }
        .into());
    }
    let rendered = render_target(kind, &table, config, root)?;
    Ok((table, rendered))
}

/// The source directory `err` reports as missing, if that is what it is.
fn missing_source_dir(err: &anyhow::Error) -> Option<&Path> {
    match err.downcast_ref::<GenerateError>() {
        Some(GenerateError::MissingSourceDir { path, .. }) => Some(path),
        _ => None,
    }
}

/// Regenerate one target.
pub fn generate_target(
    kind: PipelineKind,
    root: &Path,
    config: &GeneratorConfig,
    dry_run: bool,
) -> anyhow::Result<TargetOutcome> {
    if !config.is_enabled(kind) {
        tracing::debug!(target_kind = %kind, "Target disabled");
        return Ok(TargetOutcome::Disabled);
    }
    let output = root.join(config.output(kind));
    let (table, rendered) = match prepare_target(kind, root, config) {
        Ok(prepared) => prepared,
        Err(err) => {
            if let Some(dir) = missing_source_dir(&err) {
                println!("⚠️  Skipping {kind}: source directory {dir:?} not found");
                tracing::warn!(target_kind = %kind, source_dir = %dir.display(), "Source directory missing");
                return Ok(TargetOutcome::Skipped {
                    source_dir: dir.to_path_buf(),
                });
            }
            return Err(err);
        }
    };

    if dry_run {
        return Ok(TargetOutcome::DryRun {
            path: output,
            contents: rendered,
        });
    }

    write_generated(&output, &rendered)?;
    let records = table.record_count(kind);
    tracing::info!(
        target_kind = %kind,
        records,
        files = table.files_scanned,
        output = %output.display(),
        "Generated dispatch module"
    );
    println!("✅ Generated {kind} dispatch ({records} record(s)) → {output:?}");
    Ok(TargetOutcome::Written {
        path: output,
        records,
    })
}

/// Compare a fresh render of one target with its on-disk output.
pub fn check_target(
    kind: PipelineKind,
    root: &Path,
    config: &GeneratorConfig,
) -> anyhow::Result<TargetOutcome> {
    if !config.is_enabled(kind) {
        return Ok(TargetOutcome::Disabled);
    }
    let output = root.join(config.output(kind));
    let rendered = match prepare_target(kind, root, config) {
        Ok((_, rendered)) => rendered,
        Err(err) => {
            if let Some(dir) = missing_source_dir(&err) {
                println!("⚠️  Skipping {kind}: source directory {dir:?} not found");
                return Ok(TargetOutcome::Skipped {
                    source_dir: dir.to_path_buf(),
                });
            }
            return Err(err);
        }
    };

    let current = match fs::read_to_string(&output) {
        Ok(current) => Some(current),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to read {output:?}"));
        }
    };
    if current.as_deref() != Some(rendered.as_str()) {
        return Err(GenerateError::Stale {
            target: kind,
            path: output,
        }
        .into());
    }
    println!("✅ {kind} dispatch is up to date → {output:?}");
    Ok(TargetOutcome::UpToDate { path: output })
}

/// Run `op` over every target, attempting all of them before reporting failure.
pub fn run_targets<F>(targets: &[PipelineKind], mut op: F) -> anyhow::Result<Vec<TargetOutcome>>
where
    F: FnMut(PipelineKind) -> anyhow::Result<TargetOutcome>,
{
    let mut outcomes = Vec::with_capacity(targets.len());
    let mut failures: Vec<anyhow::Error> = Vec::new();
    for &kind in targets {
        match op(kind) {
            Ok(outcome) => outcomes.push(outcome),
            Err(err) => {
                tracing::error!(target_kind = %kind, error = %format!("{err:#}"), "Target failed");
                failures.push(err);
            }
        }
    }
    match failures.len() {
        0 => Ok(outcomes),
        1 => Err(failures.remove(0)),
        n => {
            let details = failures
                .iter()
                .map(|err| format!("  - {err:#}"))
                .collect::<Vec<_>>()
                .join("\n");
            Err(anyhow::anyhow!("{n} targets failed:\n{details}"))
        }
    }
}

/// Regenerate every requested target.
pub fn generate_all(
    root: &Path,
    config: &GeneratorConfig,
    targets: &[PipelineKind],
    dry_run: bool,
) -> anyhow::Result<Vec<TargetOutcome>> {
    run_targets(targets, |kind| generate_target(kind, root, config, dry_run))
}

/// Check every requested target for stale output.
pub fn check_all(
    root: &Path,
    config: &GeneratorConfig,
    targets: &[PipelineKind],
) -> anyhow::Result<Vec<TargetOutcome>> {
    run_targets(targets, |kind| check_target(kind, root, config))
}
