use std::fmt;
use std::path::PathBuf;

use crate::linter::LintIssue;
use crate::table::PipelineKind;

/// Failures a caller needs to tell apart from plain I/O errors.
#[derive(Debug)]
pub enum GenerateError {
    /// The target's source directory does not exist. The target is skipped.
    MissingSourceDir { target: PipelineKind, path: PathBuf },
    /// The dispatch table has conflicts; nothing was written for the target.
    Conflicts {
        target: PipelineKind,
        errors: Vec<LintIssue>,
    },
    /// `check` found a generated file that differs from a fresh render.
    Stale { target: PipelineKind, path: PathBuf },
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::MissingSourceDir { target, path } => {
                write!(f, "{target}: source directory {} does not exist", path.display())
            }
            GenerateError::Conflicts { target, errors } => {
                write!(f, "{target}: {} conflict(s) in dispatch table", errors.len())?;
                for issue in errors {
                    write!(f, "\n  - {}: {}", issue.location, issue.message)?;
                }
                Ok(())
            }
            GenerateError::Stale { target, path } => write!(
                f,
                "{target}: {} is out of date; run `edgeroute-gen generate`",
                path.display()
            ),
        }
    }
}

impl std::error::Error for GenerateError {}
