use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;

use crate::config::{resolve_config, GeneratorConfig};
use crate::generator::{build_table, check_all, generate_all, GenerateError, TargetOutcome};
use crate::linter::{has_errors, lint_table, print_lint_issues, LintIssue, LintSeverity};
use crate::table::{DispatchTable, PipelineKind, QueueTask, RouteRecord};

/// Command-line interface for the dispatch generator
///
/// Scans decorated TypeScript controllers and consumers and writes the router
/// and queue dispatch modules that wire them up.
#[derive(Parser, Debug)]
#[command(name = "edgeroute-gen")]
#[command(version, about = "Generate router and queue dispatch glue from decorators", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, default_value_t = false)]
    pub quiet: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ProjectArgs {
    /// Project root; configured paths are relative to it
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Configuration file (default: <root>/edgeroute.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Limit the run to specific targets (comma-separated or repeated)
    #[arg(long, value_enum, num_args = 1.., value_delimiter = ',')]
    pub only: Option<Vec<OnlyTarget>>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan sources and regenerate the dispatch modules
    Generate {
        #[command(flatten)]
        project: ProjectArgs,

        /// Render without writing; print the generated code instead
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Fail if any generated module is out of date
    Check {
        #[command(flatten)]
        project: ProjectArgs,
    },
    /// Report extraction warnings and dispatch conflicts
    Lint {
        #[command(flatten)]
        project: ProjectArgs,

        /// Exit with error code if any errors are found
        #[arg(long, default_value_t = false)]
        fail_on_error: bool,

        /// Show only errors (hide warnings and info)
        #[arg(long, default_value_t = false)]
        errors_only: bool,
    },
    /// List the discovered routes and queue consumers
    Routes {
        #[command(flatten)]
        project: ProjectArgs,

        /// Print JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

/// Targets selectable with `--only`
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OnlyTarget {
    /// HTTP router module
    Http,
    /// Queue dispatch module
    Queue,
}

/// Map `--only` to the pipelines to run, in generation order.
pub fn map_only_to_targets(only: Option<&[OnlyTarget]>) -> Vec<PipelineKind> {
    match only {
        None => PipelineKind::ALL.to_vec(),
        Some(parts) => PipelineKind::ALL
            .into_iter()
            .filter(|kind| {
                parts.iter().any(|part| {
                    matches!(
                        (part, kind),
                        (OnlyTarget::Http, PipelineKind::Http)
                            | (OnlyTarget::Queue, PipelineKind::Queue)
                    )
                })
            })
            .collect(),
    }
}

fn load(project: &ProjectArgs) -> anyhow::Result<(GeneratorConfig, Vec<PipelineKind>)> {
    let config = resolve_config(project.config.as_deref(), &project.root)?;
    let targets = map_only_to_targets(project.only.as_deref());
    Ok((config, targets))
}

/// Build the tables of every enabled target, skipping missing source directories.
fn collect_tables(
    project: &ProjectArgs,
) -> anyhow::Result<Vec<(PipelineKind, DispatchTable)>> {
    let (config, targets) = load(project)?;
    let mut tables = Vec::new();
    for kind in targets {
        if !config.is_enabled(kind) {
            continue;
        }
        match build_table(kind, &project.root, &config) {
            Ok(table) => tables.push((kind, table)),
            Err(err) => match err.downcast_ref::<GenerateError>() {
                Some(GenerateError::MissingSourceDir { path, .. }) => {
                    eprintln!("⚠️  Skipping {kind}: source directory {path:?} not found");
                }
                _ => return Err(err),
            },
        }
    }
    Ok(tables)
}

#[derive(Serialize)]
struct RoutesReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    http: Option<&'a [RouteRecord]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    queue: Option<&'a [QueueTask]>,
}

fn print_routes(tables: &[(PipelineKind, DispatchTable)]) {
    for (kind, table) in tables {
        match kind {
            PipelineKind::Http => {
                println!("🌐 HTTP routes ({}):", table.routes.len());
                for route in &table.routes {
                    println!(
                        "   {:<7} {:<40} → {} ({})",
                        route.method.as_str().to_uppercase(),
                        route.path,
                        route.site(),
                        route.location
                    );
                }
            }
            PipelineKind::Queue => {
                println!("📬 Queue consumers ({}):", table.tasks.len());
                for task in &table.tasks {
                    let mode = if task.is_batch { "batch" } else { "message" };
                    println!(
                        "   {:<24} {:<8} → {} ({})",
                        task.queue_name,
                        mode,
                        task.site(),
                        task.location
                    );
                }
            }
        }
    }
}

/// Run a parsed command line
///
/// # Errors
///
/// Returns an error when any target fails (conflicts, stale output, write
/// failures) or when `lint --fail-on-error` finds errors.
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate { project, dry_run } => {
            let (config, targets) = load(&project)?;
            let outcomes = generate_all(&project.root, &config, &targets, dry_run)?;
            for outcome in outcomes {
                if let TargetOutcome::DryRun { path, contents } = outcome {
                    println!("📄 {path:?} (dry run, not written)");
                    print!("{contents}");
                }
            }
            Ok(())
        }
        Commands::Check { project } => {
            let (config, targets) = load(&project)?;
            check_all(&project.root, &config, &targets)?;
            Ok(())
        }
        Commands::Lint {
            project,
            fail_on_error,
            errors_only,
        } => {
            let tables = collect_tables(&project)?;
            let mut issues: Vec<LintIssue> = tables
                .iter()
                .flat_map(|(kind, table)| lint_table(table, *kind))
                .collect();
            if errors_only {
                issues.retain(|i| i.severity == LintSeverity::Error);
            }
            print_lint_issues(&issues);
            if fail_on_error && has_errors(&issues) {
                let count = issues.iter().filter(|i| i.is_error()).count();
                anyhow::bail!("lint found {count} error(s)");
            }
            Ok(())
        }
        Commands::Routes { project, json } => {
            let tables = collect_tables(&project)?;
            if json {
                let mut report = RoutesReport {
                    http: None,
                    queue: None,
                };
                for (kind, table) in &tables {
                    match kind {
                        PipelineKind::Http => report.http = Some(table.routes.as_slice()),
                        PipelineKind::Queue => report.queue = Some(table.tasks.as_slice()),
                    }
                }
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_routes(&tables);
            }
            Ok(())
        }
    }
}
