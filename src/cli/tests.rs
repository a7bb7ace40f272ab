//! Unit tests for CLI commands
#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::cli::{map_only_to_targets, Cli, Commands, OnlyTarget};
use crate::table::PipelineKind;
use clap::Parser;
use std::path::PathBuf;

#[test]
fn test_generate_defaults() {
    let cli = Cli::try_parse_from(["edgeroute-gen", "generate"]).unwrap();
    assert_eq!(cli.verbose, 0);
    assert!(!cli.quiet);
    match cli.command {
        Commands::Generate { project, dry_run } => {
            assert_eq!(project.root, PathBuf::from("."));
            assert!(project.config.is_none());
            assert!(project.only.is_none());
            assert!(!dry_run);
        }
        _ => panic!("Expected Generate command"),
    }
}

#[test]
fn test_generate_with_flags() {
    let cli = Cli::try_parse_from([
        "edgeroute-gen",
        "generate",
        "--root",
        "app",
        "--config",
        "app/custom.toml",
        "--only",
        "queue",
        "--dry-run",
    ])
    .unwrap();
    match cli.command {
        Commands::Generate { project, dry_run } => {
            assert_eq!(project.root, PathBuf::from("app"));
            assert_eq!(project.config, Some(PathBuf::from("app/custom.toml")));
            assert_eq!(project.only, Some(vec![OnlyTarget::Queue]));
            assert!(dry_run);
        }
        _ => panic!("Expected Generate command"),
    }
}

#[test]
fn test_only_comma_separated() {
    let cli = Cli::try_parse_from(["edgeroute-gen", "check", "--only", "queue,http"]).unwrap();
    match cli.command {
        Commands::Check { project } => {
            assert_eq!(
                project.only,
                Some(vec![OnlyTarget::Queue, OnlyTarget::Http])
            );
        }
        _ => panic!("Expected Check command"),
    }
}

#[test]
fn test_only_rejects_unknown_target() {
    assert!(Cli::try_parse_from(["edgeroute-gen", "generate", "--only", "grpc"]).is_err());
}

#[test]
fn test_lint_command_with_flags() {
    let cli = Cli::try_parse_from([
        "edgeroute-gen",
        "lint",
        "--fail-on-error",
        "--errors-only",
    ])
    .unwrap();
    match cli.command {
        Commands::Lint {
            fail_on_error,
            errors_only,
            ..
        } => {
            assert!(fail_on_error);
            assert!(errors_only);
        }
        _ => panic!("Expected Lint command"),
    }
}

#[test]
fn test_global_verbosity_after_subcommand() {
    let cli = Cli::try_parse_from(["edgeroute-gen", "routes", "--json", "-vv"]).unwrap();
    assert_eq!(cli.verbose, 2);
    match cli.command {
        Commands::Routes { json, .. } => assert!(json),
        _ => panic!("Expected Routes command"),
    }
    let cli = Cli::try_parse_from(["edgeroute-gen", "-q", "check"]).unwrap();
    assert!(cli.quiet);
}

#[test]
fn test_all_commands_parse() {
    for args in [
        vec!["edgeroute-gen", "generate"],
        vec!["edgeroute-gen", "check"],
        vec!["edgeroute-gen", "lint"],
        vec!["edgeroute-gen", "routes"],
    ] {
        assert!(Cli::try_parse_from(args.clone()).is_ok(), "failed to parse {args:?}");
    }
    assert!(Cli::try_parse_from(["edgeroute-gen", "serve"]).is_err());
}

#[test]
fn test_map_only_to_targets() {
    assert_eq!(map_only_to_targets(None), PipelineKind::ALL.to_vec());
    assert_eq!(
        map_only_to_targets(Some(&[OnlyTarget::Queue])),
        vec![PipelineKind::Queue]
    );
    assert_eq!(
        map_only_to_targets(Some(&[OnlyTarget::Queue, OnlyTarget::Http])),
        vec![PipelineKind::Http, PipelineKind::Queue]
    );
}
