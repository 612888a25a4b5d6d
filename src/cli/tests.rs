//! Unit tests for CLI parsing

use super::commands::select_segments;
use crate::cli::{Cli, Commands};
use crate::schema::{FullSchema, SegmentSchema};
use clap::Parser;

#[test]
fn test_generate_defaults() {
    let cli = Cli::try_parse_from(["rpcforge-gen", "generate", "--schema", "schema.json"]).unwrap();
    match cli.command {
        Commands::Generate {
            schema,
            template,
            full_schema,
            segment,
            force_log,
            watch,
            ..
        } => {
            assert_eq!(schema.to_string_lossy(), "schema.json");
            assert!(template.is_empty());
            assert!(full_schema.is_none());
            assert!(segment.is_empty());
            assert!(!force_log);
            assert!(!watch);
        }
        _ => panic!("Expected Generate command"),
    }
}

#[test]
fn test_generate_templates_and_segments_split_on_commas() {
    let cli = Cli::try_parse_from([
        "rpcforge-gen",
        "generate",
        "--schema",
        "s.yaml",
        "--template",
        "ts,py",
        "--template",
        "rs",
        "--segment",
        "foo/client",
    ])
    .unwrap();
    match cli.command {
        Commands::Generate {
            template, segment, ..
        } => {
            assert_eq!(template, vec!["ts", "py", "rs"]);
            assert_eq!(segment, vec!["foo/client"]);
        }
        _ => panic!("Expected Generate command"),
    }
}

#[test]
fn test_full_schema_flag_with_and_without_name() {
    let bare = Cli::try_parse_from(["rpcforge-gen", "generate", "-s", "s.json", "--full-schema"])
        .unwrap();
    let named = Cli::try_parse_from([
        "rpcforge-gen",
        "generate",
        "-s",
        "s.json",
        "--full-schema",
        "api.json",
    ])
    .unwrap();
    match (bare.command, named.command) {
        (
            Commands::Generate {
                full_schema: bare, ..
            },
            Commands::Generate {
                full_schema: named, ..
            },
        ) => {
            assert_eq!(bare, Some(None));
            assert_eq!(named, Some(Some("api.json".to_string())));
        }
        _ => panic!("Expected Generate commands"),
    }
}

#[test]
fn test_check_and_templates_parse() {
    let cli = Cli::try_parse_from([
        "rpcforge-gen",
        "-v",
        "check",
        "--schema",
        "s.json",
        "--fail-on-error",
    ])
    .unwrap();
    assert!(cli.verbose);
    assert!(matches!(cli.command, Commands::Check { fail_on_error: true, .. }));

    let cli = Cli::try_parse_from(["rpcforge-gen", "templates"]).unwrap();
    assert!(matches!(cli.command, Commands::Templates));
}

#[test]
fn test_schema_is_required() {
    assert!(Cli::try_parse_from(["rpcforge-gen", "generate"]).is_err());
}

#[test]
fn test_segment_selection() {
    let schema: FullSchema = [SegmentSchema::new("a"), SegmentSchema::new("b")]
        .into_iter()
        .collect();
    let all = select_segments(&schema, &[]);
    assert_eq!(all.len(), 2);
    let some = select_segments(&schema, &["b".to_string(), "missing".to_string()]);
    assert_eq!(some[0].segment_name, "b");
    assert_eq!(some[1].segment_name, "missing");
}
