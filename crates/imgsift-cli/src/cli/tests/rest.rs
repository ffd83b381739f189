//! Tests for list, fingerprint and completions.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::PathBuf;

#[test]
fn cli_parse_list() {
    match parse(&["imgsift", "list"]) {
        CliCommand::List { dir } => assert!(dir.is_none()),
        _ => panic!("expected List"),
    }
}

#[test]
fn cli_parse_list_dir() {
    match parse(&["imgsift", "list", "--dir", "downloaded_images"]) {
        CliCommand::List { dir } => assert_eq!(dir, Some(PathBuf::from("downloaded_images"))),
        _ => panic!("expected List with --dir"),
    }
}

#[test]
fn cli_parse_fingerprint() {
    match parse(&["imgsift", "fingerprint", "cat.png"]) {
        CliCommand::Fingerprint { path } => assert_eq!(path, PathBuf::from("cat.png")),
        _ => panic!("expected Fingerprint"),
    }
}

#[test]
fn cli_parse_fingerprint_requires_path() {
    assert!(Cli::try_parse_from(["imgsift", "fingerprint"]).is_err());
}

#[test]
fn cli_parse_completions() {
    match parse(&["imgsift", "completions", "bash"]) {
        CliCommand::Completions { shell } => assert_eq!(shell, clap_complete::Shell::Bash),
        _ => panic!("expected Completions"),
    }
}

#[test]
fn cli_rejects_unknown_subcommand() {
    assert!(Cli::try_parse_from(["imgsift", "add", "https://example.com/x"]).is_err());
}

#[test]
fn cli_definition_is_consistent() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}
