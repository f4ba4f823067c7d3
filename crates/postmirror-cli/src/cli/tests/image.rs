//! Tests for the image subcommand.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::Path;

#[test]
fn cli_parse_image_defaults() {
    match parse(&["postmirror", "image", "https://example.com/post/1"]) {
        CliCommand::Image {
            urls,
            directory,
            page_workers,
            resource_workers,
            json,
        } => {
            assert_eq!(urls, vec!["https://example.com/post/1"]);
            assert_eq!(directory, Path::new("."));
            assert!(page_workers.is_none());
            assert!(resource_workers.is_none());
            assert!(!json);
        }
        _ => panic!("expected Image"),
    }
}

#[test]
fn cli_parse_image_many_urls_and_flags() {
    match parse(&[
        "postmirror",
        "image",
        "https://example.com/a",
        "https://example.com/b",
        "-d",
        "/tmp/out",
        "--page-workers",
        "2",
        "--resource-workers",
        "16",
        "--json",
    ]) {
        CliCommand::Image {
            urls,
            directory,
            page_workers,
            resource_workers,
            json,
        } => {
            assert_eq!(urls.len(), 2);
            assert_eq!(urls[1], "https://example.com/b");
            assert_eq!(directory, Path::new("/tmp/out"));
            assert_eq!(page_workers, Some(2));
            assert_eq!(resource_workers, Some(16));
            assert!(json);
        }
        _ => panic!("expected Image with flags"),
    }
}

#[test]
fn cli_parse_image_long_directory() {
    match parse(&["postmirror", "image", "--directory", "pics", "https://x/p"]) {
        CliCommand::Image { directory, urls, .. } => {
            assert_eq!(directory, Path::new("pics"));
            assert_eq!(urls, vec!["https://x/p"]);
        }
        _ => panic!("expected Image with --directory"),
    }
}

#[test]
fn cli_parse_image_requires_url() {
    assert!(Cli::try_parse_from(["postmirror", "image"]).is_err());
}

#[test]
fn cli_parse_image_rejects_non_numeric_workers() {
    assert!(
        Cli::try_parse_from(["postmirror", "image", "https://x/p", "--page-workers", "many"])
            .is_err()
    );
}

#[test]
fn cli_parse_global_config_after_subcommand() {
    let cli = Cli::try_parse_from([
        "postmirror",
        "image",
        "https://x/p",
        "--config",
        "/etc/postmirror.toml",
    ])
    .unwrap();
    assert_eq!(
        cli.config.as_deref(),
        Some(Path::new("/etc/postmirror.toml"))
    );
    assert!(matches!(cli.command, CliCommand::Image { .. }));
}
