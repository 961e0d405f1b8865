//! Tests for command-line parsing.

use std::path::PathBuf;

use clap::Parser;
use record_export::cli::Cli;
use record_export::config::{CollisionPolicy, FailOn, LogFormat, LogLevel};

const URL: &str = "sqlite:./people.db";

#[test]
fn test_defaults() {
    let cli = Cli::try_parse_from(["record_export", "--database-url", URL]).unwrap();
    assert_eq!(cli.table, "zzz_export_ud_w_passport");
    assert_eq!(cli.id_column, "identif");
    assert_eq!(cli.image_column, "image");
    assert_eq!(cli.max_concurrency, 1);
    assert_eq!(cli.on_collision, CollisionPolicy::Fail);
    assert_eq!(cli.fail_on, FailOn::Never);
    assert_eq!(cli.fail_on_pct_threshold, 10);
    assert!(!cli.fail_fast);
    assert!(cli.only.is_none());
    assert!(matches!(cli.log_level, LogLevel::Info));
    assert!(matches!(cli.log_format, LogFormat::Plain));
}

#[test]
fn test_all_options() {
    let cli = Cli::try_parse_from([
        "record_export",
        "--database-url",
        "postgres://postgres@db/police",
        "--table",
        "archive.people",
        "--id-column",
        "person_id",
        "--image-column",
        "photo",
        "--only",
        "A1",
        "--base-dir",
        "/srv/export",
        "--max-concurrency",
        "8",
        "--on-collision",
        "overwrite",
        "--fail-fast",
        "--log-level",
        "debug",
        "--log-format",
        "json",
        "--fail-on",
        "decode-failure",
    ])
    .unwrap();

    let config = cli.into_config();
    assert_eq!(config.table, "archive.people");
    assert_eq!(config.id_column, "person_id");
    assert_eq!(config.image_column, "photo");
    assert_eq!(config.only.as_deref(), Some("A1"));
    assert_eq!(config.base_dir, PathBuf::from("/srv/export"));
    assert_eq!(config.max_concurrency, 8);
    assert_eq!(config.collision_policy, CollisionPolicy::Overwrite);
    assert!(config.fail_fast);
    assert!(matches!(config.log_format, LogFormat::Json));
    assert_eq!(
        log::LevelFilter::from(config.log_level.clone()),
        log::LevelFilter::Debug
    );
    assert!(config.validate().is_ok());
}

#[test]
fn test_fail_on_values() {
    for (value, expected) in [
        ("never", FailOn::Never),
        ("any-failure", FailOn::AnyFailure),
        ("decode-failure", FailOn::DecodeFailure),
        ("pct-greater-than", FailOn::PctGreaterThan),
    ] {
        let cli =
            Cli::try_parse_from(["record_export", "--database-url", URL, "--fail-on", value])
                .unwrap();
        assert_eq!(cli.fail_on, expected, "--fail-on {value}");
    }
}

#[test]
fn test_rejects_threshold_above_100() {
    let result = Cli::try_parse_from([
        "record_export",
        "--database-url",
        URL,
        "--fail-on-pct-threshold",
        "101",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_rejects_unknown_collision_policy() {
    let result = Cli::try_parse_from([
        "record_export",
        "--database-url",
        URL,
        "--on-collision",
        "rename",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_zero_concurrency_parses_but_fails_validation() {
    let cli = Cli::try_parse_from([
        "record_export",
        "--database-url",
        URL,
        "--max-concurrency",
        "0",
    ])
    .unwrap();
    assert!(cli.into_config().validate().is_err());
}
