use clap::Parser;
use scaffolder::cli::{get_output_dir, Args};
use scaffolder::Error;
use std::ffi::OsString;
use std::path::PathBuf;
use tempfile::TempDir;

fn make_args(args: &[&str]) -> Vec<OsString> {
    let mut res = vec![OsString::from("scaffolder")];
    res.extend(args.iter().map(OsString::from));
    res
}

#[test]
fn test_basic_args() {
    let args = make_args(&["./template", "./output"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert_eq!(parsed.template, PathBuf::from("./template"));
    assert_eq!(parsed.output_dir, PathBuf::from("./output"));
    assert!(!parsed.force);
    assert!(!parsed.merge);
    assert!(!parsed.verbose);
    assert!(!parsed.stdin);
    assert!(parsed.context.is_none());
    assert!(parsed.prefix.is_none());
    assert!(parsed.run.is_empty());
}

#[test]
fn test_all_flags() {
    let args = make_args(&[
        "--force",
        "--merge",
        "--verbose",
        "--context",
        "ctx.yml",
        "--prefix",
        "template",
        "--suffix",
        ".j2",
        "--run",
        "cargo fmt",
        "--run",
        "git init",
        "./template",
        "./output",
    ]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert!(parsed.force);
    assert!(parsed.merge);
    assert!(parsed.verbose);
    assert_eq!(parsed.context, Some(PathBuf::from("ctx.yml")));
    assert_eq!(parsed.prefix.as_deref(), Some("template"));
    assert_eq!(parsed.suffix.as_deref(), Some(".j2"));
    assert_eq!(parsed.run, vec!["cargo fmt", "git init"]);
}

#[test]
fn test_short_flags() {
    let args = make_args(&["-f", "-m", "-v", "-s", "./template", "./output"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert!(parsed.force);
    assert!(parsed.merge);
    assert!(parsed.verbose);
    assert!(parsed.stdin);
}

#[test]
fn test_stdin_conflicts_with_context() {
    let args = make_args(&["--stdin", "--context", "ctx.json", "./template", "./output"]);
    assert!(Args::try_parse_from(args).is_err());
}

#[test]
fn test_missing_args() {
    let args = make_args(&["./template"]);
    assert!(Args::try_parse_from(args).is_err());
}

#[test]
fn test_too_many_args() {
    let args = make_args(&["./template", "./output", "extra"]);
    assert!(Args::try_parse_from(args).is_err());
}

#[test]
fn test_existing_output_dir() {
    let dir = TempDir::new().unwrap();

    let err = get_output_dir(dir.path(), false).unwrap_err();
    assert!(matches!(err, Error::OutputDirectoryExists { .. }));

    assert_eq!(get_output_dir(dir.path(), true).unwrap(), dir.path());
}

#[test]
fn test_new_output_dir() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("fresh");
    assert_eq!(get_output_dir(&output, false).unwrap(), output);
}
