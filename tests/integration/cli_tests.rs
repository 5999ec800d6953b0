use clap::Parser;
use dupescan::app::run_app_with_io;
use dupescan::cli::Cli;
use dupescan::error::ExitCode;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn fixture() -> TempDir {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"hello").unwrap();
    fs::write(dir.path().join("b.txt"), b"hello").unwrap();
    fs::write(dir.path().join("c.txt"), b"world").unwrap();
    dir
}

/// An empty config file so the user's own settings never leak in.
fn empty_config(dir: &Path) -> String {
    let path = dir.join("dupescan-test.toml");
    fs::write(&path, "").unwrap();
    path.to_string_lossy().into_owned()
}

fn run(args: &[&str], input: &str) -> (anyhow::Result<ExitCode>, String) {
    let cli = Cli::try_parse_from(args).unwrap();
    let mut output = Vec::new();
    let code = run_app_with_io(cli, false, &mut input.as_bytes(), &mut output);
    (code, String::from_utf8(output).unwrap())
}

#[test]
fn test_text_output() {
    let dir = fixture();
    let config_dir = tempdir().unwrap();
    let config = empty_config(config_dir.path());

    let (code, out) = run(
        &["dupescan", "-q", "--config", &config, "scan", dir.path().to_str().unwrap()],
        "",
    );

    assert_eq!(code.unwrap(), ExitCode::Success);
    assert!(out.contains("Group 1: 2 files"));
    assert!(out.contains("[KEEP]"));
    assert!(out.contains("a.txt"));
    assert!(out.contains("1 duplicate group(s), 1 duplicate file(s), 5 B reclaimable"));
}

#[test]
fn test_json_output() {
    let dir = fixture();
    let config_dir = tempdir().unwrap();
    let config = empty_config(config_dir.path());

    let (code, out) = run(
        &[
            "dupescan",
            "-q",
            "--config",
            &config,
            "scan",
            dir.path().to_str().unwrap(),
            "--output",
            "json",
        ],
        "",
    );

    assert_eq!(code.unwrap(), ExitCode::Success);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    let group = &value["duplicates"][0];
    assert_eq!(
        group["hash"],
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    );
    assert!(group["files"][0].as_str().unwrap().ends_with("a.txt"));
    assert!(group["files"][1].as_str().unwrap().ends_with("b.txt"));
    assert_eq!(value["summary"]["reclaimable_space"], 5);
    assert_eq!(value["summary"]["total_files"], 3);
}

#[test]
fn test_csv_output() {
    let dir = fixture();
    let config_dir = tempdir().unwrap();
    let config = empty_config(config_dir.path());

    let (code, out) = run(
        &[
            "dupescan",
            "-q",
            "--config",
            &config,
            "scan",
            dir.path().to_str().unwrap(),
            "--output",
            "csv",
        ],
        "",
    );

    assert_eq!(code.unwrap(), ExitCode::Success);
    let lines: Vec<_> = out.lines().collect();
    assert_eq!(lines[0], "group_id,hash,path,size,keep");
    assert!(lines[1].ends_with("a.txt,5,true"));
    assert!(lines[2].ends_with("b.txt,5,false"));
    assert_eq!(lines.len(), 3);
}

#[test]
fn test_empty_directory_exits_zero() {
    let dir = tempdir().unwrap();
    let config_dir = tempdir().unwrap();
    let config = empty_config(config_dir.path());

    let (code, out) = run(
        &["dupescan", "-q", "--config", &config, "scan", dir.path().to_str().unwrap()],
        "",
    );

    assert_eq!(code.unwrap(), ExitCode::Success);
    assert!(out.starts_with("No duplicates found."));
}

#[test]
fn test_invalid_directory_exit_code() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");
    let config = empty_config(dir.path());

    let (code, _) = run(
        &["dupescan", "-q", "--config", &config, "scan", missing.to_str().unwrap()],
        "",
    );

    let err = code.unwrap_err();
    assert_eq!(ExitCode::from_error(&err), ExitCode::InvalidDirectory);
    assert_eq!(ExitCode::from_error(&err).as_i32(), 2);
}

#[test]
fn test_bad_config_exit_code() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("bad.toml");
    fs::write(&config, "io_threads = \"many\"").unwrap();

    let (code, _) = run(
        &[
            "dupescan",
            "-q",
            "--config",
            config.to_str().unwrap(),
            "scan",
            dir.path().to_str().unwrap(),
        ],
        "",
    );

    let err = code.unwrap_err();
    assert_eq!(ExitCode::from_error(&err), ExitCode::GeneralError);
    assert!(format!("{err:#}").contains("Failed to load configuration"));
}

#[test]
fn test_delete_with_yes() {
    let dir = fixture();
    let config_dir = tempdir().unwrap();
    let config = empty_config(config_dir.path());

    let (code, out) = run(
        &[
            "dupescan",
            "-q",
            "--config",
            &config,
            "scan",
            dir.path().to_str().unwrap(),
            "--delete",
            "--yes",
        ],
        "",
    );

    assert_eq!(code.unwrap(), ExitCode::Success);
    assert!(!out.contains("[y/N]"));
    assert!(out.contains("Deleted 1 file(s), 0 failure(s), freed 5 B"));
    assert!(dir.path().join("a.txt").exists());
    assert!(!dir.path().join("b.txt").exists());
    assert!(dir.path().join("c.txt").exists());
}

#[test]
fn test_delete_end_of_input_declines() {
    let dir = fixture();
    let config_dir = tempdir().unwrap();
    let config = empty_config(config_dir.path());

    let (code, out) = run(
        &[
            "dupescan",
            "-q",
            "--config",
            &config,
            "scan",
            dir.path().to_str().unwrap(),
            "--delete",
        ],
        "",
    );

    assert_eq!(code.unwrap(), ExitCode::Success);
    assert!(out.contains("Delete 1 duplicate(s) from group 1? [y/N]"));
    assert!(dir.path().join("b.txt").exists());
}

#[test]
fn test_config_subcommand_prints_toml() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("custom.toml");
    fs::write(&config, "min_size = 2048\ntrash = true\n").unwrap();

    let (code, out) = run(
        &["dupescan", "-q", "--config", config.to_str().unwrap(), "config"],
        "",
    );

    assert_eq!(code.unwrap(), ExitCode::Success);
    assert!(out.contains("min_size = 2048"));
    assert!(out.contains("trash = true"));
    assert!(out.contains("recursive = true"));
}
