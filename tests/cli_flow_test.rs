//! End-to-end command flow against a database backend in a temp directory.

use std::fs;

use blobvault::bootstrap::{load_config, run_command};
use blobvault::cli::{Command, LocationArgs};
use tempfile::TempDir;

fn location() -> LocationArgs {
    LocationArgs {
        bucket: "reports".into(),
        name: "2024/06/report.csv".into(),
    }
}

#[test]
fn init_store_download_clean() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("files.db");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        format!(
            "[storage.dfs.db]\nurl = {:?}\ntable_name = \"cli_files\"\n",
            db_path.to_string_lossy()
        ),
    )
    .unwrap();
    let source = load_config(Some(&config_path)).unwrap();

    run_command(Command::InitSchema, &source).unwrap();
    // A second run finds the table and succeeds.
    run_command(Command::InitSchema, &source).unwrap();

    let input = temp_dir.path().join("report.csv");
    fs::write(&input, b"a,b,c\n1,2,3").unwrap();
    run_command(
        Command::Store {
            location: location(),
            file: input,
        },
        &source,
    )
    .unwrap();

    run_command(Command::Meta { location: location() }, &source).unwrap();

    let target = temp_dir.path().join("out/report.csv");
    run_command(
        Command::Download {
            location: location(),
            target: target.clone(),
        },
        &source,
    )
    .unwrap();
    assert_eq!(fs::read(&target).unwrap(), b"a,b,c\n1,2,3");

    run_command(
        Command::Clean {
            bucket: "reports".into(),
            days: 30,
        },
        &source,
    )
    .unwrap();
    run_command(Command::Meta { location: location() }, &source).unwrap();
}

#[test]
fn commands_fail_without_a_configured_backend() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[logging]\n").unwrap();
    let source = load_config(Some(&config_path)).unwrap();

    let result = run_command(
        Command::Clean {
            bucket: "reports".into(),
            days: 30,
        },
        &source,
    );
    assert!(result.is_err());
    assert!(run_command(Command::InitSchema, &source).is_err());
}
