//! Integration tests for the fixture binary.

use assert_cmd::Command;
use delta_fixture_core::{
    manifest::read_symlink_manifest, storage::TableLocation, table::DeltaTable,
};
use predicates::str::contains;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("delta-fixture"))
}

fn run_fixture(table: &str) {
    cli()
        .args(["--table-path", table])
        .assert()
        .success()
        .stdout(contains(format!("✓ Delta table created at: {table}")))
        .stdout(contains(format!(
            "✓ Manifest generated at: {table}/_symlink_format_manifest/"
        )))
        .stdout(contains("✓ Automatic manifest generation enabled"));
}

#[tokio::test]
async fn cli_creates_table_and_manifest() -> TestResult {
    let tmp = TempDir::new()?;
    let table = tmp.path().join("my_delta_table");
    let table_str = table.display().to_string();

    run_fixture(&table_str);

    assert!(table.join("_delta_log/00000000000000000000.json").exists());
    assert!(table.join("_symlink_format_manifest/manifest").exists());

    let handle = DeltaTable::open(TableLocation::local(&table)).await?;
    assert_eq!(handle.count_rows().await?, 3);
    assert_eq!(handle.schema()?.to_string(), "(id:long, name:string, age:long)");
    assert!(handle.properties()?.symlink_manifest_enabled);

    let entries = read_symlink_manifest(handle.location())
        .await?
        .expect("manifest present");
    assert_eq!(entries.len(), 1);
    assert!(entries[0].starts_with("file:"));
    assert!(entries[0].ends_with(".snappy.parquet"));
    Ok(())
}

#[tokio::test]
async fn cli_rerun_overwrites_instead_of_appending() -> TestResult {
    let tmp = TempDir::new()?;
    let table = tmp.path().join("my_delta_table");
    let table_str = table.display().to_string();

    run_fixture(&table_str);
    run_fixture(&table_str);

    let handle = DeltaTable::open(TableLocation::local(&table)).await?;
    assert_eq!(handle.count_rows().await?, 3);
    let files = handle.data_files()?;
    assert_eq!(files.len(), 1);

    let live = &files[0];
    let entries = read_symlink_manifest(handle.location())
        .await?
        .expect("manifest present");
    assert_eq!(entries.len(), 1);
    assert!(entries[0].ends_with(&format!("/{live}")));
    Ok(())
}

#[tokio::test]
async fn cli_handles_backtick_in_table_path() -> TestResult {
    let tmp = TempDir::new()?;
    let table = tmp.path().join("a`b");
    let table_str = table.display().to_string();

    run_fixture(&table_str);

    let handle = DeltaTable::open(TableLocation::local(&table)).await?;
    assert_eq!(handle.version(), 1);
    assert!(handle.properties()?.symlink_manifest_enabled);

    let entries = read_symlink_manifest(handle.location())
        .await?
        .expect("manifest present");
    assert_eq!(entries.len(), 1);
    assert!(entries[0].contains("/a`b/"));
    Ok(())
}

#[test]
fn cli_reports_unwritable_path_and_exits_nonzero() -> TestResult {
    let tmp = TempDir::new()?;
    let blocker = tmp.path().join("not_a_dir");
    std::fs::write(&blocker, b"file")?;
    let table = blocker.join("table");

    cli()
        .args(["--table-path", table.to_string_lossy().as_ref()])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Failed to write Delta table"));
    Ok(())
}

#[test]
fn cli_rejects_non_local_scheme() {
    cli()
        .args(["--table-path", "s3://bucket/table"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("not supported"));
}
