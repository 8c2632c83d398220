//! Provision a sample Delta table and its symlink format manifest.
//!
//! Stages, in order: start a Delta-enabled session, overwrite the table with
//! the three sample records, generate `_symlink_format_manifest/`, turn on
//! automatic manifest generation, stop the session.

mod error;

use clap::Parser;
use delta_fixture_core::{
    fixture::{APP_NAME, DEFAULT_TABLE_PATH, sample_batch},
    manifest::SYMLINK_FORMAT_MANIFEST,
    session::{Session, delta_table_reference},
    table::{DeltaTable, properties::SYMLINK_MANIFEST_ENABLED},
};
use log::info;
use snafu::ResultExt;

use crate::error::{
    CliResult, EnableManifestSnafu, GenerateManifestSnafu, OpenTableSnafu, SampleDataSnafu,
    StartSessionSnafu, WriteTableSnafu,
};

#[derive(Debug, Parser)]
#[command(version, about = "Create a Delta table with a symlink format manifest")]
struct Cli {
    /// Where to create the table.
    #[arg(long = "table-path", default_value = DEFAULT_TABLE_PATH)]
    table_path: String,
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let table_path = cli.table_path;

    let session = Session::builder()
        .app_name(APP_NAME)
        .configure_delta()
        .get_or_create()
        .context(StartSessionSnafu)?;

    // 1) Sample records, replacing whatever the table held before.
    let df = session.create_dataframe(sample_batch().context(SampleDataSnafu)?);
    let outcome = df
        .write()
        .format("delta")
        .mode("overwrite")
        .save(&table_path)
        .await
        .context(WriteTableSnafu {
            table: table_path.as_str(),
        })?;
    info!(
        "wrote {} rows as version {}",
        outcome.rows_written, outcome.version
    );
    println!("✓ Delta table created at: {table_path}");

    // 2) Manifest for the snapshot just committed.
    let table = DeltaTable::for_path(&session, &table_path)
        .await
        .context(OpenTableSnafu {
            table: table_path.as_str(),
        })?;
    table
        .generate(SYMLINK_FORMAT_MANIFEST)
        .await
        .context(GenerateManifestSnafu {
            table: table_path.as_str(),
        })?;
    println!("✓ Manifest generated at: {table_path}/_symlink_format_manifest/");

    // 3) Keep the manifest in sync with later commits.
    session
        .sql(&format!(
            "ALTER TABLE {} SET TBLPROPERTIES({SYMLINK_MANIFEST_ENABLED}=true)",
            delta_table_reference(&table_path)
        ))
        .await
        .context(EnableManifestSnafu {
            table: table_path.as_str(),
        })?;
    println!("✓ Automatic manifest generation enabled");

    session.stop();
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run().await {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
