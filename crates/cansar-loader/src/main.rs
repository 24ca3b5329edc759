//! cansar-loader: Command-line loader for the CAN-SAR conservation database.
//!
//! Runs the schema migrations, loads the yearly CSI trend file, then the
//! tab-delimited CAN-SAR assessment table. A missing source file is
//! reported and that load step skipped; the other step still runs.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cansar_core::defaults::BATCH_SIZE;
use cansar_db::Database;
use cansar_ingest::{load_csi_trends, IngestPipeline, PipelineConfig};

#[derive(Parser)]
#[command(name = "cansar-loader")]
#[command(author, version, about = "Load the CAN-SAR source tables into PostgreSQL")]
struct Cli {
    /// PostgreSQL connection URL (falls back to the DATABASE_URL variable)
    #[arg(long)]
    database_url: Option<String>,

    /// Path to the yearly CSI trend CSV
    #[arg(long, default_value = "data/canada.csv")]
    csi_file: PathBuf,

    /// Path to the tab-delimited CAN-SAR assessment table
    #[arg(long, default_value = "data/processed_CAN-SAR_vertebrates_1970-2018.csv")]
    cansar_file: PathBuf,

    /// Maximum number of CAN-SAR rows to process (all rows when omitted)
    #[arg(long)]
    max_records: Option<u64>,

    /// Rows per committed batch
    #[arg(long, default_value_t = BATCH_SIZE)]
    batch_size: usize,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let start = Instant::now();

    let database_url = cli
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .context("DATABASE_URL is not set; pass --database-url or set the environment variable")?;

    let db = Database::connect(&database_url).await?;

    info!(subsystem = "loader", op = "migrate", "Creating database tables");
    db.migrate().await?;

    if cli.csi_file.exists() {
        match load_csi_trends(&db, &cli.csi_file).await {
            Ok(count) => println!("Loaded {count} CSI trend records."),
            Err(e) => error!(
                subsystem = "loader",
                path = %cli.csi_file.display(),
                error = %e,
                "CSI load failed; continuing"
            ),
        }
    } else {
        error!(
            subsystem = "loader",
            path = %cli.csi_file.display(),
            "CSI file not found; skipping"
        );
    }

    if cli.cansar_file.exists() {
        let config = PipelineConfig::new()
            .with_batch_size(cli.batch_size)
            .with_max_rows(cli.max_records);

        match IngestPipeline::new(&db, config).run(&cli.cansar_file).await {
            Ok(summary) => println!("{summary}"),
            Err(e) => error!(
                subsystem = "loader",
                path = %cli.cansar_file.display(),
                error = %e,
                "CAN-SAR load failed"
            ),
        }
    } else {
        error!(
            subsystem = "loader",
            path = %cli.cansar_file.display(),
            "CAN-SAR file not found; skipping"
        );
    }

    println!(
        "Total processing time: {:.2} seconds",
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
