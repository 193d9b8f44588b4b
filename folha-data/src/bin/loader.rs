use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use folha_data::{InssTableLoader, IrrfTableLoader, ParameterLoader};
use folha_db_sqlite::SqliteRepository;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TableKind {
    /// INSS progressive contribution brackets
    Inss,
    /// IRRF withholding brackets
    Irrf,
    /// Payroll parameters (minimum wage, ceilings, rates)
    Parameters,
}

/// Load payroll reference data from a CSV file into the database.
///
/// Bracket CSV files carry one row per band with columns effective_from,
/// effective_to, band_order, lower_bound, upper_bound and rate (IRRF files
/// add a deduction column). Parameter files carry param_key, value,
/// effective_from and effective_to. Empty cells mean "open-ended".
#[derive(Parser, Debug)]
#[command(name = "folha-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Which reference table the CSV file feeds
    #[arg(short, long, value_enum)]
    kind: TableKind,

    /// Path to the CSV file
    #[arg(short, long)]
    file: PathBuf,

    /// SQLite database URL (e.g. sqlite:folha.db?mode=rwc to create if missing)
    #[arg(short, long, default_value = "sqlite:folha.db?mode=rwc")]
    database: String,

    /// Run database migrations before loading data
    #[arg(short, long, default_value_t = false)]
    migrate: bool,

    /// Run seed files from the specified directory after migrations
    #[arg(short, long)]
    seeds: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let repo = SqliteRepository::new(&args.database)
        .await
        .with_context(|| format!("Failed to connect to database: {}", args.database))?;

    if args.migrate {
        println!("Running migrations...");
        repo.run_migrations()
            .await
            .context("Failed to run migrations")?;
        println!("Migrations complete.");
    }

    if let Some(seeds_dir) = &args.seeds {
        println!("Running seeds from: {}", seeds_dir.display());
        repo.run_seeds(seeds_dir)
            .await
            .with_context(|| format!("Failed to run seeds from: {}", seeds_dir.display()))?;
        println!("Seeds complete.");
    }

    println!("Loading reference data from: {}", args.file.display());

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;

    let written = match args.kind {
        TableKind::Inss => {
            let records = InssTableLoader::parse(file)
                .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;
            println!("Parsed {} INSS bracket records from CSV", records.len());
            InssTableLoader::load(&repo, &records)
                .await
                .context("Failed to load INSS brackets into database")?
        }
        TableKind::Irrf => {
            let records = IrrfTableLoader::parse(file)
                .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;
            println!("Parsed {} IRRF bracket records from CSV", records.len());
            IrrfTableLoader::load(&repo, &records)
                .await
                .context("Failed to load IRRF brackets into database")?
        }
        TableKind::Parameters => {
            let records = ParameterLoader::parse(file)
                .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;
            println!("Parsed {} parameter records from CSV", records.len());
            ParameterLoader::load(&repo, &records)
                .await
                .context("Failed to load parameters into database")?
        }
    };

    println!("Successfully loaded {} rows into the database.", written);

    Ok(())
}
