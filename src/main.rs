use std::path::PathBuf;
use std::process::ExitCode;

use chocan_csv::{ReportWriter, import_csv};
use chocan_parquet_store::{RecordStore, StoreConfig};
use chocan_result::{Error, Result};
use chocan_schema::TableInfo;
use chocan_schema::tables::{all_tables, by_name};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Developer tooling for the ChocAn record store.
#[derive(Debug, Parser)]
#[command(name = "chocan", version, about)]
struct Cli {
    /// Directory holding the table files. Overrides CHOCAN_STORAGE_DIR.
    #[arg(long, global = true, value_name = "DIR")]
    storage_dir: Option<PathBuf>,

    /// Directory receiving reports. Overrides CHOCAN_REPORT_DIR.
    #[arg(long, global = true, value_name = "DIR")]
    report_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Append the rows of a CSV file to a table.
    Import {
        /// Header-first CSV file.
        csv: PathBuf,
        /// Name of the target table.
        table: String,
    },
    /// Save a whole table as a CSV report.
    Report {
        /// Name of the table to report on.
        table: String,
        /// Report name, without directory or extension.
        name: String,
    },
    /// List the known tables and their columns.
    Tables,
}

impl Cli {
    fn store_config(&self) -> StoreConfig {
        let mut config = StoreConfig::from_env();
        if let Some(dir) = &self.storage_dir {
            config = config.with_storage_dir(dir);
        }
        if let Some(dir) = &self.report_dir {
            config = config.with_report_dir(dir);
        }
        config
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn lookup_table(name: &str) -> Result<&'static TableInfo> {
    by_name(name).ok_or_else(|| {
        let known: Vec<&str> = all_tables().into_iter().map(TableInfo::name).collect();
        Error::InvalidArgumentError(format!(
            "unknown table '{name}' (known tables: {})",
            known.join(", ")
        ))
    })
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.store_config();
    match cli.command {
        Command::Import { csv, table } => {
            let table = lookup_table(&table)?;
            let store = RecordStore::new(config);
            let rows = import_csv(&store, table, &csv)?;
            tracing::info!("imported {rows} rows from {:?} into '{}'", csv, table.name());
        }
        Command::Report { table, name } => {
            let table = lookup_table(&table)?;
            let batch = RecordStore::new(config.clone()).load_all(table)?;
            let path = ReportWriter::new(config).save(&batch, &name)?;
            println!("{}", path.display());
        }
        Command::Tables => {
            for table in all_tables() {
                let columns: Vec<&str> = table.column_names().collect();
                println!("{}: {}", table.name(), columns.join(", "));
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
