use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use query_record_core::{ClientConfig, QueryRecord, RecordId, RecordService, RecordStatus};

#[derive(Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "Client for the query record backend", long_about = None)]
struct Cli {
    /// Backend base URL (overrides QUERY_RECORDS_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Request timeout in milliseconds (overrides QUERY_RECORDS_TIMEOUT_MS)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_ms: Option<u64>,

    /// Health-check timeout in milliseconds (overrides QUERY_RECORDS_HEALTH_TIMEOUT_MS)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    health_timeout_ms: Option<u64>,

    /// Print records as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a query without storing it
    Query { query: String },

    /// Run a query and store the result as a record
    Store { query: String },

    /// List active records
    List {
        /// Include soft-deleted records
        #[arg(long)]
        all: bool,
    },

    /// Show one record
    Get { id: String },

    /// Soft-delete a record
    Delete { id: String },

    /// Restore a soft-deleted record
    Restore { id: String },

    /// Set a record's status code directly (A or I)
    Status { id: String, status: String },

    /// Check that the backend is reachable
    Health,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env().context("invalid client configuration")?;
    if let Some(url) = &cli.base_url {
        config = config.with_base_url(url);
    }
    if let Some(ms) = cli.timeout_ms {
        config = config.with_request_timeout(Duration::from_millis(ms));
    }
    if let Some(ms) = cli.health_timeout_ms {
        config = config.with_health_check_timeout(Duration::from_millis(ms));
    }
    log::debug!("using backend at {}", config.base_url);

    let service = RecordService::connect(config);
    let json = cli.json;

    match cli.command {
        Commands::Query { query } => println!("{}", service.execute_query(&query)?),
        Commands::Store { query } => print_record(&service.execute_query_and_store(&query)?, json)?,
        Commands::List { all } => {
            let records = if all {
                service.list_all()?
            } else {
                service.list_active()?
            };
            print_records(&records, json)?;
        }
        Commands::Get { id } => match service.get_by_id(&RecordId::new(id.as_str()))? {
            Some(record) => print_record(&record, json)?,
            None => println!("record {id} is inactive"),
        },
        Commands::Delete { id } => print_record(&service.soft_delete(&RecordId::new(id))?, json)?,
        Commands::Restore { id } => print_record(&service.restore(&RecordId::new(id))?, json)?,
        Commands::Status { id, status } => {
            let status = RecordStatus::from_code(&status)
                .with_context(|| format!("status must be A or I, got {status:?}"))?;
            print_record(&service.set_status(&RecordId::new(id), status)?, json)?;
        }
        Commands::Health => {
            service.check_connection()?;
            println!("backend reachable");
        }
    }

    Ok(())
}

fn print_record(record: &QueryRecord, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
    } else {
        println!("{}", summary(record));
    }
    Ok(())
}

fn print_records(records: &[QueryRecord], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }
    if records.is_empty() {
        println!("no records");
    }
    for record in records {
        println!("{}", summary(record));
    }
    Ok(())
}

fn summary(record: &QueryRecord) -> String {
    format!(
        "[{}] {} {} | {} => {}",
        record.status.code(),
        record.id,
        record.timestamp.format("%Y-%m-%d %H:%M:%S"),
        record.query,
        record.result
    )
}
