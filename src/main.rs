use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use configuration::{load_config, ConfigArgs, Settings};
use contact_service::{ContactService, Listing};
use core_types::{Contact, CSV_COLUMNS};
use database::{connect, ensure_schema, PgContactStore};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

/// The main entry point for the contacts application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file, when there is one.
    dotenvy::dotenv().ok();
    let _guard = web_server::init_tracing();

    // Parse command-line arguments
    let cli = Cli::parse();
    let settings = load_config(&cli.config.config)
        .with_context(|| format!("Failed to load {}", cli.config.config.display()))?;

    // Execute the appropriate command
    match cli.command {
        Commands::Serve => web_server::run_server(settings).await,
        Commands::List => handle_list(&settings).await,
        Commands::Export(args) => handle_export(&settings, args).await,
        Commands::Import(args) => handle_import(&settings, args).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// An address book service with CSV import and export.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Serve,
    /// Print every contact.
    List,
    /// Write all contacts to a CSV file.
    Export(ExportArgs),
    /// Create or update contacts from a CSV file.
    Import(ImportArgs),
}

#[derive(Parser)]
struct ExportArgs {
    /// Destination file.
    #[arg(long, short, default_value = "contacts.csv")]
    out: PathBuf,
}

#[derive(Parser)]
struct ImportArgs {
    /// CSV file with an `id,first_name,last_name,email,phone` header.
    file: PathBuf,
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// Connects to the configured database and wraps it in the service.
async fn service(settings: &Settings) -> anyhow::Result<ContactService> {
    let pool = connect(&settings.database)
        .await
        .context("Failed to connect to the database")?;
    let store = PgContactStore::new(pool, &settings.database.table)?;
    ensure_schema(store.pool(), store.statements()).await?;
    Ok(ContactService::new(Arc::new(store)))
}

async fn handle_list(settings: &Settings) -> anyhow::Result<()> {
    match service(settings).await?.read_all().await? {
        Listing::Entries(contacts) => println!("{}", contact_table(&contacts)),
        Listing::Count(message) => println!("{message}"),
    }
    Ok(())
}

async fn handle_export(settings: &Settings, args: ExportArgs) -> anyhow::Result<()> {
    let export = service(settings).await?.export().await?;
    let rows = export.rows();
    let bytes = export.into_bytes()?;
    std::fs::write(&args.out, bytes)
        .with_context(|| format!("Failed to write {}", args.out.display()))?;
    println!("Exported {} contacts to {}", rows, args.out.display());
    Ok(())
}

async fn handle_import(settings: &Settings, args: ImportArgs) -> anyhow::Result<()> {
    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;

    match service(settings).await?.import(file).await {
        Ok(outcome) if outcome.is_clean() => {
            println!("Imported {} contacts.", outcome.accepted);
        }
        Ok(outcome) => {
            println!(
                "Imported {} contacts; {} rejected for duplicate emails:",
                outcome.accepted,
                outcome.rejected.len()
            );
            println!("{}", contact_table(&outcome.rejected));
        }
        Err(aborted) => {
            if !aborted.rejected.is_empty() {
                println!("Rejected before the failure:");
                println!("{}", contact_table(&aborted.rejected));
            }
            return Err(aborted.into());
        }
    }
    Ok(())
}

fn contact_table(contacts: &[Contact]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(CSV_COLUMNS);
    for contact in contacts {
        table.add_row(vec![
            &contact.id,
            &contact.first_name,
            &contact.last_name,
            &contact.email,
            &contact.phone,
        ]);
    }
    table
}
