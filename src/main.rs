use std::error::Error;

use case_vec::{CaseVec, IngestConfig, SentenceEmbedder, fetch_volumes};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "case-vec", about = "Bulk legal-case ingestion into Qdrant")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download reporter-volume archives for the configured jurisdictions.
    Fetch,
    /// Ingest downloaded archives into the vector collection.
    Ingest,
    /// Embed a query and print the nearest stored cases.
    Search {
        query: String,
        #[arg(long, default_value_t = 5)]
        limit: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from an optional .env file.
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    let cli = Cli::parse();
    let cfg = IngestConfig::from_env();

    match cli.command {
        Command::Fetch => {
            let report = fetch_volumes(&cfg).await?;
            println!(
                "downloaded {} volumes, {} already present",
                report.downloaded, report.skipped
            );
        }
        Command::Ingest => {
            // Init phase: store connection and model load are the only
            // fatal failures of a run.
            let store = CaseVec::new(cfg)?;
            let provider = SentenceEmbedder::new()?;

            let report = store.ingest(&provider).await?;
            println!(
                "processed {} cases ({} skipped as duplicates, {} stored, {} bad archives)",
                report.processed, report.skipped, report.stored, report.bad_archives
            );
        }
        Command::Search { query, limit } => {
            let store = CaseVec::new(cfg)?;
            let provider = SentenceEmbedder::new()?;

            for (score, payload) in store.search(&provider, &query, limit).await? {
                let name = payload
                    .get("name_short")
                    .and_then(|v| v.as_str())
                    .unwrap_or("<unnamed>");
                let date = payload
                    .get("date")
                    .and_then(|v| v.as_str())
                    .unwrap_or("");
                println!("{score:.4}  {name}  {date}");
            }
        }
    }

    Ok(())
}
