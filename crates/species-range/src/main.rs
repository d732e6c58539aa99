//! Species Range - Command-line entry point.
//!
//! Logs go to stderr so stdout carries only the requested output.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use species_range::{
    GapRangeSource, SpeciesRangeClient, config::Config, formatters, list_available_sources,
};

#[derive(Parser, Debug)]
#[command(name = "species-range")]
#[command(about = "Retrieve USGS GAP species range maps from ScienceBase")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// ScienceBase base URL
    #[arg(long, global = true, env = "SCIENCEBASE_URL")]
    sciencebase_url: Option<String>,

    /// GBIF API base URL
    #[arg(long, global = true, env = "GBIF_API_URL")]
    gbif_url: Option<String>,

    /// Do not retry unmatched names with their GBIF scientific name
    #[arg(long, global = true)]
    no_taxonomy_fallback: bool,

    /// Retries for transient HTTP failures
    #[arg(long, global = true, env = "SPECIES_RANGE_RETRIES")]
    retries: Option<u32>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Retrieve the range map for a species
    Get {
        /// Common or scientific name
        name: String,

        /// Write the range table as GeoJSON to this file
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Print a JSON summary instead of Markdown
        #[arg(long)]
        json: bool,
    },
    /// List range-map candidates for a query
    Search {
        /// Common or scientific name
        query: String,

        /// Print JSON instead of Markdown
        #[arg(long)]
        json: bool,
    },
    /// List the available range sources
    Sources,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::from_env()?;
    if let Some(url) = &cli.sciencebase_url {
        config.sciencebase_url.clone_from(url);
    }
    if let Some(url) = &cli.gbif_url {
        config.gbif_api_url.clone_from(url);
    }
    if let Some(retries) = cli.retries {
        config.max_retries = retries;
    }
    if cli.no_taxonomy_fallback {
        config.taxonomy_fallback = false;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), command = ?cli.command, "Starting species-range");

    if matches!(cli.command, Command::Sources) {
        let sources = list_available_sources();
        println!("{}", formatters::format_sources_markdown(&sources));
        return Ok(());
    }

    let config = build_config(&cli)?;
    let client = SpeciesRangeClient::new(config)?;
    let source = GapRangeSource::new(client.into());

    match cli.command {
        Command::Get { name, output, json } => {
            let table = match source.get_species_range(&name).await {
                Ok(table) => table,
                Err(e) => anyhow::bail!(e.to_user_message()),
            };

            if let Some(path) = &output {
                let text = formatters::to_geojson_string(&table)?;
                std::fs::write(path, text)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                tracing::info!(path = %path.display(), "Wrote GeoJSON");
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&formatters::compact_range(&table))?);
            } else {
                println!("{}", formatters::format_range_markdown(&table));
            }
        }
        Command::Search { query, json } => {
            let items = match source.search_species(&query).await {
                Ok(items) => items,
                Err(e) => anyhow::bail!(e.to_user_message()),
            };

            if json {
                let values: Vec<_> = items.iter().map(formatters::compact_item).collect();
                println!("{}", serde_json::to_string_pretty(&values)?);
            } else {
                println!("{}", formatters::format_search_markdown(&query, &items));
            }
        }
        Command::Sources => {}
    }

    Ok(())
}
