//! Clearpath command-line shell
//!
//! Thin binary that loads configuration, wires the engine together and runs
//! one command. Business logic lives in the `crates/` directory.

mod commands;
mod state;

use clap::{Parser, Subcommand};
use clearpath_core::AppConfig;
use clearpath_search::SearchRequest;
use state::AppState;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "clearpath", version, about = "Check business name availability across state registries")]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search a name across registries
    Search {
        /// Business name to check
        name: String,
        /// Entity type (LLC, Corporation, LP, LLP, PC, PLLC)
        #[arg(short = 't', long = "type", default_value = "LLC")]
        entity_type: String,
        /// Source to query; repeat for several (defaults to the configured list)
        #[arg(short, long = "source")]
        sources: Vec<String>,
        /// Print each source result as soon as it is stored
        #[arg(short, long)]
        follow: bool,
    },
    /// Show a stored job
    Job {
        /// Job ID
        id: String,
    },
    /// Look up registry detail for a matched entity
    Detail {
        /// Source the entity was found in
        source: String,
        /// Registry file number
        file_number: String,
    },
    /// List the configured sources
    Sources,
}

/// Initialize tracing subscriber for logging
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,clearpath=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    let Some(path) = path else {
        return Ok(AppConfig::load_with_env()?);
    };
    let mut config = AppConfig::load_from(path)?;
    config.apply_env(|key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    info!("Starting Clearpath v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(cli.config.as_ref())?;
    let state = AppState::build(&config).await?;

    let outcome = match cli.command {
        Command::Search {
            name,
            entity_type,
            sources,
            follow,
        } => {
            let request = SearchRequest::new(name, entity_type).with_sources(sources);
            commands::search(&state, request, follow, cli.json).await
        }
        Command::Job { id } => commands::job(&state, &id, cli.json).await,
        Command::Detail {
            source,
            file_number,
        } => commands::detail(&state, &source, &file_number, cli.json).await,
        Command::Sources => commands::sources(&state, cli.json),
    };

    state.shutdown().await;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_search_arguments() {
        let cli = Cli::parse_from([
            "clearpath", "search", "Acme Ventures", "--type", "Corporation", "-s", "de", "-s", "NY",
            "--follow",
        ]);
        match cli.command {
            Command::Search {
                name,
                entity_type,
                sources,
                follow,
            } => {
                assert_eq!(name, "Acme Ventures");
                assert_eq!(entity_type, "Corporation");
                assert_eq!(sources, vec!["de", "NY"]);
                assert!(follow);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_entity_type_defaults_to_llc() {
        let cli = Cli::parse_from(["clearpath", "--json", "search", "Acme"]);
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Command::Search { entity_type, .. } if entity_type == "LLC"
        ));
    }
}
