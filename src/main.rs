use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use corpus::config::{ScenarioFile, load_scenario_file};
use corpus::report::render_comparison;

#[derive(Parser, Debug)]
#[command(
    name = "corpus",
    about = "Multi-year capital projections with contributions, withdrawals, loans and inflation"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the web calculator and JSON API
    Serve {
        #[arg(default_value_t = 8080)]
        port: u16,
    },
    /// Project a scenario set and print the comparison
    Compare {
        #[arg(long, help = "Scenario set JSON; defaults to the built-in scenarios")]
        input: Option<PathBuf>,
        #[arg(long, help = "Print the comparison as JSON instead of text")]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Serve { port } => corpus::api::run_http_server(port)
            .await
            .context("server error"),
        Command::Compare { input, json } => run_compare(input, json),
    }
}

fn run_compare(input: Option<PathBuf>, json: bool) -> Result<()> {
    let file = match &input {
        Some(path) => load_scenario_file(path)?,
        None => ScenarioFile::defaults(),
    };
    let set = file.into_scenario_set()?;
    info!(scenarios = set.len(), source = ?input, "projecting scenario set");

    let comparison = set.compare();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&comparison).context("failed to serialize comparison")?
        );
    } else {
        print!("{}", render_comparison(&comparison));
    }
    Ok(())
}
