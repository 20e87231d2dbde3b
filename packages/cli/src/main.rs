#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the London road safety dashboard.
//!
//! `summary` prints the stat panel and monthly trend for a year and
//! severity filter, `export` writes the map geometry as `GeoJSON`, and
//! `serve` starts the HTTP API. Without a subcommand the tool runs an
//! interactive session where year and severity can be changed in turn.

mod interactive;
mod progress;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use road_safety_accident_models::{SeverityFilter, Year};
use road_safety_dashboard::loader::{DashboardSession, Loader};
use road_safety_dashboard_models::FilterState;
use road_safety_server::ServerConfig;
use road_safety_source::tfl::{self, TflSource};

#[derive(Parser)]
#[command(name = "road_safety", about = "London road safety explorer")]
struct Cli {
    /// `AccidentStats` API origin (defaults to `TFL_API_URL` or the public
    /// TfL endpoint)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print accident counts and the monthly trend
    Summary {
        /// Year to load (2015-2019)
        #[arg(long, default_value_t = Year::default())]
        year: Year,
        /// Severity filter (All, Fatal, Serious, Slight)
        #[arg(
            long,
            default_value_t = SeverityFilter::All,
            value_parser = SeverityFilter::parse
        )]
        severity: SeverityFilter,
    },
    /// Write the filtered accident points as a `GeoJSON` feature collection
    Export {
        /// Year to load (2015-2019)
        #[arg(long, default_value_t = Year::default())]
        year: Year,
        /// Severity filter (All, Fatal, Serious, Slight)
        #[arg(
            long,
            default_value_t = SeverityFilter::All,
            value_parser = SeverityFilter::parse
        )]
        severity: SeverityFilter,
        /// Output file
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Start the HTTP API server
    Serve {
        /// Prompt for the listener and API origin before starting
        #[arg(long)]
        interactive: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = progress::init_logger();
    let cli = Cli::parse();

    let api_url = cli.api_url.unwrap_or_else(tfl::origin_from_env);
    let source = Arc::new(TflSource::new(api_url.clone()));

    match cli.command {
        None => interactive::run(&multi, Loader::new(source)).await?,
        Some(Commands::Summary { year, severity }) => {
            let session = open(&multi, Loader::new(source), FilterState { year, severity }).await;
            let state = session.state();
            print!("{}", render::render_dashboard(state.views(), state.load_state()));
            if let Some(message) = state.load_state().error() {
                return Err(message.into());
            }
        }
        Some(Commands::Export {
            year,
            severity,
            output,
        }) => {
            let session = open(&multi, Loader::new(source), FilterState { year, severity }).await;
            let state = session.state();
            if let Some(message) = state.load_state().error() {
                return Err(message.into());
            }
            let geometry = &state.views().geometry;
            std::fs::write(&output, serde_json::to_string_pretty(geometry)?)?;
            log::info!(
                "Wrote {} accident points to {}",
                geometry.features.len(),
                output.display()
            );
        }
        Some(Commands::Serve { interactive }) => {
            let config = ServerConfig::from_env();
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(move || {
                let system = actix_web::rt::System::new();
                if interactive {
                    system.block_on(road_safety_server::interactive::run(api_url))
                } else {
                    system.block_on(road_safety_server::serve(source, config))
                }
            })
            .await??;
        }
    }

    Ok(())
}

async fn open(
    multi: &indicatif::MultiProgress,
    loader: Loader,
    filter: FilterState,
) -> DashboardSession {
    progress::with_spinner(
        multi,
        &format!("Fetching {} accident records...", filter.year),
        DashboardSession::open(loader, filter),
    )
    .await
}
