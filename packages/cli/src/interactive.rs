//! Interactive dashboard session.
//!
//! Prompts for a year and severity, then loops: print the dashboard,
//! ask what to change. A year change fetches again; a severity change
//! only re-derives.

use dialoguer::{Input, Select};
use indicatif::MultiProgress;
use road_safety_accident_models::{SeverityFilter, Year};
use road_safety_dashboard::loader::{DashboardSession, Loader};
use road_safety_dashboard::state::FetchOutcome;
use road_safety_dashboard_models::FilterState;

use crate::progress::with_spinner;
use crate::render::render_dashboard;

enum Action {
    ChangeYear,
    ChangeSeverity,
    Export,
    Quit,
}

impl Action {
    const ALL: &[Self] = &[
        Self::ChangeYear,
        Self::ChangeSeverity,
        Self::Export,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::ChangeYear => "Change year",
            Self::ChangeSeverity => "Change severity",
            Self::Export => "Export map points (GeoJSON)",
            Self::Quit => "Quit",
        }
    }
}

/// Runs the interactive session until the user quits.
///
/// # Errors
///
/// Returns an error if a prompt fails or an export cannot be written.
pub async fn run(multi: &MultiProgress, loader: Loader) -> Result<(), Box<dyn std::error::Error>> {
    println!("London Road Safety Explorer");
    println!("Data source: {}", loader.source().name());
    println!();

    let year = prompt_year(Year::default())?;
    let severity = prompt_severity(SeverityFilter::All)?;

    let mut session = with_spinner(
        multi,
        &format!("Fetching {year} accident records..."),
        DashboardSession::open(loader, FilterState { year, severity }),
    )
    .await;

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    loop {
        let state = session.state();
        println!();
        print!("{}", render_dashboard(state.views(), state.load_state()));
        println!();

        let idx = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;

        match Action::ALL[idx] {
            Action::ChangeYear => {
                let year = prompt_year(session.state().filter().year)?;
                let outcome = with_spinner(
                    multi,
                    &format!("Fetching {year} accident records..."),
                    session.select_year(year),
                )
                .await;
                if outcome.is_none() {
                    println!("Already showing {year}.");
                } else if outcome == Some(FetchOutcome::Failed) {
                    log::warn!("Re-select {year} to retry");
                }
            }
            Action::ChangeSeverity => {
                let severity = prompt_severity(session.state().filter().severity)?;
                session.select_severity(severity);
            }
            Action::Export => {
                let path: String = Input::new()
                    .with_prompt("Output file")
                    .default("accidents.geojson".to_string())
                    .interact_text()?;
                let geometry = &session.state().views().geometry;
                std::fs::write(&path, serde_json::to_string_pretty(geometry)?)?;
                println!("Wrote {} accident points to {path}", geometry.features.len());
            }
            Action::Quit => break,
        }
    }

    Ok(())
}

fn prompt_year(current: Year) -> Result<Year, dialoguer::Error> {
    let years = Year::all();
    let labels: Vec<String> = years.iter().map(ToString::to_string).collect();
    let default = years.iter().position(|y| *y == current).unwrap_or(0);

    let idx = Select::new()
        .with_prompt("Select year")
        .items(&labels)
        .default(default)
        .interact()?;
    Ok(years[idx])
}

fn prompt_severity(current: SeverityFilter) -> Result<SeverityFilter, dialoguer::Error> {
    let options = SeverityFilter::all();
    let labels: Vec<&str> = options.iter().map(|s| s.as_ref()).collect();
    let default = options.iter().position(|s| *s == current).unwrap_or(0);

    let idx = Select::new()
        .with_prompt("Accident severity")
        .items(&labels)
        .default(default)
        .interact()?;
    Ok(options[idx])
}
