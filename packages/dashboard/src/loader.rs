//! Fetch driver for the dashboard state.
//!
//! [`Loader`] runs a ticket against an [`AccidentSource`] and hands back
//! the result untouched; the state decides whether it still applies.
//! [`DashboardSession`] pairs a loader with a [`DashboardState`] for
//! callers that process one event at a time (the CLI).

use std::sync::Arc;

use road_safety_accident_models::{AccidentRecord, SeverityFilter, Year};
use road_safety_dashboard_models::FilterState;
use road_safety_source::{AccidentSource, SourceError};

use crate::state::{DashboardState, FetchOutcome, FetchTicket};

/// Issues one upstream request per ticket.
#[derive(Clone)]
pub struct Loader {
    source: Arc<dyn AccidentSource>,
}

impl Loader {
    /// Creates a loader over `source`.
    #[must_use]
    pub fn new(source: Arc<dyn AccidentSource>) -> Self {
        Self { source }
    }

    /// The underlying source.
    #[must_use]
    pub fn source(&self) -> &dyn AccidentSource {
        self.source.as_ref()
    }

    /// Fetches the records for `ticket`'s year, returning the ticket
    /// alongside the result so it can be applied later.
    pub async fn fetch(
        &self,
        ticket: FetchTicket,
    ) -> (FetchTicket, Result<Vec<AccidentRecord>, SourceError>) {
        log::debug!(
            "Fetching {} from {} (generation {})",
            ticket.year(),
            self.source.id(),
            ticket.generation()
        );
        let result = self.source.fetch_year(ticket.year()).await;
        (ticket, result)
    }
}

/// A [`DashboardState`] driven sequentially by a [`Loader`].
pub struct DashboardSession {
    state: DashboardState,
    loader: Loader,
}

impl DashboardSession {
    /// Creates the state for `filter` and waits for the initial fetch.
    pub async fn open(loader: Loader, filter: FilterState) -> Self {
        let (state, ticket) = DashboardState::new(filter);
        let mut session = Self { state, loader };
        session.run(ticket).await;
        session
    }

    /// The current state.
    #[must_use]
    pub const fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Selects a year and, if that issues a fetch, waits for it.
    /// Returns `None` when no fetch was needed.
    pub async fn select_year(&mut self, year: Year) -> Option<FetchOutcome> {
        let ticket = self.state.select_year(year)?;
        Some(self.run(ticket).await)
    }

    /// Selects a severity filter.
    pub fn select_severity(&mut self, severity: SeverityFilter) -> bool {
        self.state.select_severity(severity)
    }

    async fn run(&mut self, ticket: FetchTicket) -> FetchOutcome {
        let (ticket, result) = self.loader.fetch(ticket).await;
        self.state.complete_fetch(ticket, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{record, three_records};
    use road_safety_source::memory::MemorySource;
    use road_safety_source::FETCH_FAILED_MESSAGE;

    fn year(value: u16) -> Year {
        Year::new(value).unwrap()
    }

    fn loader() -> Loader {
        let source = MemorySource::new()
            .with_year(year(2019), three_records())
            .with_year(year(2018), vec![record(18, Some("Serious"), "2018-08-08")]);
        Loader::new(Arc::new(source))
    }

    #[tokio::test]
    async fn session_loads_initial_year() {
        let session = DashboardSession::open(loader(), FilterState::default()).await;
        assert_eq!(session.state().records().len(), 3);
        assert_eq!(session.state().views().counts.total, 3);
    }

    #[tokio::test]
    async fn session_switches_year_and_filter() {
        let mut session = DashboardSession::open(loader(), FilterState::default()).await;

        assert_eq!(
            session.select_year(year(2018)).await,
            Some(FetchOutcome::Applied)
        );
        assert_eq!(session.state().records_year(), Some(year(2018)));

        assert!(session.select_severity(SeverityFilter::Serious));
        assert_eq!(session.state().views().geometry.features.len(), 1);
        assert_eq!(session.state().views().histogram.count(7), 1);

        assert_eq!(session.select_year(year(2018)).await, None);
    }

    #[tokio::test]
    async fn session_surfaces_fixed_failure_message() {
        let mut session = DashboardSession::open(loader(), FilterState::default()).await;
        assert_eq!(
            session.select_year(year(2015)).await,
            Some(FetchOutcome::Failed)
        );
        assert_eq!(
            session.state().load_state().error(),
            Some(FETCH_FAILED_MESSAGE)
        );
        assert_eq!(session.state().records_year(), Some(year(2019)));
    }

    #[tokio::test]
    async fn out_of_order_completion_keeps_latest_year() {
        let loader = loader();
        let (mut state, first) = DashboardState::new(FilterState::default());
        let second = state.select_year(year(2018)).unwrap();

        let early = loader.fetch(first);
        let late = loader.fetch(second);

        let (ticket, result) = late.await;
        assert_eq!(state.complete_fetch(ticket, result), FetchOutcome::Applied);
        let (ticket, result) = early.await;
        assert_eq!(state.complete_fetch(ticket, result), FetchOutcome::Stale);

        assert_eq!(state.records_year(), Some(year(2018)));
        assert_eq!(state.records().len(), 1);
    }
}
