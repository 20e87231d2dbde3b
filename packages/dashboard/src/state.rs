//! Dashboard state container.
//!
//! [`DashboardState`] owns the filter selectors, the raw records for the
//! loaded year, the load status and the derived views. Each field has a
//! single update entry point and every transition that touches records
//! or the severity filter re-derives all views from scratch.
//!
//! Fetches are issued as [`FetchTicket`]s. A completion is applied only
//! if its ticket is the most recent one issued and still matches the
//! selected year; anything else is a stale response and is dropped.

use road_safety_accident_models::{AccidentRecord, SeverityFilter, Year};
use road_safety_dashboard_models::{DerivedViews, FilterState, LoadState};
use road_safety_source::SourceError;

use crate::pipeline;

/// Identifies one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket {
    year: Year,
    generation: u64,
}

impl FetchTicket {
    /// The year this fetch was issued for.
    #[must_use]
    pub const fn year(self) -> Year {
        self.year
    }

    /// Monotonic issue counter.
    #[must_use]
    pub const fn generation(self) -> u64 {
        self.generation
    }
}

/// What [`DashboardState::complete_fetch`] did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Records replaced and views re-derived.
    Applied,
    /// The fetch failed; the state now shows the failure message.
    Failed,
    /// A newer fetch superseded this one; nothing changed.
    Stale,
}

/// Single owner of filter state, raw records and derived views.
#[derive(Debug)]
pub struct DashboardState {
    filter: FilterState,
    load: LoadState,
    records: Vec<AccidentRecord>,
    records_year: Option<Year>,
    views: DerivedViews,
    generation: u64,
    pending: Option<FetchTicket>,
}

impl DashboardState {
    /// Creates the state for `filter` and issues the initial fetch.
    #[must_use]
    pub fn new(filter: FilterState) -> (Self, FetchTicket) {
        let mut state = Self {
            filter,
            load: LoadState::Loading,
            records: Vec::new(),
            records_year: None,
            views: pipeline::derive(&[], filter),
            generation: 0,
            pending: None,
        };
        let ticket = state.issue();
        (state, ticket)
    }

    /// Current selectors.
    #[must_use]
    pub const fn filter(&self) -> FilterState {
        self.filter
    }

    /// Progress of the latest fetch.
    #[must_use]
    pub const fn load_state(&self) -> &LoadState {
        &self.load
    }

    /// Raw records currently held.
    #[must_use]
    pub fn records(&self) -> &[AccidentRecord] {
        &self.records
    }

    /// Year of the records currently held, `None` before the first
    /// successful fetch.
    #[must_use]
    pub const fn records_year(&self) -> Option<Year> {
        self.records_year
    }

    /// Views derived from the records currently held.
    #[must_use]
    pub const fn views(&self) -> &DerivedViews {
        &self.views
    }

    /// The fetch whose result would currently be applied.
    #[must_use]
    pub const fn pending(&self) -> Option<FetchTicket> {
        self.pending
    }

    /// Selects a year.
    ///
    /// Returns a ticket to fetch when the year differs from the current
    /// selection, or when it is re-selected after a failed fetch. Records
    /// already held stay in place until the new fetch succeeds.
    pub fn select_year(&mut self, year: Year) -> Option<FetchTicket> {
        let retry = year == self.filter.year && self.load.error().is_some();
        if year == self.filter.year && !retry {
            return None;
        }
        self.filter.year = year;
        Some(self.issue())
    }

    /// Selects a severity filter and re-derives the views. Returns whether
    /// anything changed.
    pub fn select_severity(&mut self, severity: SeverityFilter) -> bool {
        if severity == self.filter.severity {
            return false;
        }
        self.filter.severity = severity;
        self.rederive();
        true
    }

    /// Applies the result of the fetch identified by `ticket`.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<AccidentRecord>, SourceError>,
    ) -> FetchOutcome {
        if self.pending != Some(ticket) || ticket.year != self.filter.year {
            log::debug!(
                "Discarding stale response for {} (generation {})",
                ticket.year,
                ticket.generation
            );
            return FetchOutcome::Stale;
        }
        self.pending = None;

        match result {
            Ok(records) => {
                log::info!("Loaded {} accident records for {}", records.len(), ticket.year);
                self.records = records;
                self.records_year = Some(ticket.year);
                self.load = LoadState::Ready;
                self.rederive();
                FetchOutcome::Applied
            }
            Err(e) => {
                log::error!("Failed to load accident records for {}: {e}", ticket.year);
                self.load = LoadState::Failed {
                    message: e.user_message().to_string(),
                };
                FetchOutcome::Failed
            }
        }
    }

    fn issue(&mut self) -> FetchTicket {
        self.generation += 1;
        let ticket = FetchTicket {
            year: self.filter.year,
            generation: self.generation,
        };
        self.pending = Some(ticket);
        self.load = LoadState::Loading;
        ticket
    }

    fn rederive(&mut self) {
        let filter = FilterState {
            year: self.records_year.unwrap_or(self.filter.year),
            severity: self.filter.severity,
        };
        self.views = pipeline::derive(&self.records, filter);
    }
}
