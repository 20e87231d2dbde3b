//! In-memory accident source.

use std::collections::BTreeMap;

use async_trait::async_trait;
use road_safety_accident_models::{AccidentRecord, Year};

use crate::{AccidentSource, SourceError};

/// Serves fixed record lists per year. Years without records answer
/// like an upstream `404`.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    years: BTreeMap<Year, Vec<AccidentRecord>>,
}

impl MemorySource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the records returned for `year`.
    #[must_use]
    pub fn with_year(mut self, year: Year, records: Vec<AccidentRecord>) -> Self {
        self.years.insert(year, records);
        self
    }
}

#[async_trait]
impl AccidentSource for MemorySource {
    fn id(&self) -> &'static str {
        "memory"
    }

    fn name(&self) -> &'static str {
        "In-memory records"
    }

    async fn fetch_year(&self, year: Year) -> Result<Vec<AccidentRecord>, SourceError> {
        self.years
            .get(&year)
            .cloned()
            .ok_or_else(|| SourceError::Status {
                status: 404,
                url: format!("memory://AccidentStats/{year}"),
            })
    }
}
