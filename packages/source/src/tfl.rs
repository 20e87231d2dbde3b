//! Transport for London `AccidentStats` client.
//!
//! `GET {origin}/AccidentStats/{year}` returns a JSON array of every
//! recorded accident in Greater London for that year. Any non-2xx
//! response is a failure; there is no status-specific handling and no
//! retry.

use async_trait::async_trait;
use road_safety_accident_models::{AccidentRecord, Year};

use crate::{AccidentSource, SourceError};

/// Default API origin.
pub const DEFAULT_API_URL: &str = "https://api.tfl.gov.uk";

/// Environment variable that overrides the API origin.
pub const API_URL_ENV: &str = "TFL_API_URL";

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 500;

/// The API origin from `TFL_API_URL`, or [`DEFAULT_API_URL`] when unset.
#[must_use]
pub fn origin_from_env() -> String {
    std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

/// Accident source backed by the TfL Unified API.
pub struct TflSource {
    client: reqwest::Client,
    api_url: String,
}

impl TflSource {
    /// Creates a source that talks to `api_url` (scheme + host, no
    /// trailing path).
    #[must_use]
    pub fn new(api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            api_url,
        }
    }

    /// Creates a source using `TFL_API_URL`, or [`DEFAULT_API_URL`] when
    /// unset.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(origin_from_env())
    }

    /// The configured API origin.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Builds the request URL for one year.
    #[must_use]
    pub fn year_url(&self, year: Year) -> String {
        format!("{}/AccidentStats/{year}", self.api_url)
    }
}

#[async_trait]
impl AccidentSource for TflSource {
    fn id(&self) -> &'static str {
        "tfl"
    }

    fn name(&self) -> &'static str {
        "Transport for London Open API"
    }

    async fn fetch_year(&self, year: Year) -> Result<Vec<AccidentRecord>, SourceError> {
        let url = self.year_url(year);
        log::info!("Fetching accident records for {year} from {url}");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            log::error!("Accident request for {year} failed: HTTP {status}");
            return Err(SourceError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let text = response.text().await?;
        match parse_records(&text) {
            Ok(records) => {
                log::info!("Received {} accident records for {year}", records.len());
                Ok(records)
            }
            Err(e) => {
                let preview = if text.len() > BODY_PREVIEW_LEN {
                    let mut end = BODY_PREVIEW_LEN;
                    while !text.is_char_boundary(end) {
                        end -= 1;
                    }
                    format!("{}...", &text[..end])
                } else {
                    text.clone()
                };
                log::error!(
                    "Accident response for {year} is not a record list.\n  \
                     url: {url}\n  \
                     received: {} bytes\n  \
                     parse error: {e}\n  \
                     body preview: {preview}",
                    text.len(),
                );
                Err(SourceError::Json(e))
            }
        }
    }
}

/// Parses an `AccidentStats` response body.
///
/// The body must be a JSON array. Elements that cannot be read as an
/// [`AccidentRecord`] at all (for example, no `id`) are skipped with a
/// warning rather than failing the year.
///
/// # Errors
///
/// Returns an error if the body is not a JSON array.
pub fn parse_records(text: &str) -> Result<Vec<AccidentRecord>, serde_json::Error> {
    let values: Vec<serde_json::Value> = serde_json::from_str(text)?;
    let total = values.len();

    let records: Vec<AccidentRecord> = values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                log::debug!("Skipping accident element {index}: {e}");
                None
            }
        })
        .collect();

    if records.len() < total {
        log::warn!(
            "Skipped {} of {total} accident elements that could not be read",
            total - records.len()
        );
    }

    Ok(records)
}
