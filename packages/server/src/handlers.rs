//! HTTP handler functions for the road safety API.

use actix_web::{HttpResponse, web};
use road_safety_accident_models::{SeverityFilter, Year};
use road_safety_dashboard::{map, pipeline};
use road_safety_dashboard_models::FilterState;
use road_safety_server_models::{
    AccidentQueryParams, ApiError, ApiHealth, ApiSeverityOption, ApiYears,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/years`
pub async fn years() -> HttpResponse {
    HttpResponse::Ok().json(ApiYears {
        years: Year::all().to_vec(),
        default: Year::default(),
    })
}

/// `GET /api/severities`
///
/// Returns the severity selector options with their shared palette.
pub async fn severities() -> HttpResponse {
    let options: Vec<ApiSeverityOption> = SeverityFilter::all()
        .iter()
        .map(|filter| ApiSeverityOption {
            id: *filter,
            color: filter.color(),
            radius: filter.severity().map(|s| s.style().radius),
        })
        .collect();

    HttpResponse::Ok().json(options)
}

/// `GET /api/map`
pub async fn map_viewport() -> HttpResponse {
    HttpResponse::Ok().json(map::LONDON_VIEWPORT)
}

/// `GET /api/accidents/{year}?severity=All`
///
/// Fetches the year's records and returns the derived views for the
/// requested severity filter.
pub async fn accidents(
    state: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Query<AccidentQueryParams>,
) -> HttpResponse {
    let year: Year = match path.parse() {
        Ok(year) => year,
        Err(e) => return HttpResponse::BadRequest().json(ApiError::new(e.to_string())),
    };

    let severity = match params.severity.as_deref().map(SeverityFilter::parse) {
        None => SeverityFilter::All,
        Some(Ok(severity)) => severity,
        Some(Err(e)) => return HttpResponse::BadRequest().json(ApiError::new(e.to_string())),
    };

    match state.source.fetch_year(year).await {
        Ok(records) => {
            let views = pipeline::derive(&records, FilterState { year, severity });
            HttpResponse::Ok().json(views)
        }
        Err(e) => {
            log::error!("Failed to fetch accidents for {year}: {e}");
            HttpResponse::BadGateway().json(ApiError::new(e.user_message()))
        }
    }
}

/// `GET /api/accidents/{year}/{id}`
///
/// Popup details for one accident on the year's map.
pub async fn accident(
    state: web::Data<AppState>,
    path: web::Path<(String, i64)>,
) -> HttpResponse {
    let (year, id) = path.into_inner();
    let year: Year = match year.parse() {
        Ok(year) => year,
        Err(e) => return HttpResponse::BadRequest().json(ApiError::new(e.to_string())),
    };

    match state.source.fetch_year(year).await {
        Ok(records) => {
            let geometry = pipeline::derive_geometry(&records, SeverityFilter::All);
            match map::accident_popup(&geometry, id) {
                Some(popup) => HttpResponse::Ok().json(popup),
                None => HttpResponse::NotFound()
                    .json(ApiError::new(format!("accident {id} is not on the {year} map"))),
            }
        }
        Err(e) => {
            log::error!("Failed to fetch accidents for {year}: {e}");
            HttpResponse::BadGateway().json(ApiError::new(e.user_message()))
        }
    }
}
