#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the road safety dashboard.
//!
//! Serves the derived dashboard views (map geometry, severity counts and
//! monthly histogram) as JSON so any frontend can render them, plus the
//! selector and map metadata, and the static frontend bundle. Each
//! request fetches the year from the upstream source and derives from
//! scratch; nothing is cached between requests.

mod handlers;
pub mod interactive;

use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use road_safety_source::AccidentSource;
use road_safety_source::tfl::TflSource;

/// Shared application state.
pub struct AppState {
    /// Where accident records come from.
    pub source: Arc<dyn AccidentSource>,
}

/// Listener and static file settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind.
    pub bind_addr: String,
    /// Port to bind.
    pub port: u16,
    /// Directory holding the frontend bundle.
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            static_dir: PathBuf::from("app/dist"),
        }
    }
}

impl ServerConfig {
    /// Reads `BIND_ADDR`, `PORT` and `STATIC_DIR`, falling back to the
    /// defaults for anything unset or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            static_dir: std::env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
        }
    }
}

/// Registers the `/api` routes.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/years", web::get().to(handlers::years))
            .route("/severities", web::get().to(handlers::severities))
            .route("/map", web::get().to(handlers::map_viewport))
            .route("/accidents/{year}", web::get().to(handlers::accidents))
            .route("/accidents/{year}/{id}", web::get().to(handlers::accident)),
    );
}

/// Starts the server with the TfL source and environment configuration.
///
/// Initializes logging from `RUST_LOG`. This is a regular async function;
/// the caller provides the runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    serve(Arc::new(TflSource::from_env()), ServerConfig::from_env()).await
}

/// Serves the API over `source` using `config`. Does not touch logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn serve(source: Arc<dyn AccidentSource>, config: ServerConfig) -> std::io::Result<()> {
    log::info!("Serving accident records from {}", source.name());
    let state = web::Data::new(AppState { source });
    let static_dir = config.static_dir.clone();

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure_api)
            // Serve frontend static files (production)
            .service(Files::new("/", &static_dir).index_file("index.html"))
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await
}
