#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Road safety API server binary.
//!
//! Configured entirely through the environment (`TFL_API_URL`,
//! `BIND_ADDR`, `PORT`, `STATIC_DIR`, `RUST_LOG`).

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    road_safety_server::run_server().await
}
