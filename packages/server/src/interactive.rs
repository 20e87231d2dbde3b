//! Interactive mode for the server.
//!
//! Prompts for the listener and the upstream API origin before starting.

use std::sync::Arc;

use dialoguer::{Confirm, Input};
use road_safety_source::tfl::TflSource;

use crate::ServerConfig;

/// Runs the server in interactive mode, prompting for configuration.
///
/// Asks for a bind address, port and `AccidentStats` API origin, then
/// delegates to [`super::serve`]. The origin prompt defaults to
/// `default_api_url`. Logging must already be initialized.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run(default_api_url: String) -> std::io::Result<()> {
    println!("London Road Safety Server");
    println!();

    let defaults = ServerConfig::from_env();

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(defaults.bind_addr.clone())
        .interact_text()
        .unwrap_or_else(|_| defaults.bind_addr.clone());

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(defaults.port)
        .interact_text()
        .unwrap_or(defaults.port);

    let api_url: String = Input::new()
        .with_prompt("AccidentStats API origin")
        .default(default_api_url.clone())
        .interact_text()
        .unwrap_or(default_api_url);

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    let config = ServerConfig {
        bind_addr,
        port,
        ..defaults
    };
    super::serve(Arc::new(TflSource::new(api_url)), config).await
}
