//! Sportsquiz · Sports Trivia Backend
//!
//! - Axum HTTP API: quiz sessions, Elo ratings, survival mode
//! - In-memory stores seeded from built-in tables plus an optional TOML bank
//!
//! Important env variables:
//!   PORT            : u16 (default 3000)
//!   APP_CONFIG_PATH : path to TOML config (tunables + optional fact bank)
//!   LOG_LEVEL       : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT      : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod error;
mod config;
mod seeds;
mod corpus;
mod distractor;
mod question;
mod logic;
mod session;
mod elo;
mod survival;
mod state;
mod protocol;
mod routes;

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

/// Sweep cadence for TTL-expired quiz sessions and survival rounds; expiry
/// is also checked lazily on access, so this only bounds memory for
/// abandoned state.
const SWEEP_INTERVAL_SECS: u64 = 60;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (corpus, session coordinator, engines).
  let state = AppState::new();

  let coordinator = state.coordinator.clone();
  let survival = state.survival.clone();
  tokio::spawn(async move {
    let mut tick = tokio::time::interval(Duration::from_secs(SWEEP_INTERVAL_SECS));
    loop {
      tick.tick().await;
      coordinator.sweep_expired().await;
      survival.sweep_expired().await;
    }
  });

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state);

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "sportsquiz_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
