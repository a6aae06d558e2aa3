//! JSON REST API for the bayan verification core.
//!
//! Exposes an axum [`Router`] backed by any [`PlatformStore`] and
//! [`AdjudicationGateway`]. TLS and transport concerns are the caller's
//! responsibility.

pub mod auth;
pub mod coverage;
pub mod error;
pub mod geo;
pub mod invites;
pub mod wizard;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use bayan_core::{
  geography::GeographyIndex, store::PlatformStore,
  submission::AdjudicationGateway,
};
use serde::Deserialize;

use auth::AuthConfig;

// ─── Configuration ────────────────────────────────────────────────────────────

fn default_invite_ttl_hours() -> i64 { 72 }

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  /// Public origin used to build onboarding links,
  /// e.g. `https://portal.example.ph`.
  pub public_origin:       String,
  pub store_path:          PathBuf,
  /// JSON array of canonical geographic units.
  pub geography_path:      PathBuf,
  /// Full URL of the external adjudicator's submission endpoint.
  pub submission_url:      String,
  pub admin_username:      String,
  pub admin_password_hash: String,
  #[serde(default = "default_invite_ttl_hours")]
  pub invite_ttl_hours:    i64,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: PlatformStore, G: AdjudicationGateway> {
  pub store:   Arc<S>,
  pub gateway: Arc<G>,
  pub geo:     Arc<GeographyIndex>,
  pub config:  Arc<ServerConfig>,
  pub auth:    Arc<AuthConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build an axum [`Router`] for the verification core.
pub fn router<S, G>(state: AppState<S, G>) -> Router
where
  S: PlatformStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: AdjudicationGateway + Clone + Send + Sync + 'static,
{
  Router::new()
    // Canonical geography (cascading selector data)
    .route("/geo/provinces", get(geo::provinces::<S, G>))
    .route("/geo/provinces/{code}/cities", get(geo::cities::<S, G>))
    .route("/geo/cities/{code}/barangays", get(geo::barangays::<S, G>))
    // Admin: coverage + invites
    .route("/coverage", get(coverage::show::<S, G>))
    .route("/invites", post(invites::create::<S, G>))
    .route("/invites/{token}", get(invites::show::<S, G>))
    .route("/invites/{token}/consume", post(invites::consume::<S, G>))
    // Resident: verification wizard
    .route(
      "/wizard",
      get(wizard::show::<S, G>).delete(wizard::abandon::<S, G>),
    )
    .route("/wizard/jurisdiction", post(wizard::jurisdiction::<S, G>))
    .route("/wizard/biodata", post(wizard::biodata::<S, G>))
    .route("/wizard/location", post(wizard::location::<S, G>))
    .route("/wizard/document", post(wizard::document::<S, G>))
    .route("/wizard/selfie", post(wizard::selfie::<S, G>))
    .route("/wizard/advance", post(wizard::advance::<S, G>))
    .route("/wizard/back", post(wizard::back::<S, G>))
    .route("/wizard/submit", post(wizard::submit::<S, G>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
