//! Handler for `GET /coverage` — the admin onboarding-coverage view.

use axum::{
  Json,
  extract::{Query, State},
};
use bayan_core::{
  reconcile::{self, ReconciledJurisdiction},
  store::PlatformStore,
  submission::AdjudicationGateway,
};
use serde::Deserialize;

use crate::{AppState, auth::Admin, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct CoverageParams {
  /// Canonical province code.
  pub province: String,
  /// Canonical city code.
  pub city:     String,
  /// Optional free-text filter, applied after matching.
  pub q:        Option<String>,
}

/// `GET /coverage?province=<code>&city=<code>[&q=<filter>]`
///
/// Pure read-and-join: safe to call per keystroke of the admin search box.
/// Unresolved codes yield an empty list, not an error.
pub async fn show<S, G>(
  _admin: Admin,
  State(state): State<AppState<S, G>>,
  Query(params): Query<CoverageParams>,
) -> Result<Json<Vec<ReconciledJurisdiction>>, ApiError>
where
  S: PlatformStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: AdjudicationGateway + Clone + Send + Sync + 'static,
{
  let (Some(province), Some(city)) =
    (state.geo.get(&params.province), state.geo.get(&params.city))
  else {
    return Ok(Json(Vec::new()));
  };

  let tenants = state
    .store
    .tenants_in_city(&province.name, &city.name)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(reconcile::reconcile(
    &state.geo,
    &tenants,
    &params.province,
    &params.city,
    params.q.as_deref(),
  )))
}
