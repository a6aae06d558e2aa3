//! Handlers for `/geo` endpoints — the cascading jurisdiction-selector data.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/geo/provinces` | All provinces, sorted by name |
//! | `GET`  | `/geo/provinces/:code/cities` | Empty for unknown codes |
//! | `GET`  | `/geo/cities/:code/barangays` | Empty for unknown codes |

use axum::{
  Json,
  extract::{Path, State},
};
use bayan_core::{
  geography::GeographicUnit, store::PlatformStore,
  submission::AdjudicationGateway,
};

use crate::{AppState, error::ApiError};

/// `GET /geo/provinces`
pub async fn provinces<S, G>(
  State(state): State<AppState<S, G>>,
) -> Result<Json<Vec<GeographicUnit>>, ApiError>
where
  S: PlatformStore + Clone + Send + Sync + 'static,
  G: AdjudicationGateway + Clone + Send + Sync + 'static,
{
  Ok(Json(state.geo.provinces().into_iter().cloned().collect()))
}

/// `GET /geo/provinces/:code/cities`
pub async fn cities<S, G>(
  State(state): State<AppState<S, G>>,
  Path(code): Path<String>,
) -> Result<Json<Vec<GeographicUnit>>, ApiError>
where
  S: PlatformStore + Clone + Send + Sync + 'static,
  G: AdjudicationGateway + Clone + Send + Sync + 'static,
{
  Ok(Json(state.geo.cities_of(&code).into_iter().cloned().collect()))
}

/// `GET /geo/cities/:code/barangays`
pub async fn barangays<S, G>(
  State(state): State<AppState<S, G>>,
  Path(code): Path<String>,
) -> Result<Json<Vec<GeographicUnit>>, ApiError>
where
  S: PlatformStore + Clone + Send + Sync + 'static,
  G: AdjudicationGateway + Clone + Send + Sync + 'static,
{
  Ok(Json(state.geo.barangays_of(&code).into_iter().cloned().collect()))
}
