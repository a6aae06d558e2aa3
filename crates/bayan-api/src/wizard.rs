//! Handlers for `/wizard` endpoints — the resident verification flow.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/wizard` | Load-or-fresh draft plus re-derived option lists |
//! | `POST` | `/wizard/jurisdiction` | Body: `{tenant_id, province_code, city_code}` |
//! | `POST` | `/wizard/biodata` | Body: `{birth_date, mothers_maiden_name}` |
//! | `POST` | `/wizard/location` | Body: `{lat, lng}` or `{denied: "..."}` |
//! | `POST` | `/wizard/document` | Body: `{image}` |
//! | `POST` | `/wizard/selfie` | Body: `{image}` |
//! | `POST` | `/wizard/advance` | 409 with the unmet requirement on guard failure |
//! | `POST` | `/wizard/back` | Always permitted; never discards captures |
//! | `POST` | `/wizard/submit` | Terminal outcome clears the draft |
//! | `DELETE` | `/wizard` | Explicit abandonment; clears the draft |
//!
//! Every successful capture and transition persists the full draft. Saves
//! are fire-and-forget relative to navigation: the state returned to the
//! client stays authoritative, and only cross-reload resumption depends on
//! the write having landed.

use axum::{Json, extract::State};
use bayan_core::{
  Error as CoreError,
  geofence::Coordinates,
  geography::GeographicUnit,
  reconcile::{self, ReconciledJurisdiction},
  store::PlatformStore,
  submission::{AdjudicationGateway, VerificationOutcome},
  wizard::VerificationDraft,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, auth::Principal, error::ApiError};

// ─── View ────────────────────────────────────────────────────────────────────

/// The draft plus the dependent option lists re-derived from its saved
/// selector codes, so a resumed wizard can pre-fill its cascading selectors.
#[derive(Debug, Serialize)]
pub struct WizardView {
  pub draft:          VerificationDraft,
  pub cities:         Vec<GeographicUnit>,
  /// Reconciled entries with a live tenant for the saved city — the options
  /// a resident can register under.
  pub tenant_options: Vec<ReconciledJurisdiction>,
}

async fn build_view<S, G>(
  state: &AppState<S, G>,
  draft: VerificationDraft,
) -> Result<WizardView, ApiError>
where
  S: PlatformStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: AdjudicationGateway + Clone + Send + Sync + 'static,
{
  let cities = draft
    .selected_province_code
    .as_deref()
    .map(|code| state.geo.cities_of(code).into_iter().cloned().collect())
    .unwrap_or_default();

  let mut tenant_options = Vec::new();
  if let (Some(province_code), Some(city_code)) = (
    draft.selected_province_code.as_deref(),
    draft.selected_city_code.as_deref(),
  ) && let (Some(province), Some(city)) =
    (state.geo.get(province_code), state.geo.get(city_code))
  {
    let tenants = state
      .store
      .tenants_in_city(&province.name, &city.name)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?;
    tenant_options = reconcile::reconcile(
      &state.geo,
      &tenants,
      province_code,
      city_code,
      None,
    );
    tenant_options.retain(|r| r.tenant.is_some());
  }

  Ok(WizardView { draft, cities, tenant_options })
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

async fn load_or_new<S, G>(
  state: &AppState<S, G>,
  owner: Uuid,
) -> Result<VerificationDraft, ApiError>
where
  S: PlatformStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: AdjudicationGateway + Clone + Send + Sync + 'static,
{
  Ok(
    state
      .store
      .load_draft(owner)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?
      .unwrap_or_else(|| VerificationDraft::new(owner)),
  )
}

/// Persist the full draft; log and swallow failures. The in-memory state
/// just returned to the client remains authoritative for the session.
async fn persist<S, G>(state: &AppState<S, G>, draft: &VerificationDraft)
where
  S: PlatformStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: AdjudicationGateway + Clone + Send + Sync + 'static,
{
  if let Err(e) = state.store.save_draft(draft).await {
    tracing::warn!(
      owner = %draft.owner_user_id,
      error = %e,
      "draft save failed; resumption after reload may be stale"
    );
  }
}

fn wizard_error(e: CoreError) -> ApiError {
  match e {
    CoreError::GuardUnsatisfied { .. }
    | CoreError::FinalStep
    | CoreError::NotSubmittable(_) => ApiError::Conflict(e.to_string()),
    other => ApiError::BadRequest(other.to_string()),
  }
}

// ─── Show ────────────────────────────────────────────────────────────────────

/// `GET /wizard` — resume the owner's draft (or a fresh one at step 1).
/// Fresh drafts are created lazily: nothing is persisted until the first
/// capture.
pub async fn show<S, G>(
  principal: Principal,
  State(state): State<AppState<S, G>>,
) -> Result<Json<WizardView>, ApiError>
where
  S: PlatformStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: AdjudicationGateway + Clone + Send + Sync + 'static,
{
  let draft = load_or_new(&state, principal.user_id).await?;
  Ok(Json(build_view(&state, draft).await?))
}

// ─── Captures ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct JurisdictionBody {
  pub tenant_id:     Uuid,
  pub province_code: String,
  pub city_code:     String,
}

/// `POST /wizard/jurisdiction`
pub async fn jurisdiction<S, G>(
  principal: Principal,
  State(state): State<AppState<S, G>>,
  Json(body): Json<JurisdictionBody>,
) -> Result<Json<VerificationDraft>, ApiError>
where
  S: PlatformStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: AdjudicationGateway + Clone + Send + Sync + 'static,
{
  state
    .store
    .get_tenant(body.tenant_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::NotFound(format!("tenant {} not found", body.tenant_id))
    })?;

  let mut draft = load_or_new(&state, principal.user_id).await?;
  draft.select_jurisdiction(body.tenant_id, body.province_code, body.city_code);
  persist(&state, &draft).await;
  Ok(Json(draft))
}

#[derive(Debug, Deserialize)]
pub struct BiodataBody {
  pub birth_date:          NaiveDate,
  pub mothers_maiden_name: String,
}

/// `POST /wizard/biodata`
pub async fn biodata<S, G>(
  principal: Principal,
  State(state): State<AppState<S, G>>,
  Json(body): Json<BiodataBody>,
) -> Result<Json<VerificationDraft>, ApiError>
where
  S: PlatformStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: AdjudicationGateway + Clone + Send + Sync + 'static,
{
  let mut draft = load_or_new(&state, principal.user_id).await?;
  draft
    .set_biodata(body.birth_date, &body.mothers_maiden_name)
    .map_err(wizard_error)?;
  persist(&state, &draft).await;
  Ok(Json(draft))
}

/// A geolocation capture result: either a fix, or a report that the browser
/// permission was refused.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LocationBody {
  Fix { lat: f64, lng: f64 },
  Denied { denied: String },
}

/// `POST /wizard/location`
///
/// A denial report yields a visible, retryable error and leaves the draft
/// untouched; there is no automatic retry loop.
pub async fn location<S, G>(
  principal: Principal,
  State(state): State<AppState<S, G>>,
  Json(body): Json<LocationBody>,
) -> Result<Json<VerificationDraft>, ApiError>
where
  S: PlatformStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: AdjudicationGateway + Clone + Send + Sync + 'static,
{
  let fix = match body {
    LocationBody::Fix { lat, lng } => Coordinates { lat, lng },
    LocationBody::Denied { denied } => {
      tracing::info!(owner = %principal.user_id, reason = %denied, "geolocation capture denied");
      return Err(ApiError::CaptureDenied(denied));
    }
  };

  let mut draft = load_or_new(&state, principal.user_id).await?;

  let centroid = match draft.tenant_id {
    Some(tenant_id) => state
      .store
      .get_tenant(tenant_id)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?
      .and_then(|t| t.centroid),
    None => None,
  };

  draft.set_location_fix(fix, centroid);
  persist(&state, &draft).await;
  Ok(Json(draft))
}

#[derive(Debug, Deserialize)]
pub struct ImageBody {
  pub image: String,
}

/// `POST /wizard/document`
pub async fn document<S, G>(
  principal: Principal,
  State(state): State<AppState<S, G>>,
  Json(body): Json<ImageBody>,
) -> Result<Json<VerificationDraft>, ApiError>
where
  S: PlatformStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: AdjudicationGateway + Clone + Send + Sync + 'static,
{
  let mut draft = load_or_new(&state, principal.user_id).await?;
  draft.set_id_image(body.image).map_err(wizard_error)?;
  persist(&state, &draft).await;
  Ok(Json(draft))
}

/// `POST /wizard/selfie`
pub async fn selfie<S, G>(
  principal: Principal,
  State(state): State<AppState<S, G>>,
  Json(body): Json<ImageBody>,
) -> Result<Json<VerificationDraft>, ApiError>
where
  S: PlatformStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: AdjudicationGateway + Clone + Send + Sync + 'static,
{
  let mut draft = load_or_new(&state, principal.user_id).await?;
  draft.set_selfie_image(body.image).map_err(wizard_error)?;
  persist(&state, &draft).await;
  Ok(Json(draft))
}

// ─── Transitions ─────────────────────────────────────────────────────────────

/// `POST /wizard/advance`
pub async fn advance<S, G>(
  principal: Principal,
  State(state): State<AppState<S, G>>,
) -> Result<Json<VerificationDraft>, ApiError>
where
  S: PlatformStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: AdjudicationGateway + Clone + Send + Sync + 'static,
{
  let mut draft = load_or_new(&state, principal.user_id).await?;
  draft.advance().map_err(wizard_error)?;
  persist(&state, &draft).await;
  Ok(Json(draft))
}

/// `POST /wizard/back`
pub async fn back<S, G>(
  principal: Principal,
  State(state): State<AppState<S, G>>,
) -> Result<Json<VerificationDraft>, ApiError>
where
  S: PlatformStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: AdjudicationGateway + Clone + Send + Sync + 'static,
{
  let mut draft = load_or_new(&state, principal.user_id).await?;
  draft.go_back();
  persist(&state, &draft).await;
  Ok(Json(draft))
}

/// `DELETE /wizard` — explicit abandonment. The only way besides a terminal
/// submission outcome that a draft is destroyed; transient failures never
/// clear it.
pub async fn abandon<S, G>(
  principal: Principal,
  State(state): State<AppState<S, G>>,
) -> Result<Json<VerificationDraft>, ApiError>
where
  S: PlatformStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: AdjudicationGateway + Clone + Send + Sync + 'static,
{
  state
    .store
    .clear_draft(principal.user_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(VerificationDraft::new(principal.user_id)))
}

// ─── Submit ──────────────────────────────────────────────────────────────────

/// `POST /wizard/submit`
///
/// On a terminal outcome (`verified` or `pending_review`) the draft is
/// cleared in full and the next load starts fresh at step 1. On any gateway
/// failure the server-provided reason is surfaced and the draft is left
/// intact, so the user retries without recapturing.
pub async fn submit<S, G>(
  principal: Principal,
  State(state): State<AppState<S, G>>,
) -> Result<Json<VerificationOutcome>, ApiError>
where
  S: PlatformStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: AdjudicationGateway + Clone + Send + Sync + 'static,
{
  let draft = state
    .store
    .load_draft(principal.user_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::Conflict("no verification draft in progress".to_string())
    })?;

  let request = draft.submission().map_err(wizard_error)?;
  let outcome = state.gateway.submit(&request, &principal.credential).await?;

  if let Err(e) = state.store.clear_draft(principal.user_id).await {
    tracing::warn!(
      owner = %principal.user_id,
      error = %e,
      "draft clear after terminal outcome failed"
    );
  }

  Ok(Json(outcome))
}
