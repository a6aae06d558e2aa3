//! Handlers for `/invites` endpoints, plus the onboarding-URL builder.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/invites` | Admin; mints a single-use scoped token |
//! | `GET`  | `/invites/:token` | Resolves to the issued tuple; 410 when dead |
//! | `POST` | `/invites/:token/consume` | Body tuple must match the token scope |
//!
//! The onboarding URL carries the plaintext names for display only; the
//! token is the sole field a consumer may trust, and only after server-side
//! validation.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use bayan_core::{
  invite::{ConsumeOutcome, InviteToken, InviteValidity, JurisdictionScope},
  store::PlatformStore,
  submission::AdjudicationGateway,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{AppState, auth::Admin, error::ApiError};

// ─── Onboarding URL ──────────────────────────────────────────────────────────

/// Percent-encode a query-string component. Keeps the RFC 3986 unreserved
/// set; everything else (including UTF-8 continuation bytes) is escaped.
pub fn encode_query_component(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for byte in s.bytes() {
    match byte {
      b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
        out.push(byte as char)
      }
      _ => out.push_str(&format!("%{byte:02X}")),
    }
  }
  out
}

/// Build the shareable onboarding link for a minted invite.
pub fn onboarding_url(
  origin: &str,
  scope: &JurisdictionScope,
  region_name: Option<&str>,
  token: &str,
) -> String {
  format!(
    "{}/onboarding?province={}&city={}&barangay={}&region={}&token={}",
    origin.trim_end_matches('/'),
    encode_query_component(&scope.province_name),
    encode_query_component(&scope.city_name),
    encode_query_component(&scope.barangay_name),
    encode_query_component(region_name.unwrap_or_default()),
    token,
  )
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub province_name: String,
  pub city_name:     String,
  pub barangay_name: String,
  pub region_name:   Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MintedInvite {
  pub token:      String,
  pub url:        String,
  pub expires_at: DateTime<Utc>,
}

/// `POST /invites` — admin; body: the freeform tuple the future tenant will
/// provision under.
pub async fn create<S, G>(
  _admin: Admin,
  State(state): State<AppState<S, G>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PlatformStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: AdjudicationGateway + Clone + Send + Sync + 'static,
{
  if body.province_name.trim().is_empty()
    || body.city_name.trim().is_empty()
    || body.barangay_name.trim().is_empty()
  {
    return Err(ApiError::BadRequest(
      "province, city, and barangay names are all required".to_string(),
    ));
  }

  let scope = JurisdictionScope {
    province_name: body.province_name,
    city_name:     body.city_name,
    barangay_name: body.barangay_name,
  };

  let issued = state
    .store
    .issue_invite(
      scope,
      body.region_name,
      Duration::hours(state.config.invite_ttl_hours),
    )
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let url = onboarding_url(
    &state.config.public_origin,
    &issued.record.scope,
    issued.record.region_name.as_deref(),
    &issued.token,
  );

  Ok((
    StatusCode::CREATED,
    Json(MintedInvite {
      token:      issued.token,
      url,
      expires_at: issued.record.expires_at,
    }),
  ))
}

// ─── Resolve ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct InviteView {
  pub scope:       JurisdictionScope,
  pub region_name: Option<String>,
  pub issued_at:   DateTime<Utc>,
  pub expires_at:  DateTime<Utc>,
  pub validity:    InviteValidity,
}

impl From<InviteToken> for InviteView {
  fn from(record: InviteToken) -> Self {
    let validity = record.validity(Utc::now());
    Self {
      scope: record.scope,
      region_name: record.region_name,
      issued_at: record.issued_at,
      expires_at: record.expires_at,
      validity,
    }
  }
}

/// `GET /invites/:token` — server-side resolution of an onboarding link.
pub async fn show<S, G>(
  State(state): State<AppState<S, G>>,
  Path(token): Path<String>,
) -> Result<Json<InviteView>, ApiError>
where
  S: PlatformStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: AdjudicationGateway + Clone + Send + Sync + 'static,
{
  let record = state
    .store
    .resolve_invite(&token)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound("unknown invite token".to_string()))?;

  match record.validity(Utc::now()) {
    InviteValidity::Valid => Ok(Json(record.into())),
    InviteValidity::Expired => {
      Err(ApiError::Gone("invite has expired".to_string()))
    }
    InviteValidity::Consumed => {
      Err(ApiError::Gone("invite already consumed".to_string()))
    }
  }
}

// ─── Consume ─────────────────────────────────────────────────────────────────

/// `POST /invites/:token/consume` — body: the plaintext tuple carried in the
/// onboarding link. Plaintext parameters are never trusted alone: they must
/// match the scope the token was issued for.
pub async fn consume<S, G>(
  State(state): State<AppState<S, G>>,
  Path(token): Path<String>,
  Json(claimed): Json<JurisdictionScope>,
) -> Result<Json<InviteView>, ApiError>
where
  S: PlatformStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: AdjudicationGateway + Clone + Send + Sync + 'static,
{
  let record = state
    .store
    .resolve_invite(&token)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound("unknown invite token".to_string()))?;

  if !record.scope.matches(&claimed) {
    return Err(ApiError::Conflict(
      "onboarding parameters do not match the invite scope".to_string(),
    ));
  }

  let outcome = state
    .store
    .consume_invite(&token)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  match outcome {
    ConsumeOutcome::Consumed(record) => Ok(Json(record.into())),
    ConsumeOutcome::NotFound => {
      Err(ApiError::NotFound("unknown invite token".to_string()))
    }
    ConsumeOutcome::Expired(_) => {
      Err(ApiError::Gone("invite has expired".to_string()))
    }
    ConsumeOutcome::AlreadyConsumed(_) => {
      Err(ApiError::Gone("invite already consumed".to_string()))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn scope() -> JurisdictionScope {
    JurisdictionScope {
      province_name: "Laguna".to_string(),
      city_name:     "Las Piñas".to_string(),
      barangay_name: "San Isidro".to_string(),
    }
  }

  #[test]
  fn unreserved_characters_pass_through() {
    assert_eq!(encode_query_component("abc-DEF_1.2~"), "abc-DEF_1.2~");
  }

  #[test]
  fn spaces_and_punctuation_are_escaped() {
    assert_eq!(encode_query_component("San Isidro"), "San%20Isidro");
    assert_eq!(encode_query_component("a&b=c"), "a%26b%3Dc");
  }

  #[test]
  fn non_ascii_is_escaped_bytewise() {
    // 'ñ' is 0xC3 0xB1 in UTF-8.
    assert_eq!(encode_query_component("Piñas"), "Pi%C3%B1as");
  }

  #[test]
  fn onboarding_url_carries_tuple_and_token() {
    let url = onboarding_url(
      "https://portal.example.ph/",
      &scope(),
      Some("Calabarzon"),
      "deadbeef",
    );
    assert_eq!(
      url,
      "https://portal.example.ph/onboarding?province=Laguna&city=Las%20Pi%C3%B1as&barangay=San%20Isidro&region=Calabarzon&token=deadbeef"
    );
  }

  #[test]
  fn onboarding_url_with_no_region() {
    let url = onboarding_url("https://x.ph", &scope(), None, "t0k3n");
    assert!(url.contains("region=&token=t0k3n"), "url: {url}");
  }
}
