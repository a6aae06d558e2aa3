//! Request authentication: HTTP Basic for admin routes, bearer principal for
//! resident wizard routes.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use bayan_core::{
  store::PlatformStore, submission::AdjudicationGateway,
};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── Admin (Basic) ───────────────────────────────────────────────────────────

/// Operator credentials accepted for admin routes on this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// Zero-size marker: present in the handler means the request carried valid
/// admin credentials.
pub struct Admin;

/// Verify Basic credentials directly from headers.
pub fn verify_basic(
  headers: &HeaderMap,
  config: &AuthConfig,
) -> Result<(), ApiError> {
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds =
    std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthorized)?;

  let (username, password) =
    creds.split_once(':').ok_or(ApiError::Unauthorized)?;

  if username != config.username {
    return Err(ApiError::Unauthorized);
  }

  let parsed_hash = PasswordHash::new(&config.password_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Ok(())
}

impl<S, G> FromRequestParts<AppState<S, G>> for Admin
where
  S: PlatformStore + Clone + Send + Sync + 'static,
  G: AdjudicationGateway + Clone + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, G>,
  ) -> Result<Self, Self::Rejection> {
    verify_basic(&parts.headers, &state.auth)?;
    Ok(Admin)
  }
}

// ─── Principal (Bearer) ──────────────────────────────────────────────────────

/// The authenticated resident. Session validation belongs to the outer
/// shell; here the bearer subject is taken as the owner id that keys the
/// draft slot, and the raw credential is forwarded to the adjudicator on
/// submit.
pub struct Principal {
  pub user_id:    Uuid,
  pub credential: String,
}

impl<S, G> FromRequestParts<AppState<S, G>> for Principal
where
  S: PlatformStore + Clone + Send + Sync + 'static,
  G: AdjudicationGateway + Clone + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &AppState<S, G>,
  ) -> Result<Self, Self::Rejection> {
    let header_val = parts
      .headers
      .get(header::AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .ok_or(ApiError::Unauthorized)?;

    let credential = header_val
      .strip_prefix("Bearer ")
      .ok_or(ApiError::Unauthorized)?
      .trim();

    let user_id =
      Uuid::parse_str(credential).map_err(|_| ApiError::Unauthorized)?;

    Ok(Principal { user_id, credential: credential.to_string() })
  }
}
