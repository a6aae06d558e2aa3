//! Submission Gateway contract — the request/response types and the outbound
//! boundary trait.
//!
//! This core prepares and forwards evidence; the adjudication decision itself
//! is external. Only the wire contract is defined here.

use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Geolocation evidence attached to a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionLocation {
  pub lat:      f64,
  pub lng:      f64,
  /// Advisory great-circle distance to the tenant centroid, km, 2 dp.
  pub distance: f64,
}

/// The completed draft, packaged for the adjudicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
  pub tenant_id:           Uuid,
  pub birth_date:          NaiveDate,
  pub mothers_maiden_name: String,
  pub location:            SubmissionLocation,
  pub id_image:            String,
  pub selfie_image:        String,
}

/// Terminal adjudicator decision. Not persisted by this core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
  Verified,
  PendingReview,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationOutcome {
  pub status: VerificationStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reason: Option<String>,
}

// ─── Boundary ────────────────────────────────────────────────────────────────

/// Failure surface of the submission boundary. A rejection carries the
/// server-provided reason so the caller can retry without recapturing
/// evidence; the draft is never cleared on either variant.
#[derive(Debug, Error)]
pub enum GatewayError {
  #[error("transport error: {0}")]
  Transport(String),

  #[error("submission rejected ({status}): {reason}")]
  Rejected { status: u16, reason: String },
}

/// Abstraction over the authenticated call to the external adjudicator.
///
/// Implemented by `bayan-gateway` over HTTP; test code substitutes stubs.
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait AdjudicationGateway: Send + Sync {
  /// Forward a completed submission under the caller's identity credential.
  fn submit<'a>(
    &'a self,
    request: &'a SubmissionRequest,
    credential: &'a str,
  ) -> impl Future<Output = Result<VerificationOutcome, GatewayError>> + Send + 'a;
}
