//! HTTP client for the external adjudication service.
//!
//! Implements [`AdjudicationGateway`] over an authenticated JSON boundary:
//! the completed draft is POSTed with the caller's bearer credential, and the
//! terminal result (`verified` or `pending_review`) is handed back to the
//! caller. Non-2xx responses surface the server-provided reason so the user
//! can retry without recapturing evidence.

use std::time::Duration;

use bayan_core::submission::{
  AdjudicationGateway, GatewayError, SubmissionRequest, VerificationOutcome,
};
use reqwest::Client;
use serde::Deserialize;

/// Connection settings for the adjudication boundary.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
  /// Full URL of the submission endpoint.
  pub submission_url: String,
  pub timeout_secs:   u64,
}

impl GatewayConfig {
  pub fn new(submission_url: impl Into<String>) -> Self {
    Self { submission_url: submission_url.into(), timeout_secs: 30 }
  }
}

/// Async HTTP client for the adjudicator.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct AdjudicatorClient {
  client: Client,
  config: GatewayConfig,
}

impl AdjudicatorClient {
  pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .map_err(|e| GatewayError::Transport(e.to_string()))?;
    Ok(Self { client, config })
  }
}

impl AdjudicationGateway for AdjudicatorClient {
  async fn submit(
    &self,
    request: &SubmissionRequest,
    credential: &str,
  ) -> Result<VerificationOutcome, GatewayError> {
    let resp = self
      .client
      .post(&self.config.submission_url)
      .bearer_auth(credential)
      .json(request)
      .send()
      .await
      .map_err(|e| GatewayError::Transport(e.to_string()))?;

    let status = resp.status().as_u16();
    let body = resp
      .text()
      .await
      .map_err(|e| GatewayError::Transport(e.to_string()))?;

    tracing::debug!(status, "adjudicator responded");
    interpret_response(status, &body)
  }
}

// ─── Response interpretation ─────────────────────────────────────────────────

/// Failure body shape at the boundary: `{"error": ...}` or `{"reason": ...}`.
#[derive(Deserialize)]
struct ErrorBody {
  error:  Option<String>,
  reason: Option<String>,
}

/// Interpret the adjudicator's response parts. Pure, so the contract is
/// testable without a live server.
pub fn interpret_response(
  status: u16,
  body: &str,
) -> Result<VerificationOutcome, GatewayError> {
  if (200..300).contains(&status) {
    return serde_json::from_str(body).map_err(|e| {
      GatewayError::Transport(format!("malformed adjudicator response: {e}"))
    });
  }

  let reason = serde_json::from_str::<ErrorBody>(body)
    .ok()
    .and_then(|b| b.error.or(b.reason))
    .unwrap_or_else(|| body.trim().to_string());

  Err(GatewayError::Rejected { status, reason })
}

#[cfg(test)]
mod tests {
  use bayan_core::submission::VerificationStatus;

  use super::*;

  #[test]
  fn verified_response() {
    let outcome = interpret_response(200, r#"{"status":"verified"}"#).unwrap();
    assert_eq!(outcome.status, VerificationStatus::Verified);
    assert_eq!(outcome.reason, None);
  }

  #[test]
  fn pending_review_response_with_reason() {
    let outcome = interpret_response(
      200,
      r#"{"status":"pending_review","reason":"blurry document"}"#,
    )
    .unwrap();
    assert_eq!(outcome.status, VerificationStatus::PendingReview);
    assert_eq!(outcome.reason.as_deref(), Some("blurry document"));
  }

  #[test]
  fn rejection_reads_error_field() {
    let err =
      interpret_response(422, r#"{"error":"document expired"}"#).unwrap_err();
    assert!(matches!(
      err,
      GatewayError::Rejected { status: 422, ref reason }
        if reason == "document expired"
    ));
  }

  #[test]
  fn rejection_reads_reason_field() {
    let err =
      interpret_response(400, r#"{"reason":"missing selfie"}"#).unwrap_err();
    assert!(matches!(
      err,
      GatewayError::Rejected { status: 400, ref reason }
        if reason == "missing selfie"
    ));
  }

  #[test]
  fn rejection_falls_back_to_raw_body() {
    let err = interpret_response(503, "upstream unavailable").unwrap_err();
    assert!(matches!(
      err,
      GatewayError::Rejected { status: 503, ref reason }
        if reason == "upstream unavailable"
    ));
  }

  #[test]
  fn malformed_success_body_is_a_transport_error() {
    let err = interpret_response(200, "not json").unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)));
  }
}
