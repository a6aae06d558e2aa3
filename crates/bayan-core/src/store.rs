//! The `PlatformStore` trait implemented by storage backends (e.g.
//! `bayan-store-sqlite`).
//!
//! Higher layers (`bayan-api`) depend on this abstraction, not on any
//! concrete backend. All methods return `Send` futures so the trait can be
//! used in multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use chrono::Duration;
use uuid::Uuid;

use crate::{
  invite::{ConsumeOutcome, InviteToken, IssuedInvite, JurisdictionScope},
  tenant::TenantRecord,
  wizard::VerificationDraft,
};

/// Abstraction over the platform's persistent state: the tenant directory
/// (read-only from this core), invite tokens, and per-user verification
/// drafts.
pub trait PlatformStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Tenant directory ──────────────────────────────────────────────────

  /// Equality-filtered read over normalised province+city names, in
  /// insertion order. That order is the reconciliation tie-break order.
  fn tenants_in_city<'a>(
    &'a self,
    province_name: &'a str,
    city_name: &'a str,
  ) -> impl Future<Output = Result<Vec<TenantRecord>, Self::Error>> + Send + 'a;

  /// Retrieve a tenant by id. Returns `None` if not found.
  fn get_tenant(
    &self,
    tenant_id: Uuid,
  ) -> impl Future<Output = Result<Option<TenantRecord>, Self::Error>> + Send + '_;

  // ── Invite tokens ─────────────────────────────────────────────────────

  /// Mint and persist a single-use invite scoped to `scope`. Stateless per
  /// call: re-issuing for the same tuple produces an additional,
  /// independently valid token — prior tokens are not revoked.
  fn issue_invite(
    &self,
    scope: JurisdictionScope,
    region_name: Option<String>,
    ttl: Duration,
  ) -> impl Future<Output = Result<IssuedInvite, Self::Error>> + Send + '_;

  /// Resolve a plaintext token to the record it was issued for, via its
  /// lookup hash. Returns `None` for unknown tokens.
  fn resolve_invite<'a>(
    &'a self,
    token: &'a str,
  ) -> impl Future<Output = Result<Option<InviteToken>, Self::Error>> + Send + 'a;

  /// Consume a token. Single-use: a consumed or expired token is refused,
  /// reported through [`ConsumeOutcome`] rather than a backend error.
  fn consume_invite<'a>(
    &'a self,
    token: &'a str,
  ) -> impl Future<Output = Result<ConsumeOutcome, Self::Error>> + Send + 'a;

  // ── Verification drafts ───────────────────────────────────────────────

  /// Fully overwrite the owner's draft slot. Merge semantics: only the
  /// draft field of the user's document is touched.
  fn save_draft<'a>(
    &'a self,
    draft: &'a VerificationDraft,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Load the owner's live draft, if any.
  fn load_draft(
    &self,
    owner_user_id: Uuid,
  ) -> impl Future<Output = Result<Option<VerificationDraft>, Self::Error>> + Send + '_;

  /// Destroy the owner's draft on a terminal outcome. The user's document
  /// row itself survives; only the draft slot is cleared.
  fn clear_draft(
    &self,
    owner_user_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
