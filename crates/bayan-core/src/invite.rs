//! Invite Token Issuer primitives — minting, lookup hashing, and scope
//! validation.
//!
//! A token is scoped to one (province, city, barangay) tuple and is the only
//! field of an onboarding link that may be trusted: the plaintext names in
//! the link are display-only. Only the SHA-256 lookup hash of a token is ever
//! persisted, so a database read-out does not leak live invite links.

use chrono::{DateTime, Utc};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::reconcile::normalize;

// ─── Scope ───────────────────────────────────────────────────────────────────

/// The (province, city, barangay) tuple an invite token is issued for. Names
/// are freeform, matching the future tenant's intended identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurisdictionScope {
  pub province_name: String,
  pub city_name:     String,
  pub barangay_name: String,
}

impl JurisdictionScope {
  /// Case/whitespace-insensitive tuple comparison. A consumer must check the
  /// plaintext parameters of an onboarding link against the token's recorded
  /// scope before accepting them.
  pub fn matches(&self, other: &JurisdictionScope) -> bool {
    normalize(&self.province_name) == normalize(&other.province_name)
      && normalize(&self.city_name) == normalize(&other.city_name)
      && normalize(&self.barangay_name) == normalize(&other.barangay_name)
  }
}

// ─── Minting ─────────────────────────────────────────────────────────────────

/// Mint an opaque, unguessable token: 32 bytes from the OS RNG, hex-encoded.
pub fn generate_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

/// The hash under which a token is stored and looked up.
pub fn token_lookup_hash(token: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(token.as_bytes());
  hex::encode(hasher.finalize())
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A persisted invite. Single-use: created, then consumed or expired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InviteToken {
  pub token_hash:  String,
  pub scope:       JurisdictionScope,
  /// Display-only region name carried into the onboarding link.
  pub region_name: Option<String>,
  pub issued_at:   DateTime<Utc>,
  pub expires_at:  DateTime<Utc>,
  pub consumed:    bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InviteValidity {
  Valid,
  Expired,
  Consumed,
}

impl InviteToken {
  pub fn validity(&self, now: DateTime<Utc>) -> InviteValidity {
    if self.consumed {
      InviteValidity::Consumed
    } else if now >= self.expires_at {
      InviteValidity::Expired
    } else {
      InviteValidity::Valid
    }
  }
}

/// A freshly minted invite. The plaintext token leaves the process exactly
/// once, inside this value.
#[derive(Debug, Clone)]
pub struct IssuedInvite {
  pub token:  String,
  pub record: InviteToken,
}

/// Outcome of a consume attempt. Modelled as data rather than an error so
/// callers generic over a store can map each case without downcasting.
#[derive(Debug, Clone)]
pub enum ConsumeOutcome {
  Consumed(InviteToken),
  NotFound,
  Expired(InviteToken),
  AlreadyConsumed(InviteToken),
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, Utc};

  use super::*;

  fn scope(province: &str, city: &str, barangay: &str) -> JurisdictionScope {
    JurisdictionScope {
      province_name: province.to_string(),
      city_name:     city.to_string(),
      barangay_name: barangay.to_string(),
    }
  }

  #[test]
  fn tokens_are_opaque_and_distinct() {
    let a = generate_token();
    let b = generate_token();
    assert_eq!(a.len(), 64);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(a, b);
  }

  #[test]
  fn lookup_hash_is_stable_and_differs_from_token() {
    let token = generate_token();
    assert_eq!(token_lookup_hash(&token), token_lookup_hash(&token));
    assert_ne!(token_lookup_hash(&token), token);
  }

  #[test]
  fn scope_comparison_ignores_case_and_whitespace() {
    let a = scope("Laguna", "Calamba", "San Isidro");
    let b = scope(" laguna ", "CALAMBA", "san isidro");
    assert!(a.matches(&b));

    let c = scope("Laguna", "Calamba", "Canlubang");
    assert!(!a.matches(&c));
  }

  #[test]
  fn validity_transitions() {
    let now = Utc::now();
    let mut invite = InviteToken {
      token_hash:  token_lookup_hash(&generate_token()),
      scope:       scope("Laguna", "Calamba", "San Isidro"),
      region_name: None,
      issued_at:   now,
      expires_at:  now + Duration::hours(72),
      consumed:    false,
    };

    assert_eq!(invite.validity(now), InviteValidity::Valid);
    assert_eq!(
      invite.validity(now + Duration::hours(73)),
      InviteValidity::Expired
    );

    invite.consumed = true;
    assert_eq!(invite.validity(now), InviteValidity::Consumed);
  }
}
