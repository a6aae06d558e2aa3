//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. The verification draft is
//! stored as compact JSON in its slot column. UUIDs are stored as hyphenated
//! lowercase strings.

use bayan_core::{
  geofence::Coordinates,
  invite::{InviteToken, JurisdictionScope},
  tenant::{TenantRecord, TenantStatus},
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── TenantStatus ─────────────────────────────────────────────────────────────

pub fn encode_tenant_status(s: TenantStatus) -> &'static str {
  match s {
    TenantStatus::Onboarding => "onboarding",
    TenantStatus::Live => "live",
    TenantStatus::Rejected => "rejected",
  }
}

pub fn decode_tenant_status(s: &str) -> Result<TenantStatus> {
  match s {
    "onboarding" => Ok(TenantStatus::Onboarding),
    "live" => Ok(TenantStatus::Live),
    "rejected" => Ok(TenantStatus::Rejected),
    other => Err(Error::DateParse(format!("unknown tenant status: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `tenants` row.
pub struct RawTenant {
  pub tenant_id:     String,
  pub barangay_name: String,
  pub city_name:     String,
  pub province_name: String,
  pub status:        Option<String>,
  pub centroid_lat:  Option<f64>,
  pub centroid_lng:  Option<f64>,
  pub quality:       i64,
  pub created_at:    String,
}

impl RawTenant {
  pub fn into_tenant(self) -> Result<TenantRecord> {
    let centroid = match (self.centroid_lat, self.centroid_lng) {
      (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
      _ => None,
    };

    Ok(TenantRecord {
      tenant_id:     decode_uuid(&self.tenant_id)?,
      barangay_name: self.barangay_name,
      city_name:     self.city_name,
      province_name: self.province_name,
      status:        self
        .status
        .as_deref()
        .map(decode_tenant_status)
        .transpose()?,
      centroid,
      quality:       self.quality as u32,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `invite_tokens` row.
pub struct RawInvite {
  pub token_hash:    String,
  pub province_name: String,
  pub city_name:     String,
  pub barangay_name: String,
  pub region_name:   Option<String>,
  pub issued_at:     String,
  pub expires_at:    String,
  pub consumed:      bool,
}

impl RawInvite {
  pub fn into_invite(self) -> Result<InviteToken> {
    Ok(InviteToken {
      token_hash:  self.token_hash,
      scope:       JurisdictionScope {
        province_name: self.province_name,
        city_name:     self.city_name,
        barangay_name: self.barangay_name,
      },
      region_name: self.region_name,
      issued_at:   decode_dt(&self.issued_at)?,
      expires_at:  decode_dt(&self.expires_at)?,
      consumed:    self.consumed,
    })
  }
}
