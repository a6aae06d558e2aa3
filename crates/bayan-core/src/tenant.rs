//! Tenant Directory types — provisioned local-government units.
//!
//! Names are freeform, self-reported at provisioning time, and are joined to
//! the canonical geography by normalised fuzzy matching rather than by code.
//! This core only reads tenant records; creation and status transitions are
//! driven by an external provisioning flow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geofence::Coordinates;

/// Provisioning state of a tenant, as written by the external flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
  Onboarding,
  Live,
  Rejected,
}

/// One provisioned tenant. `tenant_id` is immutable once assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantRecord {
  pub tenant_id:     Uuid,
  pub barangay_name: String,
  pub city_name:     String,
  pub province_name: String,
  /// `None` until the provisioning flow writes one; reconciliation treats a
  /// matched tenant with no status as Live.
  pub status:        Option<TenantStatus>,
  pub centroid:      Option<Coordinates>,
  /// Operator-maintained service-quality score; 0 when unrated.
  pub quality:       u32,
  pub created_at:    DateTime<Utc>,
}

/// Input to the provisioning boundary. `tenant_id` and `created_at` are
/// assigned by the store; they are not accepted from callers.
#[derive(Debug, Clone)]
pub struct NewTenant {
  pub barangay_name: String,
  pub city_name:     String,
  pub province_name: String,
  pub status:        Option<TenantStatus>,
  pub centroid:      Option<Coordinates>,
  pub quality:       u32,
}

impl NewTenant {
  /// Convenience constructor with all optional fields set to their defaults.
  pub fn new(
    barangay_name: impl Into<String>,
    city_name: impl Into<String>,
    province_name: impl Into<String>,
  ) -> Self {
    Self {
      barangay_name: barangay_name.into(),
      city_name:     city_name.into(),
      province_name: province_name.into(),
      status:        None,
      centroid:      None,
      quality:       0,
    }
  }
}
