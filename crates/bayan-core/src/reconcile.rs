//! Reconciliation Engine — joins the canonical geography index to the live
//! tenant directory, producing a per-barangay coverage view.
//!
//! Pure read-and-join: no writes, no caching. Safe to call repeatedly, e.g.
//! per keystroke of a search box.

use serde::Serialize;

use crate::{
  geography::{GeoLevel, GeographicUnit, GeographyIndex},
  tenant::{TenantRecord, TenantStatus},
};

// ─── Name matching ───────────────────────────────────────────────────────────

/// The single normalisation point for all name comparison.
pub fn normalize(s: &str) -> String {
  s.trim().to_lowercase()
}

/// Whether a canonical barangay name and a tenant-reported name refer to the
/// same place: normalised equality, or either string containing the other.
/// Tolerates the punctuation/abbreviation drift introduced when tenants
/// self-report their name at provisioning time.
///
/// Isolated here so the matcher can be swapped for a normalised-key or
/// edit-distance implementation without touching callers. Non-exact matches
/// are logged for audit.
pub fn names_match(canonical: &str, tenant: &str) -> bool {
  let a = normalize(canonical);
  let b = normalize(tenant);
  if a == b {
    return true;
  }
  if a.contains(&b) || b.contains(&a) {
    tracing::info!(canonical, tenant, "non-exact barangay name match");
    return true;
  }
  false
}

// ─── Coverage view ───────────────────────────────────────────────────────────

/// Onboarding coverage of one canonical barangay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageStatus {
  Live,
  Onboarding,
  Rejected,
  Untapped,
}

impl CoverageStatus {
  /// A matched tenant with no explicit status counts as Live.
  fn from_tenant(status: Option<TenantStatus>) -> Self {
    match status {
      None | Some(TenantStatus::Live) => Self::Live,
      Some(TenantStatus::Onboarding) => Self::Onboarding,
      Some(TenantStatus::Rejected) => Self::Rejected,
    }
  }
}

/// A canonical barangay paired with zero-or-one matching tenant. Ephemeral —
/// re-derived on every reconciliation pass, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledJurisdiction {
  pub unit:       GeographicUnit,
  pub tenant:     Option<TenantRecord>,
  pub status:     CoverageStatus,
  pub population: u64,
  pub quality:    u32,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Reconcile the canonical barangays of one city against the tenant
/// directory.
///
/// Returns exactly one entry per canonical barangay. Unresolved province or
/// city codes yield an empty result, not an error. Candidate tenants are
/// restricted to exact (normalised) province+city name equality before the
/// fuzzy barangay match. The first candidate in directory iteration order
/// wins; no best-match scoring is performed.
pub fn reconcile(
  index: &GeographyIndex,
  tenants: &[TenantRecord],
  province_code: &str,
  city_code: &str,
  filter: Option<&str>,
) -> Vec<ReconciledJurisdiction> {
  let Some(province) = index.get(province_code) else { return Vec::new() };
  let Some(city) = index.get(city_code) else { return Vec::new() };
  if province.level != GeoLevel::Province
    || city.level != GeoLevel::City
    || city.parent_code.as_deref() != Some(province_code)
  {
    return Vec::new();
  }

  let province_name = normalize(&province.name);
  let city_name = normalize(&city.name);
  let candidates: Vec<&TenantRecord> = tenants
    .iter()
    .filter(|t| {
      normalize(&t.province_name) == province_name
        && normalize(&t.city_name) == city_name
    })
    .collect();

  let mut out: Vec<ReconciledJurisdiction> = index
    .barangays_of(city_code)
    .into_iter()
    .map(|unit| {
      let tenant = candidates
        .iter()
        .find(|t| names_match(&unit.name, &t.barangay_name))
        .map(|t| (*t).clone());
      let status = match &tenant {
        Some(t) => CoverageStatus::from_tenant(t.status),
        None => CoverageStatus::Untapped,
      };
      ReconciledJurisdiction {
        population: unit.population,
        quality:    tenant.as_ref().map(|t| t.quality).unwrap_or(0),
        unit:       unit.clone(),
        tenant,
        status,
      }
    })
    .collect();

  if let Some(filter) = filter {
    let needle = normalize(filter);
    if !needle.is_empty() {
      out.retain(|r| {
        normalize(&r.unit.name).contains(&needle)
          || r
            .tenant
            .as_ref()
            .is_some_and(|t| normalize(&t.barangay_name).contains(&needle))
      });
    }
  }

  out
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;

  use super::*;
  use crate::geography::GeographicUnit;

  fn unit(
    code: &str,
    name: &str,
    parent: Option<&str>,
    level: GeoLevel,
  ) -> GeographicUnit {
    GeographicUnit {
      code:        code.to_string(),
      name:        name.to_string(),
      parent_code: parent.map(str::to_string),
      level,
      population:  0,
    }
  }

  fn index() -> GeographyIndex {
    GeographyIndex::from_units(vec![
      unit("0434", "Laguna", None, GeoLevel::Province),
      unit("043405", "Calamba", Some("0434"), GeoLevel::City),
      unit("04340501", "San Isidro", Some("043405"), GeoLevel::Barangay),
      unit("04340502", "Poblacion I", Some("043405"), GeoLevel::Barangay),
      unit("04340503", "Canlubang", Some("043405"), GeoLevel::Barangay),
    ])
    .unwrap()
  }

  fn tenant(barangay: &str, status: Option<TenantStatus>) -> TenantRecord {
    TenantRecord {
      tenant_id:     Uuid::new_v4(),
      barangay_name: barangay.to_string(),
      city_name:     "Calamba".to_string(),
      province_name: "Laguna".to_string(),
      status,
      centroid:      None,
      quality:       0,
      created_at:    Utc::now(),
    }
  }

  #[test]
  fn one_entry_per_canonical_barangay() {
    let idx = index();
    // Many tenants, some matching, some not: still exactly 3 entries.
    let tenants = vec![
      tenant("San Isidro", Some(TenantStatus::Live)),
      tenant("San Isidro", Some(TenantStatus::Live)),
      tenant("Elsewhere", Some(TenantStatus::Live)),
    ];
    let view = reconcile(&idx, &tenants, "0434", "043405", None);
    assert_eq!(view.len(), 3);

    let mut names: Vec<&str> =
      view.iter().map(|r| r.unit.name.as_str()).collect();
    names.sort();
    assert_eq!(names, ["Canlubang", "Poblacion I", "San Isidro"]);
  }

  #[test]
  fn idempotent_for_unchanged_inputs() {
    let idx = index();
    let tenants = vec![tenant("San Isidro", Some(TenantStatus::Onboarding))];
    let first = reconcile(&idx, &tenants, "0434", "043405", None);
    let second = reconcile(&idx, &tenants, "0434", "043405", None);
    assert_eq!(first, second);
  }

  #[test]
  fn unresolved_codes_yield_empty() {
    let idx = index();
    assert!(reconcile(&idx, &[], "9999", "043405", None).is_empty());
    assert!(reconcile(&idx, &[], "0434", "9999", None).is_empty());
    // A barangay code in the city position does not resolve either.
    assert!(reconcile(&idx, &[], "0434", "04340501", None).is_empty());
  }

  #[test]
  fn matching_ignores_case_and_whitespace() {
    let idx = index();
    let tenants = vec![tenant(" san isidro ", Some(TenantStatus::Live))];
    let view = reconcile(&idx, &tenants, "0434", "043405", None);
    let entry =
      view.iter().find(|r| r.unit.name == "San Isidro").unwrap();
    assert_eq!(entry.status, CoverageStatus::Live);
    assert!(entry.tenant.is_some());
  }

  #[test]
  fn matching_is_bidirectionally_substring_based() {
    assert!(names_match("Poblacion I", "Poblacion"));
    assert!(names_match("Poblacion", "Poblacion I"));
    assert!(!names_match("Poblacion", "Canlubang"));

    let idx = index();
    let tenants = vec![tenant("Poblacion", Some(TenantStatus::Live))];
    let view = reconcile(&idx, &tenants, "0434", "043405", None);
    let entry =
      view.iter().find(|r| r.unit.name == "Poblacion I").unwrap();
    assert!(entry.tenant.is_some());
  }

  #[test]
  fn unmatched_barangays_are_untapped() {
    let idx = index();
    let view = reconcile(&idx, &[], "0434", "043405", None);
    assert!(view.iter().all(|r| r.status == CoverageStatus::Untapped));
    assert!(view.iter().all(|r| r.tenant.is_none()));
  }

  #[test]
  fn missing_tenant_status_defaults_to_live() {
    let idx = index();
    let tenants = vec![tenant("Canlubang", None)];
    let view = reconcile(&idx, &tenants, "0434", "043405", None);
    let entry =
      view.iter().find(|r| r.unit.name == "Canlubang").unwrap();
    assert_eq!(entry.status, CoverageStatus::Live);
  }

  #[test]
  fn first_candidate_in_directory_order_wins() {
    let idx = index();
    let first = tenant("San Isidro", Some(TenantStatus::Onboarding));
    let second = tenant("San Isidro", Some(TenantStatus::Live));
    let view = reconcile(
      &idx,
      &[first.clone(), second],
      "0434",
      "043405",
      None,
    );
    let entry =
      view.iter().find(|r| r.unit.name == "San Isidro").unwrap();
    assert_eq!(entry.tenant.as_ref().unwrap().tenant_id, first.tenant_id);
    assert_eq!(entry.status, CoverageStatus::Onboarding);
  }

  #[test]
  fn tenants_from_other_cities_are_not_candidates() {
    let idx = index();
    let mut other = tenant("San Isidro", Some(TenantStatus::Live));
    other.city_name = "Los Baños".to_string();
    let view = reconcile(&idx, &[other], "0434", "043405", None);
    let entry =
      view.iter().find(|r| r.unit.name == "San Isidro").unwrap();
    assert_eq!(entry.status, CoverageStatus::Untapped);
  }

  #[test]
  fn filter_applies_after_matching() {
    let idx = index();
    let tenants = vec![tenant("Poblacion", Some(TenantStatus::Live))];

    let view = reconcile(&idx, &tenants, "0434", "043405", Some("poblacion"));
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].unit.name, "Poblacion I");

    // Blank filter is a no-op.
    let view = reconcile(&idx, &tenants, "0434", "043405", Some("  "));
    assert_eq!(view.len(), 3);
  }
}
