//! Canonical Geography Index — the authoritative, immutable
//! province→city→barangay reference dataset with stable codes.
//!
//! Loaded once at startup and shared read-only for the process lifetime.
//! Tenant records never point into this index by code; reconciliation joins
//! the two datasets by normalised name instead (see [`crate::reconcile`]).

use std::{collections::HashMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The administrative level of a geographic unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoLevel {
  Province,
  City,
  Barangay,
}

/// One row of the canonical reference dataset. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeographicUnit {
  pub code:        String,
  pub name:        String,
  /// Parent unit code. Provinces may carry a region code that is not itself
  /// part of this index.
  pub parent_code: Option<String>,
  pub level:       GeoLevel,
  /// Resident head-count from the reference dataset; 0 when not published.
  #[serde(default)]
  pub population:  u64,
}

// ─── Index ───────────────────────────────────────────────────────────────────

/// Code-keyed lookup over the canonical dataset, with child listings
/// pre-sorted by name.
#[derive(Debug, Clone)]
pub struct GeographyIndex {
  by_code:  HashMap<String, GeographicUnit>,
  children: HashMap<String, Vec<String>>,
}

impl GeographyIndex {
  /// Build the index from raw units.
  ///
  /// Rejects duplicate codes, and cities/barangays whose parent code does not
  /// resolve. Province parents (region codes) are not validated — regions are
  /// outside this index.
  pub fn from_units(units: Vec<GeographicUnit>) -> Result<Self> {
    let mut by_code: HashMap<String, GeographicUnit> =
      HashMap::with_capacity(units.len());

    for unit in units {
      if by_code.contains_key(&unit.code) {
        return Err(Error::DuplicateCode(unit.code));
      }
      by_code.insert(unit.code.clone(), unit);
    }

    let mut children: HashMap<String, Vec<String>> = HashMap::new();
    for unit in by_code.values() {
      let Some(parent) = &unit.parent_code else { continue };
      if unit.level != GeoLevel::Province && !by_code.contains_key(parent) {
        return Err(Error::UnknownParent {
          code:   unit.code.clone(),
          parent: parent.clone(),
        });
      }
      children.entry(parent.clone()).or_default().push(unit.code.clone());
    }

    for codes in children.values_mut() {
      codes.sort_by(|a, b| by_code[a].name.cmp(&by_code[b].name));
    }

    Ok(Self { by_code, children })
  }

  /// Load the index from a JSON array of units on disk.
  pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
    let raw = std::fs::read_to_string(path)?;
    let units: Vec<GeographicUnit> = serde_json::from_str(&raw)?;
    Self::from_units(units)
  }

  /// Retrieve a unit by its stable code.
  pub fn get(&self, code: &str) -> Option<&GeographicUnit> {
    self.by_code.get(code)
  }

  /// All provinces, sorted by name.
  pub fn provinces(&self) -> Vec<&GeographicUnit> {
    let mut provinces: Vec<&GeographicUnit> = self
      .by_code
      .values()
      .filter(|u| u.level == GeoLevel::Province)
      .collect();
    provinces.sort_by(|a, b| a.name.cmp(&b.name));
    provinces
  }

  /// Cities of a province, sorted by name. Empty for unknown codes.
  pub fn cities_of(&self, province_code: &str) -> Vec<&GeographicUnit> {
    self.children_at(province_code, GeoLevel::City)
  }

  /// Barangays of a city, sorted by name. Empty for unknown codes.
  pub fn barangays_of(&self, city_code: &str) -> Vec<&GeographicUnit> {
    self.children_at(city_code, GeoLevel::Barangay)
  }

  fn children_at(&self, code: &str, level: GeoLevel) -> Vec<&GeographicUnit> {
    self
      .children
      .get(code)
      .map(|codes| {
        codes
          .iter()
          .map(|c| &self.by_code[c])
          .filter(|u| u.level == level)
          .collect()
      })
      .unwrap_or_default()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

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

  fn sample() -> Vec<GeographicUnit> {
    vec![
      unit("0434", "Laguna", Some("04"), GeoLevel::Province),
      unit("043405", "Calamba", Some("0434"), GeoLevel::City),
      unit("04340501", "Banlic", Some("043405"), GeoLevel::Barangay),
      unit("04340502", "Canlubang", Some("043405"), GeoLevel::Barangay),
    ]
  }

  #[test]
  fn lookup_and_children() {
    let index = GeographyIndex::from_units(sample()).unwrap();

    assert_eq!(index.get("0434").unwrap().name, "Laguna");
    assert_eq!(index.provinces().len(), 1);
    assert_eq!(index.cities_of("0434").len(), 1);

    let barangays = index.barangays_of("043405");
    assert_eq!(barangays.len(), 2);
    // Sorted by name.
    assert_eq!(barangays[0].name, "Banlic");
    assert_eq!(barangays[1].name, "Canlubang");
  }

  #[test]
  fn unknown_codes_yield_empty() {
    let index = GeographyIndex::from_units(sample()).unwrap();
    assert!(index.get("9999").is_none());
    assert!(index.cities_of("9999").is_empty());
    assert!(index.barangays_of("9999").is_empty());
  }

  #[test]
  fn duplicate_code_rejected() {
    let mut units = sample();
    units.push(unit("0434", "Laguna Again", None, GeoLevel::Province));
    assert!(matches!(
      GeographyIndex::from_units(units),
      Err(Error::DuplicateCode(_))
    ));
  }

  #[test]
  fn dangling_city_parent_rejected() {
    let units = vec![unit("999901", "Orphan", Some("9999"), GeoLevel::City)];
    assert!(matches!(
      GeographyIndex::from_units(units),
      Err(Error::UnknownParent { .. })
    ));
  }

  #[test]
  fn province_region_parent_is_not_validated() {
    // Region codes are outside the index; provinces may reference them.
    let index = GeographyIndex::from_units(sample()).unwrap();
    assert_eq!(index.get("0434").unwrap().parent_code.as_deref(), Some("04"));
  }
}
