//! Verification Wizard — a five-step, resumable state machine.
//!
//! The draft is a single slot per user: fully overwritten on every
//! transition and every successful capture, destroyed only on a terminal
//! outcome. Capture steps involve slow, permission-gated hardware (camera,
//! GPS), so durability is applied after every single step rather than
//! batched.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  error::{Error, Result},
  geofence::{self, Coordinates, DEFAULT_CENTROID},
  submission::{SubmissionLocation, SubmissionRequest},
};

// ─── Steps ───────────────────────────────────────────────────────────────────

/// The five wizard steps, serialised by number (1..=5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum WizardStep {
  JurisdictionSelect,
  Biodata,
  Geofence,
  DocumentCapture,
  LivenessCapture,
}

impl WizardStep {
  pub fn number(self) -> u8 {
    match self {
      Self::JurisdictionSelect => 1,
      Self::Biodata => 2,
      Self::Geofence => 3,
      Self::DocumentCapture => 4,
      Self::LivenessCapture => 5,
    }
  }

  fn next(self) -> Option<Self> {
    match self {
      Self::JurisdictionSelect => Some(Self::Biodata),
      Self::Biodata => Some(Self::Geofence),
      Self::Geofence => Some(Self::DocumentCapture),
      Self::DocumentCapture => Some(Self::LivenessCapture),
      Self::LivenessCapture => None,
    }
  }

  fn prev(self) -> Option<Self> {
    match self {
      Self::JurisdictionSelect => None,
      Self::Biodata => Some(Self::JurisdictionSelect),
      Self::Geofence => Some(Self::Biodata),
      Self::DocumentCapture => Some(Self::Geofence),
      Self::LivenessCapture => Some(Self::DocumentCapture),
    }
  }
}

impl From<WizardStep> for u8 {
  fn from(step: WizardStep) -> u8 {
    step.number()
  }
}

impl TryFrom<u8> for WizardStep {
  type Error = Error;

  fn try_from(n: u8) -> Result<Self> {
    match n {
      1 => Ok(Self::JurisdictionSelect),
      2 => Ok(Self::Biodata),
      3 => Ok(Self::Geofence),
      4 => Ok(Self::DocumentCapture),
      5 => Ok(Self::LivenessCapture),
      other => Err(Error::UnknownStep(other)),
    }
  }
}

// ─── Draft ───────────────────────────────────────────────────────────────────

/// A captured geolocation fix plus its advisory geofence evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoEvidence {
  pub lat:         f64,
  pub lng:         f64,
  pub distance_km: f64,
}

/// The persisted, resumable in-progress state of the wizard. Exactly one
/// live draft per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationDraft {
  pub owner_user_id:          Uuid,
  pub step:                   WizardStep,
  pub tenant_id:              Option<Uuid>,
  pub birth_date:             Option<NaiveDate>,
  pub mothers_maiden_name:    Option<String>,
  pub geo:                    Option<GeoEvidence>,
  pub id_image:               Option<String>,
  pub selfie_image:           Option<String>,
  /// Cascading jurisdiction-selector state, saved so the option lists can be
  /// re-derived when a draft is resumed.
  pub selected_province_code: Option<String>,
  pub selected_city_code:     Option<String>,
  pub last_updated:           DateTime<Utc>,
}

impl VerificationDraft {
  /// A fresh draft at step 1. Created lazily on first interaction.
  pub fn new(owner_user_id: Uuid) -> Self {
    Self {
      owner_user_id,
      step: WizardStep::JurisdictionSelect,
      tenant_id: None,
      birth_date: None,
      mothers_maiden_name: None,
      geo: None,
      id_image: None,
      selfie_image: None,
      selected_province_code: None,
      selected_city_code: None,
      last_updated: Utc::now(),
    }
  }

  fn touch(&mut self) {
    self.last_updated = Utc::now();
  }

  // ── Guards ────────────────────────────────────────────────────────────

  /// The unmet requirement of `step`, if any. All listed requirements must
  /// hold to advance past the step.
  fn guard_unmet_at(&self, step: WizardStep) -> Option<&'static str> {
    match step {
      WizardStep::JurisdictionSelect if self.tenant_id.is_none() => {
        Some("no barangay selected")
      }
      WizardStep::Biodata if self.birth_date.is_none() => {
        Some("birth date missing")
      }
      WizardStep::Biodata
        if self
          .mothers_maiden_name
          .as_deref()
          .is_none_or(|n| n.trim().is_empty()) =>
      {
        Some("mother's maiden name missing")
      }
      WizardStep::Geofence if self.geo.is_none() => {
        Some("no geolocation fix captured")
      }
      WizardStep::DocumentCapture if self.id_image.is_none() => {
        Some("no identity document captured")
      }
      WizardStep::LivenessCapture if self.selfie_image.is_none() => {
        Some("no selfie captured")
      }
      _ => None,
    }
  }

  /// The unmet requirement of the current step, if any.
  pub fn guard_unmet(&self) -> Option<&'static str> {
    self.guard_unmet_at(self.step)
  }

  // ── Transitions ───────────────────────────────────────────────────────

  /// Move forward one step. Fails with the named unmet requirement when the
  /// current step's guard does not hold, and with [`Error::FinalStep`] at
  /// step 5 (submission is the only exit from there).
  pub fn advance(&mut self) -> Result<WizardStep> {
    if let Some(reason) = self.guard_unmet() {
      return Err(Error::GuardUnsatisfied { step: self.step.number(), reason });
    }
    let next = self.step.next().ok_or(Error::FinalStep)?;
    self.step = next;
    self.touch();
    Ok(self.step)
  }

  /// Move back one step. Always permitted; never discards captured data;
  /// clamps at step 1.
  pub fn go_back(&mut self) -> WizardStep {
    if let Some(prev) = self.step.prev() {
      self.step = prev;
      self.touch();
    }
    self.step
  }

  // ── Captures ──────────────────────────────────────────────────────────

  /// Record the chosen tenant along with the cascading selector codes that
  /// led to it.
  pub fn select_jurisdiction(
    &mut self,
    tenant_id: Uuid,
    province_code: String,
    city_code: String,
  ) {
    self.tenant_id = Some(tenant_id);
    self.selected_province_code = Some(province_code);
    self.selected_city_code = Some(city_code);
    self.touch();
  }

  pub fn set_biodata(
    &mut self,
    birth_date: NaiveDate,
    mothers_maiden_name: &str,
  ) -> Result<()> {
    let name = mothers_maiden_name.trim();
    if name.is_empty() {
      return Err(Error::EmptyCapture("mother's maiden name"));
    }
    self.birth_date = Some(birth_date);
    self.mothers_maiden_name = Some(name.to_string());
    self.touch();
    Ok(())
  }

  /// Record a geolocation fix and evaluate the geofence against the tenant
  /// centroid (or the fixed default point when the tenant has none).
  pub fn set_location_fix(
    &mut self,
    fix: Coordinates,
    centroid: Option<Coordinates>,
  ) {
    let reference = centroid.unwrap_or(DEFAULT_CENTROID);
    self.geo = Some(GeoEvidence {
      lat:         fix.lat,
      lng:         fix.lng,
      distance_km: geofence::round2(geofence::distance_km(fix, reference)),
    });
    self.touch();
  }

  pub fn set_id_image(&mut self, image: String) -> Result<()> {
    if image.trim().is_empty() {
      return Err(Error::EmptyCapture("identity document image"));
    }
    self.id_image = Some(image);
    self.touch();
    Ok(())
  }

  pub fn set_selfie_image(&mut self, image: String) -> Result<()> {
    if image.trim().is_empty() {
      return Err(Error::EmptyCapture("selfie image"));
    }
    self.selfie_image = Some(image);
    self.touch();
    Ok(())
  }

  // ── Submission ────────────────────────────────────────────────────────

  /// Whether Submit is enabled: at the final step with every guard
  /// satisfied.
  pub fn is_submittable(&self) -> bool {
    self.step == WizardStep::LivenessCapture
      && [
        WizardStep::JurisdictionSelect,
        WizardStep::Biodata,
        WizardStep::Geofence,
        WizardStep::DocumentCapture,
        WizardStep::LivenessCapture,
      ]
      .iter()
      .all(|s| self.guard_unmet_at(*s).is_none())
  }

  /// Package the draft for the adjudicator, or name the first missing field.
  pub fn submission(&self) -> Result<SubmissionRequest> {
    let tenant_id =
      self.tenant_id.ok_or(Error::NotSubmittable("tenant"))?;
    let birth_date =
      self.birth_date.ok_or(Error::NotSubmittable("birth date"))?;
    let mothers_maiden_name = self
      .mothers_maiden_name
      .clone()
      .ok_or(Error::NotSubmittable("mother's maiden name"))?;
    let geo = self.geo.ok_or(Error::NotSubmittable("geolocation fix"))?;
    let id_image = self
      .id_image
      .clone()
      .ok_or(Error::NotSubmittable("identity document image"))?;
    let selfie_image = self
      .selfie_image
      .clone()
      .ok_or(Error::NotSubmittable("selfie image"))?;

    Ok(SubmissionRequest {
      tenant_id,
      birth_date,
      mothers_maiden_name,
      location: SubmissionLocation {
        lat:      geo.lat,
        lng:      geo.lng,
        distance: geo.distance_km,
      },
      id_image,
      selfie_image,
    })
  }
}
