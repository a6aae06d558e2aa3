//! [`SqliteStore`] — the SQLite implementation of [`PlatformStore`].

use std::path::Path;

use chrono::{Duration, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use bayan_core::{
  invite::{
    self, ConsumeOutcome, InviteToken, InviteValidity, IssuedInvite,
    JurisdictionScope,
  },
  reconcile::normalize,
  store::PlatformStore,
  tenant::{NewTenant, TenantRecord},
  wizard::VerificationDraft,
};

use crate::{
  encode::{
    encode_dt, encode_tenant_status, encode_uuid, RawInvite, RawTenant,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A bayan platform store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Provisioning boundary: persist a new tenant record. `tenant_id` and
  /// `created_at` are store-assigned. Not part of [`PlatformStore`] — the
  /// core only reads the directory.
  pub async fn add_tenant(&self, input: NewTenant) -> Result<TenantRecord> {
    let tenant = TenantRecord {
      tenant_id:     Uuid::new_v4(),
      barangay_name: input.barangay_name,
      city_name:     input.city_name,
      province_name: input.province_name,
      status:        input.status,
      centroid:      input.centroid,
      quality:       input.quality,
      created_at:    Utc::now(),
    };

    let id_str     = encode_uuid(tenant.tenant_id);
    let barangay   = tenant.barangay_name.clone();
    let city       = tenant.city_name.clone();
    let province   = tenant.province_name.clone();
    let status_str = tenant.status.map(encode_tenant_status).map(str::to_owned);
    let lat        = tenant.centroid.map(|c| c.lat);
    let lng        = tenant.centroid.map(|c| c.lng);
    let quality    = tenant.quality as i64;
    let at_str     = encode_dt(tenant.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO tenants (
             tenant_id, barangay_name, city_name, province_name,
             status, centroid_lat, centroid_lng, quality, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id_str, barangay, city, province, status_str, lat, lng, quality,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(tenant)
  }

  async fn invite_by_hash(&self, hash: String) -> Result<Option<InviteToken>> {
    let raw: Option<RawInvite> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT token_hash, province_name, city_name, barangay_name,
                      region_name, issued_at, expires_at, consumed
               FROM invite_tokens WHERE token_hash = ?1",
              rusqlite::params![hash],
              |row| {
                Ok(RawInvite {
                  token_hash:    row.get(0)?,
                  province_name: row.get(1)?,
                  city_name:     row.get(2)?,
                  barangay_name: row.get(3)?,
                  region_name:   row.get(4)?,
                  issued_at:     row.get(5)?,
                  expires_at:    row.get(6)?,
                  consumed:      row.get(7)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawInvite::into_invite).transpose()
  }
}

// ─── PlatformStore impl ──────────────────────────────────────────────────────

impl PlatformStore for SqliteStore {
  type Error = Error;

  // ── Tenant directory ──────────────────────────────────────────────────────

  async fn tenants_in_city(
    &self,
    province_name: &str,
    city_name: &str,
  ) -> Result<Vec<TenantRecord>> {
    let province = normalize(province_name);
    let city = normalize(city_name);

    let raws: Vec<RawTenant> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT tenant_id, barangay_name, city_name, province_name,
                  status, centroid_lat, centroid_lng, quality, created_at
           FROM tenants
           WHERE lower(trim(province_name)) = ?1
             AND lower(trim(city_name)) = ?2
           ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![province, city], |row| {
            Ok(RawTenant {
              tenant_id:     row.get(0)?,
              barangay_name: row.get(1)?,
              city_name:     row.get(2)?,
              province_name: row.get(3)?,
              status:        row.get(4)?,
              centroid_lat:  row.get(5)?,
              centroid_lng:  row.get(6)?,
              quality:       row.get(7)?,
              created_at:    row.get(8)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTenant::into_tenant).collect()
  }

  async fn get_tenant(&self, tenant_id: Uuid) -> Result<Option<TenantRecord>> {
    let id_str = encode_uuid(tenant_id);

    let raw: Option<RawTenant> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT tenant_id, barangay_name, city_name, province_name,
                      status, centroid_lat, centroid_lng, quality, created_at
               FROM tenants WHERE tenant_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawTenant {
                  tenant_id:     row.get(0)?,
                  barangay_name: row.get(1)?,
                  city_name:     row.get(2)?,
                  province_name: row.get(3)?,
                  status:        row.get(4)?,
                  centroid_lat:  row.get(5)?,
                  centroid_lng:  row.get(6)?,
                  quality:       row.get(7)?,
                  created_at:    row.get(8)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTenant::into_tenant).transpose()
  }

  // ── Invite tokens ─────────────────────────────────────────────────────────

  async fn issue_invite(
    &self,
    scope: JurisdictionScope,
    region_name: Option<String>,
    ttl: Duration,
  ) -> Result<IssuedInvite> {
    let token = invite::generate_token();
    let now = Utc::now();

    let record = InviteToken {
      token_hash: invite::token_lookup_hash(&token),
      scope,
      region_name,
      issued_at: now,
      expires_at: now + ttl,
      consumed: false,
    };

    let hash       = record.token_hash.clone();
    let province   = record.scope.province_name.clone();
    let city       = record.scope.city_name.clone();
    let barangay   = record.scope.barangay_name.clone();
    let region     = record.region_name.clone();
    let issued_str = encode_dt(record.issued_at);
    let expiry_str = encode_dt(record.expires_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO invite_tokens (
             token_hash, province_name, city_name, barangay_name,
             region_name, issued_at, expires_at, consumed
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0)",
          rusqlite::params![
            hash, province, city, barangay, region, issued_str, expiry_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(IssuedInvite { token, record })
  }

  async fn resolve_invite(&self, token: &str) -> Result<Option<InviteToken>> {
    self.invite_by_hash(invite::token_lookup_hash(token)).await
  }

  async fn consume_invite(&self, token: &str) -> Result<ConsumeOutcome> {
    let hash = invite::token_lookup_hash(token);

    let Some(mut record) = self.invite_by_hash(hash.clone()).await? else {
      return Ok(ConsumeOutcome::NotFound);
    };

    match record.validity(Utc::now()) {
      InviteValidity::Consumed => {
        return Ok(ConsumeOutcome::AlreadyConsumed(record));
      }
      InviteValidity::Expired => return Ok(ConsumeOutcome::Expired(record)),
      InviteValidity::Valid => {}
    }

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE invite_tokens SET consumed = 1 WHERE token_hash = ?1",
          rusqlite::params![hash],
        )?;
        Ok(())
      })
      .await?;

    record.consumed = true;
    Ok(ConsumeOutcome::Consumed(record))
  }

  // ── Verification drafts ───────────────────────────────────────────────────

  async fn save_draft(&self, draft: &VerificationDraft) -> Result<()> {
    let owner_str = encode_uuid(draft.owner_user_id);
    let draft_json = serde_json::to_string(draft)?;
    let at_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO user_documents (owner_user_id, verification_draft, updated_at)
           VALUES (?1, ?2, ?3)
           ON CONFLICT(owner_user_id) DO UPDATE SET
             verification_draft = excluded.verification_draft,
             updated_at         = excluded.updated_at",
          rusqlite::params![owner_str, draft_json, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn load_draft(
    &self,
    owner_user_id: Uuid,
  ) -> Result<Option<VerificationDraft>> {
    let owner_str = encode_uuid(owner_user_id);

    let slot: Option<Option<String>> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT verification_draft FROM user_documents
               WHERE owner_user_id = ?1",
              rusqlite::params![owner_str],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    match slot.flatten() {
      Some(json) => Ok(Some(serde_json::from_str(&json)?)),
      None => Ok(None),
    }
  }

  async fn clear_draft(&self, owner_user_id: Uuid) -> Result<()> {
    let owner_str = encode_uuid(owner_user_id);
    let at_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE user_documents
           SET verification_draft = NULL, updated_at = ?2
           WHERE owner_user_id = ?1",
          rusqlite::params![owner_str, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
