//! SQL schema for the bayan SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Provisioned tenant directory. Rowid order is insertion order, which is
-- the reconciliation tie-break order.
CREATE TABLE IF NOT EXISTS tenants (
    tenant_id     TEXT PRIMARY KEY,
    barangay_name TEXT NOT NULL,    -- freeform, self-reported at provisioning
    city_name     TEXT NOT NULL,
    province_name TEXT NOT NULL,
    status        TEXT,             -- 'onboarding' | 'live' | 'rejected' | NULL
    centroid_lat  REAL,
    centroid_lng  REAL,
    quality       INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL     -- ISO 8601 UTC; store-assigned
);

-- Invite tokens are stored by SHA-256 lookup hash only; the plaintext token
-- leaves the process exactly once, inside the minted onboarding link.
CREATE TABLE IF NOT EXISTS invite_tokens (
    token_hash    TEXT PRIMARY KEY,
    province_name TEXT NOT NULL,
    city_name     TEXT NOT NULL,
    barangay_name TEXT NOT NULL,
    region_name   TEXT,
    issued_at     TEXT NOT NULL,
    expires_at    TEXT NOT NULL,
    consumed      INTEGER NOT NULL DEFAULT 0
);

-- One document per user. The verification draft lives in a single column so
-- draft writes merge: sibling fields on the row are never touched.
CREATE TABLE IF NOT EXISTS user_documents (
    owner_user_id      TEXT PRIMARY KEY,
    verification_draft TEXT,        -- JSON slot; NULL when no draft in progress
    updated_at         TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS tenants_city_idx  ON tenants(province_name, city_name);
CREATE INDEX IF NOT EXISTS invite_expiry_idx ON invite_tokens(expires_at);

PRAGMA user_version = 1;
";
