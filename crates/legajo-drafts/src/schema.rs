//! SQL schema for the draft store.

/// Idempotent DDL, run on every open.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per form; saving again replaces the snapshot.
CREATE TABLE IF NOT EXISTS drafts (
    form_id       TEXT PRIMARY KEY,
    snapshot_json TEXT NOT NULL,
    saved_at      TEXT NOT NULL    -- ISO 8601 UTC
);

CREATE INDEX IF NOT EXISTS drafts_saved_idx ON drafts(saved_at);

PRAGMA user_version = 1;
";
