//! [`DraftStore`]: form snapshots persisted in SQLite.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, Result, schema::SCHEMA};

/// A recovered snapshot and when it was written.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft<T> {
  pub form_id:  String,
  pub snapshot: T,
  pub saved_at: DateTime<Utc>,
}

/// A listing entry; the snapshot itself is not decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftSummary {
  pub form_id:  String,
  pub saved_at: DateTime<Utc>,
}

struct RawDraft {
  form_id:       String,
  snapshot_json: String,
  saved_at:      String,
}

fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// Drafts backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct DraftStore {
  conn: tokio_rusqlite::Connection,
}

impl DraftStore {
  /// Open (or create) a store at `path`.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

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

  /// Replace the draft of `form_id` with `snapshot`.
  pub async fn save<T: Serialize>(
    &self,
    form_id: &str,
    snapshot: &T,
  ) -> Result<DateTime<Utc>> {
    let json = serde_json::to_string(snapshot)?;
    let saved_at = Utc::now();
    let id = form_id.to_owned();
    let at = encode_dt(saved_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO drafts (form_id, snapshot_json, saved_at)
           VALUES (?1, ?2, ?3)
           ON CONFLICT(form_id) DO UPDATE SET
             snapshot_json = excluded.snapshot_json,
             saved_at      = excluded.saved_at",
          rusqlite::params![id, json, at],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(form_id, "draft saved");
    Ok(saved_at)
  }

  /// The last snapshot saved for `form_id`, if any.
  pub async fn load<T: DeserializeOwned>(&self, form_id: &str) -> Result<Option<Draft<T>>> {
    let id = form_id.to_owned();

    let raw: Option<RawDraft> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT form_id, snapshot_json, saved_at FROM drafts WHERE form_id = ?1",
            rusqlite::params![id],
            |row| {
              Ok(RawDraft {
                form_id:       row.get(0)?,
                snapshot_json: row.get(1)?,
                saved_at:      row.get(2)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw
      .map(|raw| {
        Ok(Draft {
          snapshot: serde_json::from_str(&raw.snapshot_json)?,
          saved_at: decode_dt(&raw.saved_at)?,
          form_id:  raw.form_id,
        })
      })
      .transpose()
  }

  /// Discard the draft of `form_id`. Returns whether one existed.
  pub async fn clear(&self, form_id: &str) -> Result<bool> {
    let id = form_id.to_owned();
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM drafts WHERE form_id = ?1", rusqlite::params![id])?)
      })
      .await?;
    tracing::debug!(form_id, removed, "draft cleared");
    Ok(removed > 0)
  }

  /// Every stored draft, most recent first.
  pub async fn list(&self) -> Result<Vec<DraftSummary>> {
    let rows: Vec<(String, String)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare("SELECT form_id, saved_at FROM drafts ORDER BY saved_at DESC, form_id")?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(form_id, saved_at)| {
        Ok(DraftSummary { form_id, saved_at: decode_dt(&saved_at)? })
      })
      .collect()
  }
}
