//! Nested-entity reconciliation: edited form snapshot → minimal change-set.
//!
//! The backend expects explicit per-entity markers. For every satellite of a
//! person (address, education, medical coverage, each illness, each
//! vulnerability condition) the reconciler decides one [`EntityChange`]:
//!
//! - [`EntityChange::Omit`]: never existed and still holds nothing.
//! - [`EntityChange::Upsert`]: holds meaningful data; carries the id when the
//!   record already exists.
//! - [`EntityChange::SoftDelete`]: existed, but the user cleared it.
//!
//! Entities are described by static [`EntitySchema`]s and the decision is a
//! single fold over the schema, so no entity type carries its own logic.
//! Inputs are never mutated.

mod form;
pub mod schema;


use chrono::NaiveDate;
use serde::{Serialize, Serializer, ser::SerializeMap as _};
use serde_json::{Map, Value};
use thiserror::Error;

pub use form::{KnownIds, PersonaForm};

/// A JSON object as produced by the form layer.
pub type Fields = Map<String, Value>;

// ─── Errors ──────────────────────────────────────────────────────────────────

/// A snapshot field held a value of the wrong shape. This is a bug in the
/// form layer, never a user error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
  #[error("malformed {entity}.{field}: {reason}")]
  Malformed {
    entity: &'static str,
    field:  &'static str,
    reason: String,
  },
}

// ─── Schema ──────────────────────────────────────────────────────────────────

/// How a raw form value is turned into the type the backend expects.
#[derive(Debug, Clone, Copy)]
pub enum Coerce {
  /// Trimmed string; numbers are accepted and stringified.
  Text,
  /// Whole number; numeric strings are parsed.
  Integer,
  /// Floating point; numeric strings are parsed.
  Decimal,
  Bool,
  /// `YYYY-MM-DD` calendar date.
  Date,
  /// A reference-data selection: a bare id or an `{ id, nombre }` object.
  /// Always sent as the bare id.
  Ref,
  /// A nested object judged by its own schema.
  Object(&'static EntitySchema),
}

/// When a field is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
  /// Always sent as an explicit `true`/`false`; the backend rejects absence.
  AlwaysBool,
  /// Always sent, as the empty value of its type when unset.
  Required,
  /// Sent only when it holds a non-default value.
  OmitWhenEmpty,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
  pub name:     &'static str,
  pub coerce:   Coerce,
  pub presence: Presence,
}

impl FieldSpec {
  pub const fn always_bool(name: &'static str) -> Self {
    Self { name, coerce: Coerce::Bool, presence: Presence::AlwaysBool }
  }

  pub const fn required(name: &'static str, coerce: Coerce) -> Self {
    Self { name, coerce, presence: Presence::Required }
  }

  pub const fn optional(name: &'static str, coerce: Coerce) -> Self {
    Self { name, coerce, presence: Presence::OmitWhenEmpty }
  }
}

#[derive(Debug)]
pub struct EntitySchema {
  pub name:   &'static str,
  pub fields: &'static [FieldSpec],
}

/// A repeated satellite. Entries where none of `keys` is set are dropped.
#[derive(Debug)]
pub struct CollectionSchema {
  pub entity: &'static EntitySchema,
  pub keys:   &'static [&'static str],
}

// ─── Change ──────────────────────────────────────────────────────────────────

/// What gets sent for one entity.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityChange {
  Omit,
  Upsert(Fields),
  SoftDelete(i64),
}

impl EntityChange {
  pub fn is_omit(&self) -> bool { matches!(self, Self::Omit) }

  /// The id carried by an update or a deletion.
  pub fn id(&self) -> Option<i64> {
    match self {
      Self::Omit => None,
      Self::Upsert(fields) => fields.get("id").and_then(Value::as_i64),
      Self::SoftDelete(id) => Some(*id),
    }
  }
}

impl Serialize for EntityChange {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      Self::Omit => serializer.serialize_none(),
      Self::Upsert(fields) => fields.serialize(serializer),
      Self::SoftDelete(id) => {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("id", id)?;
        map.serialize_entry("deleted", &true)?;
        map.end()
      }
    }
  }
}

/// The reconciled payload for one person.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonaChangeSet {
  pub persona:                    Fields,
  pub usar_localizacion_demanda:  bool,
  #[serde(skip_serializing_if = "EntityChange::is_omit")]
  pub localizacion:               EntityChange,
  #[serde(skip_serializing_if = "EntityChange::is_omit")]
  pub educacion:                  EntityChange,
  #[serde(skip_serializing_if = "EntityChange::is_omit")]
  pub cobertura_medica:           EntityChange,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub enfermedades:               Vec<EntityChange>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub condiciones_vulnerabilidad: Vec<EntityChange>,
}

// ─── Entry points ────────────────────────────────────────────────────────────

/// Reconcile one person's edited form against the ids known server-side.
pub fn reconcile_persona(
  form: &PersonaForm,
  known: &KnownIds,
) -> Result<PersonaChangeSet, ReconcileError> {
  let (mut persona, _) = emit_fields(&schema::PERSONA, &form.persona)?;
  if let Some(id) = read_id(&schema::PERSONA, &form.persona)? {
    persona.insert("id".into(), Value::from(id));
  }

  let localizacion = if form.usar_localizacion_demanda {
    // The toggle is authoritative regardless of what the fields hold.
    EntityChange::Omit
  } else {
    reconcile_entity(
      &schema::LOCALIZACION,
      form.localizacion.as_ref(),
      known.localizacion,
    )?
  };

  let changes = PersonaChangeSet {
    persona,
    usar_localizacion_demanda: form.usar_localizacion_demanda,
    localizacion,
    educacion: reconcile_entity(
      &schema::EDUCACION,
      form.educacion.as_ref(),
      known.educacion,
    )?,
    cobertura_medica: reconcile_entity(
      &schema::COBERTURA_MEDICA,
      form.cobertura_medica.as_ref(),
      known.cobertura_medica,
    )?,
    enfermedades: reconcile_collection(&schema::ENFERMEDADES, &form.enfermedades)?,
    condiciones_vulnerabilidad: reconcile_collection(
      &schema::VULNERABILIDADES,
      &form.condiciones_vulnerabilidad,
    )?,
  };

  tracing::debug!(
    persona = ?changes.persona.get("id"),
    localizacion = kind(&changes.localizacion),
    educacion = kind(&changes.educacion),
    cobertura_medica = kind(&changes.cobertura_medica),
    enfermedades = changes.enfermedades.len(),
    "reconciled persona form"
  );
  Ok(changes)
}

/// Reconcile every subject of a multi-subject form, in order.
pub fn reconcile_case(
  subjects: &[(PersonaForm, KnownIds)],
) -> Result<Vec<PersonaChangeSet>, ReconcileError> {
  subjects
    .iter()
    .map(|(form, known)| reconcile_persona(form, known))
    .collect()
}

/// Decide the change for a single (1:1) satellite.
///
/// `known_id` wins over an `id` found in the snapshot itself. An explicit
/// `deleted: true` in the snapshot is honoured when an id is known.
pub fn reconcile_entity(
  schema: &'static EntitySchema,
  snapshot: Option<&Fields>,
  known_id: Option<i64>,
) -> Result<EntityChange, ReconcileError> {
  let snapshot_id = snapshot.map(|s| read_id(schema, s)).transpose()?.flatten();
  let id = known_id.or(snapshot_id);

  let Some(snapshot) = snapshot else {
    return Ok(id.map_or(EntityChange::Omit, EntityChange::SoftDelete));
  };

  if is_marked_deleted(schema, snapshot)? {
    return Ok(id.map_or(EntityChange::Omit, EntityChange::SoftDelete));
  }

  let (mut fields, meaningful) = emit_fields(schema, snapshot)?;
  Ok(match (meaningful, id) {
    (true, Some(id)) => {
      fields.insert("id".into(), Value::from(id));
      EntityChange::Upsert(fields)
    }
    (true, None) => EntityChange::Upsert(fields),
    (false, Some(id)) => EntityChange::SoftDelete(id),
    (false, None) => EntityChange::Omit,
  })
}

/// Reconcile a repeated satellite. Entries without any key field are
/// dropped; the rest are upserted one by one. A deletion only happens when
/// an entry carries its own `deleted: true` marker and an id.
pub fn reconcile_collection(
  schema: &'static CollectionSchema,
  entries: &[Fields],
) -> Result<Vec<EntityChange>, ReconcileError> {
  let entity = schema.entity;
  let mut out = Vec::with_capacity(entries.len());
  for entry in entries {
    let id = read_id(entity, entry)?;
    if is_marked_deleted(entity, entry)? {
      if let Some(id) = id {
        out.push(EntityChange::SoftDelete(id));
      }
      continue;
    }

    let mut has_key = false;
    for &key in schema.keys {
      let spec = entity
        .fields
        .iter()
        .find(|f| f.name == key)
        .ok_or_else(|| ReconcileError::Malformed {
          entity: entity.name,
          field:  key,
          reason: "key field missing from schema".into(),
        })?;
      if coerce_field(entity, spec, entry.get(spec.name))?.is_some() {
        has_key = true;
        break;
      }
    }
    if !has_key {
      continue;
    }

    let (mut fields, _) = emit_fields(entity, entry)?;
    if let Some(id) = id {
      fields.insert("id".into(), Value::from(id));
    }
    out.push(EntityChange::Upsert(fields));
  }
  Ok(out)
}

/// Whether a snapshot holds anything worth sending under `schema`.
pub fn is_meaningful(
  schema: &'static EntitySchema,
  snapshot: &Fields,
) -> Result<bool, ReconcileError> {
  Ok(emit_fields(schema, snapshot)?.1)
}

// ─── Fold ────────────────────────────────────────────────────────────────────

/// Build the outgoing field map for `snapshot` and report whether any field
/// held a non-default value.
fn emit_fields(
  schema: &'static EntitySchema,
  snapshot: &Fields,
) -> Result<(Fields, bool), ReconcileError> {
  let mut out = Fields::new();
  let mut meaningful = false;
  for spec in schema.fields {
    let value = coerce_field(schema, spec, snapshot.get(spec.name))?;
    meaningful |= value.is_some();
    match (spec.presence, value) {
      (Presence::AlwaysBool, value) => {
        out.insert(spec.name.into(), Value::Bool(value.is_some()));
      }
      (_, Some(value)) => {
        out.insert(spec.name.into(), value);
      }
      (Presence::Required, None) => {
        out.insert(spec.name.into(), empty_value(spec.coerce));
      }
      (Presence::OmitWhenEmpty, None) => {}
    }
  }
  Ok((out, meaningful))
}

fn empty_value(coerce: Coerce) -> Value {
  match coerce {
    Coerce::Text => Value::String(String::new()),
    Coerce::Bool => Value::Bool(false),
    _ => Value::Null,
  }
}

/// Coerce one raw value. `None` means "empty or default".
fn coerce_field(
  schema: &'static EntitySchema,
  spec: &FieldSpec,
  raw: Option<&Value>,
) -> Result<Option<Value>, ReconcileError> {
  let malformed = |reason: String| ReconcileError::Malformed {
    entity: schema.name,
    field: spec.name,
    reason,
  };
  let Some(raw) = raw else { return Ok(None) };
  if raw.is_null() {
    return Ok(None);
  }

  match spec.coerce {
    Coerce::Text => match raw {
      Value::String(s) => {
        let s = s.trim();
        Ok((!s.is_empty()).then(|| Value::String(s.to_string())))
      }
      Value::Number(n) => Ok(Some(Value::String(n.to_string()))),
      other => Err(malformed(format!("expected text, got {other}"))),
    },

    Coerce::Integer => parse_integer(raw)
      .map(|n| (n != 0).then(|| Value::from(n)))
      .map_err(malformed),

    Coerce::Decimal => {
      let n = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
      }
      .ok_or_else(|| malformed(format!("expected a decimal, got {raw}")))?;
      Ok((n != 0.0).then(|| Value::from(n)))
    }

    Coerce::Bool => {
      let b = match raw {
        Value::Bool(b) => *b,
        Value::String(s) => match s.trim() {
          "true" => true,
          "false" | "" => false,
          other => return Err(malformed(format!("expected a boolean, got {other:?}"))),
        },
        other => return Err(malformed(format!("expected a boolean, got {other}"))),
      };
      Ok(b.then_some(Value::Bool(true)))
    }

    Coerce::Date => match raw {
      Value::String(s) if s.trim().is_empty() => Ok(None),
      Value::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map(|d| Some(Value::String(d.format("%Y-%m-%d").to_string())))
        .map_err(|e| malformed(format!("invalid date {s:?}: {e}"))),
      other => Err(malformed(format!("expected a date, got {other}"))),
    },

    Coerce::Ref => {
      let id = match raw {
        Value::Object(obj) => match obj.get("id") {
          None | Some(Value::Null) => return Ok(None),
          Some(id) => id,
        },
        other => other,
      };
      parse_integer(id)
        .map(|n| (n != 0).then(|| Value::from(n)))
        .map_err(malformed)
    }

    Coerce::Object(nested) => match raw {
      Value::Object(obj) => {
        let (fields, meaningful) = emit_fields(nested, obj)?;
        Ok(meaningful.then_some(Value::Object(fields)))
      }
      other => Err(malformed(format!("expected an object, got {other}"))),
    },
  }
}

fn parse_integer(raw: &Value) -> Result<i64, String> {
  match raw {
    Value::Number(n) => n
      .as_i64()
      .ok_or_else(|| format!("expected a whole number, got {n}")),
    Value::String(s) if s.trim().is_empty() => Ok(0),
    Value::String(s) => s
      .trim()
      .parse()
      .map_err(|_| format!("expected a whole number, got {s:?}")),
    other => Err(format!("expected a whole number, got {other}")),
  }
}

fn read_id(
  schema: &'static EntitySchema,
  snapshot: &Fields,
) -> Result<Option<i64>, ReconcileError> {
  match snapshot.get("id") {
    None | Some(Value::Null) => Ok(None),
    Some(raw) => parse_integer(raw)
      .map(|n| (n != 0).then_some(n))
      .map_err(|reason| ReconcileError::Malformed {
        entity: schema.name,
        field: "id",
        reason,
      }),
  }
}

fn is_marked_deleted(
  schema: &'static EntitySchema,
  snapshot: &Fields,
) -> Result<bool, ReconcileError> {
  match snapshot.get("deleted") {
    None | Some(Value::Null) => Ok(false),
    Some(Value::Bool(b)) => Ok(*b),
    Some(other) => Err(ReconcileError::Malformed {
      entity: schema.name,
      field:  "deleted",
      reason: format!("expected a boolean, got {other}"),
    }),
  }
}

fn kind(change: &EntityChange) -> &'static str {
  match change {
    EntityChange::Omit => "omit",
    EntityChange::Upsert(_) => "upsert",
    EntityChange::SoftDelete(_) => "soft_delete",
  }
}
