//! Relationship records (`PersonaVinculo`) between a case subject and another
//! person.
//!
//! Writes and reads use separate types. [`VinculoFields`] is the mutable link
//! sent on create/edit; [`PersonaVinculo`] is what the backend returns, and
//! its [`DestinoInfo`] snapshot is display-only data that is never sent back.
//!
//! A relationship is never hard-deleted. Its lifecycle has two states,
//! `Active → Unlinked`, and the transition is irreversible.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

use crate::persona::{LegajoRef, RefItem};

// ─── Subject ─────────────────────────────────────────────────────────────────

/// The NNyA that owns a relationship graph, addressed through its legajo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaseSubject {
  pub legajo_id:  i64,
  pub persona_id: i64,
}

// ─── Enumerations ────────────────────────────────────────────────────────────

/// Occupation of the linked person.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  AsRefStr,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Ocupacion {
  Estudiante,
  Trabajador,
  Desocupado,
  Jubilado,
  AmaDeCasa,
  Otro,
}

impl Ocupacion {
  pub fn label(self) -> &'static str {
    match self {
      Self::Estudiante => "Estudiante",
      Self::Trabajador => "Trabajador/a",
      Self::Desocupado => "Desocupado/a",
      Self::Jubilado => "Jubilado/a",
      Self::AmaDeCasa => "Ama de casa",
      Self::Otro => "Otro",
    }
  }
}

// ─── Writes ──────────────────────────────────────────────────────────────────

/// The mutable part of a relationship. Sent on create and on edit; it has no
/// destination field, so an edit can never re-point a link.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VinculoFields {
  /// Id of the relationship type from reference data. Required.
  pub tipo_vinculo:                 Option<i64>,
  #[serde(default)]
  pub conviviente:                  bool,
  #[serde(default)]
  pub legalmente_responsable:       bool,
  #[serde(default)]
  pub es_referente_principal:       bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ocupacion:                    Option<Ocupacion>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub observaciones:                Option<String>,
  /// Required when the destination already belongs to another legajo.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub justificacion_vinculo_legajo: Option<String>,
}

/// Identity fields for a person registered through the "new person" branch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NuevaPersona {
  pub nombre:               String,
  pub apellido:             String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub nombre_autopercibido: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub fecha_nacimiento:     Option<NaiveDate>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub edad_aproximada:      Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub dni:                  Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub genero:               Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub telefono:             Option<String>,
  #[serde(default)]
  pub adulto:               bool,
}

/// The two creation paths for a relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VinculoCreate {
  /// Link a person that already exists.
  Existente {
    persona_destino: i64,
    #[serde(flatten)]
    vinculo:         VinculoFields,
  },
  /// Register a new person and link it in the same request.
  Nueva {
    persona_nueva: NuevaPersona,
    #[serde(flatten)]
    vinculo:       VinculoFields,
  },
}

impl VinculoCreate {
  pub fn vinculo(&self) -> &VinculoFields {
    match self {
      Self::Existente { vinculo, .. } | Self::Nueva { vinculo, .. } => vinculo,
    }
  }

  /// The destination id, when linking an existing person.
  pub fn persona_destino(&self) -> Option<i64> {
    match self {
      Self::Existente { persona_destino, .. } => Some(*persona_destino),
      Self::Nueva { .. } => None,
    }
  }
}

// ─── Reads ───────────────────────────────────────────────────────────────────

/// Read-only projection of the destination person, denormalised by the
/// backend for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DestinoInfo {
  pub nombre_completo: String,
  #[serde(default)]
  pub dni:             Option<i64>,
  #[serde(default)]
  pub edad:            Option<u32>,
  #[serde(default)]
  pub telefono:        Option<String>,
  #[serde(default)]
  pub legajo:          Option<LegajoRef>,
  #[serde(default)]
  pub medidas_activas: Vec<String>,
}

/// A relationship record as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaVinculo {
  pub id:                        i64,
  pub persona_origen:            i64,
  pub persona_destino:           i64,
  pub tipo_vinculo:              RefItem,
  #[serde(default)]
  pub conviviente:               bool,
  #[serde(default)]
  pub legalmente_responsable:    bool,
  #[serde(default)]
  pub es_referente_principal:    bool,
  #[serde(default)]
  pub ocupacion:                 Option<Ocupacion>,
  #[serde(default)]
  pub observaciones:             Option<String>,
  pub activo:                    bool,
  #[serde(default)]
  pub desvinculado_por:          Option<String>,
  #[serde(default)]
  pub desvinculado_en:           Option<DateTime<Utc>>,
  #[serde(default)]
  pub justificacion_desvincular: Option<String>,
  #[serde(default)]
  pub destino_info:              Option<DestinoInfo>,
}

/// Lifecycle state of a relationship, computed from its flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VinculoStatus {
  Active,
  Unlinked {
    by:            Option<String>,
    at:            Option<DateTime<Utc>>,
    justification: Option<String>,
  },
}

impl VinculoStatus {
  pub fn is_active(&self) -> bool { matches!(self, Self::Active) }
}

impl PersonaVinculo {
  pub fn status(&self) -> VinculoStatus {
    if self.activo {
      VinculoStatus::Active
    } else {
      VinculoStatus::Unlinked {
        by:            self.desvinculado_por.clone(),
        at:            self.desvinculado_en,
        justification: self.justificacion_desvincular.clone(),
      }
    }
  }

  pub fn is_active(&self) -> bool { self.activo }

  /// The mutable fields, ready to be edited and sent back. `destino_info` and
  /// the audit fields are dropped.
  pub fn to_fields(&self) -> VinculoFields {
    VinculoFields {
      tipo_vinculo:                 Some(self.tipo_vinculo.id),
      conviviente:                  self.conviviente,
      legalmente_responsable:       self.legalmente_responsable,
      es_referente_principal:       self.es_referente_principal,
      ocupacion:                    self.ocupacion,
      observaciones:                self.observaciones.clone(),
      justificacion_vinculo_legajo: None,
    }
  }
}

/// The active primary referent among `links`, if any.
pub fn referente_principal(links: &[PersonaVinculo]) -> Option<&PersonaVinculo> {
  links
    .iter()
    .find(|v| v.is_active() && v.es_referente_principal)
}
