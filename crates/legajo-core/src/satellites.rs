//! Satellite records hanging off a person: education, medical coverage,
//! illnesses and vulnerability conditions, plus the composite read that
//! bundles them.
//!
//! Each record carries a `deleted` flag that the backend treats as
//! authoritative: a present object with `deleted: true` does not exist.

use serde::{Deserialize, Serialize};

use crate::{localizacion::Localizacion, persona::{Persona, RefItem}};

// ─── Education ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Educacion {
  pub id:                     i64,
  #[serde(default)]
  pub esta_escolarizado:      bool,
  #[serde(default)]
  pub nivel_alcanzado:        Option<String>,
  #[serde(default)]
  pub ultimo_cursado:         Option<String>,
  #[serde(default)]
  pub tipo_escuela:           Option<String>,
  #[serde(default)]
  pub institucion_educativa:  Option<RefItem>,
  #[serde(default)]
  pub comentarios_educativos: Option<String>,
  #[serde(default)]
  pub deleted:                bool,
}

// ─── Medical coverage ────────────────────────────────────────────────────────

/// The family doctor recorded on a coverage record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicoCabecera {
  #[serde(default)]
  pub nombre:   Option<String>,
  #[serde(default)]
  pub mail:     Option<String>,
  #[serde(default)]
  pub telefono: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enfermedad {
  pub id:                      i64,
  #[serde(default)]
  pub situacion_salud:         Option<RefItem>,
  /// Illness name.
  #[serde(default)]
  pub enfermedad:              Option<String>,
  #[serde(default)]
  pub certificacion:           Option<String>,
  #[serde(default)]
  pub beneficios_gestionados:  Option<String>,
  #[serde(default)]
  pub recibe_tratamiento:      bool,
  #[serde(default)]
  pub informacion_tratamiento: Option<String>,
  #[serde(default)]
  pub deleted:                 bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoberturaMedica {
  pub id:                    i64,
  /// Universal child benefit.
  #[serde(default)]
  pub auh:                   bool,
  #[serde(default)]
  pub obra_social:           Option<String>,
  #[serde(default)]
  pub intervencion:          Option<String>,
  #[serde(default)]
  pub institucion_sanitaria: Option<RefItem>,
  #[serde(default)]
  pub observaciones:         Option<String>,
  #[serde(default)]
  pub medico_cabecera:       Option<MedicoCabecera>,
  #[serde(default)]
  pub enfermedades:          Vec<Enfermedad>,
  #[serde(default)]
  pub deleted:               bool,
}

// ─── Vulnerability ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CondicionVulnerabilidad {
  #[serde(default)]
  pub id:                       Option<i64>,
  pub condicion_vulnerabilidad: RefItem,
  #[serde(default)]
  pub si_no:                    bool,
}

// ─── Composite read ──────────────────────────────────────────────────────────

/// Everything known about one person, assembled from independent reads.
/// Each part degrades to `None`/empty on its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonaCompleta {
  pub persona_id:       i64,
  pub localizacion:     Option<Localizacion>,
  pub educacion:        Option<Educacion>,
  pub cobertura_medica: Option<CoberturaMedica>,
  pub vulnerabilidades: Vec<CondicionVulnerabilidad>,
}

impl PersonaCompleta {
  pub fn is_empty(&self) -> bool {
    self.localizacion.is_none()
      && self.educacion.is_none()
      && self.cobertura_medica.is_none()
      && self.vulnerabilidades.is_empty()
  }
}

/// One subject inside a demanda's full-detail document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandaPersona {
  pub persona:                    Persona,
  #[serde(default)]
  pub localizacion:               Option<Localizacion>,
  #[serde(default)]
  pub educacion:                  Option<Educacion>,
  #[serde(default)]
  pub cobertura_medica:           Option<CoberturaMedica>,
  #[serde(default)]
  pub condiciones_vulnerabilidad: Vec<CondicionVulnerabilidad>,
}

/// The broad case-detail document used as a fallback source for composite
/// person reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DemandaFullDetail {
  pub id:       i64,
  #[serde(default)]
  pub personas: Vec<DemandaPersona>,
}

impl DemandaFullDetail {
  /// Pull the satellite data of `persona_id` out of the document. Records
  /// flagged `deleted` are treated as absent.
  pub fn extract(&self, persona_id: i64) -> Option<PersonaCompleta> {
    let entry = self.personas.iter().find(|p| p.persona.id == persona_id)?;
    Some(PersonaCompleta {
      persona_id,
      localizacion: entry.localizacion.clone().filter(|l| !l.deleted),
      educacion: entry.educacion.clone().filter(|e| !e.deleted),
      cobertura_medica: entry.cobertura_medica.clone().filter(|c| !c.deleted),
      vulnerabilidades: entry.condiciones_vulnerabilidad.clone(),
    })
  }
}
