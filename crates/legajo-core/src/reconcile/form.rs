//! The editable snapshot the reconciler consumes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Fields;
use crate::{persona::Persona, satellites::PersonaCompleta};

/// One person's edited form, as loose JSON objects straight from the UI.
/// Selects deliver ids as strings or `{ id, nombre }` objects; the
/// reconciler coerces them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonaForm {
  #[serde(default)]
  pub persona:                    Fields,
  /// "Use the demanda's address" toggle.
  #[serde(default)]
  pub usar_localizacion_demanda:  bool,
  #[serde(default)]
  pub localizacion:               Option<Fields>,
  #[serde(default)]
  pub educacion:                  Option<Fields>,
  #[serde(default)]
  pub cobertura_medica:           Option<Fields>,
  #[serde(default)]
  pub enfermedades:               Vec<Fields>,
  #[serde(default)]
  pub condiciones_vulnerabilidad: Vec<Fields>,
}

/// Ids of satellite records known to exist server-side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownIds {
  pub localizacion:     Option<i64>,
  pub educacion:        Option<i64>,
  pub cobertura_medica: Option<i64>,
}

impl From<&PersonaCompleta> for KnownIds {
  fn from(c: &PersonaCompleta) -> Self {
    Self {
      localizacion:     c.localizacion.as_ref().map(|l| l.id),
      educacion:        c.educacion.as_ref().map(|e| e.id),
      cobertura_medica: c.cobertura_medica.as_ref().map(|m| m.id),
    }
  }
}

impl PersonaForm {
  /// Prefill a form from what the server holds, so the user edits the
  /// current state.
  pub fn from_completa(persona: &Persona, completa: &PersonaCompleta) -> Self {
    let enfermedades = completa
      .cobertura_medica
      .iter()
      .flat_map(|c| c.enfermedades.iter())
      .filter(|e| !e.deleted)
      .map(to_fields)
      .collect();
    Self {
      persona: to_fields(persona),
      usar_localizacion_demanda: false,
      localizacion: completa.localizacion.as_ref().map(to_fields),
      educacion: completa.educacion.as_ref().map(to_fields),
      cobertura_medica: completa.cobertura_medica.as_ref().map(|c| {
        let mut fields = to_fields(c);
        // Illnesses are edited as their own collection.
        fields.remove("enfermedades");
        fields
      }),
      enfermedades,
      condiciones_vulnerabilidad: completa
        .vulnerabilidades
        .iter()
        .map(to_fields)
        .collect(),
    }
  }
}

fn to_fields<T: Serialize>(value: &T) -> Fields {
  match serde_json::to_value(value) {
    Ok(Value::Object(fields)) => fields,
    _ => Fields::new(),
  }
}
