//! Person records and the reference items that decorate them.
//!
//! A [`Persona`] is never hard-deleted; the backend propagates soft deletion
//! through the `deleted` flag.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

// ─── Reference data ──────────────────────────────────────────────────────────

/// An entry from a dropdown/reference-data endpoint: an id plus the label
/// shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefItem {
  pub id:     i64,
  pub nombre: String,
}

// ─── Persona ─────────────────────────────────────────────────────────────────

/// A human record as the backend returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
  pub id:                   i64,
  pub nombre:               String,
  /// Self-identified name; takes precedence for display when present.
  #[serde(default)]
  pub nombre_autopercibido: Option<String>,
  pub apellido:             String,
  #[serde(default)]
  pub fecha_nacimiento:     Option<NaiveDate>,
  /// Used when the exact birth date is unknown.
  #[serde(default)]
  pub edad_aproximada:      Option<u32>,
  #[serde(default)]
  pub nacionalidad:         Option<String>,
  #[serde(default)]
  pub dni:                  Option<i64>,
  #[serde(default)]
  pub situacion_dni:        Option<String>,
  #[serde(default)]
  pub genero:               Option<String>,
  #[serde(default)]
  pub telefono:             Option<String>,
  #[serde(default)]
  pub observaciones:        Option<String>,
  #[serde(default)]
  pub adulto:               bool,
  #[serde(default)]
  pub nnya:                 bool,
  #[serde(default)]
  pub deleted:              bool,
}

impl Persona {
  /// The name to show in cards and pickers.
  pub fn display_name(&self) -> String {
    let given = self
      .nombre_autopercibido
      .as_deref()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .unwrap_or(self.nombre.trim());
    format!("{} {}", given, self.apellido.trim()).trim().to_string()
  }

  /// Age in whole years on `today`, from the birth date when known and the
  /// approximate age otherwise.
  pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
    match self.fecha_nacimiento {
      Some(born) => {
        let mut years = today.year() - born.year();
        if (today.month(), today.day()) < (born.month(), born.day()) {
          years -= 1;
        }
        u32::try_from(years).ok()
      }
      None => self.edad_aproximada,
    }
  }
}

// ─── Search results ──────────────────────────────────────────────────────────

/// The case file a person currently belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegajoRef {
  pub id:     i64,
  pub numero: String,
}

/// A lightweight search hit used to populate "link existing person" pickers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaCandidate {
  pub id:       i64,
  pub nombre:   String,
  pub apellido: String,
  #[serde(default)]
  pub dni:      Option<i64>,
  #[serde(default)]
  pub adulto:   bool,
  /// Present when the person already has a legajo of their own.
  #[serde(default)]
  pub legajo:   Option<LegajoRef>,
}

impl PersonaCandidate {
  pub fn display_name(&self) -> String {
    format!("{} {}", self.nombre.trim(), self.apellido.trim())
      .trim()
      .to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn persona() -> Persona {
    Persona {
      id:                   1,
      nombre:               "Juana".into(),
      nombre_autopercibido: None,
      apellido:             "Pérez".into(),
      fecha_nacimiento:     NaiveDate::from_ymd_opt(2012, 6, 15),
      edad_aproximada:      None,
      nacionalidad:         None,
      dni:                  Some(45_123_456),
      situacion_dni:        None,
      genero:               None,
      telefono:             None,
      observaciones:        None,
      adulto:               false,
      nnya:                 true,
      deleted:              false,
    }
  }

  #[test]
  fn self_identified_name_wins() {
    let mut p = persona();
    assert_eq!(p.display_name(), "Juana Pérez");
    p.nombre_autopercibido = Some("Juan".into());
    assert_eq!(p.display_name(), "Juan Pérez");
    p.nombre_autopercibido = Some("   ".into());
    assert_eq!(p.display_name(), "Juana Pérez");
  }

  #[test]
  fn age_counts_birthday_boundary() {
    let p = persona();
    let before = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
    let on = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    assert_eq!(p.age_on(before), Some(11));
    assert_eq!(p.age_on(on), Some(12));
  }

  #[test]
  fn approximate_age_used_without_birth_date() {
    let mut p = persona();
    p.fecha_nacimiento = None;
    p.edad_aproximada = Some(9);
    let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    assert_eq!(p.age_on(today), Some(9));
  }

  #[test]
  fn missing_optional_fields_deserialize() {
    let p: Persona = serde_json::from_value(serde_json::json!({
      "id": 7, "nombre": "Ana", "apellido": "Gómez"
    }))
    .unwrap();
    assert_eq!(p.id, 7);
    assert!(!p.deleted);
    assert!(p.dni.is_none());
  }
}
