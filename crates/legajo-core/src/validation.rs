//! Pure validation rules shared by the relationship store and the forms.
//!
//! Nothing here holds state; every function is called with the full context
//! it needs.

use thiserror::Error;

use crate::{
  Error, Result,
  vinculo::{PersonaVinculo, VinculoCreate, VinculoFields},
};

pub const MSG_TIPO_VINCULO: &str = "Debe seleccionar el tipo de vínculo";
pub const MSG_NOMBRE: &str = "El nombre es obligatorio";
pub const MSG_APELLIDO: &str = "El apellido es obligatorio";
pub const MSG_DNI: &str = "El DNI debe tener 7 u 8 dígitos";
pub const MSG_JUSTIFICACION_VINCULO_LEGAJO: &str =
  "La persona ya pertenece a otro legajo: indique la justificación del vínculo";

// ─── Justification ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JustificationError {
  #[error(
    "justification needs at least {min} characters, got {len} ({remaining} \
     missing)"
  )]
  TooShort {
    min:       usize,
    len:       usize,
    remaining: usize,
  },
}

/// Characters still missing before `text` reaches `min_len`, for live
/// counters under a textarea.
pub fn remaining_chars(text: &str, min_len: usize) -> usize {
  min_len.saturating_sub(text.trim().chars().count())
}

/// Check a free-text justification against a minimum length. Length is
/// counted in characters after trimming, and the empty string is always
/// rejected. Returns the trimmed text on success.
pub fn validate_justification(
  text: &str,
  min_len: usize,
) -> Result<&str, JustificationError> {
  let trimmed = text.trim();
  let len = trimmed.chars().count();
  if len == 0 || len < min_len {
    return Err(JustificationError::TooShort {
      min: min_len,
      len,
      remaining: min_len.saturating_sub(len).max(1),
    });
  }
  Ok(trimmed)
}

// ─── DNI ─────────────────────────────────────────────────────────────────────

/// A DNI is a positive integer written with 7 or 8 decimal digits.
pub fn validate_dni(value: i64) -> bool {
  (1_000_000..=99_999_999).contains(&value)
}

/// Parse a DNI typed by a user, accepting the dotted form (`45.123.456`).
pub fn parse_dni(input: &str) -> Option<i64> {
  let digits: String = input.trim().chars().filter(|c| *c != '.').collect();
  if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
    return None;
  }
  digits.parse().ok().filter(|v| validate_dni(*v))
}

// ─── Relationships ───────────────────────────────────────────────────────────

/// Business rules for linking `candidate_id` to the subject: no self links,
/// and no second active link to the same person.
pub fn validate_can_add_relationship(
  candidate_id: i64,
  existing_active: &[PersonaVinculo],
  subject_id: i64,
) -> Result<()> {
  if candidate_id == subject_id {
    return Err(Error::SelfLink(candidate_id));
  }
  if existing_active
    .iter()
    .any(|v| v.is_active() && v.persona_destino == candidate_id)
  {
    return Err(Error::DuplicateLink(candidate_id));
  }
  Ok(())
}

/// Field checks on the mutable link fields.
pub fn validate_relationship_fields(fields: &VinculoFields) -> Vec<String> {
  let mut errors = Vec::new();
  if fields.tipo_vinculo.is_none() {
    errors.push(MSG_TIPO_VINCULO.to_string());
  }
  errors
}

/// Field checks for a create payload, in display order. An empty list means
/// the payload is valid.
pub fn validate_relationship_create(payload: &VinculoCreate) -> Vec<String> {
  let mut errors = validate_relationship_fields(payload.vinculo());
  if let VinculoCreate::Nueva { persona_nueva, .. } = payload {
    if persona_nueva.nombre.trim().is_empty() {
      errors.push(MSG_NOMBRE.to_string());
    }
    if persona_nueva.apellido.trim().is_empty() {
      errors.push(MSG_APELLIDO.to_string());
    }
    if persona_nueva.dni.is_some_and(|dni| !validate_dni(dni)) {
      errors.push(MSG_DNI.to_string());
    }
  }
  errors
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::vinculo::NuevaPersona;

  #[test]
  fn justification_length_is_trimmed() {
    assert!(validate_justification("   ok   ", 3).is_err());
    assert_eq!(validate_justification("  okay  ", 4), Ok("okay"));
  }

  #[test]
  fn justification_empty_rejected_even_with_zero_minimum() {
    assert!(validate_justification("", 0).is_err());
    assert!(validate_justification("    ", 0).is_err());
    assert!(validate_justification("x", 0).is_ok());
  }

  #[test]
  fn justification_reports_remaining() {
    let err = validate_justification("ok", 20).unwrap_err();
    assert_eq!(err, JustificationError::TooShort {
      min:       20,
      len:       2,
      remaining: 18,
    });
    assert_eq!(remaining_chars("ok", 20), 18);
    assert_eq!(remaining_chars("a long enough text", 5), 0);
  }

  #[test]
  fn justification_counts_characters_not_bytes() {
    // Five characters, ten bytes.
    assert!(validate_justification("ñañañ", 5).is_ok());
  }

  #[test]
  fn dni_digit_count() {
    assert!(!validate_dni(999_999));
    assert!(validate_dni(1_000_000));
    assert!(validate_dni(99_999_999));
    assert!(!validate_dni(100_000_000));
    assert!(!validate_dni(0));
    assert!(!validate_dni(-12_345_678));
  }

  #[test]
  fn parse_dni_accepts_dots() {
    assert_eq!(parse_dni("45.123.456"), Some(45_123_456));
    assert_eq!(parse_dni(" 7123456 "), Some(7_123_456));
    assert_eq!(parse_dni("12a45678"), None);
    assert_eq!(parse_dni("123"), None);
    assert_eq!(parse_dni(""), None);
  }

  fn active_link(destino: i64, activo: bool) -> PersonaVinculo {
    serde_json::from_value(json!({
      "id": destino * 10,
      "persona_origen": 1,
      "persona_destino": destino,
      "tipo_vinculo": { "id": 1, "nombre": "Tío" },
      "activo": activo
    }))
    .unwrap()
  }

  #[test]
  fn can_add_rejects_self_and_duplicates() {
    let links = vec![active_link(5, true), active_link(6, false)];
    assert!(matches!(
      validate_can_add_relationship(1, &links, 1),
      Err(Error::SelfLink(1))
    ));
    assert!(matches!(
      validate_can_add_relationship(5, &links, 1),
      Err(Error::DuplicateLink(5))
    ));
    // Unlinked records do not block a new link.
    assert!(validate_can_add_relationship(6, &links, 1).is_ok());
    assert!(validate_can_add_relationship(7, &links, 1).is_ok());
  }

  #[test]
  fn self_link_wins_over_duplicate() {
    let links = vec![active_link(1, true)];
    assert!(matches!(
      validate_can_add_relationship(1, &links, 1),
      Err(Error::SelfLink(1))
    ));
  }

  #[test]
  fn create_errors_in_order() {
    let payload = VinculoCreate::Nueva {
      persona_nueva: NuevaPersona {
        nombre: " ".into(),
        apellido: String::new(),
        dni: Some(123),
        ..Default::default()
      },
      vinculo:       VinculoFields::default(),
    };
    assert_eq!(validate_relationship_create(&payload), vec![
      MSG_TIPO_VINCULO,
      MSG_NOMBRE,
      MSG_APELLIDO,
      MSG_DNI,
    ]);
  }

  #[test]
  fn create_existing_only_needs_type() {
    let mut payload = VinculoCreate::Existente {
      persona_destino: 9,
      vinculo:         VinculoFields::default(),
    };
    assert_eq!(validate_relationship_create(&payload), vec![MSG_TIPO_VINCULO]);
    if let VinculoCreate::Existente { vinculo, .. } = &mut payload {
      vinculo.tipo_vinculo = Some(4);
    }
    assert!(validate_relationship_create(&payload).is_empty());
  }
}
