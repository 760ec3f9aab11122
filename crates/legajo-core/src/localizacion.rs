//! Address records (`Localizacion`).
//!
//! An address is owned either by a [`Persona`](crate::persona::Persona) or by
//! the destination snapshot of a relationship.

use serde::{Deserialize, Serialize};

use crate::persona::RefItem;

/// Map coordinates attached to an address.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordenadas {
  pub lat: f64,
  pub lng: f64,
}

/// A postal address as the backend returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Localizacion {
  pub id:             i64,
  #[serde(default)]
  pub calle:          Option<String>,
  #[serde(default)]
  pub tipo_calle:     Option<String>,
  /// Mandatory on the backend even when empty.
  #[serde(default)]
  pub casa_nro:       String,
  #[serde(default)]
  pub piso_depto:     Option<String>,
  #[serde(default)]
  pub lote:           Option<i64>,
  #[serde(default)]
  pub mza:            Option<i64>,
  /// Free-text geographic reference ("frente a la plaza").
  #[serde(default)]
  pub referencia_geo: Option<String>,
  #[serde(default)]
  pub geolocalizacion: Option<Coordenadas>,
  #[serde(default)]
  pub barrio:         Option<RefItem>,
  #[serde(default)]
  pub localidad:      Option<RefItem>,
  #[serde(default)]
  pub cpc:            Option<RefItem>,
  #[serde(default)]
  pub deleted:        bool,
}

impl Localizacion {
  /// One-line rendering used by summaries ("Calle Falsa 123, Centro").
  pub fn summary(&self) -> String {
    let street = [self.calle.as_deref(), Some(self.casa_nro.as_str())]
      .into_iter()
      .flatten()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .collect::<Vec<_>>()
      .join(" ");
    let area = self
      .barrio
      .as_ref()
      .or(self.localidad.as_ref())
      .map(|r| r.nombre.as_str());
    match area {
      Some(area) if !street.is_empty() => format!("{street}, {area}"),
      Some(area) => area.to_string(),
      None => street,
    }
  }
}
