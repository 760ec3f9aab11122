//! The `CaseBackend` trait: everything the client needs from the remote
//! case-management API.
//!
//! Implemented by transports (e.g. `legajo-http`). Higher layers
//! (`legajo-query`) depend on this abstraction, not on any concrete
//! transport. Implementations do no caching and no retrying; those belong to
//! the query layer.

use std::future::Future;

use crate::{
  TransportError,
  localizacion::Localizacion,
  persona::PersonaCandidate,
  satellites::{
    CoberturaMedica, CondicionVulnerabilidad, DemandaFullDetail, Educacion,
  },
  vinculo::{PersonaVinculo, VinculoCreate, VinculoFields},
};

/// Result alias for backend calls.
pub type BackendResult<T> = Result<T, TransportError>;

/// Abstraction over the remote case-management API.
///
/// Reads of optional satellites return [`TransportError::NotFound`] when the
/// person has no such record; callers decide what that means.
pub trait CaseBackend: Send + Sync {
  // ── Relationships ─────────────────────────────────────────────────────

  /// Active relationships of the legajo's NNyA, in backend order.
  fn list_vinculos(
    &self,
    legajo_id: i64,
  ) -> impl Future<Output = BackendResult<Vec<PersonaVinculo>>> + Send + '_;

  /// Persist a new relationship through either creation path.
  fn create_vinculo<'a>(
    &'a self,
    legajo_id: i64,
    payload: &'a VinculoCreate,
  ) -> impl Future<Output = BackendResult<PersonaVinculo>> + Send + 'a;

  /// Replace the mutable fields of a relationship. Setting
  /// `es_referente_principal` demotes the previous holder server-side.
  fn update_vinculo<'a>(
    &'a self,
    legajo_id: i64,
    vinculo_id: i64,
    fields: &'a VinculoFields,
  ) -> impl Future<Output = BackendResult<PersonaVinculo>> + Send + 'a;

  /// Unlink a relationship. The backend records the actor and timestamp.
  fn desvincular<'a>(
    &'a self,
    legajo_id: i64,
    vinculo_id: i64,
    justificacion: &'a str,
  ) -> impl Future<Output = BackendResult<PersonaVinculo>> + Send + 'a;

  /// Free-text search over persons, for "link existing" pickers.
  fn search_personas<'a>(
    &'a self,
    query: &'a str,
  ) -> impl Future<Output = BackendResult<Vec<PersonaCandidate>>> + Send + 'a;

  // ── Person satellites ─────────────────────────────────────────────────

  fn get_localizacion(
    &self,
    persona_id: i64,
  ) -> impl Future<Output = BackendResult<Localizacion>> + Send + '_;

  fn get_educacion(
    &self,
    persona_id: i64,
  ) -> impl Future<Output = BackendResult<Educacion>> + Send + '_;

  fn get_cobertura_medica(
    &self,
    persona_id: i64,
  ) -> impl Future<Output = BackendResult<CoberturaMedica>> + Send + '_;

  fn get_vulnerabilidad(
    &self,
    persona_id: i64,
  ) -> impl Future<Output = BackendResult<Vec<CondicionVulnerabilidad>>> + Send + '_;

  /// The broad demanda document; used as a composite-read fallback.
  fn get_demanda_full_detail(
    &self,
    demanda_id: i64,
  ) -> impl Future<Output = BackendResult<DemandaFullDetail>> + Send + '_;
}
