//! Relationship lifecycle for one case subject.
//!
//! Every mutation runs local validation first, then exactly one backend call,
//! then invalidation. Invalidation happens on success and on conflict alike,
//! so the next read always reflects server truth. The single primary
//! referent rule belongs to the backend; this store never patches a cached
//! list, it drops it.

use std::{sync::Arc, time::Duration};

use legajo_core::{
  Error, Result, TransportError,
  backend::CaseBackend,
  persona::PersonaCandidate,
  validation::{
    MSG_JUSTIFICACION_VINCULO_LEGAJO, validate_can_add_relationship, validate_justification,
    validate_relationship_create, validate_relationship_fields,
  },
  vinculo::{CaseSubject, NuevaPersona, PersonaVinculo, VinculoCreate, VinculoFields},
};

use crate::{
  cache::{CacheKey, QueryCache, ResourceKind},
  retry::retry_once,
};

/// Minimum lengths and thresholds enforced before any request is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
  pub min_justificacion_desvincular:    usize,
  pub min_justificacion_vinculo_legajo: usize,
  pub search_min_chars:                 usize,
}

impl Default for Limits {
  fn default() -> Self {
    Self {
      min_justificacion_desvincular:    20,
      min_justificacion_vinculo_legajo: 10,
      search_min_chars:                 2,
    }
  }
}

pub struct VinculoStore<B> {
  backend:     Arc<B>,
  cache:       Arc<QueryCache>,
  limits:      Limits,
  retry_delay: Duration,
}

impl<B: CaseBackend> VinculoStore<B> {
  pub fn new(
    backend: Arc<B>,
    cache: Arc<QueryCache>,
    limits: Limits,
    retry_delay: Duration,
  ) -> Self {
    Self { backend, cache, limits, retry_delay }
  }

  pub fn limits(&self) -> &Limits { &self.limits }

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Active relationships of the subject, in backend order. A legajo the
  /// backend does not know yields an empty list.
  pub async fn list_active(&self, subject: CaseSubject) -> Result<Vec<PersonaVinculo>> {
    let key = CacheKey::vinculos(subject.legajo_id);
    if let Some(hit) = self.cache.get::<Vec<PersonaVinculo>>(key) {
      return Ok(hit);
    }
    let generation = self.cache.generation(key);
    let links = match retry_once("vinculos", self.retry_delay, || {
      self.backend.list_vinculos(subject.legajo_id)
    })
    .await
    {
      Ok(links) => links,
      Err(TransportError::NotFound(_)) => Vec::new(),
      Err(e) => return Err(e.into()),
    };
    let active: Vec<_> = links.into_iter().filter(PersonaVinculo::is_active).collect();
    self.cache.put(key, generation, active.clone());
    Ok(active)
  }

  /// Candidates for the "link existing person" picker. Queries shorter than
  /// the configured minimum return nothing without touching the backend.
  pub async fn search_candidates(&self, query: &str) -> Result<Vec<PersonaCandidate>> {
    let query = query.trim();
    if query.chars().count() < self.limits.search_min_chars {
      return Ok(Vec::new());
    }
    let found = retry_once("buscar personas", self.retry_delay, || {
      self.backend.search_personas(query)
    })
    .await?;
    tracing::debug!(query, hits = found.len(), "candidate search");
    Ok(found)
  }

  // ── Mutations ─────────────────────────────────────────────────────────

  /// Link a person that already exists. A justification, when present, is
  /// checked against the cross-legajo minimum.
  pub async fn add_existing(
    &self,
    subject: CaseSubject,
    candidate_id: i64,
    fields: VinculoFields,
  ) -> Result<PersonaVinculo> {
    let fields = self.checked_fields(fields)?;
    let payload = VinculoCreate::Existente { persona_destino: candidate_id, vinculo: fields };
    let errors = validate_relationship_create(&payload);
    if !errors.is_empty() {
      return Err(Error::Validation(errors));
    }
    // Self links are rejected before the active list is fetched.
    validate_can_add_relationship(candidate_id, &[], subject.persona_id)?;
    let active = self.list_active(subject).await?;
    validate_can_add_relationship(candidate_id, &active, subject.persona_id)?;
    self.create(subject, &payload).await
  }

  /// Link a search result. When the candidate already belongs to another
  /// legajo the cross-legajo justification becomes mandatory.
  pub async fn add_candidate(
    &self,
    subject: CaseSubject,
    candidate: &PersonaCandidate,
    fields: VinculoFields,
  ) -> Result<PersonaVinculo> {
    let other_legajo = candidate
      .legajo
      .as_ref()
      .is_some_and(|l| l.id != subject.legajo_id);
    if other_legajo && fields.justificacion_vinculo_legajo.is_none() {
      return Err(Error::Validation(vec![MSG_JUSTIFICACION_VINCULO_LEGAJO.to_string()]));
    }
    self.add_existing(subject, candidate.id, fields).await
  }

  /// Register a new person and link it in one request.
  pub async fn add_new(
    &self,
    subject: CaseSubject,
    persona: NuevaPersona,
    fields: VinculoFields,
  ) -> Result<PersonaVinculo> {
    let fields = self.checked_fields(fields)?;
    let payload = VinculoCreate::Nueva { persona_nueva: persona, vinculo: fields };
    let errors = validate_relationship_create(&payload);
    if !errors.is_empty() {
      return Err(Error::Validation(errors));
    }
    self.create(subject, &payload).await
  }

  /// Replace the mutable fields of an active relationship. Setting
  /// `es_referente_principal` may demote another link server-side; callers
  /// see that on the next `list_active`.
  pub async fn edit(
    &self,
    subject: CaseSubject,
    vinculo_id: i64,
    fields: VinculoFields,
  ) -> Result<PersonaVinculo> {
    let errors = validate_relationship_fields(&fields);
    if !errors.is_empty() {
      return Err(Error::Validation(errors));
    }
    self.ensure_active(subject, vinculo_id).await?;

    let result = self
      .backend
      .update_vinculo(subject.legajo_id, vinculo_id, &fields)
      .await;
    self.settle(subject, "edit", result)
  }

  /// Unlink a relationship. Terminal: an unlinked record can never be made
  /// active again. The trimmed justification is what gets stored.
  pub async fn unlink(
    &self,
    subject: CaseSubject,
    vinculo_id: i64,
    justificacion: &str,
  ) -> Result<PersonaVinculo> {
    let justificacion =
      validate_justification(justificacion, self.limits.min_justificacion_desvincular)?;
    self.ensure_active(subject, vinculo_id).await?;

    let result = self
      .backend
      .desvincular(subject.legajo_id, vinculo_id, justificacion)
      .await;
    self.settle(subject, "unlink", result)
  }

  // ── Helpers ───────────────────────────────────────────────────────────

  fn checked_fields(&self, mut fields: VinculoFields) -> Result<VinculoFields> {
    if let Some(text) = fields.justificacion_vinculo_legajo.take() {
      let trimmed =
        validate_justification(&text, self.limits.min_justificacion_vinculo_legajo)?;
      fields.justificacion_vinculo_legajo = Some(trimmed.to_string());
    }
    Ok(fields)
  }

  async fn ensure_active(&self, subject: CaseSubject, vinculo_id: i64) -> Result<()> {
    let active = self.list_active(subject).await?;
    if active.iter().any(|v| v.id == vinculo_id) {
      Ok(())
    } else {
      Err(Error::NotActive(vinculo_id))
    }
  }

  async fn create(
    &self,
    subject: CaseSubject,
    payload: &VinculoCreate,
  ) -> Result<PersonaVinculo> {
    let result = self.backend.create_vinculo(subject.legajo_id, payload).await;
    self.settle(subject, "create", result)
  }

  /// Invalidate what the mutation could have changed, then report it.
  fn settle(
    &self,
    subject: CaseSubject,
    op: &str,
    result: Result<PersonaVinculo, TransportError>,
  ) -> Result<PersonaVinculo> {
    match result {
      Ok(vinculo) => {
        self.invalidate(subject);
        tracing::info!(
          legajo_id = subject.legajo_id,
          vinculo_id = vinculo.id,
          op,
          "vinculo saved"
        );
        Ok(vinculo)
      }
      Err(e) => {
        if matches!(e, TransportError::Conflict(_)) {
          self.invalidate(subject);
        }
        tracing::warn!(legajo_id = subject.legajo_id, op, error = %e, "vinculo mutation failed");
        Err(e.into())
      }
    }
  }

  fn invalidate(&self, subject: CaseSubject) {
    self.cache.invalidate_vinculos(subject.legajo_id);
    self
      .cache
      .invalidate(CacheKey::new(ResourceKind::PersonaCompleta, subject.persona_id));
  }
}
