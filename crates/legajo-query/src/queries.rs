//! Cached person reads: address, education, medical coverage,
//! vulnerability, and the composite "complete person".

use std::{future::Future, sync::Arc, time::Duration};

use legajo_core::{
  Result, TransportError,
  backend::{BackendResult, CaseBackend},
  localizacion::Localizacion,
  satellites::{CoberturaMedica, CondicionVulnerabilidad, Educacion, PersonaCompleta},
};

use crate::{
  cache::{CacheKey, QueryCache, ResourceKind},
  retry::retry_once,
};

pub struct PersonaQueries<B> {
  backend:     Arc<B>,
  cache:       Arc<QueryCache>,
  retry_delay: Duration,
}

impl<B: CaseBackend> PersonaQueries<B> {
  pub fn new(backend: Arc<B>, cache: Arc<QueryCache>, retry_delay: Duration) -> Self {
    Self { backend, cache, retry_delay }
  }

  /// Read-through helper: fresh cache hit, else fetch with one retry. A 404
  /// is cached as `None`.
  async fn cached<T, F, Fut>(
    &self,
    key: CacheKey,
    fetch: F,
  ) -> Result<Option<T>, TransportError>
  where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> Fut,
    Fut: Future<Output = BackendResult<T>>,
  {
    if let Some(hit) = self.cache.get::<Option<T>>(key) {
      return Ok(hit);
    }
    let generation = self.cache.generation(key);
    let value = match retry_once(&format!("{:?}", key.kind), self.retry_delay, fetch).await {
      Ok(value) => Some(value),
      Err(TransportError::NotFound(_)) => None,
      Err(e) => return Err(e),
    };
    self.cache.put(key, generation, value.clone());
    Ok(value)
  }

  /// `None` when the person has no current address.
  pub async fn localizacion(&self, persona_id: i64) -> Result<Option<Localizacion>> {
    let key = CacheKey::new(ResourceKind::Localizacion, persona_id);
    let loc = self
      .cached(key, || self.backend.get_localizacion(persona_id))
      .await?;
    Ok(loc.filter(|l| !l.deleted))
  }

  pub async fn educacion(&self, persona_id: i64) -> Result<Option<Educacion>> {
    let key = CacheKey::new(ResourceKind::Educacion, persona_id);
    let edu = self
      .cached(key, || self.backend.get_educacion(persona_id))
      .await?;
    Ok(edu.filter(|e| !e.deleted))
  }

  pub async fn cobertura_medica(
    &self,
    persona_id: i64,
  ) -> Result<Option<CoberturaMedica>> {
    let key = CacheKey::new(ResourceKind::CoberturaMedica, persona_id);
    let cob = self
      .cached(key, || self.backend.get_cobertura_medica(persona_id))
      .await?;
    Ok(cob.filter(|c| !c.deleted))
  }

  pub async fn vulnerabilidad(
    &self,
    persona_id: i64,
  ) -> Result<Vec<CondicionVulnerabilidad>> {
    let key = CacheKey::new(ResourceKind::Vulnerabilidad, persona_id);
    let conditions = self
      .cached(key, || self.backend.get_vulnerabilidad(persona_id))
      .await?;
    Ok(conditions.unwrap_or_default())
  }

  /// Everything known about a person. The four satellite reads run
  /// concurrently and each degrades to empty on its own. Only when all of
  /// them fail, and `fallback_demanda` is given, is the data pulled out of
  /// the demanda's full-detail document instead.
  ///
  /// Only complete results are cached; a degraded composite is refetched on
  /// the next read.
  pub async fn completa(
    &self,
    persona_id: i64,
    fallback_demanda: Option<i64>,
  ) -> Result<PersonaCompleta> {
    let key = CacheKey::new(ResourceKind::PersonaCompleta, persona_id);
    if let Some(hit) = self.cache.get::<PersonaCompleta>(key) {
      return Ok(hit);
    }
    let generation = self.cache.generation(key);

    let (loc, edu, cob, vul) = tokio::join!(
      self.localizacion(persona_id),
      self.educacion(persona_id),
      self.cobertura_medica(persona_id),
      self.vulnerabilidad(persona_id),
    );

    if loc.is_err() && edu.is_err() && cob.is_err() && vul.is_err() {
      if let Some(demanda_id) = fallback_demanda {
        tracing::warn!(persona_id, demanda_id, "all person reads failed, using demanda detail");
        match retry_once("demanda full detail", self.retry_delay, || {
          self.backend.get_demanda_full_detail(demanda_id)
        })
        .await
        {
          Ok(detail) => {
            let completa = detail.extract(persona_id).unwrap_or(PersonaCompleta {
              persona_id,
              ..Default::default()
            });
            self.cache.put(key, generation, completa.clone());
            return Ok(completa);
          }
          Err(e) => {
            tracing::warn!(persona_id, demanda_id, error = %e, "fallback read failed");
          }
        }
      }
      tracing::warn!(persona_id, "no person data available");
      return Ok(PersonaCompleta { persona_id, ..Default::default() });
    }

    let complete = loc.is_ok() && edu.is_ok() && cob.is_ok() && vul.is_ok();
    let completa = PersonaCompleta {
      persona_id,
      localizacion: degrade(persona_id, "localizacion", loc),
      educacion: degrade(persona_id, "educacion", edu),
      cobertura_medica: degrade(persona_id, "cobertura_medica", cob),
      vulnerabilidades: degrade(persona_id, "vulnerabilidad", vul),
    };
    if complete {
      self.cache.put(key, generation, completa.clone());
    }
    Ok(completa)
  }
}

fn degrade<T: Default>(persona_id: i64, what: &str, result: Result<T>) -> T {
  result.unwrap_or_else(|e| {
    tracing::warn!(persona_id, what, error = %e, "read failed, showing empty");
    T::default()
  })
}
