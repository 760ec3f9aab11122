//! Query/cache layer and relationship lifecycle for the legajo client.
//!
//! Reads go through a [`QueryCache`] with per-resource staleness windows,
//! one retry on transient failures and 404-as-empty semantics. Every
//! relationship mutation is validated locally, sent to the backend, and then
//! invalidates the cached views it could have changed. Nothing here reasons
//! about the primary-referent invariant locally; affected lists are always
//! refetched.

pub mod cache;
pub mod config;
pub mod error;
mod queries;
mod retry;
mod vinculos;

use std::sync::Arc;

use legajo_core::backend::CaseBackend;
use legajo_http::{HttpBackend, HttpConfig};

pub use cache::{CacheKey, CachePolicy, QueryCache, ResourceKind};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use queries::PersonaQueries;
pub use vinculos::{Limits, VinculoStore};


/// Everything a view needs: cached person reads and the relationship store,
/// sharing one cache and one backend.
pub struct LegajoClient<B = HttpBackend> {
  pub queries:  PersonaQueries<B>,
  pub vinculos: VinculoStore<B>,
  cache:        Arc<QueryCache>,
}

impl LegajoClient<HttpBackend> {
  /// Build a client talking to the REST backend described by `config`.
  pub fn connect(config: &ClientConfig) -> Result<Self> {
    let backend = HttpBackend::new(HttpConfig {
      base_url: config.base_url.clone(),
      token:    config.token.clone(),
      timeout:  config.timeout(),
    })?;
    Ok(Self::with_backend(backend, config))
  }
}

impl<B: CaseBackend> LegajoClient<B> {
  pub fn with_backend(backend: B, config: &ClientConfig) -> Self {
    let backend = Arc::new(backend);
    let cache = Arc::new(QueryCache::new(config.cache_policy()));
    Self {
      queries: PersonaQueries::new(
        backend.clone(),
        cache.clone(),
        config.retry_delay(),
      ),
      vinculos: VinculoStore::new(
        backend,
        cache.clone(),
        config.limits(),
        config.retry_delay(),
      ),
      cache,
    }
  }

  pub fn cache(&self) -> &QueryCache { &self.cache }
}
