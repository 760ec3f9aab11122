//! Client configuration, loaded from an optional TOML file and `LEGAJO_*`
//! environment variables.

use std::{path::Path, time::Duration};

use serde::Deserialize;

use crate::{Result, cache::CachePolicy, vinculos::Limits};

/// Runtime client configuration. Every key has a default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
  pub base_url:                         String,
  pub token:                            Option<String>,
  pub timeout_secs:                     u64,
  pub min_justificacion_desvincular:    usize,
  pub min_justificacion_vinculo_legajo: usize,
  pub search_min_chars:                 usize,
  /// Staleness window for address, composite and relationship reads.
  pub stale_short_secs:                 u64,
  /// Staleness window for education, medical coverage and vulnerability.
  pub stale_long_secs:                  u64,
  pub retry_delay_ms:                   u64,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      base_url:                         "http://localhost:8000/api".into(),
      token:                            None,
      timeout_secs:                     30,
      min_justificacion_desvincular:    20,
      min_justificacion_vinculo_legajo: 10,
      search_min_chars:                 2,
      stale_short_secs:                 30,
      stale_long_secs:                  300,
      retry_delay_ms:                   500,
    }
  }
}

impl ClientConfig {
  /// Layer `path` (if it exists) and `LEGAJO_*` variables over the defaults.
  pub fn load(path: Option<&Path>) -> Result<Self> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
      builder = builder.add_source(config::File::from(path).required(false));
    }
    let settings = builder
      .add_source(config::Environment::with_prefix("LEGAJO").try_parsing(true))
      .build()?;
    let cfg = settings.try_deserialize()?;
    tracing::debug!(?cfg, "loaded client configuration");
    Ok(cfg)
  }

  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }

  pub fn retry_delay(&self) -> Duration {
    Duration::from_millis(self.retry_delay_ms)
  }

  pub fn cache_policy(&self) -> CachePolicy {
    CachePolicy {
      short: Duration::from_secs(self.stale_short_secs),
      long:  Duration::from_secs(self.stale_long_secs),
    }
  }

  pub fn limits(&self) -> Limits {
    Limits {
      min_justificacion_desvincular:    self.min_justificacion_desvincular,
      min_justificacion_vinculo_legajo: self.min_justificacion_vinculo_legajo,
      search_min_chars:                 self.search_min_chars,
    }
  }
}
