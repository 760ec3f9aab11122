//! Error type for building a `legajo-query` client.
//!
//! Operations themselves return [`legajo_core::Error`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("configuration error: {0}")]
  Config(#[from] config::ConfigError),

  #[error("transport setup error: {0}")]
  Http(#[from] legajo_http::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
