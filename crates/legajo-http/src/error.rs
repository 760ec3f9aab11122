//! Error type for `legajo-http`.
//!
//! Only construction can fail here; request failures are reported as
//! [`legajo_core::TransportError`] through the backend trait.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to build HTTP client: {0}")]
  Client(#[from] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
