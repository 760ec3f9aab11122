//! REST transport for the legajo client.
//!
//! [`HttpBackend`] implements [`legajo_core::backend::CaseBackend`] over the
//! case-management JSON API with `reqwest`. It neither caches nor retries;
//! the query layer does both.

mod client;
pub mod error;

pub use client::{HttpBackend, HttpConfig};
pub use error::{Error, Result};

#[cfg(test)]
mod tests;
