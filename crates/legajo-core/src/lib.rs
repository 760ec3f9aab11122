//! Core types and rules for the legajo case-management client.
//!
//! This crate is deliberately free of HTTP and database dependencies. It
//! holds the data model, the validation rules, the nested-entity reconciler
//! and the [`backend::CaseBackend`] abstraction the outer crates implement
//! and consume.

pub mod backend;
pub mod error;
pub mod localizacion;
pub mod persona;
pub mod reconcile;
pub mod satellites;
pub mod validation;
pub mod vinculo;

pub use error::{Error, Result, TransportError};
