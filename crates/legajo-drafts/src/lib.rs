//! Local draft store for in-progress case registration forms.
//!
//! Each form id holds at most one snapshot: the last unsaved state of the
//! form. Drafts exist only for local recovery and are never synced to the
//! backend. Access goes through [`tokio_rusqlite`] so SQLite work stays off
//! the async runtime.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{Draft, DraftStore, DraftSummary};
