//! Library crate for backdesk.
//!
//! This crate exposes the building blocks of the TUI:
//! - Application state and update loop (`app`)
//! - Typed API error taxonomy (`error`)
//! - The generic list/search/pagination/selection state machine (`listman`)
//! - Resource trait and concrete record types (`resource`, `model`)
//! - Blocking REST client for the backend (`api`)
//! - Session loading and permission gating (`session`)
//! - Field validation, bulk import and export helpers (`validate`, `import`, `export`)
//! - UI rendering and widgets (`ui`)
//!
//! It is used by the `backdesk` binary and by tests.
#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod api;
pub mod app;
pub mod error;
pub mod export;
pub mod import;
pub mod listman;
pub mod model;
pub mod resource;
pub mod session;
pub mod ui;
pub mod validate;

// Re-export commonly used items at the crate root for convenience
pub use error::{ApiError, ApiResult};
pub use listman::ListManager;
pub use resource::{Resource, ResourceKind};
