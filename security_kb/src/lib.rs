//! # Security KB
//!
//! The validated knowledge model for the security-concepts assistant. This
//! crate turns a delivered knowledge payload into an immutable
//! [`KnowledgeSnapshot`] and knows nothing about navigation or conversation
//! state.
//!
//! ## Core Components
//!
//! - **snapshot**: Entities grouped by category and directed relationships by kind
//! - **labels**: Display names for categories and relationship directions
//! - **config**: TOML panel configuration
//! - **error**: The error taxonomy shared with the engine crate

pub mod config;
pub mod error;
pub mod labels;
pub mod snapshot;

pub use config::*;
pub use error::*;
pub use labels::*;
pub use snapshot::*;
