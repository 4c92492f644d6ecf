//! # Knowledge Panel
//!
//! The engine behind the assistant's knowledge explorer. This crate reads a
//! [`security_kb::KnowledgeSnapshot`], answers relationship questions about
//! it, tracks which entities the conversation is touching, and drives the
//! drill-down navigation of the explorer.
//!
//! ## Core Components
//!
//! - **relationship_index**: Forward, reverse and existence queries
//! - **activation**: Conversation signals and fuzzy entity matching
//! - **navigation**: Categories → entities → relationships state machine
//! - **panel**: Derived views for the presentation layer
//! - **loader**: Ordered publication of fetched payloads
//!
//! ## Design Philosophy
//!
//! - **Read-Only**: The snapshot is immutable once loaded; every query borrows it
//! - **Total Queries**: Relationship and activation lookups never fail
//! - **Explicit State**: Navigation is a value, not ambient UI state

pub mod activation;
pub mod loader;
pub mod navigation;
pub mod panel;
pub mod relationship_index;
pub mod views;

pub use activation::*;
pub use loader::*;
pub use navigation::*;
pub use panel::*;
pub use relationship_index::*;
pub use views::*;
