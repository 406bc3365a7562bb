//! Dashstore
//!
//! Client-side state container for an admin dashboard: normalized entity
//! tables with explicit ordering lists, atomic cross-container relocation,
//! derived aggregates, and an optimistic mutation gateway against an
//! asynchronous remote collaborator.
//!
//! Layered architecture:
//! - domain: Core entities and business rules
//! - store: Feature states behind an explicitly constructed `Store`
//! - remote: Contract with the remote collaborator (plus an in-memory fake)
//! - commands: Mutation gateway (optimistic apply, confirm or rollback)
//! - selectors: Read-side projections into view-ready shapes

pub mod commands;
pub mod domain;
pub mod remote;
pub mod selectors;
pub mod store;

pub use domain::{DomainError, DomainResult};
pub use store::Store;
