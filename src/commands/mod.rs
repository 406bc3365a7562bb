//! Commands Layer
//!
//! The mutation gateway between the store and the remote collaborator.
//! Every command follows the same per-request lifecycle:
//!
//! - Pending: the local state is updated synchronously (optimistic by
//!   default) and the request is dispatched; the returned future is the
//!   pending handle a caller can use for optimistic-UI feedback.
//! - Confirmed: the remote succeeded; canonical fields are merged in
//!   (server-assigned ids replace provisional ones, `created_at` is
//!   backfilled) or nothing further happens.
//! - Rejected: the remote declined; the optimistic change is reversed and
//!   the error is returned, never silently swallowed.
//!
//! Requests are independent and fire-and-forget against the remote: nothing
//! queues behind a pending request, and when two mutations race on the same
//! entity the last-issued local state wins. A settling request compares the
//! epoch it captured against the state's current one; a bulk load in
//! between makes the result stale and it is discarded without touching
//! state.

mod chat_cmd;
mod kanban_cmd;
mod mail_cmd;
mod social_cmd;

#[cfg(test)]
mod tests;

pub use chat_cmd::*;
pub use kanban_cmd::*;
pub use mail_cmd::*;
pub use social_cmd::*;
