//! Store Layer
//!
//! One explicitly constructed `Store` owns every feature state behind a
//! mutex. A single logical flow drives mutations: a command locks a state,
//! applies its change to completion, and releases the lock before awaiting
//! the remote, so the store is never partially mutated across a suspension
//! point. Readers get cloned snapshots, never mutable handles.

mod chat;
mod kanban;
mod mail;
mod social;

#[cfg(test)]
mod tests;

pub use chat::ChatState;
pub use kanban::{CardMove, KanbanState};
pub use mail::MailState;
pub use social::SocialState;

use tokio::sync::{Mutex, MutexGuard};

use crate::domain::DomainError;

/// Provisional ids for optimistic creates are drawn from the top half of
/// the id range so they cannot collide with server-assigned ids.
pub(crate) const PROVISIONAL_BASE: u32 = 0x8000_0000;

/// Report a broken store invariant: an ordered list referencing an entity
/// the table does not hold. Impossible if the mutation algorithms are
/// correct, so debug builds fail loudly.
pub(crate) fn invalid_reference(msg: String) -> DomainError {
    log::error!("invalid reference: {}", msg);
    debug_assert!(false, "invalid reference: {}", msg);
    DomainError::InvalidReference(msg)
}

/// Application state shared across commands
///
/// Construct one per application and pass it by reference (or `Arc`) to
/// whatever owns the UI tree; lifecycle is tied to application start/stop,
/// not module load.
#[derive(Debug, Default)]
pub struct Store {
    kanban: Mutex<KanbanState>,
    chat: Mutex<ChatState>,
    mail: Mutex<MailState>,
    social: Mutex<SocialState>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn kanban(&self) -> MutexGuard<'_, KanbanState> {
        self.kanban.lock().await
    }

    pub(crate) async fn chat(&self) -> MutexGuard<'_, ChatState> {
        self.chat.lock().await
    }

    pub(crate) async fn mail(&self) -> MutexGuard<'_, MailState> {
        self.mail.lock().await
    }

    pub(crate) async fn social(&self) -> MutexGuard<'_, SocialState> {
        self.social.lock().await
    }

    /// Immutable snapshot of the kanban state. Concurrent readers observe
    /// either the pre- or the fully-post-mutation state, never an
    /// intermediate one.
    pub async fn kanban_snapshot(&self) -> KanbanState {
        self.kanban.lock().await.clone()
    }

    pub async fn chat_snapshot(&self) -> ChatState {
        self.chat.lock().await.clone()
    }

    pub async fn mail_snapshot(&self) -> MailState {
        self.mail.lock().await.clone()
    }

    pub async fn social_snapshot(&self) -> SocialState {
        self.social.lock().await.clone()
    }
}
