//! Remote Layer - Core Traits
//!
//! The contract with the remote collaborator. The store consumes these
//! interfaces and never implements a transport; implementations can use
//! HTTP, IPC, an in-memory fake, etc. Every operation is async and may fail
//! with a validation (`RemoteRejected`) or transport (`Internal`) error.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{
    Board, Card, CheckItem, CheckItemState, Checklist, Column, Comment, Contact, DomainResult,
    Email, Entity, Label, Message, Post, PostComment, Thread,
};

/// Core remote trait for per-entity CRUD and relocation
///
/// Generic over any Entity type. `update` takes a JSON patch: only the keys
/// present in the patch change on the server, and the canonical entity comes
/// back.
#[async_trait]
pub trait Remote<T: Entity>: Send + Sync {
    /// Create under `parent` (None for top-level entities); returns the
    /// canonical entity with its server-assigned id
    async fn create(&self, parent: Option<u32>, entity: &T) -> DomainResult<T>;

    /// Patch an existing entity by id
    async fn update(&self, id: T::Id, patch: Value) -> DomainResult<T>;

    /// Delete by id
    async fn delete(&self, id: T::Id) -> DomainResult<()>;

    /// Move between parents to `index` within the destination order
    async fn relocate(
        &self,
        id: T::Id,
        from_parent: Option<u32>,
        to_parent: Option<u32>,
        index: usize,
    ) -> DomainResult<()>;

    /// List all entities of this type
    async fn list(&self) -> DomainResult<Vec<T>>;
}

/// Kanban-specific operations on top of column/card CRUD
#[async_trait]
pub trait KanbanRemote: Remote<Column> + Remote<Card> {
    /// The whole board in one fetch
    async fn board(&self) -> DomainResult<Board>;

    /// Delete every card in a column, keeping the column
    async fn clear_column(&self, column_id: u32) -> DomainResult<()>;

    async fn add_checklist(&self, card_id: u32, name: &str) -> DomainResult<Checklist>;

    async fn rename_checklist(&self, card_id: u32, checklist_id: u32, name: &str) -> DomainResult<()>;

    async fn delete_checklist(&self, card_id: u32, checklist_id: u32) -> DomainResult<()>;

    async fn add_check_item(&self, card_id: u32, checklist_id: u32, name: &str) -> DomainResult<CheckItem>;

    async fn update_check_item(
        &self,
        card_id: u32,
        checklist_id: u32,
        item_id: u32,
        name: Option<&str>,
        state: Option<CheckItemState>,
    ) -> DomainResult<()>;

    async fn delete_check_item(&self, card_id: u32, checklist_id: u32, item_id: u32) -> DomainResult<()>;

    async fn add_comment(&self, card_id: u32, member_id: u32, message: &str) -> DomainResult<Comment>;
}

/// Chat backend operations
#[async_trait]
pub trait ChatRemote: Send + Sync {
    async fn contacts(&self) -> DomainResult<Vec<Contact>>;

    async fn threads(&self) -> DomainResult<Vec<Thread>>;

    /// A single thread, or None when it does not exist
    async fn thread(&self, thread_id: u32) -> DomainResult<Option<Thread>>;

    async fn participants(&self, thread_id: u32) -> DomainResult<Vec<Contact>>;

    async fn mark_thread_seen(&self, thread_id: u32) -> DomainResult<()>;

    async fn send_message(&self, thread_id: u32, author_id: u32, body: &str) -> DomainResult<Message>;
}

/// Mail backend operations
#[async_trait]
pub trait MailRemote: Send + Sync {
    async fn labels(&self) -> DomainResult<Vec<Label>>;

    /// Emails under a label/folder; None lists everything
    async fn emails(&self, label: Option<&str>) -> DomainResult<Vec<Email>>;

    async fn email(&self, email_id: u32) -> DomainResult<Option<Email>>;
}

/// Social feed backend operations
#[async_trait]
pub trait SocialRemote: Send + Sync {
    async fn posts(&self) -> DomainResult<Vec<Post>>;

    async fn set_post_liked(&self, post_id: u32, liked: bool) -> DomainResult<()>;

    async fn set_comment_liked(&self, post_id: u32, comment_id: u32, liked: bool) -> DomainResult<()>;

    async fn add_comment(&self, post_id: u32, author_id: u32, message: &str) -> DomainResult<PostComment>;
}
