//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! This layer has NO external dependencies (except serde for serialization
//! and the entity-table container).

mod chat;
mod entity;
mod kanban;
mod mail;
mod social;

pub use chat::{Contact, Message, Thread, ThreadKind};
pub use entity::{index_from_position, DomainError, DomainResult, Entity};
pub use kanban::{
    Attachment, Board, Card, CheckItem, CheckItemState, Checklist, Column, Comment, Member,
};
pub use mail::{Email, Label};
pub use social::{set_liked, Post, PostComment};
