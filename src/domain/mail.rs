//! Mail Entities

use serde::{Deserialize, Serialize};

use super::entity::Entity;

/// An email in the mailbox
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email {
    pub id: u32,
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub message: String,
    /// Folder/label key this email currently lives under
    pub folder: String,
    pub is_unread: bool,
    pub is_starred: bool,
    pub is_important: bool,
    /// Millisecond epoch, assigned by the remote
    pub created_at: Option<i64>,
}

impl Entity for Email {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// A mailbox label. `unread_count` is server-authoritative and arrives with
/// the label list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub id: u32,
    pub name: String,
    pub unread_count: u32,
}

impl Label {
    pub fn new(id: u32, name: String) -> Self {
        Self {
            id,
            name,
            unread_count: 0,
        }
    }
}
