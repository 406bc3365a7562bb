//! Chat Entities
//!
//! Contacts and threads are table-backed; messages are owned inline by
//! their thread. A thread's `unread_count` is an explicit counter, reset by
//! mark-as-seen and bumped by message arrival, never recomputed from the
//! message list.

use serde::{Deserialize, Serialize};

use super::entity::Entity;

/// A chat contact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: u32,
    pub name: String,
    pub avatar: Option<String>,
    pub is_active: bool,
    /// Millisecond epoch of the last activity
    pub last_activity: Option<i64>,
}

impl Contact {
    pub fn new(id: u32, name: String) -> Self {
        Self {
            id,
            name,
            avatar: None,
            is_active: false,
            last_activity: None,
        }
    }
}

impl Entity for Contact {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Thread shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreadKind {
    #[default]
    OneToOne,
    Group,
}

impl ThreadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreadKind::OneToOne => "ONE_TO_ONE",
            ThreadKind::Group => "GROUP",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "GROUP" => ThreadKind::Group,
            _ => ThreadKind::OneToOne,
        }
    }
}

/// A message inside a thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: u32,
    pub author_id: u32,
    pub body: String,
    /// Millisecond epoch, assigned by the remote
    pub created_at: Option<i64>,
}

/// A conversation thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: u32,
    pub kind: ThreadKind,
    pub participant_ids: Vec<u32>,
    pub messages: Vec<Message>,
    /// Explicit counter; see module docs
    pub unread_count: u32,
}

impl Thread {
    pub fn new(id: u32, kind: ThreadKind) -> Self {
        Self {
            id,
            kind,
            participant_ids: Vec::new(),
            messages: Vec::new(),
            unread_count: 0,
        }
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

impl Entity for Thread {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_kind_round_trip() {
        assert_eq!(ThreadKind::Group.as_str(), "GROUP");
        assert_eq!(ThreadKind::from_str("ONE_TO_ONE"), ThreadKind::OneToOne);
        assert_eq!(ThreadKind::from_str("anything"), ThreadKind::OneToOne);
    }

    #[test]
    fn test_last_message() {
        let mut thread = Thread::new(1, ThreadKind::OneToOne);
        assert!(thread.last_message().is_none());
        thread.messages.push(Message {
            id: 1,
            author_id: 2,
            body: "hi".to_string(),
            created_at: None,
        });
        assert_eq!(thread.last_message().unwrap().id, 1);
    }
}
