//! Social Feed Entities
//!
//! Posts and their comments carry a like counter paired with an `is_liked`
//! flag. The flag is authoritative: a like when the flag is already set is a
//! no-op, so the counter can never drift or go negative.

use serde::{Deserialize, Serialize};

use super::entity::Entity;

/// A comment under a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostComment {
    pub id: u32,
    pub author_id: u32,
    pub message: String,
    pub likes: u32,
    pub is_liked: bool,
    /// Millisecond epoch, assigned by the remote
    pub created_at: Option<i64>,
}

/// A feed post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: u32,
    pub author_id: u32,
    pub message: String,
    pub likes: u32,
    pub is_liked: bool,
    pub comments: Vec<PostComment>,
    /// Millisecond epoch, assigned by the remote
    pub created_at: Option<i64>,
}

impl Post {
    pub fn new(id: u32, author_id: u32, message: String) -> Self {
        Self {
            id,
            author_id,
            message,
            likes: 0,
            is_liked: false,
            comments: Vec::new(),
            created_at: None,
        }
    }

    pub fn comment_mut(&mut self, comment_id: u32) -> Option<&mut PostComment> {
        self.comments
            .iter_mut()
            .find(|comment| comment.id == comment_id)
    }
}

impl Entity for Post {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Adjust a like counter and its flag together. Returns true when the pair
/// changed; liking an already-liked target (or unliking an unliked one) is a
/// no-op because the flag, not the call count, is authoritative.
pub fn set_liked(likes: &mut u32, is_liked: &mut bool, liked: bool) -> bool {
    if *is_liked == liked {
        return false;
    }
    if liked {
        *likes += 1;
    } else {
        *likes = likes.saturating_sub(1);
    }
    *is_liked = liked;
    true
}
