//! Social Feed State
//!
//! Like toggles go through [`set_liked`], which keeps the counter and the
//! flag atomic; a toggle that would not change the flag reports `false` so
//! the gateway can skip the remote round-trip entirely.

use entity_table::EntityTable;

use crate::domain::{set_liked, DomainError, DomainResult, Post, PostComment};
use crate::store::PROVISIONAL_BASE;

#[derive(Debug, Clone, Default)]
pub struct SocialState {
    pub posts: EntityTable<Post>,
    epoch: u64,
    next_provisional: u32,
}

impl SocialState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn provisional_id(&mut self) -> u32 {
        let id = PROVISIONAL_BASE + self.next_provisional;
        self.next_provisional += 1;
        id
    }

    /// Replace the feed. Bumps the epoch.
    pub fn set_posts(&mut self, posts: Vec<Post>) {
        self.posts = EntityTable::from_entities(posts);
        self.epoch += 1;
    }

    /// Toggle a post's like state; returns whether anything changed
    pub fn set_post_liked(&mut self, post_id: u32, liked: bool) -> DomainResult<bool> {
        let post = self
            .posts
            .get_mut(post_id)
            .ok_or_else(|| DomainError::NotFound(format!("post {}", post_id)))?;
        let mut likes = post.likes;
        let mut is_liked = post.is_liked;
        let changed = set_liked(&mut likes, &mut is_liked, liked);
        post.likes = likes;
        post.is_liked = is_liked;
        Ok(changed)
    }

    /// Toggle a comment's like state; returns whether anything changed
    pub fn set_comment_liked(&mut self, post_id: u32, comment_id: u32, liked: bool) -> DomainResult<bool> {
        let post = self
            .posts
            .get_mut(post_id)
            .ok_or_else(|| DomainError::NotFound(format!("post {}", post_id)))?;
        let comment = post
            .comment_mut(comment_id)
            .ok_or_else(|| DomainError::NotFound(format!("comment {}", comment_id)))?;
        let mut likes = comment.likes;
        let mut is_liked = comment.is_liked;
        let changed = set_liked(&mut likes, &mut is_liked, liked);
        comment.likes = likes;
        comment.is_liked = is_liked;
        Ok(changed)
    }

    pub fn add_comment(&mut self, post_id: u32, comment: PostComment) -> DomainResult<()> {
        let post = self
            .posts
            .get_mut(post_id)
            .ok_or_else(|| DomainError::NotFound(format!("post {}", post_id)))?;
        post.comments.push(comment);
        Ok(())
    }

    /// Reverse of [`add_comment`]
    pub fn remove_comment(&mut self, post_id: u32, comment_id: u32) -> DomainResult<()> {
        let post = self
            .posts
            .get_mut(post_id)
            .ok_or_else(|| DomainError::NotFound(format!("post {}", post_id)))?;
        post.comments.retain(|comment| comment.id != comment_id);
        Ok(())
    }

    /// Swap a provisional comment id for the server-assigned one
    pub fn confirm_comment(&mut self, post_id: u32, provisional: u32, canonical: PostComment) -> DomainResult<()> {
        let post = self
            .posts
            .get_mut(post_id)
            .ok_or_else(|| DomainError::NotFound(format!("post {}", post_id)))?;
        let comment = post
            .comment_mut(provisional)
            .ok_or_else(|| DomainError::NotFound(format!("comment {}", provisional)))?;
        *comment = canonical;
        Ok(())
    }
}
