//! In-Memory Remote
//!
//! A fake collaborator backed by plain vectors behind a mutex, used by
//! tests and demos. It assigns canonical ids, stamps `created_at`, and can
//! be scripted to reject the next operation, which exercises the gateway's
//! rollback path.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::domain::{
    set_liked, Board, Card, CheckItem, CheckItemState, Checklist, Column, Comment, Contact,
    DomainError, DomainResult, Email, Label, Member, Message, Post, PostComment, Thread,
};
use crate::remote::{ChatRemote, KanbanRemote, MailRemote, Remote, SocialRemote};

fn now_millis() -> i64 {
    chrono::Local::now().timestamp_millis()
}

/// Merge a JSON-object patch into an entity: keys present in the patch
/// replace the entity's fields, everything else is untouched.
fn apply_patch<T>(entity: &T, patch: &Value) -> DomainResult<T>
where
    T: Serialize + DeserializeOwned,
{
    let mut value =
        serde_json::to_value(entity).map_err(|e| DomainError::Internal(e.to_string()))?;
    match (value.as_object_mut(), patch.as_object()) {
        (Some(fields), Some(patch)) => {
            for (key, field) in patch {
                fields.insert(key.clone(), field.clone());
            }
        }
        _ => {
            return Err(DomainError::Internal(
                "patch must be a JSON object".to_string(),
            ))
        }
    }
    serde_json::from_value(value).map_err(|e| DomainError::Internal(e.to_string()))
}

#[derive(Debug, Default)]
struct RemoteData {
    next_id: u32,
    fail_next: Option<String>,
    columns: Vec<Column>,
    cards: Vec<Card>,
    members: Vec<Member>,
    contacts: Vec<Contact>,
    threads: Vec<Thread>,
    labels: Vec<Label>,
    emails: Vec<Email>,
    posts: Vec<Post>,
}

impl RemoteData {
    fn check_failure(&mut self, op: &str) -> DomainResult<()> {
        if let Some(reason) = self.fail_next.take() {
            return Err(DomainError::RemoteRejected(format!("{}: {}", op, reason)));
        }
        Ok(())
    }

    fn assign_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn absorb_id(&mut self, id: u32) {
        self.next_id = self.next_id.max(id);
    }

    fn column_mut(&mut self, id: u32) -> DomainResult<&mut Column> {
        self.columns
            .iter_mut()
            .find(|column| column.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("column {}", id)))
    }

    fn card_mut(&mut self, id: u32) -> DomainResult<&mut Card> {
        self.cards
            .iter_mut()
            .find(|card| card.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("card {}", id)))
    }

    fn checklist_mut(&mut self, card_id: u32, checklist_id: u32) -> DomainResult<&mut Checklist> {
        self.card_mut(card_id)?
            .checklist_mut(checklist_id)
            .ok_or_else(|| DomainError::NotFound(format!("checklist {}", checklist_id)))
    }

    fn thread_mut(&mut self, id: u32) -> DomainResult<&mut Thread> {
        self.threads
            .iter_mut()
            .find(|thread| thread.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("thread {}", id)))
    }

    fn post_mut(&mut self, id: u32) -> DomainResult<&mut Post> {
        self.posts
            .iter_mut()
            .find(|post| post.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("post {}", id)))
    }
}

/// The fake remote collaborator
#[derive(Debug, Default)]
pub struct InMemoryRemote {
    data: Mutex<RemoteData>,
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the next operation with `reason`
    pub async fn fail_next(&self, reason: &str) {
        self.data.lock().await.fail_next = Some(reason.to_string());
    }

    pub async fn seed_board(&self, board: Board) {
        let mut data = self.data.lock().await;
        for column in &board.columns {
            data.absorb_id(column.id);
        }
        for card in &board.cards {
            data.absorb_id(card.id);
            for checklist in &card.checklists {
                data.absorb_id(checklist.id);
                for item in &checklist.check_items {
                    data.absorb_id(item.id);
                }
            }
            for comment in &card.comments {
                data.absorb_id(comment.id);
            }
        }
        for member in &board.members {
            data.absorb_id(member.id);
        }
        data.columns = board.columns;
        data.cards = board.cards;
        data.members = board.members;
    }

    pub async fn seed_chat(&self, contacts: Vec<Contact>, threads: Vec<Thread>) {
        let mut data = self.data.lock().await;
        for contact in &contacts {
            data.absorb_id(contact.id);
        }
        for thread in &threads {
            data.absorb_id(thread.id);
            for message in &thread.messages {
                data.absorb_id(message.id);
            }
        }
        data.contacts = contacts;
        data.threads = threads;
    }

    pub async fn seed_mail(&self, labels: Vec<Label>, emails: Vec<Email>) {
        let mut data = self.data.lock().await;
        for label in &labels {
            data.absorb_id(label.id);
        }
        for email in &emails {
            data.absorb_id(email.id);
        }
        data.labels = labels;
        data.emails = emails;
    }

    pub async fn seed_posts(&self, posts: Vec<Post>) {
        let mut data = self.data.lock().await;
        for post in &posts {
            data.absorb_id(post.id);
            for comment in &post.comments {
                data.absorb_id(comment.id);
            }
        }
        data.posts = posts;
    }
}

#[async_trait]
impl Remote<Column> for InMemoryRemote {
    async fn create(&self, _parent: Option<u32>, entity: &Column) -> DomainResult<Column> {
        let mut data = self.data.lock().await;
        data.check_failure("create column")?;
        let mut column = entity.clone();
        column.id = data.assign_id();
        column.card_ids.clear();
        data.columns.push(column.clone());
        Ok(column)
    }

    async fn update(&self, id: u32, patch: Value) -> DomainResult<Column> {
        let mut data = self.data.lock().await;
        data.check_failure("update column")?;
        let column = data.column_mut(id)?;
        let updated = apply_patch(&*column, &patch)?;
        *column = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: u32) -> DomainResult<()> {
        let mut data = self.data.lock().await;
        data.check_failure("delete column")?;
        data.columns.retain(|column| column.id != id);
        data.cards.retain(|card| card.column_id != id);
        Ok(())
    }

    async fn relocate(
        &self,
        id: u32,
        _from_parent: Option<u32>,
        _to_parent: Option<u32>,
        index: usize,
    ) -> DomainResult<()> {
        let mut data = self.data.lock().await;
        data.check_failure("relocate column")?;
        let from = data
            .columns
            .iter()
            .position(|column| column.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("column {}", id)))?;
        let column = data.columns.remove(from);
        let index = index.min(data.columns.len());
        data.columns.insert(index, column);
        Ok(())
    }

    async fn list(&self) -> DomainResult<Vec<Column>> {
        let mut data = self.data.lock().await;
        data.check_failure("list columns")?;
        Ok(data.columns.clone())
    }
}

#[async_trait]
impl Remote<Card> for InMemoryRemote {
    async fn create(&self, parent: Option<u32>, entity: &Card) -> DomainResult<Card> {
        let mut data = self.data.lock().await;
        data.check_failure("create card")?;
        let column_id = parent.unwrap_or(entity.column_id);
        data.column_mut(column_id)?;
        let mut card = entity.clone();
        card.id = data.assign_id();
        card.column_id = column_id;
        data.column_mut(column_id)?.card_ids.push(card.id);
        data.cards.push(card.clone());
        Ok(card)
    }

    async fn update(&self, id: u32, patch: Value) -> DomainResult<Card> {
        let mut data = self.data.lock().await;
        data.check_failure("update card")?;
        let card = data.card_mut(id)?;
        let updated = apply_patch(&*card, &patch)?;
        *card = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: u32) -> DomainResult<()> {
        let mut data = self.data.lock().await;
        data.check_failure("delete card")?;
        data.cards.retain(|card| card.id != id);
        for column in &mut data.columns {
            column.card_ids.retain(|card_id| *card_id != id);
        }
        Ok(())
    }

    async fn relocate(
        &self,
        id: u32,
        from_parent: Option<u32>,
        to_parent: Option<u32>,
        index: usize,
    ) -> DomainResult<()> {
        let mut data = self.data.lock().await;
        data.check_failure("relocate card")?;
        let current = data.card_mut(id)?.column_id;
        let from = from_parent.unwrap_or(current);
        let to = to_parent.unwrap_or(current);
        if from == to {
            let column = data.column_mut(from)?;
            entity_table::reorder(&mut column.card_ids, id, index);
        } else {
            let mut moved = std::mem::take(&mut data.column_mut(from)?.card_ids);
            let dest = data.column_mut(to)?;
            entity_table::transfer(&mut moved, &mut dest.card_ids, id, index);
            data.column_mut(from)?.card_ids = moved;
            data.card_mut(id)?.column_id = to;
        }
        Ok(())
    }

    async fn list(&self) -> DomainResult<Vec<Card>> {
        let mut data = self.data.lock().await;
        data.check_failure("list cards")?;
        Ok(data.cards.clone())
    }
}

#[async_trait]
impl KanbanRemote for InMemoryRemote {
    async fn board(&self) -> DomainResult<Board> {
        let mut data = self.data.lock().await;
        data.check_failure("fetch board")?;
        Ok(Board {
            columns: data.columns.clone(),
            cards: data.cards.clone(),
            members: data.members.clone(),
        })
    }

    async fn clear_column(&self, column_id: u32) -> DomainResult<()> {
        let mut data = self.data.lock().await;
        data.check_failure("clear column")?;
        let card_ids = std::mem::take(&mut data.column_mut(column_id)?.card_ids);
        data.cards.retain(|card| !card_ids.contains(&card.id));
        Ok(())
    }

    async fn add_checklist(&self, card_id: u32, name: &str) -> DomainResult<Checklist> {
        let mut data = self.data.lock().await;
        data.check_failure("add checklist")?;
        let checklist = Checklist::new(data.assign_id(), name.to_string());
        data.card_mut(card_id)?.checklists.push(checklist.clone());
        Ok(checklist)
    }

    async fn rename_checklist(&self, card_id: u32, checklist_id: u32, name: &str) -> DomainResult<()> {
        let mut data = self.data.lock().await;
        data.check_failure("rename checklist")?;
        data.checklist_mut(card_id, checklist_id)?.name = name.to_string();
        Ok(())
    }

    async fn delete_checklist(&self, card_id: u32, checklist_id: u32) -> DomainResult<()> {
        let mut data = self.data.lock().await;
        data.check_failure("delete checklist")?;
        data.card_mut(card_id)?
            .checklists
            .retain(|checklist| checklist.id != checklist_id);
        Ok(())
    }

    async fn add_check_item(&self, card_id: u32, checklist_id: u32, name: &str) -> DomainResult<CheckItem> {
        let mut data = self.data.lock().await;
        data.check_failure("add check item")?;
        let item = CheckItem::new(data.assign_id(), name.to_string());
        let checklist = data.checklist_mut(card_id, checklist_id)?;
        checklist.check_items.push(item.clone());
        checklist.refresh_progress();
        Ok(item)
    }

    async fn update_check_item(
        &self,
        card_id: u32,
        checklist_id: u32,
        item_id: u32,
        name: Option<&str>,
        state: Option<CheckItemState>,
    ) -> DomainResult<()> {
        let mut data = self.data.lock().await;
        data.check_failure("update check item")?;
        let checklist = data.checklist_mut(card_id, checklist_id)?;
        let item = checklist
            .check_items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| DomainError::NotFound(format!("check item {}", item_id)))?;
        if let Some(name) = name {
            item.name = name.to_string();
        }
        if let Some(state) = state {
            item.state = state;
        }
        checklist.refresh_progress();
        Ok(())
    }

    async fn delete_check_item(&self, card_id: u32, checklist_id: u32, item_id: u32) -> DomainResult<()> {
        let mut data = self.data.lock().await;
        data.check_failure("delete check item")?;
        let checklist = data.checklist_mut(card_id, checklist_id)?;
        checklist.check_items.retain(|item| item.id != item_id);
        checklist.refresh_progress();
        Ok(())
    }

    async fn add_comment(&self, card_id: u32, member_id: u32, message: &str) -> DomainResult<Comment> {
        let mut data = self.data.lock().await;
        data.check_failure("add comment")?;
        let comment = Comment {
            id: data.assign_id(),
            card_id,
            member_id,
            message: message.to_string(),
            created_at: Some(now_millis()),
        };
        data.card_mut(card_id)?.comments.push(comment.clone());
        Ok(comment)
    }
}

#[async_trait]
impl ChatRemote for InMemoryRemote {
    async fn contacts(&self) -> DomainResult<Vec<Contact>> {
        let mut data = self.data.lock().await;
        data.check_failure("list contacts")?;
        Ok(data.contacts.clone())
    }

    async fn threads(&self) -> DomainResult<Vec<Thread>> {
        let mut data = self.data.lock().await;
        data.check_failure("list threads")?;
        Ok(data.threads.clone())
    }

    async fn thread(&self, thread_id: u32) -> DomainResult<Option<Thread>> {
        let mut data = self.data.lock().await;
        data.check_failure("fetch thread")?;
        Ok(data
            .threads
            .iter()
            .find(|thread| thread.id == thread_id)
            .cloned())
    }

    async fn participants(&self, thread_id: u32) -> DomainResult<Vec<Contact>> {
        let mut data = self.data.lock().await;
        data.check_failure("list participants")?;
        let participant_ids = data.thread_mut(thread_id)?.participant_ids.clone();
        Ok(data
            .contacts
            .iter()
            .filter(|contact| participant_ids.contains(&contact.id))
            .cloned()
            .collect())
    }

    async fn mark_thread_seen(&self, thread_id: u32) -> DomainResult<()> {
        let mut data = self.data.lock().await;
        data.check_failure("mark thread seen")?;
        data.thread_mut(thread_id)?.unread_count = 0;
        Ok(())
    }

    async fn send_message(&self, thread_id: u32, author_id: u32, body: &str) -> DomainResult<Message> {
        let mut data = self.data.lock().await;
        data.check_failure("send message")?;
        let message = Message {
            id: data.assign_id(),
            author_id,
            body: body.to_string(),
            created_at: Some(now_millis()),
        };
        data.thread_mut(thread_id)?.messages.push(message.clone());
        Ok(message)
    }
}

#[async_trait]
impl MailRemote for InMemoryRemote {
    async fn labels(&self) -> DomainResult<Vec<Label>> {
        let mut data = self.data.lock().await;
        data.check_failure("list labels")?;
        Ok(data.labels.clone())
    }

    async fn emails(&self, label: Option<&str>) -> DomainResult<Vec<Email>> {
        let mut data = self.data.lock().await;
        data.check_failure("list emails")?;
        let emails = data
            .emails
            .iter()
            .filter(|email| label.map_or(true, |label| email.folder == label))
            .cloned()
            .collect();
        Ok(emails)
    }

    async fn email(&self, email_id: u32) -> DomainResult<Option<Email>> {
        let mut data = self.data.lock().await;
        data.check_failure("fetch email")?;
        Ok(data
            .emails
            .iter()
            .find(|email| email.id == email_id)
            .cloned())
    }
}

#[async_trait]
impl SocialRemote for InMemoryRemote {
    async fn posts(&self) -> DomainResult<Vec<Post>> {
        let mut data = self.data.lock().await;
        data.check_failure("list posts")?;
        Ok(data.posts.clone())
    }

    async fn set_post_liked(&self, post_id: u32, liked: bool) -> DomainResult<()> {
        let mut data = self.data.lock().await;
        data.check_failure("like post")?;
        let post = data.post_mut(post_id)?;
        let mut likes = post.likes;
        let mut is_liked = post.is_liked;
        set_liked(&mut likes, &mut is_liked, liked);
        post.likes = likes;
        post.is_liked = is_liked;
        Ok(())
    }

    async fn set_comment_liked(&self, post_id: u32, comment_id: u32, liked: bool) -> DomainResult<()> {
        let mut data = self.data.lock().await;
        data.check_failure("like comment")?;
        let post = data.post_mut(post_id)?;
        let comment = post
            .comment_mut(comment_id)
            .ok_or_else(|| DomainError::NotFound(format!("comment {}", comment_id)))?;
        let mut likes = comment.likes;
        let mut is_liked = comment.is_liked;
        set_liked(&mut likes, &mut is_liked, liked);
        comment.likes = likes;
        comment.is_liked = is_liked;
        Ok(())
    }

    async fn add_comment(&self, post_id: u32, author_id: u32, message: &str) -> DomainResult<PostComment> {
        let mut data = self.data.lock().await;
        data.check_failure("add post comment")?;
        let comment = PostComment {
            id: data.assign_id(),
            author_id,
            message: message.to_string(),
            likes: 0,
            is_liked: false,
            created_at: Some(now_millis()),
        };
        data.post_mut(post_id)?.comments.push(comment.clone());
        Ok(comment)
    }
}
