//! Chat State
//!
//! Contacts and threads in entity tables, plus the active-thread marker and
//! the compose recipients list. The unread counter is only ever touched by
//! the thread it belongs to.

use entity_table::EntityTable;

use crate::domain::{Contact, DomainError, DomainResult, Message, Thread};
use crate::store::PROVISIONAL_BASE;

#[derive(Debug, Clone, Default)]
pub struct ChatState {
    pub contacts: EntityTable<Contact>,
    pub threads: EntityTable<Thread>,
    pub active_thread_id: Option<u32>,
    /// Participants of the active thread
    pub participants: Vec<Contact>,
    pub recipients: Vec<Contact>,
    epoch: u64,
    next_provisional: u32,
}

impl ChatState {
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

    /// Replace the contact table. Bumps the epoch.
    pub fn set_contacts(&mut self, contacts: Vec<Contact>) {
        self.contacts = EntityTable::from_entities(contacts);
        self.epoch += 1;
    }

    /// Replace the thread table. Bumps the epoch and drops the active marker
    /// if its thread is gone.
    pub fn set_threads(&mut self, threads: Vec<Thread>) {
        self.threads = EntityTable::from_entities(threads);
        if let Some(active) = self.active_thread_id {
            if !self.threads.contains(active) {
                self.active_thread_id = None;
            }
        }
        self.epoch += 1;
    }

    /// Upsert a single thread and make it the active one
    pub fn open_thread(&mut self, thread: Thread) {
        self.active_thread_id = Some(thread.id);
        self.threads.upsert(thread);
    }

    pub fn reset_active_thread(&mut self) {
        self.active_thread_id = None;
    }

    /// Replace the active thread's participant list
    pub fn set_participants(&mut self, participants: Vec<Contact>) {
        self.participants = participants;
    }

    /// Reset a thread's unread counter; returns the previous count for
    /// rollback
    pub fn mark_thread_seen(&mut self, thread_id: u32) -> DomainResult<u32> {
        let thread = self
            .threads
            .get_mut(thread_id)
            .ok_or_else(|| DomainError::NotFound(format!("thread {}", thread_id)))?;
        Ok(std::mem::replace(&mut thread.unread_count, 0))
    }

    /// Reverse of [`mark_thread_seen`]
    pub fn restore_unread_count(&mut self, thread_id: u32, count: u32) {
        if let Some(thread) = self.threads.get_mut(thread_id) {
            thread.unread_count = count;
        }
    }

    /// Append a message to a thread. The unread counter is bumped only when
    /// the thread is not the active one; returns whether it was bumped, for
    /// rollback.
    pub fn add_message(&mut self, thread_id: u32, message: Message) -> DomainResult<bool> {
        let active = self.active_thread_id == Some(thread_id);
        let thread = self
            .threads
            .get_mut(thread_id)
            .ok_or_else(|| DomainError::NotFound(format!("thread {}", thread_id)))?;
        thread.messages.push(message);
        let incremented = !active;
        if incremented {
            thread.unread_count += 1;
        }
        Ok(incremented)
    }

    /// Reverse of [`add_message`]
    pub fn remove_message(&mut self, thread_id: u32, message_id: u32, decrement: bool) -> DomainResult<()> {
        let thread = self
            .threads
            .get_mut(thread_id)
            .ok_or_else(|| DomainError::NotFound(format!("thread {}", thread_id)))?;
        thread.messages.retain(|message| message.id != message_id);
        if decrement {
            thread.unread_count = thread.unread_count.saturating_sub(1);
        }
        Ok(())
    }

    /// Swap a provisional message id for the server-assigned one
    pub fn confirm_message(&mut self, thread_id: u32, provisional: u32, canonical: Message) -> DomainResult<()> {
        let thread = self
            .threads
            .get_mut(thread_id)
            .ok_or_else(|| DomainError::NotFound(format!("thread {}", thread_id)))?;
        let message = thread
            .messages
            .iter_mut()
            .find(|message| message.id == provisional)
            .ok_or_else(|| DomainError::NotFound(format!("message {}", provisional)))?;
        *message = canonical;
        Ok(())
    }

    /// Add a compose recipient; duplicates by id are ignored. Returns
    /// whether the list changed.
    pub fn add_recipient(&mut self, recipient: Contact) -> bool {
        let exists = self
            .recipients
            .iter()
            .any(|other| other.id == recipient.id);
        if exists {
            return false;
        }
        self.recipients.push(recipient);
        true
    }

    /// Remove a compose recipient by id
    pub fn remove_recipient(&mut self, recipient_id: u32) -> Option<Contact> {
        let index = self
            .recipients
            .iter()
            .position(|other| other.id == recipient_id)?;
        Some(self.recipients.remove(index))
    }
}
