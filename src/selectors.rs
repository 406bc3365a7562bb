//! Selectors
//!
//! Read-side projections from state snapshots into view-ready shapes.
//! Pure derivation: no invariants of their own, and no mutation. A missing
//! id on a read path renders as an absent entry, never a panic; an ordering
//! list that references a missing entity is a store defect and is logged
//! loudly.

use crate::domain::{Card, Column, Message, Post, Thread};
use crate::store::{ChatState, KanbanState, MailState, SocialState};

/// A column with its cards resolved in `card_ids` order
#[derive(Debug, Clone)]
pub struct ColumnView {
    pub column: Column,
    pub cards: Vec<Card>,
}

/// The board as the UI renders it: columns in board order, each with its
/// cards in column order
pub fn board_view(state: &KanbanState) -> Vec<ColumnView> {
    state
        .columns
        .iter_ordered()
        .map(|column| {
            let cards = column
                .card_ids
                .iter()
                .filter_map(|card_id| match state.cards.get(*card_id) {
                    Some(card) => Some(card.clone()),
                    None => {
                        log::error!(
                            "column {} references missing card {}",
                            column.id,
                            card_id
                        );
                        None
                    }
                })
                .collect();
            ColumnView {
                column: column.clone(),
                cards,
            }
        })
        .collect()
}

/// One row of the thread list
#[derive(Debug, Clone)]
pub struct ThreadSummary {
    pub id: u32,
    pub participant_names: Vec<String>,
    pub last_message: Option<Message>,
    pub unread_count: u32,
}

/// Threads in display order with contact names resolved
pub fn thread_summaries(state: &ChatState) -> Vec<ThreadSummary> {
    state
        .threads
        .iter_ordered()
        .map(|thread| ThreadSummary {
            id: thread.id,
            participant_names: thread
                .participant_ids
                .iter()
                .filter_map(|id| state.contacts.get(*id).map(|contact| contact.name.clone()))
                .collect(),
            last_message: thread.last_message().cloned(),
            unread_count: thread.unread_count,
        })
        .collect()
}

/// The thread currently on screen, if any
pub fn active_thread(state: &ChatState) -> Option<&Thread> {
    state.threads.get(state.active_thread_id?)
}

/// Total unread messages across all threads (badge counter)
pub fn unread_total(state: &ChatState) -> u32 {
    state
        .threads
        .iter_ordered()
        .map(|thread| thread.unread_count)
        .sum()
}

/// Unread emails in the currently loaded mailbox view
pub fn unread_email_count(state: &MailState) -> usize {
    state
        .emails
        .iter_ordered()
        .filter(|email| email.is_unread)
        .count()
}

/// The feed in display order
pub fn feed_view(state: &SocialState) -> Vec<Post> {
    state.posts.iter_ordered().cloned().collect()
}
