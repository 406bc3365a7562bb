//! Chat Commands

use crate::domain::{Contact, DomainResult, Message};
use crate::remote::ChatRemote;
use crate::store::Store;

/// Fetch and replace the contact table
pub async fn load_contacts<R: ChatRemote>(store: &Store, remote: &R) -> DomainResult<()> {
    let contacts = remote.contacts().await?;
    store.chat().await.set_contacts(contacts);
    Ok(())
}

/// Fetch and replace the thread table
pub async fn load_threads<R: ChatRemote>(store: &Store, remote: &R) -> DomainResult<()> {
    let threads = remote.threads().await?;
    store.chat().await.set_threads(threads);
    Ok(())
}

/// Fetch a single thread and make it the active one; a missing thread
/// clears the active marker instead of failing
pub async fn load_thread<R: ChatRemote>(store: &Store, remote: &R, thread_id: u32) -> DomainResult<()> {
    let thread = remote.thread(thread_id).await?;
    let mut state = store.chat().await;
    match thread {
        Some(thread) => state.open_thread(thread),
        None => state.reset_active_thread(),
    }
    Ok(())
}

/// Fetch the participant list for a thread
pub async fn load_participants<R: ChatRemote>(store: &Store, remote: &R, thread_id: u32) -> DomainResult<()> {
    let participants = remote.participants(thread_id).await?;
    store.chat().await.set_participants(participants);
    Ok(())
}

/// Zero a thread's unread counter, optimistically
pub async fn mark_thread_as_seen<R: ChatRemote>(store: &Store, remote: &R, thread_id: u32) -> DomainResult<()> {
    let (epoch, previous) = {
        let mut state = store.chat().await;
        let previous = state.mark_thread_seen(thread_id)?;
        (state.epoch(), previous)
    };

    match remote.mark_thread_seen(thread_id).await {
        Ok(()) => Ok(()),
        Err(err) => {
            let mut state = store.chat().await;
            if state.epoch() == epoch {
                state.restore_unread_count(thread_id, previous);
            }
            log::warn!("mark_thread_as_seen {} rejected, rolled back: {}", thread_id, err);
            Err(err)
        }
    }
}

/// Clear the active-thread marker. Local only; the remote has no notion of
/// which thread is on screen.
pub async fn reset_active_thread(store: &Store) {
    store.chat().await.reset_active_thread();
}

/// Send a message into a thread. The optimistic message carries a
/// provisional id; confirmation backfills the server id and `created_at`.
pub async fn add_message<R: ChatRemote>(
    store: &Store,
    remote: &R,
    thread_id: u32,
    author_id: u32,
    body: &str,
) -> DomainResult<Message> {
    let (provisional, epoch, incremented) = {
        let mut state = store.chat().await;
        let id = state.provisional_id();
        let incremented = state.add_message(
            thread_id,
            Message {
                id,
                author_id,
                body: body.to_string(),
                created_at: None,
            },
        )?;
        (id, state.epoch(), incremented)
    };

    match remote.send_message(thread_id, author_id, body).await {
        Ok(canonical) => {
            let mut state = store.chat().await;
            if state.epoch() != epoch {
                log::debug!("discarding stale add_message confirmation");
                return Ok(canonical);
            }
            state.confirm_message(thread_id, provisional, canonical.clone())?;
            Ok(canonical)
        }
        Err(err) => {
            let mut state = store.chat().await;
            if state.epoch() == epoch {
                let _ = state.remove_message(thread_id, provisional, incremented);
            }
            log::warn!("add_message rejected, rolled back: {}", err);
            Err(err)
        }
    }
}

/// Add a compose recipient; duplicates by id are ignored. Local only.
pub async fn add_recipient(store: &Store, recipient: Contact) -> bool {
    store.chat().await.add_recipient(recipient)
}

/// Remove a compose recipient by id. Local only.
pub async fn remove_recipient(store: &Store, recipient_id: u32) -> Option<Contact> {
    store.chat().await.remove_recipient(recipient_id)
}
