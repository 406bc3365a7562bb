//! Kanban Commands
//!
//! Board mutations: optimistic apply against the kanban state, async
//! dispatch to the remote, confirm-merge or rollback. Creates run under a
//! provisional id that the confirmation swaps for the server-assigned one.

use serde::Serialize;

use crate::domain::{
    index_from_position, Card, CheckItem, CheckItemState, Checklist, Column, Comment, DomainError,
    DomainResult,
};
use crate::remote::{KanbanRemote, Remote};
use crate::store::Store;

/// Optional-field patch for a card; only set fields reach the remote
#[derive(Debug, Clone, Default, Serialize)]
pub struct CardPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_subscribed: Option<bool>,
}

impl CardPatch {
    fn apply(&self, card: &mut Card) {
        if let Some(name) = &self.name {
            card.name = name.clone();
        }
        if let Some(description) = &self.description {
            card.description = Some(description.clone());
        }
        if let Some(cover) = &self.cover {
            card.cover = Some(cover.clone());
        }
        if let Some(due) = self.due {
            card.due = Some(due);
        }
        if let Some(is_subscribed) = self.is_subscribed {
            card.is_subscribed = is_subscribed;
        }
    }
}

/// Fetch the whole board and replace the kanban state with it
pub async fn load_board<R: KanbanRemote>(store: &Store, remote: &R) -> DomainResult<()> {
    let board = remote.board().await?;
    store
        .kanban()
        .await
        .load(board.columns, board.cards, board.members);
    Ok(())
}

/// Create a column at the end of the board
pub async fn create_column<R: Remote<Column>>(store: &Store, remote: &R, name: &str) -> DomainResult<Column> {
    let (provisional, epoch, draft) = {
        let mut state = store.kanban().await;
        let id = state.provisional_id();
        let draft = Column::new(id, name.to_string());
        state.insert_column(draft.clone());
        (id, state.epoch(), draft)
    };

    match remote.create(None, &draft).await {
        Ok(canonical) => {
            let mut state = store.kanban().await;
            if state.epoch() != epoch {
                log::debug!("discarding stale create_column confirmation");
                return Ok(canonical);
            }
            state.confirm_column(provisional, canonical.clone())?;
            Ok(canonical)
        }
        Err(err) => {
            let mut state = store.kanban().await;
            if state.epoch() == epoch {
                let _ = state.delete_column(provisional);
            }
            log::warn!("create_column rejected, rolled back: {}", err);
            Err(err)
        }
    }
}

/// Rename a column
pub async fn update_column<R: Remote<Column>>(
    store: &Store,
    remote: &R,
    column_id: u32,
    name: &str,
) -> DomainResult<Column> {
    let (epoch, previous) = {
        let mut state = store.kanban().await;
        let previous = state.rename_column(column_id, name)?;
        (state.epoch(), previous)
    };

    match remote
        .update(column_id, serde_json::json!({ "name": name }))
        .await
    {
        Ok(canonical) => Ok(canonical),
        Err(err) => {
            let mut state = store.kanban().await;
            if state.epoch() == epoch {
                let _ = state.rename_column(column_id, &previous);
            }
            log::warn!("update_column {} rejected, rolled back: {}", column_id, err);
            Err(err)
        }
    }
}

/// Remove every card from a column, keeping the column itself
pub async fn clear_column<R: KanbanRemote>(store: &Store, remote: &R, column_id: u32) -> DomainResult<()> {
    let (epoch, removed) = {
        let mut state = store.kanban().await;
        let removed = state.clear_column(column_id)?;
        (state.epoch(), removed)
    };

    match remote.clear_column(column_id).await {
        Ok(()) => Ok(()),
        Err(err) => {
            let mut state = store.kanban().await;
            if state.epoch() == epoch {
                state.restore_cleared_cards(column_id, removed);
            }
            log::warn!("clear_column {} rejected, rolled back: {}", column_id, err);
            Err(err)
        }
    }
}

/// Delete a column and every card it owns
pub async fn delete_column<R: Remote<Column>>(store: &Store, remote: &R, column_id: u32) -> DomainResult<()> {
    let (epoch, column, index, cards) = {
        let mut state = store.kanban().await;
        let (column, index, cards) = state.delete_column(column_id)?;
        (state.epoch(), column, index, cards)
    };

    match remote.delete(column_id).await {
        Ok(()) => Ok(()),
        Err(err) => {
            let mut state = store.kanban().await;
            if state.epoch() == epoch {
                state.restore_column(column, index, cards);
            }
            log::warn!("delete_column {} rejected, rolled back: {}", column_id, err);
            Err(err)
        }
    }
}

/// Reorder a column within the board
pub async fn move_column<R: Remote<Column>>(
    store: &Store,
    remote: &R,
    column_id: u32,
    position: i32,
) -> DomainResult<()> {
    let index = index_from_position(position)?;
    let (epoch, previous) = {
        let mut state = store.kanban().await;
        let previous = state.move_column(column_id, index)?;
        (state.epoch(), previous)
    };

    match remote.relocate(column_id, None, None, index).await {
        Ok(()) => Ok(()),
        Err(err) => {
            let mut state = store.kanban().await;
            if state.epoch() == epoch {
                let _ = state.move_column(column_id, previous);
            }
            log::warn!("move_column {} rejected, rolled back: {}", column_id, err);
            Err(err)
        }
    }
}

/// Create a card at the end of a column
pub async fn create_card<R: Remote<Card>>(
    store: &Store,
    remote: &R,
    column_id: u32,
    name: &str,
) -> DomainResult<Card> {
    let (provisional, epoch, draft) = {
        let mut state = store.kanban().await;
        let id = state.provisional_id();
        let draft = Card::new(id, column_id, name.to_string());
        state.insert_card(draft.clone(), None)?;
        (id, state.epoch(), draft)
    };

    match remote.create(Some(column_id), &draft).await {
        Ok(canonical) => {
            let mut state = store.kanban().await;
            if state.epoch() != epoch {
                log::debug!("discarding stale create_card confirmation");
                return Ok(canonical);
            }
            state.confirm_card(provisional, canonical.clone())?;
            Ok(canonical)
        }
        Err(err) => {
            let mut state = store.kanban().await;
            if state.epoch() == epoch {
                let _ = state.delete_card(provisional);
            }
            log::warn!("create_card rejected, rolled back: {}", err);
            Err(err)
        }
    }
}

/// Patch a card's own fields
pub async fn update_card<R: Remote<Card>>(
    store: &Store,
    remote: &R,
    card_id: u32,
    patch: &CardPatch,
) -> DomainResult<Card> {
    let (epoch, previous) = {
        let mut state = store.kanban().await;
        let card = state
            .cards
            .get_mut(card_id)
            .ok_or_else(|| DomainError::NotFound(format!("card {}", card_id)))?;
        let previous = card.clone();
        patch.apply(card);
        (state.epoch(), previous)
    };

    let patch_value =
        serde_json::to_value(patch).map_err(|e| DomainError::Internal(e.to_string()))?;
    match remote.update(card_id, patch_value).await {
        Ok(canonical) => Ok(canonical),
        Err(err) => {
            let mut state = store.kanban().await;
            if state.epoch() == epoch {
                state.cards.upsert(previous);
            }
            log::warn!("update_card {} rejected, rolled back: {}", card_id, err);
            Err(err)
        }
    }
}

/// Delete a card from its column and the card table
pub async fn delete_card<R: Remote<Card>>(store: &Store, remote: &R, card_id: u32) -> DomainResult<()> {
    let (epoch, card, index) = {
        let mut state = store.kanban().await;
        let (card, index) = state.delete_card(card_id)?;
        (state.epoch(), card, index)
    };

    match remote.delete(card_id).await {
        Ok(()) => Ok(()),
        Err(err) => {
            let mut state = store.kanban().await;
            if state.epoch() == epoch {
                let _ = state.insert_card(card, Some(index));
            }
            log::warn!("delete_card {} rejected, rolled back: {}", card_id, err);
            Err(err)
        }
    }
}

/// Move a card to `position` in `to_column` (which may be its current
/// column). The optimistic relocation is atomic; a rejection moves the card
/// back where it came from.
pub async fn move_card<R: Remote<Card>>(
    store: &Store,
    remote: &R,
    card_id: u32,
    to_column: u32,
    position: i32,
) -> DomainResult<()> {
    let index = index_from_position(position)?;
    let (epoch, undo) = {
        let mut state = store.kanban().await;
        let undo = state.move_card(card_id, to_column, index)?;
        (state.epoch(), undo)
    };

    match remote
        .relocate(card_id, Some(undo.from_column), Some(to_column), index)
        .await
    {
        Ok(()) => Ok(()),
        Err(err) => {
            let mut state = store.kanban().await;
            if state.epoch() == epoch {
                let _ = state.move_card(card_id, undo.from_column, undo.from_index);
            }
            log::warn!("move_card {} rejected, rolled back: {}", card_id, err);
            Err(err)
        }
    }
}

/// Add an empty checklist to a card
pub async fn add_checklist<R: KanbanRemote>(
    store: &Store,
    remote: &R,
    card_id: u32,
    name: &str,
) -> DomainResult<Checklist> {
    let (provisional, epoch) = {
        let mut state = store.kanban().await;
        let id = state.provisional_id();
        state.add_checklist(card_id, Checklist::new(id, name.to_string()))?;
        (id, state.epoch())
    };

    match remote.add_checklist(card_id, name).await {
        Ok(canonical) => {
            let mut state = store.kanban().await;
            if state.epoch() != epoch {
                log::debug!("discarding stale add_checklist confirmation");
                return Ok(canonical);
            }
            state.confirm_checklist(card_id, provisional, canonical.clone())?;
            Ok(canonical)
        }
        Err(err) => {
            let mut state = store.kanban().await;
            if state.epoch() == epoch {
                let _ = state.delete_checklist(card_id, provisional);
            }
            log::warn!("add_checklist rejected, rolled back: {}", err);
            Err(err)
        }
    }
}

/// Rename a checklist
pub async fn update_checklist<R: KanbanRemote>(
    store: &Store,
    remote: &R,
    card_id: u32,
    checklist_id: u32,
    name: &str,
) -> DomainResult<()> {
    let (epoch, previous) = {
        let mut state = store.kanban().await;
        let previous = state.rename_checklist(card_id, checklist_id, name)?;
        (state.epoch(), previous)
    };

    match remote.rename_checklist(card_id, checklist_id, name).await {
        Ok(()) => Ok(()),
        Err(err) => {
            let mut state = store.kanban().await;
            if state.epoch() == epoch {
                let _ = state.rename_checklist(card_id, checklist_id, &previous);
            }
            log::warn!("update_checklist {} rejected, rolled back: {}", checklist_id, err);
            Err(err)
        }
    }
}

/// Delete a checklist from a card
pub async fn delete_checklist<R: KanbanRemote>(
    store: &Store,
    remote: &R,
    card_id: u32,
    checklist_id: u32,
) -> DomainResult<()> {
    let (epoch, checklist, index) = {
        let mut state = store.kanban().await;
        let (checklist, index) = state.delete_checklist(card_id, checklist_id)?;
        (state.epoch(), checklist, index)
    };

    match remote.delete_checklist(card_id, checklist_id).await {
        Ok(()) => Ok(()),
        Err(err) => {
            let mut state = store.kanban().await;
            if state.epoch() == epoch {
                let _ = state.restore_checklist(card_id, checklist, index);
            }
            log::warn!("delete_checklist {} rejected, rolled back: {}", checklist_id, err);
            Err(err)
        }
    }
}

/// Add a check item to a checklist
pub async fn add_check_item<R: KanbanRemote>(
    store: &Store,
    remote: &R,
    card_id: u32,
    checklist_id: u32,
    name: &str,
) -> DomainResult<CheckItem> {
    let (provisional, epoch) = {
        let mut state = store.kanban().await;
        let id = state.provisional_id();
        state.add_check_item(card_id, checklist_id, CheckItem::new(id, name.to_string()))?;
        (id, state.epoch())
    };

    match remote.add_check_item(card_id, checklist_id, name).await {
        Ok(canonical) => {
            let mut state = store.kanban().await;
            if state.epoch() != epoch {
                log::debug!("discarding stale add_check_item confirmation");
                return Ok(canonical);
            }
            state.confirm_check_item(card_id, checklist_id, provisional, canonical.clone())?;
            Ok(canonical)
        }
        Err(err) => {
            let mut state = store.kanban().await;
            if state.epoch() == epoch {
                let _ = state.delete_check_item(card_id, checklist_id, provisional);
            }
            log::warn!("add_check_item rejected, rolled back: {}", err);
            Err(err)
        }
    }
}

/// Patch a check item's name and/or state; the owning checklist's completion
/// percentage tracks the change
pub async fn update_check_item<R: KanbanRemote>(
    store: &Store,
    remote: &R,
    card_id: u32,
    checklist_id: u32,
    item_id: u32,
    name: Option<&str>,
    item_state: Option<CheckItemState>,
) -> DomainResult<()> {
    let (epoch, previous) = {
        let mut state = store.kanban().await;
        let previous = state.update_check_item(card_id, checklist_id, item_id, name, item_state)?;
        (state.epoch(), previous)
    };

    match remote
        .update_check_item(card_id, checklist_id, item_id, name, item_state)
        .await
    {
        Ok(()) => Ok(()),
        Err(err) => {
            let mut state = store.kanban().await;
            if state.epoch() == epoch {
                let _ = state.update_check_item(
                    card_id,
                    checklist_id,
                    item_id,
                    Some(&previous.name),
                    Some(previous.state),
                );
            }
            log::warn!("update_check_item {} rejected, rolled back: {}", item_id, err);
            Err(err)
        }
    }
}

/// Delete a check item
pub async fn delete_check_item<R: KanbanRemote>(
    store: &Store,
    remote: &R,
    card_id: u32,
    checklist_id: u32,
    item_id: u32,
) -> DomainResult<()> {
    let (epoch, item, index) = {
        let mut state = store.kanban().await;
        let (item, index) = state.delete_check_item(card_id, checklist_id, item_id)?;
        (state.epoch(), item, index)
    };

    match remote.delete_check_item(card_id, checklist_id, item_id).await {
        Ok(()) => Ok(()),
        Err(err) => {
            let mut state = store.kanban().await;
            if state.epoch() == epoch {
                let _ = state.restore_check_item(card_id, checklist_id, item, index);
            }
            log::warn!("delete_check_item {} rejected, rolled back: {}", item_id, err);
            Err(err)
        }
    }
}

/// Comment on a card. The confirmation backfills the server-assigned id and
/// `created_at`.
pub async fn add_comment<R: KanbanRemote>(
    store: &Store,
    remote: &R,
    card_id: u32,
    member_id: u32,
    message: &str,
) -> DomainResult<Comment> {
    let (provisional, epoch) = {
        let mut state = store.kanban().await;
        let id = state.provisional_id();
        state.add_comment(Comment {
            id,
            card_id,
            member_id,
            message: message.to_string(),
            created_at: None,
        })?;
        (id, state.epoch())
    };

    match remote.add_comment(card_id, member_id, message).await {
        Ok(canonical) => {
            let mut state = store.kanban().await;
            if state.epoch() != epoch {
                log::debug!("discarding stale add_comment confirmation");
                return Ok(canonical);
            }
            state.confirm_comment(card_id, provisional, canonical.clone())?;
            Ok(canonical)
        }
        Err(err) => {
            let mut state = store.kanban().await;
            if state.epoch() == epoch {
                let _ = state.remove_comment(card_id, provisional);
            }
            log::warn!("add_comment rejected, rolled back: {}", err);
            Err(err)
        }
    }
}
