//! Kanban Board State
//!
//! Columns, cards and members live in entity tables; the column table's
//! order is the board's column order. Every mutating method completes fully
//! before returning (no suspension points), and structural mutations return
//! the data needed to reverse them on remote rejection.

use entity_table::{reorder, EntityTable};

use crate::domain::{Card, CheckItem, CheckItemState, Checklist, Column, Comment, DomainError, DomainResult, Member};
use crate::store::{invalid_reference, PROVISIONAL_BASE};

/// Undo data for a card relocation
#[derive(Debug, Clone, Copy)]
pub struct CardMove {
    pub from_column: u32,
    pub from_index: usize,
}

#[derive(Debug, Clone, Default)]
pub struct KanbanState {
    pub columns: EntityTable<Column>,
    pub cards: EntityTable<Card>,
    pub members: EntityTable<Member>,
    epoch: u64,
    next_provisional: u32,
}

impl KanbanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Liveness counter: bulk loads bump it, and settling mutations whose
    /// captured epoch no longer matches discard their result.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Draw a provisional id for an optimistic create. Drawn from the top
    /// half of the id range so it cannot collide with server-assigned ids.
    pub fn provisional_id(&mut self) -> u32 {
        let id = PROVISIONAL_BASE + self.next_provisional;
        self.next_provisional += 1;
        id
    }

    /// Replace the whole board. Bumps the epoch.
    pub fn load(&mut self, columns: Vec<Column>, cards: Vec<Card>, members: Vec<Member>) {
        self.columns = EntityTable::from_entities(columns);
        self.cards = EntityTable::from_entities(cards);
        self.members = EntityTable::from_entities(members);
        self.epoch += 1;
    }

    // ========================
    // Columns
    // ========================

    /// Append a new column to the board
    pub fn insert_column(&mut self, column: Column) {
        self.columns.upsert(column);
    }

    /// Rename a column; returns the previous name for rollback
    pub fn rename_column(&mut self, id: u32, name: &str) -> DomainResult<String> {
        let column = self
            .columns
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("column {}", id)))?;
        let previous = std::mem::replace(&mut column.name, name.to_string());
        Ok(previous)
    }

    /// Reorder a column within the board; returns its previous index
    pub fn move_column(&mut self, id: u32, index: usize) -> DomainResult<usize> {
        let previous = self
            .columns
            .position(id)
            .ok_or_else(|| DomainError::NotFound(format!("column {}", id)))?;
        self.columns.move_to(id, index);
        Ok(previous)
    }

    /// Remove every card from a column, keeping the column alive.
    /// Returns the removed cards in order, for rollback.
    pub fn clear_column(&mut self, id: u32) -> DomainResult<Vec<Card>> {
        let card_ids = match self.columns.get_mut(id) {
            Some(column) => std::mem::take(&mut column.card_ids),
            None => return Err(DomainError::NotFound(format!("column {}", id))),
        };
        let mut removed = Vec::with_capacity(card_ids.len());
        for card_id in card_ids {
            match self.cards.remove(card_id) {
                Some(card) => removed.push(card),
                None => return Err(invalid_reference(format!(
                    "card {} listed by column {} is not in the card table",
                    card_id, id
                ))),
            }
        }
        Ok(removed)
    }

    /// Delete a column and every card it owns in one logical step.
    /// Returns the column, its board index and its cards, for rollback.
    pub fn delete_column(&mut self, id: u32) -> DomainResult<(Column, usize, Vec<Card>)> {
        let index = self
            .columns
            .position(id)
            .ok_or_else(|| DomainError::NotFound(format!("column {}", id)))?;
        let cards = self.clear_column(id)?;
        let column = match self.columns.remove(id) {
            Some(column) => column,
            None => return Err(invalid_reference(format!("column {} vanished mid-delete", id))),
        };
        Ok((column, index, cards))
    }

    /// Reverse of [`delete_column`]
    pub fn restore_column(&mut self, mut column: Column, index: usize, cards: Vec<Card>) {
        column.card_ids = cards.iter().map(|card| card.id).collect();
        self.columns.upsert_at(column, index);
        for card in cards {
            self.cards.upsert(card);
        }
    }

    /// Reverse of [`clear_column`]
    pub fn restore_cleared_cards(&mut self, column_id: u32, cards: Vec<Card>) {
        if let Some(column) = self.columns.get_mut(column_id) {
            column.card_ids = cards.iter().map(|card| card.id).collect();
        }
        for card in cards {
            self.cards.upsert(card);
        }
    }

    /// Swap a provisional column id for the server-assigned one. Cards added
    /// to the column while the create was in flight keep their membership;
    /// their back-references move to the canonical id.
    pub fn confirm_column(&mut self, provisional: u32, mut canonical: Column) -> DomainResult<()> {
        let local_card_ids = match self.columns.get(provisional) {
            Some(column) => column.card_ids.clone(),
            None => return Err(DomainError::NotFound(format!("column {}", provisional))),
        };
        canonical.card_ids = local_card_ids.clone();
        let new_id = canonical.id;
        if !self.columns.rekey(provisional, canonical) {
            return Err(DomainError::Internal(format!(
                "cannot rekey column {} to {}",
                provisional, new_id
            )));
        }
        for card_id in local_card_ids {
            if let Some(card) = self.cards.get_mut(card_id) {
                card.column_id = new_id;
            }
        }
        Ok(())
    }

    // ========================
    // Cards
    // ========================

    /// Insert a card into its column. `index` of `None` appends; past-end
    /// clamps to append.
    pub fn insert_card(&mut self, card: Card, index: Option<usize>) -> DomainResult<()> {
        let column = self
            .columns
            .get_mut(card.column_id)
            .ok_or_else(|| DomainError::NotFound(format!("column {}", card.column_id)))?;
        let index = index
            .unwrap_or(column.card_ids.len())
            .min(column.card_ids.len());
        column.card_ids.insert(index, card.id);
        self.cards.upsert(card);
        Ok(())
    }

    /// Remove a card from its column and the card table in one step.
    /// Returns the card and its index, for rollback.
    pub fn delete_card(&mut self, id: u32) -> DomainResult<(Card, usize)> {
        let card = self
            .cards
            .remove(id)
            .ok_or_else(|| DomainError::NotFound(format!("card {}", id)))?;
        let column = match self.columns.get_mut(card.column_id) {
            Some(column) => column,
            None => {
                return Err(invalid_reference(format!(
                    "card {} points at missing column {}",
                    id, card.column_id
                )))
            }
        };
        let index = match column.card_ids.iter().position(|other| *other == id) {
            Some(index) => index,
            None => {
                return Err(invalid_reference(format!(
                    "card {} is not listed by its column {}",
                    id, card.column_id
                )))
            }
        };
        column.card_ids.remove(index);
        Ok((card, index))
    }

    /// Move a card to `to_column` at `index` as one atomic step: splice out
    /// of the source list, update the back-reference when the column
    /// changes, splice into the destination (clamped to append). Returns
    /// where the card came from, for rollback.
    pub fn move_card(&mut self, card_id: u32, to_column: u32, index: usize) -> DomainResult<CardMove> {
        let from_column = self
            .cards
            .get(card_id)
            .map(|card| card.column_id)
            .ok_or_else(|| DomainError::NotFound(format!("card {}", card_id)))?;
        if !self.columns.contains(to_column) {
            return Err(DomainError::NotFound(format!("column {}", to_column)));
        }

        if from_column == to_column {
            let column = match self.columns.get_mut(from_column) {
                Some(column) => column,
                None => {
                    return Err(invalid_reference(format!(
                        "card {} points at missing column {}",
                        card_id, from_column
                    )))
                }
            };
            let from_index = match column.card_ids.iter().position(|id| *id == card_id) {
                Some(from_index) => from_index,
                None => {
                    return Err(invalid_reference(format!(
                        "card {} is not listed by its column {}",
                        card_id, from_column
                    )))
                }
            };
            reorder(&mut column.card_ids, card_id, index);
            return Ok(CardMove {
                from_column,
                from_index,
            });
        }

        let source = match self.columns.get_mut(from_column) {
            Some(column) => column,
            None => {
                return Err(invalid_reference(format!(
                    "card {} points at missing column {}",
                    card_id, from_column
                )))
            }
        };
        let from_index = match source.card_ids.iter().position(|id| *id == card_id) {
            Some(from_index) => from_index,
            None => {
                return Err(invalid_reference(format!(
                    "card {} is not listed by its column {}",
                    card_id, from_column
                )))
            }
        };
        source.card_ids.remove(from_index);

        // contains() was checked above, so the destination is present
        let dest = match self.columns.get_mut(to_column) {
            Some(column) => column,
            None => return Err(DomainError::NotFound(format!("column {}", to_column))),
        };
        let index = index.min(dest.card_ids.len());
        dest.card_ids.insert(index, card_id);

        if let Some(card) = self.cards.get_mut(card_id) {
            card.column_id = to_column;
        }
        Ok(CardMove {
            from_column,
            from_index,
        })
    }

    /// Swap a provisional card id for the server-assigned one, wherever the
    /// card lives now. The local column wins when the card was moved while
    /// the create was in flight.
    pub fn confirm_card(&mut self, provisional: u32, mut canonical: Card) -> DomainResult<()> {
        let column_id = match self.cards.get(provisional) {
            Some(card) => card.column_id,
            None => return Err(DomainError::NotFound(format!("card {}", provisional))),
        };
        canonical.column_id = column_id;
        let new_id = canonical.id;
        for comment in &mut canonical.comments {
            comment.card_id = new_id;
        }
        if !self.cards.rekey(provisional, canonical) {
            return Err(DomainError::Internal(format!(
                "cannot rekey card {} to {}",
                provisional, new_id
            )));
        }
        let column = match self.columns.get_mut(column_id) {
            Some(column) => column,
            None => {
                return Err(invalid_reference(format!(
                    "card {} points at missing column {}",
                    provisional, column_id
                )))
            }
        };
        match column.card_ids.iter_mut().find(|id| **id == provisional) {
            Some(slot) => *slot = new_id,
            None => {
                return Err(invalid_reference(format!(
                    "card {} is not listed by its column {}",
                    provisional, column_id
                )))
            }
        }
        Ok(())
    }

    // ========================
    // Checklists
    // ========================

    pub fn add_checklist(&mut self, card_id: u32, checklist: Checklist) -> DomainResult<()> {
        let card = self.card_mut(card_id)?;
        card.checklists.push(checklist);
        Ok(())
    }

    /// Rename a checklist; returns the previous name for rollback
    pub fn rename_checklist(&mut self, card_id: u32, checklist_id: u32, name: &str) -> DomainResult<String> {
        let card = self.card_mut(card_id)?;
        let checklist = card
            .checklist_mut(checklist_id)
            .ok_or_else(|| DomainError::NotFound(format!("checklist {}", checklist_id)))?;
        Ok(std::mem::replace(&mut checklist.name, name.to_string()))
    }

    /// Remove a checklist; returns it with its index, for rollback
    pub fn delete_checklist(&mut self, card_id: u32, checklist_id: u32) -> DomainResult<(Checklist, usize)> {
        let card = self.card_mut(card_id)?;
        let index = card
            .checklists
            .iter()
            .position(|list| list.id == checklist_id)
            .ok_or_else(|| DomainError::NotFound(format!("checklist {}", checklist_id)))?;
        Ok((card.checklists.remove(index), index))
    }

    /// Reverse of [`delete_checklist`]
    pub fn restore_checklist(&mut self, card_id: u32, checklist: Checklist, index: usize) -> DomainResult<()> {
        let card = self.card_mut(card_id)?;
        let index = index.min(card.checklists.len());
        card.checklists.insert(index, checklist);
        Ok(())
    }

    /// Swap a provisional checklist id for the server-assigned one
    pub fn confirm_checklist(&mut self, card_id: u32, provisional: u32, canonical: Checklist) -> DomainResult<()> {
        let card = self.card_mut(card_id)?;
        let checklist = card
            .checklist_mut(provisional)
            .ok_or_else(|| DomainError::NotFound(format!("checklist {}", provisional)))?;
        checklist.id = canonical.id;
        Ok(())
    }

    // ========================
    // Check items
    // ========================

    pub fn add_check_item(&mut self, card_id: u32, checklist_id: u32, item: CheckItem) -> DomainResult<()> {
        let checklist = self.checklist_mut(card_id, checklist_id)?;
        checklist.check_items.push(item);
        checklist.refresh_progress();
        Ok(())
    }

    /// Patch a check item; the owning checklist's percentage is refreshed in
    /// the same step. Returns the previous item for rollback.
    pub fn update_check_item(
        &mut self,
        card_id: u32,
        checklist_id: u32,
        item_id: u32,
        name: Option<&str>,
        state: Option<CheckItemState>,
    ) -> DomainResult<CheckItem> {
        let checklist = self.checklist_mut(card_id, checklist_id)?;
        let item = checklist
            .check_items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| DomainError::NotFound(format!("check item {}", item_id)))?;
        let previous = item.clone();
        if let Some(name) = name {
            item.name = name.to_string();
        }
        if let Some(state) = state {
            item.state = state;
        }
        checklist.refresh_progress();
        Ok(previous)
    }

    /// Remove a check item; returns it with its index, for rollback
    pub fn delete_check_item(&mut self, card_id: u32, checklist_id: u32, item_id: u32) -> DomainResult<(CheckItem, usize)> {
        let checklist = self.checklist_mut(card_id, checklist_id)?;
        let index = checklist
            .check_items
            .iter()
            .position(|item| item.id == item_id)
            .ok_or_else(|| DomainError::NotFound(format!("check item {}", item_id)))?;
        let item = checklist.check_items.remove(index);
        checklist.refresh_progress();
        Ok((item, index))
    }

    /// Reverse of [`delete_check_item`]
    pub fn restore_check_item(&mut self, card_id: u32, checklist_id: u32, item: CheckItem, index: usize) -> DomainResult<()> {
        let checklist = self.checklist_mut(card_id, checklist_id)?;
        let index = index.min(checklist.check_items.len());
        checklist.check_items.insert(index, item);
        checklist.refresh_progress();
        Ok(())
    }

    /// Swap a provisional check item id for the server-assigned one
    pub fn confirm_check_item(&mut self, card_id: u32, checklist_id: u32, provisional: u32, canonical: CheckItem) -> DomainResult<()> {
        let checklist = self.checklist_mut(card_id, checklist_id)?;
        let item = checklist
            .check_items
            .iter_mut()
            .find(|item| item.id == provisional)
            .ok_or_else(|| DomainError::NotFound(format!("check item {}", provisional)))?;
        item.id = canonical.id;
        Ok(())
    }

    // ========================
    // Comments
    // ========================

    pub fn add_comment(&mut self, comment: Comment) -> DomainResult<()> {
        let card = self.card_mut(comment.card_id)?;
        card.comments.push(comment);
        Ok(())
    }

    /// Reverse of [`add_comment`]
    pub fn remove_comment(&mut self, card_id: u32, comment_id: u32) -> DomainResult<()> {
        let card = self.card_mut(card_id)?;
        card.comments.retain(|comment| comment.id != comment_id);
        Ok(())
    }

    /// Swap a provisional comment id for the server-assigned one
    pub fn confirm_comment(&mut self, card_id: u32, provisional: u32, canonical: Comment) -> DomainResult<()> {
        let card = self.card_mut(card_id)?;
        let comment = card
            .comments
            .iter_mut()
            .find(|comment| comment.id == provisional)
            .ok_or_else(|| DomainError::NotFound(format!("comment {}", provisional)))?;
        *comment = canonical;
        Ok(())
    }

    fn card_mut(&mut self, card_id: u32) -> DomainResult<&mut Card> {
        self.cards
            .get_mut(card_id)
            .ok_or_else(|| DomainError::NotFound(format!("card {}", card_id)))
    }

    fn checklist_mut(&mut self, card_id: u32, checklist_id: u32) -> DomainResult<&mut Checklist> {
        self.cards
            .get_mut(card_id)
            .ok_or_else(|| DomainError::NotFound(format!("card {}", card_id)))?
            .checklist_mut(checklist_id)
            .ok_or_else(|| DomainError::NotFound(format!("checklist {}", checklist_id)))
    }
}
