//! Kanban Entities
//!
//! Columns own an ordered list of card ids; cards live in their own table
//! and point back at their column. Checklists are owned inline by the card
//! (they are never drag-reordered across cards), and each keeps a stored
//! completion percentage refreshed on every check-item mutation.

use serde::{Deserialize, Serialize};

use super::entity::Entity;

/// A board column. `card_ids` is the single source of truth for both
/// membership and order; an empty column stays alive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Unique identifier
    pub id: u32,
    /// Column name
    pub name: String,
    /// Ordered ids of the cards in this column
    pub card_ids: Vec<u32>,
}

impl Column {
    pub fn new(id: u32, name: String) -> Self {
        Self {
            id,
            name,
            card_ids: Vec::new(),
        }
    }
}

impl Entity for Column {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Check item state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CheckItemState {
    #[default]
    Incomplete,
    Complete,
}

impl CheckItemState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckItemState::Incomplete => "incomplete",
            CheckItemState::Complete => "complete",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "complete" => CheckItemState::Complete,
            _ => CheckItemState::Incomplete,
        }
    }
}

/// A single entry in a checklist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckItem {
    pub id: u32,
    pub name: String,
    pub state: CheckItemState,
}

impl CheckItem {
    pub fn new(id: u32, name: String) -> Self {
        Self {
            id,
            name,
            state: CheckItemState::Incomplete,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state == CheckItemState::Complete
    }
}

/// A checklist owned inline by a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checklist {
    pub id: u32,
    pub name: String,
    pub check_items: Vec<CheckItem>,
    /// Stored completion percentage, refreshed by every check-item mutation.
    /// An empty checklist reads as fully complete.
    pub complete_percentage: u8,
}

impl Checklist {
    pub fn new(id: u32, name: String) -> Self {
        Self {
            id,
            name,
            check_items: Vec::new(),
            complete_percentage: 100,
        }
    }

    /// (complete, total) over this checklist's own items
    pub fn progress(&self) -> (usize, usize) {
        let complete = self
            .check_items
            .iter()
            .filter(|item| item.is_complete())
            .count();
        (complete, self.check_items.len())
    }

    /// Recompute the stored percentage from `check_items`. Scans only this
    /// checklist, so the cost is bounded by its own size.
    pub fn refresh_progress(&mut self) {
        let (complete, total) = self.progress();
        self.complete_percentage = if total == 0 {
            100
        } else {
            (100.0 * complete as f64 / total as f64).round() as u8
        };
    }
}

/// A comment on a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u32,
    /// The card this comment belongs to
    pub card_id: u32,
    pub member_id: u32,
    pub message: String,
    /// Millisecond epoch, assigned by the remote
    pub created_at: Option<i64>,
}

/// A file attached to a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: u32,
}

/// A kanban card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// Unique identifier
    pub id: u32,
    /// Back-reference to the owning column. This is a relation, not
    /// ownership: membership and order live in the column's `card_ids`,
    /// and relocation updates both together.
    pub column_id: u32,
    pub name: String,
    pub description: Option<String>,
    pub cover: Option<String>,
    /// Due date, millisecond epoch
    pub due: Option<i64>,
    pub is_subscribed: bool,
    pub member_ids: Vec<u32>,
    pub attachments: Vec<Attachment>,
    pub checklists: Vec<Checklist>,
    pub comments: Vec<Comment>,
}

impl Card {
    pub fn new(id: u32, column_id: u32, name: String) -> Self {
        Self {
            id,
            column_id,
            name,
            description: None,
            cover: None,
            due: None,
            is_subscribed: false,
            member_ids: Vec::new(),
            attachments: Vec::new(),
            checklists: Vec::new(),
            comments: Vec::new(),
        }
    }

    pub fn checklist(&self, checklist_id: u32) -> Option<&Checklist> {
        self.checklists.iter().find(|list| list.id == checklist_id)
    }

    pub fn checklist_mut(&mut self, checklist_id: u32) -> Option<&mut Checklist> {
        self.checklists
            .iter_mut()
            .find(|list| list.id == checklist_id)
    }
}

impl Entity for Card {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// A board member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: u32,
    pub name: String,
    pub avatar: Option<String>,
}

impl Entity for Member {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Everything a whole-board fetch returns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub columns: Vec<Column>,
    pub cards: Vec<Card>,
    pub members: Vec<Member>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_checklist_reads_complete() {
        let list = Checklist::new(1, "Release".to_string());
        assert_eq!(list.complete_percentage, 100);
    }

    #[test]
    fn test_progress_rounds_for_display() {
        let mut list = Checklist::new(1, "Release".to_string());
        list.check_items.push(CheckItem::new(1, "a".to_string()));
        list.check_items.push(CheckItem::new(2, "b".to_string()));
        list.check_items.push(CheckItem::new(3, "c".to_string()));
        list.check_items[0].state = CheckItemState::Complete;
        list.refresh_progress();
        assert_eq!(list.complete_percentage, 33);

        list.check_items[1].state = CheckItemState::Complete;
        list.refresh_progress();
        assert_eq!(list.complete_percentage, 67);
    }

    #[test]
    fn test_check_item_state_round_trip() {
        assert_eq!(CheckItemState::Complete.as_str(), "complete");
        assert_eq!(
            CheckItemState::from_str("incomplete"),
            CheckItemState::Incomplete
        );
        assert_eq!(CheckItemState::from_str("bogus"), CheckItemState::Incomplete);
    }

    #[test]
    fn test_card_creation() {
        let card = Card::new(7, 2, "Write docs".to_string());
        assert_eq!(card.id(), 7);
        assert_eq!(card.column_id, 2);
        assert!(card.checklists.is_empty());
        assert!(!card.is_subscribed);
    }
}
