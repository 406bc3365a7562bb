//! Store Integration Tests
//!
//! Exercises the feature state machines directly: relocation round-trips,
//! cascade deletes, derived aggregates and undo helpers.

#[cfg(test)]
mod tests {
    use crate::domain::{
        Card, CheckItem, CheckItemState, Checklist, Column, Contact, Message, Post, PostComment,
        Thread, ThreadKind,
    };
    use crate::store::{ChatState, KanbanState, SocialState};

    /// Two columns: "Todo" (1) holding cards 11..=13, "Done" (2) holding 21
    fn board() -> KanbanState {
        let mut state = KanbanState::new();
        let columns = vec![
            Column::new(1, "Todo".to_string()),
            Column::new(2, "Done".to_string()),
        ];
        let cards = vec![
            Card::new(11, 1, "first".to_string()),
            Card::new(12, 1, "second".to_string()),
            Card::new(13, 1, "third".to_string()),
            Card::new(21, 2, "shipped".to_string()),
        ];
        state.load(columns, cards, Vec::new());
        for (column_id, card_ids) in [(1u32, vec![11u32, 12, 13]), (2, vec![21])] {
            state.columns.get_mut(column_id).unwrap().card_ids = card_ids;
        }
        state
    }

    #[test]
    fn test_move_card_across_and_back_restores_both_columns() {
        let mut state = board();

        let undo = state.move_card(11, 2, 0).expect("move failed");
        assert_eq!(state.columns.get(1).unwrap().card_ids, vec![12, 13]);
        assert_eq!(state.columns.get(2).unwrap().card_ids, vec![11, 21]);
        assert_eq!(state.cards.get(11).unwrap().column_id, 2);

        state
            .move_card(11, undo.from_column, undo.from_index)
            .expect("move back failed");
        assert_eq!(state.columns.get(1).unwrap().card_ids, vec![11, 12, 13]);
        assert_eq!(state.columns.get(2).unwrap().card_ids, vec![21]);
        assert_eq!(state.cards.get(11).unwrap().column_id, 1);
    }

    #[test]
    fn test_move_card_within_column_drag_semantics() {
        let mut state = board();
        state.move_card(13, 1, 0).expect("move failed");
        assert_eq!(state.columns.get(1).unwrap().card_ids, vec![13, 11, 12]);

        // moving to the current position is a no-op
        state.move_card(13, 1, 0).expect("move failed");
        assert_eq!(state.columns.get(1).unwrap().card_ids, vec![13, 11, 12]);
    }

    #[test]
    fn test_move_card_clamps_past_end() {
        let mut state = board();
        state.move_card(11, 2, 99).expect("move failed");
        assert_eq!(state.columns.get(2).unwrap().card_ids, vec![21, 11]);
    }

    #[test]
    fn test_move_last_card_leaves_empty_column_alive() {
        let mut state = board();
        state.move_card(21, 1, 0).expect("move failed");
        assert!(state.columns.get(2).unwrap().card_ids.is_empty());
        assert!(state.columns.contains(2));
    }

    #[test]
    fn test_delete_column_cascades_cards() {
        let mut state = board();
        let (column, index, cards) = state.delete_column(1).expect("delete failed");
        assert_eq!(column.id, 1);
        assert_eq!(index, 0);
        assert_eq!(cards.len(), 3);
        // no dangling card ids referencing the deleted column
        for id in [11, 12, 13] {
            assert!(state.cards.get(id).is_none());
        }
        assert_eq!(state.columns.order(), &[2]);

        state.restore_column(column, index, cards);
        assert_eq!(state.columns.order(), &[1, 2]);
        assert_eq!(state.columns.get(1).unwrap().card_ids, vec![11, 12, 13]);
        assert!(state.cards.get(12).is_some());
    }

    #[test]
    fn test_clear_column_keeps_column_alive() {
        let mut state = board();
        let removed = state.clear_column(1).expect("clear failed");
        assert_eq!(removed.len(), 3);
        assert!(state.columns.get(1).unwrap().card_ids.is_empty());
        assert!(state.cards.get(11).is_none());

        state.restore_cleared_cards(1, removed);
        assert_eq!(state.columns.get(1).unwrap().card_ids, vec![11, 12, 13]);
        assert!(state.cards.get(11).is_some());
    }

    #[test]
    fn test_delete_card_and_restore_at_index() {
        let mut state = board();
        let (card, index) = state.delete_card(12).expect("delete failed");
        assert_eq!(index, 1);
        assert_eq!(state.columns.get(1).unwrap().card_ids, vec![11, 13]);

        state.insert_card(card, Some(index)).expect("restore failed");
        assert_eq!(state.columns.get(1).unwrap().card_ids, vec![11, 12, 13]);
    }

    #[test]
    fn test_confirm_card_rekeys_table_and_column_slot() {
        let mut state = board();
        let provisional = state.provisional_id();
        let card = Card::new(provisional, 1, "draft".to_string());
        state.insert_card(card, None).expect("insert failed");

        let canonical = Card::new(99, 1, "draft".to_string());
        state.confirm_card(provisional, canonical).expect("confirm failed");

        assert!(state.cards.get(provisional).is_none());
        assert_eq!(state.cards.get(99).unwrap().name, "draft");
        assert_eq!(state.columns.get(1).unwrap().card_ids, vec![11, 12, 13, 99]);
    }

    #[test]
    fn test_confirm_card_after_in_flight_move_keeps_local_column() {
        let mut state = board();
        let provisional = state.provisional_id();
        state
            .insert_card(Card::new(provisional, 1, "draft".to_string()), None)
            .expect("insert failed");
        // user drags the still-provisional card to the other column
        state.move_card(provisional, 2, 0).expect("move failed");

        // server replies with its canonical copy, still naming column 1
        let canonical = Card::new(99, 1, "draft".to_string());
        state.confirm_card(provisional, canonical).expect("confirm failed");

        assert_eq!(state.cards.get(99).unwrap().column_id, 2);
        assert_eq!(state.columns.get(2).unwrap().card_ids, vec![99, 21]);
    }

    #[test]
    fn test_check_item_mutations_refresh_percentage() {
        let mut state = board();
        let mut list = Checklist::new(5, "QA".to_string());
        list.check_items = vec![
            CheckItem::new(51, "unit".to_string()),
            CheckItem::new(52, "integration".to_string()),
            CheckItem::new(53, "manual".to_string()),
        ];
        list.refresh_progress();
        state.add_checklist(11, list).expect("add failed");
        assert_eq!(state.cards.get(11).unwrap().checklists[0].complete_percentage, 0);

        state
            .update_check_item(11, 5, 51, None, Some(CheckItemState::Complete))
            .expect("update failed");
        assert_eq!(state.cards.get(11).unwrap().checklists[0].complete_percentage, 33);

        let (item, index) = state.delete_check_item(11, 5, 52).expect("delete failed");
        assert_eq!(state.cards.get(11).unwrap().checklists[0].complete_percentage, 50);

        state
            .restore_check_item(11, 5, item, index)
            .expect("restore failed");
        assert_eq!(state.cards.get(11).unwrap().checklists[0].complete_percentage, 33);
    }

    #[test]
    fn test_empty_checklist_is_fully_complete() {
        let mut state = board();
        state
            .add_checklist(11, Checklist::new(5, "empty".to_string()))
            .expect("add failed");
        assert_eq!(
            state.cards.get(11).unwrap().checklists[0].complete_percentage,
            100
        );
    }

    #[test]
    fn test_unread_counter_only_bumps_inactive_threads() {
        let mut state = ChatState::new();
        state.set_threads(vec![
            Thread::new(1, ThreadKind::OneToOne),
            Thread::new(2, ThreadKind::Group),
        ]);
        state.active_thread_id = Some(1);

        let message = |id| Message {
            id,
            author_id: 7,
            body: "hey".to_string(),
            created_at: None,
        };
        assert!(!state.add_message(1, message(100)).unwrap());
        assert!(state.add_message(2, message(101)).unwrap());
        assert_eq!(state.threads.get(1).unwrap().unread_count, 0);
        assert_eq!(state.threads.get(2).unwrap().unread_count, 1);

        let previous = state.mark_thread_seen(2).unwrap();
        assert_eq!(previous, 1);
        assert_eq!(state.threads.get(2).unwrap().unread_count, 0);

        state.restore_unread_count(2, previous);
        assert_eq!(state.threads.get(2).unwrap().unread_count, 1);
    }

    #[test]
    fn test_recipients_dedupe_by_id() {
        let mut state = ChatState::new();
        assert!(state.add_recipient(Contact::new(1, "Ada".to_string())));
        assert!(!state.add_recipient(Contact::new(1, "Ada again".to_string())));
        assert_eq!(state.recipients.len(), 1);

        assert!(state.remove_recipient(1).is_some());
        assert!(state.remove_recipient(1).is_none());
        assert!(state.recipients.is_empty());
    }

    #[test]
    fn test_like_toggles_keep_count_and_flag_paired() {
        let mut state = SocialState::new();
        let mut post = Post::new(1, 7, "hello".to_string());
        post.likes = 10;
        post.comments.push(PostComment {
            id: 2,
            author_id: 8,
            message: "hi".to_string(),
            likes: 0,
            is_liked: false,
            created_at: None,
        });
        state.set_posts(vec![post]);

        assert!(state.set_post_liked(1, true).unwrap());
        assert!(!state.set_post_liked(1, true).unwrap());
        assert_eq!(state.posts.get(1).unwrap().likes, 11);

        assert!(state.set_post_liked(1, false).unwrap());
        assert_eq!(state.posts.get(1).unwrap().likes, 10);
        assert!(!state.posts.get(1).unwrap().is_liked);

        assert!(state.set_comment_liked(1, 2, true).unwrap());
        assert_eq!(state.posts.get(1).unwrap().comments[0].likes, 1);
    }

    #[test]
    fn test_bulk_loads_bump_epoch() {
        let mut kanban = board();
        let before = kanban.epoch();
        kanban.load(Vec::new(), Vec::new(), Vec::new());
        assert!(kanban.epoch() > before);

        let mut chat = ChatState::new();
        let before = chat.epoch();
        chat.set_threads(Vec::new());
        assert!(chat.epoch() > before);
    }
}
