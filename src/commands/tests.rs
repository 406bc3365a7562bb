//! Gateway Integration Tests
//!
//! Drives the command layer against the in-memory remote: optimistic
//! confirmation, rollback on rejection, and stale-result discard.

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::Value;

    use crate::commands;
    use crate::domain::{
        Board, Card, CheckItemState, Column, Contact, DomainError, DomainResult, Email, Label,
        Post, Thread, ThreadKind,
    };
    use crate::remote::{InMemoryRemote, KanbanRemote, Remote};
    use crate::store::Store;

    fn board() -> Board {
        let mut todo = Column::new(1, "Todo".to_string());
        todo.card_ids = vec![11, 12];
        let mut done = Column::new(2, "Done".to_string());
        done.card_ids = vec![21];
        Board {
            columns: vec![todo, done],
            cards: vec![
                Card::new(11, 1, "first".to_string()),
                Card::new(12, 1, "second".to_string()),
                Card::new(21, 2, "shipped".to_string()),
            ],
            members: Vec::new(),
        }
    }

    async fn setup_board() -> (Store, InMemoryRemote) {
        let store = Store::new();
        let remote = InMemoryRemote::new();
        remote.seed_board(board()).await;
        commands::load_board(&store, &remote)
            .await
            .expect("load_board failed");
        (store, remote)
    }

    #[tokio::test]
    async fn test_load_board_populates_tables() {
        let (store, _remote) = setup_board().await;
        let state = store.kanban_snapshot().await;
        assert_eq!(state.columns.order(), &[1, 2]);
        assert_eq!(state.cards.len(), 3);
        assert_eq!(state.columns.get(1).unwrap().card_ids, vec![11, 12]);
    }

    #[tokio::test]
    async fn test_create_card_confirms_server_id() {
        let (store, remote) = setup_board().await;
        let card = commands::create_card(&store, &remote, 1, "draft")
            .await
            .expect("create_card failed");

        let state = store.kanban_snapshot().await;
        assert_eq!(state.columns.get(1).unwrap().card_ids, vec![11, 12, card.id]);
        assert_eq!(state.cards.get(card.id).unwrap().name, "draft");
        // nothing provisional is left behind
        for id in state.cards.order() {
            assert!(*id < crate::store::PROVISIONAL_BASE);
        }
    }

    #[tokio::test]
    async fn test_rejected_create_card_rolls_back() {
        let (store, remote) = setup_board().await;
        let before = store.kanban_snapshot().await;

        remote.fail_next("validation").await;
        let err = commands::create_card(&store, &remote, 1, "draft")
            .await
            .expect_err("create_card should be rejected");
        assert!(matches!(err, DomainError::RemoteRejected(_)));

        let after = store.kanban_snapshot().await;
        assert_eq!(after.columns.get(1).unwrap().card_ids, before.columns.get(1).unwrap().card_ids);
        assert_eq!(after.cards.len(), before.cards.len());
    }

    #[tokio::test]
    async fn test_rejected_move_card_restores_order() {
        let (store, remote) = setup_board().await;

        remote.fail_next("conflict").await;
        let err = commands::move_card(&store, &remote, 11, 2, 0)
            .await
            .expect_err("move_card should be rejected");
        assert!(matches!(err, DomainError::RemoteRejected(_)));

        let state = store.kanban_snapshot().await;
        assert_eq!(state.columns.get(1).unwrap().card_ids, vec![11, 12]);
        assert_eq!(state.columns.get(2).unwrap().card_ids, vec![21]);
        assert_eq!(state.cards.get(11).unwrap().column_id, 1);
    }

    #[tokio::test]
    async fn test_move_card_negative_position_is_rejected_locally() {
        let (store, remote) = setup_board().await;
        let err = commands::move_card(&store, &remote, 11, 2, -1)
            .await
            .expect_err("negative position must fail");
        assert!(matches!(err, DomainError::OutOfRangeIndex(_)));

        let state = store.kanban_snapshot().await;
        assert_eq!(state.columns.get(1).unwrap().card_ids, vec![11, 12]);
    }

    #[tokio::test]
    async fn test_confirmed_move_card_reaches_remote() {
        let (store, remote) = setup_board().await;
        commands::move_card(&store, &remote, 11, 2, 1)
            .await
            .expect("move_card failed");

        // reload from the remote: the server saw the same relocation
        commands::load_board(&store, &remote)
            .await
            .expect("reload failed");
        let state = store.kanban_snapshot().await;
        assert_eq!(state.columns.get(1).unwrap().card_ids, vec![12]);
        assert_eq!(state.columns.get(2).unwrap().card_ids, vec![21, 11]);
    }

    #[tokio::test]
    async fn test_rejected_delete_column_restores_cascade() {
        let (store, remote) = setup_board().await;

        remote.fail_next("forbidden").await;
        commands::delete_column(&store, &remote, 1)
            .await
            .expect_err("delete_column should be rejected");

        let state = store.kanban_snapshot().await;
        assert_eq!(state.columns.order(), &[1, 2]);
        assert_eq!(state.columns.get(1).unwrap().card_ids, vec![11, 12]);
        assert!(state.cards.get(11).is_some());
        assert!(state.cards.get(12).is_some());
    }

    #[tokio::test]
    async fn test_checklist_flow_tracks_completion() {
        let (store, remote) = setup_board().await;
        let checklist = commands::add_checklist(&store, &remote, 11, "QA")
            .await
            .expect("add_checklist failed");
        let first = commands::add_check_item(&store, &remote, 11, checklist.id, "unit")
            .await
            .expect("add_check_item failed");
        commands::add_check_item(&store, &remote, 11, checklist.id, "manual")
            .await
            .expect("add_check_item failed");

        commands::update_check_item(
            &store,
            &remote,
            11,
            checklist.id,
            first.id,
            None,
            Some(CheckItemState::Complete),
        )
        .await
        .expect("update_check_item failed");

        let state = store.kanban_snapshot().await;
        let card = state.cards.get(11).unwrap();
        assert_eq!(card.checklists[0].complete_percentage, 50);
        assert!(card.checklists[0].id < crate::store::PROVISIONAL_BASE);
        assert!(card.checklists[0].check_items[0].is_complete());
    }

    #[tokio::test]
    async fn test_add_comment_backfills_created_at() {
        let (store, remote) = setup_board().await;
        let comment = commands::add_comment(&store, &remote, 11, 7, "looks good")
            .await
            .expect("add_comment failed");
        assert!(comment.created_at.is_some());

        let state = store.kanban_snapshot().await;
        let stored = &state.cards.get(11).unwrap().comments[0];
        assert_eq!(stored.id, comment.id);
        assert_eq!(stored.created_at, comment.created_at);
    }

    /// A remote whose create confirmation lands after a competing bulk load
    struct ReloadingRemote<'a> {
        inner: &'a InMemoryRemote,
        store: &'a Store,
    }

    #[async_trait]
    impl Remote<Card> for ReloadingRemote<'_> {
        async fn create(&self, parent: Option<u32>, entity: &Card) -> DomainResult<Card> {
            let card = Remote::<Card>::create(self.inner, parent, entity).await?;
            let board = self.inner.board().await?;
            self.store
                .kanban()
                .await
                .load(board.columns, board.cards, board.members);
            Ok(card)
        }

        async fn update(&self, _id: u32, _patch: Value) -> DomainResult<Card> {
            unimplemented!()
        }

        async fn delete(&self, _id: u32) -> DomainResult<()> {
            unimplemented!()
        }

        async fn relocate(
            &self,
            _id: u32,
            _from_parent: Option<u32>,
            _to_parent: Option<u32>,
            _index: usize,
        ) -> DomainResult<()> {
            unimplemented!()
        }

        async fn list(&self) -> DomainResult<Vec<Card>> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn test_stale_confirmation_is_discarded() {
        let (store, remote) = setup_board().await;
        let reloading = ReloadingRemote {
            inner: &remote,
            store: &store,
        };

        let card = commands::create_card(&store, &reloading, 1, "draft")
            .await
            .expect("create_card failed");

        // the bulk load that raced the confirmation is authoritative: the
        // provisional entry is gone and the confirmation was not re-applied
        let state = store.kanban_snapshot().await;
        for id in state.cards.order() {
            assert!(*id < crate::store::PROVISIONAL_BASE);
        }
        // the server-side card exists (the reload brought it in), but only
        // via the load, at the position the server put it
        assert!(state.cards.get(card.id).is_some());
    }

    #[tokio::test]
    async fn test_mark_thread_seen_rejection_restores_counter() {
        let store = Store::new();
        let remote = InMemoryRemote::new();
        let mut thread = Thread::new(5, ThreadKind::OneToOne);
        thread.unread_count = 3;
        remote.seed_chat(Vec::new(), vec![thread]).await;
        commands::load_threads(&store, &remote)
            .await
            .expect("load_threads failed");

        remote.fail_next("offline").await;
        commands::mark_thread_as_seen(&store, &remote, 5)
            .await
            .expect_err("should be rejected");

        let state = store.chat_snapshot().await;
        assert_eq!(state.threads.get(5).unwrap().unread_count, 3);
    }

    #[tokio::test]
    async fn test_add_message_confirms_and_counts_unread() {
        let store = Store::new();
        let remote = InMemoryRemote::new();
        remote
            .seed_chat(
                vec![Contact::new(7, "Ada".to_string())],
                vec![Thread::new(5, ThreadKind::OneToOne), Thread::new(6, ThreadKind::Group)],
            )
            .await;
        commands::load_threads(&store, &remote)
            .await
            .expect("load_threads failed");
        commands::load_thread(&store, &remote, 5)
            .await
            .expect("load_thread failed");

        // active thread: no unread bump
        let message = commands::add_message(&store, &remote, 5, 7, "hello")
            .await
            .expect("add_message failed");
        assert!(message.created_at.is_some());

        // inactive thread: unread bump
        commands::add_message(&store, &remote, 6, 7, "ping")
            .await
            .expect("add_message failed");

        let state = store.chat_snapshot().await;
        assert_eq!(state.active_thread_id, Some(5));
        assert_eq!(state.threads.get(5).unwrap().unread_count, 0);
        assert_eq!(state.threads.get(6).unwrap().unread_count, 1);
        assert_eq!(state.threads.get(5).unwrap().messages[0].id, message.id);
    }

    #[tokio::test]
    async fn test_like_noop_never_reaches_remote() {
        let store = Store::new();
        let remote = InMemoryRemote::new();
        let mut post = Post::new(1, 7, "hello".to_string());
        post.likes = 10;
        post.is_liked = true;
        remote.seed_posts(vec![post]).await;
        commands::load_posts(&store, &remote)
            .await
            .expect("load_posts failed");

        // arm a failure: if the no-op like reached the remote it would trip
        remote.fail_next("boom").await;
        commands::set_post_liked(&store, &remote, 1, true)
            .await
            .expect("double like must be a local no-op");

        let state = store.social_snapshot().await;
        assert_eq!(state.posts.get(1).unwrap().likes, 10);

        // the armed failure is still pending, proving the remote was never hit
        commands::load_posts(&store, &remote)
            .await
            .expect_err("armed failure should still be pending");
    }

    #[tokio::test]
    async fn test_rejected_unlike_rolls_back() {
        let store = Store::new();
        let remote = InMemoryRemote::new();
        let mut post = Post::new(1, 7, "hello".to_string());
        post.likes = 10;
        post.is_liked = true;
        remote.seed_posts(vec![post]).await;
        commands::load_posts(&store, &remote)
            .await
            .expect("load_posts failed");

        remote.fail_next("offline").await;
        commands::set_post_liked(&store, &remote, 1, false)
            .await
            .expect_err("should be rejected");

        let state = store.social_snapshot().await;
        let post = state.posts.get(1).unwrap();
        assert_eq!(post.likes, 10);
        assert!(post.is_liked);
    }

    #[tokio::test]
    async fn test_load_emails_filters_by_label() {
        let store = Store::new();
        let remote = InMemoryRemote::new();
        let email = |id: u32, folder: &str| Email {
            id,
            from: "a@example.com".to_string(),
            to: vec!["b@example.com".to_string()],
            subject: format!("subject {}", id),
            message: String::new(),
            folder: folder.to_string(),
            is_unread: true,
            is_starred: false,
            is_important: false,
            created_at: None,
        };
        remote
            .seed_mail(
                vec![Label::new(1, "inbox".to_string())],
                vec![email(1, "inbox"), email(2, "archive"), email(3, "inbox")],
            )
            .await;

        commands::load_labels(&store, &remote)
            .await
            .expect("load_labels failed");
        commands::load_emails(&store, &remote, Some("inbox"))
            .await
            .expect("load_emails failed");

        let state = store.mail_snapshot().await;
        assert_eq!(state.labels.len(), 1);
        assert_eq!(state.emails.order(), &[1, 3]);

        let fetched = commands::load_email(&store, &remote, 2)
            .await
            .expect("load_email failed");
        assert!(fetched.is_some());
        let state = store.mail_snapshot().await;
        assert_eq!(state.emails.order(), &[1, 3, 2]);

        // a missing id is an empty read, not an error
        let missing = commands::load_email(&store, &remote, 99)
            .await
            .expect("missing email must not error");
        assert!(missing.is_none());
    }
}
