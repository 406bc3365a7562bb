//! Social Feed Commands

use crate::domain::{DomainResult, PostComment};
use crate::remote::SocialRemote;
use crate::store::Store;

/// Fetch and replace the feed
pub async fn load_posts<R: SocialRemote>(store: &Store, remote: &R) -> DomainResult<()> {
    let posts = remote.posts().await?;
    store.social().await.set_posts(posts);
    Ok(())
}

/// Like or unlike a post. The flag is authoritative: a toggle that would
/// not change it is a local no-op and never reaches the remote.
pub async fn set_post_liked<R: SocialRemote>(
    store: &Store,
    remote: &R,
    post_id: u32,
    liked: bool,
) -> DomainResult<()> {
    let epoch = {
        let mut state = store.social().await;
        let changed = state.set_post_liked(post_id, liked)?;
        if !changed {
            return Ok(());
        }
        state.epoch()
    };

    match remote.set_post_liked(post_id, liked).await {
        Ok(()) => Ok(()),
        Err(err) => {
            let mut state = store.social().await;
            if state.epoch() == epoch {
                let _ = state.set_post_liked(post_id, !liked);
            }
            log::warn!("set_post_liked {} rejected, rolled back: {}", post_id, err);
            Err(err)
        }
    }
}

/// Like or unlike a comment under a post
pub async fn set_comment_liked<R: SocialRemote>(
    store: &Store,
    remote: &R,
    post_id: u32,
    comment_id: u32,
    liked: bool,
) -> DomainResult<()> {
    let epoch = {
        let mut state = store.social().await;
        let changed = state.set_comment_liked(post_id, comment_id, liked)?;
        if !changed {
            return Ok(());
        }
        state.epoch()
    };

    match remote.set_comment_liked(post_id, comment_id, liked).await {
        Ok(()) => Ok(()),
        Err(err) => {
            let mut state = store.social().await;
            if state.epoch() == epoch {
                let _ = state.set_comment_liked(post_id, comment_id, !liked);
            }
            log::warn!("set_comment_liked {} rejected, rolled back: {}", comment_id, err);
            Err(err)
        }
    }
}

/// Comment on a post. The confirmation backfills the server-assigned id and
/// `created_at`.
pub async fn add_post_comment<R: SocialRemote>(
    store: &Store,
    remote: &R,
    post_id: u32,
    author_id: u32,
    message: &str,
) -> DomainResult<PostComment> {
    let (provisional, epoch) = {
        let mut state = store.social().await;
        let id = state.provisional_id();
        state.add_comment(
            post_id,
            PostComment {
                id,
                author_id,
                message: message.to_string(),
                likes: 0,
                is_liked: false,
                created_at: None,
            },
        )?;
        (id, state.epoch())
    };

    match remote.add_comment(post_id, author_id, message).await {
        Ok(canonical) => {
            let mut state = store.social().await;
            if state.epoch() != epoch {
                log::debug!("discarding stale add_post_comment confirmation");
                return Ok(canonical);
            }
            state.confirm_comment(post_id, provisional, canonical.clone())?;
            Ok(canonical)
        }
        Err(err) => {
            let mut state = store.social().await;
            if state.epoch() == epoch {
                let _ = state.remove_comment(post_id, provisional);
            }
            log::warn!("add_post_comment rejected, rolled back: {}", err);
            Err(err)
        }
    }
}
