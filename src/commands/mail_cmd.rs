//! Mail Commands
//!
//! All read-side: the mailbox is loaded from the remote and browsed
//! locally.

use crate::domain::{DomainResult, Email};
use crate::remote::MailRemote;
use crate::store::Store;

/// Fetch and replace the label list
pub async fn load_labels<R: MailRemote>(store: &Store, remote: &R) -> DomainResult<()> {
    let labels = remote.labels().await?;
    store.mail().await.set_labels(labels);
    Ok(())
}

/// Fetch the emails under `label` (None for everything) and replace the
/// email table with the result
pub async fn load_emails<R: MailRemote>(store: &Store, remote: &R, label: Option<&str>) -> DomainResult<()> {
    let emails = remote.emails(label).await?;
    store.mail().await.set_emails(emails);
    Ok(())
}

/// Fetch a single email and upsert it. A missing id is an empty read, not
/// an error.
pub async fn load_email<R: MailRemote>(store: &Store, remote: &R, email_id: u32) -> DomainResult<Option<Email>> {
    let email = remote.email(email_id).await?;
    if let Some(email) = &email {
        store.mail().await.upsert_email(email.clone());
    }
    Ok(email)
}
