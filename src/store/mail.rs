//! Mail State

use entity_table::EntityTable;

use crate::domain::{Email, Label};

#[derive(Debug, Clone, Default)]
pub struct MailState {
    pub emails: EntityTable<Email>,
    pub labels: Vec<Label>,
    epoch: u64,
}

impl MailState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Replace the label list. Bumps the epoch.
    pub fn set_labels(&mut self, labels: Vec<Label>) {
        self.labels = labels;
        self.epoch += 1;
    }

    /// Replace the email table (the result of a folder/label query).
    /// Bumps the epoch.
    pub fn set_emails(&mut self, emails: Vec<Email>) {
        self.emails = EntityTable::from_entities(emails);
        self.epoch += 1;
    }

    /// Upsert a single fetched email; new ids are appended
    pub fn upsert_email(&mut self, email: Email) {
        self.emails.upsert(email);
    }
}
