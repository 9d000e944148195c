//! Storage collaborator for contacts
//!
//! `ContactStore` is the seam between the directory service and durable
//! storage. `RedbContactStore` implements it on the embedded redb database
//! and is the authority for email uniqueness: every insert and update
//! re-checks the email index inside the same write transaction that changes
//! the contact, and redb only runs one write transaction at a time.

use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, WriteTransaction};

use crate::cancel::CancelToken;
use crate::database::{CONTACT_SEQUENCE, TABLE_CONTACTS, TABLE_EMAIL_INDEX, TABLE_SEQUENCES};
use crate::error::StoreError;
use crate::model::{Contact, NewContact};

pub type Result<T> = std::result::Result<T, StoreError>;

/// Durable CRUD over contacts with a case-insensitive unique email
pub trait ContactStore: Send + Sync {
    /// Every stored contact, in ascending id order
    fn all(&self) -> Result<Vec<Contact>>;

    fn get(&self, id: u64) -> Result<Option<Contact>>;

    /// Id of the contact holding `email`, compared case-insensitively
    fn find_id_by_email(&self, email: &str) -> Result<Option<u64>>;

    fn count(&self) -> Result<u64>;

    /// Assigns the next id and persists the contact
    ///
    /// Fails with `StoreError::DuplicateEmail` if the email is already held.
    fn insert(&self, contact: NewContact, cancel: &CancelToken) -> Result<Contact>;

    /// Replaces the stored contact with the same id
    ///
    /// Returns `false` when no contact has that id.
    fn update(&self, contact: &Contact, cancel: &CancelToken) -> Result<bool>;

    /// Returns `false` when no contact has that id
    fn delete(&self, id: u64, cancel: &CancelToken) -> Result<bool>;
}

/// Key used in the email index
pub fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Clone)]
pub struct RedbContactStore {
    db: Arc<Database>,
}

impl RedbContactStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl ContactStore for RedbContactStore {
    fn all(&self) -> Result<Vec<Contact>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_CONTACTS)?;

        let mut contacts = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            contacts.push(serde_json::from_str::<Contact>(value.value())?);
        }
        Ok(contacts)
    }

    fn get(&self, id: u64) -> Result<Option<Contact>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_CONTACTS)?;

        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_str(value.value())?)),
            None => Ok(None),
        }
    }

    fn find_id_by_email(&self, email: &str) -> Result<Option<u64>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_EMAIL_INDEX)?;

        let key = email_key(email);
        Ok(table.get(key.as_str())?.map(|guard| guard.value()))
    }

    fn count(&self) -> Result<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_CONTACTS)?;
        Ok(table.len()?)
    }

    fn insert(&self, contact: NewContact, cancel: &CancelToken) -> Result<Contact> {
        let write_txn = self.db.begin_write()?;
        let created = {
            let mut contacts = write_txn.open_table(TABLE_CONTACTS)?;
            let mut emails = write_txn.open_table(TABLE_EMAIL_INDEX)?;
            let mut sequences = write_txn.open_table(TABLE_SEQUENCES)?;

            let key = email_key(&contact.email);
            if emails.get(key.as_str())?.is_some() {
                return Err(StoreError::DuplicateEmail(contact.email));
            }

            let last_id = sequences
                .get(CONTACT_SEQUENCE)?
                .map(|guard| guard.value())
                .unwrap_or(0);
            let id = last_id + 1;
            sequences.insert(CONTACT_SEQUENCE, id)?;

            let created = contact.into_contact(id);
            let record_json = serde_json::to_string(&created)?;
            contacts.insert(id, record_json.as_str())?;
            emails.insert(key.as_str(), id)?;
            created
        };

        commit_unless_cancelled(write_txn, cancel)?;
        Ok(created)
    }

    fn update(&self, contact: &Contact, cancel: &CancelToken) -> Result<bool> {
        let write_txn = self.db.begin_write()?;
        {
            let mut contacts = write_txn.open_table(TABLE_CONTACTS)?;
            let mut emails = write_txn.open_table(TABLE_EMAIL_INDEX)?;

            let previous_json = contacts.get(contact.id)?.map(|guard| guard.value().to_string());
            let previous: Contact = match previous_json {
                Some(json) => serde_json::from_str(&json)?,
                None => return Ok(false),
            };

            let new_key = email_key(&contact.email);
            let owner = emails.get(new_key.as_str())?.map(|guard| guard.value());
            if matches!(owner, Some(owner_id) if owner_id != contact.id) {
                return Err(StoreError::DuplicateEmail(contact.email.clone()));
            }

            let old_key = email_key(&previous.email);
            if old_key != new_key {
                emails.remove(old_key.as_str())?;
                emails.insert(new_key.as_str(), contact.id)?;
            }

            let record_json = serde_json::to_string(contact)?;
            contacts.insert(contact.id, record_json.as_str())?;
        }

        commit_unless_cancelled(write_txn, cancel)?;
        Ok(true)
    }

    fn delete(&self, id: u64, cancel: &CancelToken) -> Result<bool> {
        let write_txn = self.db.begin_write()?;
        {
            let mut contacts = write_txn.open_table(TABLE_CONTACTS)?;
            let mut emails = write_txn.open_table(TABLE_EMAIL_INDEX)?;

            let removed_json = contacts.remove(id)?.map(|guard| guard.value().to_string());
            let removed: Contact = match removed_json {
                Some(json) => serde_json::from_str(&json)?,
                None => return Ok(false),
            };

            let key = email_key(&removed.email);
            emails.remove(key.as_str())?;
        }

        commit_unless_cancelled(write_txn, cancel)?;
        Ok(true)
    }
}

/// Commits `write_txn`, or aborts it if the caller has been cancelled
fn commit_unless_cancelled(write_txn: WriteTransaction, cancel: &CancelToken) -> Result<()> {
    if cancel.is_cancelled() {
        write_txn.abort()?;
        return Err(StoreError::Cancelled);
    }
    write_txn.commit()?;
    Ok(())
}
