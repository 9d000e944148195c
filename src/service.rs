//! Contact directory service
//!
//! Owns the business rules on top of the storage collaborator: search
//! composition, input validation and the email uniqueness pre-check. The
//! pre-check only produces a friendly conflict early; the store re-checks
//! inside its write transaction and is the actual guard.

use std::sync::Arc;

use chrono::Utc;

use crate::cancel::CancelToken;
use crate::error::ServiceError;
use crate::model::{Contact, ContactDto, ContactInput, NewContact};
use crate::query::{ContactQuery, PagedResult, SearchCriteria};
use crate::store::ContactStore;
use crate::validation::validate_contact;

pub type Result<T> = std::result::Result<T, ServiceError>;

pub struct ContactService {
    store: Arc<dyn ContactStore>,
}

impl ContactService {
    pub fn new(store: Arc<dyn ContactStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn ContactStore {
        self.store.as_ref()
    }

    /// Filtered, sorted, paginated contacts
    ///
    /// Pages past the end come back empty, never as an error.
    pub fn search(
        &self,
        criteria: &SearchCriteria,
        cancel: &CancelToken,
    ) -> Result<PagedResult<ContactDto>> {
        let query = ContactQuery::from_criteria(criteria)?;
        ensure_active(cancel)?;

        let contacts = self.store.all()?;
        ensure_active(cancel)?;

        let page = query.run(contacts);
        tracing::info!(
            "Retrieved {} contacts (page {}/{})",
            page.items.len(),
            page.page_number,
            page.total_pages
        );

        Ok(page.map(ContactDto::from))
    }

    pub fn get_by_id(&self, id: u64, cancel: &CancelToken) -> Result<Option<ContactDto>> {
        ensure_active(cancel)?;

        let contact = self.store.get(id)?;
        if contact.is_none() {
            tracing::warn!(contact_id = id, "contact not found");
        }
        Ok(contact.map(ContactDto::from))
    }

    pub fn create(&self, input: &ContactInput, cancel: &CancelToken) -> Result<ContactDto> {
        let fields = validate_contact(input)?;
        ensure_active(cancel)?;

        if self.email_exists(&fields.email, None, cancel)? {
            tracing::warn!(email = %fields.email, "attempt to create contact with existing email");
            return Err(ServiceError::Conflict {
                email: fields.email,
            });
        }

        let now = Utc::now();
        let created = self.store.insert(
            NewContact {
                first_name: fields.first_name,
                last_name: fields.last_name,
                email: fields.email,
                phone_number: fields.phone_number,
                address: fields.address,
                created_at: now,
                updated_at: now,
            },
            cancel,
        )?;

        tracing::info!(
            contact_id = created.id,
            email = %created.email,
            "created contact"
        );
        Ok(created.into())
    }

    /// Replaces every mutable field; `None` when the id does not exist
    pub fn update(
        &self,
        id: u64,
        input: &ContactInput,
        cancel: &CancelToken,
    ) -> Result<Option<ContactDto>> {
        ensure_active(cancel)?;

        let Some(existing) = self.store.get(id)? else {
            tracing::warn!(contact_id = id, "attempt to update non-existent contact");
            return Ok(None);
        };

        let fields = validate_contact(input)?;

        if self.email_exists(&fields.email, Some(id), cancel)? {
            tracing::warn!(
                contact_id = id,
                email = %fields.email,
                "attempt to update contact with existing email"
            );
            return Err(ServiceError::Conflict {
                email: fields.email,
            });
        }

        let updated = Contact {
            id: existing.id,
            first_name: fields.first_name,
            last_name: fields.last_name,
            email: fields.email,
            phone_number: fields.phone_number,
            address: fields.address,
            created_at: existing.created_at,
            updated_at: Utc::now().max(existing.created_at),
        };

        if !self.store.update(&updated, cancel)? {
            tracing::warn!(contact_id = id, "contact removed before update was applied");
            return Ok(None);
        }

        tracing::info!(contact_id = id, "updated contact");
        Ok(Some(updated.into()))
    }

    /// Returns whether a contact was removed
    pub fn delete(&self, id: u64, cancel: &CancelToken) -> Result<bool> {
        ensure_active(cancel)?;

        let deleted = self.store.delete(id, cancel)?;
        if deleted {
            tracing::info!(contact_id = id, "deleted contact");
        } else {
            tracing::warn!(contact_id = id, "attempt to delete non-existent contact");
        }
        Ok(deleted)
    }

    /// Case-insensitive email lookup, optionally ignoring one contact
    pub fn email_exists(
        &self,
        email: &str,
        exclude_id: Option<u64>,
        cancel: &CancelToken,
    ) -> Result<bool> {
        ensure_active(cancel)?;

        let owner = self.store.find_id_by_email(email)?;
        Ok(match (owner, exclude_id) {
            (Some(owner_id), Some(excluded)) => owner_id != excluded,
            (Some(_), None) => true,
            (None, _) => false,
        })
    }
}

fn ensure_active(cancel: &CancelToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(ServiceError::Cancelled);
    }
    Ok(())
}
