//! Data models for the contact directory
//!
//! This module defines the stored contact record, the shapes accepted from
//! callers and the shapes returned to them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A contact as persisted by the storage collaborator
///
/// Stored as JSON in the `contacts_v1` table, keyed by `id`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    /// Storage-assigned identifier, never reused or changed
    pub id: u64,

    pub first_name: String,

    pub last_name: String,

    /// Unique across all contacts, compared case-insensitively
    pub email: String,

    pub phone_number: Option<String>,

    pub address: Option<String>,

    /// Set once when the contact is created
    pub created_at: DateTime<Utc>,

    /// Set at creation and on every successful update
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    /// Always derived from the name parts, never stored
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A validated contact that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewContact {
    pub fn into_contact(self, id: u64) -> Contact {
        Contact {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone_number: self.phone_number,
            address: self.address,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Request payload for creating or replacing a contact
///
/// Every field is optional on the wire: missing or `null` values reach
/// validation, which reports all of them instead of failing on the first.
///
/// # Example
/// ```json
/// {
///   "firstName": "Ada",
///   "lastName": "Lovelace",
///   "email": "ada@example.com",
///   "phoneNumber": "+44 20 7946 0000",
///   "address": "12 St James's Square, London"
/// }
/// ```
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

/// Contact shape returned to callers, including the derived full name
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContactDto {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Contact> for ContactDto {
    fn from(contact: Contact) -> Self {
        let full_name = contact.full_name();
        Self {
            id: contact.id,
            first_name: contact.first_name,
            last_name: contact.last_name,
            full_name,
            email: contact.email,
            phone_number: contact.phone_number,
            address: contact.address,
            created_at: contact.created_at,
            updated_at: contact.updated_at,
        }
    }
}

/// Query parameters for searching contacts
///
/// # Example
/// Query string: `?searchTerm=ada&pageNumber=2&pageSize=20&sortBy=email&sortOrder=desc`
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Free-text term matched against first name, last name and email
    pub search_term: Option<String>,

    /// Page number, starts from 1 (default: 1)
    pub page_number: Option<i64>,

    /// Items per page (default: 10, clamped to 100)
    pub page_size: Option<i64>,

    /// firstName, lastName, email or createdAt (default: lastName)
    pub sort_by: Option<String>,

    /// asc or desc (default: asc)
    pub sort_order: Option<String>,
}

/// Query parameters for the email availability check
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EmailExistsParams {
    pub email: String,

    /// Contact to ignore, typically the one being edited
    pub exclude_id: Option<u64>,
}

/// Response of the email availability check
#[derive(Serialize, Deserialize, Debug)]
pub struct EmailExistsResponse {
    pub email: String,
    pub exists: bool,
}

#[cfg(test)]
mod tests {
    use super::{Contact, ContactDto, ContactInput};
    use chrono::Utc;

    fn contact() -> Contact {
        let now = Utc::now();
        Contact {
            id: 7,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone_number: None,
            address: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn full_name_joins_name_parts() {
        assert_eq!(contact().full_name(), "Ada Lovelace");
    }

    #[test]
    fn dto_serializes_camel_case_with_full_name() {
        let dto = ContactDto::from(contact());
        let value = serde_json::to_value(&dto).unwrap();
        assert_eq!(value["fullName"], "Ada Lovelace");
        assert_eq!(value["firstName"], "Ada");
        assert!(value["phoneNumber"].is_null());
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn input_accepts_null_and_missing_fields() {
        let input: ContactInput =
            serde_json::from_str(r#"{"firstName":null,"lastName":"B"}"#).unwrap();
        assert_eq!(input.first_name, None);
        assert_eq!(input.last_name.as_deref(), Some("B"));
        assert_eq!(input.email, None);
    }
}
