//! Database initialization and table definitions
//!
//! This module handles the setup of the embedded redb database, defines the
//! tables the contact store works with and holds the shared application state.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use redb::{Database, TableDefinition};

use crate::cancel::CancelToken;
use crate::error::StoreError;
use crate::model::NewContact;
use crate::service::ContactService;
use crate::store::{ContactStore, RedbContactStore};

/// Main table for storing contacts
///
/// Key: contact id
/// Value: JSON-serialized `Contact`
///
/// Example:
/// - Key: 42
/// - Value: '{"id":42,"first_name":"Ada","last_name":"Lovelace",...}'
pub const TABLE_CONTACTS: TableDefinition<u64, &str> = TableDefinition::new("contacts_v1");

/// Unique index on email
///
/// Key: trimmed, lowercased email
/// Value: id of the contact holding it
///
/// An email can only appear once as a key, which is what enforces
/// case-insensitive uniqueness at the storage level.
pub const TABLE_EMAIL_INDEX: TableDefinition<&str, u64> =
    TableDefinition::new("contacts_email_idx_v1");

/// Monotonic id sequences
///
/// Key: sequence name
/// Value: last issued id
pub const TABLE_SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences_v1");

pub const CONTACT_SEQUENCE: &str = "contacts";

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ContactService>,
}

impl AppState {
    /// Wires the redb-backed store into a directory service
    pub fn new(db: Database) -> Self {
        let store = RedbContactStore::new(Arc::new(db));
        Self {
            service: Arc::new(ContactService::new(Arc::new(store))),
        }
    }
}

/// Initializes the embedded database and creates required tables
///
/// # Arguments
///
/// * `db_path` - File path where the database should be stored (e.g., "contacts.db")
///
/// # Example
///
/// ```no_run
/// # use contact_directory::database::init_db;
/// let db = init_db("contacts.db").expect("Failed to initialize database");
/// ```
pub fn init_db(db_path: &str) -> Result<Database, redb::Error> {
    let db = Database::create(db_path)?;

    let write_txn = db.begin_write()?;
    {
        write_txn.open_table(TABLE_CONTACTS)?;
        write_txn.open_table(TABLE_EMAIL_INDEX)?;
        write_txn.open_table(TABLE_SEQUENCES)?;
    }
    write_txn.commit()?;

    Ok(db)
}

/// Inserts the demo contacts when the store is empty
///
/// Returns how many contacts were inserted.
pub fn seed_demo_data(store: &dyn ContactStore) -> Result<usize, StoreError> {
    if store.count()? > 0 {
        return Ok(0);
    }

    let cancel = CancelToken::new();
    let seeds = [
        ("Alhassane", "TRAORE", "alh@email.com", Some("75632299"), Some("Djana"), 1),
        ("Mariam", "CISSE", "mcisse@email.com", Some("987654321"), Some("79653399"), 10),
        ("Salimata", "SIDIBE", "sali@email.com", Some("0147258369"), None, 20),
    ];

    for (first_name, last_name, email, phone, address, day) in seeds {
        let at = Utc
            .with_ymd_and_hms(2024, 1, day, 12, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        store.insert(
            NewContact {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                email: email.to_string(),
                phone_number: phone.map(str::to_string),
                address: address.map(str::to_string),
                created_at: at,
                updated_at: at,
            },
            &cancel,
        )?;
    }

    tracing::info!(count = seeds.len(), "seeded demo contacts");
    Ok(seeds.len())
}
