use async_trait::async_trait;
use uuid::Uuid;

use crate::country::Country;
use crate::error::ContactResult;
use crate::models::{Contact, ContactQuery};

/// Repository trait for Contact persistence
///
/// Phones handed to the repository are already normalized; uniqueness is
/// enforced by the store and surfaces as [`ContactError::Duplicate`](crate::ContactError::Duplicate).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Insert a new contact
    async fn insert(&self, contact: Contact) -> ContactResult<Contact>;

    /// Get a contact by ID
    async fn get_by_id(&self, id: Uuid) -> ContactResult<Option<Contact>>;

    /// One page of contacts, newest first
    async fn list(&self, query: ContactQuery) -> ContactResult<Vec<Contact>>;

    /// Count contacts matching a query (paging fields are ignored)
    async fn count(&self, query: ContactQuery) -> ContactResult<u64>;

    /// Replace a stored contact
    async fn replace(&self, contact: Contact) -> ContactResult<Contact>;

    /// Delete a contact; `false` if nothing was deleted
    async fn delete(&self, id: Uuid) -> ContactResult<bool>;

    /// Phone numbers stored for a country
    async fn phones_by_country(&self, country: Country) -> ContactResult<Vec<String>>;
}
