//! Traits, enumerations and structs for company contacts.

use std::error::Error as StdError;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// The item content.
#[derive(Clone, Debug, PartialEq)]
pub struct Contact {
    pub contact_id: String,
    pub tenant_id: String,
    pub company_id: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub modified_by: Option<String>,
    pub fields: Map<String, Value>,
}

/// The update fields.
pub struct Updates<'a> {
    pub fields: &'a Map<String, Value>,
    pub modified_at: DateTime<Utc>,
    pub modified_by: Option<&'a str>,
}

/// Model operations.
#[async_trait]
pub trait ContactModel: Sync {
    /// To create and initialize the table/collection.
    async fn init(&self) -> Result<(), Box<dyn StdError>>;

    /// To get all contacts of the tenant in creation order.
    async fn list(&self, tenant_id: &str) -> Result<Vec<Contact>, Box<dyn StdError>>;

    /// To get an item of the tenant.
    async fn get(&self, tenant_id: &str, contact_id: &str)
    -> Result<Option<Contact>, Box<dyn StdError>>;

    /// To replace all contacts of the tenant with the specified contacts in one transaction.
    async fn replace_all(
        &self,
        tenant_id: &str,
        contacts: &[Contact],
    ) -> Result<(), Box<dyn StdError>>;

    /// To add an item.
    async fn add(&self, contact: &Contact) -> Result<(), Box<dyn StdError>>;

    /// To update an item. Returns `false` if the item does not exist.
    async fn update(
        &self,
        tenant_id: &str,
        contact_id: &str,
        updates: &Updates,
    ) -> Result<bool, Box<dyn StdError>>;

    /// To delete an item. Returns `false` if the item does not exist.
    async fn del(&self, tenant_id: &str, contact_id: &str) -> Result<bool, Box<dyn StdError>>;

    /// To make the contact the only default contact of the tenant. Returns `false` if the item
    /// does not exist.
    async fn set_default(&self, tenant_id: &str, contact_id: &str)
    -> Result<bool, Box<dyn StdError>>;
}

/// Keeps the default flag on the first flagged contact only.
pub fn normalize_default(contacts: &mut [Contact]) {
    let mut found = false;
    for contact in contacts.iter_mut() {
        if contact.is_default {
            if found {
                contact.is_default = false;
            }
            found = true;
        }
    }
}
