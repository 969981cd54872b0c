//! Traits, enumerations and structs for the activity log.

use std::error::Error as StdError;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// The item content.
#[derive(Clone, Debug, PartialEq)]
pub struct Activity {
    pub timestamp: DateTime<Utc>,
    /// Action type such as `CREATE_EXPENSE`.
    pub action_type: String,
    /// The user name who did the action.
    pub user: String,
    pub details: String,
    pub tenant_id: String,
    pub document_id: Option<String>,
    pub collection_name: Option<String>,
}

/// Model operations.
#[async_trait]
pub trait ActivityLogModel: Sync {
    /// To create and initialize the table/collection.
    async fn init(&self) -> Result<(), Box<dyn StdError>>;

    /// To add an item.
    async fn add(&self, activity: &Activity) -> Result<(), Box<dyn StdError>>;
}
