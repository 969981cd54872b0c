//! Traits, enumerations and structs for company information. There is one document per tenant.

use std::error::Error as StdError;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// The item content.
#[derive(Clone, Debug, PartialEq)]
pub struct Company {
    pub company_id: String,
    pub tenant_id: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub modified_by: Option<String>,
    pub fields: Map<String, Value>,
}

/// Model operations.
#[async_trait]
pub trait CompanyModel: Sync {
    /// To create and initialize the table/collection.
    async fn init(&self) -> Result<(), Box<dyn StdError>>;

    /// To get the company of the tenant.
    async fn get(&self, tenant_id: &str) -> Result<Option<Company>, Box<dyn StdError>>;

    /// To create or update the company of the tenant and returns its identifier. The creation
    /// time is only set when the document is created.
    async fn upsert(
        &self,
        tenant_id: &str,
        fields: &Map<String, Value>,
        modified_at: DateTime<Utc>,
        modified_by: &str,
    ) -> Result<String, Box<dyn StdError>>;
}
