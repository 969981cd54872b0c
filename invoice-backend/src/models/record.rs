//! Traits, enumerations and structs for free-form business records.
//!
//! Customers, vendors, staff and chart of accounts share this model. Each collection gets its own
//! instance. The business content is kept in [`Record::fields`] and the model only owns the
//! metadata keys listed in [`RESERVED_KEYS`].

use std::error::Error as StdError;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Keys that are managed by the model and never taken from [`Record::fields`].
pub const RESERVED_KEYS: [&'static str; 5] =
    ["_id", "tenantId", "createdAt", "modifiedAt", "modifiedBy"];

/// The item content.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub record_id: String,
    pub tenant_id: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub modified_by: Option<String>,
    pub fields: Map<String, Value>,
}

/// The query condition for the list.
#[derive(Default)]
pub struct ListQueryCond<'a> {
    pub tenant_id: &'a str,
    /// Case-insensitive sub-string search across the specified fields (dotted paths supported).
    pub search: Option<(&'a str, &'a [&'a str])>,
    /// Fields that must equal to the values.
    pub equals: Vec<(&'a str, Value)>,
    /// Fields that must not equal to the values.
    pub not_equals: Vec<(&'a str, Value)>,
}

/// List sort conditions.
pub struct SortCond<'a> {
    pub key: &'a str,
    pub asc: bool,
}

/// List options.
pub struct ListOptions<'a> {
    pub cond: &'a ListQueryCond<'a>,
    pub offset: Option<u64>,
    /// `None` to get all items.
    pub limit: Option<u64>,
    pub sort: Option<&'a [SortCond<'a>]>,
}

/// The update fields.
pub struct Updates<'a> {
    /// Fields to be set. A `null` value stores `null`.
    pub fields: &'a Map<String, Value>,
    pub modified_at: DateTime<Utc>,
    pub modified_by: Option<&'a str>,
}

/// Model operations.
#[async_trait]
pub trait RecordModel: Sync {
    /// To create and initialize the table/collection.
    async fn init(&self) -> Result<(), Box<dyn StdError>>;

    /// To get item count for the query condition.
    async fn count(&self, cond: &ListQueryCond) -> Result<u64, Box<dyn StdError>>;

    /// To get item list.
    async fn list(&self, opts: &ListOptions) -> Result<Vec<Record>, Box<dyn StdError>>;

    /// To get an item of the tenant.
    async fn get(&self, tenant_id: &str, record_id: &str)
    -> Result<Option<Record>, Box<dyn StdError>>;

    /// To add an item.
    async fn add(&self, record: &Record) -> Result<(), Box<dyn StdError>>;

    /// To update an item. Returns `false` if the item does not exist.
    async fn update(
        &self,
        tenant_id: &str,
        record_id: &str,
        updates: &Updates,
    ) -> Result<bool, Box<dyn StdError>>;

    /// To delete an item. Returns `false` if the item does not exist.
    async fn del(&self, tenant_id: &str, record_id: &str) -> Result<bool, Box<dyn StdError>>;
}
