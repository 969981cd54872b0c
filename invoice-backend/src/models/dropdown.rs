//! Traits, enumerations and structs for global dropdown values.

use std::error::Error as StdError;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// The item content.
#[derive(Clone, Debug, PartialEq)]
pub struct Dropdown {
    pub dropdown_id: String,
    /// The dropdown group such as `gst_type`.
    pub dropdown_type: String,
    pub value: String,
    pub label: String,
    /// Locked items cannot be deleted, and can only be modified by unlocking them.
    pub is_locked: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub modified_by: Option<String>,
}

/// The update fields by using [`Some`]s.
#[derive(Default)]
pub struct Updates<'a> {
    pub dropdown_type: Option<&'a str>,
    pub value: Option<&'a str>,
    pub label: Option<&'a str>,
    pub is_locked: Option<bool>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<&'a str>,
}

/// Model operations.
#[async_trait]
pub trait DropdownModel: Sync {
    /// To create and initialize the table/collection.
    async fn init(&self) -> Result<(), Box<dyn StdError>>;

    /// To get all items sorted by type and label.
    async fn list(&self) -> Result<Vec<Dropdown>, Box<dyn StdError>>;

    /// To get items of one type sorted by label.
    async fn list_by_type(&self, dropdown_type: &str) -> Result<Vec<Dropdown>, Box<dyn StdError>>;

    /// To get an item.
    async fn get(&self, dropdown_id: &str) -> Result<Option<Dropdown>, Box<dyn StdError>>;

    /// To add an item.
    async fn add(&self, dropdown: &Dropdown) -> Result<(), Box<dyn StdError>>;

    /// To update an item. Returns `false` if the item does not exist.
    async fn update(&self, dropdown_id: &str, updates: &Updates)
    -> Result<bool, Box<dyn StdError>>;

    /// To delete an item. Returns `false` if the item does not exist.
    async fn del(&self, dropdown_id: &str) -> Result<bool, Box<dyn StdError>>;
}
