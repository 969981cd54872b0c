//! Traits, enumerations and structs for users.

use std::{collections::HashMap, error::Error as StdError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// The item content.
#[derive(Clone, Debug, PartialEq)]
pub struct User {
    pub user_id: String,
    /// Lower-case user name.
    pub username: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub roles: HashMap<String, bool>,
    pub password: String,
    pub salt: String,
    pub tenant_id: String,
    pub is_active: bool,
}

/// The query condition to get item(s).
#[derive(Default)]
pub struct QueryCond<'a> {
    pub user_id: Option<&'a str>,
    pub username: Option<&'a str>,
}

/// The update fields by using [`Some`]s.
#[derive(Default)]
pub struct Updates<'a> {
    pub modified_at: Option<DateTime<Utc>>,
    pub email: Option<Option<&'a str>>,
    pub roles: Option<&'a HashMap<String, bool>>,
    pub password: Option<String>,
    pub salt: Option<String>,
    pub tenant_id: Option<&'a str>,
    pub is_active: Option<bool>,
}

/// Model operations.
#[async_trait]
pub trait UserModel: Sync {
    /// To create and initialize the table/collection.
    async fn init(&self) -> Result<(), Box<dyn StdError>>;

    /// To get an item.
    async fn get(&self, cond: &QueryCond) -> Result<Option<User>, Box<dyn StdError>>;

    /// To get the earliest created users.
    async fn list_recent(&self, limit: u64) -> Result<Vec<User>, Box<dyn StdError>>;

    /// To add an item. A duplicate user name is rejected by the unique index.
    async fn add(&self, user: &User) -> Result<(), Box<dyn StdError>>;

    /// To update an item.
    async fn update(&self, user_id: &str, updates: &Updates) -> Result<(), Box<dyn StdError>>;
}
