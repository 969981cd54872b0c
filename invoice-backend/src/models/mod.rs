//! Traits and implementations for accessing databases.
//!
//! Currently we only provide pure MongoDB implementation. Each collection is accessed through its
//! own trait so that tests and other engines can provide their own implementations.

use std::{error::Error as StdError, sync::Arc};

use async_trait::async_trait;
use bson::oid::ObjectId;

pub mod activity_log;
pub mod company;
pub mod contact;
pub mod document_rules;
pub mod dropdown;
pub mod expense;
pub mod record;
pub mod user;

mod model_mongodb;
mod mongodb;

pub use self::mongodb::conn::{self as mongodb_conn, Options as MongoDbOptions};
pub use model_mongodb::Model as MongoDbModel;

/// Database connection options for model implementation.
pub enum ConnOptions {
    /// Pure MongoDB model implementation.
    MongoDB(MongoDbOptions),
}

/// The top level trait to get all models (tables/collections).
#[async_trait]
pub trait Model: Send + Sync {
    /// Close database connection.
    async fn close(&self) -> Result<(), Box<dyn StdError>>;

    /// To get the user model.
    fn user(&self) -> &dyn user::UserModel;

    /// To get the global dropdown model.
    fn dropdown(&self) -> &dyn dropdown::DropdownModel;

    /// To get the customer model.
    fn customer(&self) -> &dyn record::RecordModel;

    /// To get the vendor model.
    fn vendor(&self) -> &dyn record::RecordModel;

    /// To get the staff model.
    fn staff(&self) -> &dyn record::RecordModel;

    /// To get the chart of accounts model.
    fn account(&self) -> &dyn record::RecordModel;

    /// To get the expense model.
    fn expense(&self) -> &dyn expense::ExpenseModel;

    /// To get the company information model.
    fn company(&self) -> &dyn company::CompanyModel;

    /// To get the contact model.
    fn contact(&self) -> &dyn contact::ContactModel;

    /// To get the global document rules model.
    fn document_rules(&self) -> &dyn document_rules::DocumentRulesModel;

    /// To get the activity log model.
    fn activity_log(&self) -> &dyn activity_log::ActivityLogModel;
}

/// To create the database model with the specified database implementation.
pub async fn new(opts: &ConnOptions) -> Result<Arc<dyn Model>, Box<dyn StdError>> {
    let model: Arc<dyn Model> = match opts {
        ConnOptions::MongoDB(opts) => Arc::new(MongoDbModel::new(opts).await?),
    };
    model.user().init().await?;
    model.dropdown().init().await?;
    model.customer().init().await?;
    model.vendor().init().await?;
    model.staff().init().await?;
    model.account().init().await?;
    model.expense().init().await?;
    model.company().init().await?;
    model.contact().init().await?;
    model.document_rules().init().await?;
    model.activity_log().init().await?;
    Ok(model)
}

/// To generate a new item identifier (24 hexadecimal characters).
pub fn new_id() -> String {
    ObjectId::new().to_hex()
}

/// To check if the string is a valid item identifier.
pub fn is_id(value: &str) -> bool {
    ObjectId::parse_str(value).is_ok()
}
