use std::{error::Error as StdError, sync::Arc};

use async_trait::async_trait;
use bson::{DateTime, Document, doc};
use mongodb::Database;

use super::{
    super::activity_log::{Activity, ActivityLogModel},
    parse_id,
};

/// Model instance.
pub struct Model {
    /// The associated database connection.
    conn: Arc<Database>,
}

const COL_NAME: &'static str = "activity_log";

impl Model {
    /// To create the model instance with a database connection.
    pub async fn new(conn: Arc<Database>) -> Result<Self, Box<dyn StdError>> {
        let model = Model { conn };
        model.init().await?;
        Ok(model)
    }
}

#[async_trait]
impl ActivityLogModel for Model {
    async fn init(&self) -> Result<(), Box<dyn StdError>> {
        let indexes = vec![
            doc! {"name": "timestamp_1", "key": {"timestamp": 1}},
            doc! {"name": "tenant_id_1", "key": {"tenant_id": 1}},
        ];
        let command = doc! {
            "createIndexes": COL_NAME,
            "indexes": indexes,
        };
        self.conn.run_command(command).await?;
        Ok(())
    }

    async fn add(&self, activity: &Activity) -> Result<(), Box<dyn StdError>> {
        let mut item = doc! {
            "timestamp": DateTime::from_chrono(activity.timestamp),
            "action_type": activity.action_type.as_str(),
            "user": activity.user.as_str(),
            "details": activity.details.as_str(),
            "tenant_id": activity.tenant_id.as_str(),
        };
        if let Some(value) = activity.document_id.as_ref() {
            match parse_id(value) {
                None => item.insert("document_id", value.as_str()),
                Some(id) => item.insert("document_id", id),
            };
        }
        if let Some(value) = activity.collection_name.as_ref() {
            item.insert("collection_name", value.as_str());
        }
        self.conn
            .collection::<Document>(COL_NAME)
            .insert_one(item)
            .await?;
        Ok(())
    }
}
