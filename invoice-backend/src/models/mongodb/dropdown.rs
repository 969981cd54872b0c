use std::{error::Error as StdError, sync::Arc};

use async_trait::async_trait;
use bson::{DateTime, Document, doc, oid::ObjectId};
use futures::TryStreamExt;
use mongodb::Database;
use serde::{Deserialize, Serialize};

use super::{
    super::dropdown::{Dropdown, DropdownModel, Updates},
    parse_id,
};

/// Model instance.
pub struct Model {
    /// The associated database connection.
    conn: Arc<Database>,
}

/// MongoDB schema.
#[derive(Deserialize, Serialize)]
struct Schema {
    #[serde(rename = "_id")]
    dropdown_id: ObjectId,
    #[serde(rename = "type")]
    dropdown_type: String,
    value: String,
    label: String,
    #[serde(rename = "isLocked", default)]
    is_locked: bool,
    #[serde(rename = "createdAt")]
    created_at: DateTime,
    #[serde(rename = "modifiedAt")]
    modified_at: DateTime,
    #[serde(rename = "modifiedBy")]
    modified_by: Option<String>,
}

const COL_NAME: &'static str = "dropdown";

impl Model {
    /// To create the model instance with a database connection.
    pub async fn new(conn: Arc<Database>) -> Result<Self, Box<dyn StdError>> {
        let model = Model { conn };
        model.init().await?;
        Ok(model)
    }

    async fn find(&self, filter: Document) -> Result<Vec<Dropdown>, Box<dyn StdError>> {
        let mut cursor = self
            .conn
            .collection::<Schema>(COL_NAME)
            .find(filter)
            .sort(doc! {"type": 1, "label": 1})
            .await?;
        let mut list = vec![];
        while let Some(item) = cursor.try_next().await? {
            list.push(to_dropdown(item));
        }
        Ok(list)
    }
}

#[async_trait]
impl DropdownModel for Model {
    async fn init(&self) -> Result<(), Box<dyn StdError>> {
        let indexes = vec![doc! {"name": "type_1_label_1", "key": {"type": 1, "label": 1}}];
        let command = doc! {
            "createIndexes": COL_NAME,
            "indexes": indexes,
        };
        self.conn.run_command(command).await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Dropdown>, Box<dyn StdError>> {
        self.find(doc! {}).await
    }

    async fn list_by_type(&self, dropdown_type: &str) -> Result<Vec<Dropdown>, Box<dyn StdError>> {
        self.find(doc! {"type": dropdown_type}).await
    }

    async fn get(&self, dropdown_id: &str) -> Result<Option<Dropdown>, Box<dyn StdError>> {
        let id = match parse_id(dropdown_id) {
            None => return Ok(None),
            Some(id) => id,
        };
        match self
            .conn
            .collection::<Schema>(COL_NAME)
            .find_one(doc! {"_id": id})
            .await?
        {
            None => Ok(None),
            Some(item) => Ok(Some(to_dropdown(item))),
        }
    }

    async fn add(&self, dropdown: &Dropdown) -> Result<(), Box<dyn StdError>> {
        let item = Schema {
            dropdown_id: ObjectId::parse_str(dropdown.dropdown_id.as_str())?,
            dropdown_type: dropdown.dropdown_type.clone(),
            value: dropdown.value.clone(),
            label: dropdown.label.clone(),
            is_locked: dropdown.is_locked,
            created_at: dropdown.created_at.into(),
            modified_at: dropdown.modified_at.into(),
            modified_by: dropdown.modified_by.clone(),
        };
        self.conn
            .collection::<Schema>(COL_NAME)
            .insert_one(item)
            .await?;
        Ok(())
    }

    async fn update(
        &self,
        dropdown_id: &str,
        updates: &Updates,
    ) -> Result<bool, Box<dyn StdError>> {
        let id = match parse_id(dropdown_id) {
            None => return Ok(false),
            Some(id) => id,
        };
        let updates = match get_update_doc(updates) {
            None => {
                let count = self
                    .conn
                    .collection::<Schema>(COL_NAME)
                    .count_documents(doc! {"_id": id})
                    .await?;
                return Ok(count > 0);
            }
            Some(updates) => updates,
        };
        let result = self
            .conn
            .collection::<Schema>(COL_NAME)
            .update_one(doc! {"_id": id}, updates)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn del(&self, dropdown_id: &str) -> Result<bool, Box<dyn StdError>> {
        let id = match parse_id(dropdown_id) {
            None => return Ok(false),
            Some(id) => id,
        };
        let result = self
            .conn
            .collection::<Schema>(COL_NAME)
            .delete_one(doc! {"_id": id})
            .await?;
        Ok(result.deleted_count > 0)
    }
}

fn to_dropdown(item: Schema) -> Dropdown {
    Dropdown {
        dropdown_id: item.dropdown_id.to_hex(),
        dropdown_type: item.dropdown_type,
        value: item.value,
        label: item.label,
        is_locked: item.is_locked,
        created_at: item.created_at.into(),
        modified_at: item.modified_at.into(),
        modified_by: item.modified_by,
    }
}

/// Transforms the model object to the MongoDB document.
fn get_update_doc(updates: &Updates) -> Option<Document> {
    let mut count = 0;
    let mut document = Document::new();
    if let Some(value) = updates.dropdown_type {
        document.insert("type", value);
        count += 1;
    }
    if let Some(value) = updates.value {
        document.insert("value", value);
        count += 1;
    }
    if let Some(value) = updates.label {
        document.insert("label", value);
        count += 1;
    }
    if let Some(value) = updates.is_locked {
        document.insert("isLocked", value);
        count += 1;
    }
    if let Some(value) = updates.modified_at.as_ref() {
        document.insert(
            "modifiedAt",
            DateTime::from_millis(value.timestamp_millis()),
        );
        count += 1;
    }
    if let Some(value) = updates.modified_by {
        document.insert("modifiedBy", value);
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some(doc! {"$set": document})
}
