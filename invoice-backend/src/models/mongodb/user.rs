use std::{collections::HashMap, error::Error as StdError, sync::Arc};

use async_trait::async_trait;
use bson::{DateTime, Document, doc, oid::ObjectId};
use futures::TryStreamExt;
use mongodb::Database;
use serde::{Deserialize, Serialize};

use super::{
    super::user::{QueryCond, Updates, User, UserModel},
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
    user_id: ObjectId,
    username: String,
    email: Option<String>,
    #[serde(rename = "createdAt")]
    created_at: DateTime,
    #[serde(rename = "modifiedAt")]
    modified_at: DateTime,
    roles: HashMap<String, bool>,
    password: String,
    salt: String,
    #[serde(rename = "tenantId")]
    tenant_id: String,
    #[serde(rename = "isActive")]
    is_active: bool,
}

const COL_NAME: &'static str = "users";

impl Model {
    /// To create the model instance with a database connection.
    pub async fn new(conn: Arc<Database>) -> Result<Self, Box<dyn StdError>> {
        let model = Model { conn };
        model.init().await?;
        Ok(model)
    }
}

#[async_trait]
impl UserModel for Model {
    async fn init(&self) -> Result<(), Box<dyn StdError>> {
        let indexes = vec![
            doc! {"name": "username_1", "key": {"username": 1}, "unique": true},
            doc! {"name": "createdAt_1", "key": {"createdAt": 1}},
        ];
        let command = doc! {
            "createIndexes": COL_NAME,
            "indexes": indexes,
        };
        self.conn.run_command(command).await?;
        Ok(())
    }

    async fn get(&self, cond: &QueryCond) -> Result<Option<User>, Box<dyn StdError>> {
        let filter = match get_query_filter(cond) {
            None => return Ok(None),
            Some(filter) => filter,
        };
        match self
            .conn
            .collection::<Schema>(COL_NAME)
            .find_one(filter)
            .await?
        {
            None => Ok(None),
            Some(item) => Ok(Some(to_user(item))),
        }
    }

    async fn list_recent(&self, limit: u64) -> Result<Vec<User>, Box<dyn StdError>> {
        let mut cursor = self
            .conn
            .collection::<Schema>(COL_NAME)
            .find(doc! {})
            .sort(doc! {"createdAt": 1})
            .limit(limit as i64)
            .await?;
        let mut list = vec![];
        while let Some(item) = cursor.try_next().await? {
            list.push(to_user(item));
        }
        Ok(list)
    }

    async fn add(&self, user: &User) -> Result<(), Box<dyn StdError>> {
        let item = Schema {
            user_id: ObjectId::parse_str(user.user_id.as_str())?,
            username: user.username.to_lowercase(),
            email: user.email.clone(),
            created_at: user.created_at.into(),
            modified_at: user.modified_at.into(),
            roles: user.roles.clone(),
            password: user.password.clone(),
            salt: user.salt.clone(),
            tenant_id: user.tenant_id.clone(),
            is_active: user.is_active,
        };
        self.conn
            .collection::<Schema>(COL_NAME)
            .insert_one(item)
            .await?;
        Ok(())
    }

    async fn update(&self, user_id: &str, updates: &Updates) -> Result<(), Box<dyn StdError>> {
        let filter = match parse_id(user_id) {
            None => return Ok(()),
            Some(id) => doc! {"_id": id},
        };
        if let Some(updates) = get_update_doc(updates) {
            self.conn
                .collection::<Schema>(COL_NAME)
                .update_one(filter, updates)
                .await?;
        }
        Ok(())
    }
}

fn to_user(item: Schema) -> User {
    User {
        user_id: item.user_id.to_hex(),
        username: item.username,
        email: item.email,
        created_at: item.created_at.into(),
        modified_at: item.modified_at.into(),
        roles: item.roles,
        password: item.password,
        salt: item.salt,
        tenant_id: item.tenant_id,
        is_active: item.is_active,
    }
}

/// Transforms query conditions to the MongoDB document. An invalid identifier matches nothing.
fn get_query_filter(cond: &QueryCond) -> Option<Document> {
    let mut filter = Document::new();
    if let Some(value) = cond.user_id {
        filter.insert("_id", parse_id(value)?);
    }
    if let Some(value) = cond.username {
        filter.insert("username", value.to_lowercase().as_str());
    }
    Some(filter)
}

/// Transforms the model object to the MongoDB document.
fn get_update_doc(updates: &Updates) -> Option<Document> {
    let mut count = 0;
    let mut document = Document::new();
    if let Some(value) = updates.modified_at.as_ref() {
        document.insert(
            "modifiedAt",
            DateTime::from_millis(value.timestamp_millis()),
        );
        count += 1;
    }
    if let Some(value) = updates.email {
        document.insert("email", value);
        count += 1;
    }
    if let Some(value) = updates.roles {
        let mut doc = Document::new();
        for (k, v) in value {
            doc.insert(k, v);
        }
        document.insert("roles", doc);
        count += 1;
    }
    if let Some(value) = updates.password.as_ref() {
        document.insert("password", value);
        count += 1;
    }
    if let Some(value) = updates.salt.as_ref() {
        document.insert("salt", value);
        count += 1;
    }
    if let Some(value) = updates.tenant_id {
        document.insert("tenantId", value);
        count += 1;
    }
    if let Some(value) = updates.is_active {
        document.insert("isActive", value);
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some(doc! {"$set": document})
}
