use std::{error::Error as StdError, sync::Arc};

use async_trait::async_trait;
use bson::{Bson, DateTime, Document, doc};
use chrono::Utc;
use mongodb::Database;
use serde_json::{Map, Value};

use super::{
    super::company::{Company, CompanyModel},
    doc_to_json, get_datetime, get_opt_str, json_to_doc,
};

/// Model instance.
pub struct Model {
    /// The associated database connection.
    conn: Arc<Database>,
}

const COL_NAME: &'static str = "company_information";
const RESERVED_KEYS: [&'static str; 5] =
    ["_id", "tenantId", "createdAt", "modifiedAt", "modifiedBy"];

impl Model {
    /// To create the model instance with a database connection.
    pub async fn new(conn: Arc<Database>) -> Result<Self, Box<dyn StdError>> {
        let model = Model { conn };
        model.init().await?;
        Ok(model)
    }
}

#[async_trait]
impl CompanyModel for Model {
    async fn init(&self) -> Result<(), Box<dyn StdError>> {
        let indexes = vec![doc! {"name": "tenantId_1", "key": {"tenantId": 1}, "unique": true}];
        let command = doc! {
            "createIndexes": COL_NAME,
            "indexes": indexes,
        };
        self.conn.run_command(command).await?;
        Ok(())
    }

    async fn get(&self, tenant_id: &str) -> Result<Option<Company>, Box<dyn StdError>> {
        let item = match self
            .conn
            .collection::<Document>(COL_NAME)
            .find_one(doc! {"tenantId": tenant_id})
            .await?
        {
            None => return Ok(None),
            Some(item) => item,
        };
        let company_id = match item.get_object_id("_id") {
            Err(_) => return Ok(None),
            Ok(id) => id.to_hex(),
        };
        Ok(Some(Company {
            company_id,
            tenant_id: tenant_id.to_string(),
            created_at: get_datetime(&item, "createdAt"),
            modified_at: get_datetime(&item, "modifiedAt"),
            modified_by: get_opt_str(&item, "modifiedBy"),
            fields: doc_to_json(item, &RESERVED_KEYS),
        }))
    }

    async fn upsert(
        &self,
        tenant_id: &str,
        fields: &Map<String, Value>,
        modified_at: chrono::DateTime<Utc>,
        modified_by: &str,
    ) -> Result<String, Box<dyn StdError>> {
        let mut set = json_to_doc(fields, &RESERVED_KEYS);
        set.insert("modifiedAt", DateTime::from_chrono(modified_at));
        set.insert("modifiedBy", modified_by);
        let updates = doc! {
            "$set": set,
            "$setOnInsert": {"createdAt": DateTime::from_chrono(modified_at)},
        };
        let result = self
            .conn
            .collection::<Document>(COL_NAME)
            .update_one(doc! {"tenantId": tenant_id}, updates)
            .upsert(true)
            .await?;
        if let Some(Bson::ObjectId(id)) = result.upserted_id {
            return Ok(id.to_hex());
        }
        match self.get(tenant_id).await? {
            None => Err("company not found after upsert".into()),
            Some(company) => Ok(company.company_id),
        }
    }
}
