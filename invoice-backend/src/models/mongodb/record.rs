use std::{error::Error as StdError, sync::Arc};

use async_trait::async_trait;
use bson::{Bson, DateTime, Document, doc};
use futures::TryStreamExt;
use mongodb::Database;

use super::{
    super::record::{
        ListOptions, ListQueryCond, RESERVED_KEYS, Record, RecordModel, Updates,
    },
    contains_regex, doc_to_json, get_datetime, get_opt_str, json_to_bson, json_to_doc, parse_id,
};

/// Model instance of one record collection.
pub struct Model {
    /// The associated database connection.
    conn: Arc<Database>,
    /// The collection name.
    col_name: &'static str,
}

impl Model {
    /// To create the model instance with a database connection and the collection name.
    pub async fn new(conn: Arc<Database>, col_name: &'static str) -> Result<Self, Box<dyn StdError>> {
        let model = Model { conn, col_name };
        model.init().await?;
        Ok(model)
    }
}

#[async_trait]
impl RecordModel for Model {
    async fn init(&self) -> Result<(), Box<dyn StdError>> {
        let indexes = vec![
            doc! {"name": "tenantId_1", "key": {"tenantId": 1}},
            doc! {"name": "createdAt_1", "key": {"createdAt": 1}},
        ];
        let command = doc! {
            "createIndexes": self.col_name,
            "indexes": indexes,
        };
        self.conn.run_command(command).await?;
        Ok(())
    }

    async fn count(&self, cond: &ListQueryCond) -> Result<u64, Box<dyn StdError>> {
        let filter = get_list_query_filter(cond);
        let count = self
            .conn
            .collection::<Document>(self.col_name)
            .count_documents(filter)
            .await?;
        Ok(count)
    }

    async fn list(&self, opts: &ListOptions) -> Result<Vec<Record>, Box<dyn StdError>> {
        let filter = get_list_query_filter(opts.cond);
        let collection = self.conn.collection::<Document>(self.col_name);
        let mut action = collection.find(filter);
        if let Some(offset) = opts.offset {
            action = action.skip(offset);
        }
        if let Some(limit) = opts.limit {
            if limit > 0 {
                action = action.limit(limit as i64);
            }
        }
        if let Some(sort_list) = opts.sort {
            if sort_list.len() > 0 {
                let mut sort_opts = Document::new();
                for cond in sort_list.iter() {
                    sort_opts.insert(cond.key, if cond.asc { 1 } else { -1 });
                }
                action = action.sort(sort_opts);
            }
        }
        let mut cursor = action.await?;
        let mut list = vec![];
        while let Some(item) = cursor.try_next().await? {
            if let Some(record) = to_record(item) {
                list.push(record);
            }
        }
        Ok(list)
    }

    async fn get(
        &self,
        tenant_id: &str,
        record_id: &str,
    ) -> Result<Option<Record>, Box<dyn StdError>> {
        let id = match parse_id(record_id) {
            None => return Ok(None),
            Some(id) => id,
        };
        let filter = doc! {"_id": id, "tenantId": tenant_id};
        match self
            .conn
            .collection::<Document>(self.col_name)
            .find_one(filter)
            .await?
        {
            None => Ok(None),
            Some(item) => Ok(to_record(item)),
        }
    }

    async fn add(&self, record: &Record) -> Result<(), Box<dyn StdError>> {
        let mut item = json_to_doc(&record.fields, &RESERVED_KEYS);
        item.insert("_id", bson::oid::ObjectId::parse_str(record.record_id.as_str())?);
        item.insert("tenantId", record.tenant_id.as_str());
        item.insert("createdAt", DateTime::from_chrono(record.created_at));
        item.insert("modifiedAt", DateTime::from_chrono(record.modified_at));
        item.insert("modifiedBy", record.modified_by.as_deref());
        self.conn
            .collection::<Document>(self.col_name)
            .insert_one(item)
            .await?;
        Ok(())
    }

    async fn update(
        &self,
        tenant_id: &str,
        record_id: &str,
        updates: &Updates,
    ) -> Result<bool, Box<dyn StdError>> {
        let id = match parse_id(record_id) {
            None => return Ok(false),
            Some(id) => id,
        };
        let filter = doc! {"_id": id, "tenantId": tenant_id};
        let result = self
            .conn
            .collection::<Document>(self.col_name)
            .update_one(filter, get_update_doc(updates))
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn del(&self, tenant_id: &str, record_id: &str) -> Result<bool, Box<dyn StdError>> {
        let id = match parse_id(record_id) {
            None => return Ok(false),
            Some(id) => id,
        };
        let filter = doc! {"_id": id, "tenantId": tenant_id};
        let result = self
            .conn
            .collection::<Document>(self.col_name)
            .delete_one(filter)
            .await?;
        Ok(result.deleted_count > 0)
    }
}

/// Splits the stored document into metadata and business fields. Documents without a valid
/// identifier are skipped.
fn to_record(item: Document) -> Option<Record> {
    let record_id = item.get_object_id("_id").ok()?.to_hex();
    let tenant_id = get_opt_str(&item, "tenantId").unwrap_or_default();
    let created_at = get_datetime(&item, "createdAt");
    let modified_at = get_datetime(&item, "modifiedAt");
    let modified_by = get_opt_str(&item, "modifiedBy");
    Some(Record {
        record_id,
        tenant_id,
        created_at,
        modified_at,
        modified_by,
        fields: doc_to_json(item, &RESERVED_KEYS),
    })
}

/// Transforms query conditions to the MongoDB document.
fn get_list_query_filter(cond: &ListQueryCond) -> Document {
    let mut filter = Document::new();
    filter.insert("tenantId", cond.tenant_id);
    if let Some((value, fields)) = cond.search {
        if value.len() > 0 && fields.len() > 0 {
            let pattern = contains_regex(value);
            let or: Vec<Bson> = fields
                .iter()
                .map(|field| {
                    let mut field_cond = Document::new();
                    field_cond.insert(*field, pattern.clone());
                    Bson::Document(field_cond)
                })
                .collect();
            filter.insert("$or", or);
        }
    }
    for (key, value) in cond.equals.iter() {
        filter.insert(*key, json_to_bson(value));
    }
    for (key, value) in cond.not_equals.iter() {
        filter.insert(*key, doc! {"$ne": json_to_bson(value)});
    }
    filter
}

/// Transforms the model object to the MongoDB document.
fn get_update_doc(updates: &Updates) -> Document {
    let mut document = json_to_doc(updates.fields, &RESERVED_KEYS);
    document.insert("modifiedAt", DateTime::from_chrono(updates.modified_at));
    document.insert("modifiedBy", updates.modified_by);
    doc! {"$set": document}
}
