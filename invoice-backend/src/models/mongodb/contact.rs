use std::{error::Error as StdError, sync::Arc};

use async_trait::async_trait;
use bson::{DateTime, Document, doc, oid::ObjectId};
use futures::TryStreamExt;
use mongodb::{ClientSession, Database, error::Error as MongoError};

use super::{
    super::contact::{Contact, ContactModel, Updates},
    doc_to_json, get_datetime, get_opt_str, json_to_doc, parse_id,
};

/// Model instance.
pub struct Model {
    /// The associated database connection.
    conn: Arc<Database>,
}

const COL_NAME: &'static str = "contacts";
const RESERVED_KEYS: [&'static str; 7] = [
    "_id",
    "tenantId",
    "companyId",
    "isDefault",
    "createdAt",
    "modifiedAt",
    "modifiedBy",
];

impl Model {
    /// To create the model instance with a database connection.
    pub async fn new(conn: Arc<Database>) -> Result<Self, Box<dyn StdError>> {
        let model = Model { conn };
        model.init().await?;
        Ok(model)
    }
}

#[async_trait]
impl ContactModel for Model {
    async fn init(&self) -> Result<(), Box<dyn StdError>> {
        let indexes = vec![
            doc! {"name": "tenantId_1", "key": {"tenantId": 1}},
            doc! {"name": "companyId_1", "key": {"companyId": 1}},
        ];
        let command = doc! {
            "createIndexes": COL_NAME,
            "indexes": indexes,
        };
        self.conn.run_command(command).await?;
        Ok(())
    }

    async fn list(&self, tenant_id: &str) -> Result<Vec<Contact>, Box<dyn StdError>> {
        let mut cursor = self
            .conn
            .collection::<Document>(COL_NAME)
            .find(doc! {"tenantId": tenant_id})
            .sort(doc! {"createdAt": 1, "_id": 1})
            .await?;
        let mut list = vec![];
        while let Some(item) = cursor.try_next().await? {
            if let Some(contact) = to_contact(item) {
                list.push(contact);
            }
        }
        Ok(list)
    }

    async fn get(
        &self,
        tenant_id: &str,
        contact_id: &str,
    ) -> Result<Option<Contact>, Box<dyn StdError>> {
        let id = match parse_id(contact_id) {
            None => return Ok(None),
            Some(id) => id,
        };
        match self
            .conn
            .collection::<Document>(COL_NAME)
            .find_one(doc! {"_id": id, "tenantId": tenant_id})
            .await?
        {
            None => Ok(None),
            Some(item) => Ok(to_contact(item)),
        }
    }

    async fn replace_all(
        &self,
        tenant_id: &str,
        contacts: &[Contact],
    ) -> Result<(), Box<dyn StdError>> {
        let items = contacts
            .iter()
            .map(to_document)
            .collect::<Result<Vec<Document>, Box<dyn StdError>>>()?;
        // Transactions need a replica set or a sharded cluster.
        let mut session = self.conn.client().start_session().await?;
        session.start_transaction().await?;
        let result = replace_in_session(&self.conn, &mut session, tenant_id, items).await;
        if let Err(e) = result {
            let _ = session.abort_transaction().await;
            return Err(Box::new(e));
        }
        session.commit_transaction().await?;
        Ok(())
    }

    async fn add(&self, contact: &Contact) -> Result<(), Box<dyn StdError>> {
        let item = to_document(contact)?;
        self.conn
            .collection::<Document>(COL_NAME)
            .insert_one(item)
            .await?;
        Ok(())
    }

    async fn update(
        &self,
        tenant_id: &str,
        contact_id: &str,
        updates: &Updates,
    ) -> Result<bool, Box<dyn StdError>> {
        let id = match parse_id(contact_id) {
            None => return Ok(false),
            Some(id) => id,
        };
        let mut set = json_to_doc(updates.fields, &RESERVED_KEYS);
        set.insert("modifiedAt", DateTime::from_chrono(updates.modified_at));
        set.insert("modifiedBy", updates.modified_by);
        let result = self
            .conn
            .collection::<Document>(COL_NAME)
            .update_one(doc! {"_id": id, "tenantId": tenant_id}, doc! {"$set": set})
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn del(&self, tenant_id: &str, contact_id: &str) -> Result<bool, Box<dyn StdError>> {
        let id = match parse_id(contact_id) {
            None => return Ok(false),
            Some(id) => id,
        };
        let result = self
            .conn
            .collection::<Document>(COL_NAME)
            .delete_one(doc! {"_id": id, "tenantId": tenant_id})
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn set_default(
        &self,
        tenant_id: &str,
        contact_id: &str,
    ) -> Result<bool, Box<dyn StdError>> {
        let id = match parse_id(contact_id) {
            None => return Ok(false),
            Some(id) => id,
        };
        let collection = self.conn.collection::<Document>(COL_NAME);
        let result = collection
            .update_one(
                doc! {"_id": id, "tenantId": tenant_id},
                doc! {"$set": {"isDefault": true}},
            )
            .await?;
        if result.matched_count == 0 {
            return Ok(false);
        }
        collection
            .update_many(
                doc! {"_id": {"$ne": id}, "tenantId": tenant_id},
                doc! {"$set": {"isDefault": false}},
            )
            .await?;
        Ok(true)
    }
}

async fn replace_in_session(
    conn: &Database,
    session: &mut ClientSession,
    tenant_id: &str,
    items: Vec<Document>,
) -> Result<(), MongoError> {
    let collection = conn.collection::<Document>(COL_NAME);
    collection
        .delete_many(doc! {"tenantId": tenant_id})
        .session(&mut *session)
        .await?;
    if items.len() > 0 {
        collection.insert_many(items).session(session).await?;
    }
    Ok(())
}

fn to_document(contact: &Contact) -> Result<Document, Box<dyn StdError>> {
    let mut item = json_to_doc(&contact.fields, &RESERVED_KEYS);
    item.insert("_id", ObjectId::parse_str(contact.contact_id.as_str())?);
    item.insert("tenantId", contact.tenant_id.as_str());
    item.insert("companyId", ObjectId::parse_str(contact.company_id.as_str())?);
    item.insert("isDefault", contact.is_default);
    item.insert("createdAt", DateTime::from_chrono(contact.created_at));
    item.insert("modifiedAt", DateTime::from_chrono(contact.modified_at));
    item.insert("modifiedBy", contact.modified_by.as_deref());
    Ok(item)
}

fn to_contact(item: Document) -> Option<Contact> {
    let contact_id = item.get_object_id("_id").ok()?.to_hex();
    let company_id = match item.get_object_id("companyId") {
        Err(_) => String::from(""),
        Ok(id) => id.to_hex(),
    };
    Some(Contact {
        contact_id,
        tenant_id: get_opt_str(&item, "tenantId").unwrap_or_default(),
        company_id,
        is_default: item.get_bool("isDefault").unwrap_or(false),
        created_at: get_datetime(&item, "createdAt"),
        modified_at: get_datetime(&item, "modifiedAt"),
        modified_by: get_opt_str(&item, "modifiedBy"),
        fields: doc_to_json(item, &RESERVED_KEYS),
    })
}
