use std::{error::Error as StdError, sync::Arc};

use async_trait::async_trait;
use bson::{Bson, DateTime, Document, doc, oid::ObjectId};
use chrono::Utc;
use mongodb::Database;
use serde::{Deserialize, Serialize};

use super::super::document_rules::{
    BusinessRule, DocumentRules, DocumentRulesModel, GLOBAL_NAME, OtherRule,
};

/// Model instance.
pub struct Model {
    /// The associated database connection.
    conn: Arc<Database>,
}

/// MongoDB schema. Rule items are decoded one by one so that broken items are skipped.
#[derive(Deserialize)]
struct Schema {
    #[serde(default)]
    business_rules: Vec<Bson>,
    #[serde(default)]
    other_rules: Vec<Bson>,
    #[serde(rename = "modifiedAt")]
    modified_at: Option<DateTime>,
    #[serde(rename = "modifiedBy")]
    modified_by: Option<String>,
}

#[derive(Deserialize, Serialize)]
struct BusinessRuleSchema {
    #[serde(rename = "_id")]
    rule_id: ObjectId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    pan_rules: String,
    #[serde(default)]
    gstin_rules: String,
    #[serde(default)]
    tan_rules: String,
    #[serde(rename = "isLocked", default)]
    is_locked: bool,
}

#[derive(Deserialize, Serialize)]
struct OtherRuleSchema {
    #[serde(rename = "_id")]
    rule_id: ObjectId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "isLocked", default)]
    is_locked: bool,
}

const COL_NAME: &'static str = "document_rules";

impl Model {
    /// To create the model instance with a database connection.
    pub async fn new(conn: Arc<Database>) -> Result<Self, Box<dyn StdError>> {
        let model = Model { conn };
        model.init().await?;
        Ok(model)
    }
}

#[async_trait]
impl DocumentRulesModel for Model {
    async fn init(&self) -> Result<(), Box<dyn StdError>> {
        let indexes = vec![doc! {"name": "name_1", "key": {"name": 1}, "unique": true}];
        let command = doc! {
            "createIndexes": COL_NAME,
            "indexes": indexes,
        };
        self.conn.run_command(command).await?;
        Ok(())
    }

    async fn get(&self) -> Result<Option<DocumentRules>, Box<dyn StdError>> {
        let item = match self
            .conn
            .collection::<Schema>(COL_NAME)
            .find_one(doc! {"name": GLOBAL_NAME})
            .await?
        {
            None => return Ok(None),
            Some(item) => item,
        };
        let business_rules = item
            .business_rules
            .into_iter()
            .filter_map(|v| bson::from_bson::<BusinessRuleSchema>(v).ok())
            .map(|v| BusinessRule {
                rule_id: v.rule_id.to_hex(),
                name: v.name,
                description: v.description,
                pan_rules: v.pan_rules,
                gstin_rules: v.gstin_rules,
                tan_rules: v.tan_rules,
                is_locked: v.is_locked,
            })
            .collect();
        let other_rules = item
            .other_rules
            .into_iter()
            .filter_map(|v| bson::from_bson::<OtherRuleSchema>(v).ok())
            .map(|v| OtherRule {
                rule_id: v.rule_id.to_hex(),
                name: v.name,
                description: v.description,
                is_locked: v.is_locked,
            })
            .collect();
        Ok(Some(DocumentRules {
            business_rules,
            other_rules,
            modified_at: item.modified_at.map(|v| v.into()),
            modified_by: item.modified_by,
        }))
    }

    async fn save(&self, rules: &DocumentRules) -> Result<(), Box<dyn StdError>> {
        let mut business_rules = vec![];
        for rule in rules.business_rules.iter() {
            business_rules.push(bson::to_document(&BusinessRuleSchema {
                rule_id: ObjectId::parse_str(rule.rule_id.as_str())?,
                name: rule.name.clone(),
                description: rule.description.clone(),
                pan_rules: rule.pan_rules.clone(),
                gstin_rules: rule.gstin_rules.clone(),
                tan_rules: rule.tan_rules.clone(),
                is_locked: rule.is_locked,
            })?);
        }
        let mut other_rules = vec![];
        for rule in rules.other_rules.iter() {
            other_rules.push(bson::to_document(&OtherRuleSchema {
                rule_id: ObjectId::parse_str(rule.rule_id.as_str())?,
                name: rule.name.clone(),
                description: rule.description.clone(),
                is_locked: rule.is_locked,
            })?);
        }
        let now = rules.modified_at.unwrap_or_else(Utc::now);
        let mut set = Document::new();
        set.insert("business_rules", business_rules);
        set.insert("other_rules", other_rules);
        set.insert("modifiedAt", DateTime::from_chrono(now));
        set.insert("modifiedBy", rules.modified_by.as_deref());
        let updates = doc! {
            "$set": set,
            "$setOnInsert": {"createdAt": DateTime::from_chrono(now)},
        };
        self.conn
            .collection::<Document>(COL_NAME)
            .update_one(doc! {"name": GLOBAL_NAME}, updates)
            .upsert(true)
            .await?;
        Ok(())
    }
}
