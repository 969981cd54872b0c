//! Traits, enumerations and structs for the global document rules.

use std::error::Error as StdError;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// The name of the global rules document.
pub const GLOBAL_NAME: &'static str = "global_document_rules";

/// Registration rules of one organization type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BusinessRule {
    pub rule_id: String,
    /// The organization type such as `Private Company`.
    pub name: String,
    pub description: String,
    pub pan_rules: String,
    pub gstin_rules: String,
    pub tan_rules: String,
    pub is_locked: bool,
}

/// Descriptive rules of other documents.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OtherRule {
    pub rule_id: String,
    pub name: String,
    pub description: String,
    pub is_locked: bool,
}

/// The item content.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DocumentRules {
    pub business_rules: Vec<BusinessRule>,
    pub other_rules: Vec<OtherRule>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<String>,
}

/// Model operations.
#[async_trait]
pub trait DocumentRulesModel: Sync {
    /// To create and initialize the table/collection.
    async fn init(&self) -> Result<(), Box<dyn StdError>>;

    /// To get the global rules.
    async fn get(&self) -> Result<Option<DocumentRules>, Box<dyn StdError>>;

    /// To create or replace the global rules. All rule identifiers must be valid.
    async fn save(&self, rules: &DocumentRules) -> Result<(), Box<dyn StdError>>;
}
