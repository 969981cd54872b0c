use serde::Serialize;

#[derive(Serialize)]
pub struct GetDocumentRules {
    pub name: String,
    #[serde(rename = "businessRules")]
    pub business_rules: Vec<GetBusinessRule>,
    #[serde(rename = "otherRules")]
    pub other_rules: Vec<GetOtherRule>,
    #[serde(rename = "modifiedAt")]
    pub modified_at: Option<String>,
    #[serde(rename = "modifiedBy")]
    pub modified_by: Option<String>,
}

#[derive(Serialize)]
pub struct GetBusinessRule {
    #[serde(rename = "_id")]
    pub rule_id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "panRules")]
    pub pan_rules: String,
    #[serde(rename = "gstinRules")]
    pub gstin_rules: String,
    #[serde(rename = "tanRules")]
    pub tan_rules: String,
    #[serde(rename = "isLocked")]
    pub is_locked: bool,
}

#[derive(Serialize)]
pub struct GetOtherRule {
    #[serde(rename = "_id")]
    pub rule_id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "isLocked")]
    pub is_locked: bool,
}
