use serde::Deserialize;

/// Both lists replace the stored ones.
#[derive(Deserialize)]
pub struct PostDocumentRulesBody {
    #[serde(rename = "businessRules", alias = "business_rules")]
    pub business_rules: Vec<PostBusinessRule>,
    #[serde(rename = "otherRules", alias = "other_rules")]
    pub other_rules: Vec<PostOtherRule>,
}

#[derive(Deserialize)]
pub struct PostBusinessRule {
    /// Temporary identifiers from the editor start with `new_`.
    #[serde(rename = "_id")]
    pub rule_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "panRules", alias = "pan_rules", default)]
    pub pan_rules: String,
    #[serde(rename = "gstinRules", alias = "gstin_rules", default)]
    pub gstin_rules: String,
    #[serde(rename = "tanRules", alias = "tan_rules", default)]
    pub tan_rules: String,
    #[serde(rename = "isLocked", default)]
    pub is_locked: bool,
}

#[derive(Deserialize)]
pub struct PostOtherRule {
    #[serde(rename = "_id")]
    pub rule_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "isLocked", default)]
    pub is_locked: bool,
}
