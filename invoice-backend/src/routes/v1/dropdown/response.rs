use serde::Serialize;

#[derive(Serialize)]
pub struct GetDropdownData {
    #[serde(rename = "_id")]
    pub dropdown_id: String,
    #[serde(rename = "type")]
    pub dropdown_type: String,
    pub value: String,
    pub label: String,
    #[serde(rename = "isLocked")]
    pub is_locked: bool,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "modifiedAt")]
    pub modified_at: String,
    #[serde(rename = "modifiedBy")]
    pub modified_by: Option<String>,
}

#[derive(Serialize)]
pub struct PostDropdown {
    pub message: String,
    pub id: String,
}
