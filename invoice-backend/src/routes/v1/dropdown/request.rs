use serde::Deserialize;

#[derive(Deserialize)]
pub struct PostDropdownBody {
    #[serde(rename = "type")]
    pub dropdown_type: Option<String>,
    pub value: Option<String>,
    pub label: Option<String>,
    #[serde(rename = "isLocked")]
    pub is_locked: Option<bool>,
}

#[derive(Deserialize)]
pub struct PutDropdownBody {
    #[serde(rename = "type")]
    pub dropdown_type: Option<String>,
    pub value: Option<String>,
    pub label: Option<String>,
    #[serde(rename = "isLocked")]
    pub is_locked: Option<bool>,
}
