use serde::Deserialize;

#[derive(Deserialize)]
pub struct RecordIdPath {
    pub record_id: String,
}

/// `page` and `limit` are parsed by hand to accept `-1` and report invalid values.
#[derive(Deserialize)]
pub struct GetRecordListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    /// Chart of accounts only.
    pub category: Option<String>,
}
