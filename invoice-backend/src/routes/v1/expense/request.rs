use serde::Deserialize;

#[derive(Deserialize)]
pub struct ExpenseIdPath {
    pub expense_id: String,
}

#[derive(Deserialize)]
pub struct GetExpenseListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "supplierId")]
    pub supplier_id: Option<String>,
    #[serde(rename = "dateFrom")]
    pub date_from: Option<String>,
    #[serde(rename = "dateTo")]
    pub date_to: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<String>,
}
