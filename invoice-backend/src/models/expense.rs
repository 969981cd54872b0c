//! Traits, enumerations and structs for expenses.

use std::error::Error as StdError;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

/// An item line of the expense bill.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LineItem {
    pub description: Option<String>,
    pub hsn_code: Option<String>,
    pub qty: Option<f64>,
    pub price: Option<f64>,
    pub subtotal: Option<f64>,
}

/// The item content.
#[derive(Clone, Debug, PartialEq)]
pub struct Expense {
    pub expense_id: String,
    pub tenant_id: String,
    /// `EXP-TRAN-YYYYMMDD-XXXXXX`. Never changes after creation.
    pub transaction_no: String,
    pub bill_no: Option<String>,
    pub bill_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub supplier_id: Option<String>,
    pub supplier_gst: Option<String>,
    pub expense_head_id: Option<String>,
    pub narration: Option<String>,
    pub currency: String,
    pub cgst_amount: Option<f64>,
    pub sgst_amount: Option<f64>,
    pub igst_amount: Option<f64>,
    pub cess_amount: Option<f64>,
    /// Always the sum of CGST, SGST, IGST and cess.
    pub tax_amount: f64,
    pub total_amount: Option<f64>,
    pub net_amount: Option<f64>,
    pub tds_rate: Option<f64>,
    pub tds_amount_calculated: Option<f64>,
    pub payment_method: Option<String>,
    pub bill_source: Option<String>,
    pub status: String,
    pub invoice_filename: Option<String>,
    pub line_items: Vec<LineItem>,
    pub sub_total_from_items: Option<f64>,
    pub discount_amount: Option<f64>,
    pub tax_from_items: Option<f64>,
    pub grand_total_from_items: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub modified_by: Option<String>,
}

/// The query condition for the list.
#[derive(Default)]
pub struct ListQueryCond<'a> {
    pub tenant_id: &'a str,
    /// Case-insensitive search in bill number, narration and line item descriptions.
    pub search: Option<&'a str>,
    pub status: Option<&'a str>,
    pub supplier_id: Option<&'a str>,
    pub bill_date_from: Option<NaiveDate>,
    /// Inclusive. The whole day is included.
    pub bill_date_to: Option<NaiveDate>,
}

/// List sort keys.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SortKey {
    BillDate,
    DueDate,
    TotalAmount,
    BillNo,
    CreatedAt,
}

/// List sort conditions.
pub struct SortCond {
    pub key: SortKey,
    pub asc: bool,
}

/// List options.
pub struct ListOptions<'a> {
    pub cond: &'a ListQueryCond<'a>,
    pub offset: Option<u64>,
    /// `None` to get all items.
    pub limit: Option<u64>,
    pub sort: Option<&'a [SortCond]>,
}

/// The update fields by using [`Some`]s. `Some(None)` clears the field.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Updates {
    pub bill_no: Option<Option<String>>,
    pub bill_date: Option<Option<NaiveDate>>,
    pub due_date: Option<Option<NaiveDate>>,
    pub supplier_id: Option<Option<String>>,
    pub supplier_gst: Option<Option<String>>,
    pub expense_head_id: Option<Option<String>>,
    pub narration: Option<Option<String>>,
    pub currency: Option<String>,
    pub cgst_amount: Option<Option<f64>>,
    pub sgst_amount: Option<Option<f64>>,
    pub igst_amount: Option<Option<f64>>,
    pub cess_amount: Option<Option<f64>>,
    pub tax_amount: Option<f64>,
    pub total_amount: Option<Option<f64>>,
    pub net_amount: Option<Option<f64>>,
    pub tds_rate: Option<Option<f64>>,
    pub tds_amount_calculated: Option<Option<f64>>,
    pub payment_method: Option<Option<String>>,
    pub bill_source: Option<Option<String>>,
    pub status: Option<String>,
    pub invoice_filename: Option<Option<String>>,
    pub line_items: Option<Vec<LineItem>>,
    pub sub_total_from_items: Option<Option<f64>>,
    pub discount_amount: Option<Option<f64>>,
    pub tax_from_items: Option<Option<f64>>,
    pub grand_total_from_items: Option<Option<f64>>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<String>,
}

/// Model operations.
#[async_trait]
pub trait ExpenseModel: Sync {
    /// To create and initialize the table/collection.
    async fn init(&self) -> Result<(), Box<dyn StdError>>;

    /// To get item count for the query condition.
    async fn count(&self, cond: &ListQueryCond) -> Result<u64, Box<dyn StdError>>;

    /// To get item list.
    async fn list(&self, opts: &ListOptions) -> Result<Vec<Expense>, Box<dyn StdError>>;

    /// To get an item of the tenant.
    async fn get(&self, tenant_id: &str, expense_id: &str)
    -> Result<Option<Expense>, Box<dyn StdError>>;

    /// To add an item.
    async fn add(&self, expense: &Expense) -> Result<(), Box<dyn StdError>>;

    /// To update an item. Returns `false` if the item does not exist.
    async fn update(
        &self,
        tenant_id: &str,
        expense_id: &str,
        updates: &Updates,
    ) -> Result<bool, Box<dyn StdError>>;

    /// To delete an item. Returns `false` if the item does not exist.
    async fn del(&self, tenant_id: &str, expense_id: &str) -> Result<bool, Box<dyn StdError>>;
}

impl Updates {
    /// Returns `true` if no business field is set. Metadata fields are not counted.
    pub fn is_empty(&self) -> bool {
        let cleared = Updates {
            modified_at: None,
            modified_by: None,
            ..self.clone()
        };
        cleared == Updates::default()
    }
}
