use std::{error::Error as StdError, sync::Arc};

use async_trait::async_trait;
use bson::{Bson, DateTime, Document, doc, oid::ObjectId};
use chrono::{Days, NaiveDate};
use futures::TryStreamExt;
use mongodb::Database;
use serde::{Deserialize, Serialize};

use super::{
    super::expense::{
        Expense, ExpenseModel, LineItem, ListOptions, ListQueryCond, SortKey, Updates,
    },
    bson_to_date, contains_regex, date_to_bson, parse_id,
};

/// Model instance.
pub struct Model {
    /// The associated database connection.
    conn: Arc<Database>,
}

/// MongoDB schema.
#[derive(Deserialize, Serialize)]
struct Schema {
    #[serde(rename = "_id")]
    expense_id: ObjectId,
    #[serde(rename = "tenantId")]
    tenant_id: String,
    #[serde(rename = "transactionNo", default)]
    transaction_no: String,
    #[serde(rename = "billNo")]
    bill_no: Option<String>,
    #[serde(rename = "billDate")]
    bill_date: Option<DateTime>,
    #[serde(rename = "dueDate")]
    due_date: Option<DateTime>,
    #[serde(rename = "supplierId")]
    supplier_id: Option<ObjectId>,
    #[serde(rename = "supplierGst")]
    supplier_gst: Option<String>,
    #[serde(rename = "expenseHeadId")]
    expense_head_id: Option<ObjectId>,
    narration: Option<String>,
    #[serde(default)]
    currency: String,
    #[serde(rename = "cgstAmount")]
    cgst_amount: Option<f64>,
    #[serde(rename = "sgstAmount")]
    sgst_amount: Option<f64>,
    #[serde(rename = "igstAmount")]
    igst_amount: Option<f64>,
    #[serde(rename = "cessAmount")]
    cess_amount: Option<f64>,
    #[serde(rename = "taxAmount", default)]
    tax_amount: f64,
    #[serde(rename = "totalAmount")]
    total_amount: Option<f64>,
    #[serde(rename = "netAmount")]
    net_amount: Option<f64>,
    #[serde(rename = "tdsRate")]
    tds_rate: Option<f64>,
    #[serde(rename = "tdsAmountCalculated")]
    tds_amount_calculated: Option<f64>,
    #[serde(rename = "paymentMethod")]
    payment_method: Option<String>,
    #[serde(rename = "billSource")]
    bill_source: Option<String>,
    #[serde(default)]
    status: String,
    #[serde(rename = "invoiceFilename")]
    invoice_filename: Option<String>,
    #[serde(rename = "lineItems", default)]
    line_items: Vec<LineItemSchema>,
    #[serde(rename = "subTotalFromItems")]
    sub_total_from_items: Option<f64>,
    #[serde(rename = "discountAmount")]
    discount_amount: Option<f64>,
    #[serde(rename = "taxFromItems")]
    tax_from_items: Option<f64>,
    #[serde(rename = "grandTotalFromItems")]
    grand_total_from_items: Option<f64>,
    #[serde(rename = "createdAt")]
    created_at: DateTime,
    #[serde(rename = "modifiedAt")]
    modified_at: DateTime,
    #[serde(rename = "modifiedBy")]
    modified_by: Option<String>,
}

#[derive(Deserialize, Serialize)]
struct LineItemSchema {
    description: Option<String>,
    #[serde(rename = "hsnCode")]
    hsn_code: Option<String>,
    qty: Option<f64>,
    price: Option<f64>,
    subtotal: Option<f64>,
}

const COL_NAME: &'static str = "expenses";

impl Model {
    /// To create the model instance with a database connection.
    pub async fn new(conn: Arc<Database>) -> Result<Self, Box<dyn StdError>> {
        let model = Model { conn };
        model.init().await?;
        Ok(model)
    }
}

#[async_trait]
impl ExpenseModel for Model {
    async fn init(&self) -> Result<(), Box<dyn StdError>> {
        let indexes = vec![
            doc! {"name": "tenantId_1_billDate_-1", "key": {"tenantId": 1, "billDate": -1}},
            doc! {"name": "transactionNo_1", "key": {"transactionNo": 1}},
            doc! {"name": "supplierId_1", "key": {"supplierId": 1}},
            doc! {"name": "status_1", "key": {"status": 1}},
            doc! {"name": "createdAt_1", "key": {"createdAt": 1}},
        ];
        let command = doc! {
            "createIndexes": COL_NAME,
            "indexes": indexes,
        };
        self.conn.run_command(command).await?;
        Ok(())
    }

    async fn count(&self, cond: &ListQueryCond) -> Result<u64, Box<dyn StdError>> {
        let filter = get_list_query_filter(cond);
        let count = self
            .conn
            .collection::<Schema>(COL_NAME)
            .count_documents(filter)
            .await?;
        Ok(count)
    }

    async fn list(&self, opts: &ListOptions) -> Result<Vec<Expense>, Box<dyn StdError>> {
        let filter = get_list_query_filter(opts.cond);
        let collection = self.conn.collection::<Schema>(COL_NAME);
        let mut action = collection.find(filter);
        if let Some(offset) = opts.offset {
            action = action.skip(offset);
        }
        if let Some(limit) = opts.limit {
            if limit > 0 {
                action = action.limit(limit as i64);
            }
        }
        if let Some(sort_list) = opts.sort {
            if sort_list.len() > 0 {
                let mut sort_opts = Document::new();
                for cond in sort_list.iter() {
                    let key = match cond.key {
                        SortKey::BillDate => "billDate",
                        SortKey::DueDate => "dueDate",
                        SortKey::TotalAmount => "totalAmount",
                        SortKey::BillNo => "billNo",
                        SortKey::CreatedAt => "createdAt",
                    };
                    if cond.asc {
                        sort_opts.insert(key.to_string(), 1);
                    } else {
                        sort_opts.insert(key.to_string(), -1);
                    }
                }
                action = action.sort(sort_opts);
            }
        }
        let mut cursor = action.await?;
        let mut list = vec![];
        while let Some(item) = cursor.try_next().await? {
            list.push(to_expense(item));
        }
        Ok(list)
    }

    async fn get(
        &self,
        tenant_id: &str,
        expense_id: &str,
    ) -> Result<Option<Expense>, Box<dyn StdError>> {
        let id = match parse_id(expense_id) {
            None => return Ok(None),
            Some(id) => id,
        };
        let filter = doc! {"_id": id, "tenantId": tenant_id};
        match self
            .conn
            .collection::<Schema>(COL_NAME)
            .find_one(filter)
            .await?
        {
            None => Ok(None),
            Some(item) => Ok(Some(to_expense(item))),
        }
    }

    async fn add(&self, expense: &Expense) -> Result<(), Box<dyn StdError>> {
        let item = Schema {
            expense_id: ObjectId::parse_str(expense.expense_id.as_str())?,
            tenant_id: expense.tenant_id.clone(),
            transaction_no: expense.transaction_no.clone(),
            bill_no: expense.bill_no.clone(),
            bill_date: expense.bill_date.as_ref().map(date_to_bson),
            due_date: expense.due_date.as_ref().map(date_to_bson),
            supplier_id: opt_id(expense.supplier_id.as_deref())?,
            supplier_gst: expense.supplier_gst.clone(),
            expense_head_id: opt_id(expense.expense_head_id.as_deref())?,
            narration: expense.narration.clone(),
            currency: expense.currency.clone(),
            cgst_amount: expense.cgst_amount,
            sgst_amount: expense.sgst_amount,
            igst_amount: expense.igst_amount,
            cess_amount: expense.cess_amount,
            tax_amount: expense.tax_amount,
            total_amount: expense.total_amount,
            net_amount: expense.net_amount,
            tds_rate: expense.tds_rate,
            tds_amount_calculated: expense.tds_amount_calculated,
            payment_method: expense.payment_method.clone(),
            bill_source: expense.bill_source.clone(),
            status: expense.status.clone(),
            invoice_filename: expense.invoice_filename.clone(),
            line_items: expense.line_items.iter().map(to_line_item_schema).collect(),
            sub_total_from_items: expense.sub_total_from_items,
            discount_amount: expense.discount_amount,
            tax_from_items: expense.tax_from_items,
            grand_total_from_items: expense.grand_total_from_items,
            created_at: expense.created_at.into(),
            modified_at: expense.modified_at.into(),
            modified_by: expense.modified_by.clone(),
        };
        self.conn
            .collection::<Schema>(COL_NAME)
            .insert_one(item)
            .await?;
        Ok(())
    }

    async fn update(
        &self,
        tenant_id: &str,
        expense_id: &str,
        updates: &Updates,
    ) -> Result<bool, Box<dyn StdError>> {
        let id = match parse_id(expense_id) {
            None => return Ok(false),
            Some(id) => id,
        };
        let filter = doc! {"_id": id, "tenantId": tenant_id};
        let updates = get_update_doc(updates)?;
        let updates = match updates {
            None => {
                let count = self
                    .conn
                    .collection::<Schema>(COL_NAME)
                    .count_documents(filter)
                    .await?;
                return Ok(count > 0);
            }
            Some(updates) => updates,
        };
        let result = self
            .conn
            .collection::<Schema>(COL_NAME)
            .update_one(filter, updates)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn del(&self, tenant_id: &str, expense_id: &str) -> Result<bool, Box<dyn StdError>> {
        let id = match parse_id(expense_id) {
            None => return Ok(false),
            Some(id) => id,
        };
        let filter = doc! {"_id": id, "tenantId": tenant_id};
        let result = self
            .conn
            .collection::<Schema>(COL_NAME)
            .delete_one(filter)
            .await?;
        Ok(result.deleted_count > 0)
    }
}

/// Related identifiers must be valid object identifiers.
fn opt_id(value: Option<&str>) -> Result<Option<ObjectId>, Box<dyn StdError>> {
    match value {
        None => Ok(None),
        Some(value) => Ok(Some(ObjectId::parse_str(value)?)),
    }
}

fn to_line_item_schema(item: &LineItem) -> LineItemSchema {
    LineItemSchema {
        description: item.description.clone(),
        hsn_code: item.hsn_code.clone(),
        qty: item.qty,
        price: item.price,
        subtotal: item.subtotal,
    }
}

fn to_expense(item: Schema) -> Expense {
    Expense {
        expense_id: item.expense_id.to_hex(),
        tenant_id: item.tenant_id,
        transaction_no: item.transaction_no,
        bill_no: item.bill_no,
        bill_date: item.bill_date.as_ref().map(bson_to_date),
        due_date: item.due_date.as_ref().map(bson_to_date),
        supplier_id: item.supplier_id.map(|v| v.to_hex()),
        supplier_gst: item.supplier_gst,
        expense_head_id: item.expense_head_id.map(|v| v.to_hex()),
        narration: item.narration,
        currency: item.currency,
        cgst_amount: item.cgst_amount,
        sgst_amount: item.sgst_amount,
        igst_amount: item.igst_amount,
        cess_amount: item.cess_amount,
        tax_amount: item.tax_amount,
        total_amount: item.total_amount,
        net_amount: item.net_amount,
        tds_rate: item.tds_rate,
        tds_amount_calculated: item.tds_amount_calculated,
        payment_method: item.payment_method,
        bill_source: item.bill_source,
        status: item.status,
        invoice_filename: item.invoice_filename,
        line_items: item
            .line_items
            .into_iter()
            .map(|v| LineItem {
                description: v.description,
                hsn_code: v.hsn_code,
                qty: v.qty,
                price: v.price,
                subtotal: v.subtotal,
            })
            .collect(),
        sub_total_from_items: item.sub_total_from_items,
        discount_amount: item.discount_amount,
        tax_from_items: item.tax_from_items,
        grand_total_from_items: item.grand_total_from_items,
        created_at: item.created_at.into(),
        modified_at: item.modified_at.into(),
        modified_by: item.modified_by,
    }
}

/// Transforms query conditions to the MongoDB document.
fn get_list_query_filter(cond: &ListQueryCond) -> Document {
    let mut filter = Document::new();
    filter.insert("tenantId", cond.tenant_id);
    if let Some(value) = cond.search {
        if value.len() > 0 {
            let pattern = contains_regex(value);
            filter.insert(
                "$or",
                vec![
                    doc! {"billNo": pattern.clone()},
                    doc! {"narration": pattern.clone()},
                    doc! {"lineItems.description": pattern},
                ],
            );
        }
    }
    if let Some(value) = cond.status {
        filter.insert("status", value);
    }
    if let Some(value) = cond.supplier_id {
        match parse_id(value) {
            None => filter.insert("supplierId", value),
            Some(id) => filter.insert("supplierId", id),
        };
    }
    let mut date_cond = Document::new();
    if let Some(value) = cond.bill_date_from.as_ref() {
        date_cond.insert("$gte", date_to_bson(value));
    }
    if let Some(value) = cond.bill_date_to.as_ref() {
        date_cond.insert("$lt", date_to_bson(&next_day(value)));
    }
    if date_cond.len() > 0 {
        filter.insert("billDate", date_cond);
    }
    filter
}

fn next_day(date: &NaiveDate) -> NaiveDate {
    date.checked_add_days(Days::new(1)).unwrap_or(*date)
}

fn opt_date(value: &Option<NaiveDate>) -> Bson {
    match value {
        None => Bson::Null,
        Some(value) => Bson::DateTime(date_to_bson(value)),
    }
}

/// Transforms the model object to the MongoDB document.
fn get_update_doc(updates: &Updates) -> Result<Option<Document>, Box<dyn StdError>> {
    let mut document = Document::new();
    if let Some(value) = updates.bill_no.as_ref() {
        document.insert("billNo", value.as_deref());
    }
    if let Some(value) = updates.bill_date.as_ref() {
        document.insert("billDate", opt_date(value));
    }
    if let Some(value) = updates.due_date.as_ref() {
        document.insert("dueDate", opt_date(value));
    }
    if let Some(value) = updates.supplier_id.as_ref() {
        document.insert("supplierId", opt_id(value.as_deref())?);
    }
    if let Some(value) = updates.supplier_gst.as_ref() {
        document.insert("supplierGst", value.as_deref());
    }
    if let Some(value) = updates.expense_head_id.as_ref() {
        document.insert("expenseHeadId", opt_id(value.as_deref())?);
    }
    if let Some(value) = updates.narration.as_ref() {
        document.insert("narration", value.as_deref());
    }
    if let Some(value) = updates.currency.as_ref() {
        document.insert("currency", value.as_str());
    }
    let amounts = [
        ("cgstAmount", &updates.cgst_amount),
        ("sgstAmount", &updates.sgst_amount),
        ("igstAmount", &updates.igst_amount),
        ("cessAmount", &updates.cess_amount),
        ("totalAmount", &updates.total_amount),
        ("netAmount", &updates.net_amount),
        ("tdsRate", &updates.tds_rate),
        ("tdsAmountCalculated", &updates.tds_amount_calculated),
        ("subTotalFromItems", &updates.sub_total_from_items),
        ("discountAmount", &updates.discount_amount),
        ("taxFromItems", &updates.tax_from_items),
        ("grandTotalFromItems", &updates.grand_total_from_items),
    ];
    for (key, value) in amounts {
        if let Some(value) = value {
            document.insert(key, *value);
        }
    }
    if let Some(value) = updates.tax_amount {
        document.insert("taxAmount", value);
    }
    if let Some(value) = updates.payment_method.as_ref() {
        document.insert("paymentMethod", value.as_deref());
    }
    if let Some(value) = updates.bill_source.as_ref() {
        document.insert("billSource", value.as_deref());
    }
    if let Some(value) = updates.status.as_ref() {
        document.insert("status", value.as_str());
    }
    if let Some(value) = updates.invoice_filename.as_ref() {
        document.insert("invoiceFilename", value.as_deref());
    }
    if let Some(value) = updates.line_items.as_ref() {
        let items: Vec<Document> = value
            .iter()
            .map(|item| bson::to_document(&to_line_item_schema(item)))
            .collect::<Result<_, _>>()?;
        document.insert("lineItems", items);
    }
    if document.len() == 0 {
        return Ok(None);
    }
    if let Some(value) = updates.modified_at.as_ref() {
        document.insert("modifiedAt", DateTime::from_chrono(*value));
    }
    if let Some(value) = updates.modified_by.as_ref() {
        document.insert("modifiedBy", value.as_str());
    }
    Ok(Some(doc! {"$set": document}))
}
