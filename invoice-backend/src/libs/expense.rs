//! Conversion of expense request bodies to the expense model.
//!
//! The expense form posts numbers as formatted strings and dates in either `YYYY-MM-DD` or
//! `DD/MM/YYYY`. The functions here normalize them and keep the tax totals consistent:
//! `taxAmount` is always the sum of the tax components.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use invoice_corelib::strings;

use super::coerce;
use crate::models::{
    self,
    expense::{Expense, LineItem, Updates},
};

pub const TRANSACTION_PREFIX: &'static str = "EXP-TRAN";
pub const DEF_STATUS: &'static str = "Draft";
pub const DEF_CURRENCY: &'static str = "INR";
pub const REQUIRED_MESSAGE: &'static str =
    "Missing required fields: billDate, totalAmount, supplierId, expenseHeadId";

const TAX_FIELDS: [&'static str; 4] = ["cgstAmount", "sgstAmount", "igstAmount", "cessAmount"];

/// To create an expense from the request body.
///
/// Returns the error message for missing required fields or invalid identifiers.
pub fn parse_new(
    body: &Map<String, Value>,
    expense_id: &str,
    tenant_id: &str,
    user: &str,
    now: &DateTime<Utc>,
) -> Result<Expense, String> {
    if !coerce::is_truthy(body.get("billDate"))
        || !coerce::is_truthy(body.get("supplierId"))
        || !coerce::is_truthy(body.get("expenseHeadId"))
        || is_null(body.get("totalAmount"))
    {
        return Err(REQUIRED_MESSAGE.to_string());
    }

    let cgst_amount = get_number(body, "cgstAmount");
    let sgst_amount = get_number(body, "sgstAmount");
    let igst_amount = get_number(body, "igstAmount");
    let cess_amount = get_number(body, "cessAmount");
    let tax_amount = tax_sum(cgst_amount, sgst_amount, igst_amount, cess_amount);
    let total_amount = get_number(body, "totalAmount");

    Ok(Expense {
        expense_id: expense_id.to_string(),
        tenant_id: tenant_id.to_string(),
        transaction_no: strings::transaction_number(TRANSACTION_PREFIX, now),
        bill_no: get_text(body, "billNo"),
        bill_date: body.get("billDate").and_then(coerce::date),
        due_date: body.get("dueDate").and_then(coerce::date),
        supplier_id: get_id(body, "supplierId")?,
        supplier_gst: get_text(body, "supplierGst"),
        expense_head_id: get_id(body, "expenseHeadId")?,
        narration: get_text(body, "narration"),
        currency: match get_text(body, "currency") {
            None => DEF_CURRENCY.to_string(),
            Some(currency) => currency,
        },
        cgst_amount,
        sgst_amount,
        igst_amount,
        cess_amount,
        tax_amount,
        total_amount,
        net_amount: get_number(body, "netAmount"),
        tds_rate: get_number(body, "tdsRate"),
        tds_amount_calculated: get_number(body, "tdsAmountCalculated"),
        payment_method: get_payment_method(body).unwrap_or(None),
        bill_source: get_text(body, "billSource"),
        status: match get_text(body, "status") {
            None => DEF_STATUS.to_string(),
            Some(status) => status,
        },
        invoice_filename: get_text(body, "invoiceFilename"),
        line_items: match body.get("lineItems") {
            None => vec![],
            Some(items) => line_items(items),
        },
        sub_total_from_items: get_number(body, "subTotalFromItems"),
        discount_amount: get_number(body, "discountAmount"),
        tax_from_items: Some(tax_amount),
        grand_total_from_items: total_amount,
        created_at: *now,
        modified_at: *now,
        modified_by: Some(user.to_string()),
    })
}

/// To get the updates of the request body. Only known fields are applied.
///
/// When any tax component is present, `taxAmount` is recomputed from the updated components and
/// the `stored` ones. The metadata fields are not filled.
pub fn parse_updates(body: &Map<String, Value>, stored: &Expense) -> Result<Updates, String> {
    let mut updates = Updates::default();

    if body.contains_key("billNo") {
        updates.bill_no = Some(get_text(body, "billNo"));
    }
    if body.contains_key("supplierGst") {
        updates.supplier_gst = Some(get_text(body, "supplierGst"));
    }
    if body.contains_key("narration") {
        updates.narration = Some(get_text(body, "narration"));
    }
    if let Some(currency) = get_text(body, "currency") {
        updates.currency = Some(currency);
    }
    if let Some(status) = get_text(body, "status") {
        updates.status = Some(status);
    }
    updates.payment_method = get_payment_method(body);
    if body.contains_key("billSource") {
        updates.bill_source = Some(get_text(body, "billSource"));
    }
    if body.contains_key("invoiceFilename") {
        updates.invoice_filename = Some(get_text(body, "invoiceFilename"));
    }

    if body.contains_key("supplierId") {
        updates.supplier_id = Some(get_id(body, "supplierId")?);
    }
    if body.contains_key("expenseHeadId") {
        updates.expense_head_id = Some(get_id(body, "expenseHeadId")?);
    }
    if let Some(value) = body.get("billDate") {
        updates.bill_date = Some(coerce::date(value));
    }
    if let Some(value) = body.get("dueDate") {
        updates.due_date = Some(coerce::date(value));
    }

    updates.total_amount = get_opt_number(body, "totalAmount");
    updates.net_amount = get_opt_number(body, "netAmount");
    updates.tds_rate = get_opt_number(body, "tdsRate");
    updates.tds_amount_calculated = get_opt_number(body, "tdsAmountCalculated");
    updates.sub_total_from_items = get_opt_number(body, "subTotalFromItems");
    updates.discount_amount = get_opt_number(body, "discountAmount");
    updates.cgst_amount = get_opt_number(body, "cgstAmount");
    updates.sgst_amount = get_opt_number(body, "sgstAmount");
    updates.igst_amount = get_opt_number(body, "igstAmount");
    updates.cess_amount = get_opt_number(body, "cessAmount");

    if TAX_FIELDS.iter().any(|f| body.contains_key(*f)) {
        let tax_amount = tax_sum(
            updates.cgst_amount.unwrap_or(stored.cgst_amount),
            updates.sgst_amount.unwrap_or(stored.sgst_amount),
            updates.igst_amount.unwrap_or(stored.igst_amount),
            updates.cess_amount.unwrap_or(stored.cess_amount),
        );
        updates.tax_amount = Some(tax_amount);
        updates.tax_from_items = Some(Some(tax_amount));
    }
    if let Some(total_amount) = updates.total_amount {
        updates.grand_total_from_items = Some(total_amount);
    }

    if let Some(items) = body.get("lineItems") {
        updates.line_items = Some(line_items(items));
    }
    Ok(updates)
}

/// The sum of the tax components. Missing components count as 0.
pub fn tax_sum(cgst: Option<f64>, sgst: Option<f64>, igst: Option<f64>, cess: Option<f64>) -> f64 {
    cgst.unwrap_or(0.0) + sgst.unwrap_or(0.0) + igst.unwrap_or(0.0) + cess.unwrap_or(0.0)
}

/// To parse line items from an array or its JSON string. Invalid values get no items.
pub fn line_items(value: &Value) -> Vec<LineItem> {
    let items = match coerce::array(value) {
        None => return vec![],
        Some(items) => items,
    };
    items
        .iter()
        .filter_map(|item| item.as_object())
        .map(|item| LineItem {
            description: get_text(item, "description"),
            hsn_code: get_text(item, "hsnCode"),
            qty: get_number(item, "qty"),
            price: get_number(item, "price"),
            subtotal: get_number(item, "subtotal"),
        })
        .collect()
}

fn is_null(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        _ => false,
    }
}

fn get_text(body: &Map<String, Value>, key: &str) -> Option<String> {
    body.get(key).and_then(coerce::text)
}

fn get_number(body: &Map<String, Value>, key: &str) -> Option<f64> {
    body.get(key).and_then(coerce::number)
}

fn get_opt_number(body: &Map<String, Value>, key: &str) -> Option<Option<f64>> {
    body.get(key).map(coerce::number)
}

/// The form sends `paymentMethodPublish` while API clients send `paymentMethod`.
fn get_payment_method(body: &Map<String, Value>) -> Option<Option<String>> {
    for key in ["paymentMethod", "paymentMethodPublish"] {
        if body.contains_key(key) {
            return Some(get_text(body, key));
        }
    }
    None
}

/// Empty values get `None`. Invalid identifiers are errors.
fn get_id(body: &Map<String, Value>, key: &str) -> Result<Option<String>, String> {
    match get_text(body, key) {
        None => Ok(None),
        Some(id) => match models::is_id(id.as_str()) {
            false => Err(format!("Invalid {} format", key)),
            true => Ok(Some(id)),
        },
    }
}
