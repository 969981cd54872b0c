use chrono::{NaiveDate, TimeZone, Utc};
use laboratory::{SpecContext, expect};
use serde_json::{Map, Value, json};

use invoice_backend::{
    libs::expense,
    models::{self, expense::LineItem},
};

use crate::TestState;

fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Test [`expense::parse_new`].
pub fn parse_new(_context: &mut SpecContext<TestState>) -> Result<(), String> {
    let supplier_id = models::new_id();
    let head_id = models::new_id();
    let now = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
    let body = fields(json!({
        "billNo": "B-001",
        "billDate": "15/04/2024",
        "dueDate": "2024-05-15",
        "supplierId": supplier_id,
        "expenseHeadId": head_id,
        "totalAmount": "1,180.00",
        "cgstAmount": "90",
        "sgstAmount": 90,
        "paymentMethodPublish": "Cash",
        "lineItems": "[{\"description\":\"Paper\",\"qty\":\"2\",\"price\":500,\"subtotal\":\"1000\"}]",
    }));
    let item = expense::parse_new(&body, "expense-id", "tenant1", "tester", &now)?;
    expect(item.expense_id.as_str()).to_equal("expense-id")?;
    expect(item.tenant_id.as_str()).to_equal("tenant1")?;
    expect(item.transaction_no.starts_with(expense::TRANSACTION_PREFIX)).to_equal(true)?;
    expect(item.bill_no.as_deref()).to_equal(Some("B-001"))?;
    expect(item.bill_date).to_equal(NaiveDate::from_ymd_opt(2024, 4, 15))?;
    expect(item.due_date).to_equal(NaiveDate::from_ymd_opt(2024, 5, 15))?;
    expect(item.supplier_id.as_deref()).to_equal(Some(supplier_id.as_str()))?;
    expect(item.expense_head_id.as_deref()).to_equal(Some(head_id.as_str()))?;
    expect(item.currency.as_str()).to_equal(expense::DEF_CURRENCY)?;
    expect(item.status.as_str()).to_equal(expense::DEF_STATUS)?;
    expect(item.cgst_amount).to_equal(Some(90.0))?;
    expect(item.sgst_amount).to_equal(Some(90.0))?;
    expect(item.igst_amount).to_equal(None)?;
    expect(item.tax_amount).to_equal(180.0)?;
    expect(item.tax_from_items).to_equal(Some(180.0))?;
    expect(item.total_amount).to_equal(Some(1180.0))?;
    expect(item.grand_total_from_items).to_equal(Some(1180.0))?;
    expect(item.payment_method.as_deref()).to_equal(Some("Cash"))?;
    expect(item.line_items.len()).to_equal(1)?;
    expect(item.line_items[0].qty).to_equal(Some(2.0))?;
    expect(item.line_items[0].subtotal).to_equal(Some(1000.0))?;
    expect(item.created_at).to_equal(now)?;
    expect(item.modified_by.as_deref()).to_equal(Some("tester"))
}

/// Test [`expense::parse_new`] with missing required fields.
pub fn parse_new_missing(_context: &mut SpecContext<TestState>) -> Result<(), String> {
    let now = Utc::now();
    let complete = json!({
        "billDate": "2024-04-15",
        "supplierId": models::new_id(),
        "expenseHeadId": models::new_id(),
        "totalAmount": 0,
    });
    let body = fields(complete.clone());
    expect(expense::parse_new(&body, "id", "tenant1", "tester", &now).is_ok()).to_equal(true)?;

    for key in ["billDate", "supplierId", "expenseHeadId", "totalAmount"] {
        let mut body = fields(complete.clone());
        body.remove(key);
        match expense::parse_new(&body, "id", "tenant1", "tester", &now) {
            Ok(_) => return Err(format!("missing {} should fail", key)),
            Err(e) => expect(e.as_str()).to_equal(expense::REQUIRED_MESSAGE)?,
        }
    }

    let mut body = fields(complete);
    body.insert("supplierId".to_string(), json!(""));
    match expense::parse_new(&body, "id", "tenant1", "tester", &now) {
        Ok(_) => Err("empty supplierId should fail".to_string()),
        Err(e) => expect(e.as_str()).to_equal(expense::REQUIRED_MESSAGE),
    }
}

/// Test [`expense::parse_new`] with invalid identifiers.
pub fn parse_new_invalid_id(_context: &mut SpecContext<TestState>) -> Result<(), String> {
    let body = fields(json!({
        "billDate": "2024-04-15",
        "supplierId": "not-an-id",
        "expenseHeadId": models::new_id(),
        "totalAmount": 10,
    }));
    match expense::parse_new(&body, "id", "tenant1", "tester", &Utc::now()) {
        Ok(_) => Err("invalid supplierId should fail".to_string()),
        Err(e) => expect(e.as_str()).to_equal("Invalid supplierId format"),
    }
}

/// Test [`expense::parse_updates`].
pub fn parse_updates(_context: &mut SpecContext<TestState>) -> Result<(), String> {
    let body = fields(json!({
        "billDate": "2024-04-15",
        "supplierId": models::new_id(),
        "expenseHeadId": models::new_id(),
        "totalAmount": 200,
        "cgstAmount": 10,
        "sgstAmount": 10,
    }));
    let stored = expense::parse_new(&body, "id", "tenant1", "tester", &Utc::now())?;

    let body = fields(json!({
        "igstAmount": "5",
        "sgstAmount": "",
        "narration": "",
        "status": "Approved",
        "dueDate": "bad date",
        "totalAmount": "300",
        "paymentMethod": "Bank",
        "lineItems": [{"description": "Ink"}],
        "unknown": 1,
    }));
    let updates = expense::parse_updates(&body, &stored)?;
    expect(updates.igst_amount).to_equal(Some(Some(5.0)))?;
    expect(updates.sgst_amount).to_equal(Some(None))?;
    expect(updates.cgst_amount).to_equal(None)?;
    expect(updates.tax_amount).to_equal(Some(15.0))?;
    expect(updates.tax_from_items).to_equal(Some(Some(15.0)))?;
    expect(updates.narration.clone()).to_equal(Some(None))?;
    expect(updates.status.as_deref()).to_equal(Some("Approved"))?;
    expect(updates.due_date).to_equal(Some(None))?;
    expect(updates.bill_date).to_equal(None)?;
    expect(updates.total_amount).to_equal(Some(Some(300.0)))?;
    expect(updates.grand_total_from_items).to_equal(Some(Some(300.0)))?;
    expect(updates.payment_method.clone()).to_equal(Some(Some("Bank".to_string())))?;
    expect(updates.is_empty()).to_equal(false)?;
    expect(updates.line_items).to_equal(Some(vec![LineItem {
        description: Some("Ink".to_string()),
        ..Default::default()
    }]))?;

    let body = fields(json!({ "expenseHeadId": "bad" }));
    match expense::parse_updates(&body, &stored) {
        Ok(_) => Err("invalid expenseHeadId should fail".to_string()),
        Err(e) => expect(e.as_str()).to_equal("Invalid expenseHeadId format"),
    }
}

/// Test [`expense::parse_updates`] without known fields.
pub fn parse_updates_empty(_context: &mut SpecContext<TestState>) -> Result<(), String> {
    let body = fields(json!({
        "billDate": "2024-04-15",
        "supplierId": models::new_id(),
        "expenseHeadId": models::new_id(),
        "totalAmount": 1,
    }));
    let stored = expense::parse_new(&body, "id", "tenant1", "tester", &Utc::now())?;
    let body = fields(json!({ "_id": "x", "tenantId": "other", "foo": "bar" }));
    let updates = expense::parse_updates(&body, &stored)?;
    expect(updates.is_empty()).to_equal(true)?;
    expect(updates.tax_amount).to_equal(None)
}

/// Test [`expense::line_items`].
pub fn line_items(_context: &mut SpecContext<TestState>) -> Result<(), String> {
    expect(expense::line_items(&json!("not json")).len()).to_equal(0)?;
    expect(expense::line_items(&json!({"description": "x"})).len()).to_equal(0)?;
    let items = expense::line_items(&json!([
        {"description": "Paper", "hsnCode": "4802", "qty": "3", "price": "$10", "subtotal": 30},
        "skip",
        {}
    ]));
    expect(items.len()).to_equal(2)?;
    expect(items[0].clone()).to_equal(LineItem {
        description: Some("Paper".to_string()),
        hsn_code: Some("4802".to_string()),
        qty: Some(3.0),
        price: Some(10.0),
        subtotal: Some(30.0),
    })?;
    expect(items[1].clone()).to_equal(LineItem::default())?;
    expect(expense::tax_sum(Some(1.5), None, Some(2.0), None)).to_equal(3.5)
}
