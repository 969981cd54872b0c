use axum::http::{StatusCode, header};
use axum_test::TestServer;
use chrono::Utc;
use laboratory::{SpecContext, expect};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tokio::runtime::Runtime;

use invoice_backend::{
    libs::expense::{REQUIRED_MESSAGE, TRANSACTION_PREFIX},
    models::{self, Model, record::Record},
};
use invoice_corelib::role::Role;

use super::super::{
    STATE,
    libs::{ApiError, bearer, expect_error, get_token, new_server, str_of, to_map},
};
use crate::TestState;

#[derive(Deserialize)]
struct DataRes {
    message: String,
    data: Map<String, Value>,
}

#[derive(Deserialize)]
struct ListRes {
    data: Vec<Map<String, Value>>,
    total: u64,
    limit: u64,
    #[serde(rename = "totalPages")]
    total_pages: u64,
}

/// IDs of the seeded vendor and account.
struct Refs {
    supplier_id: String,
    expense_head_id: String,
}

pub fn post(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let memory = state.memory.as_ref().unwrap();
    let routes_state = state.routes_state.as_ref().unwrap();
    let server = new_server(routes_state);
    const TENANT: &'static str = "expense_post";
    let token = get_token(routes_state, "user", TENANT, &[Role::USER]);
    let refs = add_refs(runtime, routes_state.model.as_ref(), TENANT);

    let body = json!({
        "billNo": "INV-1",
        "billDate": "2024-04-15",
        "dueDate": "15/05/2024",
        "supplierId": refs.supplier_id,
        "expenseHeadId": refs.expense_head_id,
        "totalAmount": "1,180",
        "cgstAmount": 90,
        "sgstAmount": "90",
        "paymentMethodPublish": "Cash",
        "lineItems": "[{\"description\":\"A4 paper\",\"qty\":\"2\",\"price\":500,\"subtotal\":1000}]",
    });
    let result = post_expense(runtime, &server, token.as_str(), &body)?;
    expect(result.message.as_str()).to_equal("Expense created successfully")?;
    let data = &result.data;
    let transaction_no = str_of(data, "transactionNo").unwrap_or("");
    expect(transaction_no.starts_with(format!("{}-", TRANSACTION_PREFIX).as_str()))
        .to_equal(true)?;
    expect(str_of(data, "tenantId")).to_equal(Some(TENANT))?;
    expect(str_of(data, "billNo")).to_equal(Some("INV-1"))?;
    expect(str_of(data, "billDate")).to_equal(Some("15/04/2024"))?;
    expect(str_of(data, "dueDate")).to_equal(Some("15/05/2024"))?;
    expect(str_of(data, "supplierName")).to_equal(Some("Paper Mart"))?;
    expect(str_of(data, "expenseHeadName")).to_equal(Some("Office"))?;
    expect(data.get("totalAmount")).to_equal(Some(&json!(1180.0)))?;
    expect(data.get("taxAmount")).to_equal(Some(&json!(180.0)))?;
    expect(data.get("taxFromItems")).to_equal(Some(&json!(180.0)))?;
    expect(data.get("grandTotalFromItems")).to_equal(Some(&json!(1180.0)))?;
    expect(data.get("igstAmount")).to_equal(Some(&Value::Null))?;
    expect(str_of(data, "paymentMethod")).to_equal(Some("Cash"))?;
    expect(str_of(data, "status")).to_equal(Some("Draft"))?;
    expect(str_of(data, "currency")).to_equal(Some("INR"))?;
    expect(str_of(data, "modifiedBy")).to_equal(Some("user"))?;
    expect(data.get("lineItems")).to_equal(Some(&json!([{
        "description": "A4 paper",
        "hsnCode": null,
        "qty": 2.0,
        "price": 500.0,
        "subtotal": 1000.0,
    }])))?;

    let id = str_of(data, "_id").unwrap_or("").to_string();
    let activity = memory
        .activities()
        .into_iter()
        .find(|a| a.document_id.as_deref() == Some(id.as_str()));
    match activity {
        None => return Err("should log the creation".to_string()),
        Some(activity) => {
            expect(activity.action_type.as_str()).to_equal("CREATE_EXPENSE")?;
            expect(activity.tenant_id.as_str()).to_equal(TENANT)?;
            expect(activity.collection_name.as_deref()).to_equal(Some("expenses"))?;
        }
    }

    // References of other tenants are not resolved.
    let other = add_refs(runtime, routes_state.model.as_ref(), "expense_post_other");
    let body = json!({
        "billDate": "2024-04-16",
        "supplierId": other.supplier_id,
        "expenseHeadId": other.expense_head_id,
        "totalAmount": 0,
        "status": "Paid",
        "currency": "USD",
    });
    let result = post_expense(runtime, &server, token.as_str(), &body)?;
    let data = &result.data;
    expect(data.get("supplierName")).to_equal(Some(&Value::Null))?;
    expect(data.get("expenseHeadName")).to_equal(Some(&Value::Null))?;
    expect(data.get("taxAmount")).to_equal(Some(&json!(0.0)))?;
    expect(str_of(data, "status")).to_equal(Some("Paid"))?;
    expect(str_of(data, "currency")).to_equal(Some("USD"))
}

pub fn post_invalid(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let routes_state = state.routes_state.as_ref().unwrap();
    let server = new_server(routes_state);
    const TENANT: &'static str = "expense_invalid";
    let token = get_token(routes_state, "user", TENANT, &[Role::USER]);
    let refs = add_refs(runtime, routes_state.model.as_ref(), TENANT);

    let valid = json!({
        "billDate": "2024-04-15",
        "supplierId": refs.supplier_id,
        "expenseHeadId": refs.expense_head_id,
        "totalAmount": 100,
    });
    let cases = [
        ("billDate", Value::Null, REQUIRED_MESSAGE),
        ("billDate", json!(""), REQUIRED_MESSAGE),
        ("supplierId", Value::Null, REQUIRED_MESSAGE),
        ("expenseHeadId", json!(""), REQUIRED_MESSAGE),
        ("totalAmount", Value::Null, REQUIRED_MESSAGE),
        ("supplierId", json!("abc"), "Invalid supplierId format"),
        ("expenseHeadId", json!("abc"), "Invalid expenseHeadId format"),
    ];
    for (key, value, message) in cases.iter() {
        let mut body = to_map(valid.clone());
        body.insert(key.to_string(), value.clone());
        let req = server
            .post("/api/expenses")
            .add_header(header::AUTHORIZATION, bearer(token.as_str()))
            .json(&body);
        let resp = runtime.block_on(async { req.await });
        if let Err(e) = expect_error(&resp, StatusCode::BAD_REQUEST, "err_param") {
            return Err(format!("{}={}: {}", key, value, e));
        }
        let err: ApiError = resp.json();
        expect(err.message.as_deref()).to_equal(Some(*message))?;
    }

    // A zero total is accepted.
    let mut body = to_map(valid.clone());
    body.insert("totalAmount".to_string(), json!(0));
    post_expense(runtime, &server, token.as_str(), &Value::Object(body))?;

    let req = server
        .post("/api/expenses")
        .add_header(header::AUTHORIZATION, bearer(token.as_str()))
        .json(&json!([valid]));
    let resp = runtime.block_on(async { req.await });
    expect_error(&resp, StatusCode::BAD_REQUEST, "err_param")
}

pub fn get(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let routes_state = state.routes_state.as_ref().unwrap();
    let server = new_server(routes_state);
    const TENANT: &'static str = "expense_get";
    let token = get_token(routes_state, "user", TENANT, &[Role::USER]);
    let refs = add_refs(runtime, routes_state.model.as_ref(), TENANT);

    let body = new_body(&refs, "INV-G", "2024-04-15", 100, "Draft");
    let result = post_expense(runtime, &server, token.as_str(), &body)?;
    let id = str_of(&result.data, "_id").unwrap_or("").to_string();

    let req = server
        .get(format!("/api/expenses/{}", id).as_str())
        .add_header(header::AUTHORIZATION, bearer(token.as_str()));
    let resp = runtime.block_on(async { req.await });
    expect(resp.status_code()).to_equal(StatusCode::OK)?;
    let got: Map<String, Value> = resp.json();
    expect(got).to_equal(result.data.clone())?;

    let other_token = get_token(routes_state, "user", "expense_get_other", &[Role::USER]);
    let req = server
        .get(format!("/api/expenses/{}", id).as_str())
        .add_header(header::AUTHORIZATION, bearer(other_token.as_str()));
    let resp = runtime.block_on(async { req.await });
    expect_error(&resp, StatusCode::NOT_FOUND, "err_not_found")?;
    let err: ApiError = resp.json();
    expect(err.message.as_deref()).to_equal(Some("Expense not found"))?;

    let req = server
        .get("/api/expenses/123")
        .add_header(header::AUTHORIZATION, bearer(token.as_str()));
    let resp = runtime.block_on(async { req.await });
    expect_error(&resp, StatusCode::BAD_REQUEST, "err_param")?;
    let err: ApiError = resp.json();
    expect(err.message.as_deref()).to_equal(Some("Invalid expense ID format"))
}

pub fn list(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let routes_state = state.routes_state.as_ref().unwrap();
    let server = new_server(routes_state);
    const TENANT: &'static str = "expense_list";
    let token = get_token(routes_state, "user", TENANT, &[Role::USER]);
    let refs = add_refs(runtime, routes_state.model.as_ref(), TENANT);
    let other_refs = add_refs(runtime, routes_state.model.as_ref(), TENANT);

    let bodies = [
        new_body(&refs, "A-1", "2024-01-10", 300, "Draft"),
        new_body(&refs, "B-1", "2024-02-15", 100, "Paid"),
        new_body(&other_refs, "C-1", "20/03/2024", 500, "Draft"),
    ];
    for body in bodies.iter() {
        post_expense(runtime, &server, token.as_str(), body)?;
    }

    let list = get_list(runtime, &server, token.as_str(), &[])?;
    expect(bill_nos(&list)).to_equal(vec!["C-1", "B-1", "A-1"])?;
    expect(list.total).to_equal(3)?;
    expect(list.limit).to_equal(10)?;
    expect(list.total_pages).to_equal(1)?;

    let query = [("sortBy", "totalAmount"), ("sortOrder", "asc")];
    let list = get_list(runtime, &server, token.as_str(), &query)?;
    expect(bill_nos(&list)).to_equal(vec!["B-1", "A-1", "C-1"])?;

    let query = [("sortBy", "billNo"), ("sortOrder", "ASC"), ("page", "2"), ("limit", "2")];
    let list = get_list(runtime, &server, token.as_str(), &query)?;
    expect(bill_nos(&list)).to_equal(vec!["C-1"])?;
    expect(list.total).to_equal(3)?;
    expect(list.total_pages).to_equal(2)?;

    // A limit that is not a number lists all.
    let query = [("limit", "all")];
    let list = get_list(runtime, &server, token.as_str(), &query)?;
    expect(list.data.len()).to_equal(3)?;
    expect(list.limit).to_equal(3)?;

    let query = [("status", "Paid")];
    let list = get_list(runtime, &server, token.as_str(), &query)?;
    expect(bill_nos(&list)).to_equal(vec!["B-1"])?;

    let query = [("status", "All")];
    let list = get_list(runtime, &server, token.as_str(), &query)?;
    expect(list.total).to_equal(3)?;

    let query = [("supplierId", other_refs.supplier_id.as_str())];
    let list = get_list(runtime, &server, token.as_str(), &query)?;
    expect(bill_nos(&list)).to_equal(vec!["C-1"])?;

    let query = [("dateFrom", "2024-02-01"), ("dateTo", "20/03/2024")];
    let list = get_list(runtime, &server, token.as_str(), &query)?;
    expect(bill_nos(&list)).to_equal(vec!["C-1", "B-1"])?;

    let query = [("search", "a-")];
    let list = get_list(runtime, &server, token.as_str(), &query)?;
    expect(bill_nos(&list)).to_equal(vec!["A-1"])?;

    let other_token = get_token(routes_state, "user", "expense_list_other", &[Role::USER]);
    let list = get_list(runtime, &server, other_token.as_str(), &[])?;
    expect(list.total).to_equal(0)?;

    // Large limits are capped and offsets that cannot be skipped are rejected.
    let query = [("page", "4"), ("limit", "9223372036854775807")];
    let list = get_list(runtime, &server, token.as_str(), &query)?;
    expect(list.limit).to_equal(1000)?;
    expect(list.data.len()).to_equal(0)?;

    let queries = [
        [("page", "x"), ("limit", "10")],
        [("page", "9223372036854775807"), ("limit", "1000")],
    ];
    for query in queries.iter() {
        let req = server
            .get("/api/expenses")
            .add_query_params(query)
            .add_header(header::AUTHORIZATION, bearer(token.as_str()));
        let resp = runtime.block_on(async { req.await });
        expect_error(&resp, StatusCode::BAD_REQUEST, "err_param")?;
    }
    Ok(())
}

pub fn list_invalid_sort(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let routes_state = state.routes_state.as_ref().unwrap();
    let server = new_server(routes_state);
    let token = get_token(routes_state, "user", "expense_list", &[Role::USER]);

    let req = server
        .get("/api/expenses")
        .add_query_param("sortBy", "foo")
        .add_header(header::AUTHORIZATION, bearer(token.as_str()));
    let resp = runtime.block_on(async { req.await });
    expect_error(&resp, StatusCode::BAD_REQUEST, "err_param")?;
    let err: ApiError = resp.json();
    expect(err.message.as_deref()).to_equal(Some("Invalid sort key: foo"))
}

pub fn put(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let memory = state.memory.as_ref().unwrap();
    let routes_state = state.routes_state.as_ref().unwrap();
    let server = new_server(routes_state);
    const TENANT: &'static str = "expense_put";
    let token = get_token(routes_state, "user", TENANT, &[Role::USER]);
    let refs = add_refs(runtime, routes_state.model.as_ref(), TENANT);

    let mut body = to_map(new_body(&refs, "P-1", "2024-04-15", 1180, "Draft"));
    body.insert("cgstAmount".to_string(), json!(90));
    body.insert("sgstAmount".to_string(), json!(90));
    let result = post_expense(runtime, &server, token.as_str(), &Value::Object(body))?;
    let id = str_of(&result.data, "_id").unwrap_or("").to_string();
    let uri = format!("/api/expenses/{}", id);

    let editor_token = get_token(routes_state, "editor", TENANT, &[Role::USER]);
    let body = json!({"status": "Paid", "igstAmount": "10", "billNo": null, "dueDate": "2024-05-01"});
    let req = server
        .put(uri.as_str())
        .add_header(header::AUTHORIZATION, bearer(editor_token.as_str()))
        .json(&body);
    let resp = runtime.block_on(async { req.await });
    expect(resp.status_code()).to_equal(StatusCode::OK)?;
    let updated: DataRes = resp.json();
    expect(updated.message.as_str()).to_equal("Expense updated successfully")?;
    let data = &updated.data;
    expect(str_of(data, "status")).to_equal(Some("Paid"))?;
    expect(data.get("igstAmount")).to_equal(Some(&json!(10.0)))?;
    expect(data.get("taxAmount")).to_equal(Some(&json!(190.0)))?;
    expect(data.get("billNo")).to_equal(Some(&Value::Null))?;
    expect(str_of(data, "dueDate")).to_equal(Some("01/05/2024"))?;
    expect(str_of(data, "billDate")).to_equal(Some("15/04/2024"))?;
    expect(str_of(data, "modifiedBy")).to_equal(Some("editor"))?;
    expect(str_of(data, "transactionNo")).to_equal(str_of(&result.data, "transactionNo"))?;
    expect(str_of(data, "supplierName")).to_equal(Some("Paper Mart"))?;

    let activity = memory
        .activities()
        .into_iter()
        .find(|a| a.document_id.as_deref() == Some(id.as_str()) && a.action_type == "UPDATE_EXPENSE");
    expect(activity.is_some()).to_equal(true)?;

    for body in [json!({}), json!({"unknown": 1})].iter() {
        let req = server
            .put(uri.as_str())
            .add_header(header::AUTHORIZATION, bearer(token.as_str()))
            .json(body);
        let resp = runtime.block_on(async { req.await });
        expect_error(&resp, StatusCode::BAD_REQUEST, "err_param")?;
        let err: ApiError = resp.json();
        expect(err.message.as_deref()).to_equal(Some("no effective changes"))?;
    }

    let req = server
        .put(uri.as_str())
        .add_header(header::AUTHORIZATION, bearer(token.as_str()))
        .json(&json!({"supplierId": "abc"}));
    let resp = runtime.block_on(async { req.await });
    expect_error(&resp, StatusCode::BAD_REQUEST, "err_param")?;

    let other_token = get_token(routes_state, "user", "expense_put_other", &[Role::USER]);
    let req = server
        .put(uri.as_str())
        .add_header(header::AUTHORIZATION, bearer(other_token.as_str()))
        .json(&body);
    let resp = runtime.block_on(async { req.await });
    expect_error(&resp, StatusCode::NOT_FOUND, "err_not_found")
}

pub fn delete(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let routes_state = state.routes_state.as_ref().unwrap();
    let server = new_server(routes_state);
    const TENANT: &'static str = "expense_delete";
    let token = get_token(routes_state, "user", TENANT, &[Role::USER]);
    let refs = add_refs(runtime, routes_state.model.as_ref(), TENANT);

    let body = new_body(&refs, "D-1", "2024-04-15", 100, "Draft");
    let result = post_expense(runtime, &server, token.as_str(), &body)?;
    let id = str_of(&result.data, "_id").unwrap_or("").to_string();
    let uri = format!("/api/expenses/{}", id);

    let other_token = get_token(routes_state, "user", "expense_delete_other", &[Role::USER]);
    let req = server
        .delete(uri.as_str())
        .add_header(header::AUTHORIZATION, bearer(other_token.as_str()));
    let resp = runtime.block_on(async { req.await });
    expect_error(&resp, StatusCode::NOT_FOUND, "err_not_found")?;

    let req = server
        .delete(uri.as_str())
        .add_header(header::AUTHORIZATION, bearer(token.as_str()));
    let resp = runtime.block_on(async { req.await });
    expect(resp.status_code()).to_equal(StatusCode::OK)?;
    let body: Value = resp.json();
    expect(body.get("message")).to_equal(Some(&json!("Expense deleted successfully")))?;

    let req = server
        .delete(uri.as_str())
        .add_header(header::AUTHORIZATION, bearer(token.as_str()));
    let resp = runtime.block_on(async { req.await });
    expect_error(&resp, StatusCode::NOT_FOUND, "err_not_found")?;

    let req = server
        .delete("/api/expenses/invalid")
        .add_header(header::AUTHORIZATION, bearer(token.as_str()));
    let resp = runtime.block_on(async { req.await });
    expect_error(&resp, StatusCode::BAD_REQUEST, "err_param")
}

/// To add a vendor `Paper Mart` and an account `Office` of the tenant.
fn add_refs(runtime: &Runtime, model: &dyn Model, tenant_id: &str) -> Refs {
    let now = Utc::now();
    let vendor = Record {
        record_id: models::new_id(),
        tenant_id: tenant_id.to_string(),
        created_at: now,
        modified_at: now,
        modified_by: None,
        fields: to_map(json!({"displayName": "Paper Mart"})),
    };
    let account = Record {
        record_id: models::new_id(),
        tenant_id: tenant_id.to_string(),
        created_at: now,
        modified_at: now,
        modified_by: None,
        fields: to_map(json!({"name": "Office", "code": "5000", "accountType": "Expense"})),
    };
    runtime.block_on(async {
        if let Err(e) = model.vendor().add(&vendor).await {
            panic!("add vendor error: {}", e);
        }
        if let Err(e) = model.account().add(&account).await {
            panic!("add account error: {}", e);
        }
    });
    Refs {
        supplier_id: vendor.record_id,
        expense_head_id: account.record_id,
    }
}

fn new_body(refs: &Refs, bill_no: &str, bill_date: &str, total: i64, status: &str) -> Value {
    json!({
        "billNo": bill_no,
        "billDate": bill_date,
        "supplierId": refs.supplier_id,
        "expenseHeadId": refs.expense_head_id,
        "totalAmount": total,
        "status": status,
    })
}

fn post_expense(
    runtime: &Runtime,
    server: &TestServer,
    token: &str,
    body: &Value,
) -> Result<DataRes, String> {
    let req = server
        .post("/api/expenses")
        .add_header(header::AUTHORIZATION, bearer(token))
        .json(body);
    let resp = runtime.block_on(async { req.await });
    if resp.status_code() != StatusCode::CREATED {
        return Err(format!(
            "POST expense status {}: {}",
            resp.status_code(),
            resp.text()
        ));
    }
    Ok(resp.json())
}

fn get_list(
    runtime: &Runtime,
    server: &TestServer,
    token: &str,
    query: &[(&str, &str)],
) -> Result<ListRes, String> {
    let req = server
        .get("/api/expenses")
        .add_query_params(query)
        .add_header(header::AUTHORIZATION, bearer(token));
    let resp = runtime.block_on(async { req.await });
    if resp.status_code() != StatusCode::OK {
        return Err(format!(
            "GET expenses status {}: {}",
            resp.status_code(),
            resp.text()
        ));
    }
    Ok(resp.json())
}

fn bill_nos(list: &ListRes) -> Vec<&str> {
    list.data
        .iter()
        .map(|d| str_of(d, "billNo").unwrap_or(""))
        .collect()
}
