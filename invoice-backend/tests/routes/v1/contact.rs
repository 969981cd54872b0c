use axum::http::{StatusCode, header};
use axum_test::TestServer;
use chrono::Utc;
use laboratory::{SpecContext, expect};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tokio::runtime::Runtime;

use invoice_backend::routes;
use invoice_corelib::role::Role;

use super::super::{
    STATE,
    libs::{bearer, expect_error, get_token, new_server, str_of, to_map},
};
use crate::TestState;

#[derive(Deserialize)]
struct DataRes {
    message: String,
    data: Map<String, Value>,
}

#[derive(Deserialize)]
struct ListRes {
    message: String,
    data: Vec<Map<String, Value>>,
}

const NOT_EXIST_ID: &'static str = "000000000000000000000000";

/// To save the company of the tenant and returns its ID.
fn add_company(runtime: &Runtime, state: &routes::State, tenant_id: &str) -> Result<String, String> {
    let fields = to_map(json!({"organizationType": "Partnership", "companyName": "Acme"}));
    match runtime.block_on(async {
        state
            .model
            .company()
            .upsert(tenant_id, &fields, Utc::now(), "tester")
            .await
    }) {
        Err(e) => Err(format!("add company error: {}", e)),
        Ok(id) => Ok(id),
    }
}

/// To create a contact and returns its ID.
fn post_contact(
    runtime: &Runtime,
    server: &TestServer,
    token: &str,
    body: &Value,
) -> Result<String, String> {
    let req = server
        .post("/api/contacts")
        .add_header(header::AUTHORIZATION, bearer(token))
        .json(body);
    let resp = runtime.block_on(async { req.await });
    expect(resp.status_code()).to_equal(StatusCode::CREATED)?;
    let result: DataRes = resp.json();
    match str_of(&result.data, "_id") {
        None => Err("no contact ID".to_string()),
        Some(id) => Ok(id.to_string()),
    }
}

/// Returns `(name, isDefault)` of all contacts.
fn get_list(runtime: &Runtime, server: &TestServer, token: &str) -> Vec<(String, bool)> {
    let req = server
        .get("/api/contacts")
        .add_header(header::AUTHORIZATION, bearer(token));
    let resp = runtime.block_on(async { req.await });
    let list: Vec<Map<String, Value>> = resp.json();
    list.iter()
        .map(|c| {
            (
                str_of(c, "name").unwrap_or("").to_string(),
                c.get("isDefault") == Some(&Value::Bool(true)),
            )
        })
        .collect()
}

fn names(list: &[(&str, bool)]) -> Vec<(String, bool)> {
    list.iter().map(|(n, d)| (n.to_string(), *d)).collect()
}

pub fn post_no_company(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let routes_state = state.routes_state.as_ref().unwrap();
    let server = new_server(routes_state);
    let token = get_token(routes_state, "user", "contact_none", &[Role::USER]);

    let req = server
        .post("/api/contacts")
        .add_header(header::AUTHORIZATION, bearer(token.as_str()))
        .json(&json!({"name": "A"}));
    let resp = runtime.block_on(async { req.await });
    expect_error(&resp, StatusCode::CONFLICT, "err_backend_company_not_exist")?;

    let req = server
        .put("/api/contacts")
        .add_header(header::AUTHORIZATION, bearer(token.as_str()))
        .json(&json!([{"name": "A"}]));
    let resp = runtime.block_on(async { req.await });
    expect_error(&resp, StatusCode::CONFLICT, "err_backend_company_not_exist")?;

    let req = server
        .get("/api/contacts")
        .add_header(header::AUTHORIZATION, bearer(token.as_str()));
    let resp = runtime.block_on(async { req.await });
    expect(resp.status_code()).to_equal(StatusCode::OK)?;
    let list: Vec<Value> = resp.json();
    expect(list.len()).to_equal(0)
}

pub fn post_list(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let routes_state = state.routes_state.as_ref().unwrap();
    let server = new_server(routes_state);
    const TENANT: &'static str = "contact_post";
    let token = get_token(routes_state, "user", TENANT, &[Role::USER]);
    let company_id = add_company(runtime, routes_state, TENANT)?;

    let body = json!({
        "name": "A",
        "email": "a@example.com",
        "isDefault": true,
        "companyId": "another",
        "tenantId": "another",
    });
    let req = server
        .post("/api/contacts")
        .add_header(header::AUTHORIZATION, bearer(token.as_str()))
        .json(&body);
    let resp = runtime.block_on(async { req.await });
    expect(resp.status_code()).to_equal(StatusCode::CREATED)?;
    let result: DataRes = resp.json();
    expect(result.message.as_str()).to_equal("Contact created successfully")?;
    let data = &result.data;
    expect(str_of(data, "name")).to_equal(Some("A"))?;
    expect(str_of(data, "email")).to_equal(Some("a@example.com"))?;
    expect(str_of(data, "companyId")).to_equal(Some(company_id.as_str()))?;
    expect(str_of(data, "tenantId")).to_equal(Some(TENANT))?;
    expect(data.get("isDefault")).to_equal(Some(&json!(true)))?;
    expect(str_of(data, "modifiedBy")).to_equal(Some("user"))?;

    post_contact(runtime, &server, token.as_str(), &json!({"name": "B", "isDefault": "on"}))?;
    expect(get_list(runtime, &server, token.as_str()))
        .to_equal(names(&[("A", false), ("B", true)]))?;
    post_contact(runtime, &server, token.as_str(), &json!({"name": "C"}))?;
    expect(get_list(runtime, &server, token.as_str()))
        .to_equal(names(&[("A", false), ("B", true), ("C", false)]))?;

    let req = server
        .post("/api/contacts")
        .add_header(header::AUTHORIZATION, bearer(token.as_str()))
        .json(&json!([{"name": "D"}]));
    let resp = runtime.block_on(async { req.await });
    expect_error(&resp, StatusCode::BAD_REQUEST, "err_param")?;

    // Contacts of other tenants are invisible.
    let other_token = get_token(routes_state, "user", "contact_post_other", &[Role::USER]);
    expect(get_list(runtime, &server, other_token.as_str()).len()).to_equal(0)
}

pub fn put(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let routes_state = state.routes_state.as_ref().unwrap();
    let server = new_server(routes_state);
    const TENANT: &'static str = "contact_put";
    let token = get_token(routes_state, "user", TENANT, &[Role::USER]);
    let company_id = add_company(runtime, routes_state, TENANT)?;
    post_contact(runtime, &server, token.as_str(), &json!({"name": "A", "isDefault": true}))?;
    let id_b = post_contact(runtime, &server, token.as_str(), &json!({"name": "B", "phone": "1"}))?;

    let editor_token = get_token(routes_state, "editor", TENANT, &[Role::USER]);
    let body = json!({"phone": "123", "isDefault": false, "companyId": "another"});
    let req = server
        .put(format!("/api/contacts/{}", id_b).as_str())
        .add_header(header::AUTHORIZATION, bearer(editor_token.as_str()))
        .json(&body);
    let resp = runtime.block_on(async { req.await });
    expect(resp.status_code()).to_equal(StatusCode::OK)?;
    let result: DataRes = resp.json();
    expect(result.message.as_str()).to_equal("Contact updated successfully")?;
    let data = &result.data;
    expect(str_of(data, "_id")).to_equal(Some(id_b.as_str()))?;
    expect(str_of(data, "name")).to_equal(Some("B"))?;
    expect(str_of(data, "phone")).to_equal(Some("123"))?;
    expect(str_of(data, "companyId")).to_equal(Some(company_id.as_str()))?;
    expect(data.get("isDefault")).to_equal(Some(&json!(false)))?;
    expect(str_of(data, "modifiedBy")).to_equal(Some("editor"))?;
    expect(get_list(runtime, &server, token.as_str()))
        .to_equal(names(&[("A", true), ("B", false)]))?;

    let req = server
        .put(format!("/api/contacts/{}", id_b).as_str())
        .add_header(header::AUTHORIZATION, bearer(token.as_str()))
        .json(&json!({"isDefault": "true"}));
    let resp = runtime.block_on(async { req.await });
    expect(resp.status_code()).to_equal(StatusCode::OK)?;
    let result: DataRes = resp.json();
    expect(result.data.get("isDefault")).to_equal(Some(&json!(true)))?;
    expect(get_list(runtime, &server, token.as_str()))
        .to_equal(names(&[("A", false), ("B", true)]))?;

    let req = server
        .put("/api/contacts/invalid")
        .add_header(header::AUTHORIZATION, bearer(token.as_str()))
        .json(&json!({"name": "X"}));
    let resp = runtime.block_on(async { req.await });
    expect_error(&resp, StatusCode::BAD_REQUEST, "err_param")?;
    let body: Value = resp.json();
    expect(body.get("message")).to_equal(Some(&json!("Invalid contact ID format")))?;

    let req = server
        .put(format!("/api/contacts/{}", NOT_EXIST_ID).as_str())
        .add_header(header::AUTHORIZATION, bearer(token.as_str()))
        .json(&json!({"name": "X"}));
    let resp = runtime.block_on(async { req.await });
    expect_error(&resp, StatusCode::NOT_FOUND, "err_not_found")?;

    let other_token = get_token(routes_state, "user", "contact_put_other", &[Role::USER]);
    let req = server
        .put(format!("/api/contacts/{}", id_b).as_str())
        .add_header(header::AUTHORIZATION, bearer(other_token.as_str()))
        .json(&json!({"name": "X"}));
    let resp = runtime.block_on(async { req.await });
    expect_error(&resp, StatusCode::NOT_FOUND, "err_not_found")
}

pub fn put_default(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let routes_state = state.routes_state.as_ref().unwrap();
    let server = new_server(routes_state);
    const TENANT: &'static str = "contact_default";
    let token = get_token(routes_state, "user", TENANT, &[Role::USER]);
    add_company(runtime, routes_state, TENANT)?;
    let id_a = post_contact(runtime, &server, token.as_str(), &json!({"name": "A"}))?;
    post_contact(runtime, &server, token.as_str(), &json!({"name": "B", "isDefault": 1}))?;

    let req = server
        .put(format!("/api/contacts/{}/default", id_a).as_str())
        .add_header(header::AUTHORIZATION, bearer(token.as_str()));
    let resp = runtime.block_on(async { req.await });
    expect(resp.status_code()).to_equal(StatusCode::OK)?;
    let result: DataRes = resp.json();
    expect(result.message.as_str()).to_equal("Default contact updated successfully")?;
    expect(str_of(&result.data, "_id")).to_equal(Some(id_a.as_str()))?;
    expect(result.data.get("isDefault")).to_equal(Some(&json!(true)))?;
    expect(get_list(runtime, &server, token.as_str()))
        .to_equal(names(&[("A", true), ("B", false)]))?;

    let req = server
        .put(format!("/api/contacts/{}/default", NOT_EXIST_ID).as_str())
        .add_header(header::AUTHORIZATION, bearer(token.as_str()));
    let resp = runtime.block_on(async { req.await });
    expect_error(&resp, StatusCode::NOT_FOUND, "err_not_found")?;
    expect(get_list(runtime, &server, token.as_str()))
        .to_equal(names(&[("A", true), ("B", false)]))?;

    let req = server
        .put("/api/contacts/invalid/default")
        .add_header(header::AUTHORIZATION, bearer(token.as_str()));
    let resp = runtime.block_on(async { req.await });
    expect_error(&resp, StatusCode::BAD_REQUEST, "err_param")
}

pub fn delete(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let routes_state = state.routes_state.as_ref().unwrap();
    let server = new_server(routes_state);
    const TENANT: &'static str = "contact_delete";
    let token = get_token(routes_state, "user", TENANT, &[Role::USER]);
    add_company(runtime, routes_state, TENANT)?;
    let id_a = post_contact(runtime, &server, token.as_str(), &json!({"name": "A", "isDefault": true}))?;
    let id_b = post_contact(runtime, &server, token.as_str(), &json!({"name": "B"}))?;

    let req = server
        .delete(format!("/api/contacts/{}", id_a).as_str())
        .add_header(header::AUTHORIZATION, bearer(token.as_str()));
    let resp = runtime.block_on(async { req.await });
    expect_error(&resp, StatusCode::CONFLICT, "err_backend_contact_default")?;

    let other_token = get_token(routes_state, "user", "contact_delete_other", &[Role::USER]);
    let req = server
        .delete(format!("/api/contacts/{}", id_b).as_str())
        .add_header(header::AUTHORIZATION, bearer(other_token.as_str()));
    let resp = runtime.block_on(async { req.await });
    expect_error(&resp, StatusCode::NOT_FOUND, "err_not_found")?;

    let req = server
        .delete(format!("/api/contacts/{}", id_b).as_str())
        .add_header(header::AUTHORIZATION, bearer(token.as_str()));
    let resp = runtime.block_on(async { req.await });
    expect(resp.status_code()).to_equal(StatusCode::OK)?;
    let body: Value = resp.json();
    expect(body.get("message")).to_equal(Some(&json!("Contact deleted successfully")))?;
    expect(get_list(runtime, &server, token.as_str())).to_equal(names(&[("A", true)]))?;

    let req = server
        .delete(format!("/api/contacts/{}", id_b).as_str())
        .add_header(header::AUTHORIZATION, bearer(token.as_str()));
    let resp = runtime.block_on(async { req.await });
    expect_error(&resp, StatusCode::NOT_FOUND, "err_not_found")?;

    let req = server
        .delete("/api/contacts/invalid")
        .add_header(header::AUTHORIZATION, bearer(token.as_str()));
    let resp = runtime.block_on(async { req.await });
    expect_error(&resp, StatusCode::BAD_REQUEST, "err_param")
}

pub fn put_list(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let routes_state = state.routes_state.as_ref().unwrap();
    let server = new_server(routes_state);
    const TENANT: &'static str = "contact_list";
    let token = get_token(routes_state, "user", TENANT, &[Role::USER]);
    let company_id = add_company(runtime, routes_state, TENANT)?;
    let id_a = post_contact(runtime, &server, token.as_str(), &json!({"name": "A"}))?;
    post_contact(runtime, &server, token.as_str(), &json!({"name": "Z"}))?;

    let body = json!([
        {"_id": id_a, "name": "A2", "isDefault": true},
        {"name": "N", "isDefault": true},
        {"_id": "new_1", "name": "M", "tenantId": "another"},
    ]);
    let req = server
        .put("/api/contacts")
        .add_header(header::AUTHORIZATION, bearer(token.as_str()))
        .json(&body);
    let resp = runtime.block_on(async { req.await });
    expect(resp.status_code()).to_equal(StatusCode::OK)?;
    let result: ListRes = resp.json();
    expect(result.message.as_str()).to_equal("Contacts updated successfully")?;
    let data = &result.data;
    expect(data.len()).to_equal(3)?;
    expect(str_of(&data[0], "_id") == Some(id_a.as_str())).to_equal(false)?;
    expect(str_of(&data[0], "name")).to_equal(Some("A2"))?;
    expect(data[0].get("isDefault")).to_equal(Some(&json!(true)))?;
    expect(data[1].get("isDefault")).to_equal(Some(&json!(false)))?;
    expect(str_of(&data[2], "_id") == Some("new_1")).to_equal(false)?;
    for item in data.iter() {
        expect(str_of(item, "companyId")).to_equal(Some(company_id.as_str()))?;
        expect(str_of(item, "tenantId")).to_equal(Some(TENANT))?;
    }
    expect(get_list(runtime, &server, token.as_str()))
        .to_equal(names(&[("A2", true), ("N", false), ("M", false)]))?;

    let bodies = [json!({"name": "A"}), json!([1]), json!(["A"])];
    for body in bodies.iter() {
        let req = server
            .put("/api/contacts")
            .add_header(header::AUTHORIZATION, bearer(token.as_str()))
            .json(body);
        let resp = runtime.block_on(async { req.await });
        expect_error(&resp, StatusCode::BAD_REQUEST, "err_param")?;
        let err: Value = resp.json();
        expect(err.get("message")).to_equal(Some(&json!(
            "Invalid input: Expected a JSON array of contacts."
        )))?;
    }

    let req = server
        .put("/api/contacts")
        .add_header(header::AUTHORIZATION, bearer(token.as_str()))
        .json(&json!([]));
    let resp = runtime.block_on(async { req.await });
    expect(resp.status_code()).to_equal(StatusCode::OK)?;
    let result: ListRes = resp.json();
    expect(result.data.len()).to_equal(0)
}

/// Replacing the list issues new identifiers, so reused or foreign `_id`s cannot collide.
pub fn put_list_ids(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let routes_state = state.routes_state.as_ref().unwrap();
    let server = new_server(routes_state);
    const TENANT: &'static str = "contact_list_ids";
    const OTHER_TENANT: &'static str = "contact_list_ids_other";
    let token = get_token(routes_state, "user", TENANT, &[Role::USER]);
    let other_token = get_token(routes_state, "user", OTHER_TENANT, &[Role::USER]);
    add_company(runtime, routes_state, TENANT)?;
    add_company(runtime, routes_state, OTHER_TENANT)?;
    let own_id = post_contact(runtime, &server, token.as_str(), &json!({"name": "Own"}))?;
    let other_id = post_contact(
        runtime,
        &server,
        other_token.as_str(),
        &json!({"name": "Other"}),
    )?;

    let body = json!([
        {"_id": own_id, "name": "A"},
        {"_id": own_id, "name": "B"},
        {"_id": other_id, "name": "C"},
    ]);
    let req = server
        .put("/api/contacts")
        .add_header(header::AUTHORIZATION, bearer(token.as_str()))
        .json(&body);
    let resp = runtime.block_on(async { req.await });
    expect(resp.status_code()).to_equal(StatusCode::OK)?;
    let result: ListRes = resp.json();
    let mut ids: Vec<String> = result
        .data
        .iter()
        .filter_map(|item| str_of(item, "_id").map(|id| id.to_string()))
        .collect();
    expect(ids.len()).to_equal(3)?;
    expect(ids.contains(&own_id)).to_equal(false)?;
    expect(ids.contains(&other_id)).to_equal(false)?;
    ids.sort();
    ids.dedup();
    expect(ids.len()).to_equal(3)?;

    // The other tenant keeps its contact.
    expect(get_list(runtime, &server, other_token.as_str()))
        .to_equal(names(&[("Other", false)]))?;
    let uri = format!("/api/contacts/{}", other_id);
    let req = server
        .put(uri.as_str())
        .add_header(header::AUTHORIZATION, bearer(token.as_str()))
        .json(&json!({"name": "Stolen"}));
    let resp = runtime.block_on(async { req.await });
    expect_error(&resp, StatusCode::NOT_FOUND, "err_not_found")
}
