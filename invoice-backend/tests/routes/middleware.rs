use axum::http::{HeaderValue, StatusCode, header};
use chrono::{TimeDelta, Utc};
use laboratory::{SpecContext, expect};
use serde_json::json;

use invoice_backend::libs::jwt::Jwt;
use invoice_corelib::role::Role;

use super::{
    STATE,
    libs::{bearer, expect_error, get_token, new_server, new_user},
};
use crate::{TEST_TENANT, TestState};

pub fn missing_token(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let routes_state = state.routes_state.as_ref().unwrap();
    let server = new_server(routes_state);

    let resp = runtime.block_on(async { server.get("/api/auth/profile").await });
    expect_error(&resp, StatusCode::BAD_REQUEST, "err_param")?;

    let resp = runtime.block_on(async { server.get("/api/customers").await });
    expect_error(&resp, StatusCode::BAD_REQUEST, "err_param")
}

pub fn invalid_scheme(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let routes_state = state.routes_state.as_ref().unwrap();
    let server = new_server(routes_state);

    let token = get_token(routes_state, "user", TEST_TENANT, &[Role::USER]);
    let req = server.get("/api/auth/profile").add_header(
        header::AUTHORIZATION,
        HeaderValue::from_str(format!("Basic {}", token).as_str()).unwrap(),
    );
    let resp = runtime.block_on(async { req.await });
    expect_error(&resp, StatusCode::UNAUTHORIZED, "err_auth")?;

    let req = server
        .get("/api/auth/profile")
        .add_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer"));
    let resp = runtime.block_on(async { req.await });
    expect_error(&resp, StatusCode::UNAUTHORIZED, "err_auth")
}

pub fn invalid_token(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let routes_state = state.routes_state.as_ref().unwrap();
    let server = new_server(routes_state);

    let req = server
        .get("/api/auth/profile")
        .add_header(header::AUTHORIZATION, bearer("not-a-token"));
    let resp = runtime.block_on(async { req.await });
    expect_error(&resp, StatusCode::UNAUTHORIZED, "err_auth")?;

    // Signed with another secret.
    let user = new_user("user", TEST_TENANT, &[Role::USER]);
    let token = match Jwt::new("another-secret", 3600).issue(&user, &Utc::now()) {
        Err(e) => return Err(format!("issue token error: {}", e)),
        Ok(token) => token,
    };
    let req = server
        .get("/api/auth/profile")
        .add_header(header::AUTHORIZATION, bearer(token.as_str()));
    let resp = runtime.block_on(async { req.await });
    expect_error(&resp, StatusCode::UNAUTHORIZED, "err_auth")
}

pub fn expired_token(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let routes_state = state.routes_state.as_ref().unwrap();
    let server = new_server(routes_state);

    let user = new_user("user", TEST_TENANT, &[Role::USER]);
    let issued_at = Utc::now() - TimeDelta::try_hours(2).unwrap();
    let token = match routes_state.jwt.issue(&user, &issued_at) {
        Err(e) => return Err(format!("issue token error: {}", e)),
        Ok(token) => token,
    };
    let req = server
        .get("/api/auth/profile")
        .add_header(header::AUTHORIZATION, bearer(token.as_str()));
    let resp = runtime.block_on(async { req.await });
    expect_error(&resp, StatusCode::UNAUTHORIZED, "err_auth")?;
    let body: super::libs::ApiError = resp.json();
    expect(body.message.as_deref()).to_equal(Some("token expired"))
}

/// Users without the `admin` role cannot modify dropdown values.
pub fn invalid_role(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let routes_state = state.routes_state.as_ref().unwrap();
    let server = new_server(routes_state);

    let token = get_token(routes_state, "user", TEST_TENANT, &[Role::USER]);
    let body = json!({"type": "middleware", "value": "v", "label": "V"});
    let req = server
        .post("/api/global/dropdowns")
        .add_header(header::AUTHORIZATION, bearer(token.as_str()))
        .json(&body);
    let resp = runtime.block_on(async { req.await });
    expect_error(&resp, StatusCode::FORBIDDEN, "err_perm")?;

    // GET is allowed for all roles.
    let req = server
        .get("/api/global/dropdowns")
        .add_header(header::AUTHORIZATION, bearer(token.as_str()));
    let resp = runtime.block_on(async { req.await });
    expect(resp.status_code()).to_equal(StatusCode::OK)
}
