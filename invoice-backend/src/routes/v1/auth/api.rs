use std::collections::HashMap;

use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use log::{error, info};

use invoice_corelib::{err::ErrResp, http::Json, role::Role, strings};

use super::{request, response};
use crate::{
    models::{
        self,
        user::{QueryCond, User},
    },
    routes::{ErrReq, State as AppState, middleware::TokenInfo, v1::log_activity},
};

const SALT_LEN: usize = 8;
const TEST_USERS_LIMIT: u64 = 5;

/// `POST /api/auth/register`
pub async fn post_register(
    State(state): State<AppState>,
    Json(body): Json<request::PostRegisterBody>,
) -> impl IntoResponse {
    const FN_NAME: &'static str = "post_register";

    let (username, password) = match (body.username.as_ref(), body.password.as_ref()) {
        (Some(username), Some(password)) if username.len() > 0 && password.len() > 0 => {
            (username.to_lowercase(), password.as_str())
        }
        _ => {
            return Err(ErrResp::ErrParam(Some(
                "Username and password are required".to_string(),
            )));
        }
    };
    if !strings::is_username(username.as_str()) {
        return Err(ErrResp::ErrParam(Some(
            "`username` must be email or [a-z0-9][a-z0-9_.-]*".to_string(),
        )));
    }
    let email = match body.email.as_ref() {
        None => None,
        Some(email) => match email.len() {
            0 => None,
            _ => match strings::is_email(email.as_str()) {
                false => {
                    return Err(ErrResp::ErrParam(Some(
                        "`email` is not a valid e-mail address".to_string(),
                    )));
                }
                true => Some(email.clone()),
            },
        },
    };

    let cond = QueryCond {
        username: Some(username.as_str()),
        ..Default::default()
    };
    match state.model.user().get(&cond).await {
        Err(e) => {
            error!("[{}] get error: {}", FN_NAME, e);
            return Err(ErrResp::ErrDb(Some(e.to_string())));
        }
        Ok(None) => (),
        Ok(Some(_)) => {
            return Err(ErrResp::Custom(
                ErrReq::USER_EXIST.0,
                ErrReq::USER_EXIST.1,
                Some("Username already exists".to_string()),
            ));
        }
    }

    let now = Utc::now();
    let salt = strings::randomstring(SALT_LEN);
    let mut roles = HashMap::new();
    roles.insert(Role::USER.to_string(), true);
    let user = User {
        user_id: models::new_id(),
        username,
        email,
        created_at: now,
        modified_at: now,
        roles,
        password: strings::password_hash(password, salt.as_str()),
        salt,
        // Tenant membership is managed by administrators only.
        tenant_id: state.default_tenant.clone(),
        is_active: true,
    };
    if let Err(e) = state.model.user().add(&user).await {
        error!("[{}] add error: {}", FN_NAME, e);
        return Err(ErrResp::ErrDb(Some(e.to_string())));
    }
    info!("[{}] user {} registered", FN_NAME, user.username);
    log_activity(
        state.model.as_ref(),
        "REGISTER_USER",
        user.username.as_str(),
        format!("User '{}' registered", user.username),
        user.tenant_id.as_str(),
        Some(user.user_id.as_str()),
        Some("users"),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(response::PostRegister {
            message: "User created successfully".to_string(),
            user_id: user.user_id,
        }),
    ))
}

/// `POST /api/auth/login`
pub async fn post_login(
    State(state): State<AppState>,
    Json(body): Json<request::PostLoginBody>,
) -> impl IntoResponse {
    const FN_NAME: &'static str = "post_login";

    let (username, password) = match (body.username.as_ref(), body.password.as_ref()) {
        (Some(username), Some(password)) if username.len() > 0 && password.len() > 0 => {
            (username.to_lowercase(), password.as_str())
        }
        _ => {
            return Err(ErrResp::ErrParam(Some(
                "Username and password are required".to_string(),
            )));
        }
    };

    let cond = QueryCond {
        username: Some(username.as_str()),
        ..Default::default()
    };
    let user = match state.model.user().get(&cond).await {
        Err(e) => {
            error!("[{}] get error: {}", FN_NAME, e);
            return Err(ErrResp::ErrDb(Some(e.to_string())));
        }
        Ok(user) => user,
    };
    let user = match user {
        Some(user) if strings::password_hash(password, user.salt.as_str()) == user.password => {
            user
        }
        _ => {
            return Err(ErrResp::ErrAuth(Some(
                "Invalid username or password".to_string(),
            )));
        }
    };
    if !user.is_active {
        return Err(ErrResp::ErrPerm(Some("User account is inactive".to_string())));
    }

    let access_token = match state.jwt.issue(&user, &Utc::now()) {
        Err(e) => {
            error!("[{}] issue token error: {}", FN_NAME, e);
            return Err(ErrResp::ErrUnknown(Some(e)));
        }
        Ok(token) => token,
    };
    Ok(Json(response::PostLogin {
        access_token,
        username: user.username,
    }))
}

/// `GET /api/auth/profile`
pub async fn get_profile(Extension(token): Extension<TokenInfo>) -> impl IntoResponse {
    Json(response::GetProfile {
        logged_in_as_id: token.user_id,
        username: token.username,
        tenant_id: token.tenant_id,
        roles: token.roles,
    })
}

/// `GET /api/auth/test-users`
pub async fn get_test_users(State(state): State<AppState>) -> impl IntoResponse {
    const FN_NAME: &'static str = "get_test_users";

    match state.model.user().list_recent(TEST_USERS_LIMIT).await {
        Err(e) => {
            error!("[{}] list error: {}", FN_NAME, e);
            Err(ErrResp::ErrDb(Some(e.to_string())))
        }
        Ok(users) => Ok(Json(
            users
                .into_iter()
                .map(|user| response::TestUser {
                    username: user.username,
                    email: user.email,
                })
                .collect::<Vec<response::TestUser>>(),
        )),
    }
}
