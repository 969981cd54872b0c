//! To generate HTTP error response.
//!
//! ```
//! use invoice_corelib::err::ErrResp;
//!
//! fn check(body_ok: bool) -> Result<(), ErrResp> {
//!     if !body_ok {
//!         return Err(ErrResp::ErrParam(Some("input format error".to_string())));
//!     }
//!     Ok(())
//! }
//! ```

use std::{error::Error, fmt};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// The standard error definitions.
#[derive(Debug)]
pub enum ErrResp {
    ErrAuth(Option<String>),
    ErrDb(Option<String>),
    ErrIntMsg(Option<String>),
    ErrNotFound(Option<String>),
    ErrParam(Option<String>),
    ErrPerm(Option<String>),
    ErrRsc(Option<String>),
    ErrUnknown(Option<String>),
    /// HTTP status code, error code and the optional message.
    Custom(u16, &'static str, Option<String>),
}

/// Used for generating HTTP body for errors.
#[derive(Serialize)]
struct RespJson<'a> {
    code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

/// 401, token not authorized.
pub const E_AUTH: &'static str = "err_auth";
/// 503, database error.
pub const E_DB: &'static str = "err_db";
/// 503, external service communication error.
pub const E_INT_MSG: &'static str = "err_int_msg";
/// 404, resource (in path) not found.
pub const E_NOT_FOUND: &'static str = "err_not_found";
/// 400, request (body) format error.
pub const E_PARAM: &'static str = "err_param";
/// 403, invalid permission.
pub const E_PERM: &'static str = "err_perm";
/// 503, allocate resource error.
pub const E_RSC: &'static str = "err_rsc";
/// 500, unknown error.
pub const E_UNKNOWN: &'static str = "err_unknown";

/// To generate error JSON string for HTTP body.
pub fn to_json(code: &str, message: Option<&str>) -> String {
    match serde_json::to_string(&RespJson { code, message }) {
        Err(_) => format!("{{\"code\":\"{}\"}}", code),
        Ok(str) => str,
    }
}

impl ErrResp {
    /// The HTTP status code of this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ErrResp::ErrAuth(_) => StatusCode::UNAUTHORIZED,
            ErrResp::ErrDb(_) | ErrResp::ErrIntMsg(_) | ErrResp::ErrRsc(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ErrResp::ErrNotFound(_) => StatusCode::NOT_FOUND,
            ErrResp::ErrParam(_) => StatusCode::BAD_REQUEST,
            ErrResp::ErrPerm(_) => StatusCode::FORBIDDEN,
            ErrResp::ErrUnknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ErrResp::Custom(code, _, _) => {
                StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    fn resp_json(&'_ self) -> RespJson<'_> {
        let (code, desc) = match self {
            ErrResp::ErrAuth(desc) => (E_AUTH, desc),
            ErrResp::ErrDb(desc) => (E_DB, desc),
            ErrResp::ErrIntMsg(desc) => (E_INT_MSG, desc),
            ErrResp::ErrNotFound(desc) => (E_NOT_FOUND, desc),
            ErrResp::ErrParam(desc) => (E_PARAM, desc),
            ErrResp::ErrPerm(desc) => (E_PERM, desc),
            ErrResp::ErrRsc(desc) => (E_RSC, desc),
            ErrResp::ErrUnknown(desc) => (E_UNKNOWN, desc),
            ErrResp::Custom(_, code, desc) => (*code, desc),
        };
        RespJson {
            code,
            message: desc.as_deref(),
        }
    }
}

impl fmt::Display for ErrResp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let json = self.resp_json();
        write!(f, "{}", to_json(json.code, json.message))
    }
}

impl Error for ErrResp {}

impl IntoResponse for ErrResp {
    fn into_response(self) -> Response {
        (self.status(), Json(self.resp_json())).into_response()
    }
}
