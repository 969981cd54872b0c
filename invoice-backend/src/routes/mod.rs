use std::{error::Error as StdError, sync::Arc};

use axum::{Router, extract::DefaultBodyLimit, response::IntoResponse, routing};
use serde_json::json;
use tower_http::services::ServeDir;

use invoice_corelib::{http::Json, version};

use crate::{
    libs::{
        config::{self, Config},
        documentai,
        jwt::Jwt,
        records,
    },
    models::{self, ConnOptions, Model, MongoDbOptions},
};

pub mod middleware;
mod v1;

/// The resources used by this service.
#[derive(Clone)]
pub struct State {
    /// The database model.
    pub model: Arc<dyn Model>,
    /// The access token issuer and verifier.
    pub jwt: Jwt,
    /// The tenant of users who register without one.
    pub default_tenant: String,
    /// The folder of customer and company logos.
    pub logo_path: String,
    /// The folder of expense invoice files.
    pub expense_invoice_path: String,
    /// Lower-case file extensions that can be uploaded.
    pub allowed_extensions: Vec<String>,
    /// The maximum request body size in bytes.
    pub max_body_size: usize,
    /// The Document AI client. `None` if the processor is not configured.
    pub documentai: Option<Arc<documentai::Client>>,
}

/// The backend specific error codes in addition to standard [`ErrResp`].
///
/// [`ErrResp`]: invoice_corelib::err::ErrResp
pub struct ErrReq;

const SERV_NAME: &'static str = env!("CARGO_PKG_NAME");
const SERV_VER: &'static str = env!("CARGO_PKG_VERSION");

impl ErrReq {
    pub const USER_EXIST: (u16, &'static str) = (409, "err_backend_user_exist");
    pub const COMPANY_NOT_EXIST: (u16, &'static str) = (409, "err_backend_company_not_exist");
    pub const CONTACT_DEFAULT: (u16, &'static str) = (409, "err_backend_contact_default");
}

/// To create resources for the service.
pub async fn new_state(conf: &Config) -> Result<State, Box<dyn StdError>> {
    let conf = config::apply_default(conf);
    let mongodb = conf
        .db
        .as_ref()
        .and_then(|db| db.mongodb.clone())
        .unwrap_or_default();
    let db_opts = ConnOptions::MongoDB(MongoDbOptions {
        url: mongodb
            .url
            .unwrap_or(config::DEF_MONGODB_URL.to_string()),
        db: mongodb
            .database
            .unwrap_or(config::DEF_MONGODB_DB.to_string()),
        pool_size: mongodb.pool_size,
    });
    let model = models::new(&db_opts).await?;
    new_state_with_model(&conf, model)
}

/// To create resources with an existing model. `conf` must have default values applied.
pub fn new_state_with_model(
    conf: &Config,
    model: Arc<dyn Model>,
) -> Result<State, Box<dyn StdError>> {
    let jwt_conf = conf.jwt.clone().unwrap_or_default();
    let upload = conf.upload.clone().unwrap_or_default();
    let documentai = match conf.document_ai.as_ref() {
        None => None,
        Some(conf) => documentai::Client::new(conf)?.map(Arc::new),
    };
    Ok(State {
        model,
        jwt: Jwt::new(
            jwt_conf.secret.unwrap_or_default().as_str(),
            jwt_conf.expires_in.unwrap_or(config::DEF_JWT_EXPIRES),
        ),
        default_tenant: conf
            .default_tenant
            .clone()
            .unwrap_or(config::DEF_TENANT.to_string()),
        logo_path: upload
            .logo_path
            .unwrap_or(config::DEF_LOGO_PATH.to_string()),
        expense_invoice_path: upload
            .expense_invoice_path
            .unwrap_or(config::DEF_EXPENSE_INVOICE_PATH.to_string()),
        allowed_extensions: upload.allowed_extensions.unwrap_or_default(),
        max_body_size: usize::try_from(upload.max_body_size.unwrap_or(config::DEF_MAX_BODY_SIZE))
            .unwrap_or(usize::MAX),
        documentai,
    })
}

/// To register service URIs.
pub fn new_service(state: &State) -> Router {
    Router::new()
        .route("/", routing::get(get_index))
        .route(
            "/version",
            routing::get(version::gen_get_version(SERV_NAME, SERV_VER)),
        )
        .nest_service("/uploads/logos", ServeDir::new(state.logo_path.as_str()))
        .merge(v1::auth::new_service("/api/auth", state))
        .merge(v1::dropdown::new_service("/api/global/dropdowns", state))
        .merge(v1::record::new_service("/api/customers", &records::CUSTOMER, state))
        .merge(v1::record::new_service("/api/vendors", &records::VENDOR, state))
        .merge(v1::record::new_service("/api/staff", &records::STAFF, state))
        .merge(v1::record::new_service(
            "/api/chart-of-accounts",
            &records::ACCOUNT,
            state,
        ))
        .merge(v1::expense::new_service("/api/expenses", state))
        .merge(v1::company::new_service("/api/company-information", state))
        .merge(v1::contact::new_service("/api/contacts", state))
        .merge(v1::document_rules::new_service("/api/document-rules", state))
        .merge(v1::document_ai::new_service("/api/document-ai", state))
        .layer(DefaultBodyLimit::max(state.max_body_size))
}

/// `GET /`
async fn get_index() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "message": "Welcome to the Invoice Backend API!",
    }))
}
