use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use log::error;
use serde_json::{Map, Value};

use invoice_corelib::{err::ErrResp, http::Json, strings::time_str};

use super::response;
use crate::{
    libs::{
        coerce,
        form::{self, FormBody},
        rules,
    },
    models::{company::Company, document_rules::DocumentRules},
    routes::{State as AppState, middleware::TokenInfo},
};

const BOOL_FIELDS: [&'static str; 9] = [
    "gstRegistered",
    "sameAsBilling",
    "pfEnabled",
    "esicEnabled",
    "iecRegistered",
    "tdsTcsEnabled",
    "advanceTaxEnabled",
    "msmeEnabled",
    "vatEnabled",
];

/// Fields that are cleared when the flag is off.
const DEPENDENT_FIELDS: [(&'static str, &'static [&'static str]); 7] = [
    ("gstRegistered", &["gstNumber", "gstType", "gstIsdNumber"]),
    ("tdsTcsEnabled", &["tanNumber", "tdsTcsFinancialYear"]),
    ("vatEnabled", &["vatNumber"]),
    ("esicEnabled", &["esicNumber"]),
    ("pfEnabled", &["pfNumber"]),
    ("iecRegistered", &["iecNumber"]),
    ("msmeEnabled", &["msmeNumber"]),
];

const SKIP_KEYS: [&'static str; 8] = [
    "_id",
    "tenantId",
    "createdAt",
    "modifiedAt",
    "modifiedBy",
    "logoUrl",
    "logo",
    "logoFilename",
];

/// `GET /api/company-information`
pub async fn get_company(
    State(state): State<AppState>,
    Extension(token): Extension<TokenInfo>,
) -> impl IntoResponse {
    const FN_NAME: &'static str = "get_company";

    match state.model.company().get(token.tenant_id.as_str()).await {
        Err(e) => {
            error!("[{}] get error: {}", FN_NAME, e);
            Err(ErrResp::ErrDb(Some(e.to_string())))
        }
        Ok(None) => Ok(Json(Map::new())),
        Ok(Some(company)) => Ok(Json(company_transform(company))),
    }
}

/// `POST /api/company-information` and `PUT /api/company-information`
pub async fn save_company(
    State(state): State<AppState>,
    Extension(token): Extension<TokenInfo>,
    mut body: FormBody,
) -> Result<Response, ErrResp> {
    const FN_NAME: &'static str = "save_company";

    let tenant_id = token.tenant_id.as_str();
    let mut data = normalize(&body.fields);

    let document_rules = match state.model.document_rules().get().await {
        Err(e) => {
            error!("[{}] get rules error: {}", FN_NAME, e);
            return Err(ErrResp::ErrDb(Some(e.to_string())));
        }
        Ok(rules) => rules.unwrap_or_else(DocumentRules::default),
    };
    let errors = rules::validate(&data, &document_rules);
    if errors.len() > 0 {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(response::ValidationErrors {
                message: "Please correct the errors below.".to_string(),
                errors,
            }),
        )
            .into_response());
    }

    let mut new_logo = None;
    if let Some(file) = body.take_file(form::LOGO_FIELD) {
        if file.file_name.len() > 0 {
            if !form::is_allowed(file.file_name.as_str(), &state.allowed_extensions) {
                return Err(ErrResp::ErrParam(Some(format!(
                    "File type not allowed. Allowed types: {}",
                    state.allowed_extensions.join(", ")
                ))));
            }
            let file_name = form::stored_name(tenant_id, &Utc::now(), file.file_name.as_str());
            form::save_upload(state.logo_path.as_str(), file_name.as_str(), &file.data).await?;
            data.insert(form::LOGO_FILENAME.to_string(), Value::String(file_name.clone()));
            new_logo = Some(file_name);
        }
    }

    let model = state.model.company();
    let now = Utc::now();
    let result = match model
        .upsert(tenant_id, &data, now, token.username.as_str())
        .await
    {
        Err(e) => {
            error!("[{}] upsert error: {}", FN_NAME, e);
            Err(ErrResp::ErrDb(Some(e.to_string())))
        }
        Ok(_) => Ok(()),
    };
    if let Err(e) = result {
        if let Some(file_name) = new_logo.as_ref() {
            form::remove_upload(state.logo_path.as_str(), file_name.as_str()).await;
        }
        return Err(e);
    }
    let data = match model.get(tenant_id).await {
        Err(e) => {
            error!("[{}] get error: {}", FN_NAME, e);
            return Err(ErrResp::ErrDb(Some(e.to_string())));
        }
        Ok(company) => match company {
            None => Map::new(),
            Some(company) => company_transform(company),
        },
    };
    Ok(Json(response::SaveCompany {
        message: "Company information saved successfully".to_string(),
        data,
    })
    .into_response())
}

/// To coerce the form fields and clear fields of the disabled flags.
pub fn normalize(body: &Map<String, Value>) -> Map<String, Value> {
    let mut data = Map::new();
    for (key, value) in body.iter() {
        if SKIP_KEYS.contains(&key.as_str()) {
            continue;
        }
        let value = match key.as_str() {
            "businesses" => match coerce::array(value) {
                None => value.clone(),
                Some(list) => Value::Array(list),
            },
            _ => value.clone(),
        };
        data.insert(key.clone(), value);
    }
    for key in BOOL_FIELDS {
        let flag = match data.get(key) {
            None => false,
            Some(value) => coerce::loose_bool(value),
        };
        data.insert(key.to_string(), Value::Bool(flag));
    }
    for (flag, fields) in DEPENDENT_FIELDS {
        if data.get(flag) == Some(&Value::Bool(true)) {
            continue;
        }
        for field in fields {
            data.insert(field.to_string(), Value::Null);
        }
    }
    data
}

fn company_transform(company: Company) -> Map<String, Value> {
    let mut data = company.fields;
    if let Some(url) = form::logo_url(&data) {
        data.insert("logoUrl".to_string(), Value::String(url));
    }
    data.insert("_id".to_string(), Value::String(company.company_id));
    data.insert("tenantId".to_string(), Value::String(company.tenant_id));
    data.insert(
        "createdAt".to_string(),
        Value::String(time_str(&company.created_at)),
    );
    data.insert(
        "modifiedAt".to_string(),
        Value::String(time_str(&company.modified_at)),
    );
    data.insert(
        "modifiedBy".to_string(),
        match company.modified_by {
            None => Value::Null,
            Some(user) => Value::String(user),
        },
    );
    data
}
