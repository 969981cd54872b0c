use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use log::error;
use serde_json::{Map, Value};

use invoice_corelib::{
    err::ErrResp,
    http::{Json, Path, Query},
    strings::time_str,
};

use super::request;
use crate::{
    libs::{
        form::{self, FormBody},
        records::{RecordKind, Store},
    },
    models::{
        self,
        record::{ListOptions, ListQueryCond, Record, Updates},
    },
    routes::{
        State as AppState,
        middleware::TokenInfo,
        v1::{DataRes, MessageRes, Paging},
    },
};

const LIST_LIMIT_DEFAULT: u64 = 25;
const LIST_LIMIT_MAX: u64 = 200;
const CATEGORY_ALL: &'static str = "all accounts";
const CATEGORY_INACTIVE: &'static str = "inactive";
const STATUS_INACTIVE: &'static str = "Inactive";

/// `POST /api/{resource}`
pub async fn post_record(
    State(state): State<AppState>,
    Extension(kind): Extension<&'static RecordKind>,
    Extension(token): Extension<TokenInfo>,
    mut body: FormBody,
) -> impl IntoResponse {
    const FN_NAME: &'static str = "post_record";

    let mut fields = kind.coerce(&body.fields, true);
    // Stored names come from uploads only.
    fields.remove(form::LOGO_FILENAME);
    if let Err(e) = kind.check_required(&fields) {
        return Err(ErrResp::ErrParam(Some(e.to_string())));
    }

    let now = Utc::now();
    let tenant_id = token.tenant_id.as_str();
    let mut new_logo = None;
    if kind.has_logo {
        if let Some(file_name) = save_logo(&state, tenant_id, &mut body).await? {
            fields.insert(form::LOGO_FILENAME.to_string(), Value::String(file_name.clone()));
            new_logo = Some(file_name);
        }
    }

    let record = Record {
        record_id: models::new_id(),
        tenant_id: tenant_id.to_string(),
        created_at: now,
        modified_at: now,
        modified_by: Some(token.username.clone()),
        fields,
    };
    let result = match kind.model(state.model.as_ref()).add(&record).await {
        Err(e) => {
            error!("[{}] add {} error: {}", FN_NAME, kind.id_name, e);
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

    Ok((
        StatusCode::CREATED,
        Json(DataRes {
            message: kind.created_message(),
            data: record_transform(kind, record),
        }),
    ))
}

/// `GET /api/{resource}/{record_id}`
pub async fn get_record(
    State(state): State<AppState>,
    Extension(kind): Extension<&'static RecordKind>,
    Extension(token): Extension<TokenInfo>,
    Path(param): Path<request::RecordIdPath>,
) -> impl IntoResponse {
    const FN_NAME: &'static str = "get_record";

    let record_id = param.record_id.as_str();
    if !models::is_id(record_id) {
        return Err(ErrResp::ErrParam(Some(kind.invalid_id_message())));
    }
    let record = get_tenant_record(FN_NAME, &state, kind, &token, record_id).await?;
    Ok(Json(record_transform(kind, record)))
}

/// `GET /api/{resource}`
pub async fn get_record_list(
    State(state): State<AppState>,
    Extension(kind): Extension<&'static RecordKind>,
    Extension(token): Extension<TokenInfo>,
    Query(query): Query<request::GetRecordListQuery>,
) -> impl IntoResponse {
    const FN_NAME: &'static str = "get_record_list";

    let paging = Paging::parse(
        query.page.as_deref(),
        query.limit.as_deref(),
        LIST_LIMIT_DEFAULT,
        Some(LIST_LIMIT_MAX),
        false,
    )?;

    let mut cond = ListQueryCond {
        tenant_id: token.tenant_id.as_str(),
        ..Default::default()
    };
    if let Some(search) = query.search.as_ref() {
        if search.len() > 0 {
            cond.search = Some((search.as_str(), kind.search_fields));
        }
    }
    if kind.store == Store::Account {
        if let Some(category) = query.category.as_ref() {
            match category.to_lowercase().as_str() {
                "" => (),
                CATEGORY_ALL => cond
                    .not_equals
                    .push(("status", Value::String(STATUS_INACTIVE.to_string()))),
                CATEGORY_INACTIVE => cond
                    .equals
                    .push(("status", Value::String(STATUS_INACTIVE.to_string()))),
                _ => cond
                    .equals
                    .push(("parentCategory", Value::String(category.clone()))),
            }
        }
    }

    let model = kind.model(state.model.as_ref());
    let total = match model.count(&cond).await {
        Err(e) => {
            error!("[{}] count error: {}", FN_NAME, e);
            return Err(ErrResp::ErrDb(Some(e.to_string())));
        }
        Ok(total) => total,
    };
    let opts = ListOptions {
        cond: &cond,
        offset: paging.offset(),
        limit: paging.limit,
        sort: None,
    };
    let list = match model.list(&opts).await {
        Err(e) => {
            error!("[{}] list error: {}", FN_NAME, e);
            return Err(ErrResp::ErrDb(Some(e.to_string())));
        }
        Ok(list) => list,
    };
    let data: Vec<Map<String, Value>> = list
        .into_iter()
        .map(|record| record_transform(kind, record))
        .collect();
    Ok(Json(paging.to_res(data, total)))
}

/// `PUT /api/{resource}/{record_id}`
pub async fn put_record(
    State(state): State<AppState>,
    Extension(kind): Extension<&'static RecordKind>,
    Extension(token): Extension<TokenInfo>,
    Path(param): Path<request::RecordIdPath>,
    mut body: FormBody,
) -> impl IntoResponse {
    const FN_NAME: &'static str = "put_record";

    let record_id = param.record_id.as_str();
    if !models::is_id(record_id) {
        return Err(ErrResp::ErrParam(Some(kind.invalid_id_message())));
    }
    let tenant_id = token.tenant_id.as_str();
    let stored = get_tenant_record(FN_NAME, &state, kind, &token, record_id).await?;
    let old_logo = match stored.fields.get(form::LOGO_FILENAME) {
        Some(Value::String(name)) if name.len() > 0 => Some(name.clone()),
        _ => None,
    };

    let mut fields = kind.coerce(&body.fields, false);
    let mut remove_old_logo = false;
    let mut new_logo = None;
    if !kind.has_logo {
        fields.remove(form::LOGO_FILENAME);
    } else {
        let clear_logo = match fields.remove(form::LOGO_FILENAME) {
            Some(Value::String(name)) => name.len() == 0,
            _ => false,
        };
        if clear_logo {
            fields.insert(form::LOGO_FILENAME.to_string(), Value::Null);
            remove_old_logo = true;
        }
        if let Some(file_name) = save_logo(&state, tenant_id, &mut body).await? {
            fields.insert(form::LOGO_FILENAME.to_string(), Value::String(file_name.clone()));
            remove_old_logo = true;
            new_logo = Some(file_name);
        }
    }

    let updates = Updates {
        fields: &fields,
        modified_at: Utc::now(),
        modified_by: Some(token.username.as_str()),
    };
    let model = kind.model(state.model.as_ref());
    let result = match model.update(tenant_id, record_id, &updates).await {
        Err(e) => {
            error!("[{}] update error: {}", FN_NAME, e);
            Err(ErrResp::ErrDb(Some(e.to_string())))
        }
        Ok(false) => Err(ErrResp::ErrNotFound(Some(kind.not_found_message()))),
        Ok(true) => Ok(()),
    };
    if let Err(e) = result {
        if let Some(file_name) = new_logo.as_ref() {
            form::remove_upload(state.logo_path.as_str(), file_name.as_str()).await;
        }
        return Err(e);
    }
    if remove_old_logo {
        if let Some(old_logo) = old_logo.as_ref() {
            form::remove_upload(state.logo_path.as_str(), old_logo.as_str()).await;
        }
    }

    let record = get_tenant_record(FN_NAME, &state, kind, &token, record_id).await?;
    Ok(Json(DataRes {
        message: kind.updated_message(),
        data: record_transform(kind, record),
    }))
}

/// `DELETE /api/{resource}/{record_id}`
pub async fn delete_record(
    State(state): State<AppState>,
    Extension(kind): Extension<&'static RecordKind>,
    Extension(token): Extension<TokenInfo>,
    Path(param): Path<request::RecordIdPath>,
) -> impl IntoResponse {
    const FN_NAME: &'static str = "delete_record";

    let record_id = param.record_id.as_str();
    if !models::is_id(record_id) {
        return Err(ErrResp::ErrParam(Some(kind.invalid_id_message())));
    }
    let stored = get_tenant_record(FN_NAME, &state, kind, &token, record_id).await?;

    let model = kind.model(state.model.as_ref());
    let deleted = match model.del(token.tenant_id.as_str(), record_id).await {
        Err(e) => {
            error!("[{}] del error: {}", FN_NAME, e);
            return Err(ErrResp::ErrDb(Some(e.to_string())));
        }
        Ok(deleted) => deleted,
    };
    if !deleted {
        return Err(ErrResp::ErrNotFound(Some(kind.not_found_message())));
    }
    if kind.has_logo {
        if let Some(Value::String(name)) = stored.fields.get(form::LOGO_FILENAME) {
            form::remove_upload(state.logo_path.as_str(), name.as_str()).await;
        }
    }

    Ok(Json(MessageRes {
        message: kind.deleted_message(),
    }))
}

async fn get_tenant_record(
    fn_name: &str,
    state: &AppState,
    kind: &RecordKind,
    token: &TokenInfo,
    record_id: &str,
) -> Result<Record, ErrResp> {
    let model = kind.model(state.model.as_ref());
    match model.get(token.tenant_id.as_str(), record_id).await {
        Err(e) => {
            error!("[{}] get error: {}", fn_name, e);
            Err(ErrResp::ErrDb(Some(e.to_string())))
        }
        Ok(None) => Err(ErrResp::ErrNotFound(Some(kind.not_found_message()))),
        Ok(Some(record)) => Ok(record),
    }
}

/// To save the uploaded `logo` file. Returns the stored file name, or `None` without a file.
async fn save_logo(
    state: &AppState,
    tenant_id: &str,
    body: &mut FormBody,
) -> Result<Option<String>, ErrResp> {
    let file = match body.take_file(form::LOGO_FIELD) {
        None => return Ok(None),
        Some(file) => file,
    };
    if file.file_name.len() == 0 {
        return Ok(None);
    }
    if !form::is_allowed(file.file_name.as_str(), &state.allowed_extensions) {
        return Err(ErrResp::ErrParam(Some(format!(
            "File type not allowed. Allowed types: {}",
            state.allowed_extensions.join(", ")
        ))));
    }
    let file_name = form::stored_name(tenant_id, &Utc::now(), file.file_name.as_str());
    form::save_upload(state.logo_path.as_str(), file_name.as_str(), &file.data).await?;
    Ok(Some(file_name))
}

fn record_transform(kind: &RecordKind, record: Record) -> Map<String, Value> {
    let mut data = record.fields;
    if kind.has_logo {
        if let Some(url) = form::logo_url(&data) {
            data.insert("logoUrl".to_string(), Value::String(url));
        }
    }
    data.insert("_id".to_string(), Value::String(record.record_id));
    data.insert("tenantId".to_string(), Value::String(record.tenant_id));
    data.insert(
        "createdAt".to_string(),
        Value::String(time_str(&record.created_at)),
    );
    data.insert(
        "modifiedAt".to_string(),
        Value::String(time_str(&record.modified_at)),
    );
    data.insert(
        "modifiedBy".to_string(),
        match record.modified_by {
            None => Value::Null,
            Some(user) => Value::String(user),
        },
    );
    data
}
