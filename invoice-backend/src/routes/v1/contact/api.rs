use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use log::error;
use serde_json::{Map, Value};

use invoice_corelib::{
    err::ErrResp,
    http::{Json, Path},
    strings::time_str,
};

use super::request;
use crate::{
    libs::coerce,
    models::{
        self,
        contact::{self as contact_model, Contact, Updates},
    },
    routes::{
        ErrReq, State as AppState,
        middleware::TokenInfo,
        v1::{DataRes, MessageRes},
    },
};

const RESERVED_KEYS: [&'static str; 7] = [
    "_id",
    "tenantId",
    "companyId",
    "isDefault",
    "createdAt",
    "modifiedAt",
    "modifiedBy",
];
const IS_DEFAULT: &'static str = "isDefault";
const ARRAY_ERR: &'static str = "Invalid input: Expected a JSON array of contacts.";

/// `GET /api/contacts`
pub async fn get_contact_list(
    State(state): State<AppState>,
    Extension(token): Extension<TokenInfo>,
) -> impl IntoResponse {
    const FN_NAME: &'static str = "get_contact_list";

    let list = list_contacts(FN_NAME, &state, token.tenant_id.as_str()).await?;
    Ok::<_, ErrResp>(Json(list))
}

/// `PUT /api/contacts`
pub async fn put_contact_list(
    State(state): State<AppState>,
    Extension(token): Extension<TokenInfo>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    const FN_NAME: &'static str = "put_contact_list";

    let items = match body {
        Value::Array(items) => items,
        _ => return Err(ErrResp::ErrParam(Some(ARRAY_ERR.to_string()))),
    };
    let tenant_id = token.tenant_id.as_str();
    let company_id = get_company_id(FN_NAME, &state, tenant_id).await?;

    let now = Utc::now();
    let mut contacts = vec![];
    for item in items.iter() {
        let item = match item.as_object() {
            None => return Err(ErrResp::ErrParam(Some(ARRAY_ERR.to_string()))),
            Some(item) => item,
        };
        // Identifiers from the client are never reused.
        contacts.push(new_contact(
            models::new_id(),
            tenant_id,
            company_id.as_str(),
            item,
            &now,
            token.username.as_str(),
        ));
    }
    contact_model::normalize_default(&mut contacts);

    if let Err(e) = state.model.contact().replace_all(tenant_id, &contacts).await {
        error!("[{}] replace error: {}", FN_NAME, e);
        return Err(ErrResp::ErrDb(Some(e.to_string())));
    }
    let data = list_contacts(FN_NAME, &state, tenant_id).await?;
    Ok(Json(DataRes {
        message: "Contacts updated successfully".to_string(),
        data,
    }))
}

/// `POST /api/contacts`
pub async fn post_contact(
    State(state): State<AppState>,
    Extension(token): Extension<TokenInfo>,
    Json(body): Json<Map<String, Value>>,
) -> impl IntoResponse {
    const FN_NAME: &'static str = "post_contact";

    let tenant_id = token.tenant_id.as_str();
    let company_id = get_company_id(FN_NAME, &state, tenant_id).await?;
    let contact = new_contact(
        models::new_id(),
        tenant_id,
        company_id.as_str(),
        &body,
        &Utc::now(),
        token.username.as_str(),
    );
    let model = state.model.contact();
    if let Err(e) = model.add(&contact).await {
        error!("[{}] add error: {}", FN_NAME, e);
        return Err(ErrResp::ErrDb(Some(e.to_string())));
    }
    if contact.is_default {
        set_default(FN_NAME, &state, tenant_id, contact.contact_id.as_str()).await?;
    }

    Ok((
        StatusCode::CREATED,
        Json(DataRes {
            message: "Contact created successfully".to_string(),
            data: contact_transform(contact),
        }),
    ))
}

/// `PUT /api/contacts/{contact_id}`
pub async fn put_contact(
    State(state): State<AppState>,
    Extension(token): Extension<TokenInfo>,
    Path(param): Path<request::ContactIdPath>,
    Json(body): Json<Map<String, Value>>,
) -> impl IntoResponse {
    const FN_NAME: &'static str = "put_contact";

    let tenant_id = token.tenant_id.as_str();
    let contact_id = param.contact_id.as_str();
    get_contact(FN_NAME, &state, tenant_id, contact_id).await?;

    let fields = user_fields(&body);
    let updates = Updates {
        fields: &fields,
        modified_at: Utc::now(),
        modified_by: Some(token.username.as_str()),
    };
    let matched = match state
        .model
        .contact()
        .update(tenant_id, contact_id, &updates)
        .await
    {
        Err(e) => {
            error!("[{}] update error: {}", FN_NAME, e);
            return Err(ErrResp::ErrDb(Some(e.to_string())));
        }
        Ok(matched) => matched,
    };
    if !matched {
        return Err(ErrResp::ErrNotFound(Some("Contact not found".to_string())));
    }
    if let Some(value) = body.get(IS_DEFAULT) {
        if coerce::loose_bool(value) {
            set_default(FN_NAME, &state, tenant_id, contact_id).await?;
        }
    }

    let contact = get_contact(FN_NAME, &state, tenant_id, contact_id).await?;
    Ok(Json(DataRes {
        message: "Contact updated successfully".to_string(),
        data: contact_transform(contact),
    }))
}

/// `DELETE /api/contacts/{contact_id}`
pub async fn delete_contact(
    State(state): State<AppState>,
    Extension(token): Extension<TokenInfo>,
    Path(param): Path<request::ContactIdPath>,
) -> impl IntoResponse {
    const FN_NAME: &'static str = "delete_contact";

    let tenant_id = token.tenant_id.as_str();
    let contact_id = param.contact_id.as_str();
    let contact = get_contact(FN_NAME, &state, tenant_id, contact_id).await?;
    if contact.is_default {
        return Err(ErrResp::Custom(
            ErrReq::CONTACT_DEFAULT.0,
            ErrReq::CONTACT_DEFAULT.1,
            Some("Cannot delete the default contact".to_string()),
        ));
    }

    let deleted = match state.model.contact().del(tenant_id, contact_id).await {
        Err(e) => {
            error!("[{}] del error: {}", FN_NAME, e);
            return Err(ErrResp::ErrDb(Some(e.to_string())));
        }
        Ok(deleted) => deleted,
    };
    if !deleted {
        return Err(ErrResp::ErrNotFound(Some("Contact not found".to_string())));
    }
    Ok(Json(MessageRes {
        message: "Contact deleted successfully".to_string(),
    }))
}

/// `PUT /api/contacts/{contact_id}/default`
pub async fn put_contact_default(
    State(state): State<AppState>,
    Extension(token): Extension<TokenInfo>,
    Path(param): Path<request::ContactIdPath>,
) -> impl IntoResponse {
    const FN_NAME: &'static str = "put_contact_default";

    let tenant_id = token.tenant_id.as_str();
    let contact_id = param.contact_id.as_str();
    set_default(FN_NAME, &state, tenant_id, contact_id).await?;
    let contact = get_contact(FN_NAME, &state, tenant_id, contact_id).await?;
    Ok::<_, ErrResp>(Json(DataRes {
        message: "Default contact updated successfully".to_string(),
        data: contact_transform(contact),
    }))
}

async fn list_contacts(
    fn_name: &str,
    state: &AppState,
    tenant_id: &str,
) -> Result<Vec<Map<String, Value>>, ErrResp> {
    match state.model.contact().list(tenant_id).await {
        Err(e) => {
            error!("[{}] list error: {}", fn_name, e);
            Err(ErrResp::ErrDb(Some(e.to_string())))
        }
        Ok(list) => Ok(list.into_iter().map(contact_transform).collect()),
    }
}

async fn get_contact(
    fn_name: &str,
    state: &AppState,
    tenant_id: &str,
    contact_id: &str,
) -> Result<Contact, ErrResp> {
    if !models::is_id(contact_id) {
        return Err(ErrResp::ErrParam(Some(
            "Invalid contact ID format".to_string(),
        )));
    }
    match state.model.contact().get(tenant_id, contact_id).await {
        Err(e) => {
            error!("[{}] get error: {}", fn_name, e);
            Err(ErrResp::ErrDb(Some(e.to_string())))
        }
        Ok(None) => Err(ErrResp::ErrNotFound(Some("Contact not found".to_string()))),
        Ok(Some(contact)) => Ok(contact),
    }
}

async fn set_default(
    fn_name: &str,
    state: &AppState,
    tenant_id: &str,
    contact_id: &str,
) -> Result<(), ErrResp> {
    if !models::is_id(contact_id) {
        return Err(ErrResp::ErrParam(Some(
            "Invalid contact ID format".to_string(),
        )));
    }
    match state.model.contact().set_default(tenant_id, contact_id).await {
        Err(e) => {
            error!("[{}] set default error: {}", fn_name, e);
            Err(ErrResp::ErrDb(Some(e.to_string())))
        }
        Ok(false) => Err(ErrResp::ErrNotFound(Some("Contact not found".to_string()))),
        Ok(true) => Ok(()),
    }
}

/// Contacts belong to the company of the tenant.
async fn get_company_id(fn_name: &str, state: &AppState, tenant_id: &str) -> Result<String, ErrResp> {
    match state.model.company().get(tenant_id).await {
        Err(e) => {
            error!("[{}] get company error: {}", fn_name, e);
            Err(ErrResp::ErrDb(Some(e.to_string())))
        }
        Ok(None) => Err(ErrResp::Custom(
            ErrReq::COMPANY_NOT_EXIST.0,
            ErrReq::COMPANY_NOT_EXIST.1,
            Some("Company information must be saved first".to_string()),
        )),
        Ok(Some(company)) => Ok(company.company_id),
    }
}

fn new_contact(
    contact_id: String,
    tenant_id: &str,
    company_id: &str,
    item: &Map<String, Value>,
    now: &DateTime<Utc>,
    user: &str,
) -> Contact {
    Contact {
        contact_id,
        tenant_id: tenant_id.to_string(),
        company_id: company_id.to_string(),
        is_default: match item.get(IS_DEFAULT) {
            None => false,
            Some(value) => coerce::loose_bool(value),
        },
        created_at: *now,
        modified_at: *now,
        modified_by: Some(user.to_string()),
        fields: user_fields(item),
    }
}

fn user_fields(item: &Map<String, Value>) -> Map<String, Value> {
    item.iter()
        .filter(|(k, _)| !RESERVED_KEYS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn contact_transform(contact: Contact) -> Map<String, Value> {
    let mut data = contact.fields;
    data.insert("_id".to_string(), Value::String(contact.contact_id));
    data.insert("tenantId".to_string(), Value::String(contact.tenant_id));
    data.insert("companyId".to_string(), Value::String(contact.company_id));
    data.insert(IS_DEFAULT.to_string(), Value::Bool(contact.is_default));
    data.insert(
        "createdAt".to_string(),
        Value::String(time_str(&contact.created_at)),
    );
    data.insert(
        "modifiedAt".to_string(),
        Value::String(time_str(&contact.modified_at)),
    );
    data.insert(
        "modifiedBy".to_string(),
        match contact.modified_by {
            None => Value::Null,
            Some(user) => Value::String(user),
        },
    );
    data
}
