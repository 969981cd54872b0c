use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use log::error;

use invoice_corelib::{
    err::ErrResp,
    http::{Json, Path},
    strings::time_str,
};

use super::{request, response};
use crate::{
    models::{
        self,
        dropdown::{Dropdown, Updates},
    },
    routes::{
        State as AppState,
        middleware::TokenInfo,
        v1::{MessageRes, log_activity},
    },
};

const COLLECTION: &'static str = "dropdown";
const GLOBAL_TENANT: &'static str = "global";

/// `GET /api/global/dropdowns`
pub async fn get_dropdown_list(State(state): State<AppState>) -> impl IntoResponse {
    const FN_NAME: &'static str = "get_dropdown_list";

    match state.model.dropdown().list().await {
        Err(e) => {
            error!("[{}] list error: {}", FN_NAME, e);
            Err(ErrResp::ErrDb(Some(e.to_string())))
        }
        Ok(list) => Ok(Json(dropdown_list_transform(list))),
    }
}

/// `GET /api/global/dropdowns/{type}`
pub async fn get_dropdown_type_list(
    State(state): State<AppState>,
    Path(dropdown_type): Path<String>,
) -> impl IntoResponse {
    const FN_NAME: &'static str = "get_dropdown_type_list";

    match state.model.dropdown().list_by_type(dropdown_type.as_str()).await {
        Err(e) => {
            error!("[{}] list error: {}", FN_NAME, e);
            Err(ErrResp::ErrDb(Some(e.to_string())))
        }
        Ok(list) => Ok(Json(dropdown_list_transform(list))),
    }
}

/// `POST /api/global/dropdowns`
pub async fn post_dropdown(
    State(state): State<AppState>,
    Extension(token): Extension<TokenInfo>,
    Json(body): Json<request::PostDropdownBody>,
) -> impl IntoResponse {
    const FN_NAME: &'static str = "post_dropdown";

    let (dropdown_type, value, label) = match (
        non_empty(&body.dropdown_type),
        non_empty(&body.value),
        non_empty(&body.label),
    ) {
        (Some(t), Some(v), Some(l)) => (t, v, l),
        _ => {
            return Err(ErrResp::ErrParam(Some(
                "Missing required fields: type, value, and label".to_string(),
            )));
        }
    };

    let now = Utc::now();
    let dropdown = Dropdown {
        dropdown_id: models::new_id(),
        dropdown_type: dropdown_type.to_string(),
        value: value.to_string(),
        label: label.to_string(),
        is_locked: body.is_locked.unwrap_or(false),
        created_at: now,
        modified_at: now,
        modified_by: Some(token.username.clone()),
    };
    if let Err(e) = state.model.dropdown().add(&dropdown).await {
        error!("[{}] add error: {}", FN_NAME, e);
        return Err(ErrResp::ErrDb(Some(e.to_string())));
    }
    log_activity(
        state.model.as_ref(),
        "CREATE_DROPDOWN",
        token.username.as_str(),
        format!(
            "Created dropdown item: type='{}', value='{}'",
            dropdown.dropdown_type, dropdown.value
        ),
        GLOBAL_TENANT,
        Some(dropdown.dropdown_id.as_str()),
        Some(COLLECTION),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(response::PostDropdown {
            message: "Dropdown value added successfully".to_string(),
            id: dropdown.dropdown_id,
        }),
    ))
}

/// `PUT /api/global/dropdowns/{id}`
pub async fn put_dropdown(
    State(state): State<AppState>,
    Extension(token): Extension<TokenInfo>,
    Path(dropdown_id): Path<String>,
    Json(body): Json<request::PutDropdownBody>,
) -> impl IntoResponse {
    const FN_NAME: &'static str = "put_dropdown";

    let dropdown = get_dropdown(FN_NAME, &state, dropdown_id.as_str()).await?;
    if dropdown.is_locked && body.is_locked != Some(false) {
        return Err(ErrResp::ErrPerm(Some("Cannot update a locked item.".to_string())));
    }

    let updates = Updates {
        dropdown_type: non_empty(&body.dropdown_type),
        value: non_empty(&body.value),
        label: non_empty(&body.label),
        is_locked: body.is_locked,
        modified_at: Some(Utc::now()),
        modified_by: Some(token.username.as_str()),
    };
    let matched = match state
        .model
        .dropdown()
        .update(dropdown_id.as_str(), &updates)
        .await
    {
        Err(e) => {
            error!("[{}] update error: {}", FN_NAME, e);
            return Err(ErrResp::ErrDb(Some(e.to_string())));
        }
        Ok(matched) => matched,
    };
    if !matched {
        return Err(ErrResp::ErrNotFound(Some(
            "Dropdown value not found".to_string(),
        )));
    }
    log_activity(
        state.model.as_ref(),
        "UPDATE_DROPDOWN",
        token.username.as_str(),
        format!("Updated dropdown item ID: {}", dropdown_id),
        GLOBAL_TENANT,
        Some(dropdown_id.as_str()),
        Some(COLLECTION),
    )
    .await;

    Ok(Json(MessageRes {
        message: "Dropdown value updated successfully".to_string(),
    }))
}

/// `DELETE /api/global/dropdowns/{id}`
pub async fn delete_dropdown(
    State(state): State<AppState>,
    Extension(token): Extension<TokenInfo>,
    Path(dropdown_id): Path<String>,
) -> impl IntoResponse {
    const FN_NAME: &'static str = "delete_dropdown";

    let dropdown = get_dropdown(FN_NAME, &state, dropdown_id.as_str()).await?;
    if dropdown.is_locked {
        return Err(ErrResp::ErrPerm(Some("Cannot delete a locked item.".to_string())));
    }

    let deleted = match state.model.dropdown().del(dropdown_id.as_str()).await {
        Err(e) => {
            error!("[{}] del error: {}", FN_NAME, e);
            return Err(ErrResp::ErrDb(Some(e.to_string())));
        }
        Ok(deleted) => deleted,
    };
    if !deleted {
        return Err(ErrResp::ErrNotFound(Some(
            "Dropdown value not found".to_string(),
        )));
    }
    log_activity(
        state.model.as_ref(),
        "DELETE_DROPDOWN",
        token.username.as_str(),
        format!(
            "Deleted dropdown item: type='{}', value='{}'",
            dropdown.dropdown_type, dropdown.value
        ),
        GLOBAL_TENANT,
        Some(dropdown_id.as_str()),
        Some(COLLECTION),
    )
    .await;

    Ok(Json(MessageRes {
        message: "Dropdown value deleted successfully".to_string(),
    }))
}

async fn get_dropdown(
    fn_name: &str,
    state: &AppState,
    dropdown_id: &str,
) -> Result<Dropdown, ErrResp> {
    match state.model.dropdown().get(dropdown_id).await {
        Err(e) => {
            error!("[{}] get error: {}", fn_name, e);
            Err(ErrResp::ErrDb(Some(e.to_string())))
        }
        Ok(None) => Err(ErrResp::ErrNotFound(Some(
            "Dropdown value not found".to_string(),
        ))),
        Ok(Some(dropdown)) => Ok(dropdown),
    }
}

fn dropdown_list_transform(list: Vec<Dropdown>) -> Vec<response::GetDropdownData> {
    list.into_iter()
        .map(|item| response::GetDropdownData {
            dropdown_id: item.dropdown_id,
            dropdown_type: item.dropdown_type,
            value: item.value,
            label: item.label,
            is_locked: item.is_locked,
            created_at: time_str(&item.created_at),
            modified_at: time_str(&item.modified_at),
            modified_by: item.modified_by,
        })
        .collect()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    match value.as_deref() {
        Some(v) if v.len() > 0 => Some(v),
        _ => None,
    }
}
