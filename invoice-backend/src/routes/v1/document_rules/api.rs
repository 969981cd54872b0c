use axum::{Extension, extract::State, response::IntoResponse};
use chrono::Utc;
use log::error;

use invoice_corelib::{err::ErrResp, http::Json, strings::time_str};

use super::{request, response};
use crate::{
    models::{
        self,
        document_rules::{BusinessRule, DocumentRules, GLOBAL_NAME, OtherRule},
    },
    routes::{
        State as AppState,
        middleware::TokenInfo,
        v1::{DataRes, log_activity},
    },
};

const COLLECTION: &'static str = "document_rules";
const GLOBAL_TENANT: &'static str = "global";
const NEW_ID_PREFIX: &'static str = "new_";

/// `GET /api/document-rules`
pub async fn get_document_rules(State(state): State<AppState>) -> impl IntoResponse {
    const FN_NAME: &'static str = "get_document_rules";

    match state.model.document_rules().get().await {
        Err(e) => {
            error!("[{}] get error: {}", FN_NAME, e);
            Err(ErrResp::ErrDb(Some(e.to_string())))
        }
        Ok(rules) => Ok(Json(rules_transform(rules.unwrap_or_default()))),
    }
}

/// `POST /api/document-rules`
pub async fn post_document_rules(
    State(state): State<AppState>,
    Extension(token): Extension<TokenInfo>,
    Json(body): Json<request::PostDocumentRulesBody>,
) -> impl IntoResponse {
    const FN_NAME: &'static str = "post_document_rules";

    let rules = DocumentRules {
        business_rules: body
            .business_rules
            .into_iter()
            .map(|rule| BusinessRule {
                rule_id: rule_id(rule.rule_id),
                name: rule.name,
                description: rule.description,
                pan_rules: rule.pan_rules,
                gstin_rules: rule.gstin_rules,
                tan_rules: rule.tan_rules,
                is_locked: rule.is_locked,
            })
            .collect(),
        other_rules: body
            .other_rules
            .into_iter()
            .map(|rule| OtherRule {
                rule_id: rule_id(rule.rule_id),
                name: rule.name,
                description: rule.description,
                is_locked: rule.is_locked,
            })
            .collect(),
        modified_at: Some(Utc::now()),
        modified_by: Some(token.username.clone()),
    };
    if let Err(e) = state.model.document_rules().save(&rules).await {
        error!("[{}] save error: {}", FN_NAME, e);
        return Err(ErrResp::ErrDb(Some(e.to_string())));
    }
    log_activity(
        state.model.as_ref(),
        "SAVE_DOCUMENT_RULES",
        token.username.as_str(),
        format!(
            "Saved document rules: {} business rules, {} other rules",
            rules.business_rules.len(),
            rules.other_rules.len()
        ),
        GLOBAL_TENANT,
        None,
        Some(COLLECTION),
    )
    .await;

    Ok(Json(DataRes {
        message: "Document rules saved successfully".to_string(),
        data: rules_transform(rules),
    }))
}

/// Keeps valid identifiers. Missing, temporary and invalid ones get new identifiers.
fn rule_id(rule_id: Option<String>) -> String {
    match rule_id {
        Some(id) if !id.starts_with(NEW_ID_PREFIX) && models::is_id(id.as_str()) => id,
        _ => models::new_id(),
    }
}

fn rules_transform(rules: DocumentRules) -> response::GetDocumentRules {
    response::GetDocumentRules {
        name: GLOBAL_NAME.to_string(),
        business_rules: rules
            .business_rules
            .into_iter()
            .map(|rule| response::GetBusinessRule {
                rule_id: rule.rule_id,
                name: rule.name,
                description: rule.description,
                pan_rules: rule.pan_rules,
                gstin_rules: rule.gstin_rules,
                tan_rules: rule.tan_rules,
                is_locked: rule.is_locked,
            })
            .collect(),
        other_rules: rules
            .other_rules
            .into_iter()
            .map(|rule| response::GetOtherRule {
                rule_id: rule.rule_id,
                name: rule.name,
                description: rule.description,
                is_locked: rule.is_locked,
            })
            .collect(),
        modified_at: rules.modified_at.as_ref().map(time_str),
        modified_by: rules.modified_by,
    }
}
