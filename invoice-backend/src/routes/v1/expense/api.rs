use std::collections::HashMap;

use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{NaiveDate, Utc};
use log::error;
use serde_json::{Map, Value};

use invoice_corelib::{
    err::ErrResp,
    http::{Json, Path, Query},
    strings::time_str,
};

use super::{request, response};
use crate::{
    libs::{coerce, expense, form},
    models::{
        self,
        expense::{Expense, ListOptions, ListQueryCond, SortCond, SortKey},
        record::RecordModel,
    },
    routes::{
        State as AppState,
        middleware::TokenInfo,
        v1::{DataRes, MessageRes, Paging, log_activity},
    },
};

const COLLECTION: &'static str = "expenses";
const LIST_LIMIT_DEFAULT: u64 = 10;
const LIST_LIMIT_MAX: u64 = 1000;
const STATUS_ALL: &'static str = "All";
const DATE_FORMAT: &'static str = "%d/%m/%Y";

/// Resolved vendor and account names of one request.
#[derive(Default)]
struct NameCache {
    suppliers: HashMap<String, Option<String>>,
    expense_heads: HashMap<String, Option<String>>,
}

/// `POST /api/expenses`
pub async fn post_expense(
    State(state): State<AppState>,
    Extension(token): Extension<TokenInfo>,
    Json(body): Json<Map<String, Value>>,
) -> impl IntoResponse {
    const FN_NAME: &'static str = "post_expense";

    let expense = match expense::parse_new(
        &body,
        models::new_id().as_str(),
        token.tenant_id.as_str(),
        token.username.as_str(),
        &Utc::now(),
    ) {
        Err(e) => return Err(ErrResp::ErrParam(Some(e))),
        Ok(expense) => expense,
    };
    if let Err(e) = state.model.expense().add(&expense).await {
        error!("[{}] add error: {}", FN_NAME, e);
        return Err(ErrResp::ErrDb(Some(e.to_string())));
    }
    log_activity(
        state.model.as_ref(),
        "CREATE_EXPENSE",
        token.username.as_str(),
        format!("Created expense: {}", expense.transaction_no),
        token.tenant_id.as_str(),
        Some(expense.expense_id.as_str()),
        Some(COLLECTION),
    )
    .await;

    let mut names = NameCache::default();
    let data = expense_transform(FN_NAME, &state, &mut names, expense).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataRes {
            message: "Expense created successfully".to_string(),
            data,
        }),
    ))
}

/// `GET /api/expenses/{expense_id}`
pub async fn get_expense(
    State(state): State<AppState>,
    Extension(token): Extension<TokenInfo>,
    Path(param): Path<request::ExpenseIdPath>,
) -> impl IntoResponse {
    const FN_NAME: &'static str = "get_expense";

    let expense = get_tenant_expense(FN_NAME, &state, &token, param.expense_id.as_str()).await?;
    let mut names = NameCache::default();
    let data = expense_transform(FN_NAME, &state, &mut names, expense).await?;
    Ok::<_, ErrResp>(Json(data))
}

/// `GET /api/expenses`
pub async fn get_expense_list(
    State(state): State<AppState>,
    Extension(token): Extension<TokenInfo>,
    Query(query): Query<request::GetExpenseListQuery>,
) -> impl IntoResponse {
    const FN_NAME: &'static str = "get_expense_list";

    let paging = Paging::parse(
        query.page.as_deref(),
        query.limit.as_deref(),
        LIST_LIMIT_DEFAULT,
        Some(LIST_LIMIT_MAX),
        true,
    )?;
    let sort_key = match query.sort_by.as_deref() {
        None | Some("") | Some("billDate") => SortKey::BillDate,
        Some("dueDate") => SortKey::DueDate,
        Some("totalAmount") => SortKey::TotalAmount,
        Some("billNo") => SortKey::BillNo,
        Some("createdAt") => SortKey::CreatedAt,
        Some(key) => {
            return Err(ErrResp::ErrParam(Some(format!("Invalid sort key: {}", key))));
        }
    };
    let asc = match query.sort_order.as_deref() {
        Some(order) => order.eq_ignore_ascii_case("asc"),
        None => false,
    };

    let cond = ListQueryCond {
        tenant_id: token.tenant_id.as_str(),
        search: non_empty(&query.search),
        status: match non_empty(&query.status) {
            Some(STATUS_ALL) | None => None,
            Some(status) => Some(status),
        },
        supplier_id: non_empty(&query.supplier_id),
        bill_date_from: query_date(&query.date_from),
        bill_date_to: query_date(&query.date_to),
    };
    let model = state.model.expense();
    let total = match model.count(&cond).await {
        Err(e) => {
            error!("[{}] count error: {}", FN_NAME, e);
            return Err(ErrResp::ErrDb(Some(e.to_string())));
        }
        Ok(total) => total,
    };
    let sort = [SortCond { key: sort_key, asc }];
    let opts = ListOptions {
        cond: &cond,
        offset: paging.offset(),
        limit: paging.limit,
        sort: Some(&sort),
    };
    let list = match model.list(&opts).await {
        Err(e) => {
            error!("[{}] list error: {}", FN_NAME, e);
            return Err(ErrResp::ErrDb(Some(e.to_string())));
        }
        Ok(list) => list,
    };

    let mut names = NameCache::default();
    let mut data = vec![];
    for item in list {
        data.push(expense_transform(FN_NAME, &state, &mut names, item).await?);
    }
    Ok(Json(paging.to_res(data, total)))
}

/// `PUT /api/expenses/{expense_id}`
pub async fn put_expense(
    State(state): State<AppState>,
    Extension(token): Extension<TokenInfo>,
    Path(param): Path<request::ExpenseIdPath>,
    Json(body): Json<Map<String, Value>>,
) -> impl IntoResponse {
    const FN_NAME: &'static str = "put_expense";

    let expense_id = param.expense_id.as_str();
    let stored = get_tenant_expense(FN_NAME, &state, &token, expense_id).await?;
    let mut updates = match expense::parse_updates(&body, &stored) {
        Err(e) => return Err(ErrResp::ErrParam(Some(e))),
        Ok(updates) => updates,
    };
    if updates.is_empty() {
        return Err(ErrResp::ErrParam(Some("no effective changes".to_string())));
    }
    updates.modified_at = Some(Utc::now());
    updates.modified_by = Some(token.username.clone());

    let tenant_id = token.tenant_id.as_str();
    let matched = match state
        .model
        .expense()
        .update(tenant_id, expense_id, &updates)
        .await
    {
        Err(e) => {
            error!("[{}] update error: {}", FN_NAME, e);
            return Err(ErrResp::ErrDb(Some(e.to_string())));
        }
        Ok(matched) => matched,
    };
    if !matched {
        return Err(ErrResp::ErrNotFound(Some("Expense not found".to_string())));
    }
    log_activity(
        state.model.as_ref(),
        "UPDATE_EXPENSE",
        token.username.as_str(),
        format!("Updated expense: {}", stored.transaction_no),
        tenant_id,
        Some(expense_id),
        Some(COLLECTION),
    )
    .await;

    let expense = get_tenant_expense(FN_NAME, &state, &token, expense_id).await?;
    let mut names = NameCache::default();
    let data = expense_transform(FN_NAME, &state, &mut names, expense).await?;
    Ok(Json(DataRes {
        message: "Expense updated successfully".to_string(),
        data,
    }))
}

/// `DELETE /api/expenses/{expense_id}`
pub async fn delete_expense(
    State(state): State<AppState>,
    Extension(token): Extension<TokenInfo>,
    Path(param): Path<request::ExpenseIdPath>,
) -> impl IntoResponse {
    const FN_NAME: &'static str = "delete_expense";

    let expense_id = param.expense_id.as_str();
    let tenant_id = token.tenant_id.as_str();
    let stored = get_tenant_expense(FN_NAME, &state, &token, expense_id).await?;
    let deleted = match state.model.expense().del(tenant_id, expense_id).await {
        Err(e) => {
            error!("[{}] del error: {}", FN_NAME, e);
            return Err(ErrResp::ErrDb(Some(e.to_string())));
        }
        Ok(deleted) => deleted,
    };
    if !deleted {
        return Err(ErrResp::ErrNotFound(Some("Expense not found".to_string())));
    }
    if let Some(file_name) = stored.invoice_filename.as_ref() {
        form::remove_upload(state.expense_invoice_path.as_str(), file_name.as_str()).await;
    }
    log_activity(
        state.model.as_ref(),
        "DELETE_EXPENSE",
        token.username.as_str(),
        format!("Deleted expense: {}", stored.transaction_no),
        tenant_id,
        Some(expense_id),
        Some(COLLECTION),
    )
    .await;

    Ok(Json(MessageRes {
        message: "Expense deleted successfully".to_string(),
    }))
}

async fn get_tenant_expense(
    fn_name: &str,
    state: &AppState,
    token: &TokenInfo,
    expense_id: &str,
) -> Result<Expense, ErrResp> {
    if !models::is_id(expense_id) {
        return Err(ErrResp::ErrParam(Some(
            "Invalid expense ID format".to_string(),
        )));
    }
    match state
        .model
        .expense()
        .get(token.tenant_id.as_str(), expense_id)
        .await
    {
        Err(e) => {
            error!("[{}] get error: {}", fn_name, e);
            Err(ErrResp::ErrDb(Some(e.to_string())))
        }
        Ok(None) => Err(ErrResp::ErrNotFound(Some("Expense not found".to_string()))),
        Ok(Some(expense)) => Ok(expense),
    }
}

/// To get the `field` of the record of the tenant. Missing records give `None`.
async fn lookup_name(
    fn_name: &str,
    model: &dyn RecordModel,
    cache: &mut HashMap<String, Option<String>>,
    tenant_id: &str,
    record_id: Option<&String>,
    field: &str,
) -> Result<Option<String>, ErrResp> {
    let record_id = match record_id {
        None => return Ok(None),
        Some(record_id) => record_id,
    };
    if let Some(name) = cache.get(record_id) {
        return Ok(name.clone());
    }
    let name = match model.get(tenant_id, record_id.as_str()).await {
        Err(e) => {
            error!("[{}] get {} error: {}", fn_name, field, e);
            return Err(ErrResp::ErrDb(Some(e.to_string())));
        }
        Ok(None) => None,
        Ok(Some(record)) => record.fields.get(field).and_then(coerce::text),
    };
    cache.insert(record_id.clone(), name.clone());
    Ok(name)
}

async fn expense_transform(
    fn_name: &str,
    state: &AppState,
    names: &mut NameCache,
    expense: Expense,
) -> Result<response::GetExpenseData, ErrResp> {
    let tenant_id = expense.tenant_id.as_str();
    let supplier_name = lookup_name(
        fn_name,
        state.model.vendor(),
        &mut names.suppliers,
        tenant_id,
        expense.supplier_id.as_ref(),
        "displayName",
    )
    .await?;
    let expense_head_name = lookup_name(
        fn_name,
        state.model.account(),
        &mut names.expense_heads,
        tenant_id,
        expense.expense_head_id.as_ref(),
        "name",
    )
    .await?;

    Ok(response::GetExpenseData {
        expense_id: expense.expense_id,
        tenant_id: expense.tenant_id,
        transaction_no: expense.transaction_no,
        bill_no: expense.bill_no,
        bill_date: date_str(expense.bill_date),
        due_date: date_str(expense.due_date),
        supplier_id: expense.supplier_id,
        supplier_name,
        supplier_gst: expense.supplier_gst,
        expense_head_id: expense.expense_head_id,
        expense_head_name,
        narration: expense.narration,
        currency: expense.currency,
        cgst_amount: expense.cgst_amount,
        sgst_amount: expense.sgst_amount,
        igst_amount: expense.igst_amount,
        cess_amount: expense.cess_amount,
        tax_amount: expense.tax_amount,
        total_amount: expense.total_amount,
        net_amount: expense.net_amount,
        tds_rate: expense.tds_rate,
        tds_amount_calculated: expense.tds_amount_calculated,
        payment_method: expense.payment_method,
        bill_source: expense.bill_source,
        status: expense.status,
        invoice_filename: expense.invoice_filename,
        line_items: expense
            .line_items
            .into_iter()
            .map(|item| response::GetExpenseLineItem {
                description: item.description,
                hsn_code: item.hsn_code,
                qty: item.qty,
                price: item.price,
                subtotal: item.subtotal,
            })
            .collect(),
        sub_total_from_items: expense.sub_total_from_items,
        discount_amount: expense.discount_amount,
        tax_from_items: expense.tax_from_items,
        grand_total_from_items: expense.grand_total_from_items,
        created_at: time_str(&expense.created_at),
        modified_at: time_str(&expense.modified_at),
        modified_by: expense.modified_by,
    })
}

fn date_str(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

fn query_date(value: &Option<String>) -> Option<NaiveDate> {
    match non_empty(value) {
        None => None,
        Some(value) => coerce::date(&Value::String(value.to_string())),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    match value.as_deref() {
        Some(v) if v.len() > 0 => Some(v),
        _ => None,
    }
}
