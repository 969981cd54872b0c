use chrono::Utc;
use log::error;
use serde::Serialize;

use invoice_corelib::err::ErrResp;

use crate::models::{Model, activity_log::Activity};

pub mod auth;
pub mod company;
pub mod contact;
pub mod document_ai;
pub mod document_rules;
pub mod dropdown;
pub mod expense;
pub mod record;

/// The `page` and `limit` of a list request. `limit` is `None` for all items.
#[derive(Debug, PartialEq)]
pub struct Paging {
    pub page: u64,
    pub limit: Option<u64>,
}

/// The list response envelope.
#[derive(Serialize)]
pub struct ListRes<T: Serialize> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

/// A response with a message only.
#[derive(Serialize)]
pub struct MessageRes {
    pub message: String,
}

/// A response with a message and the item.
#[derive(Serialize)]
pub struct DataRes<T: Serialize> {
    pub message: String,
    pub data: T,
}

const PAGE_ERR: &'static str = "Invalid page or limit parameter. Must be integers.";

impl Paging {
    /// To parse `page` and `limit` query strings.
    ///
    /// - `page` defaults to 1 and values less than 1 become 1.
    /// - `limit` uses `def_limit` when absent. `0` and negative values mean all items.
    /// - `limit` larger than `max_limit` is capped.
    /// - With `lenient_limit`, a limit that is not a number means all items instead of an error.
    pub fn parse(
        page: Option<&str>,
        limit: Option<&str>,
        def_limit: u64,
        max_limit: Option<u64>,
        lenient_limit: bool,
    ) -> Result<Self, ErrResp> {
        let page = match page {
            None => 1,
            Some(page) => match page.trim().parse::<i64>() {
                Err(_) => return Err(ErrResp::ErrParam(Some(PAGE_ERR.to_string()))),
                Ok(page) => page.max(1) as u64,
            },
        };
        let limit = match limit {
            None => Some(def_limit),
            Some(limit) => match limit.trim().parse::<i64>() {
                Err(_) => match lenient_limit {
                    false => return Err(ErrResp::ErrParam(Some(PAGE_ERR.to_string()))),
                    true => None,
                },
                Ok(limit) if limit <= 0 => None,
                Ok(limit) => Some(limit as u64),
            },
        };
        let limit = match (limit, max_limit) {
            (Some(limit), Some(max)) if limit > max => Some(max),
            (limit, _) => limit,
        };
        // The offset must fit the database skip count.
        if let Some(limit) = limit {
            match (page - 1).checked_mul(limit) {
                Some(offset) if offset <= i64::MAX as u64 => (),
                _ => return Err(ErrResp::ErrParam(Some(PAGE_ERR.to_string()))),
            }
        }
        Ok(Paging { page, limit })
    }

    /// The number of items to skip.
    pub fn offset(&self) -> Option<u64> {
        match self.limit {
            None => None,
            Some(limit) => Some(self.page.saturating_sub(1).saturating_mul(limit)),
        }
    }

    /// To build the list response envelope.
    pub fn to_res<T: Serialize>(&self, data: Vec<T>, total: u64) -> ListRes<T> {
        match self.limit {
            None => ListRes {
                data,
                total,
                page: self.page,
                limit: total,
                total_pages: 1,
            },
            Some(limit) => ListRes {
                data,
                total,
                page: self.page,
                limit,
                total_pages: total.div_ceil(limit),
            },
        }
    }
}

/// To add an activity log. Failures are logged only.
pub async fn log_activity(
    model: &dyn Model,
    action_type: &str,
    user: &str,
    details: String,
    tenant_id: &str,
    document_id: Option<&str>,
    collection_name: Option<&str>,
) {
    const FN_NAME: &'static str = "log_activity";

    let activity = Activity {
        timestamp: Utc::now(),
        action_type: action_type.to_string(),
        user: user.to_string(),
        details,
        tenant_id: tenant_id.to_string(),
        document_id: document_id.map(|v| v.to_string()),
        collection_name: collection_name.map(|v| v.to_string()),
    };
    if let Err(e) = model.activity_log().add(&activity).await {
        error!("[{}] add {} error: {}", FN_NAME, action_type, e);
    }
}
