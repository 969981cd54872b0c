use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::http::{Json, Query};

/// Query parameters for `GET /version`
#[derive(Deserialize)]
pub struct GetVersionQuery {
    pub q: Option<String>,
}

#[derive(Serialize)]
struct GetVersionRes<'a> {
    data: GetVersionResData<'a>,
}

#[derive(Serialize)]
struct GetVersionResData<'a> {
    name: &'a str,
    version: &'a str,
}

/// Creates an axum handler for `GET /version`.
///
/// - `q=name`: responds the service name as plain text.
/// - `q=version`: responds the service version as plain text.
/// - otherwise: responds `{"data":{"name":"...","version":"..."}}`.
pub fn gen_get_version(
    name: &'static str,
    version: &'static str,
) -> impl Fn(Query<GetVersionQuery>) -> std::future::Ready<Response> + Clone + Send + 'static {
    move |Query(query): Query<GetVersionQuery>| {
        let resp = match query.q.as_deref() {
            Some("name") => name.into_response(),
            Some("version") => version.into_response(),
            _ => Json(GetVersionRes {
                data: GetVersionResData { name, version },
            })
            .into_response(),
        };
        std::future::ready(resp)
    }
}
