use std::collections::HashMap;

use axum::{Router, http::Method, routing};

use super::super::{
    State,
    middleware::{AuthService, RoleType},
};

mod api;
mod response;

pub fn new_service(scope_path: &str, state: &State) -> Router {
    let mut roles_extract: HashMap<Method, RoleType> = HashMap::new();

    roles_extract.insert(Method::POST, vec![]);

    Router::new().nest(
        scope_path,
        Router::new()
            .route(
                "/extract-invoice",
                routing::post(api::post_extract_invoice)
                    .layer(AuthService::new(&state.jwt, roles_extract)),
            )
            .with_state(state.clone()),
    )
}
