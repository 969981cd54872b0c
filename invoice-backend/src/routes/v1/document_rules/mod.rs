use std::collections::HashMap;

use axum::{Router, http::Method, routing};

use invoice_corelib::role::Role;

use super::super::{
    State,
    middleware::{AuthService, RoleType},
};

mod api;
mod request;
mod response;

pub fn new_service(scope_path: &str, state: &State) -> Router {
    let mut roles_root: HashMap<Method, RoleType> = HashMap::new();

    roles_root.insert(Method::GET, vec![]);
    roles_root.insert(Method::POST, vec![Role::ADMIN]);

    Router::new().nest(
        scope_path,
        Router::new()
            .route(
                "/",
                routing::get(api::get_document_rules)
                    .post(api::post_document_rules)
                    .layer(AuthService::new(&state.jwt, roles_root)),
            )
            .with_state(state.clone()),
    )
}
