use std::collections::HashMap;

use axum::{Router, http::Method, routing};

use super::super::{
    State,
    middleware::{AuthService, RoleType},
};

mod api;
mod response;

pub fn new_service(scope_path: &str, state: &State) -> Router {
    let mut roles_root: HashMap<Method, RoleType> = HashMap::new();
    roles_root.insert(Method::GET, vec![]);
    roles_root.insert(Method::POST, vec![]);
    roles_root.insert(Method::PUT, vec![]);

    Router::new().nest(
        scope_path,
        Router::new()
            .route(
                "/",
                routing::get(api::get_company)
                    .post(api::save_company)
                    .put(api::save_company)
                    .layer(AuthService::new(&state.jwt, roles_root)),
            )
            .with_state(state.clone()),
    )
}
