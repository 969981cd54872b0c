use std::collections::HashMap;

use axum::{Router, http::Method, routing};

use super::super::{
    State,
    middleware::{AuthService, RoleType},
};

mod api;
mod request;

pub fn new_service(scope_path: &str, state: &State) -> Router {
    let mut roles_root: HashMap<Method, RoleType> = HashMap::new();
    let mut roles_param: HashMap<Method, RoleType> = HashMap::new();
    let mut roles_default: HashMap<Method, RoleType> = HashMap::new();

    roles_root.insert(Method::GET, vec![]);
    roles_root.insert(Method::POST, vec![]);
    roles_root.insert(Method::PUT, vec![]);
    roles_param.insert(Method::PUT, vec![]);
    roles_param.insert(Method::DELETE, vec![]);
    roles_default.insert(Method::PUT, vec![]);

    Router::new().nest(
        scope_path,
        Router::new()
            .route(
                "/",
                routing::get(api::get_contact_list)
                    .post(api::post_contact)
                    .put(api::put_contact_list)
                    .layer(AuthService::new(&state.jwt, roles_root)),
            )
            .route(
                "/{contact_id}",
                routing::put(api::put_contact)
                    .delete(api::delete_contact)
                    .layer(AuthService::new(&state.jwt, roles_param)),
            )
            .route(
                "/{contact_id}/default",
                routing::put(api::put_contact_default)
                    .layer(AuthService::new(&state.jwt, roles_default)),
            )
            .with_state(state.clone()),
    )
}
