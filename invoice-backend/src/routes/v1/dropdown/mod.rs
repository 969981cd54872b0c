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
    let mut roles_param: HashMap<Method, RoleType> = HashMap::new();

    roles_root.insert(Method::GET, vec![]);
    roles_root.insert(Method::POST, vec![Role::ADMIN]);
    roles_param.insert(Method::GET, vec![]);
    roles_param.insert(Method::PUT, vec![Role::ADMIN]);
    roles_param.insert(Method::DELETE, vec![Role::ADMIN]);

    Router::new().nest(
        scope_path,
        Router::new()
            .route(
                "/",
                routing::get(api::get_dropdown_list)
                    .post(api::post_dropdown)
                    .layer(AuthService::new(&state.jwt, roles_root)),
            )
            .route(
                "/{param}",
                routing::get(api::get_dropdown_type_list)
                    .put(api::put_dropdown)
                    .delete(api::delete_dropdown)
                    .layer(AuthService::new(&state.jwt, roles_param)),
            )
            .with_state(state.clone()),
    )
}
