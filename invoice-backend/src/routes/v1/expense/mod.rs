use std::collections::HashMap;

use axum::{Router, http::Method, routing};

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
    roles_root.insert(Method::POST, vec![]);
    roles_param.insert(Method::GET, vec![]);
    roles_param.insert(Method::PUT, vec![]);
    roles_param.insert(Method::DELETE, vec![]);

    Router::new().nest(
        scope_path,
        Router::new()
            .route(
                "/",
                routing::get(api::get_expense_list)
                    .post(api::post_expense)
                    .layer(AuthService::new(&state.jwt, roles_root)),
            )
            .route(
                "/{expense_id}",
                routing::get(api::get_expense)
                    .put(api::put_expense)
                    .delete(api::delete_expense)
                    .layer(AuthService::new(&state.jwt, roles_param)),
            )
            .with_state(state.clone()),
    )
}
