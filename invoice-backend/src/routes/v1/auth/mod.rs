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
    let mut roles_profile: HashMap<Method, RoleType> = HashMap::new();
    roles_profile.insert(Method::GET, vec![]);

    Router::new().nest(
        scope_path,
        Router::new()
            .route("/register", routing::post(api::post_register))
            .route("/login", routing::post(api::post_login))
            .route(
                "/profile",
                routing::get(api::get_profile).layer(AuthService::new(&state.jwt, roles_profile)),
            )
            .route("/test-users", routing::get(api::get_test_users))
            .with_state(state.clone()),
    )
}
