use std::collections::HashMap;

use axum::{Extension, Router, http::Method, routing};

use super::super::{
    State,
    middleware::{AuthService, RoleType},
};
use crate::libs::records::RecordKind;

mod api;
mod request;

/// To register the handlers of one record resource. All users of the tenant can access them.
pub fn new_service(scope_path: &str, kind: &'static RecordKind, state: &State) -> Router {
    let mut roles_root: HashMap<Method, RoleType> = HashMap::new();
    let mut roles_param: HashMap<Method, RoleType> = HashMap::new();

    roles_root.insert(Method::GET, vec![]);
    roles_root.insert(Method::POST, vec![]);
    roles_param.insert(Method::GET, vec![]);
    roles_param.insert(Method::PUT, vec![]);
    roles_param.insert(Method::DELETE, vec![]);

    let mut router = Router::new()
        .route(
            "/",
            routing::get(api::get_record_list)
                .post(api::post_record)
                .layer(AuthService::new(&state.jwt, roles_root)),
        )
        .route(
            "/{record_id}",
            routing::get(api::get_record)
                .put(api::put_record)
                .delete(api::delete_record)
                .layer(AuthService::new(&state.jwt, roles_param)),
        );
    if kind.has_item_route {
        let mut roles_item: HashMap<Method, RoleType> = HashMap::new();
        roles_item.insert(Method::GET, vec![]);
        router = router.route(
            "/item/{record_id}",
            routing::get(api::get_record).layer(AuthService::new(&state.jwt, roles_item)),
        );
    }

    Router::new().nest(
        scope_path,
        router.layer(Extension(kind)).with_state(state.clone()),
    )
}
