/*
 * Responsibility
 * - /api 配下の URL 構造を定義
 * - /customer-profiles (collection) と /customer-profiles/{profile_id} (resource)
 * - /openapi.json (API description)
 * - gate (access middleware) はこの router 全体に掛ける: rule に当たらない request も拒否される
 */
use axum::{Router, routing::get};

use crate::api::handlers::customer_profiles::{
    change_profile, create_profile, delete_profile, get_profile, list_profiles,
};
use crate::api::openapi::openapi_json;
use crate::middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let router = Router::new()
        // collection is reachable with and without the trailing slash
        .route("/customer-profiles", get(list_profiles).post(create_profile))
        .route("/customer-profiles/", get(list_profiles).post(create_profile))
        .route(
            "/customer-profiles/{profile_id}",
            get(get_profile).patch(change_profile).delete(delete_profile),
        )
        // Public rule in the policy; the gate admits it without a token
        .route("/openapi.json", get(openapi_json));

    middleware::auth::access::apply(router, state)
}
