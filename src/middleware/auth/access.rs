//! Request gate middleware: access token 検証 → scope 判定 → AuthCtx を extensions に入れる
//!
//! - 認証失敗 (token なし/不正/期限切れ) は 401、scope 不足は 403
//! - どちらの場合も handler は呼ばれない (body のパース/検証より先に判定する)
//! - 判定ロジック本体は `services::auth::gate::RequestGate` にある

use axum::{
    Router,
    body::Body,
    extract::{OriginalUri, State},
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::gate::Admission;
use crate::state::AppState;

/// `/api/*` に gate を掛けるための middleware を適用する。
///
/// 例：
/// ```ignore
/// let profiles = Router::new().route(...);
/// let profiles = middleware::auth::access::apply(profiles, state.clone());
/// app = app.nest("/api", profiles);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    OriginalUri(original_uri): OriginalUri,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // nest された router では req.uri() から prefix が落ちるので、rule table と突き合わせるのは元の path
    let path = original_uri.path();

    let authorization = match req.headers().get(header::AUTHORIZATION) {
        None => None,
        Some(value) => Some(value.to_str().map_err(|_| {
            tracing::warn!(path, "authorization header is not visible ASCII");
            AppError::Unauthorized {
                invalid_token: true,
            }
        })?),
    };

    let admission = match state.gate.admit(req.method(), path, authorization) {
        Ok(admission) => admission,
        Err(rejection) => {
            tracing::warn!(
                method = %req.method(),
                path,
                reason = %rejection,
                "request rejected by gate"
            );
            return Err(rejection.into());
        }
    };

    if let Admission::Authorized(claims) = admission {
        tracing::debug!(
            subject = claims.subject.as_deref().unwrap_or("-"),
            issuer = %claims.issuer,
            expires_at = %claims.expires_at,
            scopes = %claims.scopes,
            "request authorized"
        );
        // middleware → extractor への受け渡し
        req.extensions_mut().insert(AuthCtx::from(claims));
    }

    Ok(next.run(req).await)
}
