/*
 * Responsibility
 * - /customer-profiles 系 CRUD handler
 * - ここに来た時点で gate (認証 → 認可) は通過済み
 * - Json を受け、DTO を検証済みドメイン型に変換 → service 呼び出し
 * - service の None (存在しない) を 404 に変換する
 */
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::{
    api::{
        dto::customer_profiles::{ChangeProfileRequest, CreateProfileRequest, ProfileResponse},
        extractors::AuthCtxExtractor,
    },
    error::{AppError, ErrorResponse},
    services::auth::policy::PROFILES_PATH,
    state::AppState,
};

// Body problems surface here, after the gate has already run.
// Malformed JSON is a 400; size and content-type rejections keep 413 / 415.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match body {
        Ok(Json(inner)) => Ok(inner),
        Err(
            rejection @ (JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_)),
        ) => Err(AppError::bad_request("INVALID_BODY", rejection.body_text())),
        Err(rejection) => {
            let status = rejection.status();
            let code = match status {
                StatusCode::PAYLOAD_TOO_LARGE => "PAYLOAD_TOO_LARGE",
                StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
                _ => "INVALID_BODY",
            };
            Err(AppError::Rejected {
                status,
                code,
                message: rejection.body_text(),
            })
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/customer-profiles",
    request_body = CreateProfileRequest,
    responses(
        (status = 201, description = "Profile created; Location points at it", body = ProfileResponse),
        (status = 400, description = "Malformed body or missing field", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 403, description = "Token lacks message.write", body = ErrorResponse),
    ),
    security(("bearer_auth" = ["message.write"])),
    tag = "customer-profiles"
)]
pub async fn create_profile(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    body: Result<Json<CreateProfileRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let new_profile = json_body(body)?.into_new_profile()?;

    let profile = state.profiles.create(new_profile).await?;
    tracing::debug!(
        principal = auth.principal(),
        scopes = %auth.scopes,
        profile_id = %profile.id,
        "create"
    );

    let location = format!("{}/{}", PROFILES_PATH, profile.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(ProfileResponse::from(profile)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/customer-profiles/{profile_id}",
    params(("profile_id" = String, Path, description = "Profile id")),
    responses(
        (status = 200, description = "The profile", body = ProfileResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 403, description = "Token lacks message.read", body = ErrorResponse),
        (status = 404, description = "No such profile; empty body"),
    ),
    security(("bearer_auth" = ["message.read"])),
    tag = "customer-profiles"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = state
        .profiles
        .get_by_id(&profile_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(profile.into()))
}

#[utoipa::path(
    get,
    path = "/api/customer-profiles",
    responses(
        (status = 200, description = "All profiles in store order", body = Vec<ProfileResponse>),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 403, description = "Token lacks message.read", body = ErrorResponse),
    ),
    security(("bearer_auth" = ["message.read"])),
    tag = "customer-profiles"
)]
pub async fn list_profiles(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProfileResponse>>, AppError> {
    let profiles = state.profiles.get_all().await?;

    Ok(Json(profiles.map(ProfileResponse::from).collect()))
}

#[utoipa::path(
    patch,
    path = "/api/customer-profiles/{profile_id}",
    params(("profile_id" = String, Path, description = "Profile id")),
    request_body = ChangeProfileRequest,
    responses(
        (status = 200, description = "The updated profile", body = ProfileResponse),
        (status = 400, description = "Malformed body or blank field", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 403, description = "Token lacks message.write (AUTHZ_MUTATION_SCOPE=write)", body = ErrorResponse),
        (status = 404, description = "No such profile; empty body"),
    ),
    security(("bearer_auth" = [])),
    tag = "customer-profiles"
)]
pub async fn change_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
    body: Result<Json<ChangeProfileRequest>, JsonRejection>,
) -> Result<Json<ProfileResponse>, AppError> {
    let changes = json_body(body)?.into_changes()?;

    let profile = state
        .profiles
        .change(&profile_id, changes)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(profile.into()))
}

#[utoipa::path(
    delete,
    path = "/api/customer-profiles/{profile_id}",
    params(("profile_id" = String, Path, description = "Profile id")),
    responses(
        (status = 200, description = "Deleted, or already absent; empty body"),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 403, description = "Token lacks message.write (AUTHZ_MUTATION_SCOPE=write)", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "customer-profiles"
)]
pub async fn delete_profile(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    Path(profile_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.profiles.delete(&profile_id).await?;
    tracing::debug!(
        principal = auth.principal(),
        scopes = %auth.scopes,
        profile_id = %profile_id,
        "delete"
    );

    Ok(StatusCode::OK)
}
