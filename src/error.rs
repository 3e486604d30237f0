/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - gate rejection / validation error / store error を統一的に変換
 */
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::repos::error::StoreError;
use crate::services::auth::gate::{AuthenticationFailure, GateRejection};
use crate::services::profiles::ValidationError;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Machine-readable code, e.g. `VALIDATION_FAILED`.
    #[schema(value_type = String)]
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    /// Body rejected before parsing (size, content type); keeps the rejection's status.
    #[error("{status}: {message}")]
    Rejected {
        status: StatusCode,
        code: &'static str,
        message: String,
    },
    /// `invalid_token` is set when a token was presented but rejected.
    #[error("unauthorized")]
    Unauthorized { invalid_token: bool },
    #[error("forbidden")]
    Forbidden { required_scope: Option<String> },
    /// Rendered with an empty body.
    #[error("not found")]
    NotFound,
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    // RFC 6750 section 3 challenge
    fn www_authenticate(&self) -> Option<String> {
        match self {
            AppError::Unauthorized {
                invalid_token: false,
            } => Some("Bearer".to_string()),
            AppError::Unauthorized {
                invalid_token: true,
            } => Some(r#"Bearer error="invalid_token""#.to_string()),
            AppError::Forbidden {
                required_scope: Some(scope),
            } => Some(format!(
                r#"Bearer error="insufficient_scope", scope="{scope}""#
            )),
            AppError::Forbidden {
                required_scope: None,
            } => Some(r#"Bearer error="insufficient_scope""#.to_string()),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let challenge = self.www_authenticate();

        let (status, code, message) = match self {
            AppError::BadRequest { code, message } => (StatusCode::BAD_REQUEST, code, message),
            AppError::Rejected {
                status,
                code,
                message,
            } => (status, code, message),
            AppError::Unauthorized { .. } => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "authentication required".into(),
            ),
            AppError::Forbidden { .. } => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "insufficient scope".into(),
            ),
            AppError::NotFound => return StatusCode::NOT_FOUND.into_response(),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal server error".into(),
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(value) = challenge.and_then(|c| HeaderValue::from_str(&c).ok()) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, value);
        }
        response
    }
}

impl From<GateRejection> for AppError {
    fn from(e: GateRejection) -> Self {
        match e {
            GateRejection::AuthenticationFailed(AuthenticationFailure::MissingToken) => {
                AppError::Unauthorized {
                    invalid_token: false,
                }
            }
            GateRejection::AuthenticationFailed(_) => AppError::Unauthorized {
                invalid_token: true,
            },
            GateRejection::AuthorizationFailed(reason) => AppError::Forbidden {
                required_scope: reason.required_scope().map(str::to_owned),
            },
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::bad_request("VALIDATION_FAILED", e.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        tracing::error!(error = ?e, "profile store failure");
        AppError::Internal
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;
    use crate::services::auth::policy::DenyReason;

    async fn body_bytes(response: Response) -> Vec<u8> {
        response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec()
    }

    #[tokio::test]
    async fn not_found_has_an_empty_body() {
        let response = AppError::NotFound.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn missing_token_gets_a_bare_bearer_challenge() {
        let rejection = GateRejection::AuthenticationFailed(AuthenticationFailure::MissingToken);
        let response = AppError::from(rejection).into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }

    #[tokio::test]
    async fn insufficient_scope_names_the_scope() {
        let rejection = GateRejection::AuthorizationFailed(DenyReason::InsufficientScope {
            required: "message.write".to_string(),
        });
        let response = AppError::from(rejection).into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            response.headers()[header::WWW_AUTHENTICATE],
            r#"Bearer error="insufficient_scope", scope="message.write""#
        );
    }

    #[tokio::test]
    async fn rejected_bodies_keep_their_status() {
        let response = AppError::Rejected {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            code: "PAYLOAD_TOO_LARGE",
            message: "length limit exceeded".to_string(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn validation_errors_are_bad_requests_with_a_json_body() {
        let response = AppError::from(ValidationError::Required("email")).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["error"]["code"], "VALIDATION_FAILED");
        assert_eq!(body["error"]["message"], "email is required");
    }
}
