use axum::{
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use jesprec_core::{
    errors::{ApplicationError, InterfaceError},
    session::{AdminSession, SessionContext},
};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub correlation_id: String,
}

pub type ApiFailure = (StatusCode, Json<ApiError>);
pub type ApiResult<T> = Result<Json<T>, ApiFailure>;

pub fn correlation_id() -> String {
    Uuid::new_v4().simple().to_string()
}

pub fn status_for(error: &InterfaceError) -> StatusCode {
    match error {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
        InterfaceError::BadGateway { .. } => StatusCode::BAD_GATEWAY,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Maps any layer's error onto a status code and the `{error}` body.
pub fn failure(error: impl Into<ApplicationError>, correlation_id: &str) -> ApiFailure {
    let interface = error.into().into_interface(correlation_id);
    let status = status_for(&interface);
    warn!(
        event_name = "api.request.failed",
        correlation_id = %correlation_id,
        status = status.as_u16(),
        error = %interface,
        "request failed"
    );
    (
        status,
        Json(ApiError {
            error: interface.message().to_owned(),
            correlation_id: interface.correlation_id().to_owned(),
        }),
    )
}

pub fn not_found(message: impl Into<String>, correlation_id: &str) -> ApiFailure {
    failure(ApplicationError::NotFound(message.into()), correlation_id)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolves the bearer token to a live admin session or fails with 401.
pub async fn require_admin(
    state: &AppState,
    headers: &HeaderMap,
    correlation_id: &str,
) -> Result<AdminSession, ApiFailure> {
    let context = match bearer_token(headers) {
        None => SessionContext::Anonymous,
        Some(token) => match state.gateway.current_user(token).await {
            Ok(Some(session)) => SessionContext::Admin(session),
            Ok(None) => SessionContext::Anonymous,
            Err(error) => return Err(failure(error, correlation_id)),
        },
    };
    context.require_admin(Utc::now()).cloned().map_err(|error| failure(error, correlation_id))
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, StatusCode};
    use jesprec_core::errors::{ApplicationError, DomainError};

    use super::{bearer_token, failure};

    #[test]
    fn gateway_failures_keep_the_raw_message() {
        let (status, body) =
            failure(ApplicationError::Gateway("duplicate key value".to_owned()), "corr-1");
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.error, "duplicate key value");
        assert_eq!(body.correlation_id, "corr-1");
    }

    #[test]
    fn unauthorized_maps_to_401() {
        let (status, _) = failure(DomainError::Unauthorized, "corr-2");
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn bearer_token_requires_the_scheme() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);
        headers.insert("authorization", HeaderValue::from_static("Bearer jwt-1"));
        assert_eq!(bearer_token(&headers), Some("jwt-1"));
    }
}
