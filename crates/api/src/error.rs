use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use persistence::UpstreamError;
use serde::Serialize;
use thiserror::Error;

/// Generic message for unique constraint violations.
pub const DUPLICATE_MESSAGE: &str = "El registro ya existe";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl ApiError {
    /// Maps an upstream error, using `message` when it is a unique
    /// constraint violation.
    pub fn upstream_conflict(err: UpstreamError, message: &str) -> Self {
        if err.is_duplicate_key() {
            tracing::debug!(error = %err, "Duplicate key reported by upstream");
            return ApiError::Conflict(message.to_string());
        }
        err.into()
    }

    /// Session missing or invalid.
    pub fn no_session() -> Self {
        ApiError::Unauthorized("Sesión no válida o expirada".into())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    ok: bool,
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let retry_after = match &self {
            ApiError::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        };
        let (status, error_code, message) = match &self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            ApiError::RateLimited { retry_after_secs } => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                format!(
                    "Demasiadas solicitudes. Intente nuevamente en {} segundos.",
                    retry_after_secs
                ),
            ),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Ocurrió un error interno".into(),
                )
            }
            ApiError::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "service_unavailable",
                    "El servicio de datos no está disponible".into(),
                )
            }
        };

        let body = ErrorBody {
            ok: false,
            error: error_code.into(),
            message,
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        if err.is_duplicate_key() {
            return ApiError::Conflict(DUPLICATE_MESSAGE.into());
        }
        if err.is_foreign_key_violation() {
            return ApiError::Validation("El registro referenciado no existe".into());
        }
        if err.is_invalid_input() {
            tracing::debug!(error = %err, "Upstream rejected input");
            return ApiError::Validation("Datos inválidos".into());
        }
        if err.is_not_found() {
            return ApiError::NotFound("Recurso no encontrado".into());
        }
        if err.is_transport() {
            return ApiError::ServiceUnavailable(err.to_string());
        }
        ApiError::Internal(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| match &e.message {
                    Some(m) => m.to_string(),
                    None => format!("{}: valor inválido", field),
                })
            })
            .collect();
        messages.sort();

        let message = match messages.len() {
            0 => "Datos inválidos".to_string(),
            1 => messages.remove(0),
            _ => messages.join("; "),
        };

        ApiError::Validation(message)
    }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        ApiError::Validation(format!("Formulario inválido: {}", err.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn status_error(status: u16, code: &str, message: &str) -> UpstreamError {
        UpstreamError::Status {
            status,
            code: Some(code.to_string()),
            message: message.to_string(),
            details: None,
            hint: None,
        }
    }

    #[test]
    fn test_api_error_status_codes() {
        let cases = [
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::Conflict("x".into()), StatusCode::CONFLICT),
            (ApiError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (
                ApiError::RateLimited { retry_after_secs: 5 },
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (ApiError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                ApiError::ServiceUnavailable("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(
            format!("{}", ApiError::Unauthorized("test".to_string())),
            "Unauthorized: test"
        );
        assert_eq!(
            format!("{}", ApiError::RateLimited { retry_after_secs: 3 }),
            "Rate limited, retry after 3s"
        );
        assert_eq!(
            format!("{}", ApiError::Internal("test".to_string())),
            "Internal error: test"
        );
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = ApiError::RateLimited { retry_after_secs: 30 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "30");

        let response = ApiError::NotFound("x".into()).into_response();
        assert!(response.headers().get(header::RETRY_AFTER).is_none());
    }

    #[test]
    fn test_from_upstream_duplicate_key() {
        let err: ApiError = status_error(409, "23505", "duplicate key value").into();
        assert!(matches!(err, ApiError::Conflict(m) if m == DUPLICATE_MESSAGE));
    }

    #[test]
    fn test_upstream_conflict_uses_friendly_message() {
        let err = ApiError::upstream_conflict(
            status_error(409, "23505", "duplicate key value violates unique constraint"),
            "Ya existe una cuenta con ese correo o DNI",
        );
        assert!(matches!(err, ApiError::Conflict(m) if m.contains("correo")));

        let err = ApiError::upstream_conflict(status_error(500, "XX000", "boom"), "unused");
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[test]
    fn test_from_upstream_foreign_key_and_input() {
        let err: ApiError = status_error(409, "23503", "violates foreign key").into();
        assert!(matches!(err, ApiError::Validation(_)));

        let err: ApiError = status_error(400, "22P02", "invalid input syntax for type uuid").into();
        assert!(matches!(err, ApiError::Validation(_)));

        let err: ApiError = status_error(400, "PGRST100", "failed to parse filter").into();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_from_upstream_not_found_and_other() {
        let err: ApiError = status_error(404, "PGRST205", "relation not found").into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = UpstreamError::Decode("bad json".into()).into();
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
