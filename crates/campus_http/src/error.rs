use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use campus_core::{EntityKind, ServiceError};
use log::{error, warn};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ApiResult<T> = Result<T, ApiError>;

/// Request failure as seen by HTTP clients.
///
/// Bodies are plain text.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl ApiError {
    pub(crate) fn not_found(kind: EntityKind, id: Uuid) -> Self {
        Self::NotFound(format!("{kind} '{id}' not found"))
    }

    pub(crate) fn not_found_by_label(kind: EntityKind, label: &str) -> Self {
        Self::NotFound(format!(
            "{kind} with {} '{label}' not found",
            kind.label_field()
        ))
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(message) | Self::BadRequest(message) | Self::Internal(message) => {
                f.write_str(message)
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        match value {
            ServiceError::NotFound { .. } => Self::NotFound(value.to_string()),
            ServiceError::Validation(err) => Self::BadRequest(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Internal(message) => {
                error!(
                    "event=http_request module=http status=error http_status={} error={}",
                    status.as_u16(),
                    message
                );
                // Store details stay in the log.
                return (status, "internal server error").into_response();
            }
            _ => warn!(
                "event=http_request module=http status=rejected http_status={}",
                status.as_u16()
            ),
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use campus_core::{EntityKind, RepoError, ServiceError, ValidationError};
    use uuid::Uuid;

    #[test]
    fn service_errors_map_to_status_classes() {
        let id = Uuid::new_v4();
        let cases = [
            (
                ServiceError::NotFound {
                    kind: EntityKind::Student,
                    id,
                },
                StatusCode::NOT_FOUND,
            ),
            (
                ServiceError::Validation(ValidationError::BlankLabel(EntityKind::Lecture)),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServiceError::Repo(RepoError::InvalidData("broken".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            let response = ApiError::from(error).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn not_found_message_names_kind_and_id() {
        let id = Uuid::new_v4();
        let error = ApiError::not_found(EntityKind::Department, id);
        assert_eq!(error.to_string(), format!("department '{id}' not found"));

        let error = ApiError::not_found_by_label(EntityKind::Lecture, "Optics");
        assert_eq!(error.to_string(), "lecture with title 'Optics' not found");
    }
}
