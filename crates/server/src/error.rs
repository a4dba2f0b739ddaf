use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::warn;
use weave_compute::{ComputeError, Node2VecError};
use weave_core::WeaveError;
use weave_storage::StorageError;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// An error with the HTTP status it maps to.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!(status = %self.status, error = %self.message, "request failed");
        }
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

fn weave_status(e: &WeaveError) -> StatusCode {
    match e {
        WeaveError::EntityNotFound(_) | WeaveError::ProjectNotFound(_) => StatusCode::NOT_FOUND,
        WeaveError::Serialize(_)
        | WeaveError::WrongEntityKind { .. }
        | WeaveError::InvalidEdge { .. }
        | WeaveError::LengthMismatch(_)
        | WeaveError::MissingInput(_)
        | WeaveError::InvalidParameter(_)
        | WeaveError::UnknownOperation(_) => StatusCode::BAD_REQUEST,
        WeaveError::Io(_) | WeaveError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<WeaveError> for ApiError {
    fn from(e: WeaveError) -> Self {
        Self::new(weave_status(&e), e.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        let status = match &e {
            StorageError::Core(inner) => weave_status(inner),
            StorageError::Walk(w)
                if w
                    .io_error()
                    .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound) =>
            {
                StatusCode::NOT_FOUND
            }
            StorageError::NoParts(_) => StatusCode::NOT_FOUND,
            StorageError::UnknownId(_)
            | StorageError::IndexOutOfRange { .. }
            | StorageError::MissingVertexSet(_)
            | StorageError::MissingColumn(_)
            | StorageError::UnsupportedKind(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}

impl From<Node2VecError> for ApiError {
    fn from(e: Node2VecError) -> Self {
        let status = match &e {
            Node2VecError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            Node2VecError::Core(inner) => weave_status(inner),
            Node2VecError::DeadEnd { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}

impl From<ComputeError> for ApiError {
    fn from(e: ComputeError) -> Self {
        match e {
            ComputeError::Node2Vec(inner) => inner.into(),
            ComputeError::Core(inner) => inner.into(),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::internal(format!("background task failed: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        let missing: ApiError = WeaveError::ProjectNotFound("p".into()).into();
        assert_eq!(missing.status, StatusCode::NOT_FOUND);

        let invalid: ApiError = Node2VecError::InvalidParameter("dimensions".into()).into();
        assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

        let unknown: ApiError = StorageError::UnknownId(7).into();
        assert_eq!(unknown.status, StatusCode::BAD_REQUEST);

        let unknown_op: ApiError =
            ComputeError::Core(WeaveError::UnknownOperation("x".into())).into();
        assert_eq!(unknown_op.status, StatusCode::BAD_REQUEST);

        let other: ApiError = WeaveError::Other("boom".into()).into();
        assert_eq!(other.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
