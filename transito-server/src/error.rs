use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

/// Error returned by handlers, rendered as `{success: false, error, message}`
#[derive(Debug)]
pub enum ApiError {
    Core(transito_core::Error),
    BadRequest(String),
    NotFound(String),
    Internal(String),
    /// Body or query string the extractors could not decode
    Rejected { status: StatusCode, message: String },
}

impl From<transito_core::Error> for ApiError {
    fn from(e: transito_core::Error) -> Self {
        ApiError::Core(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            ApiError::Core(transito_core::Error::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Core(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Rejected { status, .. } => *status,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Core(e) => e.to_string(),
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Internal(msg)
            | ApiError::Rejected { message: msg, .. } => msg.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        if status.is_server_error() {
            error!("Request failed: {message}");
        }
        let body = json!({
            "success": false,
            "error": status.canonical_reason().unwrap_or("Error"),
            "message": message,
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_http_status() {
        let not_found = ApiError::from(transito_core::Error::VehicleNotFound("v".into()));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let invalid = ApiError::from(transito_core::Error::InvalidInput("bad".into()));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let data = ApiError::from(transito_core::Error::InvalidData("corrupt".into()));
        assert_eq!(data.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
