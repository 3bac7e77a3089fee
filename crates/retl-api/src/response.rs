use axum::{http::StatusCode, response::IntoResponse, Json};
use retl_core::Error;
use serde::Serialize;

/// Error envelope shared by every route
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub message: String,
    pub code: String,
    pub errors: Vec<String>,
}

pub type ApiResult<T> = std::result::Result<T, ApiResponse<()>>;

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful response with data
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            data: Some(data),
            message: message.into(),
            code: "SUCCESS".to_string(),
            errors: vec![],
        }
    }

    /// Create an error response
    pub fn error(code: impl Into<String>, message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            data: None,
            message: message.into(),
            code: code.into(),
            errors,
        }
    }

    /// Create a bad request error response
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::error("BAD_REQUEST", message, vec![])
    }

    /// Create an internal error response
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::error("INTERNAL_ERROR", message, vec![])
    }

    /// The scheduler refused an execution unit
    pub fn scheduler_error(message: impl Into<String>) -> Self {
        Self::error("SCHEDULER_ERROR", message, vec![])
    }
}

impl From<Error> for ApiResponse<()> {
    fn from(e: Error) -> Self {
        match e {
            Error::Validation(message) => ApiResponse::bad_request(message),
            Error::Scheduler(message) => ApiResponse::scheduler_error(message),
            Error::Store(message) => {
                ApiResponse::error("INTERNAL_ERROR", "Catalog store failure", vec![message])
            }
            other => ApiResponse::internal_error(other.to_string()),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        let status = match self.code.as_str() {
            "SUCCESS" => StatusCode::OK,
            "BAD_REQUEST" => StatusCode::BAD_REQUEST,
            "SCHEDULER_ERROR" => StatusCode::BAD_GATEWAY,
            "INTERNAL_ERROR" => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(e: Error) -> StatusCode {
        ApiResponse::<()>::from(e).into_response().status()
    }

    #[test]
    fn test_error_mapping() {
        assert_eq!(status_of(Error::Validation("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(Error::Store("x".into())), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_of(Error::Scheduler("x".into())), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_of(Error::Configuration("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_error_keeps_cause() {
        let response = ApiResponse::<()>::from(Error::Store("disk full".into()));
        assert_eq!(response.code, "INTERNAL_ERROR");
        assert_eq!(response.errors, vec!["disk full".to_string()]);
    }
}
