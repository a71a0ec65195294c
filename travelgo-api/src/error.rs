use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use travelgo_core::BookingError;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    Booking(BookingError),
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        AppError::Booking(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Booking(BookingError::InvalidRequest(rejection.body_text()))
    }
}

fn status_for(err: &BookingError) -> StatusCode {
    match err {
        BookingError::NotFound(_) => StatusCode::NOT_FOUND,
        BookingError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        BookingError::Conflict(_) => StatusCode::CONFLICT,
        BookingError::Forbidden(_) => StatusCode::FORBIDDEN,
        BookingError::StorageFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            AppError::AuthenticationError(msg) => {
                (StatusCode::UNAUTHORIZED, json!("UNAUTHORIZED"), msg)
            }
            AppError::Booking(err) => {
                let status = status_for(&err);
                let message = match &err {
                    BookingError::StorageFailure(detail) => {
                        tracing::error!("Storage failure: {}", detail);
                        "Storage temporarily unavailable, please retry".to_string()
                    }
                    BookingError::NotFound(msg)
                    | BookingError::InvalidRequest(msg)
                    | BookingError::Conflict(msg)
                    | BookingError::Forbidden(msg) => msg.clone(),
                };
                (status, json!(err.kind()), message)
            }
        };

        let body = Json(json!({
            "status": "error",
            "kind": kind,
            "message": message,
        }));

        (status, body).into_response()
    }
}
