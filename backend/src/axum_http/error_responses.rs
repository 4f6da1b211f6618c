use std::fmt::Display;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::usecases::{
    admin_settings::SettingsError, applicants::ApplicantError, auth::LoginError,
    daily_links::DailyLinkError, dashboard::DashboardError, members::MemberError,
    telegram_send::TelegramError,
};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code: status.as_u16(),
            message: message.into(),
        }
    }

    pub fn confirmation_required() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "this action needs confirm: true in the request body",
        )
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Usecase errors that know their HTTP status.
pub trait HttpError: Display + std::fmt::Debug {
    fn status_code(&self) -> StatusCode;
}

macro_rules! http_error {
    ($($error:ty),* $(,)?) => {
        $(impl HttpError for $error {
            fn status_code(&self) -> StatusCode {
                <$error>::status_code(self)
            }
        })*
    };
}

http_error!(
    ApplicantError,
    MemberError,
    DailyLinkError,
    SettingsError,
    TelegramError,
    DashboardError,
    LoginError,
);

/// Server errors are logged and replaced with a generic message.
pub fn error_response<E: HttpError>(context: &str, err: E) -> Response {
    let status = err.status_code();
    if status.is_server_error() {
        error!(error = ?err, "{context}: request failed");
        let message = match status {
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            _ => err.to_string(),
        };
        return ErrorResponse::new(status, message).into_response();
    }
    ErrorResponse::new(status, err.to_string()).into_response()
}
