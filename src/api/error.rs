//! Mapping from crate errors to HTTP responses.
//!
//! Clients only ever see a status code and a short generic message. Details of
//! infrastructure failures are logged and dropped.

use crate::{api::dto::ErrorResponse, errors::Error};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

/// An HTTP error response: status plus `{"errors": message}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Response status
    pub status: StatusCode,
    /// Client-facing message
    pub message: &'static str,
}

impl ApiError {
    /// 400 with a generic message.
    pub const fn bad_request() -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "Bad request.",
        }
    }

    /// 401 for bad credentials or tokens.
    pub const fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "Unauthorized.",
        }
    }

    /// 500; details stay in the logs.
    pub const fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Internal server error.",
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            // A valid token whose user no longer exists is treated like a bad token
            Error::InvalidCredentials | Error::UserNotFound { .. } => Self::unauthorized(),
            Error::InsufficientBalance { .. } => Self {
                status: StatusCode::BAD_REQUEST,
                message: "Insufficient balance.",
            },
            Error::UnknownRecipient { .. } => Self {
                status: StatusCode::BAD_REQUEST,
                message: "Unknown recipient.",
            },
            Error::UnknownItem { .. } => Self {
                status: StatusCode::BAD_REQUEST,
                message: "Unknown item.",
            },
            Error::SelfTransfer => Self {
                status: StatusCode::BAD_REQUEST,
                message: "Cannot send coins to yourself.",
            },
            Error::InvalidAmount { .. } | Error::InvalidQuantity { .. } => Self::bad_request(),
            other => {
                error!("Request failed: {other}");
                Self::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                errors: self.message.to_string(),
            }),
        )
            .into_response()
    }
}
