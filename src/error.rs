// src/error.rs
use crate::store::StoreError;
use axum::{http::StatusCode, response::Html, response::IntoResponse};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Session database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Error processing password")]
    PasswordHashing,

    // Authentication taxonomy: the login handler renders these inline,
    // they only reach IntoResponse if a handler forgets to catch them.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account pending approval")]
    PendingApproval,

    #[error("Account deactivated")]
    AccountDeactivated,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Session error: {0}")]
    SessionError(String),

    #[error("Unexpected internal error")]
    InternalServerError,

    #[error("Not authorized")]
    Unauthorized,
}

// How an AppError becomes an HTTP response
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        // Log the detailed error server-side
        tracing::error!("Request failed: {:?}", self);

        let (status, user_message) = match self {
            AppError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Error accessing stored data."),
            AppError::Sqlx(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Error accessing the session store."),
            AppError::EnvVar(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Configuration error."),
            AppError::PasswordHashing => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Error processing credentials.")
            }
            // Generic message on purpose: never reveal which field failed
            AppError::InvalidCredentials
            | AppError::PendingApproval
            | AppError::AccountDeactivated => (StatusCode::UNAUTHORIZED, "Could not sign you in."),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "Submitted data was invalid."),
            AppError::SessionError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Error managing your session.")
            }
            AppError::Unauthorized => {
                (StatusCode::FORBIDDEN, "You do not have access to this page.")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "An unexpected error occurred."),
        };

        (status, Html(format!(r#"
            <!DOCTYPE html><html><head><title>Error</title><style>body{{font-family:sans-serif;}}</style></head>
            <body><h1>Error {status_code}</h1><p>{message}</p><a href="javascript:history.back()">Go back</a></body></html>
         "#, status_code = status.as_u16(), message = user_message))).into_response()
    }
}

// Standard Result type for the application
pub type AppResult<T = ()> = Result<T, AppError>;
