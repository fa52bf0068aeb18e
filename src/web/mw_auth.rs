// src/web/mw_auth.rs
use crate::error::AppError;
use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

// Middleware that checks whether a user is logged in
pub async fn require_auth(
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match session.get::<String>("user_id").await {
        Ok(Some(user_id)) => {
            tracing::debug!("Auth MW: user '{}' authenticated, continuing", user_id);

            // Expose the id to downstream middleware and handlers
            request.extensions_mut().insert(UserId(user_id));
            Ok(next.run(request).await)
        }
        Ok(None) => {
            tracing::debug!("Auth MW: no session user, redirecting to landing");
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => {
            tracing::error!("Auth MW: failed to read session: {:?}", e);
            Err(AppError::SessionError(format!(
                "Failed to verify session: {e}"
            )))
        }
    }
}

// Holds the logged-in user's id in the request extensions
#[derive(Clone, Debug)]
pub struct UserId(pub String);
