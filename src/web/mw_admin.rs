// src/web/mw_admin.rs
use crate::{
    error::AppError,
    models::user::Role,
    services::user_service,
    state::AppState,
    web::mw_auth::UserId,
};
use axum::{
    extract::{Extension, Request, State},
    middleware::Next,
    response::Response,
};

/// Middleware gating the `/admin` tree on the Admin role.
/// Must run *after* `require_auth`.
pub async fn require_admin(
    State(state): State<AppState>,
    Extension(user_id_ext): Extension<UserId>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = user_id_ext.0;
    tracing::debug!("Admin MW: checking Admin role for {}", user_id);

    match user_service::find_user_by_id(state.store.as_ref(), &user_id).await? {
        Some(user) if user.role == Role::Admin => {
            tracing::debug!("Admin MW: access granted for {}", user_id);
            Ok(next.run(request).await)
        }
        Some(_) => {
            tracing::warn!("Admin MW: access denied for {} (not an admin)", user_id);
            Err(AppError::Unauthorized)
        }
        None => {
            // Session points at a record that no longer exists
            tracing::warn!("Admin MW: session user {} not in directory", user_id);
            Err(AppError::Unauthorized)
        }
    }
}
