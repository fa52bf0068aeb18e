// src/web/mw_role.rs
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

/// Shared role gate for the officer and police dashboards.
/// Must run *after* `require_auth`.
async fn require_role(
    state: &AppState,
    user_id: &str,
    required: Role,
) -> Result<(), AppError> {
    match user_service::find_user_by_id(state.store.as_ref(), user_id).await? {
        Some(user) if user.role == required => {
            tracing::debug!("Role MW: {} access granted for {}", required, user_id);
            Ok(())
        }
        Some(user) => {
            tracing::warn!(
                "Role MW: access denied for {} ({} page, user is {})",
                user_id,
                required,
                user.role
            );
            Err(AppError::Unauthorized)
        }
        None => {
            tracing::warn!("Role MW: session user {} not in directory", user_id);
            Err(AppError::Unauthorized)
        }
    }
}

pub async fn require_officer(
    State(state): State<AppState>,
    Extension(user_id_ext): Extension<UserId>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    require_role(&state, &user_id_ext.0, Role::Officer).await?;
    Ok(next.run(request).await)
}

pub async fn require_police(
    State(state): State<AppState>,
    Extension(user_id_ext): Extension<UserId>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    require_role(&state, &user_id_ext.0, Role::Police).await?;
    Ok(next.run(request).await)
}
