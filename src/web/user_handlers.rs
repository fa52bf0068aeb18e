// src/web/user_handlers.rs
use crate::{
    error::{AppError, AppResult},
    services::user_service,
    state::AppState,
    templates::ProfilePage,
    web::mw_auth::UserId,
};
use askama::Template;
use axum::{
    extract::{Extension, Form, Query, State},
    response::{Html, IntoResponse, Redirect},
};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct ProfileQuery {
    success: Option<String>,
    error: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ProfileForm {
    #[serde(default)]
    phone: String,
    #[serde(default)]
    avatar: String,
}

// GET /profile (any logged-in role)
pub async fn profile_page_handler(
    State(state): State<AppState>,
    Extension(user_id_ext): Extension<UserId>,
    Query(params): Query<ProfileQuery>,
) -> AppResult<impl IntoResponse> {
    let user_id = user_id_ext.0;
    tracing::debug!("GET /profile: access for {}", user_id);

    let user = user_service::find_user_by_id(state.store.as_ref(), &user_id)
        .await?
        .ok_or_else(|| {
            tracing::error!("Authenticated user '{}' missing from directory!", user_id);
            AppError::InternalServerError
        })?;

    let template = ProfilePage {
        role_label: user.role.to_string(),
        status_label: user.status.to_string(),
        user,
        success_message: params.success,
        error_message: params.error,
    };

    match template.render() {
        Ok(html) => Ok(Html(html).into_response()),
        Err(e) => {
            tracing::error!("Failed to render ProfilePage: {}", e);
            Err(AppError::InternalServerError)
        }
    }
}

// POST /profile — self-service contact-detail update
pub async fn handle_profile_update(
    State(state): State<AppState>,
    Extension(user_id_ext): Extension<UserId>,
    Form(form): Form<ProfileForm>,
) -> AppResult<Redirect> {
    let user_id = user_id_ext.0;
    tracing::info!("POST /profile: update for {}", user_id);

    let phone = Some(form.phone.as_str()).filter(|p| !p.trim().is_empty());
    let avatar = Some(form.avatar.as_str()).filter(|a| !a.trim().is_empty());

    user_service::update_profile(state.store.as_ref(), &user_id, phone, avatar).await?;

    let url = format!(
        "/profile?success={}",
        urlencoding::encode("Profile updated.")
    );
    Ok(Redirect::to(&url))
}
