// src/web/auth_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{LoginForm, Role},
    services::user_service,
    state::AppState,
    templates::{LandingPage, LoginPage},
};
use askama::Template;
use axum::{
    extract::{Form, Query, State},
    response::{Html, IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;

fn dashboard_path(role: Role) -> &'static str {
    match role {
        Role::Admin => "/admin/users",
        Role::Officer => "/officer",
        Role::Police => "/police",
    }
}

// GET / — role selection cards
pub async fn show_landing(session: Session) -> impl IntoResponse {
    // Already signed in? Straight back to the matching dashboard.
    if let Ok(Some(role_slug)) = session.get::<String>("role").await {
        if let Some(role) = Role::from_slug(&role_slug) {
            tracing::debug!("GET /: session active, redirecting to dashboard");
            return Redirect::to(dashboard_path(role)).into_response();
        }
    }

    match LandingPage.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Failed to render landing template: {}", e);
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Error loading the page.",
            )
                .into_response()
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct LoginQuery {
    role: Option<String>,
}

// GET /login?role=admin|officer|police
pub async fn show_login_form(Query(params): Query<LoginQuery>) -> AppResult<impl IntoResponse> {
    let role = params
        .role
        .as_deref()
        .and_then(Role::from_slug)
        .unwrap_or(Role::Admin);

    let template = LoginPage {
        role_slug: role.slug().to_string(),
        role_label: role.to_string(),
        error: None,
    };
    match template.render() {
        Ok(html) => Ok(Html(html).into_response()),
        Err(e) => {
            tracing::error!("Failed to render login template: {}", e);
            Err(AppError::InternalServerError)
        }
    }
}

// POST /login — credential check against the account directory
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> AppResult<impl IntoResponse> {
    tracing::info!("Login attempt for username: {}", form.username);

    let Some(role) = Role::from_slug(&form.role) else {
        tracing::warn!("Login with unknown role slug '{}'", form.role);
        return Err(AppError::Validation("Unknown role".to_string()));
    };

    match user_service::authenticate(state.store.as_ref(), &form.username, &form.password, role)
        .await
    {
        Ok(user) => {
            // Fresh session id on privilege change
            session
                .cycle_id()
                .await
                .map_err(|e| AppError::SessionError(format!("Failed to cycle id: {e}")))?;
            session
                .insert("user_id", &user.id)
                .await
                .map_err(|e| AppError::SessionError(format!("Failed to store session: {e}")))?;
            session
                .insert("role", user.role.slug())
                .await
                .map_err(|e| AppError::SessionError(format!("Failed to store session: {e}")))?;

            Ok(Redirect::to(dashboard_path(user.role)).into_response())
        }
        // Authentication-taxonomy failures render inline on the form
        Err(e @ (AppError::InvalidCredentials
        | AppError::PendingApproval
        | AppError::AccountDeactivated)) => {
            let message = match e {
                AppError::InvalidCredentials => {
                    "Invalid credentials. Please check your username, password, and selected role."
                }
                AppError::PendingApproval => {
                    "Your account is pending approval. Please wait for admin verification."
                }
                _ => "Your account has been deactivated. Please contact the administrator.",
            };
            let template = LoginPage {
                role_slug: role.slug().to_string(),
                role_label: role.to_string(),
                error: Some(message.to_string()),
            };
            match template.render() {
                Ok(html) => Ok(Html(html).into_response()),
                Err(render_e) => {
                    tracing::error!("Failed to render login template with error: {}", render_e);
                    Err(AppError::InternalServerError)
                }
            }
        }
        // Anything else (storage failure, hashing failure) propagates
        Err(e) => {
            tracing::error!("Login failed unexpectedly for {}: {:?}", form.username, e);
            Err(e)
        }
    }
}

// GET /logout
pub async fn handle_logout(session: Session) -> AppResult<Redirect> {
    let user_id: Option<String> = session.get("user_id").await.ok().flatten();

    session
        .delete()
        .await
        .map_err(|e| AppError::SessionError(format!("Failed to delete session: {e}")))?;

    if let Some(id) = user_id {
        tracing::info!("🚪 User '{}' signed out.", id);
    } else {
        tracing::info!("🚪 Anonymous session ended.");
    }

    Ok(Redirect::to("/"))
}
