// src/web/admin_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{NewUser, Role, UserStatus},
    services::{auth_service, user_service},
    state::AppState,
    templates::{AdminUsersPage, UserRow},
};
use askama::Template;
use axum::{
    extract::{Form, Path, Query, State},
    response::{Html, IntoResponse, Redirect},
};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct UsersQuery {
    // Search + filter state
    #[serde(default)]
    q: String,
    role: Option<String>,
    status: Option<String>,
    // PRG feedback
    success: Option<String>,
    error: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct CreateUserForm {
    name: String,
    username: String,
    email: String,
    password: String,
    role: String,
    #[serde(default)]
    location: String,
}

#[derive(Deserialize, Debug)]
pub struct StatusForm {
    status: String,
}

fn feedback_redirect(ok: Option<&str>, err: Option<&str>) -> Redirect {
    let url = match (ok, err) {
        (Some(msg), _) => format!("/admin/users?success={}", urlencoding::encode(msg)),
        (_, Some(msg)) => format!("/admin/users?error={}", urlencoding::encode(msg)),
        _ => "/admin/users".to_string(),
    };
    Redirect::to(&url)
}

/// GET /admin/users — the user-management page
pub async fn show_users_page(
    State(state): State<AppState>,
    Query(params): Query<UsersQuery>,
) -> AppResult<impl IntoResponse> {
    tracing::debug!("GET /admin/users: loading directory...");

    let users = user_service::load_users(state.store.as_ref()).await?;
    let total = users.len();
    let pending = users
        .iter()
        .filter(|u| u.status == UserStatus::Pending)
        .count();

    let query = params.q.trim().to_lowercase();
    let filter_role = params.role.unwrap_or_else(|| "All".to_string());
    let filter_status = params.status.unwrap_or_else(|| "All".to_string());

    let rows: Vec<UserRow> = users
        .iter()
        .filter(|u| {
            query.is_empty()
                || u.name.to_lowercase().contains(&query)
                || u.username.to_lowercase().contains(&query)
                || u.email.to_lowercase().contains(&query)
                || u.id.to_lowercase().contains(&query)
        })
        .filter(|u| filter_role == "All" || u.role.to_string() == filter_role)
        .filter(|u| filter_status == "All" || u.status.to_string() == filter_status)
        .map(UserRow::from)
        .collect();

    let template = AdminUsersPage {
        users: rows,
        total,
        pending,
        query: params.q,
        filter_role,
        filter_status,
        success_message: params.success,
        error_message: params.error,
    };

    match template.render() {
        Ok(html) => Ok(Html(html).into_response()),
        Err(e) => {
            tracing::error!("Failed to render AdminUsersPage: {}", e);
            Err(AppError::InternalServerError)
        }
    }
}

/// POST /admin/users/create — admin-created accounts start Active
pub async fn handle_create_user(
    State(state): State<AppState>,
    Form(form): Form<CreateUserForm>,
) -> AppResult<Redirect> {
    tracing::info!("POST /admin/users/create: creating '{}'", form.username);

    if form.name.trim().is_empty()
        || form.username.trim().is_empty()
        || form.email.trim().is_empty()
        || form.password.len() < 6
    {
        tracing::warn!("User creation rejected: invalid form data");
        return Ok(feedback_redirect(
            None,
            Some("Invalid data. All fields are required and the password needs at least 6 characters."),
        ));
    }
    let Some(role) = Role::from_slug(&form.role.to_lowercase()) else {
        return Ok(feedback_redirect(None, Some("Unknown role selected.")));
    };

    if user_service::username_taken(state.store.as_ref(), form.username.trim()).await? {
        return Ok(feedback_redirect(None, Some("Username already exists.")));
    }
    if user_service::email_taken(state.store.as_ref(), form.email.trim()).await? {
        return Ok(feedback_redirect(None, Some("Email already registered.")));
    }

    let password_hash = auth_service::hash_password(&form.password).await?;
    let user = user_service::add_user(
        state.store.as_ref(),
        NewUser {
            username: form.username.trim().to_string(),
            password_hash,
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: None,
            role,
            status: UserStatus::Active,
            location: form.location.trim().to_string(),
            joined_date: user_service::today(),
            last_active: "Just now".to_string(),
            service_id: None,
            rank: None,
            polling_center_id: None,
            polling_center_name: None,
            thana: None,
            nid_document: None,
        },
    )
    .await?;

    Ok(feedback_redirect(
        Some(&format!("User '{}' created as {}.", user.username, user.id)),
        None,
    ))
}

/// POST /admin/users/{id}/approve — Pending → Active
pub async fn handle_approve_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Redirect> {
    tracing::info!("POST /admin/users/{}/approve", user_id);
    user_service::set_status(state.store.as_ref(), &user_id, UserStatus::Active).await?;
    Ok(feedback_redirect(
        Some(&format!("User {user_id} approved.")),
        None,
    ))
}

/// POST /admin/users/{id}/reject — a rejected registration is deleted
pub async fn handle_reject_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Redirect> {
    tracing::info!("POST /admin/users/{}/reject", user_id);
    user_service::remove_user(state.store.as_ref(), &user_id).await?;
    Ok(feedback_redirect(
        Some(&format!("Registration {user_id} rejected.")),
        None,
    ))
}

/// POST /admin/users/{id}/status — Active ⇄ Inactive
pub async fn handle_set_status(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Form(form): Form<StatusForm>,
) -> AppResult<Redirect> {
    let status = match form.status.as_str() {
        "Active" => UserStatus::Active,
        "Inactive" => UserStatus::Inactive,
        other => {
            tracing::warn!("Unknown status '{}' for {}", other, user_id);
            return Ok(feedback_redirect(None, Some("Unknown status.")));
        }
    };
    user_service::set_status(state.store.as_ref(), &user_id, status).await?;
    Ok(feedback_redirect(
        Some(&format!("User {user_id} is now {status}.")),
        None,
    ))
}

/// POST /admin/users/{id}/delete
pub async fn handle_delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Redirect> {
    tracing::info!("POST /admin/users/{}/delete", user_id);
    user_service::remove_user(state.store.as_ref(), &user_id).await?;
    Ok(feedback_redirect(
        Some(&format!("User {user_id} deleted.")),
        None,
    ))
}
