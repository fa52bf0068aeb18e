// src/web/police_handlers.rs
use crate::{
    error::{AppError, AppResult},
    services::{tally_service, user_service},
    state::AppState,
    templates::PolicePage,
    web::mw_auth::UserId,
};
use askama::Template;
use axum::{
    extract::{Extension, State},
    response::{Html, IntoResponse},
};

/// GET /police — monitoring overview: which centers have reported and
/// the overall count so far
pub async fn police_page_handler(
    State(state): State<AppState>,
    Extension(user_id_ext): Extension<UserId>,
) -> AppResult<impl IntoResponse> {
    let user_id = user_id_ext.0;
    tracing::debug!("GET /police: access for {}", user_id);

    let user = user_service::find_user_by_id(state.store.as_ref(), &user_id)
        .await?
        .ok_or_else(|| {
            tracing::error!("Authenticated user '{}' missing from directory!", user_id);
            AppError::InternalServerError
        })?;

    let submissions = tally_service::load_submissions(state.store.as_ref())?;
    let centers = tally_service::per_center_summary(&submissions);
    let total_votes = centers.iter().map(|c| c.votes_cast).sum();

    let template = PolicePage {
        officer_name: user.name,
        location: user.location,
        centers_reporting: centers.len(),
        total_votes,
        centers,
    };

    match template.render() {
        Ok(html) => Ok(Html(html).into_response()),
        Err(e) => {
            tracing::error!("Failed to render PolicePage: {}", e);
            Err(AppError::InternalServerError)
        }
    }
}
