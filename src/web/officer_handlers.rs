// src/web/officer_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::tally::{VoteSubmission, PARTIES},
    services::{tally_service, user_service},
    state::AppState,
    templates::{OfficerPage, VoteRow},
    web::mw_auth::UserId,
};
use askama::Template;
use axum::{
    extract::{Extension, Form, Query, State},
    response::{Html, IntoResponse, Redirect},
};
use serde::Deserialize;

// A center that registered without an id falls back to the default
// demo center rather than being locked out of vote entry.
const FALLBACK_CENTER_ID: &str = "PC-DHK-001";

#[derive(Deserialize, Debug)]
pub struct OfficerQuery {
    error: Option<String>,
}

// Party-wise counts as posted by the vote-entry form. Field names are
// the party ids in the roster.
#[derive(Deserialize, Debug)]
pub struct VoteCountsForm {
    #[serde(rename = "PA", default)]
    pa: u64,
    #[serde(rename = "PB", default)]
    pb: u64,
    #[serde(rename = "PC", default)]
    pc: u64,
    #[serde(rename = "PD", default)]
    pd: u64,
    #[serde(rename = "PE", default)]
    pe: u64,
    #[serde(rename = "PF", default)]
    pf: u64,
    #[serde(rename = "IND", default)]
    ind: u64,
}

impl VoteCountsForm {
    // Counts in roster order, ready for submission building
    fn counts(&self) -> Vec<(&'static str, u64)> {
        vec![
            ("PA", self.pa),
            ("PB", self.pb),
            ("PC", self.pc),
            ("PD", self.pd),
            ("PE", self.pe),
            ("PF", self.pf),
            ("IND", self.ind),
        ]
    }
}

fn officer_center(user: &crate::models::user::SystemUser) -> (String, String) {
    let center_id = user
        .polling_center_id
        .clone()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| FALLBACK_CENTER_ID.to_string());
    let center_name = user
        .polling_center_name
        .clone()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| center_id.clone());
    (center_id, center_name)
}

/// GET /officer — vote-entry dashboard; read-only once this center has
/// submitted its counts
pub async fn officer_page_handler(
    State(state): State<AppState>,
    Extension(user_id_ext): Extension<UserId>,
    Query(params): Query<OfficerQuery>,
) -> AppResult<impl IntoResponse> {
    let user_id = user_id_ext.0;
    tracing::debug!("GET /officer: access for {}", user_id);

    let user = user_service::find_user_by_id(state.store.as_ref(), &user_id)
        .await?
        .ok_or_else(|| {
            tracing::error!("Authenticated user '{}' missing from directory!", user_id);
            AppError::InternalServerError
        })?;

    let (center_id, center_name) = officer_center(&user);
    let submissions = tally_service::load_submissions(state.store.as_ref())?;
    let existing = submissions.iter().find(|s| s.polling_center == center_id);

    // Locked view: replay the stored counts in roster order
    let (submitted, submitted_total) = match existing {
        Some(sub) => {
            let rows: Vec<VoteRow> = PARTIES
                .iter()
                .map(|p| VoteRow {
                    id: p.id,
                    name: p.name,
                    votes: sub.party_votes.get(p.id).map_or(0, tally_service::vote_count),
                })
                .collect();
            let total = tally_service::vote_count(&sub.total_votes);
            (Some(rows), total)
        }
        None => (None, 0),
    };

    let party_rows = PARTIES
        .iter()
        .map(|p| VoteRow {
            id: p.id,
            name: p.name,
            votes: 0,
        })
        .collect();

    let template = OfficerPage {
        officer_name: user.name,
        center_id,
        center_name,
        submitted,
        submitted_total,
        party_rows,
        error: params.error,
    };

    match template.render() {
        Ok(html) => Ok(Html(html).into_response()),
        Err(e) => {
            tracing::error!("Failed to render OfficerPage: {}", e);
            Err(AppError::InternalServerError)
        }
    }
}

/// POST /officer/votes — the one-time submission. A second attempt for
/// the same center is rejected and surfaced on the page.
pub async fn handle_submit_votes(
    State(state): State<AppState>,
    Extension(user_id_ext): Extension<UserId>,
    Form(form): Form<VoteCountsForm>,
) -> AppResult<Redirect> {
    let user_id = user_id_ext.0;

    let user = user_service::find_user_by_id(state.store.as_ref(), &user_id)
        .await?
        .ok_or_else(|| {
            tracing::error!("Authenticated user '{}' missing from directory!", user_id);
            AppError::InternalServerError
        })?;
    let (center_id, center_name) = officer_center(&user);

    tracing::info!("POST /officer/votes: submission from center {}", center_id);

    let submission: VoteSubmission =
        tally_service::new_submission(&center_id, &center_name, &form.counts());

    match tally_service::record_submission(state.store.as_ref(), submission) {
        Ok(()) => {
            // Wake every open trends dashboard
            state
                .trends_hub
                .broadcast(r#"{"type":"submissions-updated"}"#.to_string())
                .await;
            Ok(Redirect::to("/officer"))
        }
        Err(AppError::Validation(message)) => {
            tracing::warn!("Submission from {} rejected: {}", center_id, message);
            let url = format!("/officer?error={}", urlencoding::encode(&message));
            Ok(Redirect::to(&url))
        }
        Err(e) => Err(e),
    }
}
