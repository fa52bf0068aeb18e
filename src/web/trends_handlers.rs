// src/web/trends_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::tally::party_by_id,
    services::tally_service,
    state::AppState,
    templates::{BarView, PieView, TopPartyRow, TrendsPage},
    web::mw_auth::UserId,
};
use askama::Template;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Extension, Query, State,
    },
    response::{Html, IntoResponse},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;

const CHART_HEIGHT: f64 = 420.0;
const PIE_CENTER: f64 = 160.0;
const PIE_RADIUS: f64 = 120.0;

#[derive(Deserialize, Debug)]
pub struct TrendsQuery {
    mode: Option<String>,
}

/// GET /admin/trends — voting trends and analytics, recomputed from the
/// submission list on every request
pub async fn trends_page_handler(
    State(state): State<AppState>,
    Query(params): Query<TrendsQuery>,
) -> AppResult<impl IntoResponse> {
    let leading_mode = params.mode.as_deref() == Some("leading");
    tracing::debug!(
        "GET /admin/trends: rendering in {} mode",
        if leading_mode { "leading" } else { "percentage" }
    );

    let submissions = tally_service::load_submissions(state.store.as_ref())?;
    let totals = tally_service::totals_by_party(&submissions);
    let centers = tally_service::per_center_summary(&submissions);
    let stats = tally_service::overview(&totals);

    let total_votes_cast: u64 = centers.iter().map(|c| c.votes_cast).sum();

    // Bar chart series + axis ceiling for the selected mode
    let (axis_max, bars) = if leading_mode {
        let values: Vec<f64> = centers.iter().map(|c| c.leading_votes as f64).collect();
        let axis = tally_service::axis_scale(&values, 10.0);
        let bars = centers
            .iter()
            .map(|c| {
                let height =
                    ((c.leading_votes as f64 / axis) * CHART_HEIGHT).min(CHART_HEIGHT - 2.0);
                let party = party_by_id(&c.leading_party);
                BarView {
                    name: c.name.clone(),
                    height_px: format!("{height:.1}"),
                    color: party.map_or("#6b7280", |p| p.color).to_string(),
                    title: match party {
                        Some(p) => format!(
                            "{}: {} ({}) {} votes",
                            c.name, p.name, c.leading_party, c.leading_votes
                        ),
                        None => format!("{}: {} votes", c.name, c.leading_votes),
                    },
                }
            })
            .collect();
        (axis, bars)
    } else {
        let percentages: Vec<f64> = centers
            .iter()
            .map(|c| {
                if total_votes_cast > 0 {
                    c.votes_cast as f64 / total_votes_cast as f64 * 100.0
                } else {
                    0.0
                }
            })
            .collect();
        let axis = tally_service::percentage_axis_scale(&percentages);
        let bars = centers
            .iter()
            .zip(&percentages)
            .map(|(c, pct)| {
                let height = ((pct / axis) * CHART_HEIGHT).min(CHART_HEIGHT - 2.0);
                BarView {
                    name: c.name.clone(),
                    height_px: format!("{height:.1}"),
                    color: "#3b82f6".to_string(),
                    title: format!(
                        "{}: {} of {} votes ({pct:.1}%)",
                        c.name, c.votes_cast, total_votes_cast
                    ),
                }
            })
            .collect();
        (axis, bars)
    };

    // Gridline labels, top to bottom
    let axis_labels = [1.0, 0.75, 0.5, 0.25, 0.0]
        .iter()
        .map(|t| {
            let value = (t * axis_max).round() as i64;
            if leading_mode {
                value.to_string()
            } else {
                format!("{value}%")
            }
        })
        .collect();

    // Pie wedges with precomputed SVG paths
    let pie = tally_service::pie_slices(&totals)
        .into_iter()
        .map(|slice| {
            let share = if stats.total_votes > 0 {
                slice.votes as f64 / stats.total_votes as f64 * 100.0
            } else {
                0.0
            };
            PieView {
                path: tally_service::arc_path(
                    PIE_CENTER,
                    PIE_CENTER,
                    PIE_RADIUS,
                    slice.start_angle,
                    slice.end_angle,
                ),
                color: slice.color,
                title: format!("{}: {share:.1}% ({})", slice.id, slice.votes),
            }
        })
        .collect();

    // Top three parties by votes; stable sort keeps roster order on ties
    let mut ranked = totals.clone();
    ranked.sort_by(|a, b| b.votes.cmp(&a.votes));
    let leader_votes = ranked.first().map_or(0, |p| p.votes);
    let top_parties = ranked
        .iter()
        .take(3)
        .enumerate()
        .map(|(rank, p)| {
            let percent = if stats.total_votes > 0 {
                p.votes as f64 / stats.total_votes as f64 * 100.0
            } else {
                0.0
            };
            TopPartyRow {
                id: p.id,
                name: p.name,
                color: p.color,
                votes: p.votes,
                percent: format!("{percent:.1}"),
                bar_width: format!("{percent:.1}"),
                behind_leader: (rank > 0 && leader_votes > 0)
                    .then(|| format!("{} votes behind leader", leader_votes - p.votes)),
            }
        })
        .collect();

    let template = TrendsPage {
        chart_title: if leading_mode {
            "Leading Party Votes by Center"
        } else {
            "Voting Percentage by Center"
        },
        toggle_mode: if leading_mode { "percentage" } else { "leading" },
        total_votes: stats.total_votes,
        leading_id: stats.leading_id,
        leading_votes: stats.leading_votes,
        participating: stats.participating,
        axis_labels,
        bars,
        has_votes: stats.total_votes > 0,
        pie,
        top_parties,
    };

    match template.render() {
        Ok(html) => Ok(Html(html).into_response()),
        Err(e) => {
            tracing::error!("Failed to render TrendsPage: {}", e);
            Err(AppError::InternalServerError)
        }
    }
}

/// GET /admin/trends/ws — dashboards hold this open and re-fetch when a
/// submissions-updated event arrives
pub async fn trends_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Extension(user_id_ext): Extension<UserId>,
) -> impl IntoResponse {
    let viewer_id = user_id_ext.0;
    tracing::info!("Trends WebSocket upgrade requested by {}", viewer_id);
    ws.on_upgrade(move |socket| handle_socket(socket, state, viewer_id))
}

/// Runs one dashboard connection: register it with the hub, forward
/// broadcasts, drop it on disconnect. No inbound actions — the socket
/// exists purely to push change notifications.
async fn handle_socket(socket: WebSocket, state: AppState, viewer_id: String) {
    let conn_id = Uuid::new_v4();
    tracing::info!("🔌 Trends WS connected: {} (viewer: {})", conn_id, viewer_id);

    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Hub tasks write into the channel; a single task drains it to the client
    let (tx, mut rx) = mpsc::channel::<Message>(32);
    state.trends_hub.connections.lock().await.insert(conn_id, tx);

    // Task 1: forward hub messages to the client
    let state_clone_send = state.clone();
    let conn_id_send = conn_id;
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_sender.send(msg).await.is_err() {
                tracing::warn!("Failed to push to trends WS {}, closing", conn_id_send);
                break;
            }
        }
        state_clone_send
            .trends_hub
            .connections
            .lock()
            .await
            .remove(&conn_id_send);
    });

    // Task 2: drain the client side so we notice the close frame
    let conn_id_recv = conn_id;
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = ws_receiver.next().await {
            match msg {
                Message::Close(_) => {
                    tracing::info!("Trends WS {} sent close frame", conn_id_recv);
                    break;
                }
                _ => {
                    tracing::trace!("Ignoring inbound trends WS message from {}", conn_id_recv);
                }
            }
        }
    });

    // Whichever task finishes first tears the other down
    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    state.trends_hub.connections.lock().await.remove(&conn_id);
    tracing::info!("🔌 Trends WS {} closed.", conn_id);
}
