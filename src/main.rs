// src/main.rs

// --- Module declarations ---
mod db;
mod error;
mod models;
mod services;
mod state;
mod store;
mod templates;
mod web;

// --- Imports ---
use crate::state::{AppState, TrendsHub};
use crate::store::FileStore;
use axum::serve;
use std::{env, net::SocketAddr, sync::Arc};
use time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::{ExpiredDeletion, Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Logging (tracing) setup ---
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                env::var("RUST_LOG")
                    .unwrap_or_else(|_| {
                        "amarvote=debug,tower_http=info,sqlx=warn,tower_sessions=info".into()
                    })
                    .into()
            }),
        )
        .with(fmt::layer())
        .init();

    tracing::info!("🚀 Starting AmarVote monitor server...");

    // --- Data store setup ---
    let data_dir = env::var("AMARVOTE_DATA_DIR").unwrap_or_else(|_| "data".to_string());
    let store = match FileStore::new(&data_dir) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            tracing::error!("❌ Failed to initialize data directory '{}': {}", data_dir, e);
            return Err(anyhow::anyhow!("Failed to open data store: {e}"));
        }
    };

    // Seed/repair the account directory up front so the canonical admin
    // exists before the first request
    let users = services::user_service::load_users(store.as_ref()).await?;
    tracing::info!("📋 Account directory ready ({} user(s))", users.len());

    // --- Session setup ---
    let session_pool = match db::create_session_pool().await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("❌ Critical failure initializing the session database: {}", e);
            return Err(anyhow::anyhow!("Failed to connect session DB: {e}"));
        }
    };

    let session_store = SqliteStore::new(session_pool).with_table_name("sessions")
        .map_err(|e| anyhow::anyhow!("Failed to create session store: {e}"))?;
    session_store.migrate().await?;

    // Clone the store for the cleanup task
    let session_store_clone = session_store.clone();
    tokio::spawn(async move {
        if let Err(e) = session_store_clone
            .continuously_delete_expired(tokio::time::Duration::from_secs(60 * 60))
            .await
        {
            tracing::error!("Session cleanup task failed: {:?}", e);
        }
    });
    tracing::info!("🧹 Session cleanup task started.");

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::days(1)));

    tracing::info!("🔑 Session layer configured.");

    // --- Application state ---
    let app_state = AppState {
        store,
        trends_hub: TrendsHub::default(),
    };

    // --- Listener setup ---
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    tracing::info!("📡 Server listening on http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("❌ Failed to bind listener on port 3000: {}", e);
            return Err(e.into());
        }
    };

    // --- Router and middleware layers ---
    tracing::info!("🛠️ Building router and applying middleware...");
    let app = web::routes::create_router(app_state.clone()).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CookieManagerLayer::new())
            .layer(session_layer),
    );
    tracing::info!("✅ Router and middleware configured.");

    // --- Serve ---
    tracing::info!("👂 Server ready to accept connections...");
    if let Err(e) = serve(listener, app.into_make_service()).await {
        tracing::error!("❌ Fatal server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
