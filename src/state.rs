// src/state.rs
use crate::store::KvStore;
use axum::extract::ws::Message;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

// Sender half of one live trends-dashboard connection
type WsTx = mpsc::Sender<Message>;

/// Connection hub for the live-updating trends dashboards. When a
/// polling center submits counts, every open dashboard gets notified so
/// it can re-fetch — the subscriber side of the "submissions changed"
/// contract.
#[derive(Debug, Clone, Default)]
pub struct TrendsHub {
    pub connections: Arc<Mutex<HashMap<Uuid, WsTx>>>,
}

impl TrendsHub {
    /// Sends a message to ALL connected dashboards. Delivery is
    /// best-effort: a closed client just drops the message.
    pub async fn broadcast(&self, message_text: String) {
        let connections = self.connections.lock().await;
        let message = Message::Text(message_text.into());
        for tx in connections.values() {
            let _ = tx.send(message.clone()).await;
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KvStore>,
    pub trends_hub: TrendsHub,
}

// Lets handlers extract the hub directly
impl axum::extract::FromRef<AppState> for TrendsHub {
    fn from_ref(state: &AppState) -> TrendsHub {
        state.trends_hub.clone()
    }
}
