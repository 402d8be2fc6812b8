//! HTTP surface: discovery endpoint and the viewer WebSocket.
//!
//! `GET /scan` runs the ARP sweep and returns `[{ip, mac}, ...]`.
//! `GET /ws` upgrades to a WebSocket that pushes one JSON event per
//! captured packet and accepts control messages in return. Both endpoints
//! are unauthenticated; access control is a deployment concern.

use crate::broadcast::Broadcaster;
use crate::domain::PipelineConfig;
use crate::scan;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};
use pnet::datalink::NetworkInterface;
use serde::Deserialize;
use std::sync::Arc;

/// Shared handles injected into every request handler.
#[derive(Clone)]
pub struct AppState {
    pub broadcaster: Arc<Broadcaster>,
    pub config: Arc<PipelineConfig>,
    pub interface: Arc<NetworkInterface>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/scan", get(scan_handler))
        .route("/ws", get(ws_handler))
        .with_state(state)
}

/// Run the blocking ARP sweep off the async runtime and return the hosts
/// that answered. An empty list is a normal no-hosts-found result.
async fn scan_handler(State(state): State<AppState>) -> Response {
    let interface = Arc::clone(&state.interface);
    let result =
        tokio::task::spawn_blocking(move || scan::discover_hosts(&interface, scan::SCAN_TIMEOUT))
            .await;
    match result {
        Ok(Ok(hosts)) => Json(hosts).into_response(),
        Ok(Err(e)) => {
            warn!("discovery scan failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
        Err(e) => {
            warn!("discovery scan task failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Serve one viewer connection until either side goes away.
///
/// The outbound half forwards events from this connection's registry
/// channel; the inbound half reads control messages. They run
/// concurrently over the split socket.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (id, mut events) = state.broadcaster.register();
    debug!("viewer connected, {} total", state.broadcaster.connection_count());
    let (mut sink, mut stream) = socket.split();

    let outbound = async {
        while let Some(event) = events.recv().await {
            match serde_json::to_string(&*event) {
                Ok(text) => {
                    if sink.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(e) => warn!("failed to encode event {}: {e}", event.id),
            }
        }
    };
    let inbound = async {
        while let Some(Ok(message)) = stream.next().await {
            if let Message::Text(text) = message {
                apply_control(&state.config, &text);
            }
        }
    };

    tokio::select! {
        () = outbound => {}
        () = inbound => {}
    }
    state.broadcaster.unregister(id);
    debug!("viewer disconnected, {} total", state.broadcaster.connection_count());
}

/// Inbound control message. Currently one knob: the inter-packet delay.
#[derive(Debug, Deserialize)]
struct ControlMessage {
    delay: Option<f64>,
}

/// Apply one inbound control frame to the shared pipeline configuration.
///
/// Anything that is not `{"delay": <non-negative number>}` (non-JSON,
/// missing field, wrong type, negative, NaN) is ignored and never closes
/// the connection.
fn apply_control(config: &PipelineConfig, text: &str) {
    let Ok(message) = serde_json::from_str::<ControlMessage>(text) else {
        return;
    };
    let Some(delay) = message.delay else {
        return;
    };
    if config.set_delay(delay) {
        info!("updated packet delay to {delay}s");
    }
}
