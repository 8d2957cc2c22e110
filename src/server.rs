//! HTTP surface: the chat webhook and a status endpoint

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::chat::ChatHandler;
use crate::jukebox::Jukebox;

#[derive(Clone)]
struct AppState {
    jukebox: Jukebox,
    chat: Arc<ChatHandler>,
}

/// Start the HTTP server.
pub async fn start(bind_addr: &str, jukebox: Jukebox) -> anyhow::Result<()> {
    let state = AppState {
        chat: Arc::new(ChatHandler::new(jukebox.clone())),
        jukebox,
    };

    let app = Router::new()
        .route("/", post(chat_webhook))
        .route("/status", get(status))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("HTTP server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Deserialize)]
struct ChatRequest {
    text: Option<String>,
}

#[derive(Serialize)]
struct ChatResponse {
    response_type: &'static str,
    text: String,
}

/// Chat webhook: `{"text": "play 1t1 next"}` in, a reply for the
/// channel out.
async fn chat_webhook(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, StatusCode> {
    let Some(text) = request.text.filter(|t| !t.trim().is_empty()) else {
        return Err(StatusCode::BAD_REQUEST);
    };

    tracing::debug!(%text, "chat request");
    let reply = state.chat.handle(&text).await;
    tracing::debug!(%reply, "chat response");

    Ok(Json(ChatResponse {
        response_type: "in_channel",
        text: reply,
    }))
}

/// Player status as JSON, for anything that is not a chat client.
async fn status(State(state): State<AppState>) -> Json<serde_json::Value> {
    let status = state.jukebox.status().await;
    Json(json!({
        "trackName": status.now_playing_name,
        "artistName": status.now_playing_artist,
        "state": status.state.map(|s| s.as_str()),
        "vol": status.volume,
        "position": status.position,
        "length": status.length,
        "queued": status.queue.len(),
    }))
}
