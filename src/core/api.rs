//! HTTP + WebSocket API for blink decoding
//!
//! Endpoints:
//! - POST /faces/{id} - Face appeared, start a decoder
//! - POST /faces/{id}/frames - Feed one frame
//! - GET /faces/{id} - Current phase and message
//! - DELETE /faces/{id} - Face gone, discard the decoder
//! - WS /ws/{id} - Live message snapshots
//! - GET /health - Health check

use axum::{
    extract::{Path, State, WebSocketUpgrade, ws::{Message, WebSocket}},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, broadcast::error::RecvError, RwLock};
use tracing::{debug, info};

use crate::core::decoder::now_ms;
use crate::core::sink::{MessageSink, SharedMessage};
use crate::core::tracker::{FaceId, FaceTracker};
use crate::types::{DecoderPhase, FrameSample, StepOutput};

/// Sink behind every API-managed decoder: keeps the last message and
/// broadcasts each snapshot to WebSocket subscribers
#[derive(Debug, Clone)]
pub struct ApiSink {
    face_id: FaceId,
    last: SharedMessage,
    update_tx: broadcast::Sender<MessageUpdate>,
}

impl ApiSink {
    fn new(face_id: FaceId) -> Self {
        let (update_tx, _) = broadcast::channel(100);
        Self {
            face_id,
            last: SharedMessage::new(),
            update_tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MessageUpdate> {
        self.update_tx.subscribe()
    }

    /// Last message the decoder notified
    pub fn last_message(&self) -> String {
        self.last.get()
    }
}

impl MessageSink for ApiSink {
    fn notify(&mut self, message: &str) {
        self.last.notify(message);
        // No subscribers is fine
        let _ = self.update_tx.send(MessageUpdate {
            face_id: self.face_id,
            message: message.to_string(),
        });
    }
}

/// Live update message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageUpdate {
    pub face_id: FaceId,
    pub message: String,
}

/// App state
pub struct AppState {
    pub faces: RwLock<FaceTracker<ApiSink>>,
}

/// Face appeared request
#[derive(Debug, Default, Deserialize)]
pub struct AppearRequest {
    /// Creation time; wall clock if absent
    pub timestamp_ms: Option<u64>,
}

/// Face appeared response
#[derive(Debug, Serialize)]
pub struct AppearResponse {
    pub face_id: FaceId,
    pub websocket_url: String,
}

/// One frame for a face
#[derive(Debug, Deserialize)]
pub struct FrameRequest {
    #[serde(flatten)]
    pub frame: FrameSample,
    /// Frame time; wall clock if absent
    pub timestamp_ms: Option<u64>,
}

/// Face status response
#[derive(Debug, Serialize)]
pub struct FaceStatusResponse {
    pub face_id: FaceId,
    pub phase: DecoderPhase,
    pub message: String,
    pub pending_symbols: String,
    pub frame_count: u64,
}

/// Face gone response
#[derive(Debug, Serialize)]
pub struct DisappearResponse {
    pub face_id: FaceId,
    /// Last message delivered to the sink
    pub message: String,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub faces_active: usize,
}

/// Create the API router
pub fn create_router() -> Router {
    let state = Arc::new(AppState {
        faces: RwLock::new(FaceTracker::new()),
    });

    Router::new()
        .route("/health", get(health))
        .route("/faces/:id", post(appear).get(get_face).delete(disappear))
        .route("/faces/:id/frames", post(add_frame))
        .route("/ws/:id", get(websocket_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let faces = state.faces.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        faces_active: faces.len(),
    })
}

/// Face appeared
async fn appear(
    State(state): State<Arc<AppState>>,
    Path(id): Path<FaceId>,
    body: Option<Json<AppearRequest>>,
) -> Json<AppearResponse> {
    // Body is optional; an empty POST appears the face at wall-clock time
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let created_ms = req.timestamp_ms.unwrap_or_else(now_ms);
    let mut faces = state.faces.write().await;
    faces.on_appear(id, ApiSink::new(id), created_ms);

    Json(AppearResponse {
        face_id: id,
        websocket_url: format!("/ws/{}", id),
    })
}

/// Feed one frame
async fn add_frame(
    State(state): State<Arc<AppState>>,
    Path(id): Path<FaceId>,
    Json(req): Json<FrameRequest>,
) -> Result<Json<StepOutput>, StatusCode> {
    let t_ms = req.timestamp_ms.unwrap_or_else(now_ms);
    let mut faces = state.faces.write().await;
    let output = faces.on_update(id, req.frame, t_ms).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(output))
}

/// Get face status
async fn get_face(
    State(state): State<Arc<AppState>>,
    Path(id): Path<FaceId>,
) -> Result<Json<FaceStatusResponse>, StatusCode> {
    let faces = state.faces.read().await;
    let decoder = faces.decoder(id).ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(FaceStatusResponse {
        face_id: id,
        phase: decoder.phase(),
        message: decoder.current_message(),
        pending_symbols: decoder.state().pending_symbols().to_string(),
        frame_count: decoder.frame_count(),
    }))
}

/// Face gone
async fn disappear(
    State(state): State<Arc<AppState>>,
    Path(id): Path<FaceId>,
) -> Result<Json<DisappearResponse>, StatusCode> {
    let mut faces = state.faces.write().await;
    let decoder = faces.on_disappear(id).ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(DisappearResponse {
        face_id: id,
        message: decoder.sink().last_message(),
    }))
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<FaceId>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, StatusCode> {
    let faces = state.faces.read().await;
    let decoder = faces.decoder(id).ok_or(StatusCode::NOT_FOUND)?;
    let rx = decoder.sink().subscribe();
    drop(faces);

    Ok(ws.on_upgrade(move |socket| async move {
        handle_websocket(socket, rx).await;
    }))
}

/// Handle WebSocket connection
async fn handle_websocket(mut socket: WebSocket, mut rx: broadcast::Receiver<MessageUpdate>) {
    while let Some(update) = next_update(&mut rx).await {
        let json = serde_json::to_string(&update).unwrap_or_default();
        if socket.send(Message::Text(json)).await.is_err() {
            break;
        }
    }
    debug!("websocket closed");
}

/// Next snapshot for a subscriber; a lagging receiver skips ahead and
/// stays connected
async fn next_update(rx: &mut broadcast::Receiver<MessageUpdate>) -> Option<MessageUpdate> {
    loop {
        match rx.recv().await {
            Ok(update) => return Some(update),
            Err(RecvError::Lagged(skipped)) => {
                debug!(skipped, "websocket subscriber lagged");
            }
            Err(RecvError::Closed) => return None,
        }
    }
}

/// Run the API server
pub async fn run_server(addr: &str) -> std::io::Result<()> {
    let router = create_router();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("blinkcode API running on {}", addr);
    info!("  POST   /faces/:id        - Face appeared");
    info!("  POST   /faces/:id/frames - Add frame");
    info!("  GET    /faces/:id        - Get status");
    info!("  DELETE /faces/:id        - Face gone");
    info!("  WS     /ws/:id           - Live updates");
    info!("  GET    /health           - Health check");
    axum::serve(listener, router).await
}
