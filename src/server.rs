//! WebSocket transport.
//!
//! `/` upgrades to a player connection and the configured spectator path to
//! a read-only one. Each socket gets a reader loop that feeds the engine and
//! a writer task that drains the connection's outbox.

use crate::config::ServerConfig;
use crate::engine::{Engine, EngineEvent, EngineHandle};
use crate::protocol::ClientMessage;
use crate::session::{ConnectionId, ConnectionRegistry, Role};
use anyhow::{Context, Result};
use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::Request;
use axum::response::Response;
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower::ServiceBuilder;
use tracing::{debug, info, instrument, warn};

/// Shared handles given to every route.
#[derive(Debug, Clone)]
pub struct AppState {
    engine: EngineHandle,
    connections: ConnectionRegistry,
}

impl AppState {
    /// Bundles the engine mailbox with the connection table it broadcasts to.
    pub fn new(engine: EngineHandle, connections: ConnectionRegistry) -> Self {
        Self {
            engine,
            connections,
        }
    }
}

/// Builds the router with the player and spectator routes.
pub fn router(state: AppState, spectator_path: &str) -> Router {
    Router::new()
        .route("/", get(player_upgrade))
        .route(spectator_path, get(spectator_upgrade))
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            info!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(state)
}

/// Binds the configured address and serves until the process exits.
#[instrument(skip(config), fields(address = %config.bind_address()))]
pub async fn serve(config: ServerConfig) -> Result<()> {
    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address()))?;
    serve_on(listener, config).await
}

/// Serves on an already bound listener.
pub async fn serve_on(listener: TcpListener, config: ServerConfig) -> Result<()> {
    config.validate()?;
    let connections = ConnectionRegistry::new();
    let (engine, _task) = Engine::spawn(connections.clone(), config.turn_timeout());
    let app = router(AppState::new(engine, connections), config.spectator_path());

    let address = listener.local_addr().context("Listener has no local address")?;
    info!(%address, spectator_path = %config.spectator_path(), "Skirmish server ready");
    axum::serve(listener, app).await.context("Server stopped")?;
    Ok(())
}

async fn player_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, Role::Player))
}

async fn spectator_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, Role::Spectator))
}

#[instrument(skip(socket, state))]
async fn handle_socket(socket: WebSocket, state: AppState, role: Role) {
    let (mut sink, mut stream) = socket.split();
    let (outbox, mut pending) = mpsc::unbounded_channel::<String>();
    let id = state.connections.register(role, outbox).await;

    let writer = tokio::spawn(async move {
        while let Some(text) = pending.recv().await {
            if let Err(e) = sink.send(Message::Text(text.into())).await {
                debug!(connection = %id, error = %e, "Socket write failed");
                break;
            }
        }
    });

    if state.engine.send(EngineEvent::Joined { connection: id }).is_ok() {
        while let Some(frame) = stream.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    if !forward(&state.engine, id, text.as_str()) {
                        break;
                    }
                }
                Ok(Message::Binary(_)) => {
                    warn!(connection = %id, "Binary frame dropped");
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    debug!(connection = %id, error = %e, "Socket read failed");
                    break;
                }
            }
        }
    } else {
        warn!(connection = %id, "Engine unavailable, closing connection");
    }

    state.connections.deregister(id).await;
    writer.abort();
}

/// Parses one text frame and posts it to the engine. Returns `false` once the
/// engine is gone.
fn forward(engine: &EngineHandle, connection: ConnectionId, text: &str) -> bool {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            warn!(%connection, error = %e, "Malformed message dropped");
            return true;
        }
    };
    debug!(%connection, kind = message.kind(), "Message received");
    engine
        .send(EngineEvent::Inbound {
            connection,
            message,
        })
        .inspect_err(|e| warn!(%connection, error = %e, "Engine rejected message"))
        .is_ok()
}
