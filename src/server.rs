//! Tokio transport: accepts connections, reads the first request, and either
//! serves it from the asset table or upgrades to a WebSocket session.

use std::future::Future;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::signal;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::protocol::Role;
use tokio_tungstenite::WebSocketStream;
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::registry::AssetRegistry;
use crate::request::{find, HEADER_TERMINATOR};
use crate::response::Response;
use crate::upgrade::{dispatch, ConnectionState, Dispatch, Handshake, Rfc6455Handshake, SessionHooks};

/// Per-connection states of live clients.
#[derive(Debug, Default)]
pub struct ConnectionTracker {
    states: Mutex<FxHashMap<u64, ConnectionState>>,
}

impl ConnectionTracker {
    pub fn state(&self, client_id: u64) -> Option<ConnectionState> {
        self.states.lock().get(&client_id).copied()
    }

    pub fn open_count(&self) -> usize {
        self.states
            .lock()
            .values()
            .filter(|state| **state == ConnectionState::Open)
            .count()
    }
}

impl SessionHooks for ConnectionTracker {
    fn set_state(&self, client_id: u64, state: ConnectionState) {
        let mut states = self.states.lock();
        if state == ConnectionState::Closed {
            states.remove(&client_id);
        } else {
            states.insert(client_id, state);
        }
    }

    fn on_open(&self, client_id: u64) {
        info!("WebSocket client {} connected", client_id);
    }
}

/// Everything a connection task needs, shared read-only.
pub struct ServerState {
    pub config: ServerConfig,
    pub registry: AssetRegistry,
    pub handshake: Box<dyn Handshake>,
    pub hooks: Arc<dyn SessionHooks>,
    next_client: AtomicU64,
}

impl ServerState {
    /// `registry` should already be frozen; its table is never touched again.
    pub fn new(config: ServerConfig, registry: AssetRegistry) -> Self {
        Self::with_hooks(config, registry, Arc::new(ConnectionTracker::default()))
    }

    pub fn with_hooks(config: ServerConfig, registry: AssetRegistry, hooks: Arc<dyn SessionHooks>) -> Self {
        Self {
            config,
            registry,
            handshake: Box::new(Rfc6455Handshake),
            hooks,
            next_client: AtomicU64::new(1),
        }
    }
}

/// Accept connections until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: Arc<ServerState>, shutdown: F)
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, peer)) => {
                        let _ = stream.set_nodelay(true);
                        let client_id = state.next_client.fetch_add(1, Ordering::Relaxed);
                        debug!("Accepted client {} from {}", client_id, peer);
                        tokio::spawn(handle_connection(stream, client_id, Arc::clone(&state)));
                    }
                    Err(e) => {
                        warn!("Accept failed: {}", e);
                        continue;
                    }
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received, stopping server...");
                break;
            }
        }
    }
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn handle_connection(mut stream: TcpStream, client_id: u64, state: Arc<ServerState>) {
    let read = timeout(
        state.config.read_timeout,
        read_request(&mut stream, state.config.max_request_size),
    )
    .await;

    let request = match read {
        Ok(Ok(request)) if !request.is_empty() => request,
        Ok(Ok(_)) => return,
        Ok(Err(e)) => {
            debug!("Client {} read failed: {}", client_id, e);
            return;
        }
        Err(_) => {
            debug!("Client {} timed out before sending a request", client_id);
            return;
        }
    };

    let outcome = match dispatch(&state.registry, &request, state.handshake.as_ref()) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Dropping client {}: {}", client_id, e);
            return;
        }
    };

    match outcome {
        Dispatch::Static(response) => {
            if let Err(e) = send_and_close(&mut stream, &response).await {
                debug!("Client {} send failed: {}", client_id, e);
            }
        }
        Dispatch::Rejected(response) => {
            if let Err(e) = send_and_close(&mut stream, &response).await {
                debug!("Client {} send failed: {}", client_id, e);
            }
        }
        Dispatch::Upgrade { response, consumed } => {
            let hooks = Arc::clone(&state.hooks);
            hooks.set_state(client_id, ConnectionState::Connecting);
            if let Err(e) = stream.write_all(&response).await {
                debug!("Client {} handshake send failed: {}", client_id, e);
                hooks.set_state(client_id, ConnectionState::Closed);
                return;
            }
            hooks.set_state(client_id, ConnectionState::Open);
            hooks.on_open(client_id);

            let leftover = request[consumed..].to_vec();
            drop(request);
            if let Err(e) = websocket_session(stream, leftover).await {
                debug!("Client {} WebSocket error: {}", client_id, e);
            }
            hooks.set_state(client_id, ConnectionState::Closed);
        }
    }
}

/// Read until the head terminator, EOF, or `max` bytes.
async fn read_request(stream: &mut TcpStream, max: usize) -> io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(max.min(4096));
    let mut chunk = [0u8; 4096];
    while buf.len() < max {
        let want = chunk.len().min(max - buf.len());
        let n = stream.read(&mut chunk[..want]).await?;
        if n == 0 {
            break;
        }
        // Only the new bytes plus the 3 before them can complete a terminator.
        let scan_from = buf.len().saturating_sub(HEADER_TERMINATOR.len() - 1);
        buf.extend_from_slice(&chunk[..n]);
        if find(&buf[scan_from..], HEADER_TERMINATOR).is_some() {
            break;
        }
    }
    Ok(buf)
}

async fn send_and_close(stream: &mut TcpStream, response: &Response<'_>) -> io::Result<()> {
    stream.write_all(response.head()).await?;
    if !response.body().is_empty() {
        stream.write_all(response.body()).await?;
    }
    stream.flush().await?;
    stream.shutdown().await
}

/// Echo text and binary frames until the client closes.
async fn websocket_session(stream: TcpStream, leftover: Vec<u8>) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    let mut ws = WebSocketStream::from_partially_read(stream, leftover, Role::Server, None).await;
    while let Some(message) = ws.next().await {
        let message = message?;
        if message.is_text() || message.is_binary() {
            ws.send(message).await?;
        }
    }
    Ok(())
}
