pub mod protocol;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::game::{Game, GameView, Input};
use protocol::{build_error_json, build_health_json, build_view_json, parse_input};

/// Longest the actor sleeps when no timer is pending.
const IDLE_WAIT: Duration = Duration::from_secs(3600);

/// What the game actor publishes: notifications and the latest view.
pub struct GameFeed {
    /// Serialized notifications for every connected client.
    pub notifications: broadcast::Sender<String>,
    /// Latest game picture for new connections and the health endpoint.
    pub view: RwLock<GameView>,
}

/// Shared server state accessible from all connection handlers.
pub struct ServerState {
    /// Player actions headed for the game actor.
    pub inputs: mpsc::Sender<Input>,
    pub feed: Arc<GameFeed>,
}

impl ServerState {
    /// Build the shared state and the receiving end the actor drains.
    pub fn new(initial_view: GameView) -> (Self, mpsc::Receiver<Input>) {
        let (input_tx, input_rx) = mpsc::channel(64);
        let (note_tx, _) = broadcast::channel(256);
        let state = ServerState {
            inputs: input_tx,
            feed: Arc::new(GameFeed {
                notifications: note_tx,
                view: RwLock::new(initial_view),
            }),
        };
        (state, input_rx)
    }
}

/// Own the game for the life of the server.
///
/// Wakes on every input and on every scheduler deadline, feeds the real
/// elapsed time to the game clock, then broadcasts whatever the game emitted.
/// Returns the game once every input sender has been dropped.
pub async fn run_game_actor(
    mut game: Game,
    mut inputs: mpsc::Receiver<Input>,
    feed: Arc<GameFeed>,
) -> Game {
    let mut last = Instant::now();
    publish(&mut game, &feed).await;

    loop {
        let wait = game.until_next_timer().unwrap_or(IDLE_WAIT);
        tokio::select! {
            input = inputs.recv() => {
                let now = Instant::now();
                game.advance(now - last);
                last = now;
                match input {
                    Some(input) => {
                        debug!(?input, "Input received");
                        game.handle(input);
                    }
                    None => break,
                }
            }
            _ = tokio::time::sleep(wait) => {
                let now = Instant::now();
                game.advance(now - last);
                last = now;
            }
        }
        publish(&mut game, &feed).await;
    }

    info!("Input channel closed, game actor stopping");
    game
}

async fn publish(game: &mut Game, feed: &GameFeed) {
    let notes = game.drain_notifications();
    if notes.is_empty() {
        return;
    }
    *feed.view.write().await = game.view();
    for note in notes {
        match serde_json::to_string(&note) {
            // No receivers is fine
            Ok(json) => {
                let _ = feed.notifications.send(json);
            }
            Err(e) => error!(error = %e, "Failed to encode notification"),
        }
    }
}

/// Start the WebSocket + HTTP server on the given address.
pub async fn start_server(
    state: Arc<ServerState>,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Server listening at ws://{}", addr);
    serve(listener, state).await
}

/// Accept connections on an already bound listener.
pub async fn serve(
    listener: TcpListener,
    state: Arc<ServerState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer, state).await {
                error!(%peer, "Connection error: {}", e);
            }
        });
    }
}

/// Route an incoming TCP connection to WebSocket or HTTP.
async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    state: Arc<ServerState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut buf = [0u8; 512];
    let n = stream.peek(&mut buf).await?;
    let request_line = String::from_utf8_lossy(&buf[..n]).to_lowercase();

    if request_line.contains("upgrade: websocket") {
        handle_websocket(stream, peer, state).await
    } else if request_line.starts_with("get /health") {
        handle_health_request(stream, state).await
    } else {
        respond(stream, "404 Not Found", "text/plain", "not found").await
    }
}

/// Send the current view, then relay inputs in and notifications out.
async fn handle_websocket(
    stream: TcpStream,
    peer: SocketAddr,
    state: Arc<ServerState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    info!(%peer, "WebSocket connected");

    let (mut write, mut read) = ws_stream.split();

    // Subscribe before reading the view so nothing falls between the two.
    let mut rx = state.feed.notifications.subscribe();
    let view_json = build_view_json(&*state.feed.view.read().await);
    write.send(Message::Text(view_json.into())).await?;

    loop {
        tokio::select! {
            note = rx.recv() => {
                match note {
                    Ok(json) => {
                        if write.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(%peer, lagged = n, "Client lagged behind on notifications");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => match parse_input(text.as_str()) {
                        Ok(input) => {
                            if state.inputs.send(input).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            debug!(%peer, error = %e, "Rejected client frame");
                            write.send(Message::Text(build_error_json(e).into())).await?;
                        }
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    info!(%peer, "WebSocket disconnected");
    Ok(())
}

async fn handle_health_request(
    stream: TcpStream,
    state: Arc<ServerState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let clients = state.feed.notifications.receiver_count();
    let body = build_health_json(&*state.feed.view.read().await, clients);
    respond(stream, "200 OK", "application/json", &body).await
}

async fn respond(
    mut stream: TcpStream,
    status: &str,
    content_type: &str,
    body: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use tokio::io::AsyncReadExt;
    use tokio::io::AsyncWriteExt;

    // Read and discard the request
    let mut buf = vec![0u8; 4096];
    let _ = stream.read(&mut buf).await?;

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        content_type,
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}
