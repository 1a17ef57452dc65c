//! The reconnecting WebSocket client.
//!
//! One background task owns the socket. It reconnects with backoff when the
//! connection drops, stops for good after the policy's last failed attempt
//! and never reconnects after [`RealtimeClient::disconnect`].

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::header::{HeaderValue, AUTHORIZATION};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::adapters::websocket::{ClientMessage, ServerMessage};
use crate::domain::foundation::{ConnectionId, TableId};
use crate::domain::realtime::Room;

use super::backoff::ReconnectPolicy;
use super::buffer::{NotificationBuffers, ReceivedNotification, DEFAULT_BUFFER_CAPACITY};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const FANOUT_CAPACITY: usize = 256;
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL, e.g. `ws://localhost:3001`.
    pub server_url: String,
    /// Sent as a bearer token on every (re)connect; `None` connects as a
    /// guest.
    pub token: Option<String>,
    pub policy: ReconnectPolicy,
    /// Bound on TCP connect plus WebSocket handshake. Running out counts as
    /// a failed attempt.
    pub connect_timeout: Duration,
    pub buffer_capacity: usize,
}

impl ClientConfig {
    pub fn new(server_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            server_url: server_url.into(),
            token,
            policy: ReconnectPolicy::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/ws", self.server_url.trim_end_matches('/'))
    }

    /// Upgrade request for one attempt. The token travels in the
    /// `Authorization` header so it needs no URL encoding.
    fn request(&self) -> Result<Request, WsError> {
        let mut request = self.endpoint().into_client_request()?;
        if let Some(token) = &self.token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| WsError::HttpFormat(e.into()))?;
            request.headers_mut().insert(AUTHORIZATION, value);
        }
        Ok(request)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    /// The server accepted the connection and placed it in `rooms`.
    Connected {
        connection_id: ConnectionId,
        rooms: Vec<Room>,
    },
    /// Waiting before reconnection attempt `attempt`.
    Reconnecting { attempt: u32 },
    Disconnected,
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected { .. })
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Not connected")]
    NotConnected,

    #[error("Client has stopped")]
    Stopped,
}

enum Command {
    Send(ClientMessage),
    Disconnect,
}

enum Attempt {
    Open(Socket),
    Failed,
    /// `disconnect()` arrived while connecting.
    Stopped,
}

enum SessionEnd {
    /// Closed by the server or the network.
    Dropped,
    /// Closed by `disconnect()` or by dropping the client.
    Closed,
}

/// Handle to the background connection task.
pub struct RealtimeClient {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<ConnectionStatus>,
    notifications: broadcast::Sender<ReceivedNotification>,
    buffers: Arc<Mutex<NotificationBuffers>>,
    task: JoinHandle<()>,
}

impl RealtimeClient {
    /// Starts connecting in the background; watch [`Self::status`] for progress.
    pub fn start(config: ClientConfig) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(ConnectionStatus::Connecting);
        let (notifications, _) = broadcast::channel(FANOUT_CAPACITY);
        let buffers = Arc::new(Mutex::new(NotificationBuffers::new(config.buffer_capacity)));

        let worker = Worker {
            config,
            commands: command_rx,
            status: status_tx,
            notifications: notifications.clone(),
            buffers: buffers.clone(),
        };
        let task = tokio::spawn(worker.run());

        Self {
            commands,
            status,
            notifications,
            buffers,
            task,
        }
    }

    pub fn status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    pub fn current_status(&self) -> ConnectionStatus {
        self.status.borrow().clone()
    }

    /// Live notifications from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ReceivedNotification> {
        self.notifications.subscribe()
    }

    /// Snapshot of the buffered history.
    pub fn buffers(&self) -> NotificationBuffers {
        self.buffers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Table rooms are not restored after a reconnect; join again.
    pub fn join_table(&self, table_id: TableId) -> Result<(), ClientError> {
        self.send(ClientMessage::JoinTable { table_id })
    }

    pub fn leave_table(&self, table_id: TableId) -> Result<(), ClientError> {
        self.send(ClientMessage::LeaveTable { table_id })
    }

    pub fn ping(&self) -> Result<(), ClientError> {
        self.send(ClientMessage::Ping)
    }

    pub fn send(&self, message: ClientMessage) -> Result<(), ClientError> {
        match *self.status.borrow() {
            ConnectionStatus::Connected { .. } => {}
            ConnectionStatus::Disconnected => return Err(ClientError::Stopped),
            _ => return Err(ClientError::NotConnected),
        }
        self.commands
            .send(Command::Send(message))
            .map_err(|_| ClientError::Stopped)
    }

    /// Closes the connection; the client does not reconnect afterwards.
    pub async fn disconnect(self) {
        // The worker may already be gone.
        let _ = self.commands.send(Command::Disconnect);
        if let Err(e) = self.task.await {
            tracing::debug!(error = %e, "Realtime client task ended abnormally");
        }
    }
}

struct Worker {
    config: ClientConfig,
    commands: mpsc::UnboundedReceiver<Command>,
    status: watch::Sender<ConnectionStatus>,
    notifications: broadcast::Sender<ReceivedNotification>,
    buffers: Arc<Mutex<NotificationBuffers>>,
}

impl Worker {
    async fn run(mut self) {
        // Reconnection attempts since the server last confirmed a connection.
        let mut retries = 0u32;

        loop {
            match self.connect(retries).await {
                Attempt::Open(socket) => {
                    tracing::info!(server = %self.config.server_url, "Realtime connection open");
                    match self.session(socket, &mut retries).await {
                        SessionEnd::Closed => break,
                        SessionEnd::Dropped => {
                            tracing::warn!(
                                server = %self.config.server_url,
                                "Realtime connection lost"
                            );
                        }
                    }
                }
                Attempt::Stopped => break,
                Attempt::Failed => {}
            }

            if self.config.policy.exhausted(retries) {
                tracing::info!(attempts = retries, "Giving up on realtime connection");
                break;
            }
            let delay = self.config.policy.delay_after(retries);
            retries += 1;
            self.status
                .send_replace(ConnectionStatus::Reconnecting { attempt: retries });
            tracing::debug!(attempt = retries, delay_ms = delay.as_millis() as u64, "Reconnecting");

            // Disconnect requests are honored while waiting; sends are dropped.
            let wait = tokio::time::sleep(delay);
            tokio::pin!(wait);
            loop {
                tokio::select! {
                    _ = &mut wait => break,
                    command = self.commands.recv() => match command {
                        Some(Command::Send(_)) => continue,
                        Some(Command::Disconnect) | None => {
                            self.status.send_replace(ConnectionStatus::Disconnected);
                            return;
                        }
                    },
                }
            }
        }
        self.status.send_replace(ConnectionStatus::Disconnected);
    }

    /// One bounded connect attempt that still listens for `disconnect()`.
    async fn connect(&mut self, attempt: u32) -> Attempt {
        let request = match self.config.request() {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(
                    server = %self.config.server_url,
                    error = %e,
                    "Invalid realtime request"
                );
                return Attempt::Failed;
            }
        };
        let connecting =
            tokio::time::timeout(self.config.connect_timeout, connect_async(request));
        tokio::pin!(connecting);

        loop {
            tokio::select! {
                result = &mut connecting => {
                    return match result {
                        Ok(Ok((socket, _response))) => Attempt::Open(socket),
                        Ok(Err(e)) => {
                            tracing::warn!(
                                server = %self.config.server_url,
                                attempt,
                                error = %e,
                                "Realtime connection attempt failed"
                            );
                            Attempt::Failed
                        }
                        Err(_) => {
                            tracing::warn!(
                                server = %self.config.server_url,
                                attempt,
                                timeout_ms = self.config.connect_timeout.as_millis() as u64,
                                "Realtime connection attempt timed out"
                            );
                            Attempt::Failed
                        }
                    };
                }
                command = self.commands.recv() => match command {
                    Some(Command::Send(_)) => continue,
                    Some(Command::Disconnect) | None => return Attempt::Stopped,
                },
            }
        }
    }

    async fn session(&mut self, socket: Socket, retries: &mut u32) -> SessionEnd {
        let (mut sink, mut stream) = socket.split();

        loop {
            tokio::select! {
                frame = stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(accepted) = self.on_frame(&text) {
                            *retries = 0;
                            self.status.send_replace(accepted);
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => return SessionEnd::Dropped,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!(error = %e, "Realtime socket error");
                        return SessionEnd::Dropped;
                    }
                },
                command = self.commands.recv() => match command {
                    Some(Command::Send(message)) => {
                        let text = match serde_json::to_string(&message) {
                            Ok(text) => text,
                            Err(e) => {
                                tracing::error!(error = %e, "Cannot encode client frame");
                                continue;
                            }
                        };
                        if sink.send(Message::Text(text)).await.is_err() {
                            return SessionEnd::Dropped;
                        }
                    }
                    Some(Command::Disconnect) | None => {
                        let _ = sink.send(Message::Close(None)).await;
                        return SessionEnd::Closed;
                    }
                },
            }
        }
    }

    /// Handles one server frame. Returns the new status when the server
    /// confirmed the connection.
    fn on_frame(&self, text: &str) -> Option<ConnectionStatus> {
        let message = match serde_json::from_str::<ServerMessage>(text) {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unreadable server frame");
                return None;
            }
        };

        match message {
            ServerMessage::Connected {
                connection_id,
                rooms,
                ..
            } => Some(ConnectionStatus::Connected {
                connection_id,
                rooms,
            }),
            ServerMessage::Notification {
                event,
                room,
                notification,
            } => {
                let received = ReceivedNotification {
                    event,
                    room,
                    notification,
                };
                self.buffers
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(received.clone());
                // No subscribers is fine.
                let _ = self.notifications.send(received);
                None
            }
            ServerMessage::Joined { room } => self.with_rooms(|rooms| {
                if !rooms.contains(&room) {
                    rooms.push(room);
                }
            }),
            ServerMessage::Left { room } => self.with_rooms(|rooms| rooms.retain(|r| *r != room)),
            ServerMessage::Error { code, message } => {
                tracing::warn!(code = %code, message = %message, "Server rejected a client frame");
                None
            }
            ServerMessage::Pong { .. } => None,
        }
    }

    fn with_rooms(&self, edit: impl FnOnce(&mut Vec<Room>)) -> Option<ConnectionStatus> {
        match self.status.borrow().clone() {
            ConnectionStatus::Connected {
                connection_id,
                mut rooms,
            } => {
                edit(&mut rooms);
                Some(ConnectionStatus::Connected {
                    connection_id,
                    rooms,
                })
            }
            _ => None,
        }
    }
}
