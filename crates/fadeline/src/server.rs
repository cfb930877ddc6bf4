//! Server builder and accept loop.
//!
//! Ties the layers together: socket accept → WebSocket handshake →
//! per-connection handler → the one room actor.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use fadeline_protocol::ConnectionId;
use fadeline_room::{spawn_room, RoomConfig, RoomHandle, RoomLogs};
use tokio::net::TcpListener;

use crate::handler::handle_connection;
use crate::sink::FileSink;
use crate::ServerError;

/// Counter for generating unique connection IDs. Never reused for the
/// process lifetime.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Builder for configuring and starting a Fadeline server.
///
/// # Example
///
/// ```rust,ignore
/// let server = ServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .log_dir("./logs")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct ServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
    log_dir: Option<PathBuf>,
}

impl ServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            room_config: RoomConfig::default(),
            log_dir: None,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the room configuration.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Enables file logging of chat and game results under `dir`.
    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Spawns the room actor and binds the listener.
    pub async fn build(self) -> Result<Server, ServerError> {
        let logs = match &self.log_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                RoomLogs {
                    chat: Arc::new(FileSink::open(&dir.join("chat.log"))?),
                    history: Arc::new(FileSink::open(&dir.join("history.log"))?),
                }
            }
            None => RoomLogs::disabled(),
        };
        let room = spawn_room(self.room_config, logs);
        let listener = TcpListener::bind(&self.bind_addr).await?;
        Ok(Server { listener, room })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Fadeline server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct Server {
    listener: TcpListener,
    room: RoomHandle,
}

impl Server {
    /// Creates a new builder.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Handle to the room actor, for embedding and tests.
    pub fn room(&self) -> &RoomHandle {
        &self.room
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("fadeline server running");

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let id = ConnectionId(
                        NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
                    );
                    let room = self.room.clone();
                    tokio::spawn(async move {
                        let ws = match tokio_tungstenite::accept_async(stream)
                            .await
                        {
                            Ok(ws) => ws,
                            Err(e) => {
                                tracing::debug!(
                                    %addr,
                                    error = %e,
                                    "websocket handshake failed"
                                );
                                return;
                            }
                        };
                        tracing::debug!(conn = %id, %addr, "connection accepted");
                        if let Err(e) = handle_connection(ws, id, room).await {
                            tracing::debug!(
                                conn = %id,
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
