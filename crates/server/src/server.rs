//! TCP listener for the Minesweeper server
//!
//! Binds one listening socket, accepts connections on a single task and
//! spawns an independent task per client. Termination only stops the accept
//! loop; sessions that are already running keep going until they end on
//! their own.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{watch, Mutex};
use tracing::{info, info_span, warn, Instrument};

use crate::connection::{handle_connection, SessionContext};
use crate::core::Board;
use crate::session::SessionRegistry;
use crate::types::DEFAULT_PORT;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    /// 0 binds an ephemeral port; see [`Server::port`].
    pub port: u16,
    /// Keep clients connected after they dig a mine.
    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            debug: false,
        }
    }
}

impl ServerConfig {
    /// Create from environment variables, falling back to the defaults.
    ///
    /// - `MINESWEEPER_HOST`: bind address
    /// - `MINESWEEPER_PORT`: port number
    /// - `MINESWEEPER_DEBUG`: "1" or "true" enables debug mode
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();

        let host = env::var("MINESWEEPER_HOST")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);

        let port = env::var("MINESWEEPER_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);

        let debug = env::var("MINESWEEPER_DEBUG")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(defaults.debug);

        Self { host, port, debug }
    }
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("server has been terminated")]
    Terminated,
    #[error("listener failed")]
    Io(#[from] io::Error),
}

/// A bound Minesweeper server.
pub struct Server {
    /// `None` once terminated. The lock is held for the whole accept loop so
    /// only one task ever accepts.
    listener: Mutex<Option<TcpListener>>,
    local_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    context: SessionContext,
    client_id_counter: AtomicU64,
}

impl Server {
    /// Bind the listening socket. The port is known as soon as this returns.
    pub async fn bind(config: &ServerConfig, board: Arc<Board>) -> Result<Self, ServerError> {
        let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
        let local_addr = listener.local_addr()?;
        let (shutdown, _) = watch::channel(false);

        info!(
            addr = %local_addr,
            width = board.width(),
            height = board.height(),
            debug = config.debug,
            "listening"
        );

        Ok(Self {
            listener: Mutex::new(Some(listener)),
            local_addr,
            shutdown,
            context: SessionContext {
                board,
                sessions: SessionRegistry::new(),
                debug: config.debug,
            },
            client_id_counter: AtomicU64::new(0),
        })
    }

    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn board(&self) -> &Arc<Board> {
        &self.context.board
    }

    pub fn is_debug(&self) -> bool {
        self.context.debug
    }

    /// Number of clients currently connected.
    pub fn active_sessions(&self) -> usize {
        self.context.sessions.active()
    }

    pub fn is_terminated(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Accept clients until the server is terminated or the listener fails.
    ///
    /// Concurrent callers queue up behind the one running the loop. Never
    /// returns `Ok`: termination is reported as [`ServerError::Terminated`],
    /// to this caller and every later one. Errors on individual connections
    /// are logged and do not stop the loop.
    pub async fn serve(&self) -> Result<(), ServerError> {
        let mut slot = self.listener.lock().await;
        let mut shutdown = self.shutdown.subscribe();

        loop {
            if *shutdown.borrow_and_update() {
                if slot.take().is_some() {
                    info!(port = self.port(), "listener closed");
                }
                return Err(ServerError::Terminated);
            }
            let Some(listener) = slot.as_ref() else {
                return Err(ServerError::Terminated);
            };

            let accepted = tokio::select! {
                accepted = listener.accept() => Some(accepted),
                _ = shutdown.changed() => None,
            };

            match accepted {
                None => continue,
                Some(Ok((socket, peer))) => self.spawn_client(socket, peer),
                Some(Err(e)) if is_transient(&e) => {
                    warn!(error = %e, "accept failed");
                }
                Some(Err(e)) => {
                    warn!(error = %e, "listener failed");
                    slot.take();
                    return Err(e.into());
                }
            }
        }
    }

    /// Stop accepting new clients.
    ///
    /// Wakes a pending [`serve`](Self::serve), which then closes the
    /// listening socket. Connected clients are not affected. Cannot be undone.
    pub fn terminate(&self) {
        self.shutdown.send_replace(true);
        // Nobody is serving: close the socket right away.
        if let Ok(mut slot) = self.listener.try_lock() {
            if slot.take().is_some() {
                info!(port = self.port(), "listener closed");
            }
        }
    }

    fn spawn_client(&self, socket: TcpStream, peer: SocketAddr) {
        let client_id = self.client_id_counter.fetch_add(1, Ordering::Relaxed) + 1;
        let context = self.context.clone();

        if let Err(e) = socket.set_nodelay(true) {
            warn!(client_id, error = %e, "failed to set TCP_NODELAY");
        }

        let span = info_span!("client", id = client_id, %peer);
        tokio::spawn(
            async move {
                info!("connected");
                match handle_connection(socket, &context).await {
                    Ok(end) => info!(?end, "disconnected"),
                    Err(e) => warn!(error = %e, "connection failed"),
                }
            }
            .instrument(span),
        );
    }
}

/// Accept errors that concern a single incoming connection rather than the
/// listening socket.
fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
    )
}

/// Bind and serve until terminated.
pub async fn run_server(config: ServerConfig, board: Arc<Board>) -> Result<(), ServerError> {
    let server = Server::bind(&config, board).await?;
    server.serve().await
}
