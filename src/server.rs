use crate::config::{Config, ConfigError};
use crate::core_ftpcommand::handlers::{initialize_command_handlers, CommandHandlers};
use crate::core_network::network::accept_connections;
use crate::session::SessionManager;
use log::{error, info, warn};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::{lookup_host, TcpListener};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Running,
    ShuttingDown,
    Stopped,
}

/// Why [`Server::serve`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerExit {
    Shutdown,
    /// The configuration was reloaded; the owner must start a fresh server.
    Reload,
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to bind any address of {host}:{port}")]
    Bind { host: String, port: u16 },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// One FTP server instance: the listener, its sessions and its lifecycle.
pub struct Server {
    config: Arc<Config>,
    handlers: Arc<CommandHandlers>,
    sessions: Arc<SessionManager>,
    state: watch::Sender<ServerState>,
    is_reloading: AtomicBool,
}

impl Server {
    pub fn new(config: Config) -> Self {
        let (state, _) = watch::channel(ServerState::Running);
        Server {
            config: Arc::new(config),
            handlers: Arc::new(initialize_command_handlers()),
            sessions: Arc::new(SessionManager::new()),
            state,
            is_reloading: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn state(&self) -> ServerState {
        *self.state.borrow()
    }

    /// Binds the first resolved address of the configured host that accepts a listener.
    pub async fn bind(&self) -> Result<TcpListener, ServerError> {
        let host = self.config.server.server_name.clone();
        let port = self.config.server.port;
        let addrs: Vec<SocketAddr> = lookup_host((host.as_str(), port))
            .await
            .map_err(|source| ServerError::Resolve {
                host: host.clone(),
                source,
            })?
            .collect();

        for addr in addrs {
            match TcpListener::bind(addr).await {
                Ok(listener) => {
                    info!("Server listening on {}", addr);
                    return Ok(listener);
                }
                Err(e) => warn!("Cannot bind {}: {}", addr, e),
            }
        }
        Err(ServerError::Bind { host, port })
    }

    /// Runs the accept loop on `listener` until the server stops.
    pub async fn serve(&self, listener: TcpListener) -> ServerExit {
        accept_connections(
            listener,
            Arc::clone(&self.config),
            Arc::clone(&self.handlers),
            Arc::clone(&self.sessions),
            self.state.subscribe(),
        )
        .await;

        if self.is_reloading.load(Ordering::SeqCst) {
            ServerExit::Reload
        } else {
            ServerExit::Shutdown
        }
    }

    pub async fn start(&self) -> Result<ServerExit, ServerError> {
        let listener = self.bind().await?;
        Ok(self.serve(listener).await)
    }

    /// Lets every session finish its QUIT path, then stops the accept loop.
    /// Calling it again while a shutdown is under way just waits for it.
    pub async fn shutdown(&self) {
        let initiated = self.state.send_if_modified(|state| {
            if *state == ServerState::Running {
                *state = ServerState::ShuttingDown;
                true
            } else {
                false
            }
        });

        if initiated {
            info!("Shutting down, {} session(s) open", self.sessions.len());
            self.sessions.log_sessions();
        }

        self.sessions.wait_drained().await;
        if self.state.send_replace(ServerState::Stopped) != ServerState::Stopped {
            info!("Server stopped");
        }
    }

    /// Validates the configuration at `path` and, if it is sound, shuts the
    /// server down so its owner can restart it with the new settings.
    /// An invalid configuration leaves the server running.
    pub async fn reload(&self, path: impl AsRef<Path>) -> Result<Config, ServerError> {
        let path = path.as_ref();
        let config = match Config::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!("Reload rejected, keeping current configuration: {}", e);
                return Err(e.into());
            }
        };

        info!("Configuration {} is valid, restarting", path.display());
        self.is_reloading.store(true, Ordering::SeqCst);
        self.shutdown().await;
        Ok(config)
    }
}
