use crate::config::Config;
use crate::constants::MAX_COMMAND_LENGTH;
use crate::core_ftpcommand::error::CommandError;
use crate::core_ftpcommand::ftpcommand::{CommandLine, FtpCommand};
use crate::core_ftpcommand::handlers::{dispatch, CommandHandlers};
use crate::core_network::control_reader::{ControlLine, ControlReader};
use crate::helpers::{send_reply, ControlWriter};
use crate::server::ServerState;
use crate::session::{Session, SessionGuard, SessionManager};
use crate::status_codes::{CLOSING_CONTROL_CONN, SERVICE_READY, UNKNOWN_ERROR};
use log::{debug, error, info, warn};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{watch, Mutex};

/// Everything a session task needs from the server.
pub struct ConnectionContext {
    pub config: Arc<Config>,
    pub handlers: Arc<CommandHandlers>,
    pub state: watch::Receiver<ServerState>,
}

/// Resolves once the server leaves the running state.
async fn shutdown_requested(state: &mut watch::Receiver<ServerState>) {
    loop {
        if *state.borrow_and_update() != ServerState::Running {
            return;
        }
        if state.changed().await.is_err() {
            // Server gone without a shutdown: keep serving until the client leaves
            std::future::pending::<()>().await;
        }
    }
}

fn is_abort(line: &ControlLine) -> bool {
    match line {
        ControlLine::Command(raw) => CommandLine::parse(raw).command() == Some(FtpCommand::ABOR),
        ControlLine::TooLong => false,
    }
}

/// Services one control connection until QUIT, disconnect or server shutdown.
///
/// Commands run one at a time. While a command runs the connection keeps
/// being read: an ABOR cancels a running transfer, every other line is
/// queued and dispatched afterwards in arrival order.
pub async fn handle_connection(
    socket: TcpStream,
    guard: SessionGuard,
    mut ctx: ConnectionContext,
) -> Result<(), CommandError> {
    let peer = socket.peer_addr()?;
    let local = socket.local_addr()?;
    let (read_half, write_half) = socket.into_split();
    let writer: ControlWriter = Arc::new(Mutex::new(write_half));

    send_reply(&writer, SERVICE_READY, "").await?;

    let session = Arc::new(Mutex::new(Session::new(guard.id(), peer, local)));
    let transfer = session.lock().await.transfer_state();
    let mut lines = ControlReader::new(BufReader::new(read_half), MAX_COMMAND_LENGTH);
    let mut backlog: VecDeque<ControlLine> = VecDeque::new();
    let mut peer_closed = false;

    loop {
        if *ctx.state.borrow() != ServerState::Running {
            info!("Session {}: closing for server shutdown", guard.id());
            if send_reply(&writer, CLOSING_CONTROL_CONN, "").await.is_ok() {
                close_control(&writer).await;
            }
            break;
        }

        let next = match backlog.pop_front() {
            Some(next) => next,
            None if peer_closed => break,
            None => tokio::select! {
                segment = lines.next_line() => match segment {
                    Ok(Some(next)) => next,
                    Ok(None) => {
                        info!("Connection closed by {}", peer);
                        break;
                    }
                    Err(e) => {
                        error!("Read error from {}: {}", peer, e);
                        break;
                    }
                },
                _ = shutdown_requested(&mut ctx.state) => continue,
            },
        };

        let raw = match next {
            ControlLine::Command(raw) => raw,
            ControlLine::TooLong => {
                warn!("Command line over {} bytes from {} rejected", MAX_COMMAND_LENGTH, peer);
                send_reply(&writer, UNKNOWN_ERROR, "Command line too long.").await?;
                continue;
            }
        };

        let line = CommandLine::parse(&raw);
        if line.verb.eq_ignore_ascii_case("PASS") {
            debug!("Received command: PASS ****");
        } else {
            debug!("Received command: {} {}", line.verb, line.arg);
        }

        let command = dispatch(
            &ctx.handlers,
            &line,
            Arc::clone(&writer),
            Arc::clone(&ctx.config),
            Arc::clone(&session),
        );
        tokio::pin!(command);

        let outcome = loop {
            tokio::select! {
                biased;
                outcome = &mut command => break outcome,
                segment = lines.next_line(), if !peer_closed => match segment {
                    Ok(Some(next)) => {
                        if is_abort(&next) && transfer.in_progress() {
                            info!("Session {}: ABOR received during transfer", guard.id());
                            transfer.abort();
                        }
                        backlog.push_back(next);
                    }
                    Ok(None) | Err(_) => {
                        debug!("Control connection from {} lost during a command", peer);
                        peer_closed = true;
                        transfer.abort();
                    }
                },
            }
        };

        if let Err(e) = outcome {
            error!("Session {} terminated: {}", guard.id(), e);
            return Err(e);
        }

        // QUIT has already replied 221
        if session.lock().await.quit_requested {
            close_control(&writer).await;
            break;
        }
    }

    // Release any pending data connection before the registry entry goes away
    session.lock().await.data_channel = None;
    Ok(())
}

/// Half-closes the control socket.
async fn close_control(writer: &ControlWriter) {
    let mut writer = writer.lock().await;
    if let Err(e) = writer.shutdown().await {
        debug!("Control shutdown failed: {}", e);
    }
}

/// Registers a new session unless the server is shutting down.
///
/// The registry entry is taken before the state is checked: a shutdown that
/// starts afterwards waits for this session, and one that started before
/// gets the entry back immediately.
fn admit(
    sessions: &Arc<SessionManager>,
    state: &watch::Receiver<ServerState>,
    peer: std::net::SocketAddr,
) -> Option<SessionGuard> {
    let guard = sessions.register(peer);
    if *state.borrow() != ServerState::Running {
        return None;
    }
    Some(guard)
}

/// Accepts control connections until the server reaches [`ServerState::Stopped`].
///
/// Connections arriving while the server shuts down are closed without a reply.
pub async fn accept_connections(
    listener: TcpListener,
    config: Arc<Config>,
    handlers: Arc<CommandHandlers>,
    sessions: Arc<SessionManager>,
    mut state: watch::Receiver<ServerState>,
) {
    loop {
        if *state.borrow_and_update() == ServerState::Stopped {
            break;
        }
        let accepted = tokio::select! {
            accepted = listener.accept() => accepted,
            changed = state.changed() => {
                if changed.is_err() || *state.borrow() == ServerState::Stopped {
                    break;
                }
                continue;
            }
        };

        let (socket, addr) = match accepted {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("Failed to accept connection: {}", e);
                continue;
            }
        };

        let Some(guard) = admit(&sessions, &state, addr) else {
            info!("Refusing connection from {} during shutdown", addr);
            drop(socket);
            continue;
        };

        info!("New connection from {}", addr);
        let ctx = ConnectionContext {
            config: Arc::clone(&config),
            handlers: Arc::clone(&handlers),
            state: state.clone(),
        };

        tokio::spawn(async move {
            let id = guard.id();
            if let Err(e) = handle_connection(socket, guard, ctx).await {
                debug!("Session {} ended with error: {}", id, e);
            }
            info!("Connection closed for {}", addr);
        });
    }

    if let Ok(addr) = listener.local_addr() {
        info!("Listener on {} closed", addr);
    }
}
