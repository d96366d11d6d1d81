//! Data-connection rendezvous.
//!
//! PASV/EPSV/PORT/EPRT spawn one coordinator task that establishes the data
//! connection and keeps a [`DataChannel`] in the session. A transfer command
//! claims the channel and waits for the connection to be handed over (first
//! signal). When the transfer is done the connection is handed back (second
//! signal) and the coordinator closes it together with its listener.
//!
//! Dropping a [`DataChannel`] at any point releases the coordinator: it stops
//! accepting or dialing, and closes whatever it holds.

use crate::core_ftpcommand::error::CommandError;
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use crate::status_codes::{CANT_OPEN_DATA_CONN, CONN_CLOSED_TRANSFER_ABORTED};
use log::{debug, error, info, warn};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{oneshot, Mutex, Notify};
use tokio::time::timeout;

/// Transfer flags shared between a session's control loop and its handlers.
#[derive(Debug, Default)]
pub struct TransferState {
    in_progress: AtomicBool,
    aborted: AtomicBool,
    notify: Notify,
}

impl TransferState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress.load(Ordering::SeqCst)
    }

    /// Cancels the running transfer, if any.
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Resolves once [`abort`](Self::abort) has been called for the current transfer.
    pub async fn aborted(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.aborted.load(Ordering::SeqCst) {
                return;
            }
            notified.await;
        }
    }

    /// Drives `fut` to completion unless the transfer is aborted first.
    pub async fn unless_aborted<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.aborted() => None,
            out = fut => Some(out),
        }
    }

    fn begin(self: &Arc<Self>) -> InProgressGuard {
        self.aborted.store(false, Ordering::SeqCst);
        self.in_progress.store(true, Ordering::SeqCst);
        InProgressGuard(Arc::clone(self))
    }
}

/// Clears the in-progress flag however the transfer ends.
#[derive(Debug)]
struct InProgressGuard(Arc<TransferState>);

impl Drop for InProgressGuard {
    fn drop(&mut self) {
        self.0.in_progress.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataMode {
    Passive,
    Active,
}

/// The session's end of a pending data connection.
#[derive(Debug)]
pub struct DataChannel {
    ready: oneshot::Receiver<TcpStream>,
    release: oneshot::Sender<TcpStream>,
    mode: DataMode,
}

impl DataChannel {
    pub fn mode(&self) -> DataMode {
        self.mode
    }
}

/// A claimed data connection. Hand it back with [`finish`](Self::finish).
#[derive(Debug)]
pub struct Transfer {
    stream: TcpStream,
    release: oneshot::Sender<TcpStream>,
    state: Arc<TransferState>,
    _guard: InProgressGuard,
}

impl Transfer {
    pub fn stream_mut(&mut self) -> &mut TcpStream {
        &mut self.stream
    }

    /// The abort signal of this transfer, for racing against I/O.
    pub fn state(&self) -> Arc<TransferState> {
        Arc::clone(&self.state)
    }

    /// Flushes the connection and returns it to the coordinator, which closes it.
    pub async fn finish(self) {
        let Transfer {
            mut stream,
            release,
            _guard,
            ..
        } = self;
        if let Err(e) = stream.flush().await {
            debug!("Flushing data connection failed: {}", e);
        }
        if let Err(mut stream) = release.send(stream) {
            let _ = stream.shutdown().await;
        }
    }
}

/// Starts a coordinator that accepts exactly one connection on `listener`.
pub fn spawn_passive(listener: TcpListener, wait: Duration) -> DataChannel {
    let (mut ready_tx, ready_rx) = oneshot::channel();
    let (release_tx, release_rx) = oneshot::channel();

    tokio::spawn(async move {
        let accepted = tokio::select! {
            res = timeout(wait, listener.accept()) => res,
            _ = ready_tx.closed() => {
                debug!("Passive data channel discarded before a client connected");
                return;
            }
        };

        let stream = match accepted {
            Ok(Ok((stream, peer))) => {
                debug!("Accepted data connection from {}", peer);
                stream
            }
            Ok(Err(e)) => {
                error!("Failed to accept data connection: {}", e);
                return;
            }
            Err(_) => {
                warn!("No data connection received within {:?}", wait);
                return;
            }
        };

        hand_over(stream, ready_tx, release_rx).await;
        drop(listener);
    });

    DataChannel {
        ready: ready_rx,
        release: release_tx,
        mode: DataMode::Passive,
    }
}

/// Starts a coordinator that dials out to the client at `addr`.
pub fn spawn_active(addr: SocketAddr, wait: Duration) -> DataChannel {
    let (mut ready_tx, ready_rx) = oneshot::channel();
    let (release_tx, release_rx) = oneshot::channel();

    tokio::spawn(async move {
        let connected = tokio::select! {
            res = timeout(wait, TcpStream::connect(addr)) => res,
            _ = ready_tx.closed() => {
                debug!("Active data channel to {} discarded", addr);
                return;
            }
        };

        let stream = match connected {
            Ok(Ok(stream)) => {
                debug!("Data connection established with {}", addr);
                stream
            }
            Ok(Err(e)) => {
                error!("Failed to connect to client {}: {}", addr, e);
                return;
            }
            Err(_) => {
                warn!("Connecting to {} timed out after {:?}", addr, wait);
                return;
            }
        };

        hand_over(stream, ready_tx, release_rx).await;
    });

    DataChannel {
        ready: ready_rx,
        release: release_tx,
        mode: DataMode::Active,
    }
}

async fn hand_over(
    stream: TcpStream,
    ready_tx: oneshot::Sender<TcpStream>,
    release_rx: oneshot::Receiver<TcpStream>,
) {
    if let Err(mut stream) = ready_tx.send(stream) {
        debug!("Data channel discarded before the transfer claimed it");
        let _ = stream.shutdown().await;
        return;
    }

    match release_rx.await {
        Ok(mut stream) => {
            let _ = stream.shutdown().await;
            debug!("Data connection closed");
        }
        Err(_) => debug!("Data connection dropped by the transfer"),
    }
}

/// Claims the session's pending data connection for a transfer command.
///
/// Replies 425 when no data connection was requested or it could not be
/// established, and 426 when the wait is aborted. `Ok(None)` means a reply
/// has already been sent.
pub async fn open_transfer(
    writer: &ControlWriter,
    session: &Arc<Mutex<Session>>,
) -> Result<Option<Transfer>, CommandError> {
    let (channel, state) = {
        let mut session = session.lock().await;
        (session.data_channel.take(), session.transfer_state())
    };

    let Some(DataChannel { ready, release, mode }) = channel else {
        send_reply(writer, CANT_OPEN_DATA_CONN, "Use PASV, EPSV, PORT or EPRT first.").await?;
        return Ok(None);
    };

    let guard = state.begin();
    debug!("Waiting for {:?} data connection", mode);

    tokio::select! {
        biased;
        _ = state.aborted() => {
            info!("Transfer aborted while waiting for the data connection");
            send_reply(writer, CONN_CLOSED_TRANSFER_ABORTED, "").await?;
            Ok(None)
        }
        handed = ready => match handed {
            Ok(stream) => Ok(Some(Transfer {
                stream,
                release,
                state: Arc::clone(&state),
                _guard: guard,
            })),
            Err(_) => {
                send_reply(writer, CANT_OPEN_DATA_CONN, "").await?;
                Ok(None)
            }
        }
    }
}
