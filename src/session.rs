use crate::config::Config;
use crate::core_network::data_conn::{DataChannel, TransferState};
use crate::helpers::normalize_path;
use crate::users::User;
use chrono::{DateTime, Local};
use log::{debug, info};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferType {
    Ascii,
    Image,
}

/// Protocol state of one control connection.
#[derive(Debug)]
pub struct Session {
    pub id: u64,
    pub peer: SocketAddr,
    pub local_addr: SocketAddr, // Server end of the control connection
    pub candidate: Option<String>, // Username staged by USER
    pub user: Option<User>,        // Set once PASS succeeds
    pub current_dir: String,       // Relative to the user's jail, "" is the jail root
    pub transfer_type: Option<TransferType>,
    pub passive_mode: bool,
    pub rename_from: Option<String>,
    pub data_channel: Option<DataChannel>,
    pub quit_requested: bool,
    transfer: Arc<TransferState>,
}

impl Session {
    pub fn new(id: u64, peer: SocketAddr, local_addr: SocketAddr) -> Self {
        Self {
            id,
            peer,
            local_addr,
            candidate: None,
            user: None,
            current_dir: String::new(),
            transfer_type: None,
            passive_mode: false,
            rename_from: None,
            data_channel: None,
            quit_requested: false,
            transfer: Arc::new(TransferState::new()),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.username.as_str())
    }

    pub fn transfer_state(&self) -> Arc<TransferState> {
        Arc::clone(&self.transfer)
    }

    /// Filesystem directory of the logged-in user's jail.
    pub fn jail_root(&self, config: &Config) -> Option<PathBuf> {
        self.user
            .as_ref()
            .map(|user| jail_root(config, user))
    }

    /// Jail-relative path of `arg` seen from the current directory.
    pub fn virtual_path(&self, arg: &str) -> String {
        normalize_path(&self.current_dir, arg)
    }

    /// Filesystem path of `arg`, or `None` when nobody is logged in.
    pub fn resolve(&self, config: &Config, arg: &str) -> Option<PathBuf> {
        let virtual_path = self.virtual_path(arg);
        self.jail_root(config)
            .map(|root| root.join(virtual_path))
    }

    /// Replaces the pending data connection. The previous one, if any, is released.
    pub fn set_data_channel(&mut self, channel: DataChannel, passive: bool) {
        if self.data_channel.replace(channel).is_some() {
            debug!("Session {}: previous data channel discarded", self.id);
        }
        self.passive_mode = passive;
    }

    /// Returns the session to its freshly-connected state, keeping identity and transport.
    pub fn reinitialize(&mut self) {
        self.candidate = None;
        self.user = None;
        self.current_dir.clear();
        self.transfer_type = None;
        self.passive_mode = false;
        self.rename_from = None;
        self.data_channel = None;
    }
}

pub fn jail_root(config: &Config, user: &User) -> PathBuf {
    config.server.root.join(user.root.trim_start_matches('/'))
}

/// What the server keeps about a live session.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub id: u64,
    pub peer: SocketAddr,
    pub connected_at: DateTime<Local>,
}

/// Registry of live sessions.
///
/// Entries are added by the accept loop and removed exactly once when the
/// [`SessionGuard`] owned by the session task is dropped.
pub struct SessionManager {
    sessions: StdMutex<HashMap<u64, SessionInfo>>,
    live: watch::Sender<usize>,
    next_id: AtomicU64,
}

impl SessionManager {
    pub fn new() -> Self {
        let (live, _) = watch::channel(0);
        SessionManager {
            sessions: StdMutex::new(HashMap::new()),
            live,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn register(self: &Arc<Self>, peer: SocketAddr) -> SessionGuard {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let info = SessionInfo {
            id,
            peer,
            connected_at: Local::now(),
        };
        let count = {
            let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
            sessions.insert(id, info);
            sessions.len()
        };
        self.live.send_replace(count);
        debug!("Session {} registered for {} ({} live)", id, peer, count);
        SessionGuard {
            id,
            manager: Arc::clone(self),
        }
    }

    fn unregister(&self, id: u64) {
        let count = {
            let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
            sessions.remove(&id);
            sessions.len()
        };
        self.live.send_replace(count);
        debug!("Session {} unregistered ({} live)", id, count);
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Vec<SessionInfo> {
        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let mut list: Vec<SessionInfo> = sessions.values().cloned().collect();
        list.sort_by_key(|info| info.id);
        list
    }

    pub fn log_sessions(&self) {
        for info in self.snapshot() {
            info!(
                "  Session {} from {} connected at {}",
                info.id,
                info.peer,
                info.connected_at.format("%Y-%m-%d %H:%M:%S")
            );
        }
    }

    /// Resolves once no session is registered.
    pub async fn wait_drained(&self) {
        let mut live = self.live.subscribe();
        loop {
            let remaining = *live.borrow_and_update();
            if remaining == 0 {
                return;
            }
            if live.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry entry owned by a session task.
pub struct SessionGuard {
    id: u64,
    manager: Arc<SessionManager>,
}

impl SessionGuard {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.manager.unregister(self.id);
    }
}
