use crate::config::Config;
use crate::core_ftpcommand::error::CommandError;
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use crate::status_codes::{INVALID_CREDENTIALS, USERNAME_OK};
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the USER FTP command.
///
/// Stages the username for PASS when it is configured. Issuing USER always
/// logs the session out first, so a new login starts from scratch.
///
/// # Arguments
///
/// * `writer` - The shared control connection writer.
/// * `config` - The server configuration holding the user list.
/// * `session` - The session state.
/// * `username` - The username provided by the client.
///
/// # Returns
///
/// Result<(), CommandError> indicating the success or failure of the operation.
pub async fn handle_user_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    username: String,
) -> Result<(), CommandError> {
    let username = username.trim().to_string();
    info!("Received USER command with username: {}", username);

    let mut session = session.lock().await;
    session.user = None;
    session.current_dir.clear();

    if config.users.find(&username).is_some() {
        session.candidate = Some(username);
        send_reply(&writer, USERNAME_OK, "").await
    } else {
        session.candidate = None;
        warn!("Unknown username from {}: {}", session.peer, username);
        send_reply(&writer, INVALID_CREDENTIALS, "").await
    }
}
