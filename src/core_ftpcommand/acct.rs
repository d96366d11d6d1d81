use crate::config::Config;
use crate::core_ftpcommand::error::CommandError;
use crate::core_ftpcommand::utils::ensure_logged_in;
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use crate::status_codes::{BAD_SEQUENCE, USER_LOGGED_IN};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the ACCT FTP command: confirms the account of the logged-in user.
pub async fn handle_acct_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), CommandError> {
    let session = session.lock().await;
    if !ensure_logged_in(&writer, &session).await? {
        return Ok(());
    }

    let account = arg.trim();
    if account.is_empty() {
        return send_reply(&writer, BAD_SEQUENCE, "").await;
    }

    match &session.user {
        Some(user) if user.username == account => {
            let message = format!("Username: {}, Root: {}", user.username, user.root);
            send_reply(&writer, USER_LOGGED_IN, &message).await
        }
        _ => send_reply(&writer, BAD_SEQUENCE, "The account was not found").await,
    }
}
