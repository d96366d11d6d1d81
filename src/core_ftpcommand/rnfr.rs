use crate::config::Config;
use crate::core_ftpcommand::error::CommandError;
use crate::core_ftpcommand::utils::ensure_logged_in;
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use crate::status_codes::{FILE_ACTION_PENDING, SYNTAX_ERROR};
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the RNFR (Rename From) FTP command: stages the source of a rename.
pub async fn handle_rnfr_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), CommandError> {
    let mut session = session.lock().await;
    if !ensure_logged_in(&writer, &session).await? {
        return Ok(());
    }

    if arg.trim().is_empty() {
        return send_reply(&writer, SYNTAX_ERROR, "").await;
    }

    let source = session.virtual_path(&arg);
    info!("Session {}: rename from {}", session.id, source);
    session.rename_from = Some(source);
    send_reply(&writer, FILE_ACTION_PENDING, "").await
}
