use crate::config::Config;
use crate::core_ftpcommand::error::CommandError;
use crate::core_ftpcommand::utils::ensure_logged_in;
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use crate::status_codes::SERVICE_READY;
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the REIN FTP command: logs out and resets every transfer parameter.
/// Any pending data connection is released.
pub async fn handle_rein_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), CommandError> {
    let mut session = session.lock().await;
    if !ensure_logged_in(&writer, &session).await? {
        return Ok(());
    }

    info!(
        "Session {} reinitialized (was {})",
        session.id,
        session.username().unwrap_or("-")
    );
    session.reinitialize();
    send_reply(&writer, SERVICE_READY, "Service ready for new user.").await
}
