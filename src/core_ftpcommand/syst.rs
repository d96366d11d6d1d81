use crate::config::Config;
use crate::constants::SYSTEM_TYPE;
use crate::core_ftpcommand::error::CommandError;
use crate::core_ftpcommand::utils::ensure_logged_in;
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use crate::status_codes::NAME_SYSTEM;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the SYST (System) FTP command.
pub async fn handle_syst_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), CommandError> {
    let session = session.lock().await;
    if !ensure_logged_in(&writer, &session).await? {
        return Ok(());
    }
    send_reply(&writer, NAME_SYSTEM, SYSTEM_TYPE).await
}
