use crate::config::Config;
use crate::core_ftpcommand::error::CommandError;
use crate::core_ftpcommand::utils::ensure_logged_in;
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use crate::status_codes::OK;
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the ALLO (Allocate) FTP command.
///
/// Storage is never pre-allocated, so the request is acknowledged and ignored.
///
/// # Arguments
///
/// * `writer` - The shared control connection writer.
/// * `session` - The session state.
/// * `arg` - The number of bytes to allocate (ignored).
///
/// # Returns
///
/// Result<(), CommandError> indicating the success or failure of the operation.
pub async fn handle_allo_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), CommandError> {
    let session = session.lock().await;
    if !ensure_logged_in(&writer, &session).await? {
        return Ok(());
    }

    info!("Received ALLO command with argument: {}", arg);
    send_reply(&writer, OK, "ALLO command ignored.").await
}
