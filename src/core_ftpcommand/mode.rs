use crate::config::Config;
use crate::core_ftpcommand::error::CommandError;
use crate::core_ftpcommand::utils::ensure_logged_in;
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use crate::status_codes::{CMD_NOT_IMPLEMENTED_FOR_PARAM, OK};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the MODE FTP command. Only Stream mode is supported.
pub async fn handle_mode_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), CommandError> {
    let session = session.lock().await;
    if !ensure_logged_in(&writer, &session).await? {
        return Ok(());
    }

    if arg.trim().eq_ignore_ascii_case("S") {
        send_reply(&writer, OK, "Mode set to S.").await
    } else {
        send_reply(&writer, CMD_NOT_IMPLEMENTED_FOR_PARAM, "").await
    }
}
