use crate::config::Config;
use crate::core_ftpcommand::error::CommandError;
use crate::core_ftpcommand::utils::ensure_logged_in;
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use crate::status_codes::{CMD_NOT_IMPLEMENTED_FOR_PARAM, OK};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the STRU FTP command. Only File structure is supported.
pub async fn handle_stru_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), CommandError> {
    let session = session.lock().await;
    if !ensure_logged_in(&writer, &session).await? {
        return Ok(());
    }

    if arg.trim().eq_ignore_ascii_case("F") {
        send_reply(&writer, OK, "Structure set to F.").await
    } else {
        send_reply(&writer, CMD_NOT_IMPLEMENTED_FOR_PARAM, "").await
    }
}
