use crate::config::Config;
use crate::core_ftpcommand::error::CommandError;
use crate::core_ftpcommand::utils::{display_path, ensure_logged_in};
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use crate::status_codes::PATH_CREATED;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the PWD and XPWD FTP commands. Reports the jail-relative working
/// directory without touching the filesystem.
pub async fn handle_pwd_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), CommandError> {
    let session = session.lock().await;
    if !ensure_logged_in(&writer, &session).await? {
        return Ok(());
    }

    let message = format!(
        "\"{}\" is current directory",
        display_path(&session.current_dir)
    );
    send_reply(&writer, PATH_CREATED, &message).await
}
