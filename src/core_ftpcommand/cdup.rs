use crate::config::Config;
use crate::core_ftpcommand::cwd::is_directory;
use crate::core_ftpcommand::error::CommandError;
use crate::core_ftpcommand::utils::{display_path, ensure_logged_in};
use crate::helpers::{parent_path, send_reply, ControlWriter};
use crate::session::Session;
use crate::status_codes::{FILE_NOT_FOUND, OK};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the CDUP and XCUP FTP commands: moves to the parent directory,
/// never above the jail root.
pub async fn handle_cdup_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), CommandError> {
    let mut session = session.lock().await;
    if !ensure_logged_in(&writer, &session).await? {
        return Ok(());
    }

    let parent = parent_path(&session.current_dir);
    let Some(dir_path) = session.resolve(&config, &display_path(&parent)) else {
        return send_reply(&writer, FILE_NOT_FOUND, "").await;
    };

    if is_directory(&dir_path).await {
        let message = format!("Directory changed to {}", display_path(&parent));
        session.current_dir = parent;
        send_reply(&writer, OK, &message).await
    } else {
        send_reply(&writer, FILE_NOT_FOUND, "Failed to change directory.").await
    }
}
