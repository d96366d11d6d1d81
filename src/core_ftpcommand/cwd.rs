use crate::config::Config;
use crate::core_ftpcommand::error::CommandError;
use crate::core_ftpcommand::utils::{display_path, ensure_logged_in};
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use crate::status_codes::{FILE_ACTION_OK, FILE_NOT_FOUND};
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Returns true when `path` exists and is a directory.
pub async fn is_directory(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|metadata| metadata.is_dir())
        .unwrap_or(false)
}

/// Handles the CWD FTP command.
///
/// The target is composed from the current directory (or the jail root when
/// the argument starts with `/`) and only committed once it is known to be
/// an existing directory. On failure the working directory is unchanged.
///
/// # Arguments
///
/// * `writer` - The shared control connection writer.
/// * `config` - The server configuration.
/// * `session` - The session whose working directory changes.
/// * `arg` - The directory to change to.
///
/// # Returns
///
/// Result<(), CommandError> indicating the success or failure of the operation.
pub async fn handle_cwd_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), CommandError> {
    let mut session = session.lock().await;
    if !ensure_logged_in(&writer, &session).await? {
        return Ok(());
    }

    let target = session.virtual_path(&arg);
    let Some(dir_path) = session.resolve(&config, &arg) else {
        return send_reply(&writer, FILE_NOT_FOUND, "").await;
    };

    if is_directory(&dir_path).await {
        info!("Session {}: CWD {}", session.id, display_path(&target));
        session.current_dir = target;
        send_reply(&writer, FILE_ACTION_OK, "Directory successfully changed.").await
    } else {
        warn!("CWD to missing directory: {:?}", dir_path);
        send_reply(&writer, FILE_NOT_FOUND, "Failed to change directory.").await
    }
}
