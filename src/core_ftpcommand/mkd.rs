use crate::config::Config;
use crate::core_ftpcommand::error::CommandError;
use crate::core_ftpcommand::utils::{display_path, ensure_logged_in};
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use crate::status_codes::{FILE_NOT_FOUND, PATH_CREATED, SYNTAX_ERROR};
use log::{error, info};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;

/// Handles the MKD and XMKD FTP commands.
///
/// # Arguments
///
/// * `writer` - The shared control connection writer.
/// * `config` - The server configuration.
/// * `session` - The session state.
/// * `arg` - The directory to create, relative to the working directory.
///
/// # Returns
///
/// Result<(), CommandError> indicating the success or failure of the operation.
pub async fn handle_mkd_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), CommandError> {
    let (target, dir_path) = {
        let session = session.lock().await;
        if !ensure_logged_in(&writer, &session).await? {
            return Ok(());
        }
        (session.virtual_path(&arg), session.resolve(&config, &arg))
    };

    let Some(dir_path) = dir_path.filter(|_| !target.is_empty()) else {
        return send_reply(&writer, SYNTAX_ERROR, "").await;
    };

    match fs::create_dir(&dir_path).await {
        Ok(()) => {
            info!("Directory created: {:?}", dir_path);
            let message = format!("\"{}\" directory created", display_path(&target));
            send_reply(&writer, PATH_CREATED, &message).await
        }
        Err(e) => {
            error!("Failed to create directory {:?}: {}", dir_path, e);
            send_reply(&writer, FILE_NOT_FOUND, "Failed to create directory.").await
        }
    }
}
