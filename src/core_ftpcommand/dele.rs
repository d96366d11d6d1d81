use crate::config::Config;
use crate::core_ftpcommand::error::CommandError;
use crate::core_ftpcommand::utils::ensure_logged_in;
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use crate::status_codes::{FILE_ACTION_OK, FILE_NOT_FOUND, SYNTAX_ERROR};
use log::{error, info};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;

/// Handles the DELE FTP command.
pub async fn handle_dele_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), CommandError> {
    let file_path = {
        let session = session.lock().await;
        if !ensure_logged_in(&writer, &session).await? {
            return Ok(());
        }
        if arg.trim().is_empty() {
            return send_reply(&writer, SYNTAX_ERROR, "").await;
        }
        session.resolve(&config, &arg)
    };
    let Some(file_path) = file_path else {
        return send_reply(&writer, FILE_NOT_FOUND, "").await;
    };

    match fs::remove_file(&file_path).await {
        Ok(()) => {
            info!("File deleted: {:?}", file_path);
            let message = format!("File {} deleted", arg);
            send_reply(&writer, FILE_ACTION_OK, &message).await
        }
        Err(e) => {
            error!("Failed to delete {:?}: {}", file_path, e);
            send_reply(&writer, FILE_NOT_FOUND, "").await
        }
    }
}
