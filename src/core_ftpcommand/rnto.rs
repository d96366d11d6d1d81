use crate::config::Config;
use crate::core_ftpcommand::error::CommandError;
use crate::core_ftpcommand::utils::ensure_logged_in;
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use crate::status_codes::{BAD_SEQUENCE, FILE_ACTION_OK, FILE_NOT_FOUND, SYNTAX_ERROR};
use log::{error, info};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;

/// Handles the RNTO (Rename To) FTP command.
///
/// Requires a source staged by RNFR. The staged source is cleared whatever
/// the outcome. A failed rename reports the filesystem error text.
///
/// # Arguments
///
/// * `writer` - The shared control connection writer.
/// * `config` - The server configuration.
/// * `session` - The session holding the staged source.
/// * `arg` - The new name of the file or directory.
///
/// # Returns
///
/// Result<(), CommandError> indicating the success or failure of the operation.
pub async fn handle_rnto_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), CommandError> {
    let (old_path, new_path) = {
        let mut session = session.lock().await;
        if !ensure_logged_in(&writer, &session).await? {
            return Ok(());
        }

        let Some(source) = session.rename_from.take() else {
            return send_reply(&writer, BAD_SEQUENCE, "").await;
        };
        if arg.trim().is_empty() {
            return send_reply(&writer, SYNTAX_ERROR, "").await;
        }

        // Staged sources are already jail-relative
        let old_path = session.resolve(&config, &format!("/{}", source));
        (old_path, session.resolve(&config, &arg))
    };

    let (Some(old_path), Some(new_path)) = (old_path, new_path) else {
        return send_reply(&writer, FILE_NOT_FOUND, "").await;
    };

    match fs::rename(&old_path, &new_path).await {
        Ok(()) => {
            info!("Renamed {:?} to {:?}", old_path, new_path);
            send_reply(&writer, FILE_ACTION_OK, "").await
        }
        Err(e) => {
            error!("Failed to rename {:?} to {:?}: {}", old_path, new_path, e);
            send_reply(&writer, FILE_NOT_FOUND, &e.to_string()).await
        }
    }
}
