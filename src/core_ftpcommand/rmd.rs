use crate::config::Config;
use crate::core_ftpcommand::error::CommandError;
use crate::core_ftpcommand::utils::ensure_logged_in;
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use crate::status_codes::{FILE_ACTION_OK, FILE_NOT_FOUND};
use log::{error, info};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;

/// Handles the RMD and XRMD FTP commands. The directory is removed with its
/// contents. The jail root itself cannot be removed.
pub async fn handle_rmd_command(
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
        return send_reply(&writer, FILE_NOT_FOUND, "Cannot remove this directory.").await;
    };

    let removed = match fs::symlink_metadata(&dir_path).await {
        Ok(metadata) if metadata.is_dir() => fs::remove_dir_all(&dir_path).await,
        Ok(_) => Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "not a directory",
        )),
        Err(e) => Err(e),
    };

    match removed {
        Ok(()) => {
            info!("Directory removed: {:?}", dir_path);
            send_reply(&writer, FILE_ACTION_OK, "Directory removed.").await
        }
        Err(e) => {
            error!("Failed to remove directory {:?}: {}", dir_path, e);
            send_reply(&writer, FILE_NOT_FOUND, "Failed to remove directory.").await
        }
    }
}
