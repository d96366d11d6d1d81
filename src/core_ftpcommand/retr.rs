use crate::config::Config;
use crate::core_ftpcommand::error::CommandError;
use crate::core_ftpcommand::utils::ensure_logged_in;
use crate::core_network::data_conn::open_transfer;
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use crate::status_codes::{
    CONN_CLOSED_TRANSFER_ABORTED, FILE_ACTION_NOT_TAKEN, FILE_NOT_FOUND, OK, SYNTAX_ERROR,
};
use log::{error, info, warn};
use std::sync::Arc;
use tokio::fs::File;
use tokio::sync::Mutex;

/// Handles the RETR (Retrieve) FTP command.
///
/// Waits for the data connection, then streams the file to it. Opening or
/// copying failures reply 450; an ABOR during the copy replies 426.
///
/// # Arguments
///
/// * `writer` - The shared control connection writer.
/// * `config` - The server configuration.
/// * `session` - The session holding the pending data connection.
/// * `arg` - The name of the file to retrieve.
///
/// # Returns
///
/// Result<(), CommandError> indicating the success or failure of the operation.
pub async fn handle_retr_command(
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
            warn!("RETR command received with no arguments");
            return send_reply(&writer, SYNTAX_ERROR, "").await;
        }
        session.resolve(&config, &arg)
    };
    let Some(file_path) = file_path else {
        return send_reply(&writer, FILE_NOT_FOUND, "").await;
    };

    let Some(mut transfer) = open_transfer(&writer, &session).await? else {
        return Ok(());
    };

    let mut file = match File::open(&file_path).await {
        Ok(file) => file,
        Err(e) => {
            error!("File could not be opened: {:?}, error: {}", file_path, e);
            transfer.finish().await;
            return send_reply(&writer, FILE_ACTION_NOT_TAKEN, "").await;
        }
    };

    info!("Sending file: {:?}", file_path);
    let abort = transfer.state();
    let copied = abort
        .unless_aborted(tokio::io::copy(&mut file, transfer.stream_mut()))
        .await;
    transfer.finish().await;

    match copied {
        Some(Ok(bytes)) => {
            info!("File transfer completed: {:?} ({} bytes)", file_path, bytes);
            send_reply(&writer, OK, "").await
        }
        Some(Err(e)) => {
            error!("Error sending {:?}: {}", file_path, e);
            send_reply(&writer, FILE_ACTION_NOT_TAKEN, "").await
        }
        None => {
            info!("Transfer of {:?} aborted", file_path);
            send_reply(&writer, CONN_CLOSED_TRANSFER_ABORTED, "").await
        }
    }
}
