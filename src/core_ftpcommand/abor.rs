use crate::config::Config;
use crate::core_ftpcommand::error::CommandError;
use crate::core_ftpcommand::utils::ensure_logged_in;
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use crate::status_codes::CLOSING_DATA_CONN;
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the ABOR FTP command.
///
/// A transfer running when ABOR arrives is cancelled by the control loop
/// and answers 426 itself; ABOR is then dispatched and closes the exchange
/// with 226. With nothing running, a lingering data connection is released
/// and only 226 is sent.
pub async fn handle_abor_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), CommandError> {
    let mut session = session.lock().await;
    if !ensure_logged_in(&writer, &session).await? {
        return Ok(());
    }

    if session.data_channel.take().is_some() {
        info!("Session {}: pending data connection released by ABOR", session.id);
    }
    let transfer = session.transfer_state();
    if transfer.in_progress() {
        transfer.abort();
    }
    send_reply(&writer, CLOSING_DATA_CONN, "").await
}
