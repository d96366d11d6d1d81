use crate::config::Config;
use crate::core_ftpcommand::error::CommandError;
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use crate::status_codes::CLOSING_CONTROL_CONN;
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the QUIT FTP command.
///
/// Replies 221 and marks the session so the control loop closes the
/// connection once the reply is out.
pub async fn handle_quit_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), CommandError> {
    let mut session = session.lock().await;
    info!("QUIT from {}", session.peer);
    session.quit_requested = true;
    session.data_channel = None;
    send_reply(&writer, CLOSING_CONTROL_CONN, "").await
}
