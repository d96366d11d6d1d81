use crate::config::Config;
use crate::core_ftpcommand::error::CommandError;
use crate::core_ftpcommand::utils::ensure_logged_in;
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use crate::status_codes::OK;
use log::debug;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the SITE FTP command. There are no site-specific extensions.
pub async fn handle_site_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), CommandError> {
    let session = session.lock().await;
    if !ensure_logged_in(&writer, &session).await? {
        return Ok(());
    }
    debug!("SITE {} ignored", arg);
    send_reply(&writer, OK, "No SITE options for this server").await
}
