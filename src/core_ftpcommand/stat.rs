use crate::config::Config;
use crate::core_ftpcommand::error::CommandError;
use crate::core_ftpcommand::list::{list_target, read_listing, ListFormat};
use crate::core_ftpcommand::utils::{display_path, ensure_logged_in};
use crate::helpers::{send_multiline_reply, send_reply, ControlWriter};
use crate::session::Session;
use crate::status_codes::{FILE_ACTION_NOT_TAKEN, FILE_NOT_FOUND, SYSTEM_STATUS};
use log::error;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the STAT FTP command.
///
/// Without an argument it reports the session status. With an argument it
/// sends a LIST-style listing of that path over the control connection.
pub async fn handle_stat_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), CommandError> {
    let session = session.lock().await;
    if !ensure_logged_in(&writer, &session).await? {
        return Ok(());
    }

    let target = list_target(&arg);
    if target.is_empty() {
        let lines = vec![
            format!("Connected from {}", session.peer),
            format!("Logged in as {}", session.username().unwrap_or("-")),
            format!("Working directory {}", display_path(&session.current_dir)),
            format!(
                "TYPE: {}",
                session
                    .transfer_type
                    .map(|transfer_type| format!("{:?}", transfer_type))
                    .unwrap_or_else(|| "unset".to_string())
            ),
            format!(
                "Data connection: {}",
                match &session.data_channel {
                    Some(channel) => format!("{:?} pending", channel.mode()),
                    None => "none".to_string(),
                }
            ),
        ];
        return send_multiline_reply(
            &writer,
            SYSTEM_STATUS,
            &format!("{} FTP server status:", config.server.server_name),
            &lines,
            "Server OK",
        )
        .await;
    }

    let virtual_path = session.virtual_path(target);
    let Some(path) = session.resolve(&config, target) else {
        return send_reply(&writer, FILE_NOT_FOUND, "").await;
    };

    match read_listing(path.clone(), ListFormat::Long).await? {
        Ok(lines) => {
            send_multiline_reply(
                &writer,
                SYSTEM_STATUS,
                &format!("Status of {}:", display_path(&virtual_path)),
                &lines,
                "End of status.",
            )
            .await
        }
        Err(e) => {
            error!("STAT of {:?} failed: {}", path, e);
            send_reply(&writer, FILE_ACTION_NOT_TAKEN, "").await
        }
    }
}
