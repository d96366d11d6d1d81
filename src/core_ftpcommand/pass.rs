use crate::config::Config;
use crate::core_ftpcommand::error::CommandError;
use crate::helpers::{send_reply, ControlWriter};
use crate::session::{jail_root, Session};
use crate::status_codes::{FILE_NOT_FOUND, INVALID_CREDENTIALS, USER_LOGGED_IN};
use log::{error, info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the PASS FTP command.
///
/// Checks the password of the username staged by USER. On success the
/// user's jail directory must exist; the session then starts at the jail
/// root. A wrong password and a missing USER get the same 430 reply.
pub async fn handle_pass_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    password: String,
) -> Result<(), CommandError> {
    let mut session = session.lock().await;

    let Some(candidate) = session.candidate.take() else {
        warn!("PASS without a valid USER from {}", session.peer);
        return send_reply(&writer, INVALID_CREDENTIALS, "").await;
    };

    // bcrypt verification is CPU bound
    let user = {
        let config = Arc::clone(&config);
        let candidate = candidate.clone();
        tokio::task::spawn_blocking(move || {
            config.users.authenticate(&candidate, &password).cloned()
        })
        .await
        .map_err(|e| CommandError::Internal(format!("password check failed: {}", e)))?
    };

    let Some(user) = user else {
        warn!("Wrong password for {} from {}", candidate, session.peer);
        return send_reply(&writer, INVALID_CREDENTIALS, "").await;
    };

    let home = jail_root(&config, &user);
    match tokio::fs::metadata(&home).await {
        Ok(metadata) if metadata.is_dir() => {
            info!("User {} logged in from {}", user.username, session.peer);
            session.user = Some(user);
            session.current_dir.clear();
            send_reply(&writer, USER_LOGGED_IN, "").await
        }
        Ok(_) => {
            error!("Home of {} is not a directory: {:?}", user.username, home);
            send_reply(&writer, FILE_NOT_FOUND, "Home directory unavailable.").await
        }
        Err(e) => {
            error!("Home of {} unavailable: {:?}: {}", user.username, home, e);
            send_reply(&writer, FILE_NOT_FOUND, "Home directory unavailable.").await
        }
    }
}
