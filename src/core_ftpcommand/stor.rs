use crate::config::Config;
use crate::core_ftpcommand::error::CommandError;
use crate::core_ftpcommand::utils::{display_path, ensure_logged_in};
use crate::core_network::data_conn::open_transfer;
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use crate::status_codes::{
    CONN_CLOSED_TRANSFER_ABORTED, FILE_ACTION_NOT_TAKEN, FILE_NOT_FOUND, OK, SYNTAX_ERROR,
};
use log::{error, info};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::path::Path;
use std::sync::Arc;
use tokio::fs::OpenOptions;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoreMode {
    Create,
    Append,
    Unique,
}

/// Handles the STOR (Store) FTP command: replaces or creates the target file.
pub async fn handle_stor_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), CommandError> {
    store_file(writer, config, session, arg, StoreMode::Create).await
}

/// Handles the APPE (Append) FTP command: appends to the target, creating it if needed.
pub async fn handle_appe_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), CommandError> {
    store_file(writer, config, session, arg, StoreMode::Append).await
}

/// Handles the STOU (Store Unique) FTP command.
///
/// The requested name is kept when it is free; otherwise, or when no name is
/// given, a random suffix is generated. The reply names the stored file.
pub async fn handle_stou_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), CommandError> {
    store_file(writer, config, session, arg, StoreMode::Unique).await
}

fn random_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect()
}

async fn exists(path: &Path) -> bool {
    tokio::fs::symlink_metadata(path).await.is_ok()
}

async fn write_target(path: &Path, data: &[u8], mode: StoreMode) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    match mode {
        StoreMode::Append => options.append(true).create(true),
        StoreMode::Create => options.write(true).create(true).truncate(true),
        StoreMode::Unique => options.write(true).create_new(true),
    };
    let mut file = options.open(path).await?;
    file.write_all(data).await?;
    file.flush().await
}

async fn store_file(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
    mode: StoreMode,
) -> Result<(), CommandError> {
    let (jail, mut virtual_path) = {
        let session = session.lock().await;
        if !ensure_logged_in(&writer, &session).await? {
            return Ok(());
        }
        let requested = arg.trim();
        if requested.is_empty() && mode != StoreMode::Unique {
            return send_reply(&writer, SYNTAX_ERROR, "").await;
        }
        let requested = if requested.is_empty() { "stou" } else { arg.as_str() };
        (session.jail_root(&config), session.virtual_path(requested))
    };
    let Some(jail) = jail else {
        return send_reply(&writer, FILE_NOT_FOUND, "").await;
    };
    let mut file_path = jail.join(&virtual_path);

    if mode == StoreMode::Unique && (arg.trim().is_empty() || exists(&file_path).await) {
        let base = virtual_path.clone();
        loop {
            virtual_path = format!("{}.{}", base, random_suffix());
            file_path = jail.join(&virtual_path);
            if !exists(&file_path).await {
                break;
            }
        }
    }

    let Some(mut transfer) = open_transfer(&writer, &session).await? else {
        return Ok(());
    };

    let abort = transfer.state();
    let mut data = Vec::new();
    let received = abort
        .unless_aborted(transfer.stream_mut().read_to_end(&mut data))
        .await;
    transfer.finish().await;

    match received {
        Some(Ok(_)) => {}
        Some(Err(e)) => {
            error!("Error receiving {:?}: {}", file_path, e);
            return send_reply(&writer, FILE_ACTION_NOT_TAKEN, "").await;
        }
        None => {
            info!("Upload of {:?} aborted", file_path);
            return send_reply(&writer, CONN_CLOSED_TRANSFER_ABORTED, "").await;
        }
    }

    match write_target(&file_path, &data, mode).await {
        Ok(()) => {
            info!("Stored {:?} ({} bytes, {:?})", file_path, data.len(), mode);
            if mode == StoreMode::Unique {
                let message = format!("FILE: {}", display_path(&virtual_path));
                send_reply(&writer, OK, &message).await
            } else {
                send_reply(&writer, OK, "").await
            }
        }
        Err(e) => {
            error!("Failed to write {:?}: {}", file_path, e);
            send_reply(&writer, FILE_ACTION_NOT_TAKEN, "").await
        }
    }
}
