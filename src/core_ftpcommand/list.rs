use crate::config::Config;
use crate::constants::{DIRECTORY_LIST_SIZE, LIST_TIME_FORMAT};
use crate::core_ftpcommand::error::CommandError;
use crate::core_ftpcommand::utils::ensure_logged_in;
use crate::core_network::data_conn::open_transfer;
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use crate::status_codes::{
    CONN_CLOSED_TRANSFER_ABORTED, FILE_ACTION_NOT_TAKEN, FILE_NOT_FOUND, OK,
};
use chrono::{DateTime, Local};
use log::{error, info, warn};
use nix::unistd::{Gid, Group, Uid, User};
use std::fs::Metadata;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    /// `mode owner group size mtime name`
    Long,
    /// Bare names
    Names,
}

/// Skips leading option flags such as `-la`, which many clients send with LIST.
pub fn list_target(arg: &str) -> &str {
    let mut rest = arg.trim_start();
    while rest.starts_with('-') {
        rest = match rest.split_once(' ') {
            Some((_, tail)) => tail.trim_start(),
            None => "",
        };
    }
    rest
}

/// `drwxr-xr-x` style mode string.
pub fn mode_string(metadata: &Metadata) -> String {
    let file_type = metadata.file_type();
    let kind = if file_type.is_dir() {
        'd'
    } else if file_type.is_symlink() {
        'l'
    } else {
        '-'
    };

    let mode = metadata.permissions().mode();
    let mut text = String::with_capacity(10);
    text.push(kind);
    for bit in (0..9).rev() {
        let flag = match bit % 3 {
            2 => 'r',
            1 => 'w',
            _ => 'x',
        };
        text.push(if mode & (1 << bit) != 0 { flag } else { '-' });
    }
    text
}

fn owner_name(uid: u32) -> String {
    match User::from_uid(Uid::from_raw(uid)) {
        Ok(Some(user)) => user.name,
        _ => uid.to_string(),
    }
}

fn group_name(gid: u32) -> String {
    match Group::from_gid(Gid::from_raw(gid)) {
        Ok(Some(group)) => group.name,
        _ => gid.to_string(),
    }
}

pub fn format_list_line(name: &str, metadata: &Metadata) -> String {
    let size = if metadata.is_dir() {
        DIRECTORY_LIST_SIZE
    } else {
        metadata.len()
    };
    let modified: DateTime<Local> = metadata
        .modified()
        .map(DateTime::from)
        .unwrap_or_else(|_| Local::now());

    format!(
        "{} {} {} {} {} {}",
        mode_string(metadata),
        owner_name(metadata.uid()),
        group_name(metadata.gid()),
        size,
        modified.format(LIST_TIME_FORMAT),
        name
    )
}

/// Lists a directory, or a single file, sorted by name.
///
/// Blocking: owner and group lookups go through the system user database.
pub fn list_entries(path: &Path, format: ListFormat) -> std::io::Result<Vec<String>> {
    let format_entry = |name: &str, metadata: &Metadata| match format {
        ListFormat::Long => format_list_line(name, metadata),
        ListFormat::Names => name.to_string(),
    };

    let metadata = std::fs::metadata(path)?;
    if !metadata.is_dir() {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        return Ok(vec![format_entry(&name, &metadata)]);
    }

    let mut entries = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        match entry.metadata() {
            Ok(metadata) => entries.push((entry.file_name().to_string_lossy().into_owned(), metadata)),
            Err(e) => warn!("Skipping {:?} in listing: {}", entry.path(), e),
        }
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    Ok(entries
        .iter()
        .map(|(name, metadata)| format_entry(name, metadata))
        .collect())
}

pub async fn read_listing(path: PathBuf, format: ListFormat) -> Result<std::io::Result<Vec<String>>, CommandError> {
    tokio::task::spawn_blocking(move || list_entries(&path, format))
        .await
        .map_err(|e| CommandError::Internal(format!("listing task failed: {}", e)))
}

/// Handles the LIST FTP command.
///
/// # Arguments
///
/// * `writer` - The shared control connection writer.
/// * `config` - The server configuration.
/// * `session` - The session holding the pending data connection.
/// * `arg` - Optional directory or file to list, defaults to the working directory.
///
/// # Returns
///
/// Result<(), CommandError> indicating the success or failure of the operation.
pub async fn handle_list_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), CommandError> {
    send_listing(writer, config, session, arg, ListFormat::Long).await
}

/// Handles the NLST FTP command: same as LIST with bare names.
pub async fn handle_nlst_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), CommandError> {
    send_listing(writer, config, session, arg, ListFormat::Names).await
}

async fn send_listing(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
    format: ListFormat,
) -> Result<(), CommandError> {
    let target = {
        let session = session.lock().await;
        if !ensure_logged_in(&writer, &session).await? {
            return Ok(());
        }
        session.resolve(&config, list_target(&arg))
    };
    let Some(target) = target else {
        return send_reply(&writer, FILE_NOT_FOUND, "").await;
    };

    let Some(mut transfer) = open_transfer(&writer, &session).await? else {
        return Ok(());
    };

    let lines = match read_listing(target.clone(), format).await? {
        Ok(lines) => lines,
        Err(e) => {
            error!("Failed to list {:?}: {}", target, e);
            transfer.finish().await;
            return send_reply(&writer, FILE_ACTION_NOT_TAKEN, "").await;
        }
    };

    let mut payload = String::new();
    for line in &lines {
        payload.push_str(line);
        payload.push_str("\r\n");
    }

    let abort = transfer.state();
    let written = abort
        .unless_aborted(transfer.stream_mut().write_all(payload.as_bytes()))
        .await;
    transfer.finish().await;

    match written {
        Some(Ok(())) => {
            info!("Listed {:?} ({} entries)", target, lines.len());
            send_reply(&writer, OK, "").await
        }
        Some(Err(e)) => {
            error!("Failed to send listing of {:?}: {}", target, e);
            send_reply(&writer, FILE_ACTION_NOT_TAKEN, "").await
        }
        None => {
            info!("Listing of {:?} aborted", target);
            send_reply(&writer, CONN_CLOSED_TRANSFER_ABORTED, "").await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_target_skips_options() {
        assert_eq!(list_target(""), "");
        assert_eq!(list_target("-la"), "");
        assert_eq!(list_target("-l -a docs"), "docs");
        assert_eq!(list_target("my docs"), "my docs");
    }

    #[test]
    fn test_mode_string() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("file.txt");
        std::fs::write(&file, b"abc").unwrap();
        std::fs::set_permissions(&file, std::fs::Permissions::from_mode(0o640)).unwrap();
        std::fs::set_permissions(dir.path(), std::fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(mode_string(&std::fs::metadata(&file).unwrap()), "-rw-r-----");
        assert_eq!(mode_string(&std::fs::metadata(dir.path()).unwrap()), "drwxr-xr-x");
    }

    #[test]
    fn test_list_entries_long_and_names() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.txt"), b"hello").unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();

        let names = list_entries(dir.path(), ListFormat::Names).unwrap();
        assert_eq!(names, vec!["a".to_string(), "b.txt".to_string()]);

        let long = list_entries(dir.path(), ListFormat::Long).unwrap();
        assert_eq!(long.len(), 2);
        let fields: Vec<&str> = long[0].split_whitespace().collect();
        assert!(fields[0].starts_with('d'));
        assert_eq!(fields[3], "4096");
        assert_eq!(*fields.last().unwrap(), "a");

        let fields: Vec<&str> = long[1].split_whitespace().collect();
        assert_eq!(fields[3], "5");
        assert_eq!(*fields.last().unwrap(), "b.txt");
    }

    #[test]
    fn test_list_single_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("only.txt");
        std::fs::write(&file, b"x").unwrap();
        assert_eq!(
            list_entries(&file, ListFormat::Names).unwrap(),
            vec!["only.txt".to_string()]
        );
    }

    #[test]
    fn test_list_missing_directory() {
        let dir = TempDir::new().unwrap();
        assert!(list_entries(&dir.path().join("missing"), ListFormat::Long).is_err());
    }
}
