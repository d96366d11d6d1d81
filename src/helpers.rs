use crate::constants::CONTROL_WRITE_TIMEOUT_SECS;
use crate::core_ftpcommand::error::CommandError;
use crate::status_codes::{format_multiline_reply, format_reply};
use log::{debug, warn};
use std::io::ErrorKind;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;
use tokio::time::timeout;

/// Write half of a control connection, shared between the control loop and
/// the command handlers.
pub type ControlWriter = Arc<Mutex<OwnedWriteHalf>>;

/// Sends a single-line reply to the client.
pub async fn send_reply(writer: &ControlWriter, code: u16, message: &str) -> Result<(), CommandError> {
    let reply = format_reply(code, message);
    debug!("Reply: {}", reply.trim_end());
    let mut writer = writer.lock().await;
    write_reply(&mut *writer, reply.as_bytes(), control_write_timeout()).await
}

pub async fn send_multiline_reply(
    writer: &ControlWriter,
    code: u16,
    header: &str,
    lines: &[String],
    footer: &str,
) -> Result<(), CommandError> {
    let reply = format_multiline_reply(code, header, lines, footer);
    debug!("Reply: {} ({} lines)", code, lines.len());
    let mut writer = writer.lock().await;
    write_reply(&mut *writer, reply.as_bytes(), control_write_timeout()).await
}

fn control_write_timeout() -> Duration {
    Duration::from_secs(CONTROL_WRITE_TIMEOUT_SECS)
}

/// Writes a reply, giving up after `limit`. Both failures are fatal to the session.
async fn write_reply<W: AsyncWrite + Unpin>(
    writer: &mut W,
    reply: &[u8],
    limit: Duration,
) -> Result<(), CommandError> {
    match timeout(limit, writer.write_all(reply)).await {
        Ok(written) => written.map_err(CommandError::Control),
        Err(_) => {
            warn!("Client did not read its reply within {:?}", limit);
            Err(CommandError::Control(std::io::Error::new(
                ErrorKind::TimedOut,
                "control connection write timed out",
            )))
        }
    }
}

/// Composes a jail-relative path from the current directory and a client
/// argument.
///
/// An argument starting with `/` is absolute within the jail. `.` segments
/// are dropped and `..` removes the previous segment, never climbing above
/// the jail root. The result has no leading or trailing slash; the jail root
/// itself is the empty string.
pub fn normalize_path(current_dir: &str, arg: &str) -> String {
    let base = if arg.starts_with('/') { "" } else { current_dir };
    let mut segments: Vec<&str> = Vec::new();
    for segment in base.split('/').chain(arg.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Returns the parent of a jail-relative path.
pub fn parent_path(current_dir: &str) -> String {
    normalize_path(current_dir, "..")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_paths_append() {
        assert_eq!(normalize_path("", "docs"), "docs");
        assert_eq!(normalize_path("docs", "2024/reports"), "docs/2024/reports");
        assert_eq!(normalize_path("docs", "./a//b/"), "docs/a/b");
    }

    #[test]
    fn test_absolute_paths_replace() {
        assert_eq!(normalize_path("docs/2024", "/pub"), "pub");
        assert_eq!(normalize_path("docs", "/"), "");
    }

    #[test]
    fn test_parent_segments_stay_in_jail() {
        assert_eq!(normalize_path("docs/2024", ".."), "docs");
        assert_eq!(normalize_path("docs", "../../../etc/passwd"), "etc/passwd");
        assert_eq!(normalize_path("", ".."), "");
    }

    #[test]
    fn test_parent_path() {
        assert_eq!(parent_path("a/b/c"), "a/b");
        assert_eq!(parent_path("a"), "");
        assert_eq!(parent_path(""), "");
    }

    #[tokio::test]
    async fn test_reply_write_times_out_when_peer_stops_reading() {
        let (mut server_end, _client_end) = tokio::io::duplex(16);
        let result = write_reply(&mut server_end, &[b'x'; 1024], Duration::from_millis(50)).await;
        let err = result.unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_reply_write_completes() {
        let (mut server_end, mut client_end) = tokio::io::duplex(64);
        write_reply(&mut server_end, b"200 Command Ok.\r\n", Duration::from_millis(50))
            .await
            .unwrap();
        let mut received = [0u8; 17];
        tokio::io::AsyncReadExt::read_exact(&mut client_end, &mut received)
            .await
            .unwrap();
        assert_eq!(&received, b"200 Command Ok.\r\n");
    }

    #[test]
    fn test_composition_matches_single_step() {
        let stepwise = ["a", "b", "..", "c"]
            .iter()
            .fold(String::new(), |cwd, step| normalize_path(&cwd, step));
        assert_eq!(stepwise, normalize_path("", "a/b/../c"));
    }
}
