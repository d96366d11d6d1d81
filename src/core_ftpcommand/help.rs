use crate::config::Config;
use crate::core_ftpcommand::error::CommandError;
use crate::helpers::{send_multiline_reply, send_reply, ControlWriter};
use crate::session::Session;
use crate::status_codes::HELP_MESSAGE;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Usage text of every command with a handler.
pub const HELP_MESSAGES: &[(&str, &str)] = &[
    ("ABOR", "Abort an active file transfer."),
    ("ACCT", "Account information."),
    ("ALLO", "Allocate sufficient disk space to receive a file."),
    ("APPE", "Append (with create)"),
    ("CDUP", "Change to Parent Directory."),
    ("CWD", "Change working directory."),
    ("DELE", "Delete file."),
    ("EPRT", "Specifies an extended address and port to which the server should connect."),
    ("EPSV", "Enter extended passive mode."),
    ("HELP", "Returns usage documentation on a command if specified, else a general help document is returned."),
    ("LIST", "Returns information of a file or directory if specified, else information of the current working directory is returned."),
    ("MKD", "Make directory."),
    ("MODE", "Sets the transfer mode (Stream, Block, or Compressed)."),
    ("NLST", "Returns a list of file names in a specified directory."),
    ("NOOP", "No operation (dummy packet; used mostly on keepalives)."),
    ("PASS", "Authentication password."),
    ("PASV", "Enter passive mode."),
    ("PORT", "Specifies an address and port to which the server should connect."),
    ("PWD", "Print working directory. Returns the current directory of the host."),
    ("QUIT", "Disconnect."),
    ("REIN", "Re initializes the connection."),
    ("RETR", "Retrieve a copy of the file"),
    ("RMD", "Remove a directory."),
    ("RNFR", "Rename from."),
    ("RNTO", "Rename to."),
    ("SITE", "Sends site specific commands to remote server"),
    ("STAT", "Returns information on the server status, including the status of the current connection"),
    ("STOR", "Accept the data and to store the data as a file at the server site"),
    ("STOU", "Store file uniquely."),
    ("STRU", "Set file transfer structure."),
    ("SYST", "Return system type."),
    ("TYPE", "Sets the transfer mode (ASCII/Binary)."),
    ("USER", "Authentication username."),
    ("XCUP", "Change to the parent of the current working directory"),
    ("XMKD", "Make a directory"),
    ("XPWD", "Print the current working directory"),
    ("XRMD", "Remove a directory"),
];

pub fn help_for(command: &str) -> Option<&'static str> {
    HELP_MESSAGES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(command))
        .map(|(_, text)| *text)
}

/// Handles the HELP FTP command. Available before login.
pub async fn handle_help_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    _session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), CommandError> {
    let command = arg.trim();
    if command.is_empty() {
        let lines: Vec<String> = HELP_MESSAGES
            .iter()
            .map(|(name, text)| format!("{:<5} {}", name, text))
            .collect();
        return send_multiline_reply(
            &writer,
            HELP_MESSAGE,
            "The following commands are recognized:",
            &lines,
            "Help OK.",
        )
        .await;
    }

    let message = match help_for(command) {
        Some(text) => format!("{}: {}", command.to_ascii_uppercase(), text),
        None => format!(
            "Sorry, the command {} is not implemented",
            command.to_ascii_uppercase()
        ),
    };
    send_reply(&writer, HELP_MESSAGE, &message).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_lookup_is_case_insensitive() {
        assert_eq!(help_for("cwd"), Some("Change working directory."));
        assert_eq!(help_for("SMNT"), None);
    }
}
