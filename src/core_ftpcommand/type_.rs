use crate::config::Config;
use crate::core_ftpcommand::error::CommandError;
use crate::core_ftpcommand::utils::ensure_logged_in;
use crate::helpers::{send_reply, ControlWriter};
use crate::session::{Session, TransferType};
use crate::status_codes::{CMD_NOT_IMPLEMENTED_FOR_PARAM, OK};
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Parses a TYPE argument. Only ASCII (`A`) and Image (`I`) are supported;
/// a format or byte-size token after the type letter is ignored.
pub fn parse_transfer_type(arg: &str) -> Option<TransferType> {
    let code = arg.split_whitespace().next()?;
    match code.to_ascii_uppercase().as_str() {
        "A" => Some(TransferType::Ascii),
        "I" => Some(TransferType::Image),
        _ => None,
    }
}

/// Handles the TYPE FTP command.
///
/// # Arguments
///
/// * `writer` - The shared control connection writer.
/// * `session` - The session whose transfer type is set.
/// * `arg` - The requested type, `A` or `I`.
///
/// # Returns
///
/// Result<(), CommandError> indicating the success or failure of the operation.
pub async fn handle_type_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), CommandError> {
    let mut session = session.lock().await;
    if !ensure_logged_in(&writer, &session).await? {
        return Ok(());
    }

    match parse_transfer_type(&arg) {
        Some(transfer_type) => {
            info!("Session {}: transfer type {:?}", session.id, transfer_type);
            session.transfer_type = Some(transfer_type);
            send_reply(&writer, OK, "Transfer Type OK").await
        }
        None => {
            warn!("Unsupported TYPE argument: {:?}", arg);
            send_reply(&writer, CMD_NOT_IMPLEMENTED_FOR_PARAM, "").await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transfer_type() {
        assert_eq!(parse_transfer_type("A"), Some(TransferType::Ascii));
        assert_eq!(parse_transfer_type("i"), Some(TransferType::Image));
        assert_eq!(parse_transfer_type("A N"), Some(TransferType::Ascii));
        assert_eq!(parse_transfer_type("E"), None);
        assert_eq!(parse_transfer_type("L 8"), None);
        assert_eq!(parse_transfer_type(""), None);
    }
}
