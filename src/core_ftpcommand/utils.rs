use crate::core_ftpcommand::error::CommandError;
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use crate::status_codes::NOT_LOGGED_IN;

/// Replies 530 and returns `false` when the session has no authenticated user.
pub async fn ensure_logged_in(
    writer: &ControlWriter,
    session: &Session,
) -> Result<bool, CommandError> {
    if session.is_logged_in() {
        return Ok(true);
    }
    send_reply(writer, NOT_LOGGED_IN, "").await?;
    Ok(false)
}

/// Formats a jail-relative path the way clients see it.
pub fn display_path(virtual_path: &str) -> String {
    format!("/{}", virtual_path)
}
