use crate::config::Config;
use crate::core_ftpcommand::error::CommandError;
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use crate::status_codes::OK;
use std::sync::Arc;
use tokio::sync::Mutex;

pub async fn handle_noop_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    _session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), CommandError> {
    send_reply(&writer, OK, "").await
}
