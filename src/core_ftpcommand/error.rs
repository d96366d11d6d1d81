// Errors a command handler can hand back to the dispatcher
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    /// Writing to the control connection failed; the session cannot continue.
    #[error("Control connection write failed: {0}")]
    Control(#[source] std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CommandError {
    /// Whether the session must end instead of replying 500.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CommandError::Control(_))
    }
}
