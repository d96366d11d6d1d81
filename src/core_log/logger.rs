use crate::config::ServerConfig;
use env_logger::fmt::Formatter;
use env_logger::{Builder, Env, Logger, Target, WriteStyle};
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Failed to open log file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Logger already initialized: {0}")]
    Install(#[from] log::SetLoggerError),
}

/// `[timestamp] [level] message`
pub fn format_record(buf: &mut Formatter, record: &Record) -> std::io::Result<()> {
    writeln!(
        buf,
        "[{}] [{}] {}",
        buf.timestamp(),
        record.level(),
        record.args()
    )
}

fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

fn open_log_file(path: &Path) -> Result<File, LoggerError> {
    let open = || -> std::io::Result<File> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(path)
    };
    open().map_err(|source| LoggerError::Open {
        path: path.to_path_buf(),
        source,
    })
}

fn file_logger(file: File, env_filter: Option<&str>, level: LevelFilter) -> Logger {
    let mut builder = match env_filter {
        Some(filter) => Builder::from_env(Env::default().default_filter_or(filter)),
        None => {
            let mut builder = Builder::new();
            builder.filter_level(level);
            builder
        }
    };
    builder
        .format(format_record)
        .write_style(WriteStyle::Never)
        .target(Target::Pipe(Box::new(file)));
    builder.build()
}

/// Console logger plus the optional access and error log files.
pub struct ServerLogger {
    console: Logger,
    access: Option<Logger>,
    errors: Option<Logger>,
}

impl ServerLogger {
    pub fn new(server: &ServerConfig, verbose: bool) -> Result<Self, LoggerError> {
        let filter = default_filter(verbose);
        let console = Builder::from_env(Env::default().default_filter_or(filter))
            .format(format_record)
            .build();

        let access = match &server.access_log {
            Some(path) => Some(file_logger(open_log_file(path)?, Some(filter), LevelFilter::Info)),
            None => None,
        };
        let errors = match &server.error_log {
            Some(path) => Some(file_logger(open_log_file(path)?, None, LevelFilter::Warn)),
            None => None,
        };

        Ok(ServerLogger {
            console,
            access,
            errors,
        })
    }

    fn loggers(&self) -> impl Iterator<Item = &Logger> {
        std::iter::once(&self.console)
            .chain(self.access.as_ref())
            .chain(self.errors.as_ref())
    }

    pub fn max_level(&self) -> LevelFilter {
        self.loggers()
            .map(|logger| logger.filter())
            .max()
            .unwrap_or(LevelFilter::Info)
    }

    /// Installs this logger as the global `log` backend.
    pub fn install(self) -> Result<(), LoggerError> {
        let level = self.max_level();
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }
}

impl Log for ServerLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.loggers().any(|logger| logger.enabled(metadata))
    }

    fn log(&self, record: &Record) {
        for logger in self.loggers() {
            if logger.matches(record) {
                logger.log(record);
            }
        }
    }

    fn flush(&self) {
        for logger in self.loggers() {
            logger.flush();
        }
    }
}

/// Sets up logging for the process from the server configuration.
pub fn init_logging(server: &ServerConfig, verbose: bool) -> Result<(), LoggerError> {
    ServerLogger::new(server, verbose)?.install()
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;
    use tempfile::TempDir;

    fn record_at(level: Level, logger: &ServerLogger, message: &str) {
        logger.log(
            &Record::builder()
                .level(level)
                .target("jailftpd")
                .args(format_args!("{}", message))
                .build(),
        );
    }

    #[test]
    fn test_error_log_only_receives_warnings() {
        let dir = TempDir::new().unwrap();
        let access = dir.path().join("log/access.log");
        let errors = dir.path().join("log/error.log");
        let server = ServerConfig {
            access_log: Some(access.clone()),
            error_log: Some(errors.clone()),
            ..Default::default()
        };

        let logger = ServerLogger::new(&server, false).unwrap();
        record_at(Level::Info, &logger, "session opened");
        record_at(Level::Error, &logger, "disk full");
        logger.flush();

        let access = std::fs::read_to_string(access).unwrap();
        assert!(access.contains("[INFO] session opened"));
        assert!(access.contains("[ERROR] disk full"));

        let errors = std::fs::read_to_string(errors).unwrap();
        assert!(!errors.contains("session opened"));
        assert!(errors.contains("[ERROR] disk full"));
    }

    #[test]
    fn test_no_files_configured() {
        let logger = ServerLogger::new(&ServerConfig::default(), true).unwrap();
        assert!(logger.access.is_none());
        assert!(logger.errors.is_none());
    }
}
